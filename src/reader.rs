// reader.rs
//
// Copyright (c) 2026  Douglas Lau
//
//! Forward-only input cursor and sub-block framing
use crate::error::{Error, Result};
use std::io::{BufRead, BufReader, Read};

/// Maximum sub-block payload length
const SUB_BLOCK_MAX: usize = 255;

/// A forward-only cursor over the input stream.
///
/// Provides a one-byte peek but no seeking, so any `Read` source works.
pub(crate) struct ByteReader<R: Read> {
    reader: BufReader<R>,
}

impl<R: Read> ByteReader<R> {
    /// Create a new byte reader
    pub fn new(r: R) -> Self {
        ByteReader {
            reader: BufReader::new(r),
        }
    }

    /// Peek at the next byte without consuming it
    pub fn peek(&mut self) -> Result<u8> {
        let buf = self.reader.fill_buf().map_err(Error::Io)?;
        match buf.first() {
            Some(&b) => Ok(b),
            None => Err(Error::UnexpectedEndOfFile),
        }
    }

    /// Read one byte
    pub fn read_u8(&mut self) -> Result<u8> {
        let mut buf = [0; 1];
        self.read_buf(&mut buf)?;
        Ok(buf[0])
    }

    /// Read an exact number of bytes
    pub fn read_buf(&mut self, buf: &mut [u8]) -> Result<()> {
        self.reader.read_exact(buf)?;
        Ok(())
    }

    /// Skip forward a number of bytes
    pub fn skip(&mut self, mut n: usize) -> Result<()> {
        let mut buf = [0; SUB_BLOCK_MAX];
        while n > 0 {
            let sz = n.min(SUB_BLOCK_MAX);
            self.read_buf(&mut buf[..sz])?;
            n -= sz;
        }
        Ok(())
    }

    /// Skip a sequence of sub-blocks, through its terminator
    pub fn skip_sub_blocks(&mut self) -> Result<()> {
        loop {
            let len = self.read_u8()?;
            if len == 0 {
                return Ok(());
            }
            self.skip(len.into())?;
        }
    }
}

impl<R: Read> Read for ByteReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.reader.read(buf)
    }
}

/// Reader presenting a chunked sub-block sequence as a flat stream.
///
/// Each sub-block is prefixed by one length byte; a zero length terminates
/// the sequence and reads return `Ok(0)` from then on (clean EOF).  Hitting
/// end of input before the terminator, or inside a declared sub-block, is an
/// `UnexpectedEof` I/O error instead.
pub(crate) struct SubBlockReader<'a, R: Read> {
    reader: &'a mut R,
    buf: [u8; SUB_BLOCK_MAX],
    len: usize,
    pos: usize,
    done: bool,
}

impl<'a, R: Read> SubBlockReader<'a, R> {
    /// Create a new sub-block reader
    pub fn new(reader: &'a mut R) -> Self {
        SubBlockReader {
            reader,
            buf: [0; SUB_BLOCK_MAX],
            len: 0,
            pos: 0,
            done: false,
        }
    }

    /// Buffer the next sub-block; `false` on the terminator
    fn next_sub_block(&mut self) -> std::io::Result<bool> {
        let mut len = [0; 1];
        self.reader.read_exact(&mut len)?;
        let len = len[0] as usize;
        if len == 0 {
            self.done = true;
            return Ok(false);
        }
        self.reader.read_exact(&mut self.buf[..len])?;
        self.len = len;
        self.pos = 0;
        Ok(true)
    }

    /// Consume any remaining sub-blocks, through the terminator
    pub fn drain(&mut self) -> std::io::Result<()> {
        while !self.done {
            self.pos = self.len;
            self.next_sub_block()?;
        }
        Ok(())
    }
}

impl<'a, R: Read> Read for SubBlockReader<'a, R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if self.done || buf.is_empty() {
            return Ok(0);
        }
        if self.pos >= self.len && !self.next_sub_block()? {
            return Ok(0);
        }
        let n = buf.len().min(self.len - self.pos);
        buf[..n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}
