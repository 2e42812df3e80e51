// lzw.rs
//
// Copyright (c) 2026  Douglas Lau
//
//! Lempel-Ziv-Welch decompression for GIF image data
use crate::error::{Error, Result};
use std::cmp::Ordering;
use std::io::{ErrorKind, Read};
use std::ops::AddAssign;

/// Code Bits
#[derive(Clone, Copy, Debug, PartialEq)]
struct Bits(u8);

impl From<u8> for Bits {
    fn from(bits: u8) -> Self {
        Bits(bits.min(Self::MAX.0))
    }
}

impl From<Bits> for u8 {
    fn from(bits: Bits) -> Self {
        bits.0
    }
}

impl AddAssign<u8> for Bits {
    fn add_assign(&mut self, rhs: u8) {
        self.0 = (self.0 + rhs).min(Self::MAX.0)
    }
}

impl Bits {
    /// Maximum code bits allowed for GIF
    const MAX: Self = Bits(12);

    /// Get the number of entries
    fn entries(self) -> u16 {
        1 << (self.0 as u16)
    }

    /// Get the bit mask
    fn mask(self) -> u32 {
        (1 << (self.0 as u32)) - 1
    }
}

/// Code type
type Code = u16;

/// Node in the code dictionary
#[derive(Clone, Copy, Debug)]
struct Node {
    /// Next node code
    next: Option<Code>,
    /// Byte value
    byte: u8,
}

/// Code dictionary
#[derive(Debug)]
struct Dictionary {
    /// Table of codes
    table: Vec<Node>,
    /// Minimum code bits
    min_code_bits: u8,
}

impl Dictionary {
    /// Create a new code dictionary
    fn new(min_code_bits: u8) -> Self {
        let mut dict = Dictionary {
            table: Vec::with_capacity(Bits::MAX.entries().into()),
            min_code_bits,
        };
        dict.reset();
        dict
    }

    /// Get the clear code
    fn clear_code(&self) -> Code {
        1 << self.min_code_bits
    }

    /// Get the end code
    fn end_code(&self) -> Code {
        self.clear_code() + 1
    }

    /// Get the next available code
    fn next_code(&self) -> Code {
        self.table.len() as Code
    }

    /// Reset the dictionary
    fn reset(&mut self) {
        self.table.clear();
        for byte in 0..self.clear_code() {
            self.push_node(None, byte as u8);
        }
        self.push_node(None, 0); // clear code
        self.push_node(None, 0); // end code
    }

    /// Push a node into the dictionary
    fn push_node(&mut self, next: Option<Code>, byte: u8) {
        self.table.push(Node { next, byte })
    }

    /// Look up the first byte of a code's string
    fn first_byte(&self, code: Code) -> u8 {
        debug_assert!(code < self.next_code());
        let mut node = self.table[code as usize];
        while let Some(code) = node.next {
            node = self.table[code as usize];
        }
        node.byte
    }

    /// Write a code's string into a buffer (reversed)
    fn push_reversed(&self, code: Code, buffer: &mut Vec<u8>) {
        debug_assert!(code < self.next_code());
        let mut node = self.table[code as usize];
        while let Some(code) = node.next {
            buffer.push(node.byte);
            node = self.table[code as usize];
        }
        buffer.push(node.byte);
    }
}

/// LZW decompressor with variable code size and LSB-first packing
#[derive(Debug)]
pub(crate) struct Decompressor {
    /// Code dictionary
    dict: Dictionary,
    /// Minimum code bits
    min_code_bits: u8,
    /// Current code bits
    code_bits: Bits,
    /// Last code
    last: Option<Code>,
    /// Current code
    code: u32,
    /// Number of bits in current code
    n_bits: u8,
}

impl Decompressor {
    /// Create a new decompressor
    pub fn new(min_code_bits: u8) -> Self {
        Decompressor {
            dict: Dictionary::new(min_code_bits),
            min_code_bits,
            code_bits: Bits::from(min_code_bits + 1),
            last: None,
            code: 0,
            n_bits: 0,
        }
    }

    /// Take the next buffered code, if complete
    fn code(&mut self) -> Option<Code> {
        let b = u8::from(self.code_bits);
        if self.n_bits >= b {
            let code = (self.code & self.code_bits.mask()) as Code;
            self.code >>= b;
            self.n_bits -= b;
            Some(code)
        } else {
            None
        }
    }

    /// Unpack one code from a buffer
    fn unpack(&mut self, buffer: &[u8]) -> (usize, Option<Code>) {
        let mut n_consumed = 0;
        for byte in buffer {
            if self.n_bits >= self.code_bits.into() {
                break;
            }
            self.code |= (*byte as u32) << self.n_bits;
            self.n_bits += 8;
            n_consumed += 1;
        }
        (n_consumed, self.code())
    }

    /// Decompress a byte buffer; `false` when the end code was reached
    fn decompress(
        &mut self,
        bytes: &[u8],
        buffer: &mut Vec<u8>,
    ) -> Result<bool> {
        let mut bytes = bytes;
        while !bytes.is_empty() {
            let (consumed, code) = self.unpack(bytes);
            if let Some(code) = code {
                if !self.decompress_code(code, buffer)? {
                    return Ok(false);
                }
            }
            bytes = &bytes[consumed..];
        }
        Ok(true)
    }

    /// Decompress remaining fully-buffered codes
    fn decompress_finish(&mut self, buffer: &mut Vec<u8>) -> Result<()> {
        while let Some(code) = self.code() {
            if !self.decompress_code(code, buffer)? {
                break;
            }
        }
        Ok(())
    }

    /// Decompress one code; `false` for the end code
    fn decompress_code(
        &mut self,
        code: Code,
        buffer: &mut Vec<u8>,
    ) -> Result<bool> {
        if code == self.dict.end_code() {
            return Ok(false);
        }
        if code == self.dict.clear_code() {
            self.dict.reset();
            self.code_bits = Bits::from(self.min_code_bits + 1);
            self.last = None;
        } else {
            let start = buffer.len();
            self.decompress_reversed(code, buffer)?;
            buffer[start..].reverse();
            self.last = Some(code);
        }
        Ok(true)
    }

    /// Decompress one code (reversed)
    fn decompress_reversed(
        &mut self,
        code: Code,
        buffer: &mut Vec<u8>,
    ) -> Result<()> {
        let next_code = self.dict.next_code();
        match (self.last, code.cmp(&next_code)) {
            (_, Ordering::Greater) => return Err(Error::InvalidLzwData),
            (Some(last), Ordering::Less) => {
                self.dict.push_reversed(code, buffer);
                let byte = buffer.last().copied().unwrap();
                self.dict.push_node(Some(last), byte);
            }
            (Some(last), Ordering::Equal) => {
                self.dict.push_node(Some(last), self.dict.first_byte(last));
                self.dict.push_reversed(code, buffer);
            }
            (None, _) => buffer.push(code as u8),
        }
        if next_code + 1 == self.code_bits.entries() {
            self.code_bits += 1;
        }
        Ok(())
    }
}

/// Decompress an LZW stream into exactly `n_pixels` bytes.
///
/// Bytes are pulled from `reader` (normally a sub-block reader) until its
/// clean end of stream or the LZW end code.  Producing fewer than `n_pixels`
/// bytes is an incomplete frame; extra bytes are discarded.
pub(crate) fn decompress_stream<R: Read>(
    min_code_bits: u8,
    reader: &mut R,
    n_pixels: usize,
) -> Result<Vec<u8>> {
    let mut dec = Decompressor::new(min_code_bits);
    let mut pixels = Vec::with_capacity(n_pixels);
    let mut buf = [0; 255];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => {
                dec.decompress_finish(&mut pixels)?;
                break;
            }
            Ok(n) => {
                if !dec.decompress(&buf[..n], &mut pixels)? {
                    break;
                }
            }
            Err(ref e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    if pixels.len() < n_pixels {
        return Err(Error::IncompleteFrameData);
    }
    if pixels.len() > n_pixels {
        warn!("Extra image data: {:?} bytes", pixels.len() - n_pixels);
        pixels.truncate(n_pixels);
    }
    Ok(pixels)
}

#[cfg(test)]
mod test {
    use super::*;

    // 10x10 frame from a real GIF (minimum code size 2)
    const DATA_10X10: &[u8] = &[
        0x8C, 0x2D, 0x99, 0x87, 0x2A, 0x1C, 0xDC, 0x33, 0xA0, 0x02, 0x75,
        0xEC, 0x95, 0xFA, 0xA8, 0xDE, 0x60, 0x8C, 0x04, 0x91, 0x4C, 0x01,
    ];

    const IMAGE_10X10: &[u8] = &[
        1, 1, 1, 1, 1, 2, 2, 2, 2, 2, //
        1, 1, 1, 1, 1, 2, 2, 2, 2, 2, //
        1, 1, 1, 1, 1, 2, 2, 2, 2, 2, //
        1, 1, 1, 0, 0, 0, 0, 2, 2, 2, //
        1, 1, 1, 0, 0, 0, 0, 2, 2, 2, //
        2, 2, 2, 0, 0, 0, 0, 1, 1, 1, //
        2, 2, 2, 0, 0, 0, 0, 1, 1, 1, //
        2, 2, 2, 2, 2, 1, 1, 1, 1, 1, //
        2, 2, 2, 2, 2, 1, 1, 1, 1, 1, //
        2, 2, 2, 2, 2, 1, 1, 1, 1, 1, //
    ];

    #[test]
    fn frame_10x10() {
        let mut src = DATA_10X10;
        let pixels = decompress_stream(2, &mut src, 100).unwrap();
        assert_eq!(pixels, IMAGE_10X10);
    }

    #[test]
    fn checkerboard_2x2() {
        // clear, 1, 0, 0, 1, end at minimum code size 2
        let mut src = &[0x0C, 0x10, 0x05][..];
        let pixels = decompress_stream(2, &mut src, 4).unwrap();
        assert_eq!(pixels, [1, 0, 0, 1]);
    }

    #[test]
    fn short_stream() {
        let mut src = &[0x0C, 0x10, 0x05][..];
        assert!(matches!(
            decompress_stream(2, &mut src, 50),
            Err(Error::IncompleteFrameData)
        ));
    }

    #[test]
    fn extra_data_truncated() {
        let mut src = DATA_10X10;
        let pixels = decompress_stream(2, &mut src, 50).unwrap();
        assert_eq!(pixels.len(), 50);
        assert_eq!(pixels, IMAGE_10X10[..50]);
    }

    #[test]
    fn code_out_of_range() {
        // first code after clear references an undefined entry
        // min code 2: clear=4; codes (3 bits): 4, 7 then junk
        let mut src = &[0b0011_1100, 0b0000_0011][..];
        let res = decompress_stream(2, &mut src, 100);
        assert!(matches!(res, Err(Error::InvalidLzwData)));
    }
}
