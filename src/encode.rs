// encode.rs
//
// Copyright (c) 2026  Douglas Lau
//
//! Indexed-color PNG encoding
use crate::decode::Frame;
use crate::error::Result;
use crate::palette::Palette;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::{BufWriter, Write};

/// PNG file signature
const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Bit depth (bits per palette index)
const BIT_DEPTH: u8 = 8;

/// Indexed-color mode
const COLOR_TYPE: u8 = 3;

/// Row filter: none
const FILTER_NONE: u8 = 0;

/// Encoder writing one [Frame](struct.Frame.html) as an indexed-color PNG
/// file.
///
/// Every chunk is framed as a big-endian payload length, a 4-byte ASCII
/// type tag, the payload, and a CRC-32 (IEEE) computed over the tag and
/// payload together.
pub struct PngEncoder<W: Write> {
    writer: BufWriter<W>,
}

impl<W: Write> PngEncoder<W> {
    /// Create a new PNG encoder
    pub fn new(w: W) -> Self {
        PngEncoder {
            writer: BufWriter::new(w),
        }
    }

    /// Encode one frame and flush the writer
    pub fn encode(&mut self, frame: &Frame) -> Result<()> {
        self.writer.write_all(&SIGNATURE)?;
        self.write_image_header(frame.width, frame.height)?;
        self.write_palette(&frame.palette)?;
        if let Some(idx) = frame.transparent_color {
            self.write_transparency(idx)?;
        }
        self.write_image_data(&frame.pixels, frame.width, frame.height)?;
        self.write_trailer()?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write one chunk: length, tag, payload, CRC
    fn write_chunk(&mut self, tag: &[u8; 4], payload: &[u8]) -> Result<()> {
        self.writer.write_all(&(payload.len() as u32).to_be_bytes())?;
        self.writer.write_all(tag)?;
        self.writer.write_all(payload)?;
        let mut crc = crc32fast::Hasher::new();
        crc.update(tag);
        crc.update(payload);
        self.writer.write_all(&crc.finalize().to_be_bytes())?;
        Ok(())
    }

    /// Write the IHDR chunk
    fn write_image_header(&mut self, width: u16, height: u16) -> Result<()> {
        let mut payload = [0; 13];
        payload[..4].copy_from_slice(&u32::from(width).to_be_bytes());
        payload[4..8].copy_from_slice(&u32::from(height).to_be_bytes());
        payload[8] = BIT_DEPTH;
        payload[9] = COLOR_TYPE;
        // compression, filter and interlace methods all zero
        self.write_chunk(b"IHDR", &payload)
    }

    /// Write the PLTE chunk
    fn write_palette(&mut self, palette: &Palette) -> Result<()> {
        self.write_chunk(b"PLTE", &palette.encode())
    }

    /// Write the tRNS chunk.
    ///
    /// Entries before the transparent index are fully opaque (0xFF); the
    /// index itself is fully transparent (0x00); later entries default.
    fn write_transparency(&mut self, idx: u8) -> Result<()> {
        let mut payload = vec![0xFF; usize::from(idx) + 1];
        payload[usize::from(idx)] = 0x00;
        self.write_chunk(b"tRNS", &payload)
    }

    /// Write the IDAT chunk: filter-prefixed rows, deflated
    fn write_image_data(
        &mut self,
        pixels: &[u8],
        width: u16,
        height: u16,
    ) -> Result<()> {
        let width = usize::from(width);
        let height = usize::from(height);
        debug_assert_eq!(pixels.len(), width * height);
        let mut rows = Vec::with_capacity((width + 1) * height);
        for row in pixels.chunks_exact(width.max(1)).take(height) {
            rows.push(FILTER_NONE);
            rows.extend_from_slice(row);
        }
        let mut enc = ZlibEncoder::new(Vec::new(), Compression::best());
        enc.write_all(&rows)?;
        self.write_chunk(b"IDAT", &enc.finish()?)
    }

    /// Write the IEND chunk
    fn write_trailer(&mut self) -> Result<()> {
        self.write_chunk(b"IEND", b"")
    }
}
