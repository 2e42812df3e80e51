// decode.rs
//
// Copyright (c) 2026  Douglas Lau
//
//! GIF container parsing
use crate::block::{
    BlockCode, DisposalMethod, ExtensionCode, GraphicControl, Header,
    ImageDesc, LogicalScreenDesc,
};
use crate::error::{Error, Result};
use crate::lzw;
use crate::palette::Palette;
use crate::reader::{ByteReader, SubBlockReader};
use std::io::Read;

/// A builder which can be turned into a [Frames](struct.Frames.html)
/// iterator.
///
/// ## Example
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let gif = &[
/// #   0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x02, 0x00,
/// #   0x02, 0x00, 0x80, 0x01, 0x00, 0x00, 0x00, 0x00,
/// #   0xff, 0xff, 0xff, 0x2c, 0x00, 0x00, 0x00, 0x00,
/// #   0x02, 0x00, 0x02, 0x00, 0x00, 0x02, 0x03, 0x0c,
/// #   0x10, 0x05, 0x00, 0x3b,
/// # ][..];
/// let frames = gifex::Decoder::new(gif).into_frames();
/// for frame in frames {
///     println!("frame: {:?}", frame?.pixels.len());
/// }
/// # Ok(())
/// # }
/// ```
pub struct Decoder<R: Read> {
    reader: R,
}

impl<R: Read> Decoder<R> {
    /// Create a new Decoder
    pub fn new(reader: R) -> Self {
        Decoder { reader }
    }

    /// Convert into a frame `Iterator`
    pub fn into_frames(self) -> Frames<R> {
        Frames::new(self.reader)
    }
}

/// Blocks at the beginning of the file, before any frames
#[derive(Debug)]
pub struct Preamble {
    /// GIF header
    pub header: Header,
    /// Logical screen descriptor
    pub logical_screen_desc: LogicalScreenDesc,
    /// Global color table, if present
    pub global_palette: Option<Palette>,
}

impl Preamble {
    /// Get the screen width
    pub fn screen_width(&self) -> u16 {
        self.logical_screen_desc.screen_width()
    }

    /// Get the screen height
    pub fn screen_height(&self) -> u16 {
        self.logical_screen_desc.screen_height()
    }
}

/// One fully decoded frame.
///
/// Pixels are palette indices, exactly `width * height` bytes, paired with
/// the palette active while decoding (the local color table when present,
/// otherwise the global one).
#[derive(Debug)]
pub struct Frame {
    /// Left position on the logical screen
    pub left: i16,
    /// Top position on the logical screen
    pub top: i16,
    /// Frame width in pixels
    pub width: u16,
    /// Frame height in pixels
    pub height: u16,
    /// Interlace flag (rows are left in stored order)
    pub interlaced: bool,
    /// Delay before the next frame, in centiseconds
    pub delay_time_cs: u16,
    /// Disposal method (recorded, not acted upon)
    pub disposal_method: DisposalMethod,
    /// Transparent color index, if any
    pub transparent_color: Option<u8>,
    /// Active palette for this frame
    pub palette: Palette,
    /// Decoded palette-index buffer
    pub pixels: Vec<u8>,
}

/// An iterator over every [Frame](struct.Frame.html) in a GIF file.
///
/// Created with Decoder.[into_frames](struct.Decoder.html#method.into_frames).
pub struct Frames<R: Read> {
    /// Forward-only input cursor
    reader: ByteReader<R>,
    /// Preamble blocks, once read
    preamble: Option<Preamble>,
    /// Graphic control pending for the next image block
    pending_control: Option<GraphicControl>,
    /// Iteration finished (trailer or error)
    done: bool,
}

impl<R: Read> Iterator for Frames<R> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_frame() {
            Ok(Some(frame)) => Some(Ok(frame)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<R: Read> Frames<R> {
    /// Create a new frame iterator
    fn new(reader: R) -> Self {
        Frames {
            reader: ByteReader::new(reader),
            preamble: None,
            pending_control: None,
            done: false,
        }
    }

    /// Read the preamble blocks, validating the header.
    ///
    /// Called implicitly by the first frame read if not called explicitly.
    pub fn preamble(&mut self) -> Result<&Preamble> {
        if self.preamble.is_none() {
            let mut buf = [0; Header::SIZE];
            self.reader.read_buf(&mut buf)?;
            let header = Header::from_buf(&buf)?;
            let mut buf = [0; LogicalScreenDesc::SIZE];
            self.reader.read_buf(&mut buf)?;
            let logical_screen_desc = LogicalScreenDesc::from_buf(&buf)?;
            debug!("header: {:?} {:?}", header, logical_screen_desc);
            let global_palette =
                self.read_palette(logical_screen_desc.color_table_entries())?;
            self.preamble = Some(Preamble {
                header,
                logical_screen_desc,
                global_palette,
            });
        }
        match &self.preamble {
            Some(p) => Ok(p),
            None => unreachable!(),
        }
    }

    /// Read a color table with the given entry count
    fn read_palette(&mut self, n_entries: usize) -> Result<Option<Palette>> {
        if n_entries == 0 {
            return Ok(None);
        }
        let mut buf = vec![0; n_entries * 3];
        self.reader.read_buf(&mut buf)?;
        Ok(Some(Palette::decode(&buf, n_entries)?))
    }

    /// Decode up to the next frame, or the trailer
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        self.preamble()?;
        loop {
            let signature = self.reader.peek()?;
            match BlockCode::from_u8(signature)? {
                BlockCode::Trailer => {
                    self.reader.read_u8()?;
                    return Ok(None);
                }
                BlockCode::Extension => {
                    self.reader.read_u8()?;
                    self.read_extension()?;
                }
                BlockCode::ImageDesc => {
                    self.reader.read_u8()?;
                    return Ok(Some(self.read_image()?));
                }
            }
        }
    }

    /// Read one extension block (after the introducer byte)
    fn read_extension(&mut self) -> Result<()> {
        let ext = ExtensionCode::from_u8(self.reader.read_u8()?)?;
        debug!("extension: {:?}", ext);
        match ext {
            ExtensionCode::GraphicControl => {
                let len = usize::from(self.reader.read_u8()?);
                if Some(len) != ext.fixed_size() {
                    return Err(Error::MalformedGraphicControl);
                }
                let mut buf = [0; 4];
                self.reader.read_buf(&mut buf)?;
                let control = GraphicControl::from_buf(&buf)?;
                debug!("graphic control: {:?}", control);
                self.pending_control = Some(control);
            }
            ExtensionCode::PlainText | ExtensionCode::Application => {
                // fixed-size block first; its payload is not captured
                let len = usize::from(self.reader.read_u8()?);
                self.reader.skip(len)?;
            }
            ExtensionCode::Comment => {}
        }
        // variable trailing data, through the terminator
        self.reader.skip_sub_blocks()
    }

    /// Read one image block (after the separator byte)
    fn read_image(&mut self) -> Result<Frame> {
        let mut buf = [0; ImageDesc::SIZE];
        self.reader.read_buf(&mut buf)?;
        let desc = ImageDesc::from_buf(&buf)?;
        debug!("image: {:?}", desc);
        if desc.interlaced() {
            warn!("interlaced frame; rows left in stored order");
        }
        let palette = self.resolve_palette(&desc)?;
        let pixels = self.decode_pixels(desc.image_sz())?;
        let control = self.pending_control.take();
        Ok(Frame {
            left: desc.left(),
            top: desc.top(),
            width: desc.width(),
            height: desc.height(),
            interlaced: desc.interlaced(),
            delay_time_cs: control
                .as_ref()
                .map(|c| c.delay_time_cs())
                .unwrap_or(0),
            disposal_method: control
                .as_ref()
                .map(|c| c.disposal_method())
                .unwrap_or_default(),
            transparent_color: control
                .as_ref()
                .and_then(|c| c.transparent_color()),
            palette,
            pixels,
        })
    }

    /// Resolve the active palette for a frame: local overrides global
    fn resolve_palette(&mut self, desc: &ImageDesc) -> Result<Palette> {
        if let Some(local) = self.read_palette(desc.color_table_entries())? {
            return Ok(local);
        }
        match &self.preamble {
            Some(p) => match &p.global_palette {
                Some(global) => Ok(global.clone()),
                None => Err(Error::MissingColorTable),
            },
            None => Err(Error::MissingColorTable),
        }
    }

    /// Decompress one frame's pixel indices
    fn decode_pixels(&mut self, n_pixels: usize) -> Result<Vec<u8>> {
        let min_code_size = self.reader.read_u8()?;
        if min_code_size > 12 {
            return Err(Error::InvalidCodeSize);
        }
        let min_code_size = min_code_size.max(2);
        let mut sub_blocks = SubBlockReader::new(&mut self.reader);
        let pixels =
            lzw::decompress_stream(min_code_size, &mut sub_blocks, n_pixels)?;
        // consume trailing sub-blocks and the block terminator
        sub_blocks.drain()?;
        Ok(pixels)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const GIF_10X10: &[u8] = &[
        0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x0A, 0x00, 0x0A, 0x00, 0x91,
        0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0xFF,
        0x00, 0x00, 0x00, 0x21, 0xF9, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x2C, 0x00, 0x00, 0x00, 0x00, 0x0A, 0x00, 0x0A, 0x00, 0x00, 0x02,
        0x16, 0x8C, 0x2D, 0x99, 0x87, 0x2A, 0x1C, 0xDC, 0x33, 0xA0, 0x02,
        0x75, 0xEC, 0x95, 0xFA, 0xA8, 0xDE, 0x60, 0x8C, 0x04, 0x91, 0x4C,
        0x01, 0x00, 0x3B,
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

    /// 2x2 frame, 2-entry global palette, no extensions
    const GIF_2X2: &[u8] = &[
        0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x02, 0x00, 0x02, 0x00, 0x80,
        0x01, 0x00, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0x2C, 0x00, 0x00,
        0x00, 0x00, 0x02, 0x00, 0x02, 0x00, 0x00, 0x02, 0x03, 0x0C, 0x10,
        0x05, 0x00, 0x3B,
    ];

    #[test]
    fn single_frame() {
        let mut frames = Decoder::new(GIF_10X10).into_frames();
        {
            let preamble = frames.preamble().unwrap();
            assert_eq!(preamble.header.version(), *b"89a");
            assert_eq!(preamble.screen_width(), 10);
            assert_eq!(preamble.screen_height(), 10);
            let global = preamble.global_palette.as_ref().unwrap();
            assert_eq!(global.len(), 4);
        }
        let frame = frames.next().unwrap().unwrap();
        assert_eq!(frame.width, 10);
        assert_eq!(frame.height, 10);
        assert_eq!(frame.pixels, IMAGE_10X10);
        assert_eq!(frame.palette.len(), 4);
        assert_eq!(frame.transparent_color, None);
        assert_eq!(frame.delay_time_cs, 0);
        assert!(frames.next().is_none());
        assert!(frames.next().is_none());
    }

    #[test]
    fn minimal_frame() {
        let frames: Vec<_> = Decoder::new(GIF_2X2)
            .into_frames()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].pixels, [1, 0, 0, 1]);
        assert_eq!(frames[0].palette.len(), 2);
    }

    #[test]
    fn transparency_consumed_once() {
        let mut gif = vec![
            0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x02, 0x00, 0x02, 0x00,
            0x80, 0x00, 0x00, // header, 2-entry global palette
            0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF,
        ];
        // graphic control: transparency enabled, index 1
        gif.extend_from_slice(&[0x21, 0xF9, 0x04, 0x01, 0x00, 0x00, 0x01,
            0x00]);
        let image = [
            0x2C, 0x00, 0x00, 0x00, 0x00, 0x02, 0x00, 0x02, 0x00, 0x00,
            0x02, 0x03, 0x0C, 0x10, 0x05, 0x00,
        ];
        gif.extend_from_slice(&image);
        gif.extend_from_slice(&image);
        gif.push(0x3B);
        let frames: Vec<_> = Decoder::new(&gif[..])
            .into_frames()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].transparent_color, Some(1));
        assert_eq!(frames[1].transparent_color, None);
    }

    #[test]
    fn missing_color_table() {
        // no global palette and no local palette
        let gif = [
            0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x02, 0x00, 0x02, 0x00,
            0x00, 0x00, 0x00, 0x2C, 0x00, 0x00, 0x00, 0x00, 0x02, 0x00,
            0x02, 0x00, 0x00, 0x02, 0x03, 0x0C, 0x10, 0x05, 0x00, 0x3B,
        ];
        let mut frames = Decoder::new(&gif[..]).into_frames();
        assert!(matches!(
            frames.next(),
            Some(Err(Error::MissingColorTable))
        ));
        assert!(frames.next().is_none());
    }

    #[test]
    fn local_palette_overrides_global() {
        let gif = [
            0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x02, 0x00, 0x02, 0x00,
            0x80, 0x00, 0x00, // global: black, white
            0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF,
            // image with 2-entry local table: red, green
            0x2C, 0x00, 0x00, 0x00, 0x00, 0x02, 0x00, 0x02, 0x00, 0x80,
            0xFF, 0x00, 0x00, 0x00, 0xFF, 0x00, //
            0x02, 0x03, 0x0C, 0x10, 0x05, 0x00, 0x3B,
        ];
        let frames: Vec<_> = Decoder::new(&gif[..])
            .into_frames()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(frames.len(), 1);
        let p = &frames[0].palette;
        assert_eq!(p.entry(0), Some(crate::palette::Rgb::new(0xFF, 0, 0)));
        assert_eq!(p.entry(1), Some(crate::palette::Rgb::new(0, 0xFF, 0)));
    }

    #[test]
    fn invalid_block_code() {
        let gif = [
            0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x02, 0x00, 0x02, 0x00,
            0x00, 0x00, 0x00, 0x42,
        ];
        let mut frames = Decoder::new(&gif[..]).into_frames();
        assert!(matches!(
            frames.next(),
            Some(Err(Error::InvalidBlockCode(0x42)))
        ));
    }

    #[test]
    fn unknown_extension() {
        let gif = [
            0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x02, 0x00, 0x02, 0x00,
            0x00, 0x00, 0x00, 0x21, 0xAB, 0x00, 0x3B,
        ];
        let mut frames = Decoder::new(&gif[..]).into_frames();
        assert!(matches!(
            frames.next(),
            Some(Err(Error::UnknownExtension(0xAB)))
        ));
    }

    #[test]
    fn truncated_file() {
        // image data ends before the sub-block terminator
        let gif = &GIF_10X10[..GIF_10X10.len() - 8];
        let mut frames = Decoder::new(gif).into_frames();
        assert!(matches!(
            frames.next(),
            Some(Err(Error::UnexpectedEndOfFile))
        ));
    }

    #[test]
    fn skips_other_extensions() {
        let mut gif = vec![
            0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x02, 0x00, 0x02, 0x00,
            0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF,
        ];
        // comment extension
        gif.extend_from_slice(&[0x21, 0xFE, 0x02, b'h', b'i', 0x00]);
        // application extension (NETSCAPE looping)
        gif.extend_from_slice(&[
            0x21, 0xFF, 0x0B, b'N', b'E', b'T', b'S', b'C', b'A', b'P',
            b'E', b'2', b'.', b'0', 0x03, 0x01, 0x00, 0x00, 0x00,
        ]);
        // plain text extension
        gif.extend_from_slice(&[
            0x21, 0x01, 0x0C, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x02,
            b'o', b'k', 0x00,
        ]);
        gif.extend_from_slice(&[
            0x2C, 0x00, 0x00, 0x00, 0x00, 0x02, 0x00, 0x02, 0x00, 0x00,
            0x02, 0x03, 0x0C, 0x10, 0x05, 0x00, 0x3B,
        ]);
        let frames: Vec<_> = Decoder::new(&gif[..])
            .into_frames()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].pixels, [1, 0, 0, 1]);
    }
}
