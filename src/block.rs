// block.rs
//
// Copyright (c) 2026  Douglas Lau
//
//! GIF block structures
use crate::error::{Error, Result};

/// Top-level block codes
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum BlockCode {
    /// Extension introducer (0x21)
    Extension,
    /// Image separator (0x2C)
    ImageDesc,
    /// GIF trailer (0x3B)
    Trailer,
}

impl BlockCode {
    /// Look up a block code from its signature byte
    pub fn from_u8(t: u8) -> Result<Self> {
        match t {
            b'!' => Ok(BlockCode::Extension),
            b',' => Ok(BlockCode::ImageDesc),
            b';' => Ok(BlockCode::Trailer),
            _ => Err(Error::InvalidBlockCode(t)),
        }
    }
}

/// Extension block labels
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum ExtensionCode {
    /// Plain text extension (0x01)
    PlainText,
    /// Graphic control extension (0xF9)
    GraphicControl,
    /// Comment extension (0xFE)
    Comment,
    /// Application extension (0xFF)
    Application,
}

impl ExtensionCode {
    /// Look up an extension label; unknown labels are an error rather than
    /// a silent skip
    pub fn from_u8(n: u8) -> Result<Self> {
        match n {
            0x01 => Ok(ExtensionCode::PlainText),
            0xF9 => Ok(ExtensionCode::GraphicControl),
            0xFE => Ok(ExtensionCode::Comment),
            0xFF => Ok(ExtensionCode::Application),
            _ => Err(Error::UnknownExtension(n)),
        }
    }

    /// Get the fixed data block size following the label, if any
    pub fn fixed_size(self) -> Option<usize> {
        match self {
            ExtensionCode::PlainText => Some(12),
            ExtensionCode::GraphicControl => Some(4),
            ExtensionCode::Application => Some(11),
            ExtensionCode::Comment => None,
        }
    }
}

/// GIF file header (signature, version and logical screen descriptor follow)
#[derive(Debug)]
pub struct Header {
    version: [u8; 3],
}

impl Header {
    /// Size of the header block in bytes
    pub(crate) const SIZE: usize = 6;

    /// Decode a header from a buffer.
    ///
    /// The signature is matched case-insensitively; only versions `87a` and
    /// `89a` are accepted.
    pub(crate) fn from_buf(buf: &[u8]) -> Result<Self> {
        assert_eq!(buf.len(), Self::SIZE);
        if !buf[..3].eq_ignore_ascii_case(b"GIF") {
            return Err(Error::MalformedHeader);
        }
        let version = [buf[3], buf[4], buf[5]];
        match &version {
            b"87a" | b"89a" => Ok(Header { version }),
            _ => Err(Error::UnsupportedVersion(version)),
        }
    }

    /// Get the version tag
    pub fn version(&self) -> [u8; 3] {
        self.version
    }
}

/// Logical screen descriptor
#[derive(Debug, Default)]
pub struct LogicalScreenDesc {
    screen_width: u16,
    screen_height: u16,
    flags: u8,
    background_color_idx: u8,
    pixel_aspect_ratio: u8,
}

impl LogicalScreenDesc {
    /// Size of the descriptor block in bytes
    pub(crate) const SIZE: usize = 7;

    const COLOR_TABLE_PRESENT: u8 = 0b1000_0000;
    const COLOR_RESOLUTION: u8 = 0b0111_0000;
    const COLOR_TABLE_ORDERING: u8 = 0b0000_1000;
    const COLOR_TABLE_SIZE: u8 = 0b0000_0111;

    /// Decode a logical screen descriptor from a buffer
    pub(crate) fn from_buf(buf: &[u8]) -> Result<Self> {
        assert_eq!(buf.len(), Self::SIZE);
        Ok(LogicalScreenDesc {
            screen_width: u16::from_le_bytes([buf[0], buf[1]]),
            screen_height: u16::from_le_bytes([buf[2], buf[3]]),
            flags: buf[4],
            background_color_idx: buf[5],
            pixel_aspect_ratio: buf[6],
        })
    }

    /// Get the screen width
    pub fn screen_width(&self) -> u16 {
        self.screen_width
    }

    /// Get the screen height
    pub fn screen_height(&self) -> u16 {
        self.screen_height
    }

    /// Check whether a global color table is present
    pub fn color_table_present(&self) -> bool {
        self.flags & Self::COLOR_TABLE_PRESENT != 0
    }

    /// Get the color resolution (not used for decoding)
    pub fn color_resolution(&self) -> u16 {
        2 << ((self.flags & Self::COLOR_RESOLUTION) >> 4)
    }

    /// Check whether the global color table is sorted
    pub fn color_table_sorted(&self) -> bool {
        self.flags & Self::COLOR_TABLE_ORDERING != 0
    }

    /// Get the number of global color table entries (when present)
    pub fn color_table_entries(&self) -> usize {
        match self.color_table_present() {
            true => 2 << (self.flags & Self::COLOR_TABLE_SIZE),
            false => 0,
        }
    }

    /// Get the background color index
    pub fn background_color_idx(&self) -> u8 {
        self.background_color_idx
    }

    /// Get the pixel aspect ratio
    pub fn pixel_aspect_ratio(&self) -> u8 {
        self.pixel_aspect_ratio
    }
}

/// Image descriptor for one frame
#[derive(Debug, Default)]
pub struct ImageDesc {
    left: i16,
    top: i16,
    width: u16,
    height: u16,
    flags: u8,
}

impl ImageDesc {
    /// Size of the descriptor in bytes (after the image separator)
    pub(crate) const SIZE: usize = 9;

    const COLOR_TABLE_PRESENT: u8 = 0b1000_0000;
    const INTERLACED: u8 = 0b0100_0000;
    const COLOR_TABLE_ORDERING: u8 = 0b0010_0000;
    const COLOR_TABLE_SIZE: u8 = 0b0000_0111;

    /// Decode an image descriptor from a buffer
    pub(crate) fn from_buf(buf: &[u8]) -> Result<Self> {
        assert_eq!(buf.len(), Self::SIZE);
        Ok(ImageDesc {
            left: i16::from_le_bytes([buf[0], buf[1]]),
            top: i16::from_le_bytes([buf[2], buf[3]]),
            width: u16::from_le_bytes([buf[4], buf[5]]),
            height: u16::from_le_bytes([buf[6], buf[7]]),
            flags: buf[8],
        })
    }

    /// Get the left position
    pub fn left(&self) -> i16 {
        self.left
    }

    /// Get the top position
    pub fn top(&self) -> i16 {
        self.top
    }

    /// Get the width
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Get the height
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Check whether the frame is interlaced
    pub fn interlaced(&self) -> bool {
        self.flags & Self::INTERLACED != 0
    }

    /// Check whether the local color table is sorted
    pub fn color_table_sorted(&self) -> bool {
        self.flags & Self::COLOR_TABLE_ORDERING != 0
    }

    /// Check whether a local color table is present
    pub fn color_table_present(&self) -> bool {
        self.flags & Self::COLOR_TABLE_PRESENT != 0
    }

    /// Get the number of local color table entries (when present)
    pub fn color_table_entries(&self) -> usize {
        match self.color_table_present() {
            true => 2 << (self.flags & Self::COLOR_TABLE_SIZE),
            false => 0,
        }
    }

    /// Get the image size in pixels
    pub fn image_sz(&self) -> usize {
        usize::from(self.width) * usize::from(self.height)
    }
}

/// Frame disposal method
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DisposalMethod {
    /// No disposal specified
    NoAction,
    /// Keep the frame in place
    Keep,
    /// Restore to background color
    Background,
    /// Restore to previous frame
    Previous,
    /// Reserved values
    Reserved(u8),
}

impl Default for DisposalMethod {
    fn default() -> Self {
        DisposalMethod::NoAction
    }
}

impl From<u8> for DisposalMethod {
    fn from(n: u8) -> Self {
        match n & 0b0111 {
            0 => DisposalMethod::NoAction,
            1 => DisposalMethod::Keep,
            2 => DisposalMethod::Background,
            3 => DisposalMethod::Previous,
            _ => DisposalMethod::Reserved(n),
        }
    }
}

/// Graphic control extension block.
///
/// Parsed once per occurrence; its transparency setting applies to the
/// *next* image block only.
#[derive(Debug, Default)]
pub struct GraphicControl {
    flags: u8,
    delay_time_cs: u16,
    transparent_color_idx: u8,
}

impl GraphicControl {
    const DISPOSAL_METHOD: u8 = 0b0001_1100;
    const USER_INPUT: u8 = 0b0000_0010;
    const TRANSPARENT_COLOR: u8 = 0b0000_0001;

    /// Decode a graphic control block from a buffer
    pub(crate) fn from_buf(buf: &[u8]) -> Result<Self> {
        if buf.len() != 4 {
            return Err(Error::MalformedGraphicControl);
        }
        Ok(GraphicControl {
            flags: buf[0],
            delay_time_cs: u16::from_le_bytes([buf[1], buf[2]]),
            transparent_color_idx: buf[3],
        })
    }

    /// Get the disposal method
    pub fn disposal_method(&self) -> DisposalMethod {
        ((self.flags & Self::DISPOSAL_METHOD) >> 2).into()
    }

    /// Get the user input flag
    pub fn user_input(&self) -> bool {
        self.flags & Self::USER_INPUT != 0
    }

    /// Get the delay time in centiseconds
    pub fn delay_time_cs(&self) -> u16 {
        self.delay_time_cs
    }

    /// Get the transparent color index, if transparency is enabled
    pub fn transparent_color(&self) -> Option<u8> {
        if self.flags & Self::TRANSPARENT_COLOR != 0 {
            Some(self.transparent_color_idx)
        } else {
            None
        }
    }
}
