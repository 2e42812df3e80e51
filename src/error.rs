// error.rs
//
// Copyright (c) 2026  Douglas Lau
//
use std::fmt;
use std::io;

/// Errors encountered while decoding GIF data or encoding PNG files
#[derive(Debug)]
pub enum Error {
    /// A wrapped I/O error.
    Io(io::Error),
    /// [Header](block/struct.Header.html) block malformed or missing.
    MalformedHeader,
    /// GIF version not supported (87a or 89a only).
    UnsupportedVersion([u8; 3]),
    /// Invalid top-level block code (signature).
    InvalidBlockCode(u8),
    /// Extension label not defined by the GIF specification.
    UnknownExtension(u8),
    /// [GraphicControl](block/struct.GraphicControl.html) block has invalid
    /// length.
    MalformedGraphicControl,
    /// Color table length does not match its declared entry count.
    MalformedColorTable,
    /// LZW minimum code size out of range.
    InvalidCodeSize,
    /// Compressed LZW data invalid or corrupt.
    InvalidLzwData,
    /// Stream ended in the middle of a block (distinct from clean EOF).
    UnexpectedEndOfFile,
    /// LZW stream ended before a full frame was produced.
    IncompleteFrameData,
    /// No local or global color table available for a frame.
    MissingColorTable,
}

/// Gifex result type
pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => err.fmt(fmt),
            _ => fmt::Debug::fmt(self, fmt),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            Error::Io(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        // short reads within a declared block are truncation, not I/O
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Error::UnexpectedEndOfFile
        } else {
            Error::Io(err)
        }
    }
}
