// lib.rs      gifex crate.
//
// Copyright (c) 2026  Douglas Lau
//
//! Extract GIF frames into standalone indexed-color PNG files.
//!
//! Decoding walks the GIF block structure with a forward-only cursor,
//! reassembles each frame's sub-block-framed LZW stream, and pairs the
//! decoded palette indices with the frame's active color table.  Encoding
//! writes one PNG per frame: IHDR, PLTE, optional tRNS, deflated IDAT and
//! IEND chunks, each with its CRC-32.
#[macro_use]
extern crate log;

pub mod block;
mod decode;
mod encode;
mod error;
mod lzw;
mod palette;
mod reader;

pub use crate::decode::{Decoder, Frame, Frames, Preamble};
pub use crate::encode::PngEncoder;
pub use crate::error::{Error, Result};
pub use crate::palette::{Palette, Rgb};
