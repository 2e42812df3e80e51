// palette.rs
//
// Copyright (c) 2026  Douglas Lau
//
//! Color tables for indexed frames
use crate::error::{Error, Result};

/// Number of bytes per color table entry
const CHANNELS: usize = 3;

/// One RGB color table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    /// Red component
    pub red: u8,
    /// Green component
    pub green: u8,
    /// Blue component
    pub blue: u8,
}

/// An ordered color table of RGB entries.
///
/// Entry counts are a power of two between 2 and 256.  A frame's active
/// palette is either the local color table of its image block or the global
/// color table of the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Palette {
    entries: Vec<Rgb>,
}

impl Rgb {
    /// Create an RGB entry
    pub fn new(red: u8, green: u8, blue: u8) -> Self {
        Rgb { red, green, blue }
    }
}

impl Palette {
    /// Decode a color table from raw bytes.
    ///
    /// The buffer must contain exactly `n_entries` contiguous R, G, B
    /// triples, or `MalformedColorTable` is returned.
    pub fn decode(buf: &[u8], n_entries: usize) -> Result<Self> {
        if buf.len() != n_entries * CHANNELS {
            return Err(Error::MalformedColorTable);
        }
        let entries = buf
            .chunks_exact(CHANNELS)
            .map(|c| Rgb::new(c[0], c[1], c[2]))
            .collect();
        Ok(Palette { entries })
    }

    /// Encode the color table as raw bytes (3 per entry, R, G, B order)
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.entries.len() * CHANNELS);
        for e in &self.entries {
            buf.push(e.red);
            buf.push(e.green);
            buf.push(e.blue);
        }
        buf
    }

    /// Get the number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get one entry
    pub fn entry(&self, i: usize) -> Option<Rgb> {
        self.entries.get(i).copied()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trip() {
        let buf = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12];
        let p = Palette::decode(&buf, 4).unwrap();
        assert_eq!(p.len(), 4);
        assert_eq!(p.entry(0), Some(Rgb::new(1, 2, 3)));
        assert_eq!(p.entry(3), Some(Rgb::new(10, 11, 12)));
        let enc = p.encode();
        assert_eq!(enc.len(), 3 * p.len());
        assert_eq!(enc, buf);
        assert_eq!(Palette::decode(&enc, 4).unwrap(), p);
    }

    #[test]
    fn length_mismatch() {
        let buf = [0; 11];
        assert!(matches!(
            Palette::decode(&buf, 4),
            Err(Error::MalformedColorTable)
        ));
        assert!(matches!(
            Palette::decode(&buf[..6], 4),
            Err(Error::MalformedColorTable)
        ));
    }

    #[test]
    fn empty() {
        let p = Palette::default();
        assert!(p.is_empty());
        assert_eq!(p.encode(), vec![]);
        assert_eq!(p.entry(0), None);
    }
}
