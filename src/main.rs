// main.rs      gifex command
//
// Copyright (c) 2026  Douglas Lau
//
#![forbid(unsafe_code)]

use clap::{App, Arg};
use gifex::{Decoder, Frame, PngEncoder};
use std::error::Error;
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Crate version
const VERSION: &str = std::env!("CARGO_PKG_VERSION");

/// Main entry point
fn main() -> Result<(), Box<dyn Error>> {
    env_logger::builder().format_timestamp(None).init();
    let matches = create_app().get_matches();
    let path = matches.value_of_os("file").unwrap();
    let mut out = StandardStream::stdout(ColorChoice::Always);
    let res = extract(&mut out, Path::new(path));
    out.reset()?;
    res
}

/// Create clap App
fn create_app() -> App<'static, 'static> {
    App::new("gifex")
        .version(VERSION)
        .about("Extract GIF frames into indexed-color PNG images")
        .arg(Arg::with_name("file").required(true).help("input GIF file"))
}

/// Extract all frames of one GIF file
fn extract(
    out: &mut StandardStream,
    path: &Path,
) -> Result<(), Box<dyn Error>> {
    let mut magenta = ColorSpec::new();
    magenta.set_fg(Some(Color::Magenta));
    let mut bold = ColorSpec::new();
    bold.set_fg(Some(Color::White))
        .set_intense(true)
        .set_bold(true);
    let mut dflt = ColorSpec::new();
    dflt.set_fg(Some(Color::White));
    let stem = path
        .file_stem()
        .unwrap_or_else(|| OsStr::new("frames"))
        .to_string_lossy()
        .to_string();
    let dir = PathBuf::from(&stem);
    fs::create_dir_all(&dir)?;
    let mut frames = Decoder::new(File::open(path)?).into_frames();
    {
        let preamble = frames.preamble()?;
        let version = String::from_utf8_lossy(&preamble.header.version())
            .to_string();
        out.set_color(&magenta)?;
        writeln!(out, "{}", path.display())?;
        out.set_color(&bold)?;
        write!(
            out,
            "GIF{}, screen: {}x{}",
            version,
            preamble.screen_width(),
            preamble.screen_height()
        )?;
        match &preamble.global_palette {
            Some(p) => writeln!(out, ", {} global colors", p.len())?,
            None => writeln!(out, ", no global palette")?,
        }
    }
    let mut n_frames = 0;
    for frame in &mut frames {
        let frame = frame?;
        n_frames += 1;
        let file = dir.join(format!("{}-{}.png", stem, n_frames));
        write_frame(&frame, &file)?;
        out.set_color(&dflt)?;
        write!(out, "  {}", file.display())?;
        write!(out, " {}x{}", frame.width, frame.height)?;
        write!(out, " {} colors", frame.palette.len())?;
        if let Some(idx) = frame.transparent_color {
            write!(out, " transparent: {}", idx)?;
        }
        writeln!(out)?;
    }
    out.set_color(&bold)?;
    writeln!(out, "extracted {} frame(s)", n_frames)?;
    Ok(())
}

/// Write one frame as a PNG file
fn write_frame(frame: &Frame, path: &Path) -> gifex::Result<()> {
    let file = File::create(path)?;
    PngEncoder::new(file).encode(frame)
}
