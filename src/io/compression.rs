//! Transparent compression for source and output files.
//!
//! A codec is selected by file suffix first (`.gz`, `.zst`, `.bz2`, `.xz`)
//! and, for sources only, by magic bytes when the suffix is not recognised.
//! Each codec sits behind its own cargo feature; with none enabled every
//! file is read and written as plain text.
//!
//! Decompressing streams cannot seek. Callers that need a second pass over a
//! source re-open it through [`open_reader`] instead of rewinding.
//!
//! Writers are closed with [`FinishWrite::finish`], which writes the codec
//! trailer and flushes down to the file. Dropping a writer instead discards
//! any error from those last writes.

use crate::error::{IoContext, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// A compression format that can wrap a byte stream in both directions.
pub trait Codec: Send + Sync {
    fn name(&self) -> &'static str;

    /// Lowercase suffixes including the leading dot.
    fn suffixes(&self) -> &'static [&'static str];

    /// Leading bytes that identify a stream in this format.
    fn magic(&self) -> &'static [u8];

    fn decoder(&self, reader: Box<dyn Read>) -> io::Result<Box<dyn Read>>;

    fn encoder(&self, writer: BufWriter<File>) -> io::Result<Box<dyn FinishWrite>>;
}

/// A writer that has to be closed explicitly for its last errors to surface.
pub trait FinishWrite: Write {
    /// Write any trailer, flush everything and close the stream.
    fn finish(self: Box<Self>) -> io::Result<()>;
}

impl<W: Write> FinishWrite for BufWriter<W> {
    fn finish(self: Box<Self>) -> io::Result<()> {
        let mut w = *self;
        w.flush()
    }
}

static CODECS: &[&dyn Codec] = &[
    #[cfg(feature = "compression-gzip")]
    &Gzip,
    #[cfg(feature = "compression-zstd")]
    &Zstd,
    #[cfg(feature = "compression-bzip2")]
    &Bzip2,
    #[cfg(feature = "compression-xz")]
    &Xz,
];

/// Codecs compiled into this build.
#[must_use]
pub fn available_codecs() -> &'static [&'static dyn Codec] {
    CODECS
}

/// Codec whose suffix ends `path`, compared case-insensitively.
#[must_use]
pub fn codec_for_path(path: &Path) -> Option<&'static dyn Codec> {
    let name = path.file_name()?.to_string_lossy().to_lowercase();
    CODECS
        .iter()
        .copied()
        .find(|c| c.suffixes().iter().any(|s| name.ends_with(s)))
}

fn codec_for_magic(head: &[u8]) -> Option<&'static dyn Codec> {
    CODECS
        .iter()
        .copied()
        .find(|c| !c.magic().is_empty() && head.starts_with(c.magic()))
}

/// Split a file name into its stem and its full extension.
///
/// A codec suffix is kept together with the extension in front of it, so
/// `data.csv.gz` yields `("data", ".csv.gz")` while `data.csv` yields
/// `("data", ".csv")`. Names without an extension yield an empty one.
#[must_use]
pub fn split_file_name(path: &Path) -> (String, String) {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let codec_len = codec_for_path(path)
        .and_then(|c| {
            let lower = name.to_lowercase();
            c.suffixes().iter().find(|s| lower.ends_with(*s)).map(|s| s.len())
        })
        .unwrap_or(0);
    let cut = name.len().saturating_sub(codec_len);
    let cut = if name.is_char_boundary(cut) { cut } else { name.len() };
    let (base, codec_suffix) = name.split_at(cut);
    match base.rfind('.') {
        Some(dot) if dot > 0 => (
            base[..dot].to_string(),
            format!("{}{codec_suffix}", &base[dot..]),
        ),
        _ => (base.to_string(), codec_suffix.to_string()),
    }
}

/// Open `path` for reading, decompressing when a codec applies.
///
/// # Errors
/// Fails when the file cannot be opened or the decoder cannot be set up.
pub fn open_reader(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path).at(path)?;
    if let Some(codec) = codec_for_path(path) {
        return codec.decoder(Box::new(BufReader::new(file))).at(path);
    }
    let mut buffered = BufReader::new(file);
    let head = buffered.fill_buf().at(path)?;
    if let Some(codec) = codec_for_magic(head) {
        tracing::debug!(path = %path.display(), codec = codec.name(), "detected codec from magic bytes");
        return codec.decoder(Box::new(buffered)).at(path);
    }
    Ok(Box::new(buffered))
}

/// Create (or truncate) `path` for writing, compressing when its suffix names a codec.
///
/// # Errors
/// Fails when the file cannot be created or the encoder cannot be set up.
pub fn create_writer(path: &Path) -> Result<Box<dyn FinishWrite>> {
    let file = BufWriter::new(File::create(path).at(path)?);
    match codec_for_path(path) {
        Some(codec) => codec.encoder(file).at(path),
        None => Ok(Box::new(file)),
    }
}

#[cfg(feature = "compression-gzip")]
struct Gzip;

#[cfg(feature = "compression-gzip")]
impl Codec for Gzip {
    fn name(&self) -> &'static str {
        "gzip"
    }

    fn suffixes(&self) -> &'static [&'static str] {
        &[".gz", ".gzip"]
    }

    fn magic(&self) -> &'static [u8] {
        &[0x1f, 0x8b]
    }

    fn decoder(&self, reader: Box<dyn Read>) -> io::Result<Box<dyn Read>> {
        Ok(Box::new(flate2::read::MultiGzDecoder::new(reader)))
    }

    fn encoder(&self, writer: BufWriter<File>) -> io::Result<Box<dyn FinishWrite>> {
        Ok(Box::new(flate2::write::GzEncoder::new(
            writer,
            flate2::Compression::default(),
        )))
    }
}

#[cfg(feature = "compression-gzip")]
impl<W: Write> FinishWrite for flate2::write::GzEncoder<W> {
    fn finish(self: Box<Self>) -> io::Result<()> {
        flate2::write::GzEncoder::finish(*self)?.flush()
    }
}

#[cfg(feature = "compression-zstd")]
struct Zstd;

#[cfg(feature = "compression-zstd")]
impl Codec for Zstd {
    fn name(&self) -> &'static str {
        "zstd"
    }

    fn suffixes(&self) -> &'static [&'static str] {
        &[".zst", ".zstd"]
    }

    fn magic(&self) -> &'static [u8] {
        &[0x28, 0xb5, 0x2f, 0xfd]
    }

    fn decoder(&self, reader: Box<dyn Read>) -> io::Result<Box<dyn Read>> {
        zstd::stream::read::Decoder::new(reader).map(|d| Box::new(d) as Box<dyn Read>)
    }

    fn encoder(&self, writer: BufWriter<File>) -> io::Result<Box<dyn FinishWrite>> {
        zstd::stream::write::Encoder::new(writer, 3).map(|e| Box::new(e) as Box<dyn FinishWrite>)
    }
}

#[cfg(feature = "compression-zstd")]
impl<W: Write> FinishWrite for zstd::stream::write::Encoder<'static, W> {
    fn finish(self: Box<Self>) -> io::Result<()> {
        zstd::stream::write::Encoder::finish(*self)?.flush()
    }
}

#[cfg(feature = "compression-bzip2")]
struct Bzip2;

#[cfg(feature = "compression-bzip2")]
impl Codec for Bzip2 {
    fn name(&self) -> &'static str {
        "bzip2"
    }

    fn suffixes(&self) -> &'static [&'static str] {
        &[".bz2", ".bzip2"]
    }

    // "BZ" alone collides with ordinary text headers.
    fn magic(&self) -> &'static [u8] {
        b"BZh"
    }

    fn decoder(&self, reader: Box<dyn Read>) -> io::Result<Box<dyn Read>> {
        Ok(Box::new(bzip2::read::MultiBzDecoder::new(reader)))
    }

    fn encoder(&self, writer: BufWriter<File>) -> io::Result<Box<dyn FinishWrite>> {
        Ok(Box::new(bzip2::write::BzEncoder::new(
            writer,
            bzip2::Compression::default(),
        )))
    }
}

#[cfg(feature = "compression-bzip2")]
impl<W: Write> FinishWrite for bzip2::write::BzEncoder<W> {
    fn finish(self: Box<Self>) -> io::Result<()> {
        bzip2::write::BzEncoder::finish(*self)?.flush()
    }
}

#[cfg(feature = "compression-xz")]
struct Xz;

#[cfg(feature = "compression-xz")]
impl Codec for Xz {
    fn name(&self) -> &'static str {
        "xz"
    }

    fn suffixes(&self) -> &'static [&'static str] {
        &[".xz"]
    }

    fn magic(&self) -> &'static [u8] {
        &[0xfd, 0x37, 0x7a, 0x58, 0x5a, 0x00]
    }

    fn decoder(&self, reader: Box<dyn Read>) -> io::Result<Box<dyn Read>> {
        Ok(Box::new(xz2::read::XzDecoder::new_multi_decoder(reader)))
    }

    fn encoder(&self, writer: BufWriter<File>) -> io::Result<Box<dyn FinishWrite>> {
        Ok(Box::new(xz2::write::XzEncoder::new(writer, 6)))
    }
}

#[cfg(feature = "compression-xz")]
impl<W: Write> FinishWrite for xz2::write::XzEncoder<W> {
    fn finish(self: Box<Self>) -> io::Result<()> {
        xz2::write::XzEncoder::finish(*self)?.flush()
    }
}
