//! ASCII PGM/PPM (P2/P3) support.
//!
//! # Layout
//!
//! ```text
//! P3            <- tag: P2 grayscale, P3 rgb
//! 4 2           <- width height
//! 255           <- max value
//! 255 0 0 0 255 0 ...   <- samples, row-major, RGB interleaved
//! ```
//!
//! The reader is whitespace-agnostic: any mix of spaces, tabs and newlines
//! separates tokens. Comment lines (`#`) are not part of the accepted
//! dialect and are reported as malformed header fields. Extra tokens after
//! the last sample are ignored.
//!
//! # Example
//!
//! ```rust
//! use pnmconv_io::pnm;
//!
//! let img = pnm::decode(b"P2\n2 1\n10\n3 42\n").unwrap();
//! assert_eq!(img.samples(), &[3, 10]); // 42 clamped to max value
//! ```

use crate::{ImageReader, ImageWriter, IoError, IoResult};
use pnmconv_core::{Image, ImageFormat, MAX_SAMPLE_VALUE};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::num::IntErrorKind;
use std::path::Path;
use std::str::FromStr;
#[allow(unused_imports)]
use tracing::{debug, trace, warn};

/// Samples written per output line.
pub const SAMPLES_PER_LINE: usize = 12;

/// Codec for the ASCII pixel-map variants.
#[derive(Debug, Clone, Copy, Default)]
pub struct PnmCodec;

impl ImageReader for PnmCodec {
    fn read<P: AsRef<Path>>(&self, path: P) -> IoResult<Image> {
        read(path)
    }

    fn read_from_memory(&self, data: &[u8]) -> IoResult<Image> {
        decode(data)
    }
}

impl ImageWriter for PnmCodec {
    fn write<P: AsRef<Path>>(&self, path: P, image: &Image) -> IoResult<()> {
        write(path, image)
    }

    fn write_to_memory(&self, image: &Image) -> IoResult<Vec<u8>> {
        let mut buf = Vec::with_capacity(image.len() * 4 + 32);
        encode(&mut buf, image)?;
        Ok(buf)
    }
}

/// Reads a P2/P3 file from the given path.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<Image> {
    let path = path.as_ref();
    trace!(path = %path.display(), "pnm::read");
    let data = fs::read(path)?;
    decode(&data)
}

/// Writes an image to a P2/P3 file, replacing any existing file.
pub fn write<P: AsRef<Path>>(path: P, image: &Image) -> IoResult<()> {
    let path = path.as_ref();
    trace!(path = %path.display(), ?image, "pnm::write");
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    encode(&mut writer, image)?;
    writer.flush()?;
    Ok(())
}

/// Decodes a P2/P3 image held in memory.
///
/// Every sample is clamped into `[0, max_value]`; values outside that range
/// are corrected, not rejected.
pub fn decode(data: &[u8]) -> IoResult<Image> {
    let mut tokens = Tokens::new(data);

    let tag = tokens
        .next()
        .ok_or_else(|| IoError::InvalidHeader("missing format tag".into()))?;
    let format = std::str::from_utf8(tag)
        .ok()
        .and_then(ImageFormat::from_tag)
        .ok_or_else(|| IoError::UnsupportedFormat(lossy(tag)))?;

    let width = header_field(&mut tokens, "width")?;
    let height = header_field(&mut tokens, "height")?;
    let max_value = header_field(&mut tokens, "max value")?;
    if max_value > MAX_SAMPLE_VALUE {
        return Err(IoError::InvalidHeader(format!(
            "max value {max_value} exceeds {MAX_SAMPLE_VALUE}"
        )));
    }
    debug!(%format, width, height, max_value, "pnm header");

    let mut samples = Image::sample_buffer(format, width, height)?;
    let expected = width as usize * height as usize * format.channels();
    let mut clamped = 0usize;

    for index in 0..expected {
        let token = tokens.next().ok_or(IoError::Truncated {
            expected,
            actual: index,
        })?;
        let raw = parse_sample(token).ok_or_else(|| IoError::InvalidSample {
            index,
            token: lossy(token),
        })?;
        let value = raw.clamp(0, i64::from(max_value));
        if value != raw {
            clamped += 1;
        }
        samples.push(value as u32);
    }

    if clamped > 0 {
        warn!(clamped, max_value, "clamped out-of-range samples");
    }

    Ok(Image::from_samples(format, width, height, max_value, samples)?)
}

/// Encodes an image as P2/P3 text.
///
/// Header fields go on their own lines; samples follow single-space
/// separated, [`SAMPLES_PER_LINE`] per line, each line newline-terminated.
pub fn encode<W: Write>(writer: &mut W, image: &Image) -> IoResult<()> {
    writeln!(writer, "{}", image.format().tag())?;
    writeln!(writer, "{} {}", image.width(), image.height())?;
    writeln!(writer, "{}", image.max_value())?;

    for line in image.samples().chunks(SAMPLES_PER_LINE) {
        if let Some((first, rest)) = line.split_first() {
            write!(writer, "{first}")?;
            for v in rest {
                write!(writer, " {v}")?;
            }
            writeln!(writer)?;
        }
    }
    Ok(())
}

fn header_field(tokens: &mut Tokens<'_>, name: &str) -> IoResult<u32> {
    let token = tokens
        .next()
        .ok_or_else(|| IoError::InvalidHeader(format!("missing {name}")))?;
    let value: u32 = parse(token).ok_or_else(|| {
        IoError::InvalidHeader(format!(
            "{name}: expected a positive integer, got {:?}",
            lossy(token)
        ))
    })?;
    if value == 0 {
        return Err(IoError::InvalidHeader(format!("{name} must be > 0")));
    }
    Ok(value)
}

fn parse<T: FromStr>(token: &[u8]) -> Option<T> {
    std::str::from_utf8(token).ok()?.parse().ok()
}

/// Parses a sample, saturating integers too large for `i64` so they clamp
/// like any other out-of-range value.
fn parse_sample(token: &[u8]) -> Option<i64> {
    match std::str::from_utf8(token).ok()?.parse::<i64>() {
        Ok(v) => Some(v),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Some(i64::MAX),
            IntErrorKind::NegOverflow => Some(i64::MIN),
            _ => None,
        },
    }
}

fn lossy(token: &[u8]) -> String {
    String::from_utf8_lossy(token).into_owned()
}

/// Whitespace-separated tokens of a byte buffer.
struct Tokens<'a> {
    rest: &'a [u8],
}

impl<'a> Tokens<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { rest: data }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        let start = self.rest.iter().position(|&b| !is_space(b))?;
        let rest = &self.rest[start..];
        let end = rest.iter().position(|&b| is_space(b)).unwrap_or(rest.len());
        let (token, tail) = rest.split_at(end);
        self.rest = tail;
        Some(token)
    }
}

// Matches C `isspace`, which also treats vertical tab as a separator.
#[inline]
fn is_space(b: u8) -> bool {
    b.is_ascii_whitespace() || b == 0x0b
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn decode_grayscale() {
        let img = decode(b"P2\n3 2\n255\n0 1 2\n3 4 5\n").unwrap();
        assert_eq!(img.format(), ImageFormat::Grayscale);
        assert_eq!((img.width(), img.height()), (3, 2));
        assert_eq!(img.max_value(), 255);
        assert_eq!(img.samples(), &[0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn decode_rgb_interleaved() {
        let img = decode(b"P3\n2 1\n255\n255 0 0  0 0 255\n").unwrap();
        assert_eq!(img.format(), ImageFormat::Rgb);
        assert_eq!(img.channels(), 3);
        assert_eq!(img.samples(), &[255, 0, 0, 0, 0, 255]);
    }

    #[test]
    fn decode_any_whitespace_layout() {
        let canonical = decode(b"P2\n2 2\n9\n1 2\n3 4\n").unwrap();
        let squashed = decode(b"P2 2 2 9 1 2 3 4").unwrap();
        let messy = decode(b"  P2\r\n2\t2\r\n\n9\r\n1\n2\n\t3    4\r\n").unwrap();
        assert_eq!(canonical, squashed);
        assert_eq!(canonical, messy);
    }

    #[test]
    fn decode_clamps_out_of_range_samples() {
        let img = decode(b"P2\n4 1\n100\n-5 0 100 250\n").unwrap();
        assert_eq!(img.samples(), &[0, 0, 100, 100]);
    }

    #[test]
    fn decode_saturates_huge_samples() {
        let img = decode(b"P2\n3 1\n255\n99999999999999999999 -99999999999999999999 +7\n").unwrap();
        assert_eq!(img.samples(), &[255, 0, 7]);
    }

    #[test]
    fn decode_rejects_max_value_above_16_bits() {
        let err = decode(b"P2 1 1 65536 0").unwrap_err();
        assert!(matches!(err, IoError::InvalidHeader(ref msg) if msg.contains("65536")), "{err}");

        let img = decode(b"P2 1 1 65535 70000").unwrap();
        assert_eq!(img.samples(), &[65535]);
    }

    #[test]
    fn decode_ignores_trailing_tokens() {
        let img = decode(b"P2\n1 1\n255\n7 8 9 garbage\n").unwrap();
        assert_eq!(img.samples(), &[7]);
    }

    #[test]
    fn decode_rejects_unknown_tag() {
        let cases: [&[u8]; 3] = [b"P6\n1 1\n255\n0\n", b"P5 1 1 255 0", b"P2x 1 1 255 0"];
        for input in cases {
            let err = decode(input).unwrap_err();
            assert!(matches!(err, IoError::UnsupportedFormat(_)), "{err}");
            assert!(err.is_format_error());
        }
    }

    #[test]
    fn decode_rejects_bad_header() {
        let cases: [&[u8]; 6] = [
            b"",
            b"P2\n",
            b"P2\n0 3\n255\n",
            b"P2\n3 3\n0\n",
            b"P2\n# comment\n3 3\n255\n",
            b"P2\n-3 3\n255\n",
        ];
        for input in cases {
            let err = decode(input).unwrap_err();
            assert!(
                matches!(err, IoError::InvalidHeader(_)),
                "{:?} -> {err}",
                String::from_utf8_lossy(input)
            );
        }
    }

    #[test]
    fn decode_truncated_samples() {
        let err = decode(b"P2\n3 3\n255\n1 2 3 4 5\n").unwrap_err();
        assert!(matches!(
            err,
            IoError::Truncated {
                expected: 9,
                actual: 5
            }
        ));
        assert!(err.is_format_error());
    }

    #[test]
    fn decode_non_integer_sample() {
        let err = decode(b"P2\n2 1\n255\n1 x\n").unwrap_err();
        match err {
            IoError::InvalidSample { index, token } => {
                assert_eq!(index, 1);
                assert_eq!(token, "x");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn encode_wraps_at_twelve() {
        let samples: Vec<u32> = (1..=15).collect();
        let img = Image::from_samples(ImageFormat::Grayscale, 5, 3, 255, samples).unwrap();
        let text = String::from_utf8(PnmCodec.write_to_memory(&img).unwrap()).unwrap();
        assert_eq!(
            text,
            "P2\n5 3\n255\n1 2 3 4 5 6 7 8 9 10 11 12\n13 14 15\n"
        );
    }

    #[test]
    fn encode_exact_multiple_has_no_blank_line() {
        let img = Image::from_samples(ImageFormat::Rgb, 2, 2, 9, vec![1; 12]).unwrap();
        let text = String::from_utf8(PnmCodec.write_to_memory(&img).unwrap()).unwrap();
        assert_eq!(text, "P3\n2 2\n9\n1 1 1 1 1 1 1 1 1 1 1 1\n");
    }

    #[test]
    fn file_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("roundtrip.ppm");

        let samples: Vec<u32> = (0..5 * 4 * 3).map(|i| (i * 37) % 1024).collect();
        let image = Image::from_samples(ImageFormat::Rgb, 5, 4, 1023, samples).unwrap();

        write(&path, &image).expect("PPM write failed");
        let loaded = read(&path).expect("PPM read failed");
        assert_eq!(loaded, image);
    }

    #[test]
    fn read_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = read(dir.path().join("absent.pgm")).unwrap_err();
        assert!(matches!(err, IoError::Io(_)));
        assert!(!err.is_format_error());
    }

    #[test]
    fn write_into_missing_directory_is_io_error() {
        let dir = tempdir().unwrap();
        let img = Image::new(ImageFormat::Grayscale, 1, 1, 255).unwrap();
        let err = write(dir.path().join("no/such/dir/out.pgm"), &img).unwrap_err();
        assert!(matches!(err, IoError::Io(_)));
    }
}
