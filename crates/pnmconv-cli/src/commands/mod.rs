//! CLI command implementations

pub mod all;
pub mod filter;
pub mod info;
pub mod sequential;

use anyhow::{Context, Result};
use pnmconv_core::{Image, ImageFormat};
use pnmconv_ops::{FilterKind, Filtered, ParallelScheduler};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
#[allow(unused_imports)]
use tracing::{debug, info, trace};

/// Load image from path
pub fn load_image(path: &Path) -> Result<Image> {
    pnmconv_io::read(path).with_context(|| format!("Failed to load: {}", path.display()))
}

/// Save image to path
pub fn save_image(path: &Path, image: &Image) -> Result<()> {
    pnmconv_io::write(path, image).with_context(|| format!("Failed to save: {}", path.display()))
}

/// Parse a filter name given on the command line
pub fn parse_filter(name: &str) -> Result<FilterKind> {
    name.parse().with_context(|| format!("Invalid --filter value: {name}"))
}

/// Runs `scheduler` over `filters`, reporting the wall time of the run.
///
/// Only the scheduler call is timed; decoding and encoding are not.
pub fn run_timed(
    scheduler: &dyn ParallelScheduler,
    input: &Image,
    filters: &[FilterKind],
) -> Result<Vec<Filtered>> {
    let start = Instant::now();
    let outputs = scheduler
        .run(input, filters)
        .with_context(|| format!("{} scheduler failed", scheduler.name()))?;
    let ms = start.elapsed().as_secs_f64() * 1000.0;

    info!(scheduler = scheduler.name(), ?filters, ms, "filter time");
    println!("Filter time: {ms:.3} ms");
    Ok(outputs)
}

/// Writes every output through `namer` and prints where each one went.
pub fn save_outputs(namer: &mut OutputNamer, outputs: &[Filtered], variant: &str) -> Result<()> {
    for out in outputs {
        let path = namer.next_path(out.filter, variant);
        save_image(&path, &out.image)?;
        println!("OK -> {}", path.display());
    }
    Ok(())
}

/// Chooses collision-free output paths for one run.
///
/// Names look like `<stem>_<filter>_<variant>_<unix-secs>_<pid>_<n>.<ext>`,
/// where `n` counts from 1 within the run.
#[derive(Debug)]
pub struct OutputNamer {
    dir: PathBuf,
    stem: String,
    extension: &'static str,
    stamp: u64,
    pid: u32,
    counter: u32,
}

impl OutputNamer {
    /// Creates `dir` (and parents) if missing.
    pub fn new(dir: &Path, input: &Path, format: ImageFormat) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "image".to_string());
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        debug!(dir = %dir.display(), %stem, stamp, "output namer ready");

        Ok(Self {
            dir: dir.to_path_buf(),
            stem,
            extension: format.extension(),
            stamp,
            pid: process::id(),
            counter: 0,
        })
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the next path; never returns the same path twice.
    pub fn next_path(&mut self, filter: FilterKind, variant: &str) -> PathBuf {
        self.counter += 1;
        self.dir.join(format!(
            "{}_{}_{}_{}_{}_{}.{}",
            self.stem, filter, variant, self.stamp, self.pid, self.counter, self.extension
        ))
    }
}

/// Format file size for display
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pnmconv_ops::{KernelTasks, Sequential};
    use tempfile::tempdir;

    #[test]
    fn namer_creates_nested_directory() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("a/b/imgs_out");
        let namer = OutputNamer::new(&out, Path::new("in.pgm"), ImageFormat::Grayscale).unwrap();
        assert!(out.is_dir());
        assert_eq!(namer.dir(), out.as_path());
    }

    #[test]
    fn namer_paths_are_unique_and_shaped() {
        let dir = tempdir().unwrap();
        let mut namer =
            OutputNamer::new(dir.path(), Path::new("photos/cat.ppm"), ImageFormat::Rgb).unwrap();

        let first = namer.next_path(FilterKind::Blur, "rows");
        let second = namer.next_path(FilterKind::Blur, "rows");
        assert_ne!(first, second);
        assert_eq!(first.parent(), Some(dir.path()));

        let name = first.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("cat_blur_rows_"), "{name}");
        assert!(name.ends_with(&format!("_{}_1.ppm", process::id())), "{name}");

        let name = second.file_name().unwrap().to_str().unwrap();
        assert!(name.ends_with("_2.ppm"), "{name}");
    }

    #[test]
    fn namer_falls_back_without_stem() {
        let dir = tempdir().unwrap();
        let mut namer = OutputNamer::new(dir.path(), Path::new(""), ImageFormat::Grayscale).unwrap();
        let path = namer.next_path(FilterKind::Laplace, "tasks");
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("image_laplace_tasks_"), "{name}");
        assert!(name.ends_with(".pgm"), "{name}");
    }

    #[test]
    fn parse_filter_reports_name() {
        assert_eq!(parse_filter("Sharpen").unwrap(), FilterKind::Sharpen);
        let err = parse_filter("emboss").unwrap_err();
        assert!(format!("{err:#}").contains("emboss"));
    }

    #[test]
    fn run_and_save_writes_one_file_per_filter() {
        let dir = tempdir().unwrap();
        let img = Image::from_samples(ImageFormat::Grayscale, 3, 3, 255, vec![100; 9]).unwrap();
        let outputs = run_timed(&KernelTasks, &img, &FilterKind::ALL).unwrap();

        let mut namer = OutputNamer::new(dir.path(), Path::new("flat.pgm"), img.format()).unwrap();
        save_outputs(&mut namer, &outputs, KernelTasks.name()).unwrap();

        let mut written: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        written.sort();
        assert_eq!(written.len(), 3);

        let blur = written
            .iter()
            .find(|p| p.to_string_lossy().contains("_blur_tasks_"))
            .unwrap();
        assert_eq!(load_image(blur).unwrap(), img);
    }

    #[test]
    fn run_timed_keeps_filter_order() {
        let img = Image::new(ImageFormat::Grayscale, 1, 1, 255).unwrap();
        let filters = [FilterKind::Sharpen, FilterKind::Blur];
        let outputs = run_timed(&Sequential, &img, &filters).unwrap();
        let kinds: Vec<_> = outputs.iter().map(|f| f.filter).collect();
        assert_eq!(kinds, filters);
    }

    fn truncated_input(dir: &Path) -> PathBuf {
        let input = dir.join("short.pgm");
        fs::write(&input, "P2\n3 3\n255\n1 2 3 4 5\n").unwrap();
        input
    }

    #[test]
    fn malformed_input_creates_no_output_dir() {
        let dir = tempdir().unwrap();
        let input = truncated_input(dir.path());

        let out = dir.path().join("filter_out");
        let args = crate::FilterArgs {
            input: input.clone(),
            filter: "blur".into(),
            workers: 2,
            output: out.clone(),
        };
        let err = filter::run(args, false).unwrap_err();
        assert!(format!("{err:#}").contains("truncated"), "{err:#}");
        assert!(!out.exists());

        let out = dir.path().join("all_out");
        let args = crate::AllArgs {
            input: input.clone(),
            output: out.clone(),
        };
        assert!(all::run(args, false).is_err());
        assert!(!out.exists());

        let out = dir.path().join("seq_out");
        let args = crate::SequentialArgs {
            input,
            filter: "laplace".into(),
            output: out.clone(),
        };
        assert!(sequential::run(args, false).is_err());
        assert!(!out.exists());
    }

    #[test]
    fn filter_command_writes_one_file() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("flat.ppm");
        let image = Image::from_samples(ImageFormat::Rgb, 4, 3, 255, vec![100; 36]).unwrap();
        save_image(&input, &image).unwrap();

        let out = dir.path().join("imgs_out");
        let args = crate::FilterArgs {
            input,
            filter: "blur".into(),
            workers: 3,
            output: out.clone(),
        };
        filter::run(args, false).unwrap();

        let written: Vec<_> = fs::read_dir(&out).unwrap().map(|e| e.unwrap().path()).collect();
        assert_eq!(written.len(), 1);
        let name = written[0].file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("flat_blur_rows_"), "{name}");
        assert_eq!(load_image(&written[0]).unwrap(), image);
    }

    #[test]
    fn format_size_units() {
        assert_eq!(format_size(12), "12 B");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.00 MB");
    }
}
