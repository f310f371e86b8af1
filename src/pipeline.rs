//! Batch pipeline: EML files to records, records to feature lines
//!
//! Every stage is sequential and streams one message at a time. Output files
//! are JSON lines, opened once per stage, and each line is written whole and
//! flushed before the next message is processed.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Lines, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use rand::Rng;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::body::extract_body_features;
use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::headers::extract_header_features;
use crate::parser::parse_eml_file;
use crate::types::Record;

/// Characters of body text shown per message in debug mode
const DEBUG_BODY_PREVIEW: usize = 500;

/// Settings for the ingestion stage
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Only pick up files with this extension from input directories
    pub extension: Option<String>,
    /// Process a random contiguous window of this many files
    pub sample: Option<usize>,
    /// Truncate the output instead of appending
    pub overwrite: bool,
    /// Log header names and a body preview for every message
    pub debug: bool,
    /// Log throughput every this many messages (0 disables)
    pub progress_interval: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl IngestOptions {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            extension: config.input.extension.clone(),
            sample: None,
            overwrite: config.output.overwrite,
            debug: false,
            progress_interval: config.output.progress_interval,
        }
    }
}

/// Files produced by a full run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutputs {
    pub records: PathBuf,
    pub body_features: PathBuf,
    pub urls: PathBuf,
    pub header_features: PathBuf,
}

/// URL side file line
#[derive(Debug, Serialize)]
struct UrlLine<'a> {
    email_id: &'a str,
    #[serde(rename = "URLs")]
    urls: &'a [String],
}

/// Expand input arguments into the list of files to ingest
///
/// Files are taken as given. Directories contribute their regular files one
/// level deep, sorted by path, optionally restricted to one extension
/// (compared case-insensitively, without the leading dot).
pub fn collect_inputs(inputs: &[PathBuf], extension: Option<&str>) -> Result<Vec<PathBuf>> {
    let extension = extension.map(|ext| ext.trim_start_matches('.'));
    let mut files = Vec::new();

    for input in inputs {
        if !input.is_dir() {
            files.push(input.clone());
            continue;
        }

        let mut found = Vec::new();
        for entry in std::fs::read_dir(input).map_err(|e| PipelineError::io(input, e))? {
            let path = entry.map_err(|e| PipelineError::io(input, e))?.path();
            if !path.is_file() {
                continue;
            }
            let wanted = extension.is_none_or(|wanted| {
                path.extension()
                    .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(wanted))
            });
            if wanted {
                found.push(path);
            }
        }
        found.sort();

        info!("Input directory {}: {} files detected", input.display(), found.len());
        files.extend(found);
    }

    if files.is_empty() {
        return Err(PipelineError::NoInputs);
    }
    Ok(files)
}

/// Keep a contiguous window of `size` items starting at a random offset
///
/// Returns everything when `size` covers the whole list.
pub fn sample_window<T, R: Rng + ?Sized>(mut items: Vec<T>, size: usize, rng: &mut R) -> Vec<T> {
    if size >= items.len() {
        return items;
    }
    let start = rng.gen_range(0..=items.len() - size);
    items.drain(start..start + size).collect()
}

/// Path next to `records` named `<stem>_<suffix>.jsonl`
///
/// The stem is the file name up to its first dot.
#[must_use]
pub fn sibling_path(records: &Path, suffix: &str) -> PathBuf {
    let name = records
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = name.split('.').next().unwrap_or_default();
    records.with_file_name(format!("{stem}_{suffix}.jsonl"))
}

/// Append-only JSON lines output
#[derive(Debug)]
pub struct JsonLinesWriter {
    path: PathBuf,
    file: File,
    lines: usize,
}

impl JsonLinesWriter {
    /// Open `path` for appending, or truncate it when `overwrite` is set
    pub fn open(path: &Path, overwrite: bool) -> Result<Self> {
        let mut options = OpenOptions::new();
        options.create(true);
        if overwrite {
            options.write(true).truncate(true);
        } else {
            options.append(true);
        }

        let file = options.open(path).map_err(|e| PipelineError::io(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
            lines: 0,
        })
    }

    /// Serialize `value` and write it as one flushed line
    pub fn write<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let mut line = serde_json::to_string(value)?;
        line.push('\n');

        self.file
            .write_all(line.as_bytes())
            .and_then(|()| self.file.flush())
            .map_err(|e| PipelineError::io(&self.path, e))?;
        self.lines += 1;
        Ok(())
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lines written through this writer
    #[must_use]
    pub const fn lines(&self) -> usize {
        self.lines
    }
}

/// Streaming reader over a records file
///
/// Blank lines are skipped. A line that is not a valid record is logged and
/// returned as an error.
#[derive(Debug)]
pub struct RecordReader {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    line_number: usize,
}

impl RecordReader {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| PipelineError::io(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            lines: BufReader::new(file).lines(),
            line_number: 0,
        })
    }
}

impl Iterator for RecordReader {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = self.lines.next()?;
            self.line_number += 1;

            let line = match line {
                Ok(line) => line,
                Err(e) => return Some(Err(PipelineError::io(&self.path, e))),
            };
            if line.trim().is_empty() {
                continue;
            }

            return Some(serde_json::from_str(&line).map_err(|source| {
                error!(
                    "Failed data from original file: {} ({}:{}): {source}",
                    original_file_name(&line),
                    self.path.display(),
                    self.line_number
                );
                PipelineError::MalformedRecord {
                    path: self.path.clone(),
                    line: self.line_number,
                    source,
                }
            }));
        }
    }
}

/// Best-effort `og_fname` of a line that failed to deserialize as a record
fn original_file_name(line: &str) -> String {
    serde_json::from_str::<serde_json::Value>(line)
        .ok()
        .and_then(|value| value.get("og_fname")?.as_str().map(str::to_string))
        .unwrap_or_else(|| "<unknown>".to_string())
}

/// Throughput logger for long batches
struct Progress {
    interval: usize,
    started: Instant,
}

impl Progress {
    fn new(interval: usize) -> Self {
        Self {
            interval,
            started: Instant::now(),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn tick(&self, processed: usize, what: &str) {
        if self.interval == 0 || !processed.is_multiple_of(self.interval) {
            return;
        }
        let elapsed = self.started.elapsed().as_secs_f64();
        let rate = if elapsed > 0.0 {
            processed as f64 / elapsed
        } else {
            0.0
        };
        info!("{processed} {what} processed at {rate:.2} per second");
    }
}

/// Parse EML files into records appended to `output`
///
/// Returns the number of records written. The first file that cannot be read
/// aborts the batch.
pub fn ingest_files(inputs: &[PathBuf], output: &Path, options: &IngestOptions) -> Result<usize> {
    let mut files = collect_inputs(inputs, options.extension.as_deref())?;
    if let Some(size) = options.sample {
        files = sample_window(files, size, &mut rand::thread_rng());
        info!("Sampled {} input files", files.len());
    }

    let mut writer = JsonLinesWriter::open(output, options.overwrite)?;
    let progress = Progress::new(options.progress_interval);

    for (index, path) in files.iter().enumerate() {
        let record = parse_eml_file(path)?;
        writer.write(&record)?;

        if options.debug {
            let preview: String = record.body.chars().take(DEBUG_BODY_PREVIEW).collect();
            info!("Headers: {}", record.header_list.join(","));
            info!("Raw Headers: {}", record.raw_headers);
            info!("Body Text: {preview}");
        }
        progress.tick(index + 1, "EML files");
    }

    info!("Wrote {} records to {}", writer.lines(), writer.path().display());
    Ok(writer.lines())
}

/// Header features for every record in `records`
pub fn extract_header_features_file(records: &Path, output: &Path, overwrite: bool) -> Result<usize> {
    let mut writer = JsonLinesWriter::open(output, overwrite)?;

    for record in RecordReader::open(records)? {
        let record = record?;
        let features = extract_header_features(&record);
        writer.write(&features).inspect_err(|_| {
            error!("Failed data from original file: {}", record.og_fname);
        })?;
    }

    debug!("Wrote {} header feature lines to {}", writer.lines(), output.display());
    Ok(writer.lines())
}

/// Body features for every record in `records`, with an optional URL side file
pub fn extract_body_features_file(
    records: &Path,
    output: &Path,
    urls_output: Option<&Path>,
    overwrite: bool,
) -> Result<usize> {
    let mut writer = JsonLinesWriter::open(output, overwrite)?;
    let mut url_writer = urls_output
        .map(|path| JsonLinesWriter::open(path, overwrite))
        .transpose()?;

    for record in RecordReader::open(records)? {
        let record = record?;
        let features = extract_body_features(&record);

        writer.write(&features).inspect_err(|_| {
            error!("Failed data from original file: {}", record.og_fname);
        })?;
        if let Some(url_writer) = url_writer.as_mut() {
            url_writer.write(&UrlLine {
                email_id: &features.email_id,
                urls: &features.urls,
            })?;
        }
    }

    debug!("Wrote {} body feature lines to {}", writer.lines(), output.display());
    Ok(writer.lines())
}

/// Parse inputs, then derive body features, URLs and header features
///
/// Feature files land next to the records file and are rebuilt from the
/// whole records file on every run, so they stay line-aligned with it even
/// when records are appended.
pub fn run_pipeline(inputs: &[PathBuf], output: &Path, options: &IngestOptions) -> Result<RunOutputs> {
    let outputs = RunOutputs {
        records: output.to_path_buf(),
        body_features: sibling_path(output, "body_features"),
        urls: sibling_path(output, "urls"),
        header_features: sibling_path(output, "header_features"),
    };

    ingest_files(inputs, &outputs.records, options)?;
    extract_body_features_file(
        &outputs.records,
        &outputs.body_features,
        Some(&outputs.urls),
        true,
    )?;
    extract_header_features_file(&outputs.records, &outputs.header_features, true)?;

    Ok(outputs)
}
