//! Word source backed by the `tesseract` executable.
//!
//! Runs `tesseract <image> stdout ... tsv` once per page and reads word-level
//! rows from the TSV report. Needs nothing at build time; the binary is
//! located when the source is constructed.

use std::path::Path;
use std::process::Command;

use scansheet_core::{BBox, Word};
use tracing::debug;

use crate::config::OcrOptions;
use crate::error::{BackendError, ConvertError};
use crate::source::{PageImage, WordSource};

/// TSV `level` value of word rows.
const WORD_LEVEL: &str = "5";
/// Columns in a TSV row: level, page_num, block_num, par_num, line_num,
/// word_num, left, top, width, height, conf, text.
const TSV_COLUMNS: usize = 12;

/// OCR through the Tesseract command-line program.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    options: OcrOptions,
}

impl TesseractCli {
    /// Validate `options` and check that the executable runs.
    ///
    /// A missing binary or tessdata directory is a configuration error,
    /// reported before any page is processed.
    pub fn new(options: OcrOptions) -> Result<Self, ConvertError> {
        options.validate()?;
        let cli = Self { options };
        cli.probe()?;
        Ok(cli)
    }

    pub fn options(&self) -> &OcrOptions {
        &self.options
    }

    fn probe(&self) -> Result<(), ConvertError> {
        let binary = &self.options.binary;
        let output = Command::new(binary)
            .arg("--version")
            .output()
            .map_err(|e| {
                ConvertError::Configuration(format!("cannot run {}: {e}", binary.display()))
            })?;
        if !output.status.success() {
            return Err(ConvertError::Configuration(format!(
                "{} --version exited with {}",
                binary.display(),
                output.status
            )));
        }

        // Older releases print the version banner on stderr.
        let banner = if output.stdout.is_empty() {
            &output.stderr
        } else {
            &output.stdout
        };
        let banner = String::from_utf8_lossy(banner);
        debug!(
            binary = %binary.display(),
            version = banner.lines().next().unwrap_or_default(),
            "found tesseract"
        );
        Ok(())
    }

    fn command(&self, image: &Path) -> Command {
        let mut cmd = Command::new(&self.options.binary);
        cmd.arg(image)
            .arg("stdout")
            .arg("-l")
            .arg(&self.options.language)
            .arg("--psm")
            .arg(self.options.page_segmentation_mode.to_string());
        if let Some(dir) = &self.options.tessdata_dir {
            cmd.arg("--tessdata-dir").arg(dir);
        }
        cmd.arg("tsv");
        cmd
    }
}

impl WordSource for TesseractCli {
    fn extract_words(&self, page: &PageImage) -> Result<Vec<Word>, BackendError> {
        let output = self.command(&page.path).output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BackendError::Ocr(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        parse_tsv(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Read the word rows of a Tesseract TSV report.
///
/// The header row, non-word rows and words with blank text are skipped.
/// Words keep the order they appear in.
pub fn parse_tsv(tsv: &str) -> Result<Vec<Word>, BackendError> {
    let mut words = Vec::new();

    for (line_no, line) in tsv.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        if fields[0] != WORD_LEVEL {
            continue;
        }
        if fields.len() < TSV_COLUMNS {
            return Err(malformed(line_no, "missing columns"));
        }

        let text = fields[11..].join("\t");
        let text = text.trim();
        if text.is_empty() {
            continue;
        }

        let mut geometry = [0.0; 4];
        for (slot, raw) in geometry.iter_mut().zip(&fields[6..10]) {
            *slot = raw
                .trim()
                .parse::<f64>()
                .map_err(|_| malformed(line_no, &format!("bad coordinate '{raw}'")))?;
        }
        let [left, top, width, height] = geometry;
        words.push(Word::new(text, BBox::new(left, top, width, height)));
    }

    Ok(words)
}

fn malformed(line_no: usize, detail: &str) -> BackendError {
    BackendError::Ocr(format!("malformed TSV line {}: {detail}", line_no + 1))
}
