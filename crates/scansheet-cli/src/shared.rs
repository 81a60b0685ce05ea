use std::io::{self, IsTerminal, Write};
use std::path::Path;

use scansheet::{
    ConvertOptions, GridOptions, OcrOptions, PageRange, PdfiumRasterizer, TesseractCli,
    WordSource,
};
use tracing_subscriber::EnvFilter;

use crate::cli::{EngineArg, GridArgs, OcrArgs};

/// Install the stderr log subscriber.
///
/// `RUST_LOG` takes precedence; otherwise `-v` selects info and `-vv` debug.
pub fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Fail early with a readable message if the input file does not exist.
pub fn check_input(file: &Path) -> Result<(), i32> {
    if !file.is_file() {
        eprintln!("Error: file not found: {}", file.display());
        return Err(1);
    }
    Ok(())
}

/// Build conversion options from the grid arguments.
pub fn convert_options(args: &GridArgs) -> Result<ConvertOptions, i32> {
    let pages = match args.pages.as_deref() {
        Some(range) => PageRange::parse(range).map_err(|e| {
            eprintln!("Error: {e}");
            1
        })?,
        None => PageRange::All,
    };
    let options = ConvertOptions {
        dpi: args.dpi,
        grid: GridOptions {
            pixels_per_row_unit: args.row_height,
            pixels_per_column_unit: args.column_width,
            text_norm: args.text_norm.to_text_norm(),
        },
        pages,
    };
    options.validate().map_err(|e| {
        eprintln!("Error: {e}");
        1
    })?;
    Ok(options)
}

pub fn ocr_options(args: &OcrArgs) -> OcrOptions {
    OcrOptions {
        language: args.lang.clone(),
        tessdata_dir: args.tessdata.clone(),
        page_segmentation_mode: args.psm,
        binary: args.tesseract.clone(),
    }
}

/// Construct the selected OCR engine, reporting configuration problems.
pub fn word_source(args: &OcrArgs) -> Result<Box<dyn WordSource>, i32> {
    let options = ocr_options(args);
    let source: Result<Box<dyn WordSource>, _> = match args.engine {
        EngineArg::Tesseract => {
            TesseractCli::new(options).map(|s| Box::new(s) as Box<dyn WordSource>)
        }
        #[cfg(feature = "leptess")]
        EngineArg::Leptess => scansheet::LeptessWordSource::new(options)
            .map(|s| Box::new(s) as Box<dyn WordSource>),
        #[cfg(not(feature = "leptess"))]
        EngineArg::Leptess => {
            eprintln!("Error: this build of scansheet has no leptess support");
            return Err(1);
        }
    };
    source.map_err(|e| {
        eprintln!("Error: {e}");
        1
    })
}

/// Bind PDFium, reporting a missing library.
pub fn rasterizer() -> Result<PdfiumRasterizer, i32> {
    PdfiumRasterizer::new().map_err(|e| {
        eprintln!("Error: {e}");
        1
    })
}

/// Escape a string for CSV output.
///
/// If the text contains commas, double quotes, or newlines, wraps it in
/// double quotes and escapes any internal double quotes by doubling them.
pub fn csv_escape(text: &str) -> String {
    if text.contains(',') || text.contains('"') || text.contains('\n') {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}

/// A progress reporter that prints "Processing page N/M..." to stderr,
/// but only when stderr is connected to a TTY (terminal).
pub struct ProgressReporter {
    is_tty: bool,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            is_tty: io::stderr().is_terminal(),
        }
    }

    /// Report progress for the `current`-th of `total` selected pages.
    pub fn report(&self, current: usize, total: usize) {
        if self.is_tty {
            eprint!("\rProcessing page {current}/{total}...");
            let _ = io::stderr().flush();
        }
    }

    /// Clear the progress line (if TTY).
    pub fn finish(&self) {
        if self.is_tty {
            eprint!("\r{}\r", " ".repeat(40));
            let _ = io::stderr().flush();
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}
