use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use scansheet::TextNorm;

/// Convert scanned PDF documents into spreadsheets, one sheet per page.
#[derive(Debug, Parser)]
#[command(name = "scansheet", about, version)]
pub struct Cli {
    /// Log progress (-v) or debugging detail (-vv) to stderr
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// OCR every page and write the recognized grid as an .xlsx workbook
    Convert {
        /// Path to the scanned PDF
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Path of the .xlsx workbook to write
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        #[command(flatten)]
        grid: GridArgs,

        #[command(flatten)]
        ocr: OcrArgs,

        /// Summary format
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        report: ReportFormat,
    },

    /// Print OCR words with their bounding boxes and grid cells
    Words {
        /// Path to the scanned PDF
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        #[command(flatten)]
        grid: GridArgs,

        #[command(flatten)]
        ocr: OcrArgs,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

/// Rendering and grid quantization settings.
#[derive(Debug, Clone, Args)]
pub struct GridArgs {
    /// Page range (e.g. '1,3-5'). Default: all pages
    #[arg(long)]
    pub pages: Option<String>,

    /// Rendering resolution in dots per inch
    #[arg(long, default_value_t = 300.0)]
    pub dpi: f32,

    /// Pixels per spreadsheet row
    #[arg(long, value_name = "PX", default_value_t = 20.0)]
    pub row_height: f64,

    /// Pixels per spreadsheet column
    #[arg(long, value_name = "PX", default_value_t = 50.0)]
    pub column_width: f64,

    /// Unicode normalization applied to recognized text
    #[arg(long, value_enum, default_value_t = TextNormArg::None)]
    pub text_norm: TextNormArg,
}

/// OCR engine settings.
#[derive(Debug, Clone, Args)]
pub struct OcrArgs {
    /// Tesseract language code(s), e.g. 'eng' or 'eng+deu'
    #[arg(long, default_value = "eng")]
    pub lang: String,

    /// Directory containing *.traineddata files
    #[arg(long, value_name = "DIR", env = "TESSDATA_PREFIX")]
    pub tessdata: Option<PathBuf>,

    /// Tesseract page segmentation mode
    #[arg(long, default_value_t = 3)]
    pub psm: u32,

    /// OCR engine
    #[arg(long, value_enum, default_value_t = EngineArg::Tesseract)]
    pub engine: EngineArg,

    /// Path to the tesseract executable (tesseract engine only)
    #[arg(long, value_name = "PATH", default_value = "tesseract")]
    pub tesseract: PathBuf,
}

/// OCR engine choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EngineArg {
    /// Run the tesseract executable per page
    Tesseract,
    /// Link libtesseract in-process (needs the `leptess` build feature)
    Leptess,
}

/// Output format for the words subcommand.
#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Plain text (tab-separated)
    Text,
    /// JSON output
    Json,
    /// CSV output
    Csv,
}

/// Summary format for the convert subcommand.
#[derive(Debug, Clone, ValueEnum)]
pub enum ReportFormat {
    /// One line per written sheet
    Text,
    /// The full conversion report as JSON
    Json,
}

/// Unicode normalization form for CLI arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TextNormArg {
    /// Keep text as recognized
    None,
    /// Canonical Decomposition, followed by Canonical Composition
    Nfc,
    /// Compatibility Decomposition, followed by Canonical Composition
    Nfkc,
}

impl TextNormArg {
    /// Convert to the library's `TextNorm`.
    pub fn to_text_norm(self) -> TextNorm {
        match self {
            TextNormArg::None => TextNorm::None,
            TextNormArg::Nfc => TextNorm::Nfc,
            TextNormArg::Nfkc => TextNorm::Nfkc,
        }
    }
}
