use std::path::Path;

use scansheet::{ConversionReport, PageAssembler, WorkbookSink, XlsxSink};

use crate::cli::{GridArgs, OcrArgs, ReportFormat};
use crate::shared::{ProgressReporter, check_input, convert_options, rasterizer, word_source};

pub fn run(
    input: &Path,
    output: &Path,
    grid: &GridArgs,
    ocr: &OcrArgs,
    report_format: &ReportFormat,
) -> Result<(), i32> {
    check_input(input)?;
    let options = convert_options(grid)?;
    let words = word_source(ocr)?;
    let rasterizer = rasterizer()?;

    let progress = ProgressReporter::new();
    let on_page = |current: usize, total: usize| progress.report(current, total);
    let mut sink = XlsxSink::new();

    let result = PageAssembler::new(options, &rasterizer, words.as_ref())
        .with_progress(&on_page)
        .convert(input, &mut sink);
    progress.finish();

    let report = result.map_err(|e| {
        eprintln!("Error: {e}");
        1
    })?;

    sink.save(output).map_err(|e| {
        eprintln!("Error: {e}");
        1
    })?;

    for failure in &report.failures {
        eprintln!("Warning: skipped {failure}");
    }

    match report_format {
        ReportFormat::Text => write_text(&report, output),
        ReportFormat::Json => write_json(&report),
    }
}

fn write_text(report: &ConversionReport, output: &Path) -> Result<(), i32> {
    for sheet in &report.sheets {
        println!(
            "{}: {} rows x {} columns, {} cells from {} words",
            sheet.label, sheet.rows, sheet.columns, sheet.cells, sheet.words
        );
    }
    println!(
        "Wrote {} sheet(s) to {} ({} of {} page(s) skipped)",
        report.sheets.len(),
        output.display(),
        report.failures.len(),
        report.page_count,
    );
    Ok(())
}

fn write_json(report: &ConversionReport) -> Result<(), i32> {
    let json = serde_json::to_string_pretty(report).map_err(|e| {
        eprintln!("Error: failed to serialize report: {e}");
        1
    })?;
    println!("{json}");
    Ok(())
}
