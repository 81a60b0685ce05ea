use std::path::Path;

use scansheet::{ExtractOutput, GridCoordinate, GridOptions, MappedPage, PageAssembler, Word};

use crate::cli::{GridArgs, OcrArgs, OutputFormat};
use crate::shared::{
    ProgressReporter, check_input, convert_options, csv_escape, rasterizer, word_source,
};

pub fn run(input: &Path, grid: &GridArgs, ocr: &OcrArgs, format: &OutputFormat) -> Result<(), i32> {
    check_input(input)?;
    let options = convert_options(grid)?;
    let grid_options = options.grid.clone();
    let words = word_source(ocr)?;
    let rasterizer = rasterizer()?;

    let progress = ProgressReporter::new();
    let on_page = |current: usize, total: usize| progress.report(current, total);

    let result = PageAssembler::new(options, &rasterizer, words.as_ref())
        .with_progress(&on_page)
        .extract(input);
    progress.finish();

    let output = result.map_err(|e| {
        eprintln!("Error: {e}");
        1
    })?;
    for failure in &output.failures {
        eprintln!("Warning: skipped {failure}");
    }

    match format {
        OutputFormat::Text => write_text(&output, &grid_options),
        OutputFormat::Json => write_json(&output, &grid_options),
        OutputFormat::Csv => write_csv(&output, &grid_options),
    }
}

/// Words of a mapped page with the cell each one landed in.
///
/// Mapping a page fails when any word has no addressable cell, so nothing is
/// dropped here for pages that reached the output.
fn placed<'a>(
    page: &'a MappedPage,
    grid: &'a GridOptions,
) -> impl Iterator<Item = (&'a Word, GridCoordinate)> + 'a {
    page.words
        .iter()
        .filter_map(move |w| grid.coordinate(&w.bbox).map(|cell| (w, cell)))
}

fn write_text(output: &ExtractOutput, grid: &GridOptions) -> Result<(), i32> {
    println!("page\ttext\tx\ty\twidth\theight\trow\tcolumn");

    for page in &output.pages {
        for (w, cell) in placed(page, grid) {
            println!(
                "{}\t{}\t{:.0}\t{:.0}\t{:.0}\t{:.0}\t{}\t{}",
                page.page_number(),
                w.text,
                w.bbox.x,
                w.bbox.y,
                w.bbox.width,
                w.bbox.height,
                cell.row,
                cell.column,
            );
        }
    }
    Ok(())
}

fn write_json(output: &ExtractOutput, grid: &GridOptions) -> Result<(), i32> {
    let mut all_words = Vec::new();

    for page in &output.pages {
        for (w, cell) in placed(page, grid) {
            all_words.push(serde_json::json!({
                "page": page.page_number(),
                "text": w.text,
                "x": w.bbox.x,
                "y": w.bbox.y,
                "width": w.bbox.width,
                "height": w.bbox.height,
                "row": cell.row,
                "column": cell.column,
            }));
        }
    }

    let json_str = serde_json::to_string(&all_words).map_err(|e| {
        eprintln!("Error: failed to serialize words: {e}");
        1
    })?;
    println!("{json_str}");
    Ok(())
}

fn write_csv(output: &ExtractOutput, grid: &GridOptions) -> Result<(), i32> {
    println!("page,text,x,y,width,height,row,column");

    for page in &output.pages {
        for (w, cell) in placed(page, grid) {
            println!(
                "{},{},{:.0},{:.0},{:.0},{:.0},{},{}",
                page.page_number(),
                csv_escape(&w.text),
                w.bbox.x,
                w.bbox.y,
                w.bbox.width,
                w.bbox.height,
                cell.row,
                cell.column,
            );
        }
    }
    Ok(())
}
