//! Integration tests for the page assembler, driven by in-memory collaborators.

mod common;

use std::cell::RefCell;
use std::path::Path;

use common::{RecordingSink, ScriptedRasterizer, ScriptedWords, word};
use scansheet::{
    BBox, ConvertError, ConvertOptions, FailureKind, GridOptions, PageAssembler, PageRange,
    TextNorm, Word,
};

const INPUT: &str = "scan.pdf";

fn convert(
    rasterizer: &ScriptedRasterizer,
    words: &ScriptedWords,
    options: ConvertOptions,
) -> (Result<scansheet::ConversionReport, ConvertError>, RecordingSink) {
    let mut sink = RecordingSink::new();
    let result = PageAssembler::new(options, rasterizer, words).convert(Path::new(INPUT), &mut sink);
    (result, sink)
}

#[test]
fn header_row_example() {
    let rasterizer = ScriptedRasterizer::with_pages(1);
    let words = ScriptedWords::new().page(
        0,
        vec![
            Word::new("Name", BBox::new(10.0, 5.0, 40.0, 15.0)),
            Word::new("Age", BBox::new(260.0, 5.0, 30.0, 15.0)),
        ],
    );

    let (result, sink) = convert(&rasterizer, &words, ConvertOptions::default());
    let report = result.unwrap();

    assert_eq!(sink.labels(), vec!["Page 1"]);
    let sheet = &sink.sheets[0];
    assert_eq!(sheet.filled(), vec![((0, 0), "Name"), ((0, 5), "Age")]);
    for column in 1..=4 {
        assert_eq!(sheet.text(0, column), Some(""));
    }
    assert_eq!(sheet.auto_sized, vec![0, 1, 2, 3, 4, 5]);

    assert!(report.is_clean());
    assert_eq!(report.page_count, 1);
    assert_eq!(report.sheets[0].rows, 1);
    assert_eq!(report.sheets[0].columns, 6);
    assert_eq!(report.sheets[0].cells, 2);
}

#[test]
fn same_cell_words_merge_in_reading_order() {
    let rasterizer = ScriptedRasterizer::with_pages(1);
    let words = ScriptedWords::new().page(0, vec![word("B", 30.0, 2.0), word("A", 10.0, 2.0)]);

    let (result, sink) = convert(&rasterizer, &words, ConvertOptions::default());
    result.unwrap();

    assert_eq!(sink.sheets[0].filled(), vec![((0, 0), "A B")]);
    assert_eq!(sink.sheets[0].auto_sized, vec![0]);
}

#[test]
fn failed_ocr_page_is_skipped() {
    let rasterizer = ScriptedRasterizer::with_pages(3);
    let words = ScriptedWords::new()
        .page(0, vec![word("one", 0.0, 0.0)])
        .failing(1, "engine crashed")
        .page(2, vec![word("three", 0.0, 0.0)]);

    let (result, sink) = convert(&rasterizer, &words, ConvertOptions::default());
    let report = result.unwrap();

    assert_eq!(sink.labels(), vec!["Page 1", "Page 3"]);
    assert_eq!(sink.sheets[1].filled(), vec![((0, 0), "three")]);

    assert_eq!(report.page_count, 3);
    assert_eq!(report.sheet_labels(), vec!["Page 1", "Page 3"]);
    assert_eq!(report.failures.len(), 1);
    let failure = &report.failures[0];
    assert_eq!(failure.page, 2);
    assert_eq!(failure.kind, FailureKind::Ocr);
    assert!(failure.message.contains("engine crashed"));
    assert!(!report.is_clean());
}

#[test]
fn empty_page_gets_empty_sheet() {
    let rasterizer = ScriptedRasterizer::with_pages(2);
    let words = ScriptedWords::new().page(1, vec![word("x", 0.0, 0.0)]);

    let (result, sink) = convert(&rasterizer, &words, ConvertOptions::default());
    let report = result.unwrap();

    assert_eq!(sink.labels(), vec!["Page 1", "Page 2"]);
    assert!(sink.sheets[0].cells.is_empty());
    assert!(sink.sheets[0].auto_sized.is_empty());
    assert_eq!(report.sheets[0].rows, 0);
    assert_eq!(report.sheets[0].columns, 0);
}

#[test]
fn invalid_word_skips_page() {
    let rasterizer = ScriptedRasterizer::with_pages(2);
    let words = ScriptedWords::new()
        .page(0, vec![Word::new("bad", BBox::new(-1.0, 0.0, 10.0, 10.0))])
        .page(1, vec![word("good", 0.0, 0.0)]);

    let (result, sink) = convert(&rasterizer, &words, ConvertOptions::default());
    let report = result.unwrap();

    assert_eq!(sink.labels(), vec!["Page 2"]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].page, 1);
    assert_eq!(report.failures[0].kind, FailureKind::InvalidWord);
    assert!(report.failures[0].message.contains("bad"));
}

#[test]
fn zero_width_word_skips_page() {
    let rasterizer = ScriptedRasterizer::with_pages(1);
    let words = ScriptedWords::new().page(0, vec![Word::new("w", BBox::new(0.0, 0.0, 0.0, 10.0))]);

    let (result, sink) = convert(&rasterizer, &words, ConvertOptions::default());
    let report = result.unwrap();

    assert!(sink.sheets.is_empty());
    assert_eq!(report.failures[0].kind, FailureKind::InvalidWord);
}

#[test]
fn render_failure_aborts_and_closes_document() {
    let rasterizer = ScriptedRasterizer::with_pages(3).fail_render(1, "corrupt content stream");
    let words = ScriptedWords::new();

    let (result, sink) = convert(&rasterizer, &words, ConvertOptions::default());
    let err = result.unwrap_err();

    assert!(matches!(err, ConvertError::PageRender { page: 2, .. }));
    assert!(err.to_string().contains("corrupt content stream"));
    assert!(!rasterizer.rendered().contains(&2));
    assert_eq!(rasterizer.opened.get(), 1);
    assert_eq!(rasterizer.closed.get(), 1);
    assert!(sink.saved.is_none());
}

#[test]
fn open_failure_is_document_load_error() {
    let rasterizer = ScriptedRasterizer::failing_open("not a PDF");
    let words = ScriptedWords::new();

    let (result, sink) = convert(&rasterizer, &words, ConvertOptions::default());
    let err = result.unwrap_err();

    match err {
        ConvertError::DocumentLoad { path, message } => {
            assert_eq!(path, Path::new(INPUT));
            assert!(message.contains("not a PDF"));
        }
        other => panic!("expected DocumentLoad, got {other:?}"),
    }
    assert!(sink.sheets.is_empty());
}

#[test]
fn sink_failure_aborts_run() {
    let rasterizer = ScriptedRasterizer::with_pages(3);
    let words = ScriptedWords::new()
        .page(0, vec![word("a", 0.0, 0.0)])
        .page(1, vec![word("b", 0.0, 0.0)]);
    let mut sink = RecordingSink::failing_on("Page 2");

    let err = PageAssembler::new(ConvertOptions::default(), &rasterizer, &words)
        .convert(Path::new(INPUT), &mut sink)
        .unwrap_err();

    assert!(matches!(err, ConvertError::SinkWrite(_)));
    assert!(err.to_string().contains("disk full"));
    assert_eq!(sink.labels(), vec!["Page 1"]);
    assert_eq!(rasterizer.closed.get(), 1);
}

fn narrow_columns() -> ConvertOptions {
    ConvertOptions {
        grid: GridOptions {
            pixels_per_column_unit: 0.1,
            ..GridOptions::default()
        },
        ..ConvertOptions::default()
    }
}

#[test]
fn oversized_page_is_skipped_before_its_sheet() {
    let rasterizer = ScriptedRasterizer::with_pages(3);
    let words = ScriptedWords::new()
        .page(0, vec![word("one", 0.0, 0.0)])
        .page(1, vec![word("far", 2000.0, 0.0)])
        .page(2, vec![word("three", 0.0, 0.0)]);
    let mut sink = RecordingSink::bounded(1_048_576, 16_384);

    let report = PageAssembler::new(narrow_columns(), &rasterizer, &words)
        .convert(Path::new(INPUT), &mut sink)
        .unwrap();

    assert_eq!(sink.labels(), vec!["Page 1", "Page 3"]);
    assert_eq!(report.sheet_labels(), vec!["Page 1", "Page 3"]);
    assert_eq!(report.failures.len(), 1);
    let failure = &report.failures[0];
    assert_eq!(failure.page, 2);
    assert_eq!(failure.kind, FailureKind::SheetTooLarge);
    assert!(failure.message.contains("20001 columns"));
}

#[test]
fn grid_at_sheet_limit_is_written() {
    let rasterizer = ScriptedRasterizer::with_pages(1);
    let words = ScriptedWords::new().page(0, vec![word("edge", 100.0, 40.0)]);
    let mut sink = RecordingSink::bounded(3, 3);

    let report = PageAssembler::new(ConvertOptions::default(), &rasterizer, &words)
        .convert(Path::new(INPUT), &mut sink)
        .unwrap();

    assert!(report.is_clean());
    assert_eq!(sink.sheets[0].filled(), vec![((2, 2), "edge")]);
}

#[cfg(feature = "xlsx")]
#[test]
fn oversized_page_does_not_abort_xlsx_workbook() {
    use scansheet::{WorkbookSink, XlsxSink};

    let rasterizer = ScriptedRasterizer::with_pages(3);
    let words = ScriptedWords::new()
        .page(0, vec![word("one", 0.0, 0.0)])
        .page(1, vec![word("far", 2000.0, 0.0)])
        .page(2, vec![word("three", 0.0, 0.0)]);
    let mut sink = XlsxSink::new();

    let report = PageAssembler::new(narrow_columns(), &rasterizer, &words)
        .convert(Path::new(INPUT), &mut sink)
        .unwrap();

    assert_eq!(sink.sheet_count(), 2);
    assert_eq!(report.sheet_labels(), vec!["Page 1", "Page 3"]);
    assert_eq!(report.failures[0].kind, FailureKind::SheetTooLarge);

    let dir = tempfile::tempdir().unwrap();
    sink.save(&dir.path().join("out.xlsx")).unwrap();
}

#[test]
fn invalid_options_rejected_before_open() {
    let rasterizer = ScriptedRasterizer::with_pages(1);
    let words = ScriptedWords::new();
    let options = ConvertOptions {
        grid: GridOptions {
            pixels_per_row_unit: -5.0,
            ..GridOptions::default()
        },
        ..ConvertOptions::default()
    };

    let (result, _) = convert(&rasterizer, &words, options);

    assert!(matches!(result, Err(ConvertError::Configuration(_))));
    assert_eq!(rasterizer.opened.get(), 0);
}

#[test]
fn page_selection_keeps_source_numbers() {
    let rasterizer = ScriptedRasterizer::with_pages(4);
    let words = ScriptedWords::new()
        .page(0, vec![word("first", 0.0, 0.0)])
        .page(2, vec![word("third", 0.0, 0.0)]);
    let options = ConvertOptions {
        pages: PageRange::parse("3,1").unwrap(),
        ..ConvertOptions::default()
    };

    let (result, sink) = convert(&rasterizer, &words, options);
    let report = result.unwrap();

    assert_eq!(sink.labels(), vec!["Page 1", "Page 3"]);
    assert_eq!(rasterizer.rendered(), vec![0, 2]);
    assert_eq!(words.recognized(), vec![0, 2]);
    assert_eq!(report.page_count, 4);
}

#[test]
fn page_selection_out_of_range() {
    let rasterizer = ScriptedRasterizer::with_pages(2);
    let words = ScriptedWords::new();
    let options = ConvertOptions {
        pages: PageRange::parse("2-5").unwrap(),
        ..ConvertOptions::default()
    };

    let (result, _) = convert(&rasterizer, &words, options);

    assert!(matches!(result, Err(ConvertError::InvalidPageRange(_))));
    assert!(rasterizer.rendered().is_empty());
    assert_eq!(rasterizer.closed.get(), 1);
}

#[test]
fn empty_document() {
    let rasterizer = ScriptedRasterizer::with_pages(0);
    let words = ScriptedWords::new();

    let (result, sink) = convert(&rasterizer, &words, ConvertOptions::default());
    let report = result.unwrap();

    assert_eq!(report.page_count, 0);
    assert!(report.sheets.is_empty());
    assert!(sink.sheets.is_empty());
}

#[test]
fn page_image_written_to_scratch_and_removed() {
    let rasterizer = ScriptedRasterizer::with_pages(2);
    let words = ScriptedWords::new();

    let (result, _) = convert(&rasterizer, &words, ConvertOptions::default());
    result.unwrap();

    let seen = words.seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    for (index, path, existed) in seen.iter() {
        assert!(existed, "page image missing during OCR: {}", path.display());
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            format!("page_{}.png", index + 1)
        );
        let scratch = path.parent().unwrap();
        assert!(
            scratch
                .file_name()
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("scansheet_pages_")
        );
        assert!(!scratch.exists(), "scratch directory left behind");
    }
}

#[test]
fn progress_reported_per_selected_page() {
    let rasterizer = ScriptedRasterizer::with_pages(5);
    let words = ScriptedWords::new();
    let calls = RefCell::new(Vec::new());
    let progress = |current: usize, total: usize| calls.borrow_mut().push((current, total));
    let options = ConvertOptions {
        pages: PageRange::parse("2-4").unwrap(),
        ..ConvertOptions::default()
    };

    let mut sink = RecordingSink::new();
    PageAssembler::new(options, &rasterizer, &words)
        .with_progress(&progress)
        .convert(Path::new(INPUT), &mut sink)
        .unwrap();

    assert_eq!(calls.into_inner(), vec![(1, 3), (2, 3), (3, 3)]);
}

#[test]
fn grid_options_and_normalization_applied() {
    let rasterizer = ScriptedRasterizer::with_pages(1);
    let words = ScriptedWords::new().page(
        0,
        vec![word("\u{FB01}ne", 100.0, 100.0), word("x", 0.0, 0.0)],
    );
    let options = ConvertOptions {
        grid: GridOptions {
            pixels_per_row_unit: 50.0,
            pixels_per_column_unit: 100.0,
            text_norm: TextNorm::Nfkc,
        },
        ..ConvertOptions::default()
    };

    let (result, sink) = convert(&rasterizer, &words, options);
    result.unwrap();

    assert_eq!(sink.sheets[0].filled(), vec![((0, 0), "x"), ((2, 1), "fine")]);
}

#[test]
fn many_pages_stay_in_order() {
    let count = 23;
    let rasterizer = ScriptedRasterizer::with_pages(count);
    let mut words = ScriptedWords::new();
    for index in 0..count {
        if index % 5 == 3 {
            words = words.failing(index, "unreadable");
        } else {
            words = words.page(index, vec![word(&format!("p{}", index + 1), 0.0, 0.0)]);
        }
    }

    let (result, sink) = convert(&rasterizer, &words, ConvertOptions::default());
    let report = result.unwrap();

    let expected: Vec<String> = (0..count)
        .filter(|i| i % 5 != 3)
        .map(|i| format!("Page {}", i + 1))
        .collect();
    assert_eq!(sink.labels(), expected);
    for sheet in &sink.sheets {
        let page = sheet.label.trim_start_matches("Page ");
        assert_eq!(sheet.text(0, 0), Some(format!("p{page}").as_str()));
    }
    let failed: Vec<usize> = report.failures.iter().map(|f| f.page).collect();
    assert_eq!(failed, vec![4, 9, 14, 19]);
}

#[test]
fn extract_without_sink() {
    let rasterizer = ScriptedRasterizer::with_pages(3);
    let words = ScriptedWords::new()
        .page(0, vec![word("a", 0.0, 0.0), word("b", 60.0, 0.0)])
        .failing(2, "timeout");

    let output = PageAssembler::new(ConvertOptions::default(), &rasterizer, &words)
        .extract(Path::new(INPUT))
        .unwrap();

    assert_eq!(output.page_count, 3);
    assert_eq!(output.pages.len(), 2);
    assert_eq!(output.pages[0].page_number(), 1);
    assert_eq!(output.pages[0].words.len(), 2);
    assert_eq!(output.pages[0].grid.get(0, 1), Some("b"));
    assert!(output.pages[1].grid.is_empty());
    assert_eq!(output.failures.len(), 1);
    assert_eq!(output.failures[0].page, 3);
}
