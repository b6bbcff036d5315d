mod common;

use std::cell::Cell;
use std::rc::Rc;

use richdoc_export::Error;
use richdoc_export::export::{DirectorySink, ExportKind, ExportSink, Exporter};

#[derive(Default)]
struct RecordingSink {
    saved: Vec<(String, Vec<u8>)>,
    alerts: Vec<String>,
    fail_save: bool,
}

impl ExportSink for RecordingSink {
    fn save(&mut self, file_name: &str, bytes: &[u8]) -> Result<(), Error> {
        if self.fail_save {
            return Err(Error::Io(std::io::Error::other("disk full")));
        }
        self.saved.push((file_name.to_string(), bytes.to_vec()));
        Ok(())
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }
}

#[test]
fn pdf_export_saves_under_name() {
    common::init_logging();
    let mut exporter = Exporter::new(RecordingSink::default(), Default::default());
    let file = exporter.export_pdf("<p>hi</p>", "notes").expect("export");

    assert_eq!(file, "notes.pdf");
    assert!(!exporter.is_exporting());
    let sink = exporter.into_sink();
    assert_eq!(sink.saved.len(), 1);
    assert!(sink.saved[0].1.starts_with(b"%PDF-"));
    assert!(sink.alerts.is_empty());
}

#[test]
fn docx_export_is_a_zip() {
    let mut exporter = Exporter::new(RecordingSink::default(), Default::default());
    exporter.export_docx("<p>hi</p>", "notes").expect("export");
    let sink = exporter.into_sink();
    assert_eq!(sink.saved[0].0, "notes.docx");
    assert!(sink.saved[0].1.starts_with(b"PK"));
}

#[test]
fn failed_render_alerts_once_and_saves_nothing() {
    let mut exporter = Exporter::new(RecordingSink::default(), Default::default());
    let flag = exporter.exporting_flag();
    let seen_in_flight = Rc::new(Cell::new(false));
    let seen = Rc::clone(&seen_in_flight);

    let result = exporter.export_with(ExportKind::Pdf, "broken", || {
        seen.set(flag.get());
        Err(Error::Pdf("boom".to_string()))
    });

    assert!(result.is_err());
    assert!(seen_in_flight.get(), "flag is set while rendering");
    assert!(!exporter.is_exporting());
    assert!(exporter.sink().saved.is_empty());
    assert_eq!(
        exporter.sink().alerts,
        vec!["Failed to export PDF. Please try again.".to_string()]
    );
}

#[test]
fn failed_save_alerts_too() {
    let sink = RecordingSink {
        fail_save: true,
        ..RecordingSink::default()
    };
    let mut exporter = Exporter::new(sink, Default::default());
    assert!(exporter.export_docx("<p>x</p>", "doc").is_err());
    assert!(!exporter.is_exporting());
    assert_eq!(exporter.sink().alerts, vec![ExportKind::Docx.failure_message()]);
}

#[test]
fn options_changes_apply_to_next_export() {
    let mut exporter = Exporter::new(RecordingSink::default(), Default::default());
    exporter.options_mut().page_format = richdoc_export::PageFormatId::A5;
    exporter.export_docx("<p>x</p>", "a5").expect("export");
    let sink = exporter.into_sink();
    let xml = common::docx_part(&sink.saved[0].1, "word/document.xml").expect("document");
    assert!(xml.contains(r#"w:left="1080""#));
}

#[test]
fn directory_sink_writes_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut exporter = Exporter::new(DirectorySink::new(dir.path()), Default::default());
    exporter.export_pdf("<p>on disk</p>", "report").expect("export");

    let written = std::fs::read(dir.path().join("report.pdf")).expect("saved file");
    assert!(written.starts_with(b"%PDF-"));
    let entries = std::fs::read_dir(dir.path()).expect("list").count();
    assert_eq!(entries, 1, "no temporary files left behind");
}

#[test]
fn directory_sink_reports_missing_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("nope");
    let mut exporter = Exporter::new(DirectorySink::new(&missing), Default::default());
    assert!(exporter.export_pdf("<p>x</p>", "report").is_err());
    assert!(!missing.exists());
}

#[test]
fn convert_writes_only_the_target_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let pdf = dir.path().join("out.pdf");
    let docx = dir.path().join("out.docx");
    richdoc_export::convert_html_to_pdf("<p>x</p>", &pdf, &Default::default()).expect("pdf");
    richdoc_export::convert_html_to_docx("<p>x</p>", &docx, &Default::default()).expect("docx");

    assert!(std::fs::read(&pdf).expect("pdf file").starts_with(b"%PDF-"));
    assert!(std::fs::read(&docx).expect("docx file").starts_with(b"PK"));
    let entries = std::fs::read_dir(dir.path()).expect("list").count();
    assert_eq!(entries, 2, "no temporary files left behind");
}

#[test]
fn convert_into_missing_directory_fails_cleanly() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("nope");
    let target = missing.join("out.pdf");
    let result = richdoc_export::convert_html_to_pdf("<p>x</p>", &target, &Default::default());
    assert!(matches!(result, Err(Error::Io(_))));
    assert!(!target.exists());
    assert_eq!(std::fs::read_dir(dir.path()).expect("list").count(), 0);
}
