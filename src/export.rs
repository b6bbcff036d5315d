//! Export sessions: render, save under `<name>.<ext>`, alert on failure.

use std::cell::Cell;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::ExportOptions;
use crate::error::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportKind {
    Pdf,
    Docx,
}

impl ExportKind {
    pub fn extension(self) -> &'static str {
        match self {
            ExportKind::Pdf => "pdf",
            ExportKind::Docx => "docx",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExportKind::Pdf => "PDF",
            ExportKind::Docx => "DOCX",
        }
    }

    pub fn file_name(self, name: &str) -> String {
        format!("{name}.{}", self.extension())
    }

    pub fn failure_message(self) -> String {
        format!("Failed to export {}. Please try again.", self.label())
    }
}

/// Where finished exports go and how failures reach the user.
pub trait ExportSink {
    fn save(&mut self, file_name: &str, bytes: &[u8]) -> Result<(), Error>;
    fn alert(&mut self, message: &str);
}

/// Write `bytes` to a temporary file next to `target`, then rename it into
/// place. A failed write leaves no partial file behind.
pub(crate) fn write_atomically(target: &Path, bytes: &[u8]) -> Result<(), Error> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(target).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

/// Saves into a directory through `write_atomically`. Alerts are logged.
#[derive(Clone, Debug)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ExportSink for DirectorySink {
    fn save(&mut self, file_name: &str, bytes: &[u8]) -> Result<(), Error> {
        let target = self.dir.join(file_name);
        write_atomically(&target, bytes)?;
        log::info!("saved {} ({} bytes)", target.display(), bytes.len());
        Ok(())
    }

    fn alert(&mut self, message: &str) {
        log::error!("{message}");
    }
}

/// Clears the in-flight flag on every exit path.
struct InFlight<'a>(&'a Cell<bool>);

impl<'a> InFlight<'a> {
    fn start(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

pub struct Exporter<S: ExportSink> {
    sink: S,
    options: ExportOptions,
    exporting: Rc<Cell<bool>>,
}

impl<S: ExportSink> Exporter<S> {
    pub fn new(sink: S, options: ExportOptions) -> Self {
        Self {
            sink,
            options,
            exporting: Rc::new(Cell::new(false)),
        }
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting.get()
    }

    /// Shared view of the in-flight flag, e.g. for disabling export
    /// controls while a render runs.
    pub fn exporting_flag(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.exporting)
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut ExportOptions {
        &mut self.options
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn export_pdf(&mut self, html: &str, name: &str) -> Result<String, Error> {
        let options = self.options.clone();
        self.export_with(ExportKind::Pdf, name, || crate::render_pdf(html, &options))
    }

    pub fn export_docx(&mut self, html: &str, name: &str) -> Result<String, Error> {
        let options = self.options.clone();
        self.export_with(ExportKind::Docx, name, || crate::render_docx(html, &options))
    }

    /// Run `render` and save its bytes as `<name>.<ext>`. On failure
    /// nothing is saved, the user gets one alert and the error is returned.
    pub fn export_with(
        &mut self,
        kind: ExportKind,
        name: &str,
        render: impl FnOnce() -> Result<Vec<u8>, Error>,
    ) -> Result<String, Error> {
        let _in_flight = InFlight::start(&self.exporting);
        let file_name = kind.file_name(name);
        let result = render().and_then(|bytes| {
            self.sink.save(&file_name, &bytes)?;
            Ok(file_name)
        });
        if let Err(e) = &result {
            log::error!("{} export error: {e}", kind.label());
            self.sink.alert(&kind.failure_message());
        }
        result
    }
}
