pub mod docx;
mod error;
pub mod events;
pub mod export;
mod fonts;
pub mod geometry;
pub mod html;
pub mod model;
pub mod pagination;
mod pdf;
pub mod print;
pub mod template;

pub use error::Error;
pub use geometry::PageFormatId;
pub use template::HeaderFooterSettings;

use std::path::Path;
use std::time::Instant;

/// Page format and header/footer templates shared by every exporter.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct ExportOptions {
    pub page_format: PageFormatId,
    pub header_footer: HeaderFooterSettings,
}

/// Render editor HTML to PDF bytes.
pub fn render_pdf(html: &str, options: &ExportOptions) -> Result<Vec<u8>, Error> {
    let doc = html::normalize(html);
    pdf::render(&doc, options)
}

/// Render editor HTML to `.docx` bytes.
pub fn render_docx(html: &str, options: &ExportOptions) -> Result<Vec<u8>, Error> {
    let doc = html::normalize(html);
    docx::render(&doc, options)
}

pub fn convert_html_to_pdf(html: &str, output: &Path, options: &ExportOptions) -> Result<(), Error> {
    let t0 = Instant::now();

    let doc = html::normalize(html);
    let t_parse = t0.elapsed();

    let bytes = pdf::render(&doc, options)?;
    let t_render = t0.elapsed();

    export::write_atomically(output, &bytes)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: parse={:.1}ms, render={:.1}ms, write={:.1}ms, total={:.1}ms (output {} bytes)",
        t_parse.as_secs_f64() * 1000.0,
        (t_render - t_parse).as_secs_f64() * 1000.0,
        (t_total - t_render).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        bytes.len(),
    );

    Ok(())
}

pub fn convert_html_to_docx(
    html: &str,
    output: &Path,
    options: &ExportOptions,
) -> Result<(), Error> {
    let t0 = Instant::now();

    let doc = html::normalize(html);
    let t_parse = t0.elapsed();

    let bytes = docx::render(&doc, options)?;
    let t_render = t0.elapsed();

    export::write_atomically(output, &bytes)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: parse={:.1}ms, render={:.1}ms, write={:.1}ms, total={:.1}ms (output {} bytes)",
        t_parse.as_secs_f64() * 1000.0,
        (t_render - t_parse).as_secs_f64() * 1000.0,
        (t_total - t_render).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        bytes.len(),
    );

    Ok(())
}
