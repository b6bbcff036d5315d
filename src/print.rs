//! Standalone print document: the editor HTML wrapped in the print
//! stylesheet, sized for the chosen page format.

use crate::ExportOptions;
use crate::geometry::resolve_format;
use crate::template::{self, TemplatePart};

/// Delay between load and the print dialog, letting layout settle.
pub const PRINT_DELAY_MS: u32 = 250;

const PRINT_CSS: &str = r#"
    * {
      margin: 0;
      padding: 0;
      box-sizing: border-box;
    }

    body {
      font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
      line-height: 1.6;
      color: #000;
      background: white;
    }

    @media print {
      body {
        margin: 0;
        padding: 0;
      }
    }

    h1 { font-size: 28px; font-weight: bold; margin: 20px 0 10px 0; page-break-after: avoid; }
    h2 { font-size: 22px; font-weight: bold; margin: 16px 0 8px 0; page-break-after: avoid; }
    h3 { font-size: 16px; font-weight: bold; margin: 12px 0 6px 0; page-break-after: avoid; }
    p { margin: 8px 0; text-align: justify; }
    ul, ol { margin: 8px 0 8px 20px; page-break-inside: avoid; }
    li { margin: 4px 0; }
    table { width: 100%; border-collapse: collapse; margin: 12px 0; page-break-inside: avoid; }
    th, td { border: 1px solid #ddd; padding: 8px; text-align: left; }
    th { background-color: #f5f5f5; font-weight: bold; }
    mark { background-color: #ffff00; padding: 0 2px; }
    strong { font-weight: bold; }
    em { font-style: italic; }
    u { text-decoration: underline; }
    s { text-decoration: line-through; }
    code { background-color: #f0f0f0; padding: 2px 6px; border-radius: 3px; font-family: "Courier New", monospace; }
    pre { background-color: #f5f5f5; padding: 12px; border-radius: 5px; overflow-x: auto; page-break-inside: avoid; }
    blockquote { border-left: 4px solid #ccc; padding-left: 16px; margin-left: 0; color: #666; page-break-inside: avoid; }
"#;

fn css_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\A "),
            // Keeps "</style>" from closing the element early.
            '<' => out.push_str("\\3C "),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// CSS `content` value for a header/footer template.
pub fn css_content(tpl: &str) -> String {
    template::split(tpl)
        .into_iter()
        .map(|part| match part {
            TemplatePart::Text(text) => css_string(text),
            TemplatePart::PageNumber => "counter(page)".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn page_rule(options: &ExportOptions) -> String {
    let f = resolve_format(options.page_format);
    let mut css = format!(
        "@page {{\n      size: {}in {}in;\n      margin: {}in {}in {}in {}in;\n",
        f.width, f.height, f.margin_top, f.margin_right, f.margin_bottom, f.margin_left
    );
    let hf = &options.header_footer;
    for (slot, tpl) in [
        ("top-left", &hf.header_left),
        ("top-right", &hf.header_right),
        ("bottom-left", &hf.footer_left),
        ("bottom-right", &hf.footer_right),
    ] {
        if !tpl.is_empty() {
            css.push_str(&format!(
                "      @{slot} {{ content: {}; font-size: 10pt; color: #808080; }}\n",
                css_content(tpl)
            ));
        }
    }
    css.push_str("    }\n");
    css
}

/// Build the complete print document for `html`.
pub fn render_print_document(html: &str, options: &ExportOptions) -> String {
    let format = resolve_format(options.page_format);
    log::debug!("print document for {} ({} bytes)", format.name, html.len());
    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="UTF-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0" />
    <title>Print Document</title>
    <style>{css}
    {page}
    </style>
  </head>
  <body>
    <div class="print-content">
{html}
    </div>
    <script>
      window.onload = function() {{
        setTimeout(function() {{
          window.print();
        }}, {delay});
      }};
    </script>
  </body>
</html>
"#,
        css = PRINT_CSS,
        page = page_rule(options),
        html = html,
        delay = PRINT_DELAY_MS,
    )
}
