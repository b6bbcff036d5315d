use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use richdoc_export::export::{DirectorySink, ExportKind, Exporter};
use richdoc_export::geometry::{resolve_format, to_pixel_dimensions};
use richdoc_export::pagination::compute_layout;
use richdoc_export::{Error, ExportOptions, HeaderFooterSettings, PageFormatId};

#[derive(Parser)]
#[command(name = "richdoc-export")]
#[command(version)]
#[command(about = "Paginate rich-text editor HTML and export it to PDF, DOCX or print HTML", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct PageArgs {
    /// Page format: letter, legal, tabloid, a3, a4 or a5
    #[arg(long, default_value = "letter")]
    format: String,
}

#[derive(Args)]
struct ExportArgs {
    /// Editor HTML, or - for stdin
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output file (defaults to <input name>.<ext> in the current directory)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    #[command(flatten)]
    page: PageArgs,

    /// Header/footer settings as JSON
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,

    #[arg(long)]
    header_left: Option<String>,
    #[arg(long)]
    header_right: Option<String>,
    #[arg(long)]
    footer_left: Option<String>,
    #[arg(long)]
    footer_right: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Export to PDF
    Pdf(ExportArgs),
    /// Export to DOCX
    Docx(ExportArgs),
    /// Write the standalone print document (stdout if no output given)
    Print(ExportArgs),
    /// Show on-screen page breaks for a content height in pixels
    Pages {
        #[arg(value_name = "PX")]
        content_height: f32,

        #[command(flatten)]
        page: PageArgs,
    },
}

fn read_input(path: &Path) -> Result<String, Error> {
    if path == Path::new("-") {
        let mut html = String::new();
        std::io::stdin().read_to_string(&mut html)?;
        Ok(html)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}

fn export_options(args: &ExportArgs) -> Result<ExportOptions, Box<dyn std::error::Error>> {
    let mut header_footer = match &args.settings {
        Some(path) => {
            let json = std::fs::read_to_string(path)?;
            serde_json::from_str::<HeaderFooterSettings>(&json)?
        }
        None => HeaderFooterSettings::default(),
    };
    let overrides = [
        (&args.header_left, &mut header_footer.header_left),
        (&args.header_right, &mut header_footer.header_right),
        (&args.footer_left, &mut header_footer.footer_left),
        (&args.footer_right, &mut header_footer.footer_right),
    ];
    for (value, slot) in overrides {
        if let Some(v) = value {
            *slot = v.clone();
        }
    }
    Ok(ExportOptions {
        page_format: PageFormatId::parse_or_default(&args.page.format),
        header_footer,
    })
}

fn document_name(input: &Path) -> String {
    input
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| *s != "-")
        .unwrap_or("document")
        .to_string()
}

fn export(kind: ExportKind, args: &ExportArgs) -> Result<(), Box<dyn std::error::Error>> {
    let html = read_input(&args.input)?;
    let options = export_options(args)?;
    match &args.output {
        Some(output) => match kind {
            ExportKind::Pdf => richdoc_export::convert_html_to_pdf(&html, output, &options)?,
            ExportKind::Docx => richdoc_export::convert_html_to_docx(&html, output, &options)?,
        },
        None => {
            let mut exporter = Exporter::new(DirectorySink::new("."), options);
            let name = document_name(&args.input);
            let file = match kind {
                ExportKind::Pdf => exporter.export_pdf(&html, &name)?,
                ExportKind::Docx => exporter.export_docx(&html, &name)?,
            };
            println!("{file}");
        }
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Pdf(args) => export(ExportKind::Pdf, &args),
        Commands::Docx(args) => export(ExportKind::Docx, &args),
        Commands::Print(args) => {
            let html = read_input(&args.input)?;
            let options = export_options(&args)?;
            let doc = richdoc_export::print::render_print_document(&html, &options);
            match &args.output {
                Some(path) => std::fs::write(path, doc)?,
                None => print!("{doc}"),
            }
            Ok(())
        }
        Commands::Pages {
            content_height,
            page,
        } => {
            let format = resolve_format(PageFormatId::parse_or_default(&page.format));
            let layout = compute_layout(content_height, &to_pixel_dimensions(format));
            println!(
                "{}: {} page(s), {:.0}px of content per page",
                format.name, layout.total_pages, layout.content_height
            );
            for b in &layout.page_breaks {
                println!("  page {} starts at {:.0}px", b.page_number, b.top_offset);
            }
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
