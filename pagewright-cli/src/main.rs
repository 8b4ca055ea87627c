use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pagewright::{
    BorderSides, CellAdvance, CellBorder, CellOptions, Color, ColumnLayout, Document,
    DocumentConfig, ImageSource, Orientation, PageSize, PageTemplate, TextAlign, Unit,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "pagewright",
    about = "Procedural PDF generation demos",
    version,
    author
)]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct PageArgs {
    /// Output file path
    #[arg(short, long)]
    output: PathBuf,

    /// User unit: pt, mm, cm or in
    #[arg(long, default_value = "mm")]
    unit: Unit,

    /// Page format: a3, a4, a5, letter or legal
    #[arg(long, default_value = "a4")]
    page_size: PageSize,

    /// Page orientation: portrait or landscape
    #[arg(long, default_value = "portrait")]
    orientation: Orientation,

    /// Write uncompressed content streams
    #[arg(long)]
    no_compress: bool,
}

impl PageArgs {
    fn document(&self) -> Document {
        Document::with_config(DocumentConfig {
            orientation: self.orientation,
            unit: self.unit,
            page_size: self.page_size,
            compress: !self.no_compress,
        })
    }
}

#[derive(Subcommand)]
enum Commands {
    /// A single page saying hello
    Hello {
        #[command(flatten)]
        page: PageArgs,
    },

    /// Header, page footer and numbered lines over several pages
    Report {
        #[command(flatten)]
        page: PageArgs,

        /// Document title, shown in the header
        #[arg(short, long, default_value = "Title")]
        title: String,

        /// Number of lines to print
        #[arg(short, long, default_value = "40")]
        lines: usize,
    },

    /// One chapter per text file, with justified bodies
    Chapters {
        #[command(flatten)]
        page: PageArgs,

        /// Chapter text files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Chapters flowed through three columns
    Columns {
        #[command(flatten)]
        page: PageArgs,

        /// Chapter text files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Basic, improved and fancy tables from `;`-separated rows
    Table {
        #[command(flatten)]
        page: PageArgs,

        /// Data file: country;capital;area;population per line
        #[arg(short, long)]
        data: Option<PathBuf>,
    },

    /// Flowing text with inline tags and links
    Markup {
        #[command(flatten)]
        page: PageArgs,

        /// Logo placed on the second page, linked to the project site
        #[arg(long)]
        logo: Option<PathBuf>,
    },

    /// Place an image file on a page
    Image {
        #[command(flatten)]
        page: PageArgs,

        /// PNG or JPEG file
        input: PathBuf,

        /// Width in user units (0 keeps the aspect ratio)
        #[arg(short = 'W', long, default_value = "0")]
        width: f64,

        /// Height in user units (0 keeps the aspect ratio)
        #[arg(short = 'H', long, default_value = "0")]
        height: f64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let (page, mut doc) = match &cli.command {
        Commands::Hello { page } => (page, hello(page.document())?),
        Commands::Report { page, title, lines } => {
            (page, report(page.document(), title, *lines)?)
        }
        Commands::Chapters { page, files } => (page, chapters(page.document(), files, false)?),
        Commands::Columns { page, files } => (page, chapters(page.document(), files, true)?),
        Commands::Table { page, data } => (page, tables(page.document(), data.as_deref())?),
        Commands::Markup { page, logo } => (page, markup(page.document(), logo.as_deref())?),
        Commands::Image {
            page,
            input,
            width,
            height,
        } => (page, image(page.document(), input, *width, *height)?),
    };

    doc.save(&page.output)
        .with_context(|| format!("Failed to write {}", page.output.display()))?;
    info!(pages = doc.page_no(), "Wrote {}", page.output.display());
    println!(
        "PDF created successfully: {} ({} pages)",
        page.output.display(),
        doc.page_no()
    );
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn hello(mut doc: Document) -> Result<Document> {
    doc.add_page()?;
    doc.set_font("Arial", "B", 16.0)?;
    doc.cell(40.0, 10.0, "Hello World!", &CellOptions::default())?;
    Ok(doc)
}

/// Centered framed title on top of each page, page number at the bottom.
struct Letterhead {
    title: String,
    columns: bool,
}

impl PageTemplate for Letterhead {
    fn header(&mut self, doc: &mut Document) -> pagewright::Result<()> {
        doc.set_font("Arial", "B", 15.0)?;
        let width = doc.string_width(&self.title)? + 6.0;
        doc.set_x((doc.page_width() - width) / 2.0);
        doc.set_draw_color(Color::rgb8(0, 80, 180));
        doc.set_fill_color(Color::rgb8(230, 230, 0));
        doc.set_text_color(Color::rgb8(220, 50, 50));
        doc.set_line_width(0.3);
        let options = CellOptions::new()
            .border(CellBorder::Frame)
            .advance(CellAdvance::NextLine)
            .align(TextAlign::Center)
            .fill(true);
        doc.cell(width, 9.0, &self.title, &options)?;
        doc.ln(Some(10.0));
        doc.set_text_color(Color::black());

        if self.columns {
            let top = doc.y();
            if let Some(layout) = doc.page_break_policy_mut::<ColumnLayout>() {
                layout.set_top(top);
            }
        }
        Ok(())
    }

    fn footer(&mut self, doc: &mut Document) -> pagewright::Result<()> {
        doc.set_y(-15.0);
        doc.set_font("Arial", "I", 8.0)?;
        doc.set_text_color(Color::gray8(128));
        let label = format!("Page {}/{{nb}}", doc.page_no());
        doc.cell(0.0, 10.0, &label, &CellOptions::new().align(TextAlign::Center))?;
        Ok(())
    }
}

fn report(mut doc: Document, title: &str, lines: usize) -> Result<Document> {
    doc.set_title(title);
    doc.alias_page_count("{nb}");
    doc.set_page_template(Letterhead {
        title: title.to_string(),
        columns: false,
    });
    doc.add_page()?;
    doc.set_font("Times", "", 12.0)?;
    let line = CellOptions::new().advance(CellAdvance::NextLine);
    for i in 1..=lines {
        doc.cell(0.0, 10.0, &format!("Printing line number {i}"), &line)?;
    }
    Ok(doc)
}

fn chapters(mut doc: Document, files: &[PathBuf], columns: bool) -> Result<Document> {
    let title = "20000 Leagues Under the Seas";
    doc.set_title(title);
    doc.set_author("Jules Verne");
    doc.alias_page_count("{nb}");
    doc.set_page_template(Letterhead {
        title: title.to_string(),
        columns,
    });

    let left = doc.left_margin();
    for (index, path) in files.iter().enumerate() {
        let body = fs::read_to_string(path)
            .with_context(|| format!("Failed to read chapter {}", path.display()))?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().replace(['_', '-'], " "))
            .unwrap_or_default();
        debug!(chapter = index + 1, bytes = body.len(), "Adding chapter {name}");

        doc.add_page()?;
        chapter_title(&mut doc, index + 1, &name)?;
        if columns {
            let mut layout = ColumnLayout::new(left, 60.0, 10.0, 3);
            layout.set_top(doc.y());
            doc.set_page_break_policy(layout);
            chapter_body(&mut doc, &body, 60.0)?;
            // back to the first column for the next chapter
            doc.set_left_margin(left);
        } else {
            chapter_body(&mut doc, &body, 0.0)?;
        }
    }
    Ok(doc)
}

fn chapter_title(doc: &mut Document, number: usize, label: &str) -> Result<()> {
    doc.set_font("Arial", "", 12.0)?;
    doc.set_fill_color(Color::rgb8(200, 220, 255));
    let options = CellOptions::new()
        .advance(CellAdvance::NextLine)
        .fill(true);
    doc.cell(0.0, 6.0, &format!("Chapter {number} : {label}"), &options)?;
    doc.ln(Some(4.0));
    Ok(())
}

fn chapter_body(doc: &mut Document, body: &str, width: f64) -> Result<()> {
    doc.set_font("Times", "", 12.0)?;
    doc.multi_cell(width, 5.0, body, CellBorder::None, TextAlign::Justified, false)?;
    doc.ln(None);
    doc.set_font("", "I", 0.0)?;
    doc.cell(width, 5.0, "(end of excerpt)", &CellOptions::default())?;
    Ok(())
}

const TABLE_HEADER: [&str; 4] = ["Country", "Capital", "Area (sq km)", "Pop. (thousands)"];

const SAMPLE_ROWS: &str = "\
Austria;Vienna;83859;8075
Belgium;Brussels;30518;10192
Denmark;Copenhagen;43094;5295
Finland;Helsinki;304529;5147
France;Paris;543965;58728
Germany;Berlin;357022;82057
Greece;Athens;131625;10511
Ireland;Dublin;70723;3694
Italy;Roma;301316;57563
Luxembourg;Luxembourg;2586;424
Netherlands;Amsterdam;41526;15654
Portugal;Lisbon;91906;9957
Spain;Madrid;504790;39348
Sweden;Stockholm;410934;8839
United Kingdom;London;243820;58862";

fn load_rows(text: &str) -> Vec<Vec<String>> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.split(';').map(|field| field.trim().to_string()).collect())
        .collect()
}

fn tables(mut doc: Document, data: Option<&Path>) -> Result<Document> {
    let rows = match data {
        Some(path) => load_rows(
            &fs::read_to_string(path)
                .with_context(|| format!("Failed to read table data {}", path.display()))?,
        ),
        None => load_rows(SAMPLE_ROWS),
    };
    doc.set_font("Arial", "", 14.0)?;

    doc.add_page()?;
    basic_table(&mut doc, &rows)?;
    doc.add_page()?;
    improved_table(&mut doc, &rows)?;
    doc.add_page()?;
    fancy_table(&mut doc, &rows)?;
    Ok(doc)
}

fn field(row: &[String], index: usize) -> &str {
    row.get(index).map(String::as_str).unwrap_or("")
}

fn basic_table(doc: &mut Document, rows: &[Vec<String>]) -> Result<()> {
    let frame = CellOptions::new().border(CellBorder::Frame);
    for heading in TABLE_HEADER {
        doc.cell(40.0, 7.0, heading, &frame)?;
    }
    doc.ln(None);
    for row in rows {
        for column in 0..TABLE_HEADER.len() {
            doc.cell(40.0, 6.0, field(row, column), &frame)?;
        }
        doc.ln(None);
    }
    Ok(())
}

/// `1234567` as `1,234,567`.
fn group_thousands(value: &str) -> String {
    let digits: Vec<char> = value.chars().collect();
    if digits.is_empty() || !digits.iter().all(char::is_ascii_digit) {
        return value.to_string();
    }
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(*digit);
    }
    out
}

const WIDTHS: [f64; 4] = [40.0, 35.0, 40.0, 45.0];

fn data_cells(doc: &mut Document, row: &[String], sides: BorderSides, fill: bool) -> Result<()> {
    let border = CellBorder::Sides(sides);
    for (column, width) in WIDTHS.iter().enumerate() {
        let (text, align) = if column < 2 {
            (field(row, column).to_string(), TextAlign::Left)
        } else {
            (group_thousands(field(row, column)), TextAlign::Right)
        };
        let options = CellOptions::new().border(border).align(align).fill(fill);
        doc.cell(*width, 6.0, &text, &options)?;
    }
    doc.ln(None);
    Ok(())
}

fn improved_table(doc: &mut Document, rows: &[Vec<String>]) -> Result<()> {
    for (heading, width) in TABLE_HEADER.iter().zip(WIDTHS) {
        let options = CellOptions::new()
            .border(CellBorder::Frame)
            .align(TextAlign::Center);
        doc.cell(width, 7.0, heading, &options)?;
    }
    doc.ln(None);
    for row in rows {
        data_cells(doc, row, BorderSides::LEFT | BorderSides::RIGHT, false)?;
    }
    let closing = CellOptions::new().border(CellBorder::Sides(BorderSides::TOP));
    doc.cell(WIDTHS.iter().sum(), 0.0, "", &closing)?;
    Ok(())
}

fn fancy_table(doc: &mut Document, rows: &[Vec<String>]) -> Result<()> {
    doc.set_fill_color(Color::rgb8(255, 0, 0));
    doc.set_text_color(Color::white());
    doc.set_draw_color(Color::rgb8(128, 0, 0));
    doc.set_line_width(0.3);
    doc.set_font("", "B", 0.0)?;
    for (heading, width) in TABLE_HEADER.iter().zip(WIDTHS) {
        let options = CellOptions::new()
            .border(CellBorder::Frame)
            .align(TextAlign::Center)
            .fill(true);
        doc.cell(width, 7.0, heading, &options)?;
    }
    doc.ln(None);

    doc.set_fill_color(Color::rgb8(224, 235, 255));
    doc.set_text_color(Color::black());
    doc.set_font("", "", 0.0)?;
    for (index, row) in rows.iter().enumerate() {
        data_cells(doc, row, BorderSides::LEFT | BorderSides::RIGHT, index % 2 == 1)?;
    }
    let closing = CellOptions::new().border(CellBorder::Sides(BorderSides::TOP));
    doc.cell(WIDTHS.iter().sum(), 0.0, "", &closing)?;
    Ok(())
}

const PROJECT_URL: &str = "https://github.com/pagewright/pagewright";

fn markup(mut doc: Document, logo: Option<&Path>) -> Result<Document> {
    doc.add_page()?;
    doc.set_font("Arial", "", 20.0)?;
    doc.write(5.0, "To find out what's new in this tutorial, click ", None)?;
    doc.set_font("", "U", 0.0)?;
    let next_page = doc.add_link();
    doc.write(5.0, "here", Some(next_page.into()))?;
    doc.set_font("", "", 0.0)?;

    doc.add_page()?;
    doc.set_link(next_page, None, None)?;
    if let Some(logo) = logo {
        doc.image(
            &ImageSource::path(logo),
            Some(10.0),
            Some(12.0),
            30.0,
            0.0,
            Some(PROJECT_URL.into()),
        )
        .with_context(|| format!("Failed to place logo {}", logo.display()))?;
    }
    doc.set_left_margin(45.0);
    doc.set_font_size(14.0);
    let text = format!(
        "You can now easily print text mixing different styles: <b>bold</b>, <i>italic</i>, \
         <u>underlined</u>, or <b><i><u>all at once</u></i></b>!<br><br>You can also insert \
         links on text, such as <a href=\"{PROJECT_URL}\">{PROJECT_URL}</a>, or on an image: \
         click on the logo."
    );
    doc.write_markup(5.0, &text)?;
    Ok(doc)
}

fn image(mut doc: Document, input: &Path, width: f64, height: f64) -> Result<Document> {
    doc.add_page()?;
    let source = ImageSource::path(input);
    doc.image(&source, None, None, width, height, None)
        .with_context(|| format!("Failed to place image {}", input.display()))?;
    Ok(doc)
}
