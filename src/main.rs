// sitemark CLI: convert URLs to clean, citation-annotated markdown.
//
// The binary owns argument parsing, logging setup, and file writing; all
// pipeline logic lives in the library.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use sitemark::{
    BrowserSession, ConversionOptions, CrawlOptions, FetchOptions, FetchResult, Fetcher,
    RefineOptions, add_citations, clean_markdown, crawl, fetch_one, html_to_markdown, refine,
    url_to_slug,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Converted page content (default).
    Markdown,
    /// Full-page PNG screenshot (requires browser rendering).
    Screenshot,
    /// Printed PDF (requires headless browser rendering).
    Pdf,
}

#[derive(Parser)]
#[command(
    name = "sitemark",
    about = "Convert web pages to clean, citation-annotated markdown",
    version
)]
struct Cli {
    /// URL to fetch (http or https)
    source: String,

    /// Output mode
    #[arg(short, long, value_enum, default_value_t = Mode::Markdown)]
    mode: Mode,

    /// Output file or directory; omit for stdout (markdown mode only)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Custom filename stem (defaults to a slug of the URL)
    #[arg(short, long)]
    filename: Option<String>,

    /// Disable boilerplate removal
    #[arg(long)]
    raw: bool,

    /// CSS selector for content targeting
    #[arg(long)]
    selector: Option<String>,

    /// Force browser rendering (for JS-heavy sites)
    #[arg(long)]
    browser: bool,

    /// Show the browser window
    #[arg(long)]
    no_headless: bool,

    /// Page timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Annotate links with numbered citation references
    #[arg(long)]
    refs: bool,

    /// Follow same-domain links one level deep. Crawls with plain HTTP
    /// fetches unless --browser is also set; pass --browser for
    /// JS-rendered sites
    #[arg(long)]
    deep: bool,

    /// Maximum pages in deep mode, seed included
    #[arg(long, default_value_t = 10)]
    max_pages: usize,

    /// Glob pattern filter for deep-crawl URLs
    #[arg(long)]
    url_pattern: Option<String>,

    /// Deduplicate deep-crawl results by content fingerprint
    #[arg(long)]
    dedupe: bool,

    /// Sort deep-crawl results by date, newest first
    #[arg(long)]
    sort_by_date: bool,

    /// Keep only the first N deep-crawl results
    #[arg(long)]
    limit: Option<usize>,

    /// CSS selector to wait for before reading the page (implies --browser)
    #[arg(long)]
    wait_for: Option<String>,
}

impl Cli {
    fn needs_browser(&self) -> bool {
        self.browser
            || self.no_headless
            || self.wait_for.is_some()
            || !matches!(self.mode, Mode::Markdown)
    }

    fn fetch_options(&self) -> FetchOptions {
        let options = FetchOptions::default()
            .with_timeout_secs(self.timeout)
            .with_screenshot(matches!(self.mode, Mode::Screenshot))
            .with_pdf(matches!(self.mode, Mode::Pdf));
        match &self.wait_for {
            Some(selector) => options.with_wait_for(selector),
            None => options,
        }
    }

    fn conversion_options(&self) -> ConversionOptions {
        ConversionOptions {
            strip_boilerplate: !self.raw,
            selector: self.selector.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sitemark=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if !cli.source.starts_with("http://") && !cli.source.starts_with("https://") {
        bail!("source must be an http(s) URL: {}", cli.source);
    }

    let mut fetcher = if cli.needs_browser() {
        let mut session = BrowserSession::new(!cli.no_headless);
        session
            .open()
            .await
            .context("failed to open browser session")?;
        Fetcher::Rendered(session)
    } else {
        Fetcher::Static
    };

    let outcome = run(&cli, &mut fetcher).await;

    // The session must come down on every path, including errors.
    if let Fetcher::Rendered(session) = &mut fetcher {
        session.close().await;
    }

    outcome
}

async fn run(cli: &Cli, fetcher: &mut Fetcher) -> Result<()> {
    let fetch = cli.fetch_options();

    if cli.deep {
        let options = CrawlOptions::default()
            .with_max_pages(cli.max_pages)
            .with_fetch(fetch);
        let options = match &cli.url_pattern {
            Some(pattern) => options.with_url_pattern(pattern),
            None => options,
        };

        let results = crawl(&cli.source, fetcher, &options)
            .await
            .context("deep crawl failed")?;
        info!(pages = results.len(), "crawl finished");

        let refined = refine(
            results,
            &RefineOptions {
                dedupe: cli.dedupe,
                sort_by_date: cli.sort_by_date,
                limit: cli.limit,
            },
            &cli.conversion_options(),
        );

        // Deep mode always writes files, one set per page.
        let out_dir = cli
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from("./output"));
        std::fs::create_dir_all(&out_dir)
            .with_context(|| format!("failed to create {}", out_dir.display()))?;
        for result in &refined {
            let slug = url_to_slug(&result.final_url);
            write_result(cli, result, &out_dir, &slug)?;
        }
        return Ok(());
    }

    let result = fetch_one(&cli.source, fetcher, &fetch)
        .await
        .with_context(|| format!("failed to fetch {}", cli.source))?;
    let slug = cli
        .filename
        .clone()
        .unwrap_or_else(|| url_to_slug(&cli.source));

    match &cli.output {
        Some(output) => write_result(cli, &result, output, &slug),
        None => print_result(cli, &result),
    }
}

/// Write one page's output under `target` (a directory, or a file path
/// for single-page runs).
fn write_result(cli: &Cli, result: &FetchResult, target: &Path, slug: &str) -> Result<()> {
    match cli.mode {
        Mode::Markdown => {
            let converted = html_to_markdown(&result.html, &cli.conversion_options())?;
            let markdown = clean_markdown(&converted);
            let (markdown, references) = if cli.refs {
                add_citations(&markdown)
            } else {
                (markdown, String::new())
            };

            let path = resolve_target(target, slug, "md");
            write_file(&path, markdown.as_bytes())?;
            if !references.is_empty() {
                let refs_path = path.with_file_name(format!("{slug}_refs.md"));
                write_file(&refs_path, references.as_bytes())?;
            }
            Ok(())
        }
        Mode::Screenshot => {
            let Some(bytes) = &result.screenshot else {
                bail!("no screenshot data in fetch result");
            };
            write_file(&resolve_target(target, slug, "png"), bytes)
        }
        Mode::Pdf => {
            let Some(bytes) = &result.pdf else {
                bail!("no PDF data in fetch result (PDF capture needs headless mode)");
            };
            write_file(&resolve_target(target, slug, "pdf"), bytes)
        }
    }
}

/// Print a single markdown result to stdout. Binary modes have no stdout
/// form and require `--output`.
fn print_result(cli: &Cli, result: &FetchResult) -> Result<()> {
    if !matches!(cli.mode, Mode::Markdown) {
        bail!("{:?} mode requires -o/--output", cli.mode);
    }

    let converted = html_to_markdown(&result.html, &cli.conversion_options())?;
    println!("{}", sitemark::markdown::finalize(&converted, cli.refs));
    Ok(())
}

/// `target` is treated as a directory when it already is one or is
/// spelled with a trailing slash; otherwise it is the file path itself.
fn resolve_target(target: &Path, slug: &str, extension: &str) -> PathBuf {
    let spelled_as_dir = target.to_string_lossy().ends_with('/');
    if target.is_dir() || spelled_as_dir {
        target.join(format!("{slug}.{extension}"))
    } else {
        target.to_path_buf()
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "saved");
    Ok(())
}
