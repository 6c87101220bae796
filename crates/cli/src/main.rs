use std::collections::BTreeMap;
use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use mdmirror_core::{
    CrawlResult, CrawlScope, ExtractConfig, FetchConfig, FileFetcher, HttpFetcher, LinkMode, MANIFEST_TEMPLATE,
    Metadata, PageFetcher, SiteCrawler, TemplateRenderer, extract, fetch_stdin,
};
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;
use url::Url;

mod echo;

use echo::{
    format_size, print_banner, print_detail, print_info, print_step, print_success, print_timing, print_warning,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Turn HTML pages into Markdown mirrors and llms.txt manifests
#[derive(Parser, Debug)]
#[command(name = "mdmirror")]
#[command(version)]
#[command(about = "Convert HTML pages into Markdown for LLM crawlers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one HTML page through a template
    Convert(ConvertArgs),
    /// List the pages a root page links to and render a manifest
    Crawl(CrawlArgs),
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Local HTML file (used when nothing is piped on stdin)
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// URL to fetch (used when neither stdin nor --file is given)
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Template name, e.g. html_to_md.jinja
    #[arg(short, long, value_name = "NAME")]
    template: String,

    /// Directory searched for the template before the built-ins
    #[arg(long, value_name = "DIR")]
    template_dir: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Rewrite relative links to Markdown mirrors under this root URL
    #[arg(long, value_name = "ROOT")]
    mirror_links: Option<String>,

    /// Keep at most this many links
    #[arg(long, value_name = "N")]
    max_links: Option<usize>,

    #[command(flatten)]
    http: HttpArgs,
}

#[derive(Args, Debug)]
struct CrawlArgs {
    /// Root page: an http(s) URL or a local HTML file
    #[arg(value_name = "ROOT")]
    root: String,

    /// Manifest template name
    #[arg(short, long, value_name = "NAME", default_value = MANIFEST_TEMPLATE)]
    template: String,

    /// Directory searched for the template before the built-ins
    #[arg(long, value_name = "DIR")]
    template_dir: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Print the discovered pages as JSON instead of a manifest
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    http: HttpArgs,
}

#[derive(Args, Debug)]
struct HttpArgs {
    /// HTTP timeout in seconds
    #[arg(long, default_value = "30", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,
}

impl HttpArgs {
    fn fetch_config(&self) -> FetchConfig {
        let mut config = FetchConfig { timeout: self.timeout, ..Default::default() };
        if let Some(user_agent) = &self.user_agent {
            config.user_agent = user_agent.clone();
        }
        config
    }
}

/// Where `convert` read its HTML from
enum Source {
    Stdin,
    File(PathBuf),
    Url(String),
}

impl Source {
    fn metadata(&self) -> Metadata {
        let mut metadata = Metadata::new();
        match self {
            Self::Stdin => {
                metadata.insert("source".to_string(), "stdin".to_string());
            }
            Self::File(path) => {
                metadata.insert("source".to_string(), "file".to_string());
                metadata.insert("source_url".to_string(), path.display().to_string());
            }
            Self::Url(url) => {
                metadata.insert("source".to_string(), "url".to_string());
                metadata.insert("source_url".to_string(), url.clone());
            }
        }
        metadata
    }

    fn describe(&self) -> String {
        match self {
            Self::Stdin => "stdin".to_string(),
            Self::File(path) => path.display().to_string(),
            Self::Url(url) => url.clone(),
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "mdmirror=debug,mdmirror_core=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.verbose {
        print_banner();
        print_info("Debug logging enabled");
        eprintln!();
    }

    match cli.command {
        Command::Convert(args) => convert(args, cli.verbose).await,
        Command::Crawl(args) => crawl(args, cli.verbose).await,
    }
}

async fn convert(args: ConvertArgs, verbose: bool) -> anyhow::Result<()> {
    let started = Instant::now();

    if verbose {
        print_step(1, 3, "Reading input");
    }
    let (html, source) = read_input(&args).await?;
    if verbose {
        print_detail("Source", &source.describe());
        print_detail("Size", &format_size(html.len()));
        eprintln!();
    }

    if verbose {
        print_step(2, 3, &format!("Loading template {}", args.template.bright_white()));
    }
    let renderer = TemplateRenderer::new(args.template_dir.as_deref(), &args.template)
        .with_context(|| format!("Failed to load template: {}", args.template))?;

    let links = match &args.mirror_links {
        Some(root) => {
            Url::parse(root).with_context(|| format!("Invalid --mirror-links root: {root}"))?;
            LinkMode::Mirror { root_origin: root.clone() }
        }
        None => LinkMode::Plain,
    };
    let config = ExtractConfig { links, max_links: args.max_links };

    if verbose {
        print_step(3, 3, "Rendering Markdown");
        print_detail("Links", config.links.tag());
    }
    let output = renderer
        .render_html(&html, source.metadata(), &config)
        .context("Failed to render Markdown")?;

    if verbose {
        print_timing("Total", started.elapsed());
        eprintln!();
    }

    write_output(args.output.as_deref(), &output)
}

/// Picks the input: non-empty piped stdin, then `--file`, then `--url`.
async fn read_input(args: &ConvertArgs) -> anyhow::Result<(String, Source)> {
    let stdin = std::io::stdin();
    if !stdin.is_terminal() {
        let piped = fetch_stdin().context("Failed to read from stdin")?;
        if !piped.trim().is_empty() {
            tracing::debug!(bytes = piped.len(), "reading HTML from stdin");
            return Ok((piped, Source::Stdin));
        }
        tracing::debug!("stdin is blank, falling back to --file/--url");
    }

    if let Some(path) = &args.file {
        tracing::debug!(path = %path.display(), "reading HTML from file");
        let html = FileFetcher
            .try_fetch(&path.to_string_lossy())
            .await
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        return Ok((html, Source::File(path.clone())));
    }

    if let Some(url) = &args.url {
        tracing::debug!(%url, "fetching HTML");
        let fetcher = HttpFetcher::new(&args.http.fetch_config()).context("Failed to build HTTP client")?;
        let fetched = fetcher.try_fetch(url).await;
        fetcher.close();
        let html = fetched.with_context(|| format!("Failed to fetch URL: {url}"))?;
        return Ok((html, Source::Url(url.clone())));
    }

    bail!("No input provided: pipe HTML on stdin or pass --file or --url")
}

async fn crawl(args: CrawlArgs, verbose: bool) -> anyhow::Result<()> {
    let started = Instant::now();

    if verbose {
        print_step(1, 2, &format!("Crawling {}", args.root.bright_white().underline()));
    }
    let remote = is_remote(&args.root);
    tracing::info!(root = %args.root, remote, "crawl started");
    let (pages, root_html, root) = if remote {
        let crawler = SiteCrawler::remote(&args.root, &args.http.fetch_config())
            .with_context(|| format!("Invalid crawl root: {}", args.root))?;
        collect(crawler).await
    } else {
        let crawler =
            SiteCrawler::local(&args.root).with_context(|| format!("Invalid crawl root: {}", args.root))?;
        collect(crawler).await
    };

    tracing::info!(root = %root, pages = pages.len(), "crawl done");
    if pages.is_empty() {
        bail!("No pages discovered from {}", args.root);
    }
    if pages.len() == 1 {
        print_warning("Only the root page was discovered");
    }
    if verbose {
        echo::print_crawl_summary(&pages);
        print_step(2, 2, "Writing output");
    }

    let output = if args.json {
        let listing: BTreeMap<&str, &str> = pages.iter().collect();
        let mut json = serde_json::to_string_pretty(&listing).context("Failed to serialize crawl result")?;
        json.push('\n');
        json
    } else {
        let renderer = TemplateRenderer::new(args.template_dir.as_deref(), &args.template)
            .with_context(|| format!("Failed to load template: {}", args.template))?;

        let mut metadata = Metadata::new();
        metadata.insert("source_url".to_string(), root);
        renderer
            .render_manifest(&extract(&root_html, metadata), &pages)
            .context("Failed to render manifest")?
    };

    if verbose {
        print_detail("Pages", &pages.len().to_string());
        print_timing("Total", started.elapsed());
        eprintln!();
    }

    write_output(args.output.as_deref(), &output)
}

/// Runs the crawl and keeps the root HTML around for the manifest.
async fn collect<F: PageFetcher, S: CrawlScope>(crawler: SiteCrawler<F, S>) -> (CrawlResult, String, String) {
    let (pages, root_html) = crawler.discover_with_root().await;
    let root = crawler.root().to_string();
    crawler.close();
    (pages, root_html, root)
}

fn is_remote(root: &str) -> bool {
    Url::parse(root).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

fn write_output(path: Option<&Path>, output: &str) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            fs::write(path, output).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None => print!("{}", output),
    }
    Ok(())
}
