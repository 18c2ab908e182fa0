use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scrape a story page, its chapters and their text into one JSON record.
    Scrape(ScrapeArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Engine {
    /// Headless Chromium via the DevTools protocol.
    Chrome,
    /// Plain HTTP GET parsed as static HTML (no scripts run).
    Static,
}

#[derive(Debug, Args)]
pub struct ScrapeArgs {
    /// Story page URL (must be http/https and under --base-url).
    #[arg(long)]
    pub url: String,

    /// Output JSON file.
    #[arg(long, default_value = "meta.json")]
    pub out: String,

    /// Overwrite --out if it already exists.
    #[arg(long, default_value_t = false)]
    pub force: bool,

    /// Page engine used to render story and chapter pages.
    #[arg(long, value_enum, default_value_t = Engine::Chrome)]
    pub engine: Engine,

    /// Site origin; the auxiliary endpoints are resolved against it.
    #[arg(long, default_value = crate::fetch::DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Per-request and per-navigation timeout.
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Retries for transient endpoint failures.
    #[arg(long, default_value_t = 3)]
    pub retries: u32,

    /// Chromium executable (defaults to auto-detection).
    #[arg(long)]
    pub chrome_path: Option<String>,

    /// Show the browser window instead of running headless.
    #[arg(long, default_value_t = false)]
    pub headful: bool,
}
