use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use rand::Rng;

#[derive(Parser, Debug, Clone)]
#[command(name = "jobscraper", about = "Job offer scraper for Polish job boards and LinkedIn")]
pub struct Config {
    /// How pages are loaded
    #[arg(long, env = "SCRAPER_BACKEND", value_enum, default_value_t = Backend::Chromium)]
    pub backend: Backend,

    /// Upper bound on browser sessions running at once during a batch
    #[arg(long, env = "MAX_CONCURRENT_BROWSERS", default_value = "3")]
    pub max_concurrent_browsers: NonZeroUsize,

    /// Seconds allowed for a single page navigation
    #[arg(long, env = "NAVIGATION_TIMEOUT_SECS", default_value = "30")]
    pub navigation_timeout_secs: u64,

    /// Seconds allowed for loading and reading one offer once its browser is up
    #[arg(long, env = "PIPELINE_TIMEOUT_SECS", default_value = "120")]
    pub pipeline_timeout_secs: u64,

    /// Chrome/Chromium executable (auto-detected when omitted)
    #[arg(long, env = "CHROME_PATH")]
    pub chrome_path: Option<PathBuf>,

    /// Browser profile directory for sites that need a signed-in session
    #[arg(long, env = "SCRAPER_PROFILE_DIR")]
    pub profile_dir: Option<PathBuf>,

    /// Show the browser window
    #[arg(long, env = "SCRAPER_HEADFUL")]
    pub headful: bool,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Headless Chromium, one process per offer
    Chromium,
    /// Plain HTTP GET, no JavaScript
    Http,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
    Markdown,
}

#[derive(clap::Subcommand, Debug, Clone)]
pub enum Command {
    /// Start the web server (default when no subcommand given)
    Serve {
        /// Listen address
        #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8080")]
        listen_addr: String,
    },
    /// Scrape one offer and print it
    Scrape {
        url: String,

        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Scrape several offers concurrently and print them in input order
    Batch {
        urls: Vec<String>,

        /// Read additional URLs from a file, one per line
        #[arg(long)]
        file: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
}

impl Config {
    /// Resolve the command, defaulting to Serve if none specified.
    pub fn resolved_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve {
            listen_addr: std::env::var("LISTEN_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
        })
    }

    pub fn scrape_settings(&self) -> ScrapeSettings {
        ScrapeSettings {
            navigation_timeout: Duration::from_secs(self.navigation_timeout_secs),
            pipeline_timeout: Duration::from_secs(self.pipeline_timeout_secs),
            ..ScrapeSettings::default()
        }
    }
}

/// A randomized pause, drawn uniformly from `min..=max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    pub min: Duration,
    pub max: Duration,
}

impl DelayRange {
    pub const ZERO: DelayRange = DelayRange::new(Duration::ZERO, Duration::ZERO);

    pub const fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    pub fn sample(&self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        rand::rng().random_range(self.min..=self.max)
    }

    pub async fn wait(&self) {
        let delay = self.sample();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Timing knobs for one offer pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrapeSettings {
    pub navigation_timeout: Duration,
    /// Budget for all work on one page once its browser is up. Waiting for
    /// a slot and the browser launch are not counted.
    pub pipeline_timeout: Duration,
    /// Pause after navigation so client-side rendering can finish.
    pub settle: DelayRange,
    /// How long a pre-extraction click may wait for its target.
    pub action_timeout: Duration,
    pub action_settle: DelayRange,
}

impl Default for ScrapeSettings {
    fn default() -> Self {
        Self {
            navigation_timeout: Duration::from_secs(30),
            pipeline_timeout: Duration::from_secs(120),
            settle: DelayRange::new(Duration::from_secs(1), Duration::from_secs(3)),
            action_timeout: Duration::from_secs(5),
            action_settle: DelayRange::new(Duration::from_millis(300), Duration::from_millis(600)),
        }
    }
}

impl ScrapeSettings {
    /// Default timeouts with every pause removed.
    pub fn immediate() -> Self {
        Self {
            settle: DelayRange::ZERO,
            action_settle: DelayRange::ZERO,
            ..Self::default()
        }
    }
}
