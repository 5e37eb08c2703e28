use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use jobscraper::config::{Backend, Command, Config, LogFormat, OutputFormat};
use jobscraper::routes;
use jobscraper::session::{ChromiumProvider, HttpProvider, SessionProvider};
use jobscraper::{Engine, JobOffer};

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("jobscraper=info,tower_http=info"));
    // stdout carries scrape results
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn build_engine(config: &Config) -> anyhow::Result<Engine> {
    let provider: Arc<dyn SessionProvider> = match config.backend {
        Backend::Chromium => Arc::new(ChromiumProvider::new(
            config.chrome_path.clone(),
            config.profile_dir.clone(),
            config.headful,
        )),
        Backend::Http => Arc::new(HttpProvider::new()?),
    };
    tracing::info!("Using {} sessions", provider.name());
    Ok(Engine::new(provider, config.scrape_settings())
        .with_max_concurrent_browsers(config.max_concurrent_browsers))
}

fn render(offers: &[JobOffer], format: OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(offers)?,
        OutputFormat::Text => offers.iter().map(JobOffer::to_text).collect::<Vec<_>>().join("\n"),
        OutputFormat::Markdown => offers
            .iter()
            .map(JobOffer::to_markdown)
            .collect::<Vec<_>>()
            .join("\n---\n\n"),
    })
}

async fn read_url_file(path: &std::path::Path) -> anyhow::Result<Vec<String>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read URL list {}", path.display()))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    init_tracing(config.log_format);

    let engine = build_engine(&config)?;

    match config.resolved_command() {
        Command::Serve { listen_addr } => {
            let app = routes::app(engine);
            let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
            tracing::info!("Listening on {listen_addr}");
            axum::serve(listener, app).await?;
        }
        Command::Scrape { url, format } => {
            let offer = engine.scrape_offer(&url).await;
            let out = match format {
                OutputFormat::Json => serde_json::to_string_pretty(&offer)?,
                _ => render(std::slice::from_ref(&offer), format)?,
            };
            println!("{out}");
        }
        Command::Batch { mut urls, file, format } => {
            if let Some(path) = file {
                urls.extend(read_url_file(&path).await?);
            }
            if urls.is_empty() {
                anyhow::bail!("No URLs given; pass them as arguments or with --file");
            }
            let offers = engine.scrape_batch(&urls).await;
            println!("{}", render(&offers, format)?);
        }
    }

    Ok(())
}
