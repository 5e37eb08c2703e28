//! The single entry point. Every call returns a [`JobOffer`]; failures of any
//! kind, panics included, come back as error-shaped offers.

use std::any::Any;
use std::num::NonZeroUsize;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use serde_json::Value;

use crate::config::ScrapeSettings;
use crate::dispatch::{self, Target};
use crate::error::ScrapeError;
use crate::extract::HtmlDocument;
use crate::models::{JobOffer, normalize};
use crate::scheduler::{BatchScheduler, BrowserGate};
use crate::session::{SessionConfig, SessionGuard, SessionProvider};
use crate::sites::{Extraction, Strategy};

pub const DEFAULT_MAX_CONCURRENT_BROWSERS: NonZeroUsize = NonZeroUsize::new(3).unwrap();

/// Cheap to clone; clones share the provider and the browser gate, so the
/// concurrency cap holds across every clone and every concurrent call.
#[derive(Clone)]
pub struct Engine {
    provider: Arc<dyn SessionProvider>,
    settings: ScrapeSettings,
    gate: Arc<BrowserGate>,
}

enum BatchInput<'a> {
    Url(&'a str),
    NotAString(&'a Value),
}

impl Engine {
    pub fn new(provider: Arc<dyn SessionProvider>, settings: ScrapeSettings) -> Self {
        Self {
            provider,
            settings,
            gate: Arc::new(BrowserGate::new(DEFAULT_MAX_CONCURRENT_BROWSERS)),
        }
    }

    pub fn with_max_concurrent_browsers(self, limit: NonZeroUsize) -> Self {
        self.set_max_concurrent_browsers(limit);
        self
    }

    pub fn settings(&self) -> &ScrapeSettings {
        &self.settings
    }

    pub fn max_concurrent_browsers(&self) -> NonZeroUsize {
        self.gate.limit()
    }

    /// Changes the process-wide cap at once. A running batch also keeps the
    /// per-batch cap it started with.
    pub fn set_max_concurrent_browsers(&self, limit: NonZeroUsize) {
        let previous = self.gate.set_limit(limit);
        if previous != limit {
            tracing::info!("Max concurrent browsers changed from {previous} to {limit}");
        }
    }

    /// Scrape one offer. Waits for a free browser slot like any batch entry.
    pub async fn scrape_offer(&self, url: &str) -> JobOffer {
        self.run_pipeline(url).await
    }

    /// Scrape many offers concurrently. One result per input, in input order.
    pub async fn scrape_batch<S: AsRef<str>>(&self, urls: &[S]) -> Vec<JobOffer> {
        self.run_batch(urls.iter().map(|u| BatchInput::Url(u.as_ref())))
            .await
    }

    /// [`Engine::scrape_offer`] for untyped input. Anything but a JSON
    /// string is an invalid URL.
    pub async fn scrape_json(&self, value: &Value) -> JobOffer {
        match value.as_str() {
            Some(url) => self.scrape_offer(url).await,
            None => not_a_string(value),
        }
    }

    pub async fn scrape_batch_json(&self, values: &[Value]) -> Vec<JobOffer> {
        self.run_batch(values.iter().map(|v| match v.as_str() {
            Some(url) => BatchInput::Url(url),
            None => BatchInput::NotAString(v),
        }))
        .await
    }

    async fn run_batch<'a>(&self, inputs: impl ExactSizeIterator<Item = BatchInput<'a>>) -> Vec<JobOffer> {
        let scheduler = BatchScheduler::new(self.max_concurrent_browsers());
        let count = inputs.len();
        let started = Instant::now();
        tracing::info!(
            "Starting batch of {count} offers, max {} concurrent browsers",
            scheduler.limit()
        );

        let results = scheduler
            .run(inputs, |input| async move {
                match input {
                    BatchInput::Url(url) => self.run_pipeline(url).await,
                    BatchInput::NotAString(value) => not_a_string(value),
                }
            })
            .await;

        let ok = results.iter().filter(|r| r.is_success()).count();
        tracing::info!(
            "Batch finished in {:.1}s: {ok} succeeded, {} failed",
            started.elapsed().as_secs_f64(),
            count - ok
        );
        results
    }

    /// The pipeline boundary: nothing escapes past here.
    async fn run_pipeline(&self, initial_url: &str) -> JobOffer {
        let started = Instant::now();
        let offer = match AssertUnwindSafe(self.pipeline(initial_url)).catch_unwind().await {
            Ok(Ok(offer)) => offer,
            Ok(Err(err)) => JobOffer::failure(initial_url, &err),
            Err(panic) => {
                let err = ScrapeError::Unknown(panic_message(panic.as_ref()));
                tracing::error!("Pipeline for {initial_url} panicked: {err}");
                JobOffer::failure(initial_url, &err)
            }
        };

        match offer.error_description() {
            None => tracing::info!(
                "Scraped {initial_url} in {}ms",
                started.elapsed().as_millis()
            ),
            Some(reason) => tracing::warn!("Failed to scrape {initial_url}: {reason}"),
        }
        offer
    }

    async fn pipeline(&self, initial_url: &str) -> Result<JobOffer, ScrapeError> {
        let target = dispatch::resolve(initial_url)?;
        let strategy = target.site.strategy();

        let (extraction, extracted_at) = self.visit(&target, strategy).await?;

        Ok(normalize(
            &extraction.fields,
            &target.url,
            initial_url,
            target.site.source(),
            extracted_at,
        )
        .with_view(extraction.view))
    }

    /// Acquire, use and release one session. The gate slot is held until
    /// release has finished, whichever way the page visit ends.
    async fn visit(&self, target: &Target, strategy: &Strategy) -> Result<(Extraction, DateTime<Utc>), ScrapeError> {
        let slot = self.gate.acquire().await;
        let config = SessionConfig {
            profile: strategy.profile,
        };
        let session = self.provider.acquire(&config).await?;
        tracing::debug!("Acquired {} session for {}", self.provider.name(), target.url);

        let mut guard = SessionGuard::new(session, slot);
        let budget = self.settings.pipeline_timeout;
        let reading = tokio::time::timeout(budget, self.read_page(&mut guard, target, strategy));
        let result = match AssertUnwindSafe(reading).catch_unwind().await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(ScrapeError::Timeout(format!(
                "scraping {} did not finish within {}s",
                target.url,
                budget.as_secs()
            ))),
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!("Reading {} panicked: {message}", target.url);
                Err(ScrapeError::Unknown(message))
            }
        };
        guard.release().await;
        tracing::debug!("Released session for {}", target.url);
        result
    }

    async fn read_page(
        &self,
        guard: &mut SessionGuard,
        target: &Target,
        strategy: &Strategy,
    ) -> Result<(Extraction, DateTime<Utc>), ScrapeError> {
        guard
            .navigate(&target.url, self.settings.navigation_timeout)
            .await?;
        self.settings.settle.wait().await;

        for action in &strategy.actions {
            match guard.click(action.selector, self.settings.action_timeout).await {
                Ok(true) => {
                    tracing::debug!("{:?} action clicked {}", action.kind, action.selector);
                    self.settings.action_settle.wait().await;
                }
                Ok(false) => tracing::debug!("{:?} action found no target, skipping", action.kind),
                Err(e) => tracing::warn!("{:?} action failed on {}, continuing: {e}", action.kind, target.url),
            }
        }

        let html = guard.content().await?;
        Ok(extract_page(&html, strategy))
    }
}

/// Parse and extract without holding the DOM across an await. Stamps the
/// moment extraction finished.
fn extract_page(html: &str, strategy: &Strategy) -> (Extraction, DateTime<Utc>) {
    let doc = HtmlDocument::parse(html);
    let extraction = strategy.extract(&doc);
    (extraction, Utc::now())
}

fn not_a_string(value: &Value) -> JobOffer {
    JobOffer::failure(value.to_string(), &ScrapeError::InvalidUrl)
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unexpected panic".to_string()
    }
}
