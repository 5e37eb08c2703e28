//! Scripted session provider for driving the engine without a browser.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use jobscraper::config::ScrapeSettings;
use jobscraper::error::SessionError;
use jobscraper::session::{BrowserSession, SessionConfig, SessionProfile, SessionProvider};
use jobscraper::Engine;

#[derive(Clone, Default)]
enum Outcome {
    #[default]
    Load,
    Fail(SessionError),
    Panic,
}

#[derive(Clone, Default)]
struct Page {
    html: String,
    delay: Duration,
    outcome: Outcome,
    /// Selector that reveals more content, and the page after the click.
    expands: Option<(String, String)>,
}

#[derive(Default)]
pub struct Counters {
    pub attempts: AtomicUsize,
    pub acquired: AtomicUsize,
    pub released: AtomicUsize,
    pub active: AtomicUsize,
    pub peak: AtomicUsize,
    pub profiles: Mutex<Vec<SessionProfile>>,
    pub clicks: Mutex<Vec<String>>,
}

impl Counters {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

/// Serves fixed HTML per URL. Pages may be slow, fail, panic or expand on
/// click; the provider itself may refuse to start sessions or be slow to
/// release them.
#[derive(Default)]
pub struct MockProvider {
    pages: HashMap<String, Page>,
    acquire_error: Option<SessionError>,
    release_delay: Duration,
    pub counters: Arc<Counters>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), Page { html: html.into(), ..Page::default() });
        self
    }

    pub fn slow_page(mut self, url: &str, html: impl Into<String>, delay: Duration) -> Self {
        self.pages.insert(url.to_string(), Page { html: html.into(), delay, ..Page::default() });
        self
    }

    pub fn failing_page(mut self, url: &str, err: SessionError) -> Self {
        self.pages.insert(url.to_string(), Page { outcome: Outcome::Fail(err), ..Page::default() });
        self
    }

    pub fn panicking_page(mut self, url: &str) -> Self {
        self.pages.insert(url.to_string(), Page { outcome: Outcome::Panic, ..Page::default() });
        self
    }

    pub fn expandable_page(
        mut self,
        url: &str,
        collapsed: impl Into<String>,
        selector: &str,
        expanded: impl Into<String>,
    ) -> Self {
        self.pages.insert(
            url.to_string(),
            Page {
                html: collapsed.into(),
                expands: Some((selector.to_string(), expanded.into())),
                ..Page::default()
            },
        );
        self
    }

    /// Every `acquire` fails with `err`.
    pub fn failing_acquire(mut self, err: SessionError) -> Self {
        self.acquire_error = Some(err);
        self
    }

    /// Sessions stay alive for `delay` after release starts.
    pub fn slow_release(mut self, delay: Duration) -> Self {
        self.release_delay = delay;
        self
    }

    /// Engine over this provider with no artificial pauses.
    pub fn engine(self) -> (Engine, Arc<Counters>) {
        self.engine_with(ScrapeSettings::immediate())
    }

    pub fn engine_with(self, settings: ScrapeSettings) -> (Engine, Arc<Counters>) {
        let counters = Arc::clone(&self.counters);
        (Engine::new(Arc::new(self), settings), counters)
    }
}

#[async_trait]
impl SessionProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn acquire(&self, config: &SessionConfig) -> Result<Box<dyn BrowserSession>, SessionError> {
        self.counters.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.acquire_error {
            return Err(err.clone());
        }
        self.counters.acquired.fetch_add(1, Ordering::SeqCst);
        let now = self.counters.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.counters.peak.fetch_max(now, Ordering::SeqCst);
        if let Ok(mut profiles) = self.counters.profiles.lock() {
            profiles.push(config.profile);
        }
        Ok(Box::new(MockSession {
            pages: self.pages.clone(),
            counters: Arc::clone(&self.counters),
            release_delay: self.release_delay,
            current: None,
            loaded: None,
        }))
    }
}

struct MockSession {
    pages: HashMap<String, Page>,
    counters: Arc<Counters>,
    release_delay: Duration,
    current: Option<Page>,
    loaded: Option<String>,
}

#[async_trait]
impl BrowserSession for MockSession {
    async fn navigate(&mut self, url: &str, _timeout: Duration) -> Result<(), SessionError> {
        let page = self
            .pages
            .get(url)
            .cloned()
            .ok_or_else(|| SessionError::Connection(format!("no route to {url}")))?;
        if !page.delay.is_zero() {
            tokio::time::sleep(page.delay).await;
        }
        match page.outcome {
            Outcome::Load => {
                self.loaded = Some(page.html.clone());
                self.current = Some(page);
                Ok(())
            }
            Outcome::Fail(err) => Err(err),
            Outcome::Panic => panic!("renderer crashed on {url}"),
        }
    }

    async fn content(&mut self) -> Result<String, SessionError> {
        self.loaded
            .clone()
            .ok_or_else(|| SessionError::Other("nothing loaded".into()))
    }

    async fn click(&mut self, selector: &str, _timeout: Duration) -> Result<bool, SessionError> {
        if let Ok(mut clicks) = self.counters.clicks.lock() {
            clicks.push(selector.to_string());
        }
        let expanded = self
            .current
            .as_ref()
            .and_then(|page| page.expands.as_ref())
            .filter(|(target, _)| target == selector)
            .map(|(_, html)| html.clone());
        match expanded {
            Some(html) => {
                self.loaded = Some(html);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn release(self: Box<Self>) {
        if !self.release_delay.is_zero() {
            tokio::time::sleep(self.release_delay).await;
        }
        self.counters.active.fetch_sub(1, Ordering::SeqCst);
        self.counters.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// Smallest page the JustJoin rules accept.
pub fn justjoin_page(title: &str, company: &str) -> String {
    format!(
        r#"<html><body><h1>{title}</h1><a href="/all?companies={company}">{company}</a></body></html>"#
    )
}

/// Let background releases spawned by dropped guards run.
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

pub fn fixture(name: &str) -> String {
    let path = format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"));
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("missing fixture {path}: {e}"))
}
