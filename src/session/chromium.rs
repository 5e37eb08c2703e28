//! Chromium sessions via chromiumoxide. Every session is its own browser
//! process so no cookies or fingerprint leak between offers.
//!
//! Chromium allows one process per user data directory, so sessions on the
//! shared signed-in profile take turns while guest sessions run side by side.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;

use super::{BrowserSession, SessionConfig, SessionProfile, SessionProvider};
use crate::error::SessionError;

const LAUNCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct ChromiumProvider {
    chrome_path: Option<PathBuf>,
    profile_dir: Option<PathBuf>,
    headful: bool,
    launched: Arc<AtomicU64>,
    profile_in_use: Arc<Semaphore>,
}

impl Default for ChromiumProvider {
    fn default() -> Self {
        Self::new(None, None, false)
    }
}

/// Where a session keeps its browser state.
#[derive(Debug)]
enum DataDir {
    /// Private to one session, removed on release.
    Scratch(PathBuf),
    /// The configured profile, held exclusively until release.
    Shared(PathBuf, OwnedSemaphorePermit),
}

impl DataDir {
    fn path(&self) -> &Path {
        match self {
            DataDir::Scratch(path) | DataDir::Shared(path, _) => path,
        }
    }
}

impl ChromiumProvider {
    pub fn new(chrome_path: Option<PathBuf>, profile_dir: Option<PathBuf>, headful: bool) -> Self {
        Self {
            chrome_path,
            profile_dir,
            headful,
            launched: Default::default(),
            profile_in_use: Arc::new(Semaphore::new(1)),
        }
    }

    /// Claim a user data directory. Persistent sessions wait here while
    /// another session has the profile open.
    async fn claim_data_dir(&self, profile: SessionProfile) -> Result<DataDir, SessionError> {
        if profile == SessionProfile::Persistent
            && let Some(dir) = &self.profile_dir
        {
            if self.profile_in_use.available_permits() == 0 {
                tracing::debug!("Profile {} is in use, waiting", dir.display());
            }
            let permit = Arc::clone(&self.profile_in_use)
                .acquire_owned()
                .await
                .map_err(|_| SessionError::Init("profile lock closed".into()))?;
            return Ok(DataDir::Shared(dir.clone(), permit));
        }
        let n = self.launched.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!("jobscraper-{}-{n}", std::process::id()));
        Ok(DataDir::Scratch(dir))
    }

    fn browser_config(&self, data_dir: &Path) -> Result<BrowserConfig, SessionError> {
        let mut builder = BrowserConfig::builder()
            .user_data_dir(data_dir)
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--lang=pl-PL,pl,en-US,en")
            .window_size(1920, 1080);
        if let Some(path) = &self.chrome_path {
            builder = builder.chrome_executable(path);
        }
        if self.headful {
            builder = builder.with_head();
        }
        builder
            .build()
            .map_err(|e| SessionError::Init(format!("invalid browser config: {e}")))
    }
}

#[async_trait]
impl SessionProvider for ChromiumProvider {
    fn name(&self) -> &str {
        "chromium"
    }

    async fn acquire(&self, config: &SessionConfig) -> Result<Box<dyn BrowserSession>, SessionError> {
        let data_dir = self.claim_data_dir(config.profile).await?;
        let browser_config = self.browser_config(data_dir.path())?;

        let (browser, mut handler) = tokio::time::timeout(LAUNCH_TIMEOUT, Browser::launch(browser_config))
            .await
            .map_err(|_| SessionError::Init(format!("browser did not start within {LAUNCH_TIMEOUT:?}")))?
            .map_err(|e| SessionError::Init(format!("failed to launch Chromium: {e}")))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let session = ChromiumSession {
                    browser,
                    page: None,
                    handler,
                    data_dir: Some(data_dir),
                };
                Box::new(session).release().await;
                return Err(SessionError::Init(format!("failed to open a page: {e}")));
            }
        };

        tracing::debug!("Launched Chromium with profile {:?}", config.profile);
        Ok(Box::new(ChromiumSession {
            browser,
            page: Some(page),
            handler,
            data_dir: Some(data_dir),
        }))
    }
}

pub struct ChromiumSession {
    browser: Browser,
    page: Option<Page>,
    handler: JoinHandle<()>,
    data_dir: Option<DataDir>,
}

impl ChromiumSession {
    fn page(&self) -> Result<&Page, SessionError> {
        self.page
            .as_ref()
            .ok_or_else(|| SessionError::Other("no page open".into()))
    }
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), SessionError> {
        let page = self.page()?;
        match tokio::time::timeout(timeout, page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(SessionError::Connection(format!("navigation to {url} failed: {e}"))),
            Err(_) => Err(SessionError::Timeout(format!(
                "navigation to {url} took longer than {}s",
                timeout.as_secs()
            ))),
        }
    }

    async fn content(&mut self) -> Result<String, SessionError> {
        self.page()?
            .content()
            .await
            .map_err(|e| SessionError::Other(format!("could not read page content: {e}")))
    }

    async fn click(&mut self, selector: &str, timeout: Duration) -> Result<bool, SessionError> {
        let page = self.page()?;
        let attempt = async {
            let element = page.find_element(selector).await.ok()?;
            let _ = element.scroll_into_view().await;
            element.click().await.ok()?;
            Some(())
        };
        Ok(tokio::time::timeout(timeout, attempt).await.ok().flatten().is_some())
    }

    async fn release(mut self: Box<Self>) {
        if let Some(page) = self.page.take() {
            let _ = page.close().await;
        }
        if let Err(e) = self.browser.close().await {
            tracing::debug!("Browser close failed: {e}");
        }
        let _ = self.browser.wait().await;
        self.handler.abort();
        // a shared profile is handed on only after the process has exited
        match self.data_dir.take() {
            Some(DataDir::Scratch(dir)) => {
                if let Err(e) = tokio::fs::remove_dir_all(&dir).await {
                    tracing::debug!("Could not remove {}: {e}", dir.display());
                }
            }
            Some(DataDir::Shared(_, permit)) => drop(permit),
            None => {}
        }
    }
}
