//! Browser sessions as a scoped resource.
//!
//! The engine never launches browsers itself. It asks a [`SessionProvider`]
//! for a [`BrowserSession`], wraps it in a [`SessionGuard`] for the length of
//! one pipeline, and releases it on every exit path: explicitly on normal
//! completion, or from the guard's `Drop` when the pipeline is cancelled or
//! unwinds. The guard also carries the gate slot the session was started
//! under, and gives it back only once release has finished.

pub mod chromium;
pub mod http;

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::SessionError;
use crate::scheduler::BrowserSlot;

pub use chromium::ChromiumProvider;
pub use http::HttpProvider;

/// Which browser identity a site needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionProfile {
    /// Fresh, anonymous context.
    #[default]
    Guest,
    /// Reuse the configured on-disk profile (cookies, sign-in).
    Persistent,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionConfig {
    pub profile: SessionProfile,
}

/// Produces browser sessions. Implementations must be shareable across
/// concurrently running pipelines.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Short identifier for logs.
    fn name(&self) -> &str;

    async fn acquire(&self, config: &SessionConfig) -> Result<Box<dyn BrowserSession>, SessionError>;
}

/// One live page owned by one pipeline.
#[async_trait]
pub trait BrowserSession: Send {
    /// Load `url`, failing with `Timeout` if it takes longer than `timeout`.
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), SessionError>;

    /// Serialized DOM of the current page.
    async fn content(&mut self) -> Result<String, SessionError>;

    /// Click the first element matching `selector`. `Ok(false)` when nothing
    /// matches within `timeout`.
    async fn click(&mut self, selector: &str, timeout: Duration) -> Result<bool, SessionError>;

    async fn release(self: Box<Self>);
}

/// Owns a session for the duration of a pipeline.
pub struct SessionGuard {
    session: Option<Box<dyn BrowserSession>>,
    slot: Option<BrowserSlot>,
}

impl SessionGuard {
    pub fn new(session: Box<dyn BrowserSession>, slot: BrowserSlot) -> Self {
        Self {
            session: Some(session),
            slot: Some(slot),
        }
    }

    fn live(&mut self) -> Result<&mut (dyn BrowserSession + 'static), SessionError> {
        self.session
            .as_deref_mut()
            .ok_or_else(|| SessionError::Other("session already released".into()))
    }

    pub async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), SessionError> {
        self.live()?.navigate(url, timeout).await
    }

    pub async fn content(&mut self) -> Result<String, SessionError> {
        self.live()?.content().await
    }

    pub async fn click(&mut self, selector: &str, timeout: Duration) -> Result<bool, SessionError> {
        self.live()?.click(selector, timeout).await
    }

    pub async fn release(mut self) {
        if let Some(session) = self.session.take() {
            session.release().await;
        }
        self.slot.take();
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        let slot = self.slot.take();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                tracing::debug!("Session dropped before release, releasing in background");
                handle.spawn(async move {
                    session.release().await;
                    drop(slot);
                });
            }
            Err(_) => tracing::warn!("Session dropped outside a runtime, not released"),
        }
    }
}
