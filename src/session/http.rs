//! Browserless sessions: a plain GET of the offer page. Works for boards
//! that render offers server-side and for tests against a local server.
//! Nothing is clickable in a static snapshot.

use std::time::Duration;

use async_trait::async_trait;

use super::{BrowserSession, SessionConfig, SessionProvider};
use crate::error::SessionError;

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

#[derive(Debug, Clone)]
pub struct HttpProvider {
    client: reqwest::Client,
}

impl HttpProvider {
    pub fn new() -> Result<Self, SessionError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| SessionError::Init(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl SessionProvider for HttpProvider {
    fn name(&self) -> &str {
        "http"
    }

    async fn acquire(&self, _config: &SessionConfig) -> Result<Box<dyn BrowserSession>, SessionError> {
        Ok(Box::new(HttpSession {
            client: self.client.clone(),
            body: None,
        }))
    }
}

pub struct HttpSession {
    client: reqwest::Client,
    body: Option<String>,
}

fn classify(url: &str, err: reqwest::Error) -> SessionError {
    if err.is_timeout() {
        SessionError::Timeout(format!("loading {url} timed out"))
    } else {
        SessionError::Connection(format!("request to {url} failed: {err}"))
    }
}

#[async_trait]
impl BrowserSession for HttpSession {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), SessionError> {
        let resp = self
            .client
            .get(url)
            .header("Accept-Language", "pl-PL,pl;q=0.9,en-US;q=0.8,en;q=0.7")
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SessionError::Connection(format!("{url} returned HTTP {status}")));
        }

        self.body = Some(resp.text().await.map_err(|e| classify(url, e))?);
        Ok(())
    }

    async fn content(&mut self) -> Result<String, SessionError> {
        self.body
            .clone()
            .ok_or_else(|| SessionError::Other("no page loaded".into()))
    }

    async fn click(&mut self, _selector: &str, _timeout: Duration) -> Result<bool, SessionError> {
        Ok(false)
    }

    async fn release(self: Box<Self>) {}
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    async fn session() -> Box<dyn BrowserSession> {
        HttpProvider::new()
            .unwrap()
            .acquire(&SessionConfig::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn fetches_page_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/praca/x,oferta,1"))
            .and(header_exists("user-agent"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<h1>Tester</h1>"))
            .mount(&server)
            .await;

        let mut session = session().await;
        session
            .navigate(&format!("{}/praca/x,oferta,1", server.uri()), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(session.content().await.unwrap(), "<h1>Tester</h1>");
        assert!(!session.click("button", Duration::from_secs(1)).await.unwrap());
    }

    #[tokio::test]
    async fn error_status_is_a_connection_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = session()
            .await
            .navigate(&server.uri(), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Connection(msg) if msg.contains("403")));
    }

    #[tokio::test]
    async fn slow_response_is_a_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let err = session()
            .await
            .navigate(&server.uri(), Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Timeout(_)));
    }

    #[tokio::test]
    async fn content_before_navigation_fails() {
        assert!(session().await.content().await.is_err());
    }
}
