mod common;

use std::num::NonZeroUsize;
use std::time::Duration;

use common::{MockProvider, justjoin_page};
use jobscraper::config::ScrapeSettings;
use jobscraper::error::SessionError;
use jobscraper::models::{ErrorKind, FieldValue};
use serde_json::json;

const U1: &str = "https://justjoin.it/job-offer/acme-one";
const U2: &str = "https://justjoin.it/job-offer/acme-two";
const U3: &str = "https://justjoin.it/job-offer/acme-three";

fn title(offer: &jobscraper::JobOffer) -> Option<&str> {
    offer.details().and_then(|d| d.title.as_deref())
}

#[tokio::test(start_paused = true)]
async fn results_keep_input_order() {
    // u2 finishes first, then u1, then u3
    let (engine, _) = MockProvider::new()
        .slow_page(U1, justjoin_page("One", "Acme"), Duration::from_millis(200))
        .slow_page(U2, justjoin_page("Two", "Acme"), Duration::from_millis(100))
        .slow_page(U3, justjoin_page("Three", "Acme"), Duration::from_millis(300))
        .engine();

    let offers = engine.scrape_batch(&[U1, U2, U3]).await;

    let titles: Vec<_> = offers.iter().map(title).collect();
    assert_eq!(titles, [Some("One"), Some("Two"), Some("Three")]);
    let initial: Vec<_> = offers.iter().map(|o| o.initial_url()).collect();
    assert_eq!(initial, [U1, U2, U3]);
}

#[tokio::test]
async fn one_failure_does_not_touch_siblings() {
    let (engine, counters) = MockProvider::new()
        .page(U1, justjoin_page("One", "Acme"))
        .failing_page(U2, SessionError::Timeout("navigation took longer than 30s".into()))
        .page(U3, justjoin_page("Three", "Acme"))
        .engine();

    let offers = engine.scrape_batch(&[U1, U2, U3]).await;

    assert!(offers[0].is_success());
    assert!(offers[2].is_success());
    assert_eq!(offers[1].error_kind(), Some(ErrorKind::Timeout));
    assert!(offers[1].error_description().unwrap().contains("Timeout"));
    assert_eq!(counters.released(), 3);
}

#[tokio::test(start_paused = true)]
async fn concurrent_sessions_never_exceed_the_limit() {
    let urls: Vec<String> = (0..5).map(|i| format!("https://justjoin.it/job-offer/acme-{i}")).collect();
    let provider = urls.iter().fold(MockProvider::new(), |p, url| {
        p.slow_page(url, justjoin_page("Tester", "Acme"), Duration::from_millis(50))
    });
    let (engine, counters) = provider.engine();
    engine.set_max_concurrent_browsers(NonZeroUsize::new(2).unwrap());

    let offers = engine.scrape_batch(&urls).await;

    assert!(offers.iter().all(|o| o.is_success()));
    assert_eq!(counters.acquired(), 5);
    assert_eq!(counters.peak(), 2);
}

#[tokio::test(start_paused = true)]
async fn limit_is_read_when_the_batch_starts() {
    let urls: Vec<String> = (0..4).map(|i| format!("https://justjoin.it/job-offer/acme-{i}")).collect();
    let provider = urls.iter().fold(MockProvider::new(), |p, url| {
        p.slow_page(url, justjoin_page("Tester", "Acme"), Duration::from_millis(50))
    });
    let (engine, counters) = provider.engine();
    engine.set_max_concurrent_browsers(NonZeroUsize::new(1).unwrap());

    let batch = engine.scrape_batch(&urls);
    let raise = async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        engine.set_max_concurrent_browsers(NonZeroUsize::new(4).unwrap());
    };
    let (offers, ()) = tokio::join!(batch, raise);

    assert_eq!(offers.len(), 4);
    assert_eq!(counters.peak(), 1);
    assert_eq!(engine.max_concurrent_browsers().get(), 4);
}

#[tokio::test]
async fn invalid_entries_are_reported_in_place() {
    let (engine, counters) = MockProvider::new()
        .page(U1, justjoin_page("One", "Acme"))
        .engine();

    let offers = engine
        .scrape_batch_json(&[json!(""), json!(U1), json!(7), json!("https://example.com/job")])
        .await;

    assert_eq!(offers.len(), 4);
    assert_eq!(offers[0].error_kind(), Some(ErrorKind::InvalidUrl));
    assert_eq!(
        offers[1].details().map(|d| d.company.clone()),
        Some(FieldValue::Found("Acme".into()))
    );
    assert_eq!(offers[2].error_kind(), Some(ErrorKind::InvalidUrl));
    assert_eq!(offers[2].initial_url(), "7");
    assert_eq!(offers[3].error_kind(), Some(ErrorKind::UnsupportedUrl));
    assert_eq!(counters.acquired(), 1);
}

#[tokio::test]
async fn empty_batch_is_empty() {
    let (engine, counters) = MockProvider::new().engine();
    let offers = engine.scrape_batch::<&str>(&[]).await;
    assert!(offers.is_empty());
    assert_eq!(counters.acquired(), 0);
}

#[tokio::test(start_paused = true)]
async fn timed_out_session_holds_its_slot_until_released() {
    let settings = ScrapeSettings {
        pipeline_timeout: Duration::from_secs(5),
        ..ScrapeSettings::immediate()
    };
    let (engine, counters) = MockProvider::new()
        .slow_page(U1, justjoin_page("One", "Acme"), Duration::from_secs(60))
        .slow_page(U2, justjoin_page("Two", "Acme"), Duration::from_secs(1))
        .slow_release(Duration::from_secs(2))
        .engine_with(settings);
    engine.set_max_concurrent_browsers(NonZeroUsize::MIN);

    let offers = engine.scrape_batch(&[U1, U2]).await;

    assert_eq!(offers[0].error_kind(), Some(ErrorKind::Timeout));
    assert_eq!(title(&offers[1]), Some("Two"));
    assert_eq!(counters.peak(), 1);
    assert_eq!(counters.released(), 2);
}

#[tokio::test(start_paused = true)]
async fn panicking_entry_leaves_siblings_alone() {
    let (engine, counters) = MockProvider::new()
        .page(U1, justjoin_page("One", "Acme"))
        .panicking_page(U2)
        .page(U3, justjoin_page("Three", "Acme"))
        .slow_release(Duration::from_millis(500))
        .engine();
    engine.set_max_concurrent_browsers(NonZeroUsize::MIN);

    let offers = engine.scrape_batch(&[U1, U2, U3]).await;

    assert_eq!(title(&offers[0]), Some("One"));
    assert_eq!(offers[1].error_kind(), Some(ErrorKind::UnknownFailure));
    assert!(offers[1].error_description().unwrap().contains("renderer crashed"));
    assert_eq!(title(&offers[2]), Some("Three"));
    assert_eq!(counters.peak(), 1);
    assert_eq!(counters.released(), 3);
}

#[tokio::test(start_paused = true)]
async fn limit_holds_across_concurrent_calls() {
    let urls: Vec<String> = (0..5).map(|i| format!("https://justjoin.it/job-offer/acme-{i}")).collect();
    let provider = urls.iter().fold(MockProvider::new(), |p, url| {
        p.slow_page(url, justjoin_page("Tester", "Acme"), Duration::from_millis(50))
    });
    let (engine, counters) = provider.engine();
    engine.set_max_concurrent_browsers(NonZeroUsize::MIN);

    let (first, second, single) = tokio::join!(
        engine.scrape_batch(&urls[0..2]),
        engine.scrape_batch(&urls[2..4]),
        engine.scrape_offer(&urls[4]),
    );

    assert!(first.iter().chain(&second).all(|o| o.is_success()));
    assert!(single.is_success());
    assert_eq!(counters.acquired(), 5);
    assert_eq!(counters.peak(), 1);
}

#[tokio::test(start_paused = true)]
async fn clones_share_one_limit() {
    let urls: Vec<String> = (0..4).map(|i| format!("https://justjoin.it/job-offer/acme-{i}")).collect();
    let provider = urls.iter().fold(MockProvider::new(), |p, url| {
        p.slow_page(url, justjoin_page("Tester", "Acme"), Duration::from_millis(50))
    });
    let (engine, counters) = provider.engine();
    engine.set_max_concurrent_browsers(NonZeroUsize::new(2).unwrap());
    let other = engine.clone();

    let calls = urls.iter().enumerate().map(|(i, url)| {
        let engine = if i % 2 == 0 { engine.clone() } else { other.clone() };
        async move { engine.scrape_offer(url).await }
    });
    let offers = futures::future::join_all(calls).await;

    assert!(offers.iter().all(|o| o.is_success()));
    assert_eq!(counters.peak(), 2);
}
