use shortener::clock::Clock;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::Duration;
use http_body_util::BodyExt;
use shortener::clock::ManualClock;
use shortener::events::NoopObserver;
use shortener::{create_app, ClickInfo, Config, ShortenerError, UrlShortener};
use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;
use tower::ServiceExt;

fn shortener() -> (Arc<UrlShortener>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::default());
    let service = UrlShortener::from_config(&Config::default(), clock.clone(), Arc::new(NoopObserver));
    (Arc::new(service), clock)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[test]
fn test_create_then_lookup_is_active() {
    let (service, _) = shortener();
    let created = service
        .create_short_url("https://example.com/path", Some(30), None)
        .unwrap();

    let link = service.get_by_shortcode(&created.shortcode).unwrap();
    assert!(!link.is_expired);
    assert_eq!(link.original_url, "https://example.com/path");
    assert_eq!(link.total_clicks, 0);
}

#[test]
fn test_generated_code_then_same_code_requested() {
    let (service, clock) = shortener();
    let created = service
        .create_short_url("https://example.com/path", Some(30), None)
        .unwrap();

    assert_eq!(created.shortcode.len(), 5);
    assert!(created.shortcode.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_eq!(created.expiry, clock.now() + Duration::minutes(30));

    let err = service
        .create_short_url("https://example.com/other", Some(30), Some(&created.shortcode))
        .unwrap_err();
    assert_eq!(err, ShortenerError::ShortcodeTaken(created.shortcode));
}

#[test]
fn test_invalid_url_is_rejected() {
    let (service, _) = shortener();
    assert!(matches!(
        service.create_short_url("ftp://bad", Some(30), None),
        Err(ShortenerError::InvalidUrl(_))
    ));
}

#[test]
fn test_click_on_unknown_code() {
    let (service, _) = shortener();
    assert!(!service.record_click("nonexistent", ClickInfo::default()));
}

#[test]
fn test_concurrent_requests_for_same_code() {
    let (service, _) = shortener();
    let workers = 16;
    let barrier = Arc::new(Barrier::new(workers));

    let handles: Vec<_> = (0..workers)
        .map(|i| {
            let service = service.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                service.create_short_url(&format!("https://example.com/{i}"), Some(30), Some("race"))
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let successes = results.iter().filter(|r| r.is_ok()).count();
    let taken = results
        .iter()
        .filter(|r| matches!(r, Err(ShortenerError::ShortcodeTaken(code)) if code == "race"))
        .count();

    assert_eq!(successes, 1);
    assert_eq!(taken, workers - 1);
    assert_eq!(service.total_links(), 1);
}

#[test]
fn test_concurrent_generated_codes_are_unique() {
    let (service, _) = shortener();
    let workers = 8;
    let per_worker = 200;
    let barrier = Arc::new(Barrier::new(workers));

    let handles: Vec<_> = (0..workers)
        .map(|_| {
            let service = service.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                (0..per_worker)
                    .map(|_| {
                        service
                            .create_short_url("https://example.com", Some(5), None)
                            .unwrap()
                            .shortcode
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let codes: Vec<String> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    let unique: HashSet<_> = codes.iter().collect();

    assert_eq!(codes.len(), workers * per_worker);
    assert_eq!(unique.len(), codes.len());
    assert_eq!(service.total_links(), codes.len());
}

#[test]
fn test_click_count_matches_log_under_concurrency() {
    let (service, _) = shortener();
    service
        .create_short_url("https://example.com", Some(60), Some("hot"))
        .unwrap();

    let handles: Vec<_> = (0..6)
        .map(|i| {
            let service = service.clone();
            thread::spawn(move || {
                for _ in 0..100 {
                    let info = ClickInfo::new(None, Some(format!("10.0.0.{i}")), None);
                    service.record_click("hot", info);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let stats = service.get_statistics("hot").unwrap();
    assert_eq!(stats.total_clicks, 600);
    assert_eq!(stats.click_log.len() as u64, stats.total_clicks);
    assert_eq!(stats.clicks_by_location.len(), 6);
    assert!(stats.clicks_by_location.values().all(|count| *count == 100));
}

#[test]
fn test_expiry_transition() {
    let (service, clock) = shortener();
    service
        .create_short_url("https://example.com", Some(1), Some("brief"))
        .unwrap();

    assert!(!service.get_statistics("brief").unwrap().is_expired);
    assert!(service.record_click("brief", ClickInfo::default()));

    clock.advance(Duration::seconds(61));

    let stats = service.get_statistics("brief").unwrap();
    assert!(stats.is_expired);
    assert!(!service.record_click("brief", ClickInfo::default()));
    assert_eq!(service.get_statistics("brief").unwrap().total_clicks, 1);
}

#[test]
fn test_statistics_are_idempotent() {
    let (service, _) = shortener();
    service
        .create_short_url("https://example.com", Some(10), Some("same"))
        .unwrap();
    service.record_click("same", ClickInfo::default());

    let first = service.get_statistics("same").unwrap();
    let second = service.get_statistics("same").unwrap();
    assert_eq!(first.total_clicks, second.total_clicks);
    assert_eq!(first.click_log, second.click_log);
}

#[tokio::test]
async fn test_http_create_and_stats() {
    let (service, _) = shortener();
    let app = create_app(service);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/shorturls")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::json!({ "url": "https://example.com", "validity": 15, "shortcode": "docs" })
                        .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["shortLink"], "http://localhost:3001/docs");
    assert!(body["expiry"].is_string());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/shorturls/docs")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["originalUrl"], "https://example.com");
    assert_eq!(body["isExpired"], false);
    assert_eq!(body["totalClicks"], 0);
}

#[tokio::test]
async fn test_http_create_errors() {
    let (service, _) = shortener();
    let app = create_app(service);

    let post = |body: serde_json::Value| {
        Request::builder()
            .method("POST")
            .uri("/shorturls")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    };

    let response = app.clone().oneshot(post(serde_json::json!({}))).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(post(serde_json::json!({ "url": "ftp://bad" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "invalid_url");

    let response = app
        .clone()
        .oneshot(post(serde_json::json!({ "url": "https://a.io", "validity": 0 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    app.clone()
        .oneshot(post(serde_json::json!({ "url": "https://a.io", "shortcode": "dup" })))
        .await
        .unwrap();
    let response = app
        .oneshot(post(serde_json::json!({ "url": "https://b.io", "shortcode": "dup" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_http_redirect_records_click() {
    let (service, clock) = shortener();
    service
        .create_short_url("https://example.com/landing", Some(1), Some("go"))
        .unwrap();
    let app = create_app(service.clone());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/go")
                .header(header::REFERER, "https://search.example")
                .header(header::USER_AGENT, "test-agent")
                .header("x-forwarded-for", "198.51.100.4")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers()[header::LOCATION],
        "https://example.com/landing"
    );

    let stats = service.get_statistics("go").unwrap();
    assert_eq!(stats.total_clicks, 1);
    let click = &stats.click_log[0];
    assert_eq!(click.source, "https://search.example");
    assert_eq!(click.location, "198.51.100.4");
    assert_eq!(click.user_agent, "test-agent");

    clock.advance(Duration::minutes(2));
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/shorturls/go/redirect")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::GONE);
    assert_eq!(service.get_statistics("go").unwrap().total_clicks, 1);

    let response = app
        .oneshot(Request::builder().uri("/unknown").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_endpoint() {
    let (service, _) = shortener();
    let app = create_app(service);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["total_links"], 0);
}

#[tokio::test]
async fn test_route_names_cannot_be_claimed() {
    let (service, _) = shortener();
    let app = create_app(service.clone());

    for code in ["health", "shorturls"] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/shorturls")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        serde_json::json!({ "url": "https://example.com", "shortcode": code })
                            .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "invalid_shortcode");
    }

    assert_eq!(service.total_links(), 0);
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(body_json(response).await["status"], "healthy");
}
