//! Rendering client against a local stand-in for the Scrnpix API

mod support;

use reqwest::Url;
use support::{serve_once, solid_png, WHITE};
use vizreg_vision::{CaptureCause, EnvConfig, Renderer, ScreenshotTarget, ScrnpixClient};

fn client_for(base_url: &str) -> ScrnpixClient {
    ScrnpixClient::new(&EnvConfig::new("test-key", base_url)).unwrap()
}

fn query_value(request_url: &str, name: &str) -> Option<String> {
    let url = Url::parse(&format!("http://localhost{}", request_url)).unwrap();
    url.query_pairs()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}

#[test]
fn test_success_returns_body_unmodified() {
    let png = solid_png(4, 3, WHITE);
    let (base_url, seen) = serve_once(200, png.clone(), "image/png");

    let target = ScreenshotTarget::new("home", "https://example.com").with_viewport(1280, 720);
    let bytes = client_for(&base_url).capture(&target).unwrap();

    assert_eq!(bytes, png);

    let request = seen.recv().unwrap();
    assert!(request.url.starts_with("/screenshot?"));
    assert_eq!(request.api_key.as_deref(), Some("test-key"));
    assert_eq!(query_value(&request.url, "url").as_deref(), Some("https://example.com"));
    assert_eq!(query_value(&request.url, "format").as_deref(), Some("png"));
    assert_eq!(query_value(&request.url, "width").as_deref(), Some("1280"));
    assert_eq!(query_value(&request.url, "height").as_deref(), Some("720"));
    assert_eq!(query_value(&request.url, "full_page"), None);
}

#[test]
fn test_private_url_is_reported() {
    let body = br#"{"error":"url_not_public"}"#.to_vec();
    let (base_url, _seen) = serve_once(400, body, "application/json");

    let target = ScreenshotTarget::new("local", "http://localhost:3000");
    let err = client_for(&base_url).capture(&target).unwrap_err();

    assert_eq!(err.target_name, "local");
    assert_eq!(err.cause, CaptureCause::UrlNotPublic);
    assert!(err.to_string().contains("must be publicly accessible"));
}

#[test]
fn test_unauthorized_with_unparseable_body_uses_status_fallback() {
    let (base_url, _seen) = serve_once(401, b"Unauthorized".to_vec(), "text/plain");

    let target = ScreenshotTarget::new("home", "https://example.com");
    let err = client_for(&base_url).capture(&target).unwrap_err();

    assert_eq!(err.cause, CaptureCause::Unauthorized);
    assert_eq!(
        err.to_string(),
        "[home] Invalid or missing API key. Check your SCRNPIX_API_KEY in .env."
    );
}

#[test]
fn test_unknown_error_keeps_status_and_code() {
    let body = br#"{"error":"quota_frozen"}"#.to_vec();
    let (base_url, _seen) = serve_once(403, body, "application/json");

    let target = ScreenshotTarget::new("home", "https://example.com");
    let err = client_for(&base_url).capture(&target).unwrap_err();

    assert_eq!(
        err.cause,
        CaptureCause::Unknown {
            status: 403,
            code: "quota_frozen".to_string()
        }
    );
}

#[test]
fn test_unreachable_service_is_a_transport_error() {
    // Bind then drop to get a port nobody listens on
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();

    let target = ScreenshotTarget::new("home", "https://example.com");
    let err = client_for(&format!("http://127.0.0.1:{}", port))
        .capture(&target)
        .unwrap_err();

    assert!(matches!(err.cause, CaptureCause::Transport(_)));
}
