// Static fetch strategy against a local mock HTTP server.

use sitemark::{FetchError, FetchOptions, fetch_static, fetch_static_with_tls_fallback};

#[tokio::test]
async fn fetch_captures_status_headers_and_body() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/page")
        .with_status(200)
        .with_header("content-type", "text/html; charset=utf-8")
        .with_body("<html><body><p>hello</p></body></html>")
        .create_async()
        .await;

    let url = format!("{}/page", server.url());
    let result = fetch_static(&url, &FetchOptions::default()).await.unwrap();

    assert_eq!(result.status, 200);
    assert!(result.html.contains("hello"));
    assert_eq!(
        result.headers.get("content-type").map(String::as_str),
        Some("text/html; charset=utf-8")
    );
    assert!(result.screenshot.is_none());
    assert!(result.pdf.is_none());
}

#[tokio::test]
async fn redirects_are_followed_and_reported_in_final_url() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/old")
        .with_status(302)
        .with_header("location", &format!("{}/new", server.url()))
        .create_async()
        .await;
    server
        .mock("GET", "/new")
        .with_body("<p>moved here</p>")
        .create_async()
        .await;

    let url = format!("{}/old", server.url());
    let result = fetch_static(&url, &FetchOptions::default()).await.unwrap();

    assert_eq!(result.status, 200);
    assert!(result.final_url.ends_with("/new"));
    assert!(result.html.contains("moved here"));
}

#[tokio::test]
async fn error_statuses_are_returned_not_raised() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/missing")
        .with_status(404)
        .with_body("gone")
        .create_async()
        .await;

    let url = format!("{}/missing", server.url());
    let result = fetch_static(&url, &FetchOptions::default()).await.unwrap();

    assert_eq!(result.status, 404);
    assert_eq!(result.html, "gone");
}

#[tokio::test]
async fn tls_fallback_passes_plain_http_results_through() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/page")
        .with_body("<p>plain</p>")
        .expect(1)
        .create_async()
        .await;

    let url = format!("{}/page", server.url());
    let result = fetch_static_with_tls_fallback(&url, &FetchOptions::default())
        .await
        .unwrap();

    assert_eq!(result.status, 200);
    mock.assert_async().await;
}

#[tokio::test]
async fn tls_fallback_propagates_connection_errors() {
    // Bind and drop a listener so the port is free but refusing.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let url = format!("http://127.0.0.1:{port}/");
    let err = fetch_static_with_tls_fallback(&url, &FetchOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Http(_)));
    assert!(!err.is_certificate_error());
}

#[tokio::test]
async fn caller_headers_reach_the_server() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/auth")
        .match_header("x-api-key", "secret")
        .with_body("ok")
        .create_async()
        .await;

    let url = format!("{}/auth", server.url());
    let options = FetchOptions::default().with_header("X-Api-Key", "secret");
    let result = fetch_static(&url, &options).await.unwrap();

    assert_eq!(result.status, 200);
    mock.assert_async().await;
}
