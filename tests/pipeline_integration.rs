//! Integration tests for the retrieval pipeline.
//!
//! Exercises fetch → unwrap → classify → fallback against a local mock mirror.

use std::time::Duration;

use scidb_core::{
    Availability, FetchError, HttpTimeouts, MOBILE_USER_AGENT, PageClient, PipelineConfig,
    RetrievalError, Retriever, build_item_url,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod support;
use support::socket_guard::start_mock_server_or_skip;

fn loopback_retriever(max_unwrap_depth: usize) -> Retriever {
    Retriever::new(
        PageClient::new(HttpTimeouts::default()).unwrap(),
        PipelineConfig {
            max_unwrap_depth,
            upgrade_insecure_links: false,
        },
    )
}

fn endpoint(server: &MockServer) -> String {
    format!("{}/", server.uri())
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html; charset=utf-8")
        .set_body_string(format!("<html><head><title>mirror</title></head><body>{body}</body></html>"))
}

async fn mount_page(server: &MockServer, page_path: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(html(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_retrieve_relative_direct_link_resolves_against_origin() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_page(
        &server,
        "/10.1000/xyz",
        r#"<div id="article"><embed type="application/pdf" id="pdf" src="/downloads/xyz.pdf#view=FitH"></div>"#,
    )
    .await;

    let start = build_item_url(&endpoint(&server), "10.1000/xyz").unwrap();
    let availability = loopback_retriever(5).retrieve(&start).await.unwrap();

    let Availability::Direct { candidate, page_url } = availability else {
        panic!("expected a direct link, got {availability:?}");
    };
    assert_eq!(
        candidate.as_str(),
        format!("{}/downloads/xyz.pdf#view=FitH", server.uri())
    );
    assert_eq!(page_url, start);
}

#[tokio::test]
async fn test_retrieve_sends_mobile_user_agent() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_page(&server, "/10.1/ua", r#"<iframe id="pdf" src="/ua.pdf"></iframe>"#).await;

    let start = build_item_url(&endpoint(&server), "10.1/ua").unwrap();
    let availability = loopback_retriever(5).retrieve(&start).await.unwrap();
    assert!(matches!(availability, Availability::Direct { .. }));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let user_agent = requests[0].headers.get("user-agent").unwrap();
    assert_eq!(user_agent.to_str().unwrap(), MOBILE_USER_AGENT);
}

#[tokio::test]
async fn test_retrieve_unwraps_embedded_frame_once() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let inner = format!("{}/inner/10.1/frame", server.uri());
    mount_page(
        &server,
        "/10.1/frame",
        &format!(r#"<p>Loading...</p><iframe src="{inner}"></iframe>"#),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/inner/10.1/frame"))
        .respond_with(html(r#"<embed id="pdf" src="//files.example.org/frame.pdf">"#))
        .expect(1)
        .mount(&server)
        .await;

    let start = build_item_url(&endpoint(&server), "10.1/frame").unwrap();
    let availability = loopback_retriever(5).retrieve(&start).await.unwrap();

    let Availability::Direct { candidate, page_url } = availability else {
        panic!("expected a direct link, got {availability:?}");
    };
    assert_eq!(page_url.as_str(), inner);
    // Protocol-relative links take the page scheme when upgrading is off.
    assert_eq!(candidate.as_str(), "http://files.example.org/frame.pdf");
}

#[tokio::test]
async fn test_retrieve_self_embedding_page_is_redirect_loop() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let start = build_item_url(&endpoint(&server), "10.1/loop").unwrap();
    mount_page(
        &server,
        "/10.1/loop",
        &format!(r#"<iframe src="{start}"></iframe>"#),
    )
    .await;

    let err = loopback_retriever(5).retrieve(&start).await.unwrap_err();
    assert!(
        matches!(err, RetrievalError::RedirectLoop { hops: 1, .. }),
        "expected redirect loop, got {err:?}"
    );
    assert!(err.aborts_batch());
}

#[tokio::test]
async fn test_retrieve_frame_chain_beyond_depth_is_redirect_loop() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    for hop in 0..4 {
        mount_page(
            &server,
            &format!("/chain/{hop}"),
            &format!(r#"<iframe src="/chain/{}"></iframe>"#, hop + 1),
        )
        .await;
    }

    let start = build_item_url(&endpoint(&server), "chain/0").unwrap();
    let err = loopback_retriever(2).retrieve(&start).await.unwrap_err();
    assert!(
        matches!(err, RetrievalError::RedirectLoop { hops: 3, .. }),
        "expected redirect loop after exceeding depth, got {err:?}"
    );
}

#[tokio::test]
async fn test_retrieve_non_200_is_fetch_failure() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/10.1/busy"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .mount(&server)
        .await;

    let start = build_item_url(&endpoint(&server), "10.1/busy").unwrap();
    let err = loopback_retriever(5).retrieve(&start).await.unwrap_err();

    let RetrievalError::FetchFailed { source, .. } = &err else {
        panic!("expected fetch failure, got {err:?}");
    };
    assert_eq!(source.status(), Some(503));
    assert!(err.aborts_batch());
}

#[tokio::test]
async fn test_retrieve_slow_mirror_times_out_as_fetch_failure() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/10.1/slow"))
        .respond_with(html("<p>late</p>").set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let retriever = Retriever::new(
        PageClient::new(HttpTimeouts {
            connect: Duration::from_secs(1),
            request: Duration::from_millis(200),
        })
        .unwrap(),
        PipelineConfig {
            upgrade_insecure_links: false,
            ..PipelineConfig::default()
        },
    );
    let start = build_item_url(&endpoint(&server), "10.1/slow").unwrap();
    let err = retriever.retrieve(&start).await.unwrap_err();

    let RetrievalError::FetchFailed { source, .. } = &err else {
        panic!("expected fetch failure, got {err:?}");
    };
    assert!(matches!(source, FetchError::Timeout { .. }), "got {source:?}");
    assert!(err.aborts_batch());
}

#[tokio::test]
async fn test_retrieve_not_found_phrase() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_page(
        &server,
        "/10.1/missing",
        "<p>Unfortunately, Sci-Hub has no access to this paper.</p>",
    )
    .await;

    let start = build_item_url(&endpoint(&server), "10.1/missing").unwrap();
    let err = loopback_retriever(5).retrieve(&start).await.unwrap_err();
    assert!(matches!(err, RetrievalError::NotFound { .. }), "got {err:?}");
    assert!(!err.aborts_batch());
}

#[tokio::test]
async fn test_retrieve_not_found_phrase_wins_over_direct_link() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_page(
        &server,
        "/10.1/stale",
        r#"<p>Статья не найдена в базе</p><embed id="pdf" src="/stale.pdf">"#,
    )
    .await;

    let start = build_item_url(&endpoint(&server), "10.1/stale").unwrap();
    let err = loopback_retriever(5).retrieve(&start).await.unwrap_err();
    assert!(matches!(err, RetrievalError::NotFound { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_retrieve_challenge_page_is_ambiguous() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_page(
        &server,
        "/10.1/captcha",
        r#"<form action="/verify"><img src="/captcha.png"><input name="answer"></form>"#,
    )
    .await;

    let start = build_item_url(&endpoint(&server), "10.1/captcha").unwrap();
    let err = loopback_retriever(5).retrieve(&start).await.unwrap_err();
    assert!(matches!(err, RetrievalError::Ambiguous { .. }), "got {err:?}");
    assert!(err.aborts_batch());
}

#[tokio::test]
async fn test_retrieve_escalates_to_first_fallback_link() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_page(
        &server,
        "/10.1/alt",
        r#"<a href="/about">About</a><a href="/mirror/pdf/alt">mirror</a><a href="https://ipfs.example/alt">ipfs</a>"#,
    )
    .await;

    let start = build_item_url(&endpoint(&server), "10.1/alt").unwrap();
    let availability = loopback_retriever(5).retrieve(&start).await.unwrap();

    let Availability::FallbackAvailable { link, .. } = availability else {
        panic!("expected fallback, got {availability:?}");
    };
    assert_eq!(link.as_str(), format!("{}/mirror/pdf/alt", server.uri()));
}
