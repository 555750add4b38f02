//! Validation client against a stand-in validation service

mod common;

use std::time::Duration;

use common::test_helpers::*;
use docval_client::{
    DocValError, HttpClientConfig, Keyword, ValidationClient, ValidationRequest,
};
use mockito::Matcher;

fn client_for(addr: std::net::SocketAddr, timeout_seconds: u64) -> ValidationClient {
    ValidationClient::new(HttpClientConfig {
        host: addr.ip().to_string(),
        port: addr.port(),
        timeout_seconds,
        ..HttpClientConfig::default()
    })
    .unwrap()
}

#[tokio::test]
async fn test_end_to_end_one_error() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/validate")
        .match_header("content-type", "application/xml")
        .match_header("accept", "application/json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(ONE_ERROR_RESPONSE)
        .create_async()
        .await;

    let fixtures = TestFixtures::new();
    let bytes = fixtures.read(&fixtures.ubl_invoice());
    let client = client_for(server.socket_address(), 5);

    let result = client.validate(&bytes, false, None).await.unwrap();

    mock.assert_async().await;
    assert_eq!(result.error_count, 1);
    assert_eq!(result.warning_count, 0);
    assert_eq!(result.errors.len(), 1);
    let issue = &result.errors[0];
    assert_eq!(issue.message, "bad date");
    assert_eq!(issue.test, "R001");
    assert_eq!(issue.line, Some(12));
    assert_eq!(issue.location, None);
    assert_eq!(issue.column, None);
    assert!(result.warnings.is_empty());
}

#[tokio::test]
async fn test_document_is_sent_verbatim() {
    let fixtures = TestFixtures::new();
    let bytes = fixtures.read(&fixtures.ubl_invoice());
    let body = String::from_utf8(bytes.clone()).unwrap();

    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/validate")
        .match_body(Matcher::Exact(body))
        .with_status(200)
        .with_body(CLEAN_RESPONSE)
        .create_async()
        .await;

    let client = client_for(server.socket_address(), 5);
    let result = client.validate(&bytes, false, None).await.unwrap();

    mock.assert_async().await;
    assert!(result.is_valid());
}

#[tokio::test]
async fn test_explicit_keyword_is_sent_as_query_parameter() {
    let keyword = "urn:acme:order:1::Order##custom#profile::9.9";

    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/validate")
        .match_query(Matcher::UrlEncoded("keyword".into(), keyword.into()))
        .with_status(200)
        .with_body(CLEAN_RESPONSE)
        .create_async()
        .await;

    let fixtures = TestFixtures::new();
    let bytes = fixtures.read(&fixtures.ubl_invoice());
    let client = client_for(server.socket_address(), 5);

    let result = client
        .validate(&bytes, false, Some(Keyword::new(keyword)))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(result.error_count, 0);
}

#[tokio::test]
async fn test_unwrapped_payload_is_sent() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/validate")
        .match_body(Matcher::Regex("^<Invoice".to_string()))
        .with_status(200)
        .with_body(CLEAN_RESPONSE)
        .create_async()
        .await;

    let fixtures = TestFixtures::new();
    let bytes = fixtures.read(&fixtures.sbdh_invoice());
    let client = client_for(server.socket_address(), 5);

    let request = ValidationRequest::prepare(&bytes, true, None).unwrap();
    assert_eq!(request.keyword.as_str(), UBL_INVOICE_KEYWORD);

    client.submit(&request).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_non_200_status_is_server_error() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/validate")
        .with_status(400)
        .with_body("No validator found for keyword")
        .create_async()
        .await;

    let fixtures = TestFixtures::new();
    let bytes = fixtures.read(&fixtures.ubl_invoice());
    let client = client_for(server.socket_address(), 5);

    let error = client.validate(&bytes, false, None).await.unwrap_err();

    mock.assert_async().await;
    assert!(error.is_server_error());
    match error {
        DocValError::ServerError {
            status, message, ..
        } => {
            assert_eq!(status, 400);
            assert_eq!(message, "No validator found for keyword");
        }
        other => panic!("Expected ServerError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_error_body_uses_status_reason() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/validate")
        .with_status(503)
        .create_async()
        .await;

    let fixtures = TestFixtures::new();
    let bytes = fixtures.read(&fixtures.ubl_invoice());
    let client = client_for(server.socket_address(), 5);

    match client.validate(&bytes, false, None).await {
        Err(DocValError::ServerError {
            status, message, ..
        }) => {
            assert_eq!(status, 503);
            assert_eq!(message, "Service Unavailable");
        }
        other => panic!("Expected ServerError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_undecodable_payload_is_server_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/validate")
        .with_status(200)
        .with_body("<html>not json</html>")
        .create_async()
        .await;

    let fixtures = TestFixtures::new();
    let bytes = fixtures.read(&fixtures.ubl_invoice());
    let client = client_for(server.socket_address(), 5);

    let error = client.validate(&bytes, false, None).await.unwrap_err();
    assert!(error.is_server_error());
    assert!(error.to_string().contains("undecodable validation result"));
}

#[tokio::test]
async fn test_connection_refused_is_network_failure() {
    let port = closed_port();
    let client = ValidationClient::new(HttpClientConfig {
        host: "127.0.0.1".to_string(),
        port,
        timeout_seconds: 5,
        ..HttpClientConfig::default()
    })
    .unwrap();

    let fixtures = TestFixtures::new();
    let bytes = fixtures.read(&fixtures.ubl_invoice());

    let error = client.validate(&bytes, false, None).await.unwrap_err();
    assert!(error.is_network_failure(), "unexpected error: {:?}", error);
}

#[tokio::test]
async fn test_unresponsive_service_times_out() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;
        drop(socket);
    });

    let fixtures = TestFixtures::new();
    let bytes = fixtures.read(&fixtures.ubl_invoice());
    let client = client_for(addr, 1);

    let error = client.validate(&bytes, false, None).await.unwrap_err();
    assert!(matches!(error, DocValError::Timeout { timeout_seconds: 1, .. }));
    assert!(error.is_network_failure());

    server.abort();
}

#[tokio::test]
async fn test_forbidden_document_never_reaches_service() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let fixtures = TestFixtures::new();
    let bytes = fixtures.read(&fixtures.xxe());
    let client = client_for(server.socket_address(), 5);

    let error = client.validate(&bytes, false, None).await.unwrap_err();
    assert!(matches!(error, DocValError::ForbiddenContent { .. }));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_inconsistent_counts_are_returned_unchanged() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/validate")
        .with_status(200)
        .with_body(r#"{"error_count":2,"warning_count":0,"errors":[],"warnings":[]}"#)
        .create_async()
        .await;

    let fixtures = TestFixtures::new();
    let bytes = fixtures.read(&fixtures.cii_invoice());
    let client = client_for(server.socket_address(), 5);

    let result = client.validate(&bytes, false, None).await.unwrap();
    assert_eq!(result.error_count, 2);
    assert!(!result.is_consistent());
}
