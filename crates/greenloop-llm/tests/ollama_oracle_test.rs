//! Ollama oracle tests against a throwaway local HTTP server.

use std::time::Duration;

use greenloop_core::oracle::{DecisionOracle, OracleError};
use greenloop_llm::{OllamaConfig, OllamaOracle};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Read one HTTP request (headers plus Content-Length body).
async fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf).to_string();
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let lower = line.to_ascii_lowercase();
                    lower
                        .strip_prefix("content-length:")
                        .map(|v| v.trim().parse::<usize>().unwrap_or(0))
                })
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                return text;
            }
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

/// Serve a single canned response and hand back the request text.
async fn serve_once(status: &'static str, body: String) -> (String, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let request = read_request(&mut stream).await;
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.ok();
        request
    });
    (format!("http://{}", addr), handle)
}

#[tokio::test]
async fn test_complete_returns_message_content() {
    let body = serde_json::json!({
        "model": "llama3.1",
        "created_at": "2026-01-01T00:00:00Z",
        "message": {"role": "assistant", "content": "Sure: {\"heater_on\": true}"},
        "done": true
    })
    .to_string();
    let (endpoint, server) = serve_once("200 OK", body).await;

    let oracle = OllamaOracle::new(OllamaConfig::new("llama3.1").with_endpoint(endpoint)).unwrap();
    let text = oracle.complete("decide").await.unwrap();
    assert_eq!(text, "Sure: {\"heater_on\": true}");

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/chat"));
    assert!(request.contains("\"stream\":false"));
    assert!(request.contains("\"content\":\"decide\""));
    assert!(request.contains("\"model\":\"llama3.1\""));
}

#[tokio::test]
async fn test_error_status_is_generation_error() {
    let (endpoint, _server) = serve_once(
        "500 Internal Server Error",
        r#"{"error":"model not loaded"}"#.to_string(),
    )
    .await;

    let oracle = OllamaOracle::new(OllamaConfig::new("llama3.1").with_endpoint(endpoint)).unwrap();
    let err = oracle.complete("decide").await.unwrap_err();
    match err {
        OracleError::Generation(msg) => assert!(msg.contains("model not loaded")),
        other => panic!("expected generation error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_garbage_body_is_serialization_error() {
    let (endpoint, _server) = serve_once("200 OK", "not json".to_string()).await;

    let oracle = OllamaOracle::new(OllamaConfig::new("llama3.1").with_endpoint(endpoint)).unwrap();
    let err = oracle.complete("decide").await.unwrap_err();
    assert!(matches!(err, OracleError::Serialization(_)));
}

#[tokio::test]
async fn test_silent_server_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let _server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let _ = read_request(&mut stream).await;
        tokio::time::sleep(Duration::from_secs(10)).await;
    });

    let config = OllamaConfig::new("llama3.1")
        .with_endpoint(format!("http://{}", addr))
        .with_timeout_secs(1);
    let oracle = OllamaOracle::new(config).unwrap();

    let err = oracle.complete("decide").await.unwrap_err();
    assert!(matches!(err, OracleError::Timeout(1)), "got {:?}", err);
}

#[tokio::test]
async fn test_unreachable_server_is_not_available() {
    // Reserve a port, then free it so nothing listens there.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let oracle =
        OllamaOracle::new(OllamaConfig::new("llama3.1").with_endpoint(format!("http://{}", addr)))
            .unwrap();
    assert!(!oracle.is_available().await);
    assert!(oracle.complete("decide").await.is_err());
}
