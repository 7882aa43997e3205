//! Integration tests for the HTTP gateway: chat, upgrade, and health calls
//! against a minimal in-process HTTP responder (no mocks).

use neura_chat_client::{Backend, GatewayClient, GatewayError, RemainingHours};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

/// What the responder saw for one request.
#[derive(Debug)]
struct Recorded {
    method: String,
    target: String,
    body: String,
}

async fn read_request(stream: &mut TcpStream) -> Recorded {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    let head_end = loop {
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before request head");
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };
    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let content_length = head
        .lines()
        .filter_map(|l| l.split_once(':'))
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.trim().parse::<usize>().ok())
        .unwrap_or(0);
    while buf.len() < head_end + content_length {
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before request body");
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = String::from_utf8_lossy(&buf[head_end..head_end + content_length]).to_string();
    let mut request_line = head.lines().next().unwrap().split_whitespace();
    Recorded {
        method: request_line.next().unwrap().to_string(),
        target: request_line.next().unwrap().to_string(),
        body,
    }
}

/// Serve one canned `(status, body)` per incoming connection, in order.
/// Returns the base URL and a channel of the requests received.
async fn spawn_responder(
    responses: Vec<(u16, &'static str)>,
) -> (String, mpsc::UnboundedReceiver<Recorded>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        for (status, body) in responses {
            let (mut stream, _) = listener.accept().await.unwrap();
            let recorded = read_request(&mut stream).await;
            let _ = tx.send(recorded);
            let reason = if status == 200 { "OK" } else { "Error" };
            let response = format!(
                "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                reason,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            let _ = stream.shutdown().await;
        }
    });
    (format!("http://127.0.0.1:{}", port), rx)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn chat_message_sends_query_params_and_parses_reply() {
    let (base_url, mut requests) =
        spawn_responder(vec![(200, r#"{"reply":"Hi there!","remaining_hours":4}"#)]).await;
    let client = GatewayClient::new(&base_url);

    let reply = client
        .send_chat_message("hello", "guest", false)
        .await
        .expect("chat should succeed");

    assert_eq!(reply.reply, "Hi there!");
    assert_eq!(reply.remaining_hours, RemainingHours::Hours(4.0));

    let seen = requests.recv().await.unwrap();
    assert_eq!(seen.method, "GET");
    assert!(seen.target.starts_with("/chat?"), "target: {}", seen.target);
    assert!(seen.target.contains("msg=hello"));
    assert!(seen.target.contains("user_id=guest"));
    assert!(seen.target.contains("premium=false"));
}

#[tokio::test]
async fn chat_message_text_is_url_encoded() {
    let (base_url, mut requests) =
        spawn_responder(vec![(200, r#"{"reply":"ok","remaining_hours":2}"#)]).await;
    let client = GatewayClient::new(&base_url);

    client
        .send_chat_message("fish & chips?", "guest", false)
        .await
        .expect("chat should succeed");

    let seen = requests.recv().await.unwrap();
    assert!(
        seen.target.contains("msg=fish+%26+chips%3F"),
        "target: {}",
        seen.target
    );
}

#[tokio::test]
async fn upgrade_posts_user_id_and_parses_reply() {
    let (base_url, mut requests) =
        spawn_responder(vec![(200, r#"{"message":"Upgraded!","remaining_hours":999}"#)]).await;
    let client = GatewayClient::new(&base_url);

    let reply = client
        .request_upgrade("user-42")
        .await
        .expect("upgrade should succeed");

    assert_eq!(reply.message, "Upgraded!");
    assert_eq!(reply.remaining_hours, RemainingHours::Hours(999.0));

    let seen = requests.recv().await.unwrap();
    assert_eq!(seen.method, "POST");
    assert_eq!(seen.target, "/upgrade");
    let body: serde_json::Value = serde_json::from_str(&seen.body).unwrap();
    assert_eq!(body["user_id"], "user-42");
}

#[tokio::test]
async fn upgrade_accepts_unlimited_hours() {
    let (base_url, _requests) = spawn_responder(vec![(
        200,
        r#"{"message":"Upgraded to premium!","remaining_hours":"Unlimited"}"#,
    )])
    .await;
    let client = GatewayClient::new(&base_url);

    let reply = client.request_upgrade("guest").await.unwrap();
    assert!(reply.remaining_hours.is_unlimited());
}

#[tokio::test]
async fn health_reports_status_and_model() {
    let (base_url, mut requests) =
        spawn_responder(vec![(200, r#"{"status":"ok","model":"gpt-5-mini"}"#)]).await;
    let client = GatewayClient::new(&base_url);

    let health = client.health().await.expect("health should succeed");
    assert_eq!(health.status, "ok");
    assert_eq!(health.model.as_deref(), Some("gpt-5-mini"));
    assert_eq!(requests.recv().await.unwrap().target, "/health");
}

#[tokio::test]
async fn non_json_body_is_malformed() {
    let (base_url, _requests) = spawn_responder(vec![(200, "<html>oops</html>")]).await;
    let client = GatewayClient::new(&base_url);

    let err = client
        .send_chat_message("hello", "guest", false)
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Malformed(_)), "got {:?}", err);
}

#[tokio::test]
async fn missing_field_is_malformed() {
    let (base_url, _requests) = spawn_responder(vec![(200, r#"{"reply":"no hours"}"#)]).await;
    let client = GatewayClient::new(&base_url);

    let err = client
        .send_chat_message("hello", "guest", false)
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Malformed(_)), "got {:?}", err);
}

#[tokio::test]
async fn error_status_is_reported_with_body() {
    let (base_url, _requests) = spawn_responder(vec![(500, r#"{"error":"boom"}"#)]).await;
    let client = GatewayClient::new(&base_url);

    let err = client.request_upgrade("guest").await.unwrap_err();
    match err {
        GatewayError::Status { status, body } => {
            assert_eq!(status.as_u16(), 500);
            assert!(body.contains("boom"));
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn unreachable_backend_is_transport_error() {
    // Bind then drop to get a port with nothing listening.
    let port = {
        let l = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        l.local_addr().unwrap().port()
    };
    let client = GatewayClient::new(&format!("http://127.0.0.1:{}", port));

    let err = client
        .send_chat_message("hello", "guest", false)
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Transport(_)), "got {:?}", err);
}
