use super::*;
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router};
use tokio::{
    net::TcpListener,
    sync::{oneshot, Mutex},
};

#[derive(Clone)]
struct ServerState {
    tx: Arc<Mutex<Option<oneshot::Sender<ChatRequest>>>>,
}

async fn handle_chat(
    State(state): State<ServerState>,
    Json(payload): Json<ChatRequest>,
) -> Json<ChatResponse> {
    let reply = format!("echo: {}", payload.message);
    if let Some(tx) = state.tx.lock().await.take() {
        let _ = tx.send(payload);
    }
    Json(ChatResponse {
        response: reply,
        escalated: false,
        session_end: false,
    })
}

async fn serve(app: Router) -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

async fn spawn_chat_server() -> (String, oneshot::Receiver<ChatRequest>) {
    let (tx, rx) = oneshot::channel();
    let state = ServerState {
        tx: Arc::new(Mutex::new(Some(tx))),
    };
    let app = Router::new()
        .route("/chat/", post(handle_chat))
        .with_state(state);
    (serve(app).await, rx)
}

async fn spawn_fixed_server(status: StatusCode, body: &'static str) -> String {
    let app = Router::new().route(
        "/chat/",
        post(move || async move {
            (
                status,
                [(axum::http::header::CONTENT_TYPE, "application/json")],
                body,
            )
                .into_response()
        }),
    );
    serve(app).await
}

fn session() -> SessionId {
    SessionId("session-1".into())
}

#[test]
fn chat_endpoint_appends_chat_path() {
    assert_eq!(
        chat_endpoint("http://localhost:8000").expect("url").as_str(),
        "http://localhost:8000/chat/"
    );
    assert_eq!(
        chat_endpoint(" http://localhost:8000/ ").expect("url").as_str(),
        "http://localhost:8000/chat/"
    );
    assert_eq!(
        chat_endpoint("https://support.example.com/api").expect("url").as_str(),
        "https://support.example.com/api/chat/"
    );
}

#[test]
fn chat_endpoint_rejects_unusable_base_urls() {
    for bad in ["", "   ", "localhost:8000", "ftp://example.com", "not a url"] {
        let err = chat_endpoint(bad).expect_err(bad);
        assert!(
            matches!(err, TransportError::InvalidBaseUrl { .. }),
            "unexpected error for {bad:?}: {err}"
        );
    }
}

#[tokio::test]
async fn exchange_posts_session_and_message() {
    let (server_url, request_rx) = spawn_chat_server().await;
    let client = HttpChatClient::new(&server_url).expect("client");

    let reply = client.exchange(&session(), "Hello").await.expect("reply");
    assert_eq!(reply.reply, "echo: Hello");
    assert!(!reply.escalated);
    assert!(!reply.session_end);

    let request = request_rx.await.expect("request");
    assert_eq!(request.session_id, session());
    assert_eq!(request.message, "Hello");
}

#[tokio::test]
async fn exchange_parses_escalation_and_session_end_flags() {
    let server_url = spawn_fixed_server(
        StatusCode::OK,
        r#"{"response":"Goodbye!","escalated":true,"session_end":true}"#,
    )
    .await;
    let client = HttpChatClient::new(&server_url).expect("client");

    let reply = client.exchange(&session(), "bye").await.expect("reply");
    assert_eq!(
        reply,
        ChatReply {
            reply: "Goodbye!".into(),
            escalated: true,
            session_end: true,
        }
    );
}

#[tokio::test]
async fn non_success_status_is_a_status_error() {
    let server_url =
        spawn_fixed_server(StatusCode::SERVICE_UNAVAILABLE, r#"{"detail":"down"}"#).await;
    let client = HttpChatClient::new(&server_url).expect("client");

    match client.exchange(&session(), "hi").await {
        Err(TransportError::Status { status, body }) => {
            assert_eq!(status, 503);
            assert!(body.contains("down"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn unparsable_body_is_malformed() {
    let server_url = spawn_fixed_server(StatusCode::OK, "<html>oops</html>").await;
    let client = HttpChatClient::new(&server_url).expect("client");

    let err = client
        .exchange(&session(), "hi")
        .await
        .expect_err("must fail");
    assert!(matches!(err, TransportError::Malformed(_)), "{err}");
}

#[tokio::test]
async fn reply_missing_flags_is_malformed() {
    let server_url = spawn_fixed_server(StatusCode::OK, r#"{"response":"partial"}"#).await;
    let client = HttpChatClient::new(&server_url).expect("client");

    let err = client
        .exchange(&session(), "hi")
        .await
        .expect_err("must fail");
    assert!(matches!(err, TransportError::Malformed(_)), "{err}");
}

#[tokio::test]
async fn unreachable_service_is_a_network_error() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let client = HttpChatClient::new(&format!("http://{addr}")).expect("client");
    let err = client
        .exchange(&session(), "hi")
        .await
        .expect_err("must fail");
    assert!(matches!(err, TransportError::Network(_)), "{err}");
}
