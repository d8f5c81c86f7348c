use std::time::Duration;

use pratai_core::backend::client::ChatBackend;
use pratai_core::delivery::DeliveryStrategy;
use pratai_core::store::ConversationStore;
use pratai_infra::http::HttpBackend;
use pratai_infra::sqlite::kv::SqliteKvStore;
use pratai_infra::sqlite::pool::DatabasePool;
use pratai_types::backend::{ChatRequest, StreamRecord};
use pratai_types::chat::SessionId;
use pratai_types::delivery::DeliveryMode;
use pratai_types::error::{AttachmentError, ClientError, UploadError};
use futures_util::StreamExt;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend_for(server: &MockServer) -> HttpBackend {
    HttpBackend::new(format!("{}/api", server.uri()), Duration::from_secs(5)).unwrap()
}

fn session() -> SessionId {
    SessionId::parse("session_1700000000000_abc123xyz").unwrap()
}

fn event_stream(lines: &[&str]) -> ResponseTemplate {
    let body: String = lines.iter().map(|line| format!("data: {line}\n\n")).collect();
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/event-stream")
        .set_body_string(body)
}

async fn kv_store() -> SqliteKvStore {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
    std::mem::forget(dir);
    SqliteKvStore::new(DatabasePool::new(&url).await.unwrap())
}

#[tokio::test]
async fn send_chat_posts_request_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({
            "message": "Hello",
            "pdf_content": "",
            "session_id": "session_1700000000000_abc123xyz"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "**Hi** there",
            "intent": "greeting",
            "confidence": 0.92,
            "response_type": "ml_local"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = backend_for(&server)
        .send_chat(&ChatRequest::new("Hello", session()))
        .await
        .unwrap();
    assert_eq!(reply.response, "**Hi** there");
    assert_eq!(reply.metadata.intent.as_deref(), Some("greeting"));
}

#[tokio::test]
async fn send_chat_maps_status_and_decode_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let err = backend
        .send_chat(&ChatRequest::new("Hello", session()))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ClientError::Status {
            status: 503,
            body: "overloaded".to_string()
        }
    );

    let err = backend
        .send_chat(&ChatRequest::new("Hello", session()))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)));
}

#[tokio::test]
async fn unreachable_backend_is_transport_error() {
    let backend = HttpBackend::new("http://127.0.0.1:9/api", Duration::from_secs(2)).unwrap();
    let err = backend
        .send_chat(&ChatRequest::new("Hello", session()))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)));
}

#[tokio::test]
async fn stream_chat_decodes_records_and_stops_at_complete() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat/stream"))
        .respond_with(event_stream(&[
            r#"{"type":"chunk","content":"Hel"}"#,
            r#"{"type":"ping"}"#,
            r#"{"type":"chunk","content":"lo!"}"#,
            r#"{"type":"complete","full_response":"Hello!"}"#,
            r#"{"type":"chunk","content":"never read"}"#,
        ]))
        .mount(&server)
        .await;

    let records: Vec<_> = backend_for(&server)
        .stream_chat(ChatRequest::new("Hi", session()))
        .collect()
        .await;
    let records: Vec<StreamRecord> = records.into_iter().map(Result::unwrap).collect();

    assert_eq!(records.len(), 3);
    assert!(records[2].is_terminal());
}

#[tokio::test]
async fn stream_chat_uses_configured_path() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/stream"))
        .respond_with(event_stream(&[r#"{"type":"complete","full_response":"ok"}"#]))
        .expect(1)
        .mount(&server)
        .await;

    let records: Vec<_> = backend_for(&server)
        .with_stream_path("/stream")
        .stream_chat(ChatRequest::new("Hi", session()))
        .collect()
        .await;
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn stream_chat_status_error_is_single_err_item() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat/stream"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let records: Vec<_> = backend_for(&server)
        .stream_chat(ChatRequest::new("Hi", session()))
        .collect()
        .await;
    assert_eq!(records.len(), 1);
    assert!(matches!(
        records[0],
        Err(ClientError::Status { status: 500, .. })
    ));
}

#[tokio::test]
async fn streaming_turn_through_store() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chat/stream"))
        .respond_with(event_stream(&[
            r#"{"type":"chunk","content":"Hel"}"#,
            r#"{"type":"chunk","content":"lo!"}"#,
            r#"{"type":"complete","full_response":"Hello!","conversation_id":"c-1"}"#,
        ]))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "unused"})))
        .expect(0)
        .mount(&server)
        .await;

    let mut store = ConversationStore::initialize(
        backend_for(&server),
        kv_store().await,
        DeliveryStrategy::new(DeliveryMode::Streaming),
    )
    .await;

    let mut seen = Vec::new();
    store
        .submit("Hi", None, |state| {
            if state.loading && !state.raw_response.is_empty() {
                seen.push(state.raw_response.clone());
            }
        })
        .await
        .unwrap();

    assert_eq!(seen, vec!["Hel", "Hello!"]);
    let state = store.state();
    assert_eq!(state.history.len(), 1);
    assert_eq!(state.history[0].bot_response, "Hello!");
    assert_eq!(state.history[0].conversation_id.as_deref(), Some("c-1"));
}

#[tokio::test]
async fn failed_stream_falls_back_to_single_shot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chat/stream"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "**Hi** there"})))
        .expect(1)
        .mount(&server)
        .await;

    let mut store = ConversationStore::initialize(
        backend_for(&server),
        kv_store().await,
        DeliveryStrategy::new(DeliveryMode::Streaming),
    )
    .await;
    store.submit("Hello", None, |_| {}).await.unwrap();

    let state = store.state();
    assert!(!state.loading);
    assert_eq!(state.history.len(), 1);
    assert_eq!(state.history[0].bot_response, "**Hi** there");
    assert!(state.result_data.contains("<b>Hi</b>"));
    assert_eq!(state.last_mode, Some(DeliveryMode::SingleShot));
}

#[tokio::test]
async fn fetch_history_sends_session_and_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/history"))
        .and(query_param("session_id", "session_1700000000000_abc123xyz"))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "user_message": "hi", "bot_response": "hello", "intent": "greeting",
             "confidence": 0.9, "sentiment": "positive", "response_type": "ml_local",
             "timestamp": "2024-05-01T10:00:00"},
            {"id": 2, "user_message": "bye", "bot_response": "see you", "timestamp": "2024-05-01T10:01:00"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let turns = backend_for(&server).fetch_history(&session(), 50).await.unwrap();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].user_message, "hi");
    assert_eq!(turns[0].metadata.sentiment.as_deref(), Some("positive"));
    assert_eq!(turns[1].bot_response, "see you");
}

#[tokio::test]
async fn reset_history_accepts_json_or_empty_body() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/reset"))
        .and(query_param("session_id", "session_1700000000000_abc123xyz"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "success", "message": "History cleared"})),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/reset"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let receipt = backend.reset_history(&session()).await.unwrap();
    assert_eq!(receipt.message.as_deref(), Some("History cleared"));

    let receipt = backend.reset_history(&session()).await.unwrap();
    assert!(receipt.status.is_none());
}

#[tokio::test]
async fn oversize_pdf_is_rejected_without_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/process-pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"content": "x"})))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("huge.pdf");
    let file = std::fs::File::create(&file_path).unwrap();
    file.set_len(15 * 1024 * 1024).unwrap();

    let err = backend_for(&server)
        .process_pdf_file(&file_path)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        UploadError::Attachment(AttachmentError::TooLarge { .. })
    ));
}

#[tokio::test]
async fn non_pdf_is_rejected_without_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/upload-pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("notes.txt");
    std::fs::write(&file_path, "plain text").unwrap();

    let err = backend_for(&server)
        .upload_pdf_file(&file_path)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        UploadError::Attachment(AttachmentError::NotPdf { .. })
    ));
}

#[tokio::test]
async fn process_pdf_returns_extracted_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/process-pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"content": "Extracted text", "filename": "notes.pdf"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("notes.pdf");
    std::fs::write(&file_path, b"%PDF-1.4 minimal").unwrap();

    let content = backend_for(&server)
        .process_pdf_file(&file_path)
        .await
        .unwrap();
    assert_eq!(content.content, "Extracted text");
    assert_eq!(content.filename.as_deref(), Some("notes.pdf"));
}

#[tokio::test]
async fn stats_and_train_pass_json_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total_conversations": 12})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/train"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "trained"})))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    assert_eq!(
        backend.stats().await.unwrap(),
        json!({"total_conversations": 12})
    );
    assert_eq!(backend.train().await.unwrap()["status"], "trained");
}
