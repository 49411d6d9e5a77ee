mod helpers;

use std::sync::Arc;

use helpers::{service_with, user, Call, RecordingBackend};
use scoped_memory::identity::RequestIdentityContext;
use serde_json::json;

fn header_context(id: &str) -> RequestIdentityContext {
    let ctx = RequestIdentityContext::new();
    ctx.set(user(id));
    ctx
}

#[tokio::test]
async fn delete_without_confirm_never_touches_storage() {
    let backend = Arc::new(RecordingBackend::new());
    let service = service_with(backend.clone());

    let msg = service
        .delete_all(false, Some("alice"), &header_context("bob"))
        .await;

    assert!(msg.contains("not confirmed"), "got: {msg}");
    assert_eq!(backend.count("delete_all"), 0);
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn confirmed_delete_runs_once_for_resolved_user() {
    let backend = Arc::new(RecordingBackend::new());
    let service = service_with(backend.clone());

    let msg = service
        .delete_all(true, None, &header_context("bob"))
        .await;

    assert_eq!(msg, "Successfully deleted all memories for user 'bob'.");
    assert_eq!(
        backend.calls(),
        vec![Call { op: "delete_all", user: "bob".into() }]
    );
}

#[tokio::test]
async fn save_previews_long_text() {
    let backend = Arc::new(RecordingBackend::new());
    let service = service_with(backend.clone());
    let text = "x".repeat(150);

    let msg = service
        .save(text, None, &RequestIdentityContext::new())
        .await;

    assert_eq!(
        msg,
        format!("Successfully saved memory for user 'default': {}...", "x".repeat(100))
    );
}

#[tokio::test]
async fn save_echoes_short_text_in_full() {
    let backend = Arc::new(RecordingBackend::new());
    let service = service_with(backend.clone());
    let text = "y".repeat(50);

    let msg = service
        .save(text.clone(), Some(" carol "), &RequestIdentityContext::new())
        .await;

    assert_eq!(msg, format!("Successfully saved memory for user 'carol': {text}"));
    assert!(!msg.ends_with("..."));
    assert_eq!(backend.calls(), vec![Call { op: "add", user: "carol".into() }]);
}

#[tokio::test]
async fn explicit_parameter_overrides_header() {
    let backend = Arc::new(RecordingBackend::new());
    let service = service_with(backend.clone());

    service
        .get_all(Some("alice"), &header_context("bob"))
        .await;
    service.get_all(Some("   "), &header_context("bob")).await;
    service.get_all(None, &RequestIdentityContext::new()).await;

    let users: Vec<String> = backend.calls().into_iter().map(|c| c.user).collect();
    assert_eq!(users, vec!["alice", "bob", "default"]);
}

#[tokio::test]
async fn listing_unwraps_results_envelope() {
    let backend = Arc::new(RecordingBackend::answering(json!({
        "results": [{ "memory": "likes tea", "id": "1" }, { "memory": "lives in Oslo" }]
    })));
    let service = service_with(backend);

    let body = service.get_all(None, &RequestIdentityContext::new()).await;
    let parsed: Vec<String> = serde_json::from_str(&body).unwrap();
    assert_eq!(parsed, vec!["likes tea", "lives in Oslo"]);
}

#[tokio::test]
async fn search_passes_flat_list_through() {
    let backend = Arc::new(RecordingBackend::answering(json!(["one", "two"])));
    let service = service_with(backend.clone());

    let body = service
        .search("anything".into(), None, None, &header_context("dana"))
        .await;
    let parsed: Vec<String> = serde_json::from_str(&body).unwrap();
    assert_eq!(parsed, vec!["one", "two"]);
    assert_eq!(backend.calls(), vec![Call { op: "search", user: "dana".into() }]);
}

#[tokio::test]
async fn storage_failures_come_back_as_error_strings() {
    let backend = Arc::new(RecordingBackend::failing("connection refused"));
    let service = service_with(backend);
    let ctx = RequestIdentityContext::new();

    let save = service.save("hello".into(), None, &ctx).await;
    let list = service.get_all(None, &ctx).await;
    let search = service.search("q".into(), Some(5), None, &ctx).await;
    let delete = service.delete_all(true, None, &ctx).await;

    assert!(save.starts_with("Error saving memory:"), "{save}");
    assert!(list.starts_with("Error retrieving memories:"), "{list}");
    assert!(search.starts_with("Error searching memories:"), "{search}");
    assert!(delete.starts_with("Error deleting memories:"), "{delete}");
    assert!(save.contains("connection refused"));
}

#[tokio::test]
async fn malformed_backend_response_is_reported_in_band() {
    let backend = Arc::new(RecordingBackend::answering(json!({ "results": [{ "text": "x" }] })));
    let service = service_with(backend);

    let body = service.get_all(None, &RequestIdentityContext::new()).await;
    assert!(body.starts_with("Error retrieving memories:"), "{body}");
}
