//! ChatEngine over a canvas file and vault on disk
//!
//! Run with: `cargo test --test engine`

use canvas_chat::{
    Canvas, CanvasRegistry, ChatConfig, ChatEngine, MockCompletionClient, Role, VaultResolver,
};
use serde_json::json;
use std::sync::Arc;

async fn vault() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    tokio::fs::write(
        dir.path().join("Research.md"),
        "# Research\nintro\n\n## Findings\nBFS is level order.\n\n## Open\nnothing yet\n",
    )
    .await
    .unwrap();

    let canvas = json!({
        "nodes": [
            {"id": "sys", "type": "text", "text": "SYSTEM PROMPT\nAnswer in one line.", "x": 0, "y": 0},
            {"id": "doc", "type": "file", "file": "Research.md", "subpath": "#Findings", "x": 0, "y": 100},
            {"id": "missing", "type": "file", "file": "Gone.md", "x": 300, "y": 100},
            {"id": "ask", "type": "text", "text": "Summarize {{notes}}", "x": 0, "y": 200},
            {"id": "reply", "type": "text", "text": "It is level order.", "x": 0, "y": 300, "chat_role": "assistant"},
            {"id": "more", "type": "text", "text": "Why?", "x": 0, "y": 400}
        ],
        "edges": [
            {"id": "e1", "fromNode": "sys", "toNode": "doc"},
            {"id": "e2", "fromNode": "doc", "toNode": "ask", "label": "notes"},
            {"id": "e3", "fromNode": "missing", "toNode": "ask"},
            {"id": "e4", "fromNode": "ask", "toNode": "reply"},
            {"id": "e5", "fromNode": "reply", "toNode": "more"}
        ]
    });
    tokio::fs::write(dir.path().join("chat.canvas"), canvas.to_string())
        .await
        .unwrap();
    dir
}

async fn engine(dir: &tempfile::TempDir, config: ChatConfig) -> (ChatEngine, canvas_chat::CanvasId) {
    let canvas = Canvas::load(dir.path().join("chat.canvas")).await.unwrap();
    let registry = Arc::new(CanvasRegistry::new());
    let id = registry.upsert(canvas);
    let engine = ChatEngine::new(registry, Arc::new(VaultResolver::new(dir.path())), config);
    (engine, id)
}

#[tokio::test]
async fn assembles_vault_conversation() {
    let dir = vault().await;
    let (engine, id) = engine(&dir, ChatConfig::default()).await;

    let assembly = engine.build_messages(&id, &"more".into()).await.unwrap();
    let pairs: Vec<(Role, &str)> = assembly
        .messages
        .iter()
        .map(|m| (m.role, m.content.as_str()))
        .collect();

    // "missing" fails to resolve and is skipped
    assert_eq!(
        pairs,
        vec![
            (Role::System, "Answer in one line."),
            (Role::User, "## Findings\nBFS is level order."),
            (Role::User, "Summarize {{notes}}"),
            (Role::Assistant, "It is level order."),
            (Role::User, "Why?"),
        ]
    );
    assert_eq!(assembly.system_override, Some("sys".into()));
}

#[tokio::test]
async fn expands_template_from_vault_section() {
    let dir = vault().await;
    let (engine, id) = engine(&dir, ChatConfig::default()).await;

    let expanded = engine.expand_template(&id, &"ask".into()).await.unwrap();
    assert_eq!(expanded.as_deref(), Some("Summarize ## Findings\nBFS is level order."));
}

#[tokio::test]
async fn depth_limit_from_config_reaches_the_client() {
    let dir = vault().await;
    let config = ChatConfig {
        max_depth: 1,
        model: "gpt-4".to_string(),
        ..Default::default()
    };
    let (engine, id) = engine(&dir, config).await;
    let client = MockCompletionClient::replying("Because each level is finished first.");

    let reply = engine.complete(&id, &"more".into(), &client).await.unwrap();
    assert_eq!(reply.as_deref(), Some("Because each level is finished first."));

    let sent = client.requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].model, "gpt-4");
    let contents: Vec<&str> = sent[0].messages.iter().map(|m| m.content.as_str()).collect();
    // Roots are out of reach, so the configured default prompt applies
    assert_eq!(contents[1..], ["It is level order.", "Why?"]);
    assert_eq!(sent[0].messages[0].role, Role::System);
}
