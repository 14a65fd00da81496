//! Integration tests for the agent run and response scanning pipeline.

#![allow(clippy::unwrap_used, clippy::panic, clippy::clone_on_ref_ptr)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use assert_fs::TempDir;
use assert_fs::prelude::*;
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use pictor::prelude::*;
use serde_json::{Value, json};

const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

/// Stands in for the MCP server's `getTinyImage` tool.
#[derive(Debug, Default)]
struct TinyImageTool {
    calls: Mutex<usize>,
}

#[async_trait]
impl Toolset for TinyImageTool {
    fn definitions(&self) -> Vec<ToolDefinition> {
        vec![ToolDefinition::new(
            "getTinyImage",
            "Returns the MCP_TINY_IMAGE",
            json!({ "type": "object", "properties": {} }),
        )]
    }

    async fn call(&self, _name: &str, _args: Value) -> Result<ToolResponse> {
        *self.calls.lock().unwrap() += 1;
        Ok(serde_json::from_value(json!({
            "content": [
                { "type": "text", "text": "This is a sample image:" },
                { "type": "image", "data": STANDARD.encode(PNG_MAGIC), "mimeType": "image/png" },
                { "type": "text", "text": "The image above is the MCP tiny image." }
            ]
        }))?)
    }
}

/// Calls the tool once, then answers.
struct ScriptedGemini {
    turns: Mutex<VecDeque<Content>>,
}

impl ScriptedGemini {
    fn new() -> Self {
        let call: Content = serde_json::from_value(json!({
            "role": "model",
            "parts": [{ "functionCall": { "name": "getTinyImage", "args": {} } }]
        }))
        .unwrap();
        let answer = Content::model(vec![Part::Text(
            "Here is a small, sample image.\n".into(),
        )]);
        Self {
            turns: Mutex::new(VecDeque::from([call, answer])),
        }
    }
}

#[async_trait]
impl ChatProvider for ScriptedGemini {
    async fn chat(&self, _request: &ChatRequest) -> Result<ChatResponse> {
        let content = self.turns.lock().unwrap().pop_front().unwrap();
        Ok(ChatResponse::new(content))
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }
}

fn image_part(data: &str) -> Part {
    Part::FunctionResponse(FunctionResponse {
        id: None,
        name: "getTinyImage".into(),
        response: ToolResponse {
            content: vec![ResponseItem::Image {
                data: data.into(),
                mime_type: Some("image/png".into()),
            }],
            is_error: false,
        },
    })
}

#[test]
fn test_scan_mixed_events() {
    let temp = TempDir::new().unwrap();
    let output = temp.child("tiny_image.png");

    let events = vec![
        Event::empty("image_agent"),
        Event::new(
            "image_agent",
            Content::model(vec![
                Part::Text("Here is ".into()),
                Part::FunctionResponse(FunctionResponse {
                    id: None,
                    name: "getTinyImage".into(),
                    response: ToolResponse::text("no image here"),
                }),
            ]),
        ),
        Event::new(
            "image_agent",
            Content::model(vec![Part::Text("your image.".into()), image_part("QUJD")]),
        ),
    ];

    let status = extract_image(&events, output.path()).unwrap();
    assert!(status.is_saved());
    assert_eq!(std::fs::read(output.path()).unwrap(), b"ABC");
    assert_eq!(extract_text(&events), "Here is your image.");
}

#[test]
fn test_scan_wire_events() {
    let temp = TempDir::new().unwrap();
    let output = temp.child("wire.png");

    let event: Event = serde_json::from_value(json!({
        "author": "image_agent",
        "content": {
            "role": "user",
            "parts": [
                { "text": "thinking...", "thought": true },
                { "functionResponse": {
                    "name": "getTinyImage",
                    "response": { "content": [
                        { "type": "resource", "uri": "test://static/1" },
                        { "type": "image", "data": STANDARD.encode(PNG_MAGIC), "mimeType": "image/png" }
                    ]}
                }}
            ]
        }
    }))
    .unwrap();

    let status = extract_image(&[event.clone()], output.path()).unwrap();

    assert_eq!(status.path(), Some(output.path().canonicalize().unwrap().as_path()));
    assert_eq!(std::fs::read(output.path()).unwrap(), PNG_MAGIC);
    assert!(extract_text(&[event]).is_empty());
}

#[tokio::test]
async fn test_agent_run_saves_tool_image() {
    let temp = TempDir::new().unwrap();
    let output = temp.child("tiny_image.png");

    let tool = Arc::new(TinyImageTool::default());
    let agent = Agent::new("image_agent")
        .model("gemini-2.5-flash-lite")
        .instruction("Use the getTinyImage tool.")
        .provider(Arc::new(ScriptedGemini::new()))
        .toolset(tool.clone());

    let events = Runner::run(&agent, "Provide a sample tiny image").await.unwrap();

    assert_eq!(*tool.calls.lock().unwrap(), 1);
    assert!(events.iter().all(|event| event.author == "image_agent"));

    let status = extract_image(&events, output.path()).unwrap();
    assert!(status.is_saved());
    assert_eq!(std::fs::read(output.path()).unwrap(), PNG_MAGIC);

    // Tool text items live inside the response, not in text parts.
    assert_eq!(extract_text(&events).trim(), "Here is a small, sample image.");
}

#[tokio::test]
async fn test_agent_run_without_tool_call_finds_no_image() {
    let temp = TempDir::new().unwrap();
    let output = temp.child("tiny_image.png");

    let provider = ScriptedGemini::new();
    provider.turns.lock().unwrap().pop_front();
    let agent = Agent::new("image_agent").provider(Arc::new(provider));

    let events = Runner::run(&agent, "Provide a sample tiny image").await.unwrap();
    let status = extract_image(&events, output.path()).unwrap();

    assert_eq!(status, ImageStatus::NotFound);
    assert!(!output.path().exists());
}
