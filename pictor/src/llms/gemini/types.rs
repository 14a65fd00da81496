//! Gemini `generateContent` wire types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::chat::{ChatRequest, Usage};
use crate::event::{Content, Part};
use crate::tool::ToolDefinition;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<SystemInstruction>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<GeminiTool>,
}

impl GenerateContentRequest {
    pub(crate) fn from_chat(request: &ChatRequest) -> Self {
        let contents = request
            .contents
            .iter()
            .map(|content| Content {
                role: content.role,
                parts: content
                    .parts
                    .iter()
                    .filter(|part| !part.is_other())
                    .cloned()
                    .collect(),
            })
            .filter(|content| !content.parts.is_empty())
            .collect();

        let system_instruction =
            request
                .system_instruction
                .as_ref()
                .map(|text| SystemInstruction {
                    parts: vec![Part::Text(text.clone())],
                });

        let tools = if request.tools.is_empty() {
            Vec::new()
        } else {
            vec![GeminiTool {
                function_declarations: request
                    .tools
                    .iter()
                    .map(FunctionDeclaration::from)
                    .collect(),
            }]
        };

        Self {
            contents,
            system_instruction,
            tools,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SystemInstruction {
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiTool {
    pub function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Debug, Serialize)]
pub(crate) struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
}

impl From<&ToolDefinition> for FunctionDeclaration {
    fn from(def: &ToolDefinition) -> Self {
        Self {
            name: def.name.clone(),
            description: def.description.clone(),
            parameters: sanitize_schema(&def.parameters),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
    #[serde(default)]
    pub total_token_count: u32,
}

impl From<UsageMetadata> for Usage {
    fn from(meta: UsageMetadata) -> Self {
        Self::new(
            meta.prompt_token_count,
            meta.candidates_token_count,
            meta.total_token_count,
        )
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Adapt an MCP JSON Schema to the subset Gemini accepts.
///
/// Drops `$schema` and `additionalProperties` everywhere, and returns `None`
/// for an object schema without properties.
pub(crate) fn sanitize_schema(schema: &Value) -> Option<Value> {
    if schema.is_null() {
        return None;
    }

    let mut schema = schema.clone();
    strip_unsupported(&mut schema);

    let is_object = schema.get("type").and_then(Value::as_str) == Some("object");
    let has_properties = schema
        .get("properties")
        .and_then(Value::as_object)
        .is_some_and(|props| !props.is_empty());

    (!is_object || has_properties).then_some(schema)
}

fn strip_unsupported(value: &mut Value) {
    match value {
        Value::Object(map) => {
            strip_keys(map);
            map.values_mut().for_each(strip_unsupported);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_unsupported),
        _ => {}
    }
}

fn strip_keys(map: &mut Map<String, Value>) {
    map.remove("$schema");
    map.remove("additionalProperties");
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::event::{FunctionCall, FunctionResponse, ToolResponse};
    use serde_json::json;

    #[test]
    fn empty_object_schema_is_omitted() {
        let schema = json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "object",
            "properties": {},
            "additionalProperties": false
        });
        assert_eq!(sanitize_schema(&schema), None);
    }

    #[test]
    fn nested_unsupported_keys_are_stripped() {
        let schema = json!({
            "type": "object",
            "properties": {
                "size": {
                    "type": "object",
                    "properties": { "w": { "type": "integer" } },
                    "additionalProperties": false
                }
            },
            "additionalProperties": false,
            "$schema": "x"
        });

        let cleaned = sanitize_schema(&schema).unwrap();
        assert!(cleaned.get("$schema").is_none());
        assert!(cleaned.get("additionalProperties").is_none());
        assert!(cleaned["properties"]["size"].get("additionalProperties").is_none());
        assert_eq!(cleaned["properties"]["size"]["properties"]["w"]["type"], "integer");
    }

    #[test]
    fn request_body_shape() {
        let request = ChatRequest::new("gemini-2.5-flash-lite")
            .system("Use the tool.")
            .contents(vec![
                Content::user("Provide a sample tiny image"),
                Content::model(vec![
                    Part::Other,
                    Part::FunctionCall(FunctionCall {
                        name: "getTinyImage".into(),
                        args: json!({}),
                        ..FunctionCall::default()
                    }),
                ]),
                Content::function_responses(vec![FunctionResponse {
                    id: None,
                    name: "getTinyImage".into(),
                    response: ToolResponse::text("done"),
                }]),
                Content::model(vec![Part::Other]),
            ])
            .tools(vec![ToolDefinition::new(
                "getTinyImage",
                "Returns the MCP_TINY_IMAGE",
                json!({ "type": "object", "properties": {} }),
            )]);

        let body = serde_json::to_value(GenerateContentRequest::from_chat(&request)).unwrap();

        assert_eq!(body["systemInstruction"], json!({ "parts": [{ "text": "Use the tool." }] }));
        assert_eq!(body["contents"].as_array().unwrap().len(), 3);
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(body["contents"][1]["parts"].as_array().unwrap().len(), 1);
        assert_eq!(body["contents"][1]["parts"][0]["functionCall"]["name"], "getTinyImage");
        assert_eq!(
            body["contents"][2]["parts"][0]["functionResponse"]["response"]["content"][0]["text"],
            "done"
        );
        let declaration = &body["tools"][0]["functionDeclarations"][0];
        assert_eq!(declaration["name"], "getTinyImage");
        assert!(declaration.get("parameters").is_none());
    }

    #[test]
    fn request_without_tools_or_instruction() {
        let request = ChatRequest::new("m").contents(vec![Content::user("hi")]);
        let body = serde_json::to_value(GenerateContentRequest::from_chat(&request)).unwrap();

        assert!(body.get("tools").is_none());
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn response_parses_candidates_and_usage() {
        let raw = json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{ "functionCall": { "name": "getTinyImage", "args": {} } }]
                },
                "finishReason": "STOP"
            }],
            "usageMetadata": {
                "promptTokenCount": 12,
                "candidatesTokenCount": 3,
                "totalTokenCount": 15
            }
        });

        let response: GenerateContentResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(response.candidates.len(), 1);
        assert_eq!(response.candidates[0].finish_reason.as_deref(), Some("STOP"));
        assert_eq!(
            Usage::from(response.usage_metadata.unwrap()),
            Usage::new(12, 3, 15)
        );
    }
}
