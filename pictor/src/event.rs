//! Events produced by an agent run and the content they carry.
//!
//! The JSON shape of [`Content`] and [`Part`] follows Gemini's
//! `generateContent` payloads, so the same types serve as request history,
//! model responses and the events returned by [`Runner`](crate::agent::Runner).
//!
//! Parts are resolved into a closed [`Part`] enum when they are deserialized.
//! Nothing downstream probes JSON objects for optional keys.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Author role of a [`Content`] block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User input, including tool results fed back to the model.
    #[default]
    User,
    /// Model output.
    Model,
}

impl Role {
    /// Get the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

/// An ordered list of parts produced by one author.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Content {
    /// Who produced this content.
    #[serde(default)]
    pub role: Role,
    /// The content fragments, in order.
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// Create user content holding a single text part.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part::Text(text.into())],
        }
    }

    /// Create model content from parts.
    #[must_use]
    pub const fn model(parts: Vec<Part>) -> Self {
        Self {
            role: Role::Model,
            parts,
        }
    }

    /// Create the user turn that returns tool results to the model.
    #[must_use]
    pub fn function_responses(responses: Vec<FunctionResponse>) -> Self {
        Self {
            role: Role::User,
            parts: responses.into_iter().map(Part::FunctionResponse).collect(),
        }
    }

    /// Iterate over the function calls requested in this content.
    pub fn function_calls(&self) -> impl Iterator<Item = &FunctionCall> {
        self.parts.iter().filter_map(|part| match part {
            Part::FunctionCall(call) => Some(call),
            _ => None,
        })
    }

    /// Concatenate all text parts.
    #[must_use]
    pub fn text(&self) -> String {
        self.parts.iter().filter_map(Part::as_text).collect()
    }
}

/// One fragment of a [`Content`] block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawPart", into = "RawPart")]
pub enum Part {
    /// Plain answer text.
    Text(String),
    /// A tool invocation requested by the model.
    FunctionCall(FunctionCall),
    /// The result of a tool invocation.
    FunctionResponse(FunctionResponse),
    /// Anything else: thoughts, inline media, shapes this crate does not use.
    Other,
}

impl Part {
    /// Get the text if this is a text part.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Get the tool response if this is a function response part.
    #[must_use]
    pub const fn as_function_response(&self) -> Option<&FunctionResponse> {
        match self {
            Self::FunctionResponse(response) => Some(response),
            _ => None,
        }
    }

    /// Whether this part has no payload this crate understands.
    #[must_use]
    pub const fn is_other(&self) -> bool {
        matches!(self, Self::Other)
    }
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Call identifier, when the model assigns one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Name of the tool to call.
    pub name: String,
    /// JSON arguments.
    #[serde(default)]
    pub args: Value,
    /// Opaque signature that must be echoed back with the call.
    #[serde(skip)]
    pub thought_signature: Option<String>,
}

/// The result of a tool invocation, addressed to the call that requested it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FunctionResponse {
    /// Identifier of the originating call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Name of the tool that produced the result.
    pub name: String,
    /// The structured tool result.
    #[serde(default)]
    pub response: ToolResponse,
}

/// Structured result of a tool call, in MCP `CallToolResult` shape.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResponse {
    /// Heterogeneous result items, in order.
    #[serde(default)]
    pub content: Vec<ResponseItem>,
    /// Whether the tool reported a failure.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ToolResponse {
    /// A successful response holding one text item.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ResponseItem::Text { text: text.into() }],
            is_error: false,
        }
    }

    /// A failed response carrying an error message for the model.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ResponseItem::Text {
                text: message.into(),
            }],
            is_error: true,
        }
    }
}

/// One entry of a tool response, tagged by its `type` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawItem", into = "RawItem")]
pub enum ResponseItem {
    /// Text item.
    Text {
        /// The text.
        text: String,
    },
    /// Image item with base64 payload.
    Image {
        /// Standard base64 of the image bytes. May be empty.
        data: String,
        /// MIME type reported by the tool.
        mime_type: Option<String>,
    },
    /// Any other item type (audio, resources, links).
    Other {
        /// The item's `type` tag.
        kind: String,
    },
}

impl ResponseItem {
    /// Base64 payload of an image item, if it has one.
    #[must_use]
    pub fn image_data(&self) -> Option<&str> {
        match self {
            Self::Image { data, .. } if !data.is_empty() => Some(data),
            _ => None,
        }
    }
}

/// One unit of output from an agent run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Event {
    /// Name of the agent that emitted the event.
    pub author: String,
    /// Content, when the event carries any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
}

impl Event {
    /// Create an event carrying content.
    #[must_use]
    pub fn new(author: impl Into<String>, content: Content) -> Self {
        Self {
            author: author.into(),
            content: Some(content),
        }
    }

    /// Create an event without content.
    #[must_use]
    pub fn empty(author: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            content: None,
        }
    }

    /// The event's parts, empty when it carries no content.
    #[must_use]
    pub fn parts(&self) -> &[Part] {
        self.content
            .as_ref()
            .map_or(&[], |content| content.parts.as_slice())
    }
}

/// Wire form of a part: an object with at most one payload key set.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    thought: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thought_signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<FunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_response: Option<FunctionResponse>,
}

impl From<RawPart> for Part {
    fn from(raw: RawPart) -> Self {
        if let Some(mut call) = raw.function_call {
            call.thought_signature = raw.thought_signature;
            return Self::FunctionCall(call);
        }
        if let Some(response) = raw.function_response {
            return Self::FunctionResponse(response);
        }
        match raw.text {
            Some(text) if !raw.thought => Self::Text(text),
            _ => Self::Other,
        }
    }
}

impl From<Part> for RawPart {
    fn from(part: Part) -> Self {
        match part {
            Part::Text(text) => Self {
                text: Some(text),
                ..Self::default()
            },
            Part::FunctionCall(mut call) => Self {
                thought_signature: call.thought_signature.take(),
                function_call: Some(call),
                ..Self::default()
            },
            Part::FunctionResponse(response) => Self {
                function_response: Some(response),
                ..Self::default()
            },
            Part::Other => Self::default(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawItem {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mime_type: Option<String>,
}

impl From<RawItem> for ResponseItem {
    fn from(raw: RawItem) -> Self {
        match raw.kind.as_str() {
            "text" => Self::Text {
                text: raw.text.unwrap_or_default(),
            },
            "image" => Self::Image {
                data: raw.data.unwrap_or_default(),
                mime_type: raw.mime_type,
            },
            _ => Self::Other { kind: raw.kind },
        }
    }
}

impl From<ResponseItem> for RawItem {
    fn from(item: ResponseItem) -> Self {
        match item {
            ResponseItem::Text { text } => Self {
                kind: "text".to_owned(),
                text: Some(text),
                ..Self::default()
            },
            ResponseItem::Image { data, mime_type } => Self {
                kind: "image".to_owned(),
                data: Some(data),
                mime_type,
                ..Self::default()
            },
            ResponseItem::Other { kind } => Self {
                kind,
                ..Self::default()
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    mod parts {
        use super::*;

        #[test]
        fn text_part_deserializes() {
            let part: Part = serde_json::from_value(json!({ "text": "hello" })).unwrap();
            assert_eq!(part, Part::Text("hello".into()));
        }

        #[test]
        fn thought_text_is_other() {
            let part: Part =
                serde_json::from_value(json!({ "text": "thinking...", "thought": true })).unwrap();
            assert!(part.is_other());
        }

        #[test]
        fn function_call_keeps_signature() {
            let part: Part = serde_json::from_value(json!({
                "functionCall": { "name": "getTinyImage", "args": {} },
                "thoughtSignature": "c2ln"
            }))
            .unwrap();

            let Part::FunctionCall(call) = part else {
                panic!("expected function call");
            };
            assert_eq!(call.name, "getTinyImage");
            assert_eq!(call.thought_signature.as_deref(), Some("c2ln"));
        }

        #[test]
        fn function_call_serializes_signature_at_part_level() {
            let part = Part::FunctionCall(FunctionCall {
                id: None,
                name: "getTinyImage".into(),
                args: json!({}),
                thought_signature: Some("c2ln".into()),
            });

            let value = serde_json::to_value(&part).unwrap();
            assert_eq!(value["thoughtSignature"], "c2ln");
            assert_eq!(value["functionCall"]["name"], "getTinyImage");
            assert!(value["functionCall"].get("thought_signature").is_none());
        }

        #[test]
        fn function_response_deserializes_items() {
            let part: Part = serde_json::from_value(json!({
                "functionResponse": {
                    "name": "getTinyImage",
                    "response": {
                        "content": [
                            { "type": "text", "text": "This is a tiny image:" },
                            { "type": "image", "data": "iVBORw0KGgo=", "mimeType": "image/png" },
                            { "type": "resource", "resource": { "uri": "test://1" } }
                        ]
                    }
                }
            }))
            .unwrap();

            let response = part.as_function_response().unwrap();
            assert_eq!(response.response.content.len(), 3);
            assert_eq!(
                response.response.content[1],
                ResponseItem::Image {
                    data: "iVBORw0KGgo=".into(),
                    mime_type: Some("image/png".into()),
                }
            );
            assert_eq!(
                response.response.content[2],
                ResponseItem::Other {
                    kind: "resource".into()
                }
            );
        }

        #[test]
        fn unknown_part_is_other() {
            let part: Part =
                serde_json::from_value(json!({ "inlineData": { "mimeType": "image/png" } }))
                    .unwrap();
            assert!(part.is_other());
        }

        #[test]
        fn text_part_serializes_as_gemini_object() {
            let value = serde_json::to_value(Part::Text("hi".into())).unwrap();
            assert_eq!(value, json!({ "text": "hi" }));
        }
    }

    mod items {
        use super::*;

        #[test]
        fn image_without_data_has_no_payload() {
            let item: ResponseItem = serde_json::from_value(json!({ "type": "image" })).unwrap();
            assert_eq!(item.image_data(), None);
        }

        #[test]
        fn text_item_has_no_image_payload() {
            let item = ResponseItem::Text { text: "x".into() };
            assert_eq!(item.image_data(), None);
        }

        #[test]
        fn error_response_serializes_flag() {
            let value = serde_json::to_value(ToolResponse::error("boom")).unwrap();
            assert_eq!(
                value,
                json!({ "content": [{ "type": "text", "text": "boom" }], "isError": true })
            );
        }

        #[test]
        fn successful_response_omits_flag() {
            let value = serde_json::to_value(ToolResponse::text("ok")).unwrap();
            assert!(value.get("isError").is_none());
        }
    }

    mod content {
        use super::*;

        #[test]
        fn text_concatenates_text_parts() {
            let content = Content::model(vec![
                Part::Text("Here is ".into()),
                Part::Other,
                Part::Text("an answer.".into()),
            ]);
            assert_eq!(content.text(), "Here is an answer.");
        }

        #[test]
        fn function_calls_filters_parts() {
            let content = Content::model(vec![
                Part::Text("calling".into()),
                Part::FunctionCall(FunctionCall {
                    name: "getTinyImage".into(),
                    ..FunctionCall::default()
                }),
            ]);
            let names: Vec<&str> = content.function_calls().map(|c| c.name.as_str()).collect();
            assert_eq!(names, ["getTinyImage"]);
        }

        #[test]
        fn event_without_content_has_no_parts() {
            assert!(Event::empty("agent").parts().is_empty());
        }

        #[test]
        fn role_defaults_to_user_when_missing() {
            let content: Content = serde_json::from_value(json!({ "parts": [] })).unwrap();
            assert_eq!(content.role, Role::User);
            assert_eq!(Role::Model.as_str(), "model");
        }
    }
}
