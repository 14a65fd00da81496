//! Runner: the agent execution loop.
//!
//! The [`Runner`] drives an [`Agent`] through its reasoning loop:
//!
//! 1. Send the instruction, history and tool definitions to the provider
//! 2. Record the model's content as an [`Event`]
//! 3. Dispatch any function calls to the owning toolset
//! 4. Record the tool results as an [`Event`] and loop back to step 1
//!
//! The loop ends when the model answers without calling a tool, an error
//! occurs, or the step limit is exceeded. The run is in-memory: nothing is
//! persisted between runs, and the full event list is returned at once.

use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::chat::ChatRequest;
use crate::error::{Error, Result};
use crate::event::{Content, Event, FunctionCall, FunctionResponse, ToolResponse};
use crate::tool::ToolDefinition;

use super::config::Agent;

/// Stateless execution engine for an [`Agent`].
#[derive(Debug, Clone, Copy)]
pub struct Runner;

impl Runner {
    /// Run the agent on a single query and collect every event it emits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Agent`] if no provider is configured,
    /// [`Error::MaxSteps`] if the step limit is exceeded, or propagates
    /// provider errors. Tool failures do not abort the run; they are returned
    /// to the model as error responses.
    pub async fn run(agent: &Agent, query: impl Into<String>) -> Result<Vec<Event>> {
        let span = info_span!(
            "agent",
            agent.name = %agent.name,
            agent.model = %agent.model,
            agent.max_steps = agent.max_steps,
            agent.tools = tracing::field::Empty,
            agent.result_steps = tracing::field::Empty,
            error = tracing::field::Empty,
        );
        Self::run_inner(agent, query.into()).instrument(span).await
    }

    async fn run_inner(agent: &Agent, query: String) -> Result<Vec<Event>> {
        let provider = agent.provider.as_deref().ok_or_else(|| {
            Error::agent(format!(
                "Agent '{}' has no provider configured. Call .provider() before running.",
                agent.name
            ))
        })?;

        let definitions = agent.tool_definitions();
        let tool_names: Vec<&str> = definitions.iter().map(ToolDefinition::name).collect();
        tracing::Span::current().record("agent.tools", tracing::field::debug(&tool_names));

        info!(agent = %agent.name, query = %query, "Agent run started");

        let mut history = vec![Content::user(query)];
        let mut events = Vec::new();

        for step in 1..=agent.max_steps {
            debug!(agent = %agent.name, step, "Starting step");

            let request = ChatRequest::new(&agent.model)
                .system(&agent.instruction)
                .contents(history.clone())
                .tools(definitions.clone());

            let response = provider.chat(&request).await.inspect_err(|e| {
                error!(error = %e, agent = %agent.name, step, "LLM call failed");
                tracing::Span::current().record("error", tracing::field::display(e));
            })?;

            if let Some(usage) = response.usage {
                debug!(
                    input_tokens = usage.input_tokens,
                    output_tokens = usage.output_tokens,
                    "Model usage",
                );
            }

            let content = response.content;
            let text = content.text();
            if !text.is_empty() {
                info!(agent = %agent.name, step, "{}", text.trim());
            }

            let calls: Vec<FunctionCall> = content.function_calls().cloned().collect();
            history.push(content.clone());
            events.push(Event::new(&agent.name, content));

            if calls.is_empty() {
                tracing::Span::current().record("agent.result_steps", step);
                info!(agent = %agent.name, steps = step, events = events.len(), "Agent run completed");
                return Ok(events);
            }

            let mut responses = Vec::with_capacity(calls.len());
            for call in &calls {
                responses.push(Self::execute_tool(agent, call).await);
            }

            let content = Content::function_responses(responses);
            history.push(content.clone());
            events.push(Event::new(&agent.name, content));
        }

        let err = Error::max_steps(agent.max_steps);
        error!(error = %err, agent = %agent.name, max_steps = agent.max_steps, "Max steps exceeded");
        tracing::Span::current().record("error", tracing::field::display(&err));
        Err(err)
    }

    /// Dispatch one function call and wrap the outcome as a response part.
    async fn execute_tool(agent: &Agent, call: &FunctionCall) -> FunctionResponse {
        let tool_span = info_span!(
            "tool",
            tool.name = %call.name,
            tool.id = ?call.id,
            tool.input = %call.args,
            tool.success = tracing::field::Empty,
            error = tracing::field::Empty,
        );

        async {
            info!(tool = %call.name, "Calling tool");

            let response = match agent.find_toolset(&call.name) {
                Some(toolset) => match toolset.call(&call.name, call.args.clone()).await {
                    Ok(response) => response,
                    Err(e) => {
                        warn!(tool = %call.name, error = %e, "Tool execution failed");
                        ToolResponse::error(format!("Tool error: {e}"))
                    }
                },
                None => {
                    warn!(tool = %call.name, "Tool not found");
                    ToolResponse::error(format!("Tool '{}' not found", call.name))
                }
            };

            let current = tracing::Span::current();
            current.record("tool.success", !response.is_error);
            if response.is_error {
                current.record("error", true);
            }

            FunctionResponse {
                id: call.id.clone(),
                name: call.name.clone(),
                response,
            }
        }
        .instrument(tool_span)
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::{Value, json};

    use super::*;
    use crate::chat::{ChatProvider, ChatResponse};
    use crate::event::{Part, ResponseItem};
    use crate::tool::Toolset;

    /// Replays scripted responses and records every request.
    struct ScriptedProvider {
        responses: Mutex<VecDeque<Content>>,
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedProvider {
        fn new(responses: Vec<Content>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatProvider for ScriptedProvider {
        async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
            self.requests.lock().unwrap().push(request.clone());
            let content = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Content::model(vec![Part::Text("done".into())]));
            Ok(ChatResponse::new(content))
        }

        fn provider_name(&self) -> &'static str {
            "scripted"
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl ChatProvider for FailingProvider {
        async fn chat(&self, _request: &ChatRequest) -> Result<ChatResponse> {
            Err(crate::llms::LlmError::Transport("connection reset".into()).into())
        }

        fn provider_name(&self) -> &'static str {
            "failing"
        }
    }

    struct ImageToolset;

    #[async_trait]
    impl Toolset for ImageToolset {
        fn definitions(&self) -> Vec<ToolDefinition> {
            vec![ToolDefinition::new("getTinyImage", "Returns a tiny image", json!({}))]
        }

        async fn call(&self, name: &str, _args: Value) -> Result<ToolResponse> {
            assert_eq!(name, "getTinyImage");
            Ok(ToolResponse {
                content: vec![ResponseItem::Image {
                    data: "QUJD".into(),
                    mime_type: Some("image/png".into()),
                }],
                is_error: false,
            })
        }
    }

    fn call(name: &str) -> Content {
        Content::model(vec![Part::FunctionCall(FunctionCall {
            id: Some("call-1".into()),
            name: name.into(),
            args: json!({}),
            thought_signature: None,
        })])
    }

    fn answer(text: &str) -> Content {
        Content::model(vec![Part::Text(text.into())])
    }

    #[tokio::test]
    async fn missing_provider_is_an_agent_error() {
        let agent = Agent::new("image_agent");
        let err = Runner::run(&agent, "hi").await.unwrap_err();
        assert!(matches!(err, Error::Agent(_)));
    }

    #[tokio::test]
    async fn answer_without_tools_is_one_event() {
        let provider = Arc::new(ScriptedProvider::new(vec![answer("hello")]));
        let agent = Agent::new("image_agent").provider(provider.clone());

        let events = Runner::run(&agent, "hi").await.unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].author, "image_agent");
        assert_eq!(events[0].parts(), [Part::Text("hello".into())]);
    }

    #[tokio::test]
    async fn tool_call_round_trip() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            call("getTinyImage"),
            answer("Here is a small, sample image."),
        ]));
        let agent = Agent::new("image_agent")
            .model("gemini-2.5-flash-lite")
            .instruction("Use the tool.")
            .provider(provider.clone())
            .toolset(Arc::new(ImageToolset));

        let events = Runner::run(&agent, "Provide a sample tiny image").await.unwrap();

        assert_eq!(events.len(), 3);
        let response = events[1].parts()[0].as_function_response().unwrap();
        assert_eq!(response.id.as_deref(), Some("call-1"));
        assert_eq!(response.response.content[0].image_data(), Some("QUJD"));

        let requests = provider.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].model, "gemini-2.5-flash-lite");
        assert_eq!(requests[0].system_instruction.as_deref(), Some("Use the tool."));
        assert_eq!(requests[0].tools.len(), 1);
        assert_eq!(requests[0].contents.len(), 1);
        assert_eq!(requests[1].contents.len(), 3);
    }

    #[tokio::test]
    async fn unknown_tool_is_reported_to_the_model() {
        let provider = Arc::new(ScriptedProvider::new(vec![call("missing"), answer("sorry")]));
        let agent = Agent::new("image_agent").provider(provider.clone());

        let events = Runner::run(&agent, "hi").await.unwrap();

        let response = events[1].parts()[0].as_function_response().unwrap();
        assert!(response.response.is_error);
        assert_eq!(
            response.response.content[0],
            ResponseItem::Text {
                text: "Tool 'missing' not found".into()
            }
        );
    }

    #[tokio::test]
    async fn step_limit_is_enforced() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            call("getTinyImage"),
            call("getTinyImage"),
            call("getTinyImage"),
        ]));
        let agent = Agent::new("image_agent")
            .provider(provider)
            .toolset(Arc::new(ImageToolset))
            .max_steps(2);

        let err = Runner::run(&agent, "loop").await.unwrap_err();

        assert!(matches!(err, Error::MaxSteps { max_steps: 2 }));
    }

    #[tokio::test]
    async fn provider_errors_propagate() {
        let agent = Agent::new("image_agent").provider(Arc::new(FailingProvider));
        let err = Runner::run(&agent, "hi").await.unwrap_err();
        assert!(matches!(err, Error::Llm(_)));
    }
}
