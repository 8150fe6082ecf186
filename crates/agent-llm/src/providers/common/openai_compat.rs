//! OpenAI-compatible request serialization and response parsing.
//!
//! Builds a chat-completions body without leaking internal
//! `agent_core::Message` fields (like `id` / `created_at`), and turns the
//! non-streaming response back into an [`LLMReply`].

use agent_core::{agent::Role, tools::ToolSchema, Message, TokenUsage, ToolCall};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::provider::{LLMError, Result};
use crate::types::LLMReply;

/// Convert internal [`Message`] values to an OpenAI-compatible JSON array.
///
/// A tool-role message holds every result of one turn; it is expanded into
/// one `tool` message per call because that is what the wire format expects.
pub fn messages_to_openai_compat_json(
    messages: &[Message],
    system_instruction: Option<&str>,
) -> Vec<Value> {
    let mut out = Vec::with_capacity(messages.len() + 1);

    if let Some(system) = system_instruction.filter(|s| !s.trim().is_empty()) {
        out.push(json!({"role": "system", "content": system}));
    }

    for message in messages {
        match message.role {
            Role::User => out.push(json!({"role": "user", "content": message.content})),
            Role::Assistant => {
                let mut msg = json!({"role": "assistant", "content": message.content});
                if let Some(tool_calls) = message.tool_calls.as_ref().filter(|c| !c.is_empty()) {
                    if message.content.is_empty() {
                        msg["content"] = Value::Null;
                    }
                    msg["tool_calls"] = json!(tool_calls);
                }
                out.push(msg);
            }
            Role::Tool => {
                for response in message.tool_responses.iter().flatten() {
                    out.push(json!({
                        "role": "tool",
                        "tool_call_id": response.tool_call_id,
                        "name": response.name,
                        "content": response.result.result,
                    }));
                }
            }
        }
    }

    out
}

/// Build a non-streaming OpenAI-compatible chat request body.
pub fn build_openai_compat_body(
    model: &str,
    messages: &[Message],
    tools: &[ToolSchema],
    system_instruction: Option<&str>,
) -> Value {
    let mut body = json!({
        "model": model,
        "messages": messages_to_openai_compat_json(messages, system_instruction),
        "stream": false,
    });

    if !tools.is_empty() {
        body["tools"] = json!(tools);
    }

    body
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<ChatToolCall>,
}

#[derive(Debug, Deserialize)]
struct ChatToolCall {
    #[serde(default)]
    id: String,
    function: ChatFunction,
}

#[derive(Debug, Deserialize)]
struct ChatFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

/// Parse a chat-completions response body into an [`LLMReply`].
///
/// Some compatible servers leave tool call ids empty; those get a positional
/// id so results can still be matched to their call.
pub fn parse_openai_compat_response(body: &str) -> Result<LLMReply> {
    let completion: ChatCompletion = serde_json::from_str(body)?;

    let choice = completion
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LLMError::Protocol("response contained no choices".to_string()))?;

    let tool_calls = choice
        .message
        .tool_calls
        .into_iter()
        .enumerate()
        .map(|(index, call)| ToolCall {
            id: if call.id.is_empty() {
                format!("call_{}", index)
            } else {
                call.id
            },
            tool_type: "function".to_string(),
            function: agent_core::FunctionCall {
                name: call.function.name,
                arguments: call.function.arguments,
            },
        })
        .collect();

    Ok(LLMReply {
        text: choice.message.content,
        tool_calls,
        usage: completion.usage.map(|usage| TokenUsage {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        }),
    })
}
