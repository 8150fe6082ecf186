use std::sync::Arc;

use tokio::sync::mpsc;

use agent_core::tools::{execute_tool_call, parse_tool_args, ToolCall, ToolExecutor};
use agent_core::{AgentError, AgentEvent, Message, Session, ToolResponse};
use agent_llm::{LLMProvider, LLMReply};

use crate::config::AgentLoopConfig;

pub type Result<T> = std::result::Result<T, AgentError>;

/// How a run that did not fail came to an end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopOutcome {
    /// The model answered with text and no tool requests.
    Done { text: String, iterations: usize },
    /// Every allowed request was spent on tool calls or empty replies.
    Exhausted { iterations: usize },
}

/// Drives one conversation to completion.
///
/// Each iteration sends the history and tool manifest to the model, records
/// the reply, and either finishes on plain text or runs the requested tools
/// and records their results as a single tool turn. At most
/// `config.max_iterations` requests are made.
pub async fn run_agent_loop_with_config(
    session: &mut Session,
    initial_message: String,
    event_tx: mpsc::Sender<AgentEvent>,
    llm: Arc<dyn LLMProvider>,
    tools: Arc<dyn ToolExecutor>,
    config: AgentLoopConfig,
) -> Result<LoopOutcome> {
    let session_id = session.id.clone();
    let tool_schemas = tools.list_tools();

    log::debug!(
        "[{}] Starting agent loop with message: {}",
        session_id,
        initial_message
    );
    log::info!(
        "[{}] model={}, tools={}, max_iterations={}",
        session_id,
        llm.model(),
        tool_schemas.len(),
        config.max_iterations
    );

    session.add_message(Message::user(initial_message));

    for iteration in 1..=config.max_iterations {
        let _ = event_tx.send(AgentEvent::RequestStarted { iteration }).await;

        let timer = Timer::new("llm_request");
        let reply = match llm
            .send(
                session.messages(),
                &tool_schemas,
                config.system_prompt.as_deref(),
            )
            .await
        {
            Ok(reply) => reply,
            Err(error) => {
                let agent_error = AgentError::LLM(error.to_string());
                log::error!("[{}] {}", session_id, agent_error);
                let _ = event_tx
                    .send(AgentEvent::Error {
                        message: agent_error.to_string(),
                    })
                    .await;
                return Err(agent_error);
            }
        };
        timer.debug(&session_id);

        if let Some(usage) = reply.usage {
            let _ = event_tx.send(AgentEvent::Usage { usage }).await;
        }

        if !reply.has_tool_calls() {
            let final_text = reply.final_text().map(str::to_string);
            session.add_message(Message::assistant(reply.text.unwrap_or_default(), None));

            match final_text {
                Some(text) => {
                    log::info!(
                        "[{}] Finished after {} iteration(s)",
                        session_id,
                        iteration
                    );
                    let _ = event_tx
                        .send(AgentEvent::Complete { text: text.clone() })
                        .await;
                    return Ok(LoopOutcome::Done { text, iterations: iteration });
                }
                None => {
                    log::warn!(
                        "[{}] Iteration {} returned neither text nor tool calls",
                        session_id,
                        iteration
                    );
                    continue;
                }
            }
        }

        let LLMReply {
            text, tool_calls, ..
        } = reply;
        session.add_message(Message::assistant(
            text.unwrap_or_default(),
            Some(tool_calls.clone()),
        ));

        let responses =
            execute_tool_calls(&tool_calls, tools.as_ref(), &event_tx, &session_id).await;

        if responses.is_empty() || responses.len() != tool_calls.len() {
            let agent_error = AgentError::Invariant(format!(
                "{} tool call(s) produced {} result(s)",
                tool_calls.len(),
                responses.len()
            ));
            let _ = event_tx
                .send(AgentEvent::Error {
                    message: agent_error.to_string(),
                })
                .await;
            return Err(agent_error);
        }

        session.add_message(Message::tool_results(responses));
        log::debug!(
            "[{}] Iteration {} complete, {} messages in history",
            session_id,
            iteration,
            session.len()
        );
    }

    log::info!(
        "[{}] Iteration limit of {} reached",
        session_id,
        config.max_iterations
    );
    let _ = event_tx
        .send(AgentEvent::Exhausted {
            max_iterations: config.max_iterations,
        })
        .await;

    Ok(LoopOutcome::Exhausted {
        iterations: config.max_iterations,
    })
}

/// Runs the calls one after another; the result list lines up with `tool_calls`.
async fn execute_tool_calls(
    tool_calls: &[ToolCall],
    tools: &dyn ToolExecutor,
    event_tx: &mpsc::Sender<AgentEvent>,
    session_id: &str,
) -> Vec<ToolResponse> {
    let mut responses = Vec::with_capacity(tool_calls.len());

    for tool_call in tool_calls {
        let arguments = parse_tool_args(&tool_call.function.arguments)
            .unwrap_or_else(|_| serde_json::Value::String(tool_call.function.arguments.clone()));
        let _ = event_tx
            .send(AgentEvent::ToolStart {
                tool_call_id: tool_call.id.clone(),
                tool_name: tool_call.function.name.clone(),
                arguments,
            })
            .await;

        let timer = Timer::new(format!("tool_{}", tool_call.function.name));
        let result = execute_tool_call(tool_call, tools).await;
        timer.debug(session_id);

        let _ = event_tx
            .send(AgentEvent::ToolComplete {
                tool_call_id: tool_call.id.clone(),
                result: result.clone(),
            })
            .await;

        responses.push(ToolResponse {
            tool_call_id: tool_call.id.clone(),
            name: tool_call.function.name.clone(),
            result,
        });
    }

    responses
}

pub async fn run_agent_loop(
    session: &mut Session,
    initial_message: String,
    event_tx: mpsc::Sender<AgentEvent>,
    llm: Arc<dyn LLMProvider>,
    tools: Arc<dyn ToolExecutor>,
    max_iterations: usize,
) -> Result<LoopOutcome> {
    run_agent_loop_with_config(
        session,
        initial_message,
        event_tx,
        llm,
        tools,
        AgentLoopConfig {
            max_iterations,
            ..Default::default()
        },
    )
    .await
}

struct Timer {
    name: String,
    start: std::time::Instant,
}

impl Timer {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start: std::time::Instant::now(),
        }
    }

    fn debug(&self, session_id: &str) {
        log::debug!(
            "[{}] {} completed in {}ms",
            session_id,
            self.name,
            self.start.elapsed().as_millis()
        );
    }
}
