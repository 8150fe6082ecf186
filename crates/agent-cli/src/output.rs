use agent_core::AgentEvent;
use colored::Colorize;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Call,
    Result,
    Usage,
}

/// Progress line for one event, if the event is shown at this verbosity.
///
/// The final answer, exhaustion and errors are printed by `main` once the
/// loop returns, so they produce nothing here.
pub fn render_event(event: &AgentEvent, verbose: bool) -> Option<(Tone, String)> {
    match event {
        AgentEvent::Usage { usage } if verbose => Some((
            Tone::Usage,
            format!(
                "Prompt tokens: {}\nResponse tokens: {}",
                usage.prompt_tokens, usage.completion_tokens
            ),
        )),
        AgentEvent::ToolStart {
            tool_name,
            arguments,
            ..
        } => {
            let line = if verbose {
                format!("Calling function: {}({})", tool_name, arguments)
            } else {
                format!(" - Calling function: {}", tool_name)
            };
            Some((Tone::Call, line))
        }
        AgentEvent::ToolComplete { result, .. } if verbose => {
            Some((Tone::Result, format!("-> {}", result.result)))
        }
        _ => None,
    }
}

/// Prints progress until the sender side is dropped.
pub async fn print_events(mut event_rx: mpsc::Receiver<AgentEvent>, verbose: bool) {
    while let Some(event) = event_rx.recv().await {
        if let AgentEvent::RequestStarted { iteration } = &event {
            log::debug!("request {} started", iteration);
        }

        match render_event(&event, verbose) {
            Some((Tone::Call, line)) => println!("{}", line.yellow()),
            Some((Tone::Result, line)) => println!("{}", line),
            Some((Tone::Usage, line)) => println!("{}", line.dimmed()),
            None => {}
        }
    }
}
