use thiserror::Error;

/// Failures that end an agent run.
///
/// Tool failures never show up here: they are reported back to the model as
/// tool results and the loop keeps going.
#[derive(Error, Debug)]
pub enum AgentError {
    /// The model service could not be reached or answered with something unusable.
    #[error("LLM error: {0}")]
    LLM(String),

    /// A loop invariant was broken, e.g. a tool turn that produced no results.
    #[error("Invariant violated: {0}")]
    Invariant(String),
}
