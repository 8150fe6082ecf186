/// Default number of model requests before a run gives up.
pub const MAX_ITERATIONS: usize = 20;

/// Configuration for the agent loop.
#[derive(Debug, Clone)]
pub struct AgentLoopConfig {
    pub max_iterations: usize,
    /// Sent with every request, never stored in the history
    pub system_prompt: Option<String>,
}

impl Default for AgentLoopConfig {
    fn default() -> Self {
        Self {
            max_iterations: MAX_ITERATIONS,
            system_prompt: None,
        }
    }
}
