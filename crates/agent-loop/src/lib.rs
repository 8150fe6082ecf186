pub mod config;
pub mod runner;

pub use config::{AgentLoopConfig, MAX_ITERATIONS};
pub use runner::{run_agent_loop, run_agent_loop_with_config, LoopOutcome};
