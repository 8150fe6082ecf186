use std::time::Duration;

use serde::Deserialize;

/// Characters `read_file` returns before truncating.
pub const MAX_CHARS: usize = 10_000;

/// Wall-clock limit for `run_script`.
pub const SCRIPT_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEFAULT_INTERPRETER: &str = "python3";
pub const DEFAULT_SCRIPT_EXTENSION: &str = "py";

/// Limits and interpreter settings for the builtin tools.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    pub max_chars: usize,
    pub interpreter: String,
    /// Extension (without the dot) a file must carry to be run
    pub script_extension: String,
    #[serde(rename = "script_timeout_secs", with = "duration_secs")]
    pub script_timeout: Duration,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            max_chars: MAX_CHARS,
            interpreter: DEFAULT_INTERPRETER.to_string(),
            script_extension: DEFAULT_SCRIPT_EXTENSION.to_string(),
            script_timeout: SCRIPT_TIMEOUT,
        }
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
