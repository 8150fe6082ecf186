use std::path::{Path, PathBuf};

use agent_llm::providers::openai::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use agent_loop::MAX_ITERATIONS;
use agent_tools::SandboxConfig;
use anyhow::{bail, Context};
use serde::Deserialize;

use crate::prompts::DEFAULT_SYSTEM_PROMPT;

/// Contents of the optional `--config` TOML file.
///
/// ```toml
/// [llm]
/// model = "gemini-2.0-flash-001"
///
/// [agent]
/// working_dir = "./calculator"
/// max_iterations = 20
///
/// [sandbox]
/// max_chars = 10000
/// interpreter = "python3"
/// script_extension = "py"
/// script_timeout_secs = 30
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub llm: LlmSection,
    pub agent: AgentSection,
    pub sandbox: SandboxConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LlmSection {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AgentSection {
    pub working_dir: Option<PathBuf>,
    pub max_iterations: Option<usize>,
    pub system_prompt: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(raw)?)
    }
}

/// Values given on the command line or through the environment.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub working_dir: Option<PathBuf>,
    pub max_iterations: Option<usize>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub working_dir: PathBuf,
    pub max_iterations: usize,
    pub system_prompt: String,
    pub sandbox: SandboxConfig,
}

impl Settings {
    /// Command line and environment beat the file, the file beats defaults.
    pub fn resolve(overrides: Overrides, file: FileConfig) -> anyhow::Result<Self> {
        let FileConfig {
            llm,
            agent,
            sandbox,
        } = file;

        let api_key = overrides
            .api_key
            .or(llm.api_key)
            .filter(|key| !key.trim().is_empty())
            .context("no API key configured (use --api-key, LLM_API_KEY or [llm] api_key)")?;

        let max_iterations = overrides
            .max_iterations
            .or(agent.max_iterations)
            .unwrap_or(MAX_ITERATIONS);
        if max_iterations == 0 {
            bail!("max_iterations must be at least 1");
        }
        if sandbox.max_chars == 0 {
            bail!("sandbox max_chars must be at least 1");
        }
        if sandbox.script_timeout.is_zero() {
            bail!("sandbox script_timeout_secs must be at least 1");
        }

        Ok(Self {
            api_key,
            base_url: overrides
                .base_url
                .or(llm.base_url)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: overrides
                .model
                .or(llm.model)
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            working_dir: overrides
                .working_dir
                .or(agent.working_dir)
                .unwrap_or_else(|| PathBuf::from(".")),
            max_iterations,
            system_prompt: agent
                .system_prompt
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            sandbox,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn with_key() -> Overrides {
        Overrides {
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_apply_without_file() {
        let settings = Settings::resolve(with_key(), FileConfig::default()).unwrap();

        assert_eq!(settings.api_key, "sk-test");
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.model, DEFAULT_MODEL);
        assert_eq!(settings.working_dir, PathBuf::from("."));
        assert_eq!(settings.max_iterations, 20);
        assert_eq!(settings.system_prompt, DEFAULT_SYSTEM_PROMPT);
        assert_eq!(settings.sandbox, SandboxConfig::default());
    }

    #[test]
    fn parses_all_sections() {
        let file = FileConfig::parse(
            r#"
            [llm]
            api_key = "from-file"
            base_url = "http://localhost:9999/v1"
            model = "test-model"

            [agent]
            working_dir = "./calculator"
            max_iterations = 5
            system_prompt = "Be brief."

            [sandbox]
            max_chars = 500
            interpreter = "sh"
            script_extension = "sh"
            script_timeout_secs = 3
            "#,
        )
        .unwrap();

        let settings = Settings::resolve(Overrides::default(), file).unwrap();
        assert_eq!(settings.api_key, "from-file");
        assert_eq!(settings.base_url, "http://localhost:9999/v1");
        assert_eq!(settings.model, "test-model");
        assert_eq!(settings.working_dir, PathBuf::from("./calculator"));
        assert_eq!(settings.max_iterations, 5);
        assert_eq!(settings.system_prompt, "Be brief.");
        assert_eq!(settings.sandbox.max_chars, 500);
        assert_eq!(settings.sandbox.interpreter, "sh");
        assert_eq!(settings.sandbox.script_timeout, Duration::from_secs(3));
    }

    #[test]
    fn command_line_beats_file() {
        let file = FileConfig::parse(
            r#"
            [llm]
            api_key = "from-file"
            model = "file-model"

            [agent]
            max_iterations = 5
            "#,
        )
        .unwrap();
        let overrides = Overrides {
            api_key: Some("from-cli".to_string()),
            model: Some("cli-model".to_string()),
            max_iterations: Some(7),
            working_dir: Some(PathBuf::from("/tmp/work")),
            ..Default::default()
        };

        let settings = Settings::resolve(overrides, file).unwrap();
        assert_eq!(settings.api_key, "from-cli");
        assert_eq!(settings.model, "cli-model");
        assert_eq!(settings.max_iterations, 7);
        assert_eq!(settings.working_dir, PathBuf::from("/tmp/work"));
    }

    #[test]
    fn partial_sandbox_table_keeps_other_defaults() {
        let file = FileConfig::parse("[sandbox]\nmax_chars = 42\n").unwrap();
        let settings = Settings::resolve(with_key(), file).unwrap();

        assert_eq!(settings.sandbox.max_chars, 42);
        assert_eq!(settings.sandbox.interpreter, "python3");
        assert_eq!(settings.sandbox.script_timeout, Duration::from_secs(30));
    }

    #[test]
    fn missing_api_key_is_an_error() {
        let err = Settings::resolve(Overrides::default(), FileConfig::default()).unwrap_err();
        assert!(err.to_string().contains("API key"));

        let blank = Overrides {
            api_key: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(Settings::resolve(blank, FileConfig::default()).is_err());
    }

    #[test]
    fn zero_limits_are_rejected() {
        let overrides = Overrides {
            max_iterations: Some(0),
            ..with_key()
        };
        assert!(Settings::resolve(overrides, FileConfig::default()).is_err());

        let file = FileConfig::parse("[sandbox]\nscript_timeout_secs = 0\n").unwrap();
        assert!(Settings::resolve(with_key(), file).is_err());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(FileConfig::parse("[agent]\nmax_rounds = 3\n").is_err());
    }

    #[test]
    fn load_reads_from_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("agent.toml");
        std::fs::write(&path, "[llm]\nmodel = \"disk-model\"\n").unwrap();

        let file = FileConfig::load(&path).unwrap();
        assert_eq!(file.llm.model.as_deref(), Some("disk-model"));

        let err = FileConfig::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}
