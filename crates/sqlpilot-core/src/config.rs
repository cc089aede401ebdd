use crate::errors::PipelineError;
use crate::model::Dialect;
use crate::pipeline::PipelineSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const SUPPORTED_CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub version: u32,
    /// "openai" or "fake".
    pub provider: String,
    pub model: String,
    pub database: PathBuf,
    #[serde(default)]
    pub dialect: Dialect,
    #[serde(default)]
    pub settings: Settings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub timeout_seconds: u64,
    pub top_k: u32,
    pub max_steps: u32,
    pub temperature: f32,
    pub max_tokens: u32,
    pub busy_timeout_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            top_k: 5,
            max_steps: 8,
            temperature: 0.0,
            max_tokens: 512,
            busy_timeout_ms: 5_000,
        }
    }
}

impl AppConfig {
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            dialect: self.dialect,
            top_k: self.settings.top_k,
            timeout_seconds: self.settings.timeout_seconds,
        }
    }

    pub fn agent_settings(&self) -> crate::agent::AgentSettings {
        crate::agent::AgentSettings {
            max_steps: self.settings.max_steps,
            timeout_seconds: self.settings.timeout_seconds,
        }
    }
}

pub fn load_config(path: &Path) -> Result<AppConfig, PipelineError> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        PipelineError::Config(format!("failed to read config {}: {}", path.display(), e))
    })?;
    let cfg: AppConfig = serde_yaml::from_str(&raw)
        .map_err(|e| PipelineError::Config(format!("failed to parse YAML: {}", e)))?;
    if cfg.version != SUPPORTED_CONFIG_VERSION {
        return Err(PipelineError::Config(format!(
            "unsupported config version {} (supported: {})",
            cfg.version, SUPPORTED_CONFIG_VERSION
        )));
    }
    Ok(cfg)
}

pub fn write_sample_config(path: &Path) -> Result<(), PipelineError> {
    std::fs::write(
        path,
        r#"version: 1
provider: openai
model: gpt-4o-mini
database: sqlpilot.db
dialect: sqlite
settings:
  timeout_seconds: 30
  top_k: 5
  max_steps: 8
  temperature: 0.0
  max_tokens: 512
  busy_timeout_ms: 5000
"#,
    )
    .map_err(|e| PipelineError::Config(format!("failed to write sample config: {}", e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_config_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sqlpilot.yaml");
        write_sample_config(&path).unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.provider, "openai");
        assert_eq!(cfg.dialect, Dialect::Sqlite);
        assert_eq!(cfg.settings.max_steps, 8);
    }

    #[test]
    fn version_gate_rejects_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(
            &path,
            "version: 9\nprovider: fake\nmodel: m\ndatabase: d.db\n",
        )
        .unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }
}
