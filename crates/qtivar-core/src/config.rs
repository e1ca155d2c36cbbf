//! Engine configuration and loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Wire and literal conventions shared by the encoder, decoder and loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Separator between key and value of a directed pair.
    #[serde(default = "default_delimiter")]
    pub directed_pair_delimiter: char,
    /// Prefix of the positional slot keys of gap-style directed pairs.
    #[serde(default = "default_gap_prefix")]
    pub gap_prefix: String,
    /// Response identifier whose multiple value is sent as one joined string.
    #[serde(default = "default_candidate_information")]
    pub candidate_information_identifier: String,
    /// Element name of one encoded response.
    #[serde(default = "default_response_element")]
    pub response_element: String,
    /// Element name of a batch of encoded responses.
    #[serde(default = "default_responses_element")]
    pub responses_element: String,
}

fn default_delimiter() -> char {
    ':'
}
fn default_gap_prefix() -> String {
    "Gap".to_string()
}
fn default_candidate_information() -> String {
    "candidateInformation".to_string()
}
fn default_response_element() -> String {
    "response".to_string()
}
fn default_responses_element() -> String {
    "responses".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            directed_pair_delimiter: default_delimiter(),
            gap_prefix: default_gap_prefix(),
            candidate_information_identifier: default_candidate_information(),
            response_element: default_response_element(),
            responses_element: default_responses_element(),
        }
    }
}

/// Top-level layout of `qtivar.toml`.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    engine: Option<EngineConfig>,
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `qtivar.toml` in the current directory
/// 2. `~/.config/qtivar/config.toml`
///
/// Environment variable override: `QTIVAR_GAP_PREFIX`.
pub fn load_config() -> Result<EngineConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<EngineConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("qtivar.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => EngineConfig::default(),
    };

    if let Ok(prefix) = std::env::var("QTIVAR_GAP_PREFIX") {
        if !prefix.is_empty() {
            config.gap_prefix = prefix;
        }
    }

    tracing::debug!(?config, "engine configuration loaded");
    Ok(config)
}

/// Parse the contents of a config file.
pub fn parse_config_str(content: &str) -> Result<EngineConfig> {
    let file: ConfigFile = toml::from_str(content)?;
    let config = file.engine.unwrap_or_default();
    anyhow::ensure!(
        !config.directed_pair_delimiter.is_whitespace() && config.directed_pair_delimiter != ',',
        "directed_pair_delimiter must not be whitespace or ','"
    );
    anyhow::ensure!(!config.gap_prefix.is_empty(), "gap_prefix must not be empty");
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("qtivar"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.directed_pair_delimiter, ':');
        assert_eq!(config.gap_prefix, "Gap");
        assert_eq!(config.candidate_information_identifier, "candidateInformation");
    }

    #[test]
    fn parse_partial_config() {
        let config = parse_config_str(
            r#"
[engine]
directed_pair_delimiter = "|"
gap_prefix = "Slot"
"#,
        )
        .unwrap();
        assert_eq!(config.directed_pair_delimiter, '|');
        assert_eq!(config.gap_prefix, "Slot");
        assert_eq!(config.response_element, "response");
    }

    #[test]
    fn empty_file_uses_defaults() {
        assert_eq!(parse_config_str("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn rejects_comma_delimiter() {
        let result = parse_config_str("[engine]\ndirected_pair_delimiter = \",\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qtivar.toml");
        std::fs::write(&path, "[engine]\ncandidate_information_identifier = \"CANDIDATE\"\n")
            .unwrap();
        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.candidate_information_identifier, "CANDIDATE");

        assert!(load_config_from(Some(&dir.path().join("missing.toml"))).is_err());
    }
}
