//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/viztree/viztree.toml` (or an explicit `--config` file)
//! 3. Environment variables: `VIZTREE_*` prefix, `__` between section and key
//! 4. Command-line flags (applied by the CLI layer)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::{LayoutDirection, LayoutEngine, ReduceOptions};

/// Graphviz rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RenderSettings {
    /// Layout engine passed as `-K`
    pub engine: LayoutEngine,
    /// Rank direction of the graph
    pub direction: LayoutDirection,
    /// Format used when the output path has no extension
    pub default_format: String,
    /// Graphviz executable
    pub dot_binary: String,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            engine: LayoutEngine::Dot,
            direction: LayoutDirection::TopDown,
            default_format: "svg".into(),
            dot_binary: "dot".into(),
        }
    }
}

/// Unified configuration for viztree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Settings {
    /// Tree reduction options
    pub reduce: ReduceOptions,
    /// Renderer options
    pub render: RenderSettings,
}

/// Raw reduce section; `None` means "not specified, inherit".
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawReduceSettings {
    pub collapse_chains: Option<bool>,
    pub min_amount: Option<f64>,
    pub topk: Option<usize>,
    pub max_depth: Option<usize>,
    pub max_nodes: Option<usize>,
}

/// Raw render section; `None` means "not specified, inherit".
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawRenderSettings {
    pub engine: Option<LayoutEngine>,
    pub direction: Option<LayoutDirection>,
    pub default_format: Option<String>,
    pub dot_binary: Option<String>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub reduce: RawReduceSettings,
    pub render: RawRenderSettings,
}

/// Get the XDG config directory for viztree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "viztree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("viztree.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    parse_raw_settings(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn parse_raw_settings(content: &str) -> Result<RawSettings, toml::de::Error> {
    toml::from_str(content)
}

impl Settings {
    /// Overlay values that were specified; everything else is kept.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        let reduce = &overlay.reduce;
        let render = &overlay.render;
        Self {
            reduce: ReduceOptions {
                collapse_chains: reduce
                    .collapse_chains
                    .unwrap_or(self.reduce.collapse_chains),
                min_amount: reduce.min_amount.or(self.reduce.min_amount),
                topk: reduce.topk.or(self.reduce.topk),
                max_depth: reduce.max_depth.or(self.reduce.max_depth),
                max_nodes: reduce.max_nodes.or(self.reduce.max_nodes),
            },
            render: RenderSettings {
                engine: render.engine.unwrap_or(self.render.engine),
                direction: render.direction.unwrap_or(self.render.direction),
                default_format: render
                    .default_format
                    .clone()
                    .unwrap_or_else(|| self.render.default_format.clone()),
                dot_binary: render
                    .dot_binary
                    .clone()
                    .unwrap_or_else(|| self.render.dot_binary.clone()),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Explicit config file, used instead of the global one
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Config file: an explicit one must exist, the global one is optional
        match config_file {
            Some(path) => {
                if !path.exists() {
                    return Err(ApplicationError::Config {
                        message: format!("config file not found: {}", path.display()),
                    });
                }
                current = current.merge_with(&load_raw_settings(path)?);
            }
            None => {
                if let Some(global_path) = global_config_path() {
                    if global_path.exists() {
                        current = current.merge_with(&load_raw_settings(&global_path)?);
                    }
                }
            }
        }

        // 3. Environment variables
        Self::apply_env_overrides(current)
    }

    /// Apply VIZTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("VIZTREE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(config_err)?;

        let raw = RawSettings {
            reduce: RawReduceSettings {
                collapse_chains: env_value(&config, "reduce.collapse_chains")?,
                min_amount: env_value(&config, "reduce.min_amount")?,
                topk: env_value(&config, "reduce.topk")?,
                max_depth: env_value(&config, "reduce.max_depth")?,
                max_nodes: env_value(&config, "reduce.max_nodes")?,
            },
            render: RawRenderSettings {
                engine: env_parsed(&config, "render.engine")?,
                direction: env_parsed(&config, "render.direction")?,
                default_format: env_value(&config, "render.default_format")?,
                dot_binary: env_value(&config, "render.dot_binary")?,
            },
        };
        Ok(settings.merge_with(&raw))
    }

    /// Render the effective settings as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize settings: {}", e),
        })
    }
}

/// Read an optional key; missing is `None`, unconvertible is an error.
fn env_value<T: DeserializeOwned>(config: &Config, key: &str) -> Result<Option<T>, ApplicationError> {
    match config.get::<T>(key) {
        Ok(value) => Ok(Some(value)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(config_err(e)),
    }
}

/// Like [`env_value`] for types spelled the way the CLI spells them.
fn env_parsed<T: std::str::FromStr<Err = String>>(
    config: &Config,
    key: &str,
) -> Result<Option<T>, ApplicationError> {
    env_value::<String>(config, key)?
        .map(|raw| {
            raw.parse::<T>().map_err(|message| ApplicationError::Config {
                message: format!("{}: {}", key, message),
            })
        })
        .transpose()
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_defaults_then_collapse_on_and_no_limits() {
        let settings = Settings::default();
        assert!(settings.reduce.collapse_chains);
        assert_eq!(settings.reduce.max_nodes, None);
        assert_eq!(settings.render.engine, LayoutEngine::Dot);
        assert_eq!(settings.render.default_format, "svg");
    }

    #[test]
    fn given_partial_toml_when_merging_then_only_specified_fields_change() {
        let raw = parse_raw_settings(
            r#"
[reduce]
topk = 4
collapse_chains = false

[render]
engine = "neato"
direction = "LR"
"#,
        )
        .unwrap();

        let merged = Settings::default().merge_with(&raw);

        assert_eq!(merged.reduce.topk, Some(4));
        assert!(!merged.reduce.collapse_chains);
        assert_eq!(merged.reduce.min_amount, None);
        assert_eq!(merged.render.engine, LayoutEngine::Neato);
        assert_eq!(merged.render.direction, LayoutDirection::LeftRight);
        assert_eq!(merged.render.dot_binary, "dot");
    }

    #[test]
    fn given_unknown_engine_in_toml_when_parsing_then_error() {
        assert!(parse_raw_settings("[render]\nengine = \"bogus\"\n").is_err());
    }

    #[test]
    fn given_settings_when_rendering_toml_then_contains_sections() {
        let text = Settings::default().to_toml().unwrap();
        assert!(text.contains("[reduce]"));
        assert!(text.contains("collapse_chains = true"));
        assert!(text.contains("engine = \"dot\""));
    }
}
