use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.yml";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_input")]
    pub input_folder: String,

    #[serde(default = "default_build")]
    pub build_folder: String,

    #[serde(default)]
    pub unattended: bool,

    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    #[serde(default)]
    pub parser: ParserConfig,

    #[serde(skip)]
    pub(crate) path: Option<PathBuf>,
}

/// Tunables for the structure parser. Every field has a default, so an
/// empty `parser:` section (or none at all) is valid.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ParserConfig {
    #[serde(default = "default_title_scan_lines")]
    pub title_scan_lines: usize,

    /// A captured title must be strictly longer than this.
    #[serde(default = "default_min_title_len")]
    pub min_title_len: usize,

    #[serde(default = "default_min_dialogue_count")]
    pub min_dialogue_count: usize,

    #[serde(default = "default_act_label")]
    pub act_label: String,

    #[serde(default = "default_scene_label")]
    pub scene_label: String,

    #[serde(default = "default_placeholder_titles")]
    pub placeholder_titles: Vec<String>,

    #[serde(default = "default_author")]
    pub default_author: String,

    #[serde(default)]
    pub extra_stop_words: Vec<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            title_scan_lines: default_title_scan_lines(),
            min_title_len: default_min_title_len(),
            min_dialogue_count: default_min_dialogue_count(),
            act_label: default_act_label(),
            scene_label: default_scene_label(),
            placeholder_titles: default_placeholder_titles(),
            default_author: default_author(),
            extra_stop_words: vec![],
        }
    }
}

impl ParserConfig {
    pub fn is_placeholder_title(&self, title: &str) -> bool {
        let title = title.trim();
        title.is_empty() || self.placeholder_titles.iter().any(|p| p == title)
    }
}

fn default_input() -> String {
    "input".to_string()
}
fn default_build() -> String {
    "build".to_string()
}
fn default_concurrency() -> usize {
    4
}
fn default_title_scan_lines() -> usize {
    20
}
fn default_min_title_len() -> usize {
    3
}
fn default_min_dialogue_count() -> usize {
    2
}
fn default_act_label() -> String {
    "Act".to_string()
}
fn default_scene_label() -> String {
    "Scene".to_string()
}
fn default_placeholder_titles() -> Vec<String> {
    vec!["Untitled Script".to_string(), "Copione senza titolo".to_string()]
}
fn default_author() -> String {
    "Unknown".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_folder: default_input(),
            build_folder: default_build(),
            unattended: false,
            concurrency: default_concurrency(),
            parser: ParserConfig::default(),
            path: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(CONFIG_FILE)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("{} not found. Please create one.", path.display());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut config: Config = if content.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml_ng::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        };
        config.path = Some(path.to_path_buf());
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = self
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
        let content = serde_yaml_ng::to_string(self)?;
        fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn ensure_directories(&self) -> Result<()> {
        fs::create_dir_all(&self.input_folder)?;
        fs::create_dir_all(&self.build_folder)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_yaml_uses_defaults() -> Result<()> {
        let config: Config = serde_yaml_ng::from_str("unattended: true\n")?;
        assert!(config.unattended);
        assert_eq!(config.input_folder, "input");
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.parser.title_scan_lines, 20);
        assert_eq!(config.parser.min_dialogue_count, 2);
        assert_eq!(config.parser.default_author, "Unknown");
        Ok(())
    }

    #[test]
    fn test_parser_section_overrides() -> Result<()> {
        let yaml = "parser:\n  act_label: Atto\n  scene_label: Scena\n  extra_stop_words: [CORO]\n";
        let config: Config = serde_yaml_ng::from_str(yaml)?;
        assert_eq!(config.parser.act_label, "Atto");
        assert_eq!(config.parser.scene_label, "Scena");
        assert_eq!(config.parser.extra_stop_words, vec!["CORO".to_string()]);
        assert_eq!(config.parser.min_title_len, 3);
        Ok(())
    }

    #[test]
    fn test_placeholder_titles() {
        let parser = ParserConfig::default();
        assert!(parser.is_placeholder_title(""));
        assert!(parser.is_placeholder_title("  "));
        assert!(parser.is_placeholder_title("Copione senza titolo"));
        assert!(!parser.is_placeholder_title("Amleto"));
    }

    #[test]
    fn test_load_and_save_roundtrip() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.yml");
        fs::write(&path, "input_folder: scripts\nconcurrency: 2\n")?;

        let mut config = Config::load_from(&path)?;
        assert_eq!(config.input_folder, "scripts");
        config.concurrency = 8;
        config.save()?;

        let reloaded = Config::load_from(&path)?;
        assert_eq!(reloaded.concurrency, 8);
        assert_eq!(reloaded.input_folder, "scripts");
        Ok(())
    }

    #[test]
    fn test_empty_file_is_default() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.yml");
        fs::write(&path, "")?;
        let config = Config::load_from(&path)?;
        assert_eq!(config.build_folder, "build");
        Ok(())
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_from(dir.path().join("nope.yml")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
