use crate::core::config::Config;
use crate::core::io::Storage;
use crate::core::model::{Script, ScriptMetadata, ScriptStatus, VoiceSettings};
use crate::core::state::WorkflowState;
use crate::services::extract::SourceFormat;
use crate::services::parser::ScriptParser;
use anyhow::{Context, Result};
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct RunSummary {
    pub parsed: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<(String, String)>,
}

/// Key a script is stored under: the file name with dots folded to
/// underscores (`amleto.txt` -> `amleto_txt`). Distinct names can share a
/// key (`a.b.txt`, `a_b.txt`); the first file parsed keeps it.
pub fn project_key(filename: &str) -> String {
    filename.replace('.', "_")
}

pub struct WorkflowManager {
    config: Config,
    parser: ScriptParser,
    state: WorkflowState,
    storage: Arc<dyn Storage>,
}

impl WorkflowManager {
    pub async fn new(config: Config, storage: Arc<dyn Storage>) -> Result<Self> {
        let state = Self::load_state(&config.build_folder, storage.as_ref()).await?;
        let parser = ScriptParser::new(config.parser.clone());
        Ok(Self {
            config,
            parser,
            state,
            storage,
        })
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    fn state_path(build_dir: &str) -> String {
        Path::new(build_dir).join("state.json").to_string_lossy().to_string()
    }

    fn script_path(&self, key: &str) -> String {
        Path::new(&self.config.build_folder)
            .join(key)
            .join("script.json")
            .to_string_lossy()
            .to_string()
    }

    async fn load_state(build_dir: &str, storage: &dyn Storage) -> Result<WorkflowState> {
        let path = Self::state_path(build_dir);
        if storage.exists(&path).await? {
            let content = storage.read_to_string(&path).await?;
            Ok(serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path))?)
        } else {
            Ok(WorkflowState::default())
        }
    }

    async fn save_state(&self) -> Result<()> {
        let path = Self::state_path(&self.config.build_folder);
        let content = serde_json::to_string_pretty(&self.state)?;
        self.storage.write(&path, content.as_bytes()).await?;
        Ok(())
    }

    pub async fn load_script(&self, key: &str) -> Result<Script> {
        let path = self.script_path(key);
        let content = self
            .storage
            .read_to_string(&path)
            .await
            .with_context(|| format!("Project not found or not parsed yet: {}", key))?;
        Ok(serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path))?)
    }

    pub async fn save_script(&self, key: &str, script: &Script) -> Result<()> {
        let content = serde_json::to_string_pretty(script)?;
        self.storage.write(&self.script_path(key), content.as_bytes()).await?;
        Ok(())
    }

    /// Advances a stored script along the pipeline and persists it.
    pub async fn mark_status(&self, key: &str, status: ScriptStatus) -> Result<Script> {
        let mut script = self.load_script(key).await?;
        script.transition(status)?;
        self.save_script(key, &script).await?;
        Ok(script)
    }

    /// Records a downstream failure; the document itself is left untouched.
    pub async fn record_failure(&self, key: &str, message: &str) -> Result<Script> {
        let mut script = self.load_script(key).await?;
        script.fail(message);
        self.save_script(key, &script).await?;
        Ok(script)
    }

    pub async fn override_voice(&self, key: &str, character_id: &str, voice: VoiceSettings) -> Result<Script> {
        let mut script = self.load_script(key).await?;
        script.override_voice(character_id, voice)?;
        self.save_script(key, &script).await?;
        Ok(script)
    }

    /// Removes a stored project and forgets its source file, so the next
    /// run parses it again.
    pub async fn delete_project(&mut self, key: &str) -> Result<()> {
        let dir = Path::new(&self.config.build_folder).join(key);
        self.storage.delete(&dir.to_string_lossy()).await?;
        self.state.forget(|filename| project_key(filename) == key);
        self.save_state().await?;
        info!("Deleted project {}", key);
        Ok(())
    }

    /// Project keys already owned by a parsed file.
    fn claimed_keys(&self) -> HashMap<String, String> {
        self.state
            .completed_files
            .iter()
            .map(|f| (project_key(f), f.clone()))
            .collect()
    }

    async fn pending_inputs(&self, summary: &mut RunSummary) -> Result<Vec<PathBuf>> {
        let mut entries: Vec<PathBuf> = self
            .storage
            .list(&self.config.input_folder)
            .await?
            .into_iter()
            .map(PathBuf::from)
            .filter(|p| SourceFormat::from_path(p).is_ok())
            .collect();
        entries.sort();

        let mut pending = Vec::new();
        for path in entries {
            let filename = file_name(&path);
            if self.state.is_completed(&filename) {
                println!("Skipping already parsed file: {}", filename);
                summary.skipped.push(filename);
            } else {
                pending.push(path);
            }
        }
        Ok(pending)
    }

    pub async fn run(&mut self) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        let pending = self.pending_inputs(&mut summary).await?;
        if pending.is_empty() {
            println!("Nothing to parse.");
            return Ok(summary);
        }

        println!("Parsing {} script(s)...", pending.len());
        let pb = ProgressBar::new(pending.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
                .progress_chars("#>-"),
        );

        let concurrency = self.config.concurrency.max(1);
        let mut results: Vec<(String, Result<Script>)> = futures_util::stream::iter(pending)
            .map(|path| {
                let parser = self.parser.clone();
                let storage = self.storage.clone();
                let pb = pb.clone();
                async move {
                    let filename = file_name(&path);
                    let result = parse_one(parser, storage.as_ref(), &path).await;
                    pb.inc(1);
                    (filename, result)
                }
            })
            .buffer_unordered(concurrency)
            .collect()
            .await;
        pb.finish_with_message("Parsing complete");
        results.sort_by(|a, b| a.0.cmp(&b.0));

        let mut claimed = self.claimed_keys();
        for (filename, result) in results {
            match result.and_then(|script| {
                let key = project_key(&filename);
                match claimed.get(&key) {
                    Some(owner) if owner != &filename => {
                        anyhow::bail!("project {} already belongs to {}", key, owner)
                    }
                    _ => Ok((key, script)),
                }
            }) {
                Ok((key, script)) => match self.save_script(&key, &script).await {
                    Ok(()) => {
                        info!("Saved {} as project {}", filename, key);
                        claimed.insert(key, filename.clone());
                        self.state.mark_completed(filename.clone());
                        summary.parsed.push(filename);
                    }
                    Err(e) => {
                        error!("Failed to save {}: {:#}", filename, e);
                        summary.failed.push((filename, format!("{:#}", e)));
                    }
                },
                Err(e) => {
                    error!("Failed to parse {}: {:#}", filename, e);
                    summary.failed.push((filename, format!("{:#}", e)));
                }
            }
        }

        if !summary.failed.is_empty() && !self.config.unattended {
            let ans = inquire::Confirm::new(&format!(
                "{} file(s) failed. Skip them in future runs?",
                summary.failed.len()
            ))
            .with_default(false)
            .prompt();

            match ans {
                Ok(true) => {
                    for (filename, _) in &summary.failed {
                        self.state.mark_completed(filename.clone());
                    }
                }
                Ok(false) => {}
                Err(e) => warn!("Error reading input, failed files stay pending: {}", e),
            }
        }

        self.save_state().await?;
        Ok(summary)
    }
}

async fn parse_one(parser: ScriptParser, storage: &dyn Storage, path: &Path) -> Result<Script> {
    let filename = file_name(path);
    let bytes = storage
        .read(&path.to_string_lossy())
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    // empty title lets the parser look for one in the text first
    let metadata = ScriptMetadata::new("", None);
    let script =
        tokio::task::spawn_blocking(move || parser.parse_upload(&filename, &bytes, metadata)).await??;
    Ok(script)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().to_string())
        .unwrap_or_default()
}
