//! Structure inference for free-form theatrical scripts.
//!
//! The pass runs in a fixed order: title/author extraction, cast discovery,
//! then line-by-line segmentation into acts, scenes and dialogue. Content
//! never makes it fail; only an unknown container format or a broken
//! container does, and both before any segmentation starts.

pub mod characters;
pub mod classifier;
pub mod roman;
pub mod segmenter;
pub mod title;

pub use characters::identify_characters;
pub use classifier::{classify_line, LineKind};
pub use roman::to_roman;
pub use segmenter::{SegmentState, Segmenter};
pub use title::extract_title_and_author;

use crate::core::config::ParserConfig;
use crate::core::error::ScriptError;
use crate::core::model::{Script, ScriptMetadata, ScriptStatus};
use crate::services::extract::{extract_text, SourceFormat};
use log::info;
use std::path::Path;

/// Share of the whole pipeline that is done once parsing succeeds.
pub const PARSED_PROGRESS: u8 = 20;

#[derive(Debug, Clone, Default)]
pub struct ScriptParser {
    config: ParserConfig,
}

impl ScriptParser {
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Reads and parses a file. When neither the caller nor the text gives
    /// a title, the file's base name is used.
    pub fn parse_file(&self, path: &Path, metadata: ScriptMetadata) -> Result<Script, ScriptError> {
        let format = SourceFormat::from_path(path)?;
        let origin = path.display().to_string();
        let bytes = std::fs::read(path).map_err(|e| ScriptError::extraction(&origin, e))?;
        let text = extract_text(format, &bytes, &origin)?;
        Ok(self.parse_named(path, &text, metadata))
    }

    /// Same as `parse_file` for content that is already in memory, e.g. an
    /// upload. `filename` picks the format and the fallback title.
    pub fn parse_upload(
        &self,
        filename: &str,
        bytes: &[u8],
        metadata: ScriptMetadata,
    ) -> Result<Script, ScriptError> {
        let path = Path::new(filename);
        let format = SourceFormat::from_path(path)?;
        let text = extract_text(format, bytes, filename)?;
        Ok(self.parse_named(path, &text, metadata))
    }

    fn parse_named(&self, path: &Path, text: &str, metadata: ScriptMetadata) -> Script {
        let mut script = self.parse_text(text, metadata);
        if self.config.is_placeholder_title(&script.metadata.title) {
            if let Some(stem) = path.file_stem() {
                script.metadata.title = stem.to_string_lossy().to_string();
            }
        }
        script
    }

    /// Total over any input: the worst case is one empty synthesized act.
    pub fn parse_text(&self, text: &str, mut metadata: ScriptMetadata) -> Script {
        if self.config.is_placeholder_title(&metadata.title) {
            let (title, author) = extract_title_and_author(text, &self.config);
            if let Some(title) = title {
                metadata.title = title;
            }
            if metadata.author.is_none() {
                metadata.author = author;
            }
        }
        if metadata.author.is_none() {
            metadata.author = Some(self.config.default_author.clone());
        }

        let mut script = Script::new(metadata);
        script.characters = identify_characters(text, &self.config);
        script.acts = Segmenter::new(&self.config, &script.characters).segment(text);

        script.status = ScriptStatus::Parsed;
        script.set_progress(PARSED_PROGRESS);

        info!(
            "Parsed '{}': {} act(s), {} scene(s), {} character(s), {} dialogue entries",
            script.metadata.title,
            script.acts.len(),
            script.scene_count(),
            script.characters.len(),
            script.dialogue_count()
        );
        script
    }
}
