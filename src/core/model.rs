use crate::core::error::ScriptError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Unknown,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AgeClass {
    Child,
    Young,
    #[default]
    Adult,
    Elderly,
}

/// Voice defaults handed to the speech stage. The gender is only a guess
/// taken from the name and may be overridden at any time.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct VoiceSettings {
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub age: AgeClass,
    #[serde(default = "default_accent")]
    pub accent: String,
}

fn default_accent() -> String {
    "neutral".to_string()
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            gender: Gender::default(),
            age: AgeClass::default(),
            accent: default_accent(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AvatarStyle {
    #[default]
    Realistic,
    Cartoon,
    Theatrical,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct AvatarSettings {
    #[serde(default)]
    pub style: AvatarStyle,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Character {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub voice_settings: VoiceSettings,
    #[serde(default)]
    pub avatar_settings: AvatarSettings,
    #[serde(default)]
    pub dialogues_count: usize,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DialogueType {
    Speech,
    Direction,
    SceneDescription,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Dialogue {
    /// `None` for narration and free-standing stage directions.
    pub character_id: Option<String>,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: DialogueType,
    #[serde(default)]
    pub audio_file: Option<String>,
}

impl Dialogue {
    pub fn new(character_id: Option<String>, text: impl Into<String>, kind: DialogueType) -> Self {
        Self {
            character_id,
            text: text.into(),
            kind,
            audio_file: None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Scene {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub setting: Option<String>,
    #[serde(default)]
    pub background_music: Option<String>,
    #[serde(default)]
    pub dialogues: Vec<Dialogue>,
    #[serde(default)]
    pub video_file: Option<String>,
}

impl Scene {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            description: None,
            setting: None,
            background_music: None,
            dialogues: Vec::new(),
            video_file: None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Act {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub scenes: Vec<Scene>,
}

impl Act {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            description: None,
            scenes: Vec::new(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ScriptMetadata {
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ScriptMetadata {
    pub fn new(title: impl Into<String>, author: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            title: title.into(),
            author,
            created_at: now,
            updated_at: now,
            notes: None,
        }
    }
}

/// Pipeline lifecycle. Declaration order is the forward order of the
/// pipeline; `Error` sits outside it.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScriptStatus {
    #[default]
    Parsing,
    Parsed,
    AudioGenerating,
    AudioDone,
    VideoGenerating,
    Completed,
    Error,
}

impl ScriptStatus {
    pub fn next(self) -> Option<ScriptStatus> {
        match self {
            ScriptStatus::Parsing => Some(ScriptStatus::Parsed),
            ScriptStatus::Parsed => Some(ScriptStatus::AudioGenerating),
            ScriptStatus::AudioGenerating => Some(ScriptStatus::AudioDone),
            ScriptStatus::AudioDone => Some(ScriptStatus::VideoGenerating),
            ScriptStatus::VideoGenerating => Some(ScriptStatus::Completed),
            ScriptStatus::Completed | ScriptStatus::Error => None,
        }
    }

    pub fn can_transition_to(self, to: ScriptStatus) -> bool {
        to == ScriptStatus::Error || self.next() == Some(to)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Script {
    pub id: String,
    pub metadata: ScriptMetadata,
    #[serde(default)]
    pub characters: Vec<Character>,
    #[serde(default)]
    pub acts: Vec<Act>,
    #[serde(default)]
    pub status: ScriptStatus,
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl Script {
    pub fn new(metadata: ScriptMetadata) -> Self {
        Self {
            id: new_id(),
            metadata,
            characters: Vec::new(),
            acts: Vec::new(),
            status: ScriptStatus::Parsing,
            progress: 0,
            error_message: None,
        }
    }

    pub fn character_by_id(&self, id: &str) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    pub fn character_by_name(&self, name: &str) -> Option<&Character> {
        self.characters.iter().find(|c| c.name == name)
    }

    pub fn scene_count(&self) -> usize {
        self.acts.iter().map(|a| a.scenes.len()).sum()
    }

    pub fn dialogue_count(&self) -> usize {
        self.dialogues().count()
    }

    pub fn dialogues(&self) -> impl Iterator<Item = &Dialogue> {
        self.acts
            .iter()
            .flat_map(|a| a.scenes.iter())
            .flat_map(|s| s.dialogues.iter())
    }

    pub fn transition(&mut self, to: ScriptStatus) -> Result<(), ScriptError> {
        if !self.status.can_transition_to(to) {
            return Err(ScriptError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        self.metadata.updated_at = Utc::now();
        Ok(())
    }

    /// Moves the script to `Error` and records the message. The rest of the
    /// document is left as it was.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = ScriptStatus::Error;
        self.error_message = Some(message.into());
        self.metadata.updated_at = Utc::now();
    }

    pub fn set_progress(&mut self, progress: u8) {
        self.progress = progress.min(100);
    }

    pub fn override_voice(&mut self, character_id: &str, voice: VoiceSettings) -> Result<(), ScriptError> {
        let character = self
            .characters
            .iter_mut()
            .find(|c| c.id == character_id)
            .ok_or_else(|| ScriptError::CharacterNotFound(character_id.to_string()))?;
        character.voice_settings = voice;
        self.metadata.updated_at = Utc::now();
        Ok(())
    }

    /// Dialogue character references that do not resolve to a character of
    /// this script.
    pub fn validate_references(&self) -> Vec<&str> {
        self.dialogues()
            .filter_map(|d| d.character_id.as_deref())
            .filter(|id| self.character_by_id(id).is_none())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_script() -> Script {
        let mut script = Script::new(ScriptMetadata::new("Prova", None));
        script.characters.push(Character {
            id: "c1".to_string(),
            name: "MARIA".to_string(),
            description: Some(String::new()),
            voice_settings: VoiceSettings::default(),
            avatar_settings: AvatarSettings::default(),
            dialogues_count: 2,
        });
        let mut act = Act::new("Act I");
        let mut scene = Scene::new("Scene I");
        scene
            .dialogues
            .push(Dialogue::new(Some("c1".to_string()), "Ciao.", DialogueType::Speech));
        act.scenes.push(scene);
        script.acts.push(act);
        script
    }

    #[test]
    fn test_status_transitions_are_monotonic() {
        let mut script = sample_script();
        assert!(script.transition(ScriptStatus::Parsed).is_ok());
        assert!(script.transition(ScriptStatus::AudioGenerating).is_ok());

        let err = script.transition(ScriptStatus::Parsed).unwrap_err();
        assert!(matches!(err, ScriptError::InvalidTransition { .. }));

        let err = script.transition(ScriptStatus::Completed).unwrap_err();
        assert!(matches!(err, ScriptError::InvalidTransition { .. }));

        assert!(script.transition(ScriptStatus::Error).is_ok());
        assert!(script.transition(ScriptStatus::Parsed).is_err());
    }

    #[test]
    fn test_fail_keeps_document() {
        let mut script = sample_script();
        script.fail("tts provider unreachable");
        assert_eq!(script.status, ScriptStatus::Error);
        assert_eq!(script.error_message.as_deref(), Some("tts provider unreachable"));
        assert_eq!(script.dialogue_count(), 1);
    }

    #[test]
    fn test_override_voice() {
        let mut script = sample_script();
        let voice = VoiceSettings {
            gender: Gender::Female,
            age: AgeClass::Elderly,
            accent: "tuscan".to_string(),
        };
        script.override_voice("c1", voice.clone()).unwrap();
        assert_eq!(script.characters[0].voice_settings, voice);

        let err = script.override_voice("missing", VoiceSettings::default()).unwrap_err();
        assert!(matches!(err, ScriptError::CharacterNotFound(_)));
    }

    #[test]
    fn test_progress_is_clamped() {
        let mut script = sample_script();
        script.set_progress(250);
        assert_eq!(script.progress, 100);
    }

    #[test]
    fn test_validate_references() {
        let mut script = sample_script();
        assert!(script.validate_references().is_empty());

        script.acts[0].scenes[0]
            .dialogues
            .push(Dialogue::new(Some("ghost".to_string()), "Boo", DialogueType::Speech));
        assert_eq!(script.validate_references(), vec!["ghost"]);
    }

    #[test]
    fn test_json_field_names() -> anyhow::Result<()> {
        let script = sample_script();
        let json = serde_json::to_value(&script)?;
        assert_eq!(json["status"], "parsing");
        assert_eq!(json["characters"][0]["voice_settings"]["gender"], "unknown");
        assert_eq!(json["characters"][0]["avatar_settings"]["style"], "realistic");
        assert_eq!(json["acts"][0]["scenes"][0]["dialogues"][0]["type"], "speech");

        let back: Script = serde_json::from_value(json)?;
        assert_eq!(back, script);
        Ok(())
    }
}
