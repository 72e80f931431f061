use super::classifier::{classify_line, LineKind};
use super::roman::{to_roman, MAX_ROMAN};
use crate::core::config::ParserConfig;
use crate::core::model::{Act, Character, Dialogue, DialogueType, Scene};
use log::debug;
use std::collections::HashMap;

/// The segmentation cursor: the tree built so far plus where new content
/// goes. One value per parse, threaded through every line.
#[derive(Debug, Default)]
pub struct SegmentState {
    acts: Vec<Act>,
    current_act: Option<usize>,
    current_scene: Option<usize>,
    current_setting: Option<String>,
    act_counter: u32,
    scene_counter: u32,
}

impl SegmentState {
    pub fn new() -> Self {
        Self {
            act_counter: 1,
            scene_counter: 1,
            ..Default::default()
        }
    }

    pub fn has_act(&self) -> bool {
        self.current_act.is_some()
    }

    pub fn has_scene(&self) -> bool {
        self.current_scene.is_some()
    }

    pub fn current_setting(&self) -> Option<&str> {
        self.current_setting.as_deref()
    }

    pub fn acts(&self) -> &[Act] {
        &self.acts
    }

    fn start_act(&mut self, title: Option<String>, config: &ParserConfig) {
        let title = title.unwrap_or_else(|| format!("{} {}", config.act_label, ordinal(self.act_counter)));
        debug!("New act: {}", title);
        self.acts.push(Act::new(title));
        self.current_act = Some(self.acts.len() - 1);
        self.current_scene = None;
        self.act_counter = self.act_counter.saturating_add(1);
        self.scene_counter = 1;
    }

    fn ensure_act(&mut self, config: &ParserConfig) -> usize {
        match self.current_act {
            Some(idx) => idx,
            None => {
                self.start_act(None, config);
                self.acts.len() - 1
            }
        }
    }

    fn start_scene(&mut self, title: Option<String>, config: &ParserConfig) -> &mut Scene {
        let act_idx = self.ensure_act(config);
        let title = title.unwrap_or_else(|| format!("{} {}", config.scene_label, ordinal(self.scene_counter)));
        debug!("New scene: {}", title);
        self.scene_counter = self.scene_counter.saturating_add(1);

        let scenes = &mut self.acts[act_idx].scenes;
        scenes.push(Scene::new(title));
        self.current_scene = Some(scenes.len() - 1);
        let last = scenes.len() - 1;
        &mut scenes[last]
    }

    /// The scene content goes into, synthesized (with the last seen setting)
    /// when there is none yet.
    fn ensure_scene(&mut self, config: &ParserConfig) -> &mut Scene {
        let act_idx = self.ensure_act(config);
        match self.current_scene {
            Some(scene_idx) => &mut self.acts[act_idx].scenes[scene_idx],
            None => {
                let setting = self.current_setting.clone();
                let scene = self.start_scene(None, config);
                scene.setting = setting;
                scene
            }
        }
    }

    /// Closes the pass. An input without any content still yields one
    /// (empty) synthesized act so a parsed script always has an act.
    pub fn finish(mut self, config: &ParserConfig) -> Vec<Act> {
        if self.acts.is_empty() {
            self.start_act(None, config);
        }
        self.acts
    }
}

/// Roman up to `MAX_ROMAN`, plain decimal past it.
fn ordinal(n: u32) -> String {
    if n <= MAX_ROMAN {
        to_roman(n)
    } else {
        n.to_string()
    }
}

/// Drives the line classifier over a whole document.
pub struct Segmenter<'a> {
    config: &'a ParserConfig,
    character_ids: HashMap<&'a str, &'a str>,
}

impl<'a> Segmenter<'a> {
    pub fn new(config: &'a ParserConfig, characters: &'a [Character]) -> Self {
        let character_ids = characters
            .iter()
            .map(|c| (c.name.as_str(), c.id.as_str()))
            .collect();
        Self { config, character_ids }
    }

    pub fn segment(&self, text: &str) -> Vec<Act> {
        let mut state = SegmentState::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            self.apply(&mut state, classify_line(line));
        }
        state.finish(self.config)
    }

    pub fn apply(&self, state: &mut SegmentState, kind: LineKind) {
        let config = self.config;
        match kind {
            LineKind::ActHeader { title } => state.start_act(title, config),
            LineKind::SceneHeader { title } => {
                state.start_scene(title, config);
            }
            LineKind::Setting(setting) => {
                state.current_setting = Some(setting.clone());
                state.ensure_scene(config).setting = Some(setting);
            }
            LineKind::Dialogue {
                name,
                speech,
                directions,
            } => {
                let character_id = self.character_ids.get(name.as_str()).map(|id| id.to_string());
                let scene = state.ensure_scene(config);
                if let Some(text) = speech {
                    scene
                        .dialogues
                        .push(Dialogue::new(character_id.clone(), text, DialogueType::Speech));
                }
                for direction in directions {
                    scene
                        .dialogues
                        .push(Dialogue::new(character_id.clone(), direction, DialogueType::Direction));
                }
            }
            LineKind::Direction(text) => {
                state
                    .ensure_scene(config)
                    .dialogues
                    .push(Dialogue::new(None, text, DialogueType::Direction));
            }
            LineKind::SceneDescription(text) => {
                state
                    .ensure_scene(config)
                    .dialogues
                    .push(Dialogue::new(None, text, DialogueType::SceneDescription));
            }
            LineKind::Ignore => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{AvatarSettings, VoiceSettings};

    fn character(id: &str, name: &str) -> Character {
        Character {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            voice_settings: VoiceSettings::default(),
            avatar_settings: AvatarSettings::default(),
            dialogues_count: 2,
        }
    }

    fn kinds(scene: &Scene) -> Vec<DialogueType> {
        scene.dialogues.iter().map(|d| d.kind).collect()
    }

    #[test]
    fn test_explicit_structure() {
        let config = ParserConfig::default();
        let cast = vec![character("m", "MARIA")];
        let text = "ATTO I\nSCENA 1\nMARIA: Ciao.\nSCENA 2\nMARIA: Addio.\nATTO II\nSCENA 1\n(Buio.)";
        let acts = Segmenter::new(&config, &cast).segment(text);

        assert_eq!(acts.len(), 2);
        assert_eq!(acts[0].title, "ATTO I");
        assert_eq!(acts[0].scenes.len(), 2);
        assert_eq!(acts[0].scenes[1].title, "SCENA 2");
        assert_eq!(acts[1].title, "ATTO II");
        assert_eq!(acts[1].scenes[0].dialogues[0].text, "(Buio.)");
        assert_eq!(acts[0].scenes[0].dialogues[0].character_id.as_deref(), Some("m"));
    }

    #[test]
    fn test_synthesized_titles_use_counters() {
        let config = ParserConfig::default();
        let acts = Segmenter::new(&config, &[]).segment("ACT\nSCENE\nSCENE\nACT\nSCENE");

        assert_eq!(acts.len(), 2);
        assert_eq!(acts[0].title, "Act I");
        assert_eq!(acts[0].scenes[0].title, "Scene I");
        assert_eq!(acts[0].scenes[1].title, "Scene II");
        assert_eq!(acts[1].title, "Act II");
        assert_eq!(acts[1].scenes[0].title, "Scene I");
    }

    #[test]
    fn test_counters_past_roman_range_fall_back_to_decimal() {
        let config = ParserConfig::default();
        let acts = Segmenter::new(&config, &[]).segment(&"SCENE\n".repeat(4001));
        let scenes = &acts[0].scenes;
        assert_eq!(scenes.len(), 4001);
        assert_eq!(scenes[3998].title, "Scene MMMCMXCIX");
        assert_eq!(scenes[3999].title, "Scene 4000");
        assert_eq!(scenes[4000].title, "Scene 4001");
    }

    #[test]
    fn test_labels_come_from_config() {
        let config = ParserConfig {
            act_label: "Atto".to_string(),
            scene_label: "Scena".to_string(),
            ..Default::default()
        };
        let acts = Segmenter::new(&config, &[]).segment("Una piazza assolata, a mezzogiorno.");
        assert_eq!(acts[0].title, "Atto I");
        assert_eq!(acts[0].scenes[0].title, "Scena I");
    }

    #[test]
    fn test_scene_without_act_synthesizes_act() {
        let config = ParserConfig::default();
        let acts = Segmenter::new(&config, &[]).segment("SCENE 3\n(Silence.)");
        assert_eq!(acts.len(), 1);
        assert_eq!(acts[0].title, "Act I");
        assert_eq!(acts[0].scenes[0].title, "SCENE 3");
    }

    #[test]
    fn test_setting_creates_scene_and_carries_forward() {
        let config = ParserConfig::default();
        let text = "SETTING: A ruined castle\nThe wind howls through the halls.\nACT II\nA lantern flickers in the dark.";
        let acts = Segmenter::new(&config, &[]).segment(text);

        assert_eq!(acts.len(), 2);
        let first = &acts[0].scenes[0];
        assert_eq!(first.setting.as_deref(), Some("A ruined castle"));
        assert_eq!(kinds(first), vec![DialogueType::SceneDescription]);

        // the new act starts without a scene; the synthesized one inherits
        let second = &acts[1].scenes[0];
        assert_eq!(second.title, "Scene I");
        assert_eq!(second.setting.as_deref(), Some("A ruined castle"));
    }

    #[test]
    fn test_header_scene_does_not_inherit_setting() {
        let config = ParserConfig::default();
        let acts = Segmenter::new(&config, &[]).segment("LUOGO: Roma\nSCENA 2\n(Pausa.)");
        assert_eq!(acts[0].scenes.len(), 2);
        assert_eq!(acts[0].scenes[0].setting.as_deref(), Some("Roma"));
        assert_eq!(acts[0].scenes[1].setting, None);
    }

    #[test]
    fn test_unresolved_speaker_has_no_reference() {
        let config = ParserConfig::default();
        let acts = Segmenter::new(&config, &[]).segment("LUCA: Eccomi (si inchina).");
        let scene = &acts[0].scenes[0];
        assert_eq!(kinds(scene), vec![DialogueType::Speech, DialogueType::Direction]);
        assert!(scene.dialogues.iter().all(|d| d.character_id.is_none()));
    }

    #[test]
    fn test_direction_only_dialogue_emits_no_speech() {
        let config = ParserConfig::default();
        let cast = vec![character("r", "ROMEO")];
        let acts = Segmenter::new(&config, &cast).segment("ROMEO: (kneels) (sighs)");
        let scene = &acts[0].scenes[0];
        assert_eq!(kinds(scene), vec![DialogueType::Direction, DialogueType::Direction]);
        assert_eq!(scene.dialogues[1].text, "(sighs)");
        assert_eq!(scene.dialogues[1].character_id.as_deref(), Some("r"));
    }

    #[test]
    fn test_blank_and_noise_lines_leave_no_trace() {
        let config = ParserConfig::default();
        let acts = Segmenter::new(&config, &[]).segment("\n\n   \nFine.\nOK\n");
        assert_eq!(acts.len(), 1);
        assert_eq!(acts[0].title, "Act I");
        assert!(acts[0].scenes.is_empty());
    }

    #[test]
    fn test_manual_state_threading() {
        let config = ParserConfig::default();
        let segmenter = Segmenter::new(&config, &[]);
        let mut state = SegmentState::new();
        assert!(!state.has_act());

        segmenter.apply(&mut state, classify_line("ATTO I"));
        assert!(state.has_act());
        assert!(!state.has_scene());

        segmenter.apply(&mut state, classify_line("Luogo: Verona"));
        assert!(state.has_scene());
        assert_eq!(state.current_setting(), Some("Verona"));
        assert_eq!(state.acts()[0].scenes.len(), 1);
    }
}
