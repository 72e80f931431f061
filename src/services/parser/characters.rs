use crate::core::config::ParserConfig;
use crate::core::model::{new_id, AvatarSettings, Character, Gender, VoiceSettings};
use log::debug;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static SPEAKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\p{Lu}[\p{Lu} ]+)[ \t]*:").expect("valid speaker regex"));

/// Structural keywords that look like speakers ("SCENA:", "NOTE:") but
/// never are.
const STOP_WORDS: [&str; 24] = [
    "ACT",
    "ATTO",
    "SCENE",
    "SCENA",
    "END",
    "FINE",
    "NOTE",
    "NOTA",
    "CURTAIN",
    "SIPARIO",
    "INTERMISSION",
    "INTERMEZZO",
    "PROLOGUE",
    "PROLOGO",
    "EPILOGUE",
    "EPILOGO",
    "SETTING",
    "LOCATION",
    "AMBIENTAZIONE",
    "LUOGO",
    "TITLE",
    "TITOLO",
    "AUTHOR",
    "AUTORE",
];

const FEMININE_ENDINGS: [&str; 3] = ["ESSA", "RICE", "A"];
const MASCULINE_ENDINGS: [&str; 3] = ["ORE", "O", "E"];

/// Discovers the cast: every uppercase speaker label followed by a colon
/// that appears at least `min_dialogue_count` times and is not a structural
/// keyword. Characters come out in order of first appearance.
pub fn identify_characters(text: &str, config: &ParserConfig) -> Vec<Character> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();
    for caps in SPEAKER.captures_iter(text) {
        let name = caps[1].trim();
        if seen.insert(name.to_string()) {
            candidates.push(name.to_string());
        }
    }

    let mut characters = Vec::new();
    for name in candidates {
        if is_stop_word(&name, config) {
            debug!("Skipping structural keyword: {}", name);
            continue;
        }

        let count = count_dialogues(text, &name);
        if count < config.min_dialogue_count {
            debug!("Skipping {} ({} line(s), below threshold)", name, count);
            continue;
        }

        let gender = guess_gender(&name);
        debug!("Character {} ({:?}, {} lines)", name, gender, count);
        characters.push(Character {
            id: new_id(),
            name,
            description: Some(String::new()),
            voice_settings: VoiceSettings {
                gender,
                ..Default::default()
            },
            avatar_settings: AvatarSettings::default(),
            dialogues_count: count,
        });
    }

    characters
}

fn is_stop_word(name: &str, config: &ParserConfig) -> bool {
    STOP_WORDS.contains(&name)
        || config
            .extra_stop_words
            .iter()
            .any(|w| w.trim().eq_ignore_ascii_case(name))
}

/// Number of `NAME:` occurrences anywhere in the text.
pub fn count_dialogues(text: &str, name: &str) -> usize {
    let pattern = format!(r"\b{}[ \t]*:", regex::escape(name));
    match Regex::new(&pattern) {
        Ok(re) => re.find_iter(text).count(),
        Err(_) => 0,
    }
}

/// Advisory only: reads the grammatical ending of the name.
pub fn guess_gender(name: &str) -> Gender {
    if FEMININE_ENDINGS.iter().any(|e| name.ends_with(e)) {
        Gender::Female
    } else if MASCULINE_ENDINGS.iter().any(|e| name.ends_with(e)) {
        Gender::Male
    } else {
        Gender::Unknown
    }
}
