use crate::utils::text::is_all_uppercase;
use log::trace;
use regex::Regex;
use std::sync::LazyLock;

static ACT_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:act|atto)\s+(?:[ivxlc]+|\d+|unique|unico)\b").expect("valid act header regex")
});

static SCENE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:scene|scena)\s+(?:[ivxlc]+|\d+|unique|unica|unico)\b")
        .expect("valid scene header regex")
});

static SETTING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:setting|location|ambientazione|luogo)\s*:\s*(.+)$").expect("valid setting regex")
});

static DIALOGUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\p{Lu}[\p{Lu} ]+)[ \t]*:[ \t]*(.+)$").expect("valid dialogue regex")
});

static PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]+\)").expect("valid parenthetical regex"));

static STAGE_VERBS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:enters|exits|appears|disappears|sits|stands|entra|entrano|esce|escono|appare|appaiono|scompare|si siede|si alza)\b",
    )
    .expect("valid stage verb regex")
});

const BARE_ACT: [&str; 2] = ["ACT", "ATTO"];
const BARE_SCENE: [&str; 2] = ["SCENE", "SCENA"];

const MIN_DESCRIPTION_CHARS: usize = 10;

/// What a single trimmed, non-empty line stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// `title` is the verbatim line when it carried a number, `None` for a
    /// bare keyword (the segmenter then synthesizes one).
    ActHeader { title: Option<String> },
    SceneHeader { title: Option<String> },
    Setting(String),
    /// `speech` is `None` when nothing is left once the parenthesized
    /// directions are taken out.
    Dialogue {
        name: String,
        speech: Option<String>,
        directions: Vec<String>,
    },
    Direction(String),
    SceneDescription(String),
    Ignore,
}

type Rule = fn(&str) -> Option<LineKind>;

/// Evaluated top to bottom; the first rule that matches decides the line.
const RULES: [(&str, Rule); 6] = [
    ("act_header", match_act_header),
    ("scene_header", match_scene_header),
    ("setting", match_setting),
    ("dialogue", match_dialogue),
    ("direction", match_direction),
    ("scene_description", match_scene_description),
];

pub fn classify_line(line: &str) -> LineKind {
    let line = line.trim();
    if line.is_empty() {
        return LineKind::Ignore;
    }
    for (name, rule) in RULES.iter() {
        if let Some(kind) = rule(line) {
            trace!("{:<17} <- {}", name, line);
            return kind;
        }
    }
    trace!("{:<17} <- {}", "ignore", line);
    LineKind::Ignore
}

pub(crate) fn is_structural_header(line: &str) -> bool {
    match_act_header(line).is_some() || match_scene_header(line).is_some()
}

fn is_bare_keyword(line: &str, keywords: &[&str]) -> bool {
    let upper = line.to_uppercase();
    keywords.iter().any(|k| *k == upper)
}

pub fn match_act_header(line: &str) -> Option<LineKind> {
    if ACT_HEADER.is_match(line) {
        Some(LineKind::ActHeader {
            title: Some(line.to_string()),
        })
    } else if is_bare_keyword(line, &BARE_ACT) {
        Some(LineKind::ActHeader { title: None })
    } else {
        None
    }
}

pub fn match_scene_header(line: &str) -> Option<LineKind> {
    if SCENE_HEADER.is_match(line) {
        Some(LineKind::SceneHeader {
            title: Some(line.to_string()),
        })
    } else if is_bare_keyword(line, &BARE_SCENE) {
        Some(LineKind::SceneHeader { title: None })
    } else {
        None
    }
}

pub fn match_setting(line: &str) -> Option<LineKind> {
    let setting = SETTING.captures(line)?.get(1)?.as_str().trim();
    (!setting.is_empty()).then(|| LineKind::Setting(setting.to_string()))
}

pub fn match_dialogue(line: &str) -> Option<LineKind> {
    let caps = DIALOGUE.captures(line)?;
    let name = caps.get(1)?.as_str().trim().to_string();
    let remainder = caps.get(2)?.as_str().trim();

    let directions: Vec<String> = PARENTHETICAL
        .find_iter(remainder)
        .map(|m| m.as_str().to_string())
        .collect();

    if directions.is_empty() {
        return Some(LineKind::Dialogue {
            name,
            speech: Some(remainder.to_string()),
            directions,
        });
    }

    let stripped = PARENTHETICAL.replace_all(remainder, "");
    let stripped = stripped.trim();
    Some(LineKind::Dialogue {
        name,
        speech: (!stripped.is_empty()).then(|| stripped.to_string()),
        directions,
    })
}

pub fn match_direction(line: &str) -> Option<LineKind> {
    let bracketed = (line.starts_with('(') && line.ends_with(')'))
        || (line.starts_with('[') && line.ends_with(']'));
    (bracketed && line.len() >= 2).then(|| LineKind::Direction(line.to_string()))
}

pub fn match_scene_description(line: &str) -> Option<LineKind> {
    if is_all_uppercase(line) || line.chars().count() <= MIN_DESCRIPTION_CHARS {
        return None;
    }
    if STAGE_VERBS.is_match(line) {
        Some(LineKind::Direction(line.to_string()))
    } else {
        Some(LineKind::SceneDescription(line.to_string()))
    }
}
