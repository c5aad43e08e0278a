//! Keyword and regex extraction from raw student text.
//!
//! Feeds the plan agent (tournament details) and the coach agent's progress
//! subroute. Plain text scanning — the classifier and the agents treat the
//! results as hints, not truth.

use regex::Regex;

/// Tournament details scraped from a plan request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TournamentInfo {
    pub division: Option<String>,
    pub weight_class: Option<String>,
    pub opponent_style: Option<String>,
    pub gender: Option<String>,
    pub no_gi_level: Option<String>,
    pub tournament_name: Option<String>,
}

impl TournamentInfo {
    /// Human-readable names of the required fields that are still missing.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.division.is_none() {
            missing.push("belt division");
        }
        if self.weight_class.is_none() {
            missing.push("weight class");
        }
        if self.opponent_style.is_none() {
            missing.push("opponent style");
        }
        if self.gender.is_none() {
            missing.push("gender");
        }
        if self.no_gi_level.is_none() {
            missing.push("no-gi experience level");
        }
        missing
    }
}

const DIVISIONS: &[&str] = &[
    "white belt",
    "blue belt",
    "purple belt",
    "brown belt",
    "black belt",
];

const NO_GI_LEVELS: &[&str] = &["beginner", "intermediate", "advanced"];

const OPPONENT_STYLES: &[&str] = &[
    "aggressive",
    "defensive",
    "technical",
    "athletic",
    "experienced",
];

const NAMED_WEIGHT_CLASSES: &[&str] = &[
    "featherweight",
    "lightweight",
    "middleweight",
    "heavyweight",
];

/// Scrape tournament details from free text.
pub fn extract_tournament_info(input: &str) -> TournamentInfo {
    let lower = input.to_lowercase();
    let mut info = TournamentInfo::default();

    info.division = DIVISIONS
        .iter()
        .find(|d| lower.contains(*d))
        .map(|d| d.to_string());

    // Female patterns first: "female" contains "male".
    let female = Regex::new(r"\b(female|woman|women|girl)\b").unwrap();
    let male = Regex::new(r"\b(male|man|men|guy)\b").unwrap();
    info.gender = if female.is_match(&lower) {
        Some("female".to_string())
    } else if male.is_match(&lower) {
        Some("male".to_string())
    } else {
        None
    };

    info.no_gi_level = NO_GI_LEVELS
        .iter()
        .find(|l| lower.contains(*l))
        .map(|l| l.to_string());

    let numeric_weight = Regex::new(r"\d+\s*(lbs|kg)\b").unwrap();
    info.weight_class = numeric_weight
        .find(&lower)
        .map(|m| m.as_str().to_string())
        .or_else(|| {
            NAMED_WEIGHT_CLASSES
                .iter()
                .find(|w| lower.contains(*w))
                .map(|w| w.to_string())
        });

    info.opponent_style = OPPONENT_STYLES
        .iter()
        .find(|s| lower.contains(*s))
        .map(|s| s.to_string());

    info
}

/// A parsed progress-tracking request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEntry {
    pub technique: String,
    pub level: String,
    pub notes: String,
}

const LEVELS: &[(&str, &str)] = &[
    ("mastered", "Mastered"),
    ("advanced", "Advanced"),
    ("intermediate", "Intermediate"),
    ("beginner", "Beginner"),
];

/// Parse a progress-tracking message into technique, level, and notes.
///
/// Returns `None` when no technique phrase can be found — the caller falls
/// back to a normal coaching reply.
pub fn parse_progress(input: &str) -> Option<ProgressEntry> {
    let technique_patterns = [
        r"(?i)technique[:\s]+([^,\n.]+)",
        r"(?i)working on[:\s]+([^,\n.]+)",
        r"(?i)learning[:\s]+([^,\n.]+)",
        r"(?i)practicing[:\s]+([^,\n.]+)",
    ];

    let technique = technique_patterns.iter().find_map(|p| {
        Regex::new(p)
            .unwrap()
            .captures(input)
            .map(|c| c[1].trim().to_string())
    })?;

    let lower = input.to_lowercase();
    let level = LEVELS
        .iter()
        .find(|(needle, _)| lower.contains(needle))
        .map(|(_, label)| label.to_string())
        .unwrap_or_else(|| "Beginner".to_string());

    Some(ProgressEntry {
        technique,
        level,
        notes: input.trim().to_string(),
    })
}
