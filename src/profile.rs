//! Concentration profile composition
//!
//! Fuses the reading, reaction and code sub-scores into a weighted overall
//! score and attaches fixed-template commentary.

use crate::types::{CodeSummary, ConcentrationProfile, ReactionSummary, ReadingSummary};
use std::collections::BTreeMap;

/// Sub-score weights; reaction carries the most signal per event
pub const READING_WEIGHT: f64 = 0.3;
pub const REACTION_WEIGHT: f64 = 0.4;
pub const CODE_WEIGHT: f64 = 0.3;

const HIGH_TIER_MIN: f64 = 80.0;
const MODERATE_TIER_MIN: f64 = 60.0;

/// Points a task must trail both others by to be flagged as the weak task
const WEAK_TASK_GAP: f64 = 10.0;

const HIGH_COMMENT: &str =
    "Your concentration profile is high and stable across the reading, reaction and code tasks.";
const MODERATE_COMMENT: &str =
    "Your concentration profile is moderate, with some variability across tasks.";
const LOW_COMMENT: &str =
    "Your concentration profile is relatively low, with noticeable variability across tasks.";

const READING_WEAK: &str =
    "Reading stood out as the weakest task: reading pace varied more than your other performance.";
const REACTION_WEAK: &str =
    "Reaction stood out as the weakest task: response speed, accuracy or consistency lagged behind.";
const CODE_WEAK: &str =
    "Code stood out as the weakest task: correctness or typing flow lagged behind the other tasks.";
const BALANCED: &str = "Performance was fairly balanced across the three tasks.";

/// Sub-scores for the three tasks, 0-100 each
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubScores {
    pub reading: f64,
    pub reaction: f64,
    pub code: f64,
}

/// One ordered diagnostic check: predicate over sub-scores and its sentence
struct Diagnostic {
    applies: fn(&SubScores) -> bool,
    message: &'static str,
}

/// Evaluated in order; the first matching check wins, later ones are skipped
const DIAGNOSTICS: [Diagnostic; 3] = [
    Diagnostic {
        applies: reading_is_weak,
        message: READING_WEAK,
    },
    Diagnostic {
        applies: reaction_is_weak,
        message: REACTION_WEAK,
    },
    Diagnostic {
        applies: code_is_weak,
        message: CODE_WEAK,
    },
];

fn reading_is_weak(s: &SubScores) -> bool {
    trails_both(s.reading, s.reaction, s.code)
}

fn reaction_is_weak(s: &SubScores) -> bool {
    trails_both(s.reaction, s.reading, s.code)
}

fn code_is_weak(s: &SubScores) -> bool {
    trails_both(s.code, s.reading, s.reaction)
}

fn trails_both(score: f64, other_a: f64, other_b: f64) -> bool {
    score + WEAK_TASK_GAP < other_a && score + WEAK_TASK_GAP < other_b
}

pub struct ProfileComposer;

impl ProfileComposer {
    /// Compose the concentration profile from the three task summaries
    pub fn compose(
        reading: &ReadingSummary,
        reaction: &ReactionSummary,
        code: &CodeSummary,
    ) -> ConcentrationProfile {
        let scores = SubScores {
            reading: reading.score,
            reaction: reaction.score,
            code: code.score,
        };

        let components = BTreeMap::from([
            ("reading_stability".to_string(), reading.stability),
            ("reaction_stability".to_string(), reaction.stability_component),
            ("reaction_accuracy".to_string(), reaction.accuracy_component),
            ("reaction_trend".to_string(), reaction.trend_component),
            ("code_success".to_string(), code.success_component),
            ("code_typing_rate".to_string(), code.typing_component),
            ("code_first_key_stability".to_string(), code.first_key_component),
        ]);

        let overall_score = overall_score(&scores);

        ConcentrationProfile {
            overall_score,
            reading_score: scores.reading,
            reaction_score: scores.reaction,
            code_score: scores.code,
            components,
            comment: compose_comment(overall_score, &scores),
        }
    }
}

/// Fixed-weight fusion of the sub-scores
pub fn overall_score(scores: &SubScores) -> f64 {
    let overall = READING_WEIGHT * scores.reading
        + REACTION_WEIGHT * scores.reaction
        + CODE_WEIGHT * scores.code;
    overall.clamp(0.0, 100.0)
}

/// Tier sentence followed by exactly one diagnostic sentence
pub fn compose_comment(overall: f64, scores: &SubScores) -> String {
    let tier = if overall >= HIGH_TIER_MIN {
        HIGH_COMMENT
    } else if overall >= MODERATE_TIER_MIN {
        MODERATE_COMMENT
    } else {
        LOW_COMMENT
    };

    format!("{} {}", tier, diagnostic_sentence(scores))
}

fn diagnostic_sentence(scores: &SubScores) -> &'static str {
    DIAGNOSTICS
        .iter()
        .find(|d| (d.applies)(scores))
        .map(|d| d.message)
        .unwrap_or(BALANCED)
}
