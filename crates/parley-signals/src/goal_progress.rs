//! Goal-progress detector.
//!
//! Watches utterances for signals that a previously stored goal moved
//! forward, finished, or was dropped, and matches the signal back to the
//! most plausible open goal from memory.

use parley_types::{GoalProgressResult, GoalStatus, MemoryEntry};

use crate::error::Result;
use crate::rules::{RuleSet, word_set, words};

/// Minimum confidence for a status change to fire.
pub const PROGRESS_THRESHOLD: f32 = 0.5;

/// Confidence boost when at least one open goal exists in memory.
pub const OPEN_GOAL_BOOST: f32 = 0.2;

/// Minimum token-overlap fraction to match an utterance to a specific goal.
pub const MIN_GOAL_OVERLAP: f32 = 0.1;

/// Tokens shorter than this are ignored when matching goals.
const MIN_MATCH_WORD_LEN: usize = 4;

const PATTERN_CONTRIBUTION: f32 = 0.6;
const KEYWORD_CONTRIBUTION: f32 = 0.4;

/// Detector with compiled rule tables, one per status transition.
#[derive(Debug)]
pub struct GoalProgressDetector {
    transitions: Vec<(GoalStatus, RuleSet)>,
}

impl GoalProgressDetector {
    /// Compile the rule tables.
    pub fn new() -> Result<Self> {
        let transitions = vec![
            (
                GoalStatus::Completed,
                RuleSet::compile(
                    "completed",
                    1.0,
                    &[
                        r"(?i)\bi('ve| have)? (finally )?(finished|completed|done with)\b",
                        r"(?i)\b(it'?s|that'?s) (done|finished|complete)\b",
                        r"(?i)\bi (did|made) it\b",
                        r"(?i)\bfinally (got|finished|launched|shipped|deployed)\b",
                        r"(?i)\b(launched|shipped|deployed|published|submitted) (it|my|the)\b",
                    ],
                    &["finished", "completed", "done", "accomplished", "achieved"],
                )?,
            ),
            (
                GoalStatus::InProgress,
                RuleSet::compile(
                    "in_progress",
                    1.0,
                    &[
                        r"(?i)\b(i'?m|i am) (still )?working on\b",
                        r"(?i)\bmaking (some |good |slow )?progress\b",
                        r"(?i)\b(i'?ve|i have) (started|begun)\b",
                        r"(?i)\bhalfway (through|there|done)\b",
                        r"(?i)\bgetting (closer|there)\b",
                    ],
                    &["progress", "started", "halfway", "continuing"],
                )?,
            ),
            (
                GoalStatus::Abandoned,
                RuleSet::compile(
                    "abandoned",
                    1.0,
                    &[
                        r"(?i)\b(i'?m|i am) (giving|gave) up\b",
                        r"(?i)\bgiving up on\b",
                        r"(?i)\bnot (doing|pursuing|going to do) (it|that|this) anymore\b",
                        r"(?i)\b(dropped|abandoned|shelved|scrapped) (it|that|the|my)\b",
                        r"(?i)\bchanged my mind about\b",
                    ],
                    &["quit", "abandoned", "dropped", "shelved"],
                )?,
            ),
        ];

        Ok(Self { transitions })
    }

    /// Detect a goal status change in the utterance.
    ///
    /// `memories` is the recalled context for this turn; only entries that
    /// are open goals influence the boost and the goal match.
    pub fn detect(&self, utterance: &str, memories: &[MemoryEntry]) -> GoalProgressResult {
        let open_goals: Vec<&MemoryEntry> =
            memories.iter().filter(|m| m.is_open_goal()).collect();

        let mut best: Option<(GoalStatus, f32)> = None;
        for (status, set) in &self.transitions {
            let score = set.score(utterance, PATTERN_CONTRIBUTION, KEYWORD_CONTRIBUTION);
            if score > 0.0 && best.map_or(true, |(_, s)| score > s) {
                best = Some((*status, score));
            }
        }

        let Some((status, raw)) = best else {
            return GoalProgressResult::none();
        };

        let mut confidence = raw;
        if !open_goals.is_empty() {
            confidence += OPEN_GOAL_BOOST;
        }
        let confidence = confidence.min(1.0);

        if confidence < PROGRESS_THRESHOLD {
            return GoalProgressResult::none();
        }

        let matched = match_goal(utterance, &open_goals);
        GoalProgressResult {
            status: Some(status),
            confidence,
            goal_id: matched.map(|g| g.goal_id.clone().unwrap_or_else(|| g.id.to_string())),
            goal_summary: matched.map(|g| {
                g.goal_summary.clone().unwrap_or_else(|| g.summary.clone())
            }),
        }
    }
}

/// Pick the open goal whose summary and input overlap the utterance the most.
///
/// Overlap is measured over tokens longer than 3 characters, as a fraction
/// of the utterance's tokens. Below [`MIN_GOAL_OVERLAP`], fall back to the
/// most recently touched open goal.
fn match_goal<'a>(utterance: &str, open_goals: &[&'a MemoryEntry]) -> Option<&'a MemoryEntry> {
    if open_goals.is_empty() {
        return None;
    }

    let utterance_tokens: Vec<String> = words(utterance)
        .into_iter()
        .filter(|w| w.len() >= MIN_MATCH_WORD_LEN)
        .collect();

    let mut best: Option<(&MemoryEntry, f32)> = None;
    if !utterance_tokens.is_empty() {
        for goal in open_goals {
            // Terse summaries alone miss; the original phrasing still matches.
            let text = format!(
                "{} {}",
                goal.goal_summary.as_deref().unwrap_or(&goal.summary),
                goal.input
            );
            let goal_words = word_set(&text);
            let shared = utterance_tokens
                .iter()
                .filter(|w| w.len() >= MIN_MATCH_WORD_LEN && goal_words.contains(w.as_str()))
                .count();
            let overlap = shared as f32 / utterance_tokens.len() as f32;
            if best.map_or(true, |(_, s)| overlap > s) {
                best = Some((goal, overlap));
            }
        }
    }

    match best {
        Some((goal, overlap)) if overlap > MIN_GOAL_OVERLAP => Some(goal),
        _ => open_goals
            .iter()
            .max_by_key(|g| g.last_accessed)
            .copied(),
    }
}
