//! Memory entry and recall context types.

use serde::{Deserialize, Serialize};

use crate::{Id, Timestamp, new_id, now};

/// Classification of a stored memory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryKind {
    Log,
    Summary,
    Pattern,
    Correction,
    Goal,
    GoalProgress,
    SessionSummary,
    SessionDecision,
    Conversation,
    Clarification,
}

impl MemoryKind {
    /// String form used for storage and filtering.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::Summary => "summary",
            Self::Pattern => "pattern",
            Self::Correction => "correction",
            Self::Goal => "goal",
            Self::GoalProgress => "goal_progress",
            Self::SessionSummary => "session_summary",
            Self::SessionDecision => "session_decision",
            Self::Conversation => "conversation",
            Self::Clarification => "clarification",
        }
    }

    /// Parse from the storage string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "log" => Some(Self::Log),
            "summary" => Some(Self::Summary),
            "pattern" => Some(Self::Pattern),
            "correction" => Some(Self::Correction),
            "goal" => Some(Self::Goal),
            "goal_progress" => Some(Self::GoalProgress),
            "session_summary" => Some(Self::SessionSummary),
            "session_decision" => Some(Self::SessionDecision),
            "conversation" => Some(Self::Conversation),
            "clarification" => Some(Self::Clarification),
            _ => None,
        }
    }
}

/// Lifecycle status of a tracked goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    New,
    InProgress,
    Completed,
    Abandoned,
}

impl GoalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Abandoned => "abandoned",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new" => Some(Self::New),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "abandoned" => Some(Self::Abandoned),
            _ => None,
        }
    }

    /// Whether a goal in this status is still open (can accept progress).
    pub fn is_open(&self) -> bool {
        matches!(self, Self::New | Self::InProgress)
    }
}

/// A persisted fact derived from one conversational turn.
///
/// Entries are append-only: created once by the planner or caller, with
/// `last_accessed` and `frequency` updated on each successful recall, and
/// otherwise never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub id: Id,
    pub agent_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub kind: MemoryKind,
    /// Raw user input this entry was derived from.
    pub input: String,
    /// Condensed statement of the fact.
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Assigned at query time by the ranker; not stored ground truth.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<f32>,
    /// Number of times this entry has been recalled (>= 1).
    pub frequency: u32,
    pub created_at: Timestamp,
    pub last_accessed: Timestamp,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal_status: Option<GoalStatus>,
}

impl MemoryEntry {
    /// Create a new entry for an agent from the current turn.
    pub fn new(
        agent_id: impl Into<String>,
        kind: MemoryKind,
        input: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        let created = now();
        Self {
            id: new_id(),
            agent_id: agent_id.into(),
            user_id: None,
            kind,
            input: input.into(),
            summary: summary.into(),
            context: None,
            relevance_score: None,
            frequency: 1,
            created_at: created,
            last_accessed: created,
            tags: Vec::new(),
            goal_id: None,
            goal_summary: None,
            goal_status: None,
        }
    }

    /// Attach a user identifier.
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Attach free-text context.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add a tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Replace the tag set.
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Attach goal tracking fields.
    pub fn with_goal(
        mut self,
        goal_id: impl Into<String>,
        goal_summary: impl Into<String>,
        status: GoalStatus,
    ) -> Self {
        self.goal_id = Some(goal_id.into());
        self.goal_summary = Some(goal_summary.into());
        self.goal_status = Some(status);
        self
    }

    /// Concatenated searchable text of this entry.
    pub fn searchable_text(&self) -> String {
        let mut text = String::with_capacity(
            self.input.len() + self.summary.len() + self.tags.iter().map(String::len).sum::<usize>(),
        );
        text.push_str(&self.input);
        text.push(' ');
        text.push_str(&self.summary);
        if let Some(ctx) = &self.context {
            text.push(' ');
            text.push_str(ctx);
        }
        for tag in &self.tags {
            text.push(' ');
            text.push_str(tag);
        }
        text
    }

    /// Whether this entry describes a goal that is still open.
    pub fn is_open_goal(&self) -> bool {
        self.kind == MemoryKind::Goal && self.goal_status.is_none_or(|s| s.is_open())
    }
}

/// A recurring theme extracted from recalled entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryPattern {
    /// The recurring theme (a normalized keyword or tag).
    pub theme: String,
    /// How many recalled entries carry the theme.
    pub frequency: u32,
    /// Example inputs that exhibit the theme.
    pub examples: Vec<String>,
}

/// The bundle of ranked entries plus aggregate statistics returned by a recall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryContext {
    /// Entries ordered by descending relevance.
    pub entries: Vec<MemoryEntry>,
    /// Matches found before the result cap was applied.
    pub total_matches: usize,
    /// Mean relevance score across returned entries (0.0 when empty).
    pub average_relevance: f32,
    /// Recurring themes across the returned entries.
    pub patterns: Vec<MemoryPattern>,
    /// Whether this context was served from the recall cache.
    pub cache_hit: bool,
    /// Wall time spent serving the recall.
    pub query_time_ms: u64,
}

impl MemoryContext {
    /// An empty context, used when storage degrades.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            total_matches: 0,
            average_relevance: 0.0,
            patterns: Vec::new(),
            cache_hit: false,
            query_time_ms: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
