//! Agent persona profiles.
//!
//! Each persona biases the planner: its own keyword rules run before the
//! shared intent ladder, its default intent is the last resort, and intents
//! in its aligned set earn a confidence bonus.

use parley_types::Intent;

/// Keyword rule checked before the shared intent ladder.
#[derive(Debug, Clone)]
pub struct AgentRule {
    pub intent: Intent,
    pub keywords: &'static [&'static str],
}

/// Planning profile for one agent persona.
#[derive(Debug, Clone)]
pub struct AgentProfile {
    pub id: &'static str,
    /// Intent assumed when nothing else matches.
    pub default_intent: Intent,
    /// Intents this persona handles well; earns a confidence bonus.
    pub aligned_intents: &'static [Intent],
    /// Persona-specific keyword rules, checked in order.
    pub rules: &'static [AgentRule],
}

const RESEARCHER_RULES: &[AgentRule] = &[
    AgentRule {
        intent: Intent::Research,
        keywords: &["data", "dataset", "source", "sources", "paper", "study", "evidence"],
    },
    AgentRule {
        intent: Intent::Analyze,
        keywords: &["trend", "trends", "pattern", "correlation"],
    },
];

const TUTOR_RULES: &[AgentRule] = &[
    AgentRule {
        intent: Intent::Learn,
        keywords: &["practice", "exercise", "exercises", "lesson", "homework"],
    },
    AgentRule {
        intent: Intent::Explain,
        keywords: &["concept", "confused", "definition"],
    },
];

const STRATEGIST_RULES: &[AgentRule] = &[
    AgentRule {
        intent: Intent::Plan,
        keywords: &["roadmap", "milestone", "milestones", "launch", "quarter", "growth"],
    },
    AgentRule {
        intent: Intent::Optimize,
        keywords: &["conversion", "retention", "efficiency"],
    },
];

const PROFILES: &[AgentProfile] = &[
    AgentProfile {
        id: "researcher",
        default_intent: Intent::Research,
        aligned_intents: &[
            Intent::Research,
            Intent::Analyze,
            Intent::Explore,
            Intent::Compare,
            Intent::Summarize,
        ],
        rules: RESEARCHER_RULES,
    },
    AgentProfile {
        id: "tutor",
        default_intent: Intent::Explain,
        aligned_intents: &[Intent::Learn, Intent::Explain, Intent::Debug],
        rules: TUTOR_RULES,
    },
    AgentProfile {
        id: "strategist",
        default_intent: Intent::Plan,
        aligned_intents: &[Intent::Plan, Intent::Optimize, Intent::Create, Intent::Analyze],
        rules: STRATEGIST_RULES,
    },
];

/// Neutral profile for unknown agent ids.
static FALLBACK: AgentProfile = AgentProfile {
    id: "general",
    default_intent: Intent::Explain,
    aligned_intents: &[Intent::Explain],
    rules: &[],
};

/// Lookup table of known persona profiles.
#[derive(Debug, Clone, Default)]
pub struct AgentRegistry;

impl AgentRegistry {
    /// Resolve an agent id, falling back to the neutral profile.
    pub fn profile(&self, agent_id: &str) -> &'static AgentProfile {
        PROFILES
            .iter()
            .find(|p| p.id == agent_id)
            .unwrap_or(&FALLBACK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_agent_resolves() {
        let registry = AgentRegistry;
        assert_eq!(registry.profile("tutor").default_intent, Intent::Explain);
        assert_eq!(registry.profile("researcher").default_intent, Intent::Research);
    }

    #[test]
    fn test_unknown_agent_falls_back() {
        let registry = AgentRegistry;
        let profile = registry.profile("no-such-agent");
        assert_eq!(profile.id, "general");
        assert_eq!(profile.aligned_intents, &[Intent::Explain]);
    }
}
