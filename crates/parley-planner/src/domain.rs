//! Domain classification.
//!
//! The registry is an injected lookup table: callers may replace it with
//! their own domain vocabulary. Classification is first-match-wins over the
//! registry, then a coarse built-in fallback, then `"general"`.

use parley_signals::rules::word_set;
use parley_types::ReasoningLevel;

/// Label returned when no domain keyword matches.
pub const GENERAL_DOMAIN: &str = "general";

/// One registry row: a domain label and the keywords that select it.
#[derive(Debug, Clone)]
pub struct DomainRule {
    pub domain: String,
    pub keywords: Vec<String>,
    /// Baseline reasoning depth for this domain, if it has one.
    pub complexity: Option<ReasoningLevel>,
}

impl DomainRule {
    pub fn new(
        domain: impl Into<String>,
        keywords: &[&str],
        complexity: Option<ReasoningLevel>,
    ) -> Self {
        Self {
            domain: domain.into(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            complexity,
        }
    }
}

/// Ordered domain lookup table.
#[derive(Debug, Clone)]
pub struct DomainRegistry {
    rules: Vec<DomainRule>,
}

/// Coarse fallback vocabulary used when the registry has no match.
const COARSE_FALLBACK: &[(&str, &[&str])] = &[
    ("coding", &["code", "coding", "program", "programming", "software", "bug", "script"]),
    ("business", &["business", "market", "marketing", "sales", "revenue", "customer"]),
    ("design", &["design", "layout", "logo", "branding", "typography", "ui", "ux"]),
    ("data", &["data", "dataset", "statistics", "analytics", "chart", "metrics"]),
];

impl DomainRegistry {
    /// An empty registry: classification uses only the coarse fallback.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn new(rules: Vec<DomainRule>) -> Self {
        Self { rules }
    }

    pub fn push(&mut self, rule: DomainRule) {
        self.rules.push(rule);
    }

    /// Classify an utterance into a domain label.
    pub fn classify(&self, utterance: &str) -> String {
        let words = word_set(utterance);

        for rule in &self.rules {
            if rule.keywords.iter().any(|k| words.contains(k.as_str())) {
                return rule.domain.clone();
            }
        }

        for (domain, keywords) in COARSE_FALLBACK {
            if keywords.iter().any(|k| words.contains(*k)) {
                return (*domain).to_string();
            }
        }

        GENERAL_DOMAIN.to_string()
    }

    /// Baseline reasoning depth recorded for a domain, if any.
    pub fn complexity(&self, domain: &str) -> Option<ReasoningLevel> {
        self.rules
            .iter()
            .find(|r| r.domain == domain)
            .and_then(|r| r.complexity)
    }
}

impl Default for DomainRegistry {
    /// A starter vocabulary covering the built-in personas.
    fn default() -> Self {
        Self::new(vec![
            DomainRule::new(
                "programming",
                &[
                    "code", "coding", "program", "programming", "software", "rust", "python",
                    "javascript", "api", "compiler", "database", "algorithm",
                ],
                Some(ReasoningLevel::Intermediate),
            ),
            DomainRule::new(
                "business",
                &["business", "startup", "marketing", "sales", "revenue", "pricing", "customer"],
                Some(ReasoningLevel::Intermediate),
            ),
            DomainRule::new(
                "design",
                &["design", "ui", "ux", "layout", "typography", "branding", "wireframe"],
                None,
            ),
            DomainRule::new(
                "data",
                &["data", "dataset", "analytics", "statistics", "regression", "visualization"],
                Some(ReasoningLevel::Advanced),
            ),
            DomainRule::new(
                "language-learning",
                &["spanish", "french", "german", "vocabulary", "grammar", "fluency"],
                Some(ReasoningLevel::Basic),
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_first_match_wins() {
        let registry = DomainRegistry::default();
        assert_eq!(registry.classify("help me debug my rust code"), "programming");
        assert_eq!(registry.classify("improve my spanish vocabulary"), "language-learning");
    }

    #[test]
    fn test_coarse_fallback() {
        let registry = DomainRegistry::empty();
        assert_eq!(registry.classify("my logo needs a new look"), "design");
    }

    #[test]
    fn test_general_when_nothing_matches() {
        let registry = DomainRegistry::default();
        assert_eq!(registry.classify("what should i eat tonight"), GENERAL_DOMAIN);
    }

    #[test]
    fn test_complexity_lookup() {
        let registry = DomainRegistry::default();
        assert_eq!(registry.complexity("data"), Some(ReasoningLevel::Advanced));
        assert_eq!(registry.complexity("design"), None);
        assert_eq!(registry.complexity(GENERAL_DOMAIN), None);
    }
}
