use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleType {
    Block,
    Allow,
}

impl RuleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleType::Block => "BLOCK",
            RuleType::Allow => "ALLOW",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "BLOCK" => Some(RuleType::Block),
            "ALLOW" => Some(RuleType::Allow),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleSource {
    Default,
    Custom,
}

impl RuleSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleSource::Default => "default",
            RuleSource::Custom => "custom",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "default" => Some(RuleSource::Default),
            "custom" => Some(RuleSource::Custom),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub id: i64,
    pub rule_type: RuleType,
    pub pattern: String,
    pub enabled: bool,
    pub source: RuleSource,
}

impl Rule {
    /// `*.suffix` matches iff `domain` ends with `.suffix` (and is longer than
    /// the suffix alone — a bare `tracker.io` never matches `*.tracker.io`).
    /// An exact pattern matches iff equal.
    pub fn matches(&self, domain: &str) -> bool {
        if let Some(suffix) = self.pattern.strip_prefix("*.") {
            domain.len() > suffix.len() && domain.ends_with(suffix) && {
                let boundary = domain.len() - suffix.len() - 1;
                domain.as_bytes()[boundary] == b'.'
            }
        } else {
            domain == self.pattern
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedRules {
    pub rules: Vec<Rule>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(pattern: &str) -> Rule {
        Rule {
            id: 1,
            rule_type: RuleType::Block,
            pattern: pattern.to_string(),
            enabled: true,
            source: RuleSource::Custom,
        }
    }

    #[test]
    fn wildcard_matches_subdomain_only() {
        let r = rule("*.tracker.io");
        assert!(r.matches("a.tracker.io"));
        assert!(r.matches("a.b.tracker.io"));
        assert!(!r.matches("tracker.io"));
        assert!(!r.matches("nottracker.io"));
    }

    #[test]
    fn exact_pattern_requires_equality() {
        let r = rule("ads.example.com");
        assert!(r.matches("ads.example.com"));
        assert!(!r.matches("sub.ads.example.com"));
    }
}
