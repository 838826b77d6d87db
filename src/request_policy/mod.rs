pub mod replace;
pub mod rules;

pub use replace::{IdentityReplacer, RealIdentity, ReplacementKind, ReplacementReport, IDENTITY_HEADERS};
pub use rules::PatternTables;

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Outbound request body as the caller handed it over.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Text(String),
    Json(serde_json::Value),
}

impl Payload {
    /// Text the keyword and replacement passes operate on.
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            Payload::Text(text) => Cow::Borrowed(text),
            Payload::Json(value) => Cow::Owned(value.to_string()),
        }
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<serde_json::Value> for Payload {
    fn from(value: serde_json::Value) -> Self {
        Payload::Json(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Policy {
    Allow,
    Intercept,
    ReplaceIdentity,
}

/// Which rule produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReasonCode {
    EssentialFunction,
    IdentityVerification,
    PersonalInfo,
    Telemetry,
    Unmatched,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleAction {
    pub policy: Policy,
    pub reason: ReasonCode,
}

impl RuleAction {
    pub const fn new(policy: Policy, reason: ReasonCode) -> Self {
        Self { policy, reason }
    }
}

/// Result of classifying one operation. Computed per call, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationDecision {
    pub policy: Policy,
    pub reason: ReasonCode,
}

impl From<RuleAction> for ClassificationDecision {
    fn from(action: RuleAction) -> Self {
        Self {
            policy: action.policy,
            reason: action.reason,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Case-sensitive substring match on the target.
    TargetContains {
        patterns: Vec<String>,
        action: RuleAction,
    },
    /// Case-insensitive substring match on the payload text. Keywords are
    /// stored lower-cased.
    PayloadContains {
        keywords: Vec<String>,
        action: RuleAction,
    },
}

impl Rule {
    pub fn target_contains<I, S>(patterns: I, action: RuleAction) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Rule::TargetContains {
            patterns: patterns.into_iter().map(Into::into).collect(),
            action,
        }
    }

    pub fn payload_contains<I, S>(keywords: I, action: RuleAction) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Rule::PayloadContains {
            keywords: keywords
                .into_iter()
                .map(|k| k.into().to_lowercase())
                .collect(),
            action,
        }
    }

    fn action(&self) -> RuleAction {
        match self {
            Rule::TargetContains { action, .. } => *action,
            Rule::PayloadContains { action, .. } => *action,
        }
    }

    fn matches(&self, target: &str, payload: Option<&str>) -> bool {
        match self {
            Rule::TargetContains { patterns, .. } => patterns
                .iter()
                .any(|p| !p.is_empty() && target.contains(p.as_str())),
            Rule::PayloadContains { keywords, .. } => match payload {
                Some(text) => {
                    let lowered = text.to_lowercase();
                    keywords
                        .iter()
                        .any(|k| !k.is_empty() && lowered.contains(k.as_str()))
                }
                None => false,
            },
        }
    }
}

/// Ordered rule table; the first matching rule decides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn evaluate(&self, target: &str, payload: Option<&str>) -> Option<RuleAction> {
        self.rules
            .iter()
            .find(|rule| rule.matches(target, payload))
            .map(Rule::action)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CannedResponse {
    pub status: u16,
    pub body: &'static str,
}

pub const CANNED_SUCCESS_BODY: &str = r#"{"success": true}"#;

impl CannedResponse {
    pub fn success() -> Self {
        Self {
            status: 200,
            body: CANNED_SUCCESS_BODY,
        }
    }
}

/// Maps an outbound target plus payload to a policy.
#[derive(Debug, Clone)]
pub struct RequestClassifier {
    rules: RuleSet,
}

impl Default for RequestClassifier {
    fn default() -> Self {
        Self::new(PatternTables::default().into_rule_set())
    }
}

impl RequestClassifier {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Unmatched targets are allowed through unmodified.
    pub fn classify(&self, target: &str, payload: Option<&Payload>) -> ClassificationDecision {
        let text = payload.map(Payload::to_text);
        self.rules
            .evaluate(target, text.as_deref())
            .map(ClassificationDecision::from)
            .unwrap_or(ClassificationDecision {
                policy: Policy::Allow,
                reason: ReasonCode::Unmatched,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALLOW: RuleAction = RuleAction::new(Policy::Allow, ReasonCode::EssentialFunction);
    const BLOCK: RuleAction = RuleAction::new(Policy::Intercept, ReasonCode::Telemetry);

    #[test]
    fn first_matching_rule_wins() {
        let set = RuleSet::new(vec![
            Rule::target_contains(["example"], ALLOW),
            Rule::target_contains(["example"], BLOCK),
        ]);
        assert_eq!(set.evaluate("https://example.org", None), Some(ALLOW));
    }

    #[test]
    fn payload_rule_ignores_case_and_missing_payload() {
        let set = RuleSet::new(vec![Rule::payload_contains(["MachineId"], BLOCK)]);
        assert_eq!(set.evaluate("x", Some("{\"MACHINEID\":1}")), Some(BLOCK));
        assert_eq!(set.evaluate("x", None), None);
    }

    #[test]
    fn target_match_is_case_sensitive() {
        let set = RuleSet::new(vec![Rule::target_contains(["telemetry"], BLOCK)]);
        assert_eq!(set.evaluate("https://TELEMETRY.example", None), None);
    }

    #[test]
    fn empty_patterns_never_match() {
        let set = RuleSet::new(vec![Rule::target_contains([""], BLOCK)]);
        assert_eq!(set.evaluate("anything", None), None);
    }

    #[test]
    fn json_payload_is_inspected_as_text() {
        let payload = Payload::Json(serde_json::json!({ "hostName": "box" }));
        assert_eq!(payload.to_text(), r#"{"hostName":"box"}"#);
    }
}
