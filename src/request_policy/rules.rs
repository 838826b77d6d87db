use super::{Policy, ReasonCode, Rule, RuleAction, RuleSet};

pub const DEFAULT_PRODUCT_DOMAINS: &[&str] = &["augmentcode.com"];

pub const ESSENTIAL_PATTERNS: &[&str] = &[
    "/api/completion",
    "/api/chat",
    "/api/search",
    "/api/index",
    "vscode-webview",
    "localhost",
    "127.0.0.1",
];

pub const IDENTITY_VERIFICATION_PATTERNS: &[&str] = &[
    "/api/auth",
    "/api/verify",
    "/api/login",
    "/api/register",
    "/api/user",
    "/api/device",
];

pub const PERSONAL_INFO_KEYWORDS: &[&str] = &[
    "machineId",
    "hostname",
    "username",
    "userInfo",
    "telemetryDevDeviceId",
    "osMachineId",
    "deviceId",
    "homeDirectory",
    "userDataPath",
];

pub const TELEMETRY_PATTERNS: &[&str] = &[
    "segment.io",
    "analytics",
    "telemetry",
    "mixpanel",
    "amplitude",
    "google-analytics",
    "facebook.com/tr",
    "doubleclick.net",
];

/// Pattern lists behind the request rule table, in evaluation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternTables {
    pub product_domains: Vec<String>,
    pub essential: Vec<String>,
    pub identity_verification: Vec<String>,
    pub personal_info: Vec<String>,
    pub telemetry: Vec<String>,
}

fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for PatternTables {
    fn default() -> Self {
        Self {
            product_domains: owned(DEFAULT_PRODUCT_DOMAINS),
            essential: owned(ESSENTIAL_PATTERNS),
            identity_verification: owned(IDENTITY_VERIFICATION_PATTERNS),
            personal_info: owned(PERSONAL_INFO_KEYWORDS),
            telemetry: owned(TELEMETRY_PATTERNS),
        }
    }
}

impl PatternTables {
    pub fn with_product_domains(mut self, domains: &[String]) -> Self {
        self.product_domains = domains.to_vec();
        self
    }

    pub fn with_extra_essential(mut self, patterns: &[String]) -> Self {
        self.essential.extend(patterns.iter().cloned());
        self
    }

    pub fn with_extra_telemetry(mut self, patterns: &[String]) -> Self {
        self.telemetry.extend(patterns.iter().cloned());
        self
    }

    /// Essential, identity verification, personal info, telemetry.
    pub fn into_rule_set(self) -> RuleSet {
        let essential = self.product_domains.into_iter().chain(self.essential);
        RuleSet::new(vec![
            Rule::target_contains(
                essential,
                RuleAction::new(Policy::Allow, ReasonCode::EssentialFunction),
            ),
            Rule::target_contains(
                self.identity_verification,
                RuleAction::new(Policy::ReplaceIdentity, ReasonCode::IdentityVerification),
            ),
            Rule::payload_contains(
                self.personal_info,
                RuleAction::new(Policy::ReplaceIdentity, ReasonCode::PersonalInfo),
            ),
            Rule::target_contains(
                self.telemetry,
                RuleAction::new(Policy::Intercept, ReasonCode::Telemetry),
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_has_four_ordered_rules() {
        let set = PatternTables::default().into_rule_set();
        let reasons: Vec<ReasonCode> = set
            .rules()
            .iter()
            .map(|rule| match rule {
                Rule::TargetContains { action, .. } | Rule::PayloadContains { action, .. } => action.reason,
            })
            .collect();
        assert_eq!(
            reasons,
            vec![
                ReasonCode::EssentialFunction,
                ReasonCode::IdentityVerification,
                ReasonCode::PersonalInfo,
                ReasonCode::Telemetry,
            ]
        );
    }

    #[test]
    fn extra_patterns_join_their_group() {
        let set = PatternTables::default()
            .with_extra_telemetry(&["metrics.internal".to_string()])
            .with_extra_essential(&["intranet.local".to_string()])
            .into_rule_set();
        assert_eq!(
            set.evaluate("https://metrics.internal/v1", None).map(|a| a.policy),
            Some(Policy::Intercept)
        );
        assert_eq!(
            set.evaluate("https://intranet.local/analytics", None).map(|a| a.policy),
            Some(Policy::Allow)
        );
    }

    #[test]
    fn product_domains_are_replaceable() {
        let set = PatternTables::default()
            .with_product_domains(&["editor.example".to_string()])
            .into_rule_set();
        assert_eq!(
            set.evaluate("https://editor.example/api/auth", None).map(|a| a.policy),
            Some(Policy::Allow)
        );
        assert_eq!(
            set.evaluate("https://augmentcode.com/api/auth", None).map(|a| a.policy),
            Some(Policy::ReplaceIdentity)
        );
    }
}
