use std::collections::BTreeMap;

use tracing::info;

use super::Payload;
use crate::gateways::IdentityGateway;
use crate::identity::{short, IdentityProfile};

/// Header names whose values are rewritten on REPLACE_IDENTITY.
pub const IDENTITY_HEADERS: &[&str] = &["User-Agent", "X-Machine-Id", "X-Device-Id"];

/// The caller's actual identity values that must not leave the machine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RealIdentity {
    pub hostname: String,
    pub username: String,
    pub env_username: String,
    pub env_user: String,
}

impl RealIdentity {
    /// Reads the unshielded gateway plus the `USERNAME` / `USER` variables.
    pub fn collect(gateway: &dyn IdentityGateway) -> Self {
        Self {
            hostname: gateway.hostname(),
            username: gateway.user_info().username,
            env_username: std::env::var("USERNAME").unwrap_or_default(),
            env_user: std::env::var("USER").unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplacementKind {
    Hostname,
    Username,
    EnvUsername,
    EnvUser,
}

impl ReplacementKind {
    pub fn label(self) -> &'static str {
        match self {
            ReplacementKind::Hostname => "hostname",
            ReplacementKind::Username => "username",
            ReplacementKind::EnvUsername => "env_username",
            ReplacementKind::EnvUser => "env_user",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ReplacementPair {
    kind: ReplacementKind,
    real: String,
    synthetic: String,
}

/// Which pairs fired during one rewrite.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplacementReport {
    pub applied: Vec<ReplacementKind>,
}

impl ReplacementReport {
    pub fn count(&self) -> usize {
        self.applied.len()
    }

    fn merge(&mut self, other: ReplacementReport) {
        self.applied.extend(other.applied);
    }
}

/// Literal real → synthetic rewriting for payloads and headers.
#[derive(Debug, Clone)]
pub struct IdentityReplacer {
    pairs: Vec<ReplacementPair>,
}

impl IdentityReplacer {
    /// Empty values are skipped and a real value already claimed by an
    /// earlier pair is not listed again.
    pub fn new(real: &RealIdentity, profile: &IdentityProfile) -> Self {
        let system = &profile.system;
        let mut pairs: Vec<ReplacementPair> = Vec::new();
        for (kind, real, synthetic) in [
            (ReplacementKind::Hostname, &real.hostname, &system.hostname),
            (ReplacementKind::Username, &real.username, &system.username),
            (ReplacementKind::EnvUsername, &real.env_username, &system.username),
            (ReplacementKind::EnvUser, &real.env_user, &system.username),
        ] {
            if real.is_empty() || synthetic.is_empty() || pairs.iter().any(|p| p.real == *real) {
                continue;
            }
            pairs.push(ReplacementPair {
                kind,
                real: real.clone(),
                synthetic: synthetic.clone(),
            });
        }
        Self { pairs }
    }

    pub fn kinds(&self) -> Vec<ReplacementKind> {
        self.pairs.iter().map(|p| p.kind).collect()
    }

    /// One left-to-right pass over the input. Inserted synthetic values are
    /// never scanned again. `applied` lists the pairs that matched, in table
    /// order.
    pub fn replace_text(&self, text: &str) -> (String, ReplacementReport) {
        let mut out = String::with_capacity(text.len());
        let mut hit = vec![false; self.pairs.len()];
        let mut rest = text;
        while let Some((at, index)) = self.next_match(rest) {
            let pair = &self.pairs[index];
            out.push_str(&rest[..at]);
            out.push_str(&pair.synthetic);
            rest = &rest[at + pair.real.len()..];
            hit[index] = true;
        }
        out.push_str(rest);

        let applied = self
            .pairs
            .iter()
            .zip(hit)
            .filter(|(_, hit)| *hit)
            .map(|(pair, _)| pair.kind)
            .collect();
        (out, ReplacementReport { applied })
    }

    /// Earliest occurrence of any real value. At equal offsets the longer value
    /// wins, then table order.
    fn next_match(&self, text: &str) -> Option<(usize, usize)> {
        self.pairs
            .iter()
            .enumerate()
            .filter_map(|(index, pair)| text.find(pair.real.as_str()).map(|at| (at, index)))
            .min_by(|a, b| {
                a.0.cmp(&b.0)
                    .then_with(|| self.pairs[b.1].real.len().cmp(&self.pairs[a.1].real.len()))
            })
    }

    /// JSON payloads come back as JSON when the rewritten text still parses.
    pub fn replace_payload(&self, payload: &Payload) -> (Payload, ReplacementReport) {
        let (text, report) = self.replace_text(&payload.to_text());
        let rewritten = match payload {
            Payload::Text(_) => Payload::Text(text),
            Payload::Json(_) => match serde_json::from_str(&text) {
                Ok(value) => Payload::Json(value),
                Err(_) => Payload::Text(text),
            },
        };
        if report.count() > 0 {
            info!(
                target: "network",
                replaced = report.count(),
                details = %self.describe(&report),
                "identity values replaced in payload"
            );
        }
        (rewritten, report)
    }

    /// Rewrites identity header values in place. Names match case-insensitively.
    pub fn rewrite_headers(&self, headers: &mut BTreeMap<String, String>) -> ReplacementReport {
        let mut report = ReplacementReport::default();
        for (name, value) in headers.iter_mut() {
            if !IDENTITY_HEADERS.iter().any(|h| h.eq_ignore_ascii_case(name)) {
                continue;
            }
            let (rewritten, header_report) = self.replace_text(value);
            *value = rewritten;
            report.merge(header_report);
        }
        report
    }

    fn describe(&self, report: &ReplacementReport) -> String {
        report
            .applied
            .iter()
            .filter_map(|kind| self.pairs.iter().find(|p| p.kind == *kind))
            .map(|p| format!("{}: {}... -> {}...", p.kind.label(), short(&p.real), short(&p.synthetic)))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
