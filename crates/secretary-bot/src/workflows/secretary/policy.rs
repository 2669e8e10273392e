use std::collections::BTreeSet;

use serde::Serialize;

/// Rule deciding which candidates get appointed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "alliances")]
pub enum AdmissionPolicy {
    /// Accept every candidate without reading their alliance tag.
    Open,
    /// Accept only candidates whose alliance tag is an exact, case-sensitive member.
    Whitelist(BTreeSet<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionDecision {
    Accept,
    Reject,
}

impl AdmissionPolicy {
    pub fn whitelist<I, S>(alliances: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Whitelist(alliances.into_iter().map(Into::into).collect())
    }

    pub fn decide(&self, alliance: &str) -> AdmissionDecision {
        match self {
            AdmissionPolicy::Open => AdmissionDecision::Accept,
            AdmissionPolicy::Whitelist(alliances) if alliances.contains(alliance) => {
                AdmissionDecision::Accept
            }
            AdmissionPolicy::Whitelist(_) => AdmissionDecision::Reject,
        }
    }
}
