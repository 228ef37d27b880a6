//! Ordered substring rules for turning raw WHOIS text into a status.
//!
//! Registries answer in free-form prose, so classification is a table of
//! case-insensitive needle checks per registry group. Rows are evaluated
//! top to bottom and the first hit wins; a response no row matches is
//! inconclusive, not an error.

use crate::status::DomainStatus;

/// Case-insensitive substring test against a WHOIS response.
#[derive(Debug, Clone, Copy)]
pub enum Predicate {
    /// True when any needle occurs in the response.
    Any(&'static [&'static str]),
    /// True when every inner predicate holds.
    All(&'static [Predicate]),
}

impl Predicate {
    fn matches(&self, haystack: &str) -> bool {
        match self {
            Predicate::Any(needles) => needles.iter().any(|needle| haystack.contains(needle)),
            Predicate::All(inner) => inner.iter().all(|predicate| predicate.matches(haystack)),
        }
    }
}

/// One row of a classification table.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub when: Predicate,
    pub then: DomainStatus,
}

/// Ordered classification rules for a group of TLDs.
#[derive(Debug, Clone, Copy)]
pub struct RuleSet {
    pub tlds: &'static [&'static str],
    pub rules: &'static [Rule],
}

// The .it registry reports a machine-readable Status: line.
const IT_RULES: &[Rule] = &[
    Rule {
        when: Predicate::Any(&["status: available"]),
        then: DomainStatus::Available,
    },
    Rule {
        when: Predicate::Any(&["status: ok", "status: active"]),
        then: DomainStatus::Registered,
    },
    Rule {
        when: Predicate::Any(&["status: pendingdelete"]),
        then: DomainStatus::PendingDelete,
    },
    Rule {
        when: Predicate::Any(&["status: redemptionperiod"]),
        then: DomainStatus::Redemption,
    },
    Rule {
        when: Predicate::Any(&["status: inactive"]),
        then: DomainStatus::Inactive,
    },
];

// Verisign's thin WHOIS for com/net. A bare "Domain Name:" echo is not
// proof of registration, so that row also requires a registrar or
// nameserver line.
const VERISIGN_RULES: &[Rule] = &[
    Rule {
        when: Predicate::Any(&["no match for"]),
        then: DomainStatus::Available,
    },
    Rule {
        when: Predicate::All(&[
            Predicate::Any(&["domain name:"]),
            Predicate::Any(&["name server:", "registrar:"]),
        ]),
        then: DomainStatus::Registered,
    },
    Rule {
        when: Predicate::Any(&["pendingdelete"]),
        then: DomainStatus::PendingDelete,
    },
    Rule {
        when: Predicate::Any(&["redemptionperiod"]),
        then: DomainStatus::Redemption,
    },
];

// Phrases most registries use, tried when no registry-specific table
// claims the TLD.
const GENERIC_RULES: &[Rule] = &[
    Rule {
        when: Predicate::Any(&["no match", "not found", "status: free"]),
        then: DomainStatus::Available,
    },
    Rule {
        when: Predicate::Any(&["registered", "status: active"]),
        then: DomainStatus::Registered,
    },
    Rule {
        when: Predicate::Any(&["pending delete"]),
        then: DomainStatus::PendingDelete,
    },
    Rule {
        when: Predicate::Any(&["redemption"]),
        then: DomainStatus::Redemption,
    },
    Rule {
        when: Predicate::Any(&["reserved"]),
        then: DomainStatus::Reserved,
    },
    Rule {
        when: Predicate::Any(&["error"]),
        then: DomainStatus::Error,
    },
];

const RULE_SETS: &[RuleSet] = &[
    RuleSet {
        tlds: &["it"],
        rules: IT_RULES,
    },
    RuleSet {
        tlds: &["com", "net"],
        rules: VERISIGN_RULES,
    },
];

/// Classifies raw WHOIS responses. Pure and deterministic: the same text
/// and TLD always produce the same status.
#[derive(Debug, Clone, Copy, Default)]
pub struct Classifier;

impl Classifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify a raw response for a domain under the given TLD.
    ///
    /// The first matching rule wins. No match means the verdict is
    /// `Unknown`.
    pub fn classify(&self, tld: &str, response: &str) -> DomainStatus {
        let haystack = response.to_lowercase();
        let tld = tld.to_lowercase();

        for rule in rules_for(&tld) {
            if rule.when.matches(&haystack) {
                return rule.then;
            }
        }

        DomainStatus::Unknown
    }
}

/// The rule table for a TLD: a registry-specific one when it exists,
/// otherwise the generic table.
fn rules_for(tld: &str) -> &'static [Rule] {
    RULE_SETS
        .iter()
        .find(|set| set.tlds.iter().any(|candidate| *candidate == tld))
        .map(|set| set.rules)
        .unwrap_or(GENERIC_RULES)
}
