// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Build-string matcher.
//
// Two policies exist and exactly one is active per classifier:
//
// - direct hit: any rule in `direct_rules` is decisive.
// - scored: a strong rule is decisive; otherwise weak signals are counted
//   and must reach `score_threshold`. A lone weak signal such as
//   manufacturer "unknown" is not enough.

use devprobe_core::{BasicPolicy, EnvironmentSnapshot, Signal};
use tracing::debug;

use crate::signatures::{Rule, SignatureDatabase};

/// Evaluate the snapshot under `policy`. `Some` means "virtual".
pub fn check(
    snapshot: &EnvironmentSnapshot,
    db: &SignatureDatabase,
    policy: BasicPolicy,
) -> Option<Signal> {
    match policy {
        BasicPolicy::DirectHit => check_direct(snapshot, db),
        BasicPolicy::Scored => check_scored(snapshot, db),
    }
}

/// First rule of `direct_rules` that matches, in table order.
pub fn check_direct(snapshot: &EnvironmentSnapshot, db: &SignatureDatabase) -> Option<Signal> {
    first_match(snapshot, db.direct_rules)
}

pub fn check_scored(snapshot: &EnvironmentSnapshot, db: &SignatureDatabase) -> Option<Signal> {
    if let Some(signal) = first_match(snapshot, db.strong_rules) {
        return Some(signal);
    }

    let score = score(snapshot, db);
    if score >= db.score_threshold {
        debug!(score, threshold = db.score_threshold, "weak build signals reached threshold");
        Some(Signal::Score {
            score,
            threshold: db.score_threshold,
        })
    } else {
        None
    }
}

/// Number of weak signals present in the snapshot.
pub fn score(snapshot: &EnvironmentSnapshot, db: &SignatureDatabase) -> u32 {
    db.weak_signals
        .iter()
        .filter(|signal| signal.matches(snapshot))
        .count() as u32
}

fn first_match(snapshot: &EnvironmentSnapshot, rules: &[Rule]) -> Option<Signal> {
    let rule = rules.iter().find(|rule| rule.matches(snapshot))?;
    let field = rule.primary_field()?;
    debug!(rule = rule.name, %field, "build rule matched");
    Some(Signal::Build {
        rule: rule.name.to_owned(),
        field,
    })
}
