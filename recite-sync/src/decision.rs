//! Change decision: does a row need (re)synthesis?
//!
//! Classification precedence:
//! 1. `Empty` (zero-length row; never synthesized, even when forced)
//! 2. `Changed` (force flag set, or fingerprint differs from history)
//! 3. `Unchanged`

use recite_core::types::Fingerprint;

use crate::fingerprint::fingerprint;

/// Pure predicate: process when forced or when the fingerprints differ.
pub fn should_process(current: &Fingerprint, prior: &Fingerprint, force: bool) -> bool {
    force || current != prior
}

/// Per-row classification, carrying the row's current fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowDecision {
    Empty,
    Unchanged { fingerprint: Fingerprint },
    Changed { fingerprint: Fingerprint },
}

/// Classify one row against its aligned history slot.
pub fn classify(row: &str, prior: &Fingerprint, force: bool) -> RowDecision {
    if row.is_empty() {
        return RowDecision::Empty;
    }
    let current = fingerprint(row);
    if should_process(&current, prior, force) {
        RowDecision::Changed {
            fingerprint: current,
        }
    } else {
        RowDecision::Unchanged {
            fingerprint: current,
        }
    }
}
