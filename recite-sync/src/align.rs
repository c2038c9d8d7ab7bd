//! Positional alignment of fingerprint history against the current rows.
//!
//! Slot `i` pairs with row `i` and nothing else. Rows inserted or deleted
//! mid-column shift every later row out of alignment with its history, so
//! those rows are treated as changed on the next run.

use recite_core::types::Fingerprint;

/// One slot per current row: `history[i]` where it exists, empty otherwise.
/// History beyond the last row is dropped.
pub fn align<T>(rows: &[T], history: &[String]) -> Vec<Fingerprint> {
    (0..rows.len())
        .map(|i| {
            history
                .get(i)
                .map_or_else(Fingerprint::empty, |fp| Fingerprint::from(fp.as_str()))
        })
        .collect()
}
