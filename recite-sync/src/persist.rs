//! Persistence sink: the single fingerprint write at the end of a live run.

use recite_core::types::{Fingerprint, SheetRange};

use crate::backend::TabularStore;
use crate::error::PipelineError;

/// Overwrite `range` positionally with `slots` and return the number of
/// cells updated.
///
/// Cells below the last slot are left as they are; the next run's alignment
/// drops them.
pub fn persist(
    store: &dyn TabularStore,
    range: &SheetRange,
    slots: &[Fingerprint],
) -> Result<usize, PipelineError> {
    let values: Vec<String> = slots.iter().map(|fp| fp.0.clone()).collect();
    tracing::info!(
        "writing {} fingerprint(s) to {} in sheet {}",
        values.len(),
        range.a1_notation(),
        range.sheet_id
    );
    let updated = store
        .write(range, &values)
        .map_err(|source| PipelineError::Persist {
            sheet_id: range.sheet_id.clone(),
            range: range.a1_notation(),
            source,
        })?;
    tracing::info!("updated {updated} cell(s) in sheet {}", range.sheet_id);
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use crate::error::BackendError;

    #[derive(Default)]
    struct Sheet {
        writes: RefCell<Vec<(String, Vec<String>)>>,
        fail: bool,
    }

    impl TabularStore for Sheet {
        fn read(&self, _range: &SheetRange) -> Result<Vec<String>, BackendError> {
            Ok(vec![])
        }

        fn write(&self, range: &SheetRange, values: &[String]) -> Result<usize, BackendError> {
            if self.fail {
                return Err(BackendError::Auth("token expired".to_string()));
            }
            self.writes
                .borrow_mut()
                .push((range.a1_notation(), values.to_vec()));
            Ok(values.len())
        }
    }

    #[test]
    fn writes_every_slot_including_empty_ones() {
        let sheet = Sheet::default();
        let range = SheetRange::new("sums", "Sheet1", "L1");
        let slots = vec![
            Fingerprint::from("32955b2a"),
            Fingerprint::empty(),
            Fingerprint::from("c3253f9c"),
        ];

        let updated = persist(&sheet, &range, &slots).expect("persist");
        assert_eq!(updated, 3);
        let writes = sheet.writes.borrow();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].0, "Sheet1!L1:L");
        assert_eq!(writes[0].1, vec!["32955b2a", "", "c3253f9c"]);
    }

    #[test]
    fn failure_maps_to_persist_error_with_sheet_context() {
        let sheet = Sheet {
            fail: true,
            ..Sheet::default()
        };
        let range = SheetRange::new("sums", "Checksums", "B2");
        let err = persist(&sheet, &range, &[Fingerprint::from("00000000")]).unwrap_err();
        match err {
            PipelineError::Persist {
                sheet_id, range, ..
            } => {
                assert_eq!(sheet_id, "sums");
                assert_eq!(range, "Checksums!B2:B");
            }
            other => panic!("expected persist error, got {other:?}"),
        }
    }
}
