//! Run orchestration.
//!
//! ## `run` per-run protocol
//!
//! 1. Read the source column, then the history column.
//! 2. Align history to the rows (one slot per row).
//! 3. For each row, in order: classify → (live) synthesize → ensure the run
//!    folder → upload `{fingerprint}.{ext}` → update the slot.
//! 4. Live runs only: write all slots back to the history column.
//!
//! Any collaborator failure ends the run at step 3 or 4. Later rows are never
//! classified and the slots are never persisted.

use serde::Serialize;

use recite_core::{
    types::{ContainerId, Fingerprint, SheetRange, SynthesisSettings},
    RunConfig,
};

use crate::align::align;
use crate::backend::{BlobStore, SpeechSynthesizer, TabularStore};
use crate::clock::{destination_name, Clock};
use crate::decision::{classify, RowDecision};
use crate::error::PipelineError;
use crate::persist::persist;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Mode flags for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Walk every decision but call no synthesizer, storage, or write.
    pub dry_run: bool,
    /// Treat every non-empty row as changed.
    pub force: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            dry_run: true,
            force: false,
        }
    }
}

/// Everything a run needs besides its collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    pub source: SheetRange,
    pub history: SheetRange,
    pub settings: SynthesisSettings,
    pub options: RunOptions,
}

impl RunPlan {
    pub fn from_config(config: &RunConfig) -> Self {
        Self {
            source: config.source_range(),
            history: config.history_range(),
            settings: config.synthesis.clone(),
            options: RunOptions {
                dry_run: config.dry_run,
                force: config.force_reprocess,
            },
        }
    }
}

/// The external services a run talks to.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub store: &'a dyn TabularStore,
    pub synthesizer: &'a dyn SpeechSynthesizer,
    pub storage: &'a dyn BlobStore,
    pub clock: &'a dyn Clock,
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Outcome of an individual row. `row` is 0-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum RowOutcome {
    /// Zero-length row; nothing to do.
    Empty { row: usize },
    /// Fingerprint matches history.
    #[serde(rename = "skipped-unchanged")]
    Unchanged { row: usize, fingerprint: Fingerprint },
    /// Synthesized and uploaded.
    Processed {
        row: usize,
        fingerprint: Fingerprint,
        artifact: String,
    },
    /// Dry run: would have been synthesized and uploaded.
    WouldProcess {
        row: usize,
        fingerprint: Fingerprint,
        artifact: String,
    },
}

impl RowOutcome {
    pub fn row(&self) -> usize {
        match self {
            RowOutcome::Empty { row }
            | RowOutcome::Unchanged { row, .. }
            | RowOutcome::Processed { row, .. }
            | RowOutcome::WouldProcess { row, .. } => *row,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RowOutcome::Empty { .. } => "empty",
            RowOutcome::Unchanged { .. } => "skipped-unchanged",
            RowOutcome::Processed { .. } => "processed",
            RowOutcome::WouldProcess { .. } => "would-process",
        }
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub dry_run: bool,
    /// The run folder, if any row was processed live.
    pub destination: Option<ContainerId>,
    pub outcomes: Vec<RowOutcome>,
    /// Final slot values (what was, or in a dry run would have been, persisted).
    pub fingerprints: Vec<Fingerprint>,
    /// Cells updated by the final write; `None` for dry runs.
    pub cells_persisted: Option<usize>,
}

impl RunReport {
    /// Rows synthesized, or that would have been in a dry run.
    pub fn processed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| {
                matches!(
                    o,
                    RowOutcome::Processed { .. } | RowOutcome::WouldProcess { .. }
                )
            })
            .count()
    }

    pub fn unchanged_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, RowOutcome::Unchanged { .. }))
            .count()
    }

    pub fn empty_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, RowOutcome::Empty { .. }))
            .count()
    }
}

// ---------------------------------------------------------------------------
// RunContext
// ---------------------------------------------------------------------------

/// Mutable state of one run: the working fingerprint slots and the lazily
/// created destination folder.
pub struct RunContext<'a> {
    collaborators: Collaborators<'a>,
    settings: &'a SynthesisSettings,
    options: RunOptions,
    slots: Vec<Fingerprint>,
    destination: Option<ContainerId>,
    outcomes: Vec<RowOutcome>,
}

impl<'a> RunContext<'a> {
    pub fn new(
        collaborators: Collaborators<'a>,
        settings: &'a SynthesisSettings,
        options: RunOptions,
        slots: Vec<Fingerprint>,
    ) -> Self {
        Self {
            collaborators,
            settings,
            options,
            slots,
            destination: None,
            outcomes: Vec::new(),
        }
    }

    pub fn slots(&self) -> &[Fingerprint] {
        &self.slots
    }

    pub fn destination(&self) -> Option<&ContainerId> {
        self.destination.as_ref()
    }

    /// Decide and, if needed, process row `index`.
    ///
    /// `index` must be within the slots the context was created with.
    pub fn process_row(&mut self, index: usize, text: &str) -> Result<RowOutcome, PipelineError> {
        let prior = self.slots.get(index).cloned().unwrap_or_default();
        let outcome = match classify(text, &prior, self.options.force) {
            RowDecision::Empty => {
                tracing::debug!("{:05} - empty row, nothing to do", index + 1);
                RowOutcome::Empty { row: index }
            }
            RowDecision::Unchanged { fingerprint } => {
                tracing::debug!(
                    "{:05} - unchanged since last run, skipping: {}",
                    index + 1,
                    preview(text)
                );
                RowOutcome::Unchanged {
                    row: index,
                    fingerprint,
                }
            }
            RowDecision::Changed { fingerprint } => {
                let artifact = self.settings.encoding.artifact_name(&fingerprint);
                let outcome = if self.options.dry_run {
                    tracing::info!(
                        "[dry-run] {:05} - would write {artifact}: {}",
                        index + 1,
                        preview(text)
                    );
                    RowOutcome::WouldProcess {
                        row: index,
                        fingerprint: fingerprint.clone(),
                        artifact,
                    }
                } else {
                    self.synthesize_and_upload(index, text, &artifact)?;
                    tracing::info!("{:05} - wrote {artifact}: {}", index + 1, preview(text));
                    RowOutcome::Processed {
                        row: index,
                        fingerprint: fingerprint.clone(),
                        artifact,
                    }
                };
                if let Some(slot) = self.slots.get_mut(index) {
                    *slot = fingerprint;
                }
                outcome
            }
        };
        self.outcomes.push(outcome.clone());
        Ok(outcome)
    }

    fn synthesize_and_upload(
        &mut self,
        index: usize,
        text: &str,
        artifact: &str,
    ) -> Result<(), PipelineError> {
        let request = self.settings.request(text);
        let audio = self
            .collaborators
            .synthesizer
            .synthesize(&request)
            .map_err(|source| PipelineError::Synthesis { row: index, source })?;

        let container = self.ensure_destination()?;
        self.collaborators
            .storage
            .upload(
                &container,
                artifact,
                &audio,
                self.settings.encoding.mime_type(),
            )
            .map_err(|source| PipelineError::Upload {
                row: index,
                object: artifact.to_string(),
                source,
            })
    }

    /// The run folder, created on first use.
    fn ensure_destination(&mut self) -> Result<ContainerId, PipelineError> {
        if let Some(id) = &self.destination {
            return Ok(id.clone());
        }
        let name = destination_name(self.collaborators.clock.now_local());
        let id = self
            .collaborators
            .storage
            .create_container(&name)
            .map_err(|source| PipelineError::Destination {
                name: name.clone(),
                source,
            })?;
        tracing::info!("created output folder {name} ({id})");
        self.destination = Some(id.clone());
        Ok(id)
    }

    pub fn into_report(self, cells_persisted: Option<usize>) -> RunReport {
        RunReport {
            dry_run: self.options.dry_run,
            destination: self.destination,
            outcomes: self.outcomes,
            fingerprints: self.slots,
            cells_persisted,
        }
    }
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

/// Execute one full run.
///
/// This is the canonical entrypoint used by `recite run`.
pub fn run(plan: &RunPlan, collaborators: Collaborators<'_>) -> Result<RunReport, PipelineError> {
    let rows = read_column(collaborators.store, &plan.source)?;
    let history = read_column(collaborators.store, &plan.history)?;
    tracing::info!(
        "read {} row(s) and {} fingerprint(s)",
        rows.len(),
        history.len()
    );
    if plan.options.force {
        tracing::info!("force reprocess set; every non-empty row will be synthesized");
    }

    let slots = align(&rows, &history);
    let mut ctx = RunContext::new(collaborators, &plan.settings, plan.options, slots);
    for (index, text) in rows.iter().enumerate() {
        ctx.process_row(index, text)?;
    }

    let cells_persisted = if plan.options.dry_run {
        tracing::info!(
            "[dry-run] not writing fingerprints to sheet {}",
            plan.history.sheet_id
        );
        None
    } else {
        Some(persist(collaborators.store, &plan.history, ctx.slots())?)
    };

    Ok(ctx.into_report(cells_persisted))
}

fn read_column(store: &dyn TabularStore, range: &SheetRange) -> Result<Vec<String>, PipelineError> {
    let values = store.read(range).map_err(|source| PipelineError::Read {
        sheet_id: range.sheet_id.clone(),
        range: range.a1_notation(),
        source,
    })?;
    if values.is_empty() {
        tracing::info!("no data in {} of sheet {}", range.a1_notation(), range.sheet_id);
    }
    Ok(values)
}

/// First 15 characters of a row, for log lines.
pub(crate) fn preview(text: &str) -> String {
    text.chars().take(15).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
