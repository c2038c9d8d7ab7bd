//! `recite run` — one incremental pass over the source column.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Args};
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use recite_backends::Backends;
use recite_core::{config, RunConfig};
use recite_sync::{pipeline, RowOutcome, RunPlan, RunReport, SystemClock};

/// Arguments for `recite run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Config file (default: ./recite.yaml, then ~/.recite/config.yaml).
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Spreadsheet holding the text rows.
    #[arg(long)]
    pub sheet_id: Option<String>,

    /// Tab holding the text rows.
    #[arg(long)]
    pub tab: Option<String>,

    /// First cell of the text column, e.g. `A1`.
    #[arg(long, value_name = "CELL")]
    pub range: Option<String>,

    /// Spreadsheet holding the fingerprint history (default: --sheet-id).
    #[arg(long)]
    pub history_sheet_id: Option<String>,

    /// Tab holding the fingerprint history.
    #[arg(long)]
    pub history_tab: Option<String>,

    /// First cell of the fingerprint column, e.g. `L1`.
    #[arg(long, value_name = "CELL")]
    pub history_range: Option<String>,

    /// Report what would happen without synthesizing, uploading, or writing.
    #[arg(long, action = ArgAction::Set, value_name = "BOOL")]
    pub dry_run: Option<bool>,

    /// Reprocess every non-empty row regardless of history.
    #[arg(long)]
    pub force: bool,

    /// Emit the run report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl RunArgs {
    pub fn run(self) -> Result<()> {
        let mut config =
            config::load(self.config.as_deref()).context("failed to load run config")?;
        self.apply_overrides(&mut config);
        config.validate().context("invalid run config")?;

        let plan = RunPlan::from_config(&config);
        if plan.options.dry_run {
            tracing::info!("[dry-run] no audio will be synthesized and no sheet will be written");
        }

        let backends = Backends::from_config(&config.backend);
        let clock = SystemClock;
        let report = pipeline::run(&plan, backends.collaborators(&clock)).map_err(|err| {
            let context = format!(
                "run failed at {} step for {} in sheet {}",
                err.operation(),
                plan.source.a1_notation(),
                plan.source.sheet_id
            );
            anyhow::Error::new(err).context(context)
        })?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to serialize run report")?
            );
            return Ok(());
        }
        print_report(&report);
        Ok(())
    }

    fn apply_overrides(&self, config: &mut RunConfig) {
        if let Some(id) = &self.sheet_id {
            config.source.sheet_id = id.clone();
        }
        if let Some(tab) = &self.tab {
            config.source.tab = tab.clone();
        }
        if let Some(cell) = &self.range {
            config.source.start_cell = cell.clone();
        }
        if let Some(id) = &self.history_sheet_id {
            config.history.sheet_id = Some(id.clone());
        }
        if let Some(tab) = &self.history_tab {
            config.history.tab = tab.clone();
        }
        if let Some(cell) = &self.history_range {
            config.history.start_cell = cell.clone();
        }
        if let Some(dry_run) = self.dry_run {
            config.dry_run = dry_run;
        }
        if self.force {
            config.force_reprocess = true;
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Tabled)]
struct OutcomeRow {
    #[tabled(rename = "row")]
    row: usize,
    #[tabled(rename = "outcome")]
    outcome: String,
    #[tabled(rename = "fingerprint")]
    fingerprint: String,
    #[tabled(rename = "artifact")]
    artifact: String,
}

fn print_report(report: &RunReport) {
    let prefix = if report.dry_run { "[dry-run] " } else { "" };

    if report.outcomes.is_empty() {
        println!("{prefix}✓ no rows in source column — nothing to do");
        return;
    }

    let rows: Vec<OutcomeRow> = report.outcomes.iter().map(outcome_row).collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    let verb = if report.dry_run {
        "would process"
    } else {
        "processed"
    };
    println!(
        "{prefix}✓ {} {verb}, {} unchanged, {} empty",
        report.processed_count(),
        report.unchanged_count(),
        report.empty_count()
    );
    if let Some(destination) = &report.destination {
        println!("  uploaded to {destination}");
    }
    match report.cells_persisted {
        Some(cells) => println!("  {cells} fingerprint cell(s) written"),
        None => println!("{prefix}fingerprints not written"),
    }
}

fn outcome_row(outcome: &RowOutcome) -> OutcomeRow {
    let (fingerprint, artifact) = match outcome {
        RowOutcome::Empty { .. } => (String::new(), String::new()),
        RowOutcome::Unchanged { fingerprint, .. } => (fingerprint.to_string(), String::new()),
        RowOutcome::Processed {
            fingerprint,
            artifact,
            ..
        }
        | RowOutcome::WouldProcess {
            fingerprint,
            artifact,
            ..
        } => (fingerprint.to_string(), artifact.clone()),
    };
    OutcomeRow {
        row: outcome.row() + 1,
        outcome: outcome_label(outcome),
        fingerprint,
        artifact,
    }
}

fn outcome_label(outcome: &RowOutcome) -> String {
    let label = outcome.label();
    match outcome {
        RowOutcome::Processed { .. } => label.green().bold().to_string(),
        RowOutcome::WouldProcess { .. } => label.yellow().bold().to_string(),
        RowOutcome::Unchanged { .. } => label.bright_black().to_string(),
        RowOutcome::Empty { .. } => label.bright_black().to_string(),
    }
}
