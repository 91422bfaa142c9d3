//! Aggregation of per-entry results into a single report.

use std::fmt;

use serde::Serialize;

use postbox_manifest::EntryIssue;

use crate::error::EntryError;

/// Remote operation performed for an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Operation {
    Validate,
    Fetch,
    Create,
    Update,
    Pull,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operation::Validate => "validate",
            Operation::Fetch => "fetch",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Pull => "pull",
        };
        write!(f, "{}", s)
    }
}

/// Settled result of one dispatched operation.
#[derive(Debug)]
pub struct EntryOutcome {
    pub name: String,
    pub alias: String,
    pub operation: Operation,
    /// Validation messages on success (empty means valid), or the failure.
    pub result: Result<Vec<String>, EntryError>,
}

impl EntryOutcome {
    pub fn new(
        name: impl Into<String>,
        alias: impl Into<String>,
        operation: Operation,
        result: Result<Vec<String>, EntryError>,
    ) -> Self {
        Self {
            name: name.into(),
            alias: alias.into(),
            operation,
            result,
        }
    }
}

/// One failing line of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub name: String,
    pub alias: String,
    pub message: String,
}

impl ReportRow {
    pub fn new(name: impl Into<String>, alias: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: alias.into(),
            message: message.into(),
        }
    }
}

impl From<&EntryIssue> for ReportRow {
    fn from(issue: &EntryIssue) -> Self {
        ReportRow::new(issue.name.clone(), issue.alias.clone(), issue.message())
    }
}

/// Per-entry summary kept in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryResult {
    pub name: String,
    pub alias: String,
    pub operation: Operation,
    pub success: bool,
}

/// Consolidated outcome of one command.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AggregateReport {
    /// Dispatched operations that succeeded without messages
    pub success_count: usize,
    /// Dispatched operations that failed or returned messages
    pub failed_count: usize,
    /// Entries that needed no remote call
    pub skipped_count: usize,
    pub rows: Vec<ReportRow>,
    pub entries: Vec<EntryResult>,
}

impl AggregateReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// The run succeeded only if nothing produced a row.
    pub fn is_success(&self) -> bool {
        self.rows.is_empty()
    }

    /// Add rows found before dispatch. They are listed ahead of remote rows.
    pub fn prepend_rows(&mut self, rows: impl IntoIterator<Item = ReportRow>) {
        let mut local: Vec<ReportRow> = rows.into_iter().collect();
        local.append(&mut self.rows);
        self.rows = local;
    }

    pub fn record_skipped(&mut self, count: usize) {
        self.skipped_count += count;
    }

    /// Fold settled outcomes into the report, keeping their order.
    pub fn absorb(&mut self, outcomes: impl IntoIterator<Item = EntryOutcome>) {
        for outcome in outcomes {
            let rows: Vec<String> = match outcome.result {
                Ok(messages) => messages,
                Err(e) => vec![e.to_string()],
            };
            let success = rows.is_empty();

            if success {
                self.success_count += 1;
            } else {
                self.failed_count += 1;
            }

            self.rows.extend(
                rows.into_iter()
                    .map(|message| ReportRow::new(&outcome.name, &outcome.alias, message)),
            );
            self.entries.push(EntryResult {
                name: outcome.name,
                alias: outcome.alias,
                operation: outcome.operation,
                success,
            });
        }
    }
}

/// Build a report from settled outcomes.
pub fn aggregate(outcomes: impl IntoIterator<Item = EntryOutcome>) -> AggregateReport {
    let mut report = AggregateReport::new();
    report.absorb(outcomes);
    report
}
