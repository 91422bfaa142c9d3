//! Console rendering of plans and reports.

use postbox_sync::{AggregateReport, PlannedEntry, SyncDecision, SyncPlan};

pub fn pluralize<'a>(count: usize, singular: &'a str, plural: &'a str) -> &'a str {
    if count == 1 {
        singular
    } else {
        plural
    }
}

/// Render rows as a bordered text table.
pub fn render_table(header: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let separator = format!(
        "+{}+",
        widths
            .iter()
            .map(|w| "-".repeat(w + 2))
            .collect::<Vec<_>>()
            .join("+")
    );
    let line = |cells: Vec<&str>| {
        let padded: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(i, w)| format!(" {:<width$} ", cells.get(i).copied().unwrap_or(""), width = w))
            .collect();
        format!("|{}|", padded.join("|"))
    };

    let mut out = vec![separator.clone(), line(header.to_vec()), separator.clone()];
    for row in rows {
        out.push(line(row.iter().map(String::as_str).collect()));
    }
    out.push(separator);
    out.join("\n")
}

/// Print the failing rows of a report.
pub fn print_report(report: &AggregateReport) {
    let rows: Vec<Vec<String>> = report
        .rows
        .iter()
        .map(|r| vec![r.name.clone(), r.alias.clone(), r.message.clone()])
        .collect();

    println!(
        "\n{} {}",
        rows.len(),
        pluralize(rows.len(), "problem", "problems")
    );
    println!("{}", render_table(&["Name", "Alias", "Error"], &rows));
}

/// Print which templates and layouts will change.
pub fn print_plan(plan: &SyncPlan, dry_run: bool) {
    let changed: Vec<&PlannedEntry> = plan
        .entries
        .iter()
        .filter(|e| e.decision != SyncDecision::Skip)
        .collect();

    if changed.is_empty() {
        println!("There are no changes to push.");
        return;
    }

    let (layouts, templates): (Vec<&PlannedEntry>, Vec<&PlannedEntry>) =
        changed.into_iter().partition(|e| e.entry.is_layout());

    for (label, group) in [("Layouts", layouts), ("Templates", templates)] {
        if group.is_empty() {
            continue;
        }
        let rows: Vec<Vec<String>> = group
            .iter()
            .map(|e| {
                vec![
                    e.entry
                        .status
                        .map(|s| s.to_string())
                        .unwrap_or_default(),
                    e.entry.name.clone(),
                    e.entry.alias.clone(),
                    e.decision.to_string(),
                ]
            })
            .collect();
        println!("\n{}", label);
        println!("{}", render_table(&["Change", "Name", "Alias", "Action"], &rows));
    }

    let writes = plan.writes().count();
    let verb = if dry_run { "would be pushed" } else { "will be pushed" };
    println!(
        "\n{} {} {}",
        writes,
        pluralize(writes, "template", "templates"),
        verb
    );
}

pub fn print_push_summary(report: &AggregateReport) {
    println!(
        "✅ Pushed {} {}",
        report.success_count,
        pluralize(report.success_count, "template", "templates")
    );
}
