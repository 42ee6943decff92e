//! End-of-run recap.

use crate::ui::{format_duration, UserInterface};

use super::run::{script_error, PhaseStatus, PhaseTally, RunSummary};

/// Commands suggested after a failed run.
pub const RECOVERY_STEPS: [(&str, &str); 3] = [
    ("omniforge run", "resume; completed scripts are skipped"),
    ("omniforge run --force", "re-run every script"),
    (
        "omniforge reset && omniforge run",
        "clear recorded state, then start over",
    ),
];

/// `Phase N: ok=X fail=Y skip=Z`
pub fn phase_line(tally: &PhaseTally) -> String {
    let line = format!(
        "Phase {}: ok={} fail={} skip={}",
        tally.id, tally.ok, tally.fail, tally.skip
    );
    if tally.status == PhaseStatus::Disabled {
        format!("{} (disabled)", line)
    } else {
        line
    }
}

/// Headline for the recap.
pub fn headline(summary: &RunSummary) -> String {
    let prefix = if summary.mode.is_dry_run() {
        "[dry-run] "
    } else {
        ""
    };
    let verdict = if summary.success {
        "Run complete"
    } else if summary.aborted {
        "Run aborted"
    } else {
        "Run finished with errors"
    };
    format!(
        "{}{}: {} succeeded, {} failed, {} skipped ({})",
        prefix,
        verdict,
        summary.completed,
        summary.failed,
        summary.skipped,
        format_duration(summary.duration)
    )
}

/// Recovery guidance lines, empty for a successful run.
pub fn recovery_lines(summary: &RunSummary) -> Vec<String> {
    if summary.success {
        return Vec::new();
    }
    let width = RECOVERY_STEPS
        .iter()
        .map(|(cmd, _)| cmd.len())
        .max()
        .unwrap_or(0);
    RECOVERY_STEPS
        .iter()
        .map(|(cmd, what)| format!("  {:<width$}  {}", cmd, what, width = width))
        .collect()
}

/// Print the recap through the UI.
pub fn print_recap(ui: &mut dyn UserInterface, summary: &RunSummary) {
    ui.message("");
    for tally in &summary.per_phase {
        ui.message(&phase_line(tally));
    }

    if !summary.failed_scripts.is_empty() {
        ui.message("");
        ui.message("Failed scripts:");
        for failed in &summary.failed_scripts {
            ui.error(&format!(
                "  [phase {}] {}",
                failed.phase,
                failed.result.summary_line()
            ));
        }
    }

    let other_errors: Vec<_> = summary
        .errors
        .iter()
        .filter(|e| {
            !summary
                .failed_scripts
                .iter()
                .any(|f| **e == script_error(f.phase, &f.result))
        })
        .collect();
    if !other_errors.is_empty() {
        ui.message("");
        ui.message("Errors:");
        for e in other_errors {
            ui.error(&format!("  {}", e));
        }
    }

    for warning in &summary.warnings {
        ui.warning(warning);
    }

    ui.message("");
    if summary.success {
        ui.success(&headline(summary));
    } else {
        ui.error(&headline(summary));
        ui.message("");
        ui.message("To recover:");
        for line in recovery_lines(summary) {
            ui.message(&line);
        }
    }
}
