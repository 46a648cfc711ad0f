//! Markdown export
//!
//! Plain Markdown rendering of a project's latest analysis and
//! conversation tail. Anything fancier than Markdown stays out of scope.

use gardener_domain::entities::{AnalysisReport, ConversationMessage, Project};

/// Render an export document.
#[must_use]
pub fn render_markdown(
    project: &Project,
    report: Option<&AnalysisReport>,
    recent: &[ConversationMessage],
) -> String {
    let mut out = format!("# Project: {}\n\n", project.name);
    out.push_str(&format!("- id: `{}`\n", project.id));
    out.push_str(&format!("- source: `{}`\n", project.source_path.display()));
    out.push_str(&format!("- training status: {}\n", project.training_status));
    out.push_str(&format!(
        "- last updated: {}\n\n",
        project.last_updated.to_rfc3339()
    ));

    if let Some(report) = report {
        out.push_str("## Last analysis\n\n");
        out.push_str(&format!("- tier: {}\n", report.tier));
        out.push_str(&format!("- files: {}\n", report.file_count));
        out.push_str(&format!(
            "- chunks: {} ({} embedded)\n",
            report.chunk_count, report.embedded_count
        ));
        out.push_str(&format!(
            "- training scheduled: {}\n\n",
            report.training_scheduled
        ));

        if !report.language_histogram.is_empty() {
            out.push_str("### Languages\n\n");
            for (language, count) in &report.language_histogram {
                out.push_str(&format!("- {language}: {count}\n"));
            }
            out.push('\n');
        }

        out.push_str("### Capabilities\n\n");
        for (name, available) in &report.capabilities.features {
            let mark = if *available { "yes" } else { "no" };
            out.push_str(&format!("- {name}: {mark}\n"));
        }
        out.push('\n');

        if !report.warnings.is_empty() {
            out.push_str("### Warnings\n\n");
            for warning in &report.warnings {
                out.push_str(&format!("- {warning}\n"));
            }
            out.push('\n');
        }

        if !report.failures.is_empty() {
            out.push_str("### Skipped files\n\n");
            for failure in &report.failures {
                out.push_str(&format!("- `{}`: {}\n", failure.path, failure.message));
            }
            out.push('\n');
        }
    } else {
        out.push_str("_No analysis recorded yet._\n\n");
    }

    if !recent.is_empty() {
        out.push_str("## Recent conversation\n\n");
        for message in recent {
            out.push_str(&format!(
                "**{}** ({}):\n\n{}\n\n",
                message.role,
                message.timestamp.to_rfc3339(),
                message.content
            ));
        }
    }
    out
}
