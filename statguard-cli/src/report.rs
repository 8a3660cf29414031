//! Markdown summary of an anomaly report.

use askama::Template;
use statguard_core::artifact::Artifact;
use statguard_core::validation::{AnomalyReport, Severity};
use statguard_core::{Result, StatguardError};

struct AnomalyRow {
    target: String,
    kind: String,
    severity: String,
    description: String,
}

#[derive(Template)]
#[template(
    ext = "md",
    source = "# Validation report: {{ dataset }}

- Run: `{{ run_id }}`
- Produced: {{ produced_at }}
- Status: **{{ status }}**
- Anomalies: {{ rows.len() }} ({{ errors }} errors, {{ warnings }} warnings)
{% if rows.is_empty() %}
No anomalies detected.
{% else %}
| Target | Kind | Severity | Description |
|--------|------|----------|-------------|
{% for row in rows -%}
| {{ row.target }} | {{ row.kind }} | {{ row.severity }} | {{ row.description }} |
{% endfor -%}
{% endif %}"
)]
struct MarkdownReport<'a> {
    dataset: &'a str,
    run_id: String,
    produced_at: String,
    status: &'static str,
    errors: usize,
    warnings: usize,
    rows: Vec<AnomalyRow>,
}

fn table_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

/// Renders the report artifact as a Markdown summary.
///
/// `dataset` names the validated input in the heading.
pub fn render_markdown(artifact: &Artifact<AnomalyReport>, dataset: &str) -> Result<String> {
    let report = artifact.payload();
    let rows = report
        .iter()
        .map(|anomaly| AnomalyRow {
            target: table_cell(anomaly.target()),
            kind: anomaly.kind.to_string(),
            severity: anomaly.severity.to_string(),
            description: table_cell(&anomaly.description),
        })
        .collect();

    let template = MarkdownReport {
        dataset,
        run_id: artifact.run_id.to_string(),
        produced_at: artifact.produced_at.to_rfc3339(),
        status: if report.has_blocking_anomaly() {
            "BLOCKED"
        } else {
            "PASSED"
        },
        errors: report.count_by_severity(Severity::Error),
        warnings: report.count_by_severity(Severity::Warning),
        rows,
    };

    template
        .render()
        .map_err(|e| StatguardError::configuration(format!("Markdown rendering failed: {}", e)))
}
