//! SQL import results.

use serde::Serialize;
use utoipa::ToSchema;

use crate::services::sql_script::ImportMode;

/// A statement the database rejected during an import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct StatementFailure {
    /// Statement text, truncated
    pub statement: String,
    /// Driver error message
    pub error: String,
}

/// Outcome of a full pass over an imported script.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub executed: usize,
    pub skipped: usize,
    pub failures: Vec<StatementFailure>,
}

impl ImportReport {
    /// Summary with the failure list capped to `limit` entries.
    pub fn summary(&self, mode: ImportMode, limit: usize) -> ImportSummary {
        ImportSummary {
            success: self.failures.is_empty(),
            mode,
            executed: self.executed,
            skipped: self.skipped,
            error_count: self.failures.len(),
            errors: self.failures.iter().take(limit).cloned().collect(),
        }
    }
}

/// Import summary returned to the caller.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ImportSummary {
    pub success: bool,
    pub mode: ImportMode,
    pub executed: usize,
    pub skipped: usize,
    /// Total number of failed statements
    pub error_count: usize,
    /// First failures only
    pub errors: Vec<StatementFailure>,
}

impl ImportSummary {
    /// Render the summary as an HTML flash message fragment.
    pub fn flash_html(&self) -> String {
        let class = if self.error_count == 0 {
            "success"
        } else {
            "warning"
        };
        let mut html = format!(
            "<div class=\"flash flash-{}\"><p>Import ({}) finished: {} statements executed, {} skipped, {} errors.</p>",
            class,
            self.mode.as_str(),
            self.executed,
            self.skipped,
            self.error_count
        );

        if !self.errors.is_empty() {
            html.push_str("<ul>");
            for failure in &self.errors {
                html.push_str(&format!(
                    "<li><code>{}</code>: {}</li>",
                    escape_html(&failure.statement),
                    escape_html(&failure.error)
                ));
            }
            html.push_str("</ul>");
            if self.error_count > self.errors.len() {
                html.push_str(&format!(
                    "<p>{} more errors not shown.</p>",
                    self.error_count - self.errors.len()
                ));
            }
        }

        html.push_str("</div>");
        html
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
