//! Paginated plain-text export of a finished report.

use crate::error::{Error, Result};
use crate::narrative;
use crate::report::Report;
use chrono::{DateTime, Utc};

pub const BRAND: &str = "VOLTAROS";
pub const SUBTITLE: &str = "Chaos Experiment Report";
const LABEL_WIDTH: usize = 18;
const MIN_WIDTH: usize = 40;
const MIN_PAGE_HEIGHT: usize = 12;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExportOptions {
    /// Maximum characters per line.
    pub width: usize,
    /// Lines per page, footer included.
    pub page_height: usize,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            width: 80,
            page_height: 54,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetailRow {
    pub label: String,
    pub value: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Page {
    pub lines: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    pub file_name: String,
    pub title: String,
    pub overview: Vec<DetailRow>,
    pub execution: Vec<DetailRow>,
    pub pages: Vec<Page>,
}

impl Document {
    /// Value of a row in the overview or execution table.
    pub fn detail(&self, label: &str) -> Option<&str> {
        self.overview
            .iter()
            .chain(self.execution.iter())
            .find(|row| row.label == label)
            .map(|row| row.value.as_str())
    }

    /// Pages joined by form feeds.
    pub fn to_text(&self) -> String {
        self.pages
            .iter()
            .map(|p| p.lines.join("\n"))
            .collect::<Vec<_>>()
            .join("\n\u{c}\n")
    }
}

/// Render `report` into a paginated document. `In Progress` reports are
/// rejected before anything is generated.
pub fn render(report: &Report, options: &ExportOptions) -> Result<Document> {
    if !report.is_terminal() {
        return Err(Error::ReportNotReady(report.id.clone()));
    }
    if options.width < MIN_WIDTH || options.page_height < MIN_PAGE_HEIGHT {
        return Err(Error::Export(format!(
            "page must be at least {MIN_WIDTH} columns by {MIN_PAGE_HEIGHT} lines"
        )));
    }

    let width = options.width;
    let overview = vec![
        row("Report Name", &report.name),
        row("Report ID", &report.id),
        row("Date Generated", &long_date(&report.date)?),
        row("Status", report.status.label()),
        row("Resilience Score", &format!("{:.1}", report.resilience_score)),
    ];

    let mut lines = vec![
        center(BRAND, width),
        center(SUBTITLE, width),
        String::new(),
        "-".repeat(width),
        "Report Overview".to_string(),
        String::new(),
    ];
    push_rows(&mut lines, &overview, width);
    lines.push(String::new());

    let mut execution = Vec::new();
    if let Some(result) = &report.result {
        execution = vec![
            row("Target System", &result.target),
            row("Action Taken", &result.action.replace('_', " ").to_uppercase()),
            row("Timestamp", &utc_string(&result.timestamp)?),
            row("Outcome", &result.outcome),
        ];
        lines.push("-".repeat(width));
        lines.push("Experiment Execution Details".to_string());
        lines.push(String::new());
        push_rows(&mut lines, &execution, width);
        lines.push(String::new());
        lines.push("Details:".to_string());
        let details = result
            .details
            .as_deref()
            .unwrap_or("No additional details provided.");
        lines.extend(wrap(details, width));
        lines.push(String::new());
    }

    lines.push("-".repeat(width));
    lines.push("Summary & Recommendations".to_string());
    lines.push(String::new());
    lines.push("Summary of Findings:".to_string());
    lines.extend(wrap(narrative::summary(report), width));
    lines.push(String::new());
    lines.push("Recommendations:".to_string());
    lines.extend(wrap(&narrative::recommendation(report), width));

    Ok(Document {
        file_name: file_name(&report.name),
        title: format!("{BRAND} {SUBTITLE}"),
        overview,
        execution,
        pages: paginate(lines, options),
    })
}

/// Report name with whitespace as `_`; quotes, backslashes and control
/// characters are dropped so the name fits a `filename="..."` header.
pub fn file_name(report_name: &str) -> String {
    let stem: String = report_name
        .chars()
        .filter_map(|c| match c {
            '"' | '\\' => None,
            c if c.is_whitespace() => Some('_'),
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect();
    if stem.is_empty() {
        return "report.txt".to_string();
    }
    format!("{stem}.txt")
}

fn row(label: &str, value: &str) -> DetailRow {
    DetailRow {
        label: label.to_string(),
        value: value.to_string(),
    }
}

fn push_rows(lines: &mut Vec<String>, rows: &[DetailRow], width: usize) {
    let indent = " ".repeat(LABEL_WIDTH);
    for r in rows {
        let label = format!("{}:", r.label);
        for (i, chunk) in wrap(&r.value, width - LABEL_WIDTH).into_iter().enumerate() {
            if i == 0 {
                lines.push(format!("{label:<LABEL_WIDTH$}{chunk}"));
            } else {
                lines.push(format!("{indent}{chunk}"));
            }
        }
    }
}

fn paginate(lines: Vec<String>, options: &ExportOptions) -> Vec<Page> {
    // Two lines per page are reserved for the spacer and footer.
    let body = options.page_height - 2;
    let chunks = lines.chunks(body).collect::<Vec<_>>();
    let total = chunks.len().max(1);

    let mut pages = chunks
        .into_iter()
        .map(|chunk| Page {
            lines: chunk.to_vec(),
        })
        .collect::<Vec<_>>();
    if pages.is_empty() {
        pages.push(Page::default());
    }
    for (i, page) in pages.iter_mut().enumerate() {
        page.lines.push(String::new());
        page.lines
            .push(center(&format!("Page {} of {total}", i + 1), options.width));
    }
    pages
}

fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let mut word = word.to_string();
        while word.chars().count() > width {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            let split = word
                .char_indices()
                .nth(width)
                .map(|(idx, _)| idx)
                .unwrap_or(word.len());
            let rest = word.split_off(split);
            out.push(word);
            word = rest;
        }
        if current.is_empty() {
            current = word;
        } else if current.chars().count() + 1 + word.chars().count() <= width {
            current.push(' ');
            current.push_str(&word);
        } else {
            out.push(std::mem::replace(&mut current, word));
        }
    }
    if !current.is_empty() || out.is_empty() {
        out.push(current);
    }
    out
}

fn center(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.to_string();
    }
    format!("{}{text}", " ".repeat((width - len) / 2))
}

fn parse_utc(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| Error::Export(format!("invalid timestamp '{value}': {e}")))
}

/// `June 24, 2025, 06:30 PM`
fn long_date(value: &str) -> Result<String> {
    Ok(parse_utc(value)?.format("%B %-d, %Y, %I:%M %p").to_string())
}

/// `Tue, 24 Jun 2025 18:30:00 GMT`
fn utc_string(value: &str) -> Result<String> {
    Ok(parse_utc(value)?.format("%a, %d %b %Y %H:%M:%S GMT").to_string())
}
