//! Tabular exports: CSV and a spreadsheet-compatible HTML table.

use std::borrow::Cow;

use serde::Deserialize;

use crate::models::employee::Employee;
use crate::models::project::Project;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Xls,
}

impl ExportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Xls => "application/vnd.ms-excel",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xls => "xls",
        }
    }
}

/// Quotes a field containing a comma, quote, CR or LF; inner quotes doubled.
pub fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\r', '\n']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

pub fn html_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn html_row<S: AsRef<str>>(tag: &str, values: impl Iterator<Item = S>) -> String {
    let cells: String = values
        .map(|v| format!("<{tag}>{}</{tag}>", html_escape(v.as_ref())))
        .collect();
    format!("<tr>{cells}</tr>\n")
}

#[derive(Debug, Clone)]
pub struct Table {
    pub title: &'static str,
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn to_csv(&self) -> String {
        let header = self
            .headers
            .iter()
            .map(|h| csv_field(h))
            .collect::<Vec<_>>()
            .join(",");
        let mut lines = vec![header];
        lines.extend(self.rows.iter().map(|row| {
            row.iter()
                .map(|f| csv_field(f))
                .collect::<Vec<_>>()
                .join(",")
        }));
        lines.join("\r\n")
    }

    pub fn to_html(&self) -> String {
        let mut html = String::from(
            "<html><head><meta charset=\"utf-8\"></head><body>\n<table border=\"1\">\n",
        );
        html.push_str(&format!("<caption>{}</caption>\n", html_escape(self.title)));
        html.push_str(&html_row("th", self.headers.iter()));
        for row in &self.rows {
            html.push_str(&html_row("td", row.iter()));
        }
        html.push_str("</table>\n</body></html>\n");
        html
    }

    pub fn render(&self, format: ExportFormat) -> String {
        match format {
            ExportFormat::Csv => self.to_csv(),
            ExportFormat::Xls => self.to_html(),
        }
    }
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

pub fn project_table(projects: &[Project]) -> Table {
    let rows = projects
        .iter()
        .map(|p| {
            vec![
                p.title.clone(),
                p.status.to_string(),
                p.priority.as_str().to_string(),
                p.progress.to_string(),
                opt(p.deadline),
                opt(p.budget),
                p.tags.join("; "),
                p.assigned_employees
                    .iter()
                    .map(|a| a.name.as_str())
                    .collect::<Vec<_>>()
                    .join("; "),
                p.description.clone(),
            ]
        })
        .collect();
    Table {
        title: "Projects",
        headers: vec![
            "Title",
            "Status",
            "Priority",
            "Progress (%)",
            "Deadline",
            "Budget",
            "Tags",
            "Assigned Employees",
            "Description",
        ],
        rows,
    }
}

pub fn employee_table(employees: &[Employee]) -> Table {
    let rows = employees
        .iter()
        .map(|e| {
            vec![
                e.name.clone(),
                e.email.clone(),
                opt(e.department.as_deref()),
                opt(e.position.as_deref()),
                e.availability.label().to_string(),
                e.skills
                    .iter()
                    .map(|s| format!("{} ({}y)", s.name, s.years_of_experience))
                    .collect::<Vec<_>>()
                    .join("; "),
            ]
        })
        .collect();
    Table {
        title: "Employees",
        headers: vec![
            "Name",
            "Email",
            "Department",
            "Position",
            "Availability",
            "Skills",
        ],
        rows,
    }
}
