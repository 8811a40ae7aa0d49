//! Result set rendering.
//!
//! Turns a [`QueryResult`] into console text. JSON keeps the rows as the driver
//! returned them; table and markdown are for people reading a terminal.

use crate::models::QueryResult;
use clap::ValueEnum;
use serde_json::Value as JsonValue;
use unicode_width::UnicodeWidthStr;

/// Output format for the result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON array of row objects (default)
    #[default]
    Json,
    /// ASCII table format (like MySQL CLI)
    Table,
    /// Markdown table format
    Markdown,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Table => write!(f, "table"),
            Self::Markdown => write!(f, "markdown"),
        }
    }
}

/// Render `result` in the requested format. The returned text has no trailing newline.
pub fn render(result: &QueryResult, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => format_as_json(result),
        OutputFormat::Table => format_as_table(result),
        OutputFormat::Markdown => format_as_markdown(result),
    }
}

pub fn format_value(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => "NULL".to_string(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::String(s) => s.clone(),
        JsonValue::Array(arr) => serde_json::to_string(arr).unwrap_or_default(),
        JsonValue::Object(obj) => serde_json::to_string(obj).unwrap_or_default(),
    }
}

pub fn format_as_json(result: &QueryResult) -> String {
    serde_json::to_string_pretty(&result.rows).unwrap_or_else(|_| "[]".to_string())
}

pub fn format_as_table(result: &QueryResult) -> String {
    let columns = result.column_names();
    if columns.is_empty() {
        return "Empty set".to_string();
    }

    let mut widths: Vec<usize> = columns.iter().map(|c| c.width()).collect();
    for row in &result.rows {
        for (i, col) in columns.iter().enumerate() {
            if let Some(value) = row.get(*col) {
                widths[i] = widths[i].max(format_value(value).width());
            }
        }
    }

    let mut output = String::new();
    let separator: String = widths
        .iter()
        .map(|w| format!("+{}", "-".repeat(w + 2)))
        .collect::<String>()
        + "+\n";

    output.push_str(&separator);
    let header: String = columns
        .iter()
        .zip(&widths)
        .map(|(col, w)| format!("| {} ", pad_center(col, *w)))
        .collect::<String>()
        + "|\n";
    output.push_str(&header);
    output.push_str(&separator);

    for row in &result.rows {
        let row_str: String = columns
            .iter()
            .zip(&widths)
            .map(|(col, w)| {
                let value = row.get(*col).unwrap_or(&JsonValue::Null);
                let formatted = format_value(value);
                if matches!(value, JsonValue::Number(_)) {
                    format!("| {} ", pad_left(&formatted, *w))
                } else {
                    format!("| {} ", pad_right(&formatted, *w))
                }
            })
            .collect::<String>()
            + "|\n";
        output.push_str(&row_str);
    }

    output.push_str(&separator);

    let row_count = result.row_count();
    let row_text = if row_count == 1 { "row" } else { "rows" };
    output.push_str(&format!(
        "{} {} in set ({:.2} sec)",
        row_count,
        row_text,
        result.execution_time_ms as f64 / 1000.0
    ));

    output
}

pub fn format_as_markdown(result: &QueryResult) -> String {
    let columns = result.column_names();
    if columns.is_empty() {
        return "*Empty set*".to_string();
    }

    let mut output = String::new();

    let header: String = columns.iter().map(|c| format!("| {} ", c)).collect::<String>() + "|\n";
    output.push_str(&header);

    let sep: String = columns.iter().map(|_| "|---").collect::<String>() + "|\n";
    output.push_str(&sep);

    for row in &result.rows {
        let row_str: String = columns
            .iter()
            .map(|col| {
                let value = row.get(*col).unwrap_or(&JsonValue::Null);
                format!("| {} ", format_value(value).replace('|', "\\|"))
            })
            .collect::<String>()
            + "|\n";
        output.push_str(&row_str);
    }

    output.push_str(&format!("\n*{} rows*", result.row_count()));

    output
}

// `format!` width counts chars, not display columns, so CJK text needs manual padding.
fn padding(s: &str, width: usize) -> usize {
    width.saturating_sub(s.width())
}

fn pad_right(s: &str, width: usize) -> String {
    format!("{}{}", s, " ".repeat(padding(s, width)))
}

fn pad_left(s: &str, width: usize) -> String {
    format!("{}{}", " ".repeat(padding(s, width)), s)
}

fn pad_center(s: &str, width: usize) -> String {
    let total = padding(s, width);
    let left = total / 2;
    format!("{}{}{}", " ".repeat(left), s, " ".repeat(total - left))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ColumnMetadata;
    use serde_json::json;

    fn roles() -> QueryResult {
        let rows = vec![
            json!({"id": 1, "name": "admin", "remark": null}),
            json!({"id": 12, "name": "管理员", "remark": "全部权限"}),
        ]
        .into_iter()
        .map(|v| match v {
            JsonValue::Object(map) => map,
            _ => unreachable!(),
        })
        .collect();

        QueryResult {
            columns: vec![
                ColumnMetadata::new("id", "INT"),
                ColumnMetadata::new("name", "VARCHAR"),
                ColumnMetadata::new("remark", "VARCHAR"),
            ],
            rows,
            execution_time_ms: 1250,
        }
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(&JsonValue::Null), "NULL");
        assert_eq!(format_value(&json!(true)), "true");
        assert_eq!(format_value(&json!(42)), "42");
        assert_eq!(format_value(&json!({"a": 1})), r#"{"a":1}"#);
    }

    #[test]
    fn test_json_keeps_column_order() {
        let text = format_as_json(&roles());
        let id = text.find("\"id\"").unwrap();
        let name = text.find("\"name\"").unwrap();
        let remark = text.find("\"remark\"").unwrap();
        assert!(id < name && name < remark);
        assert!(text.starts_with('['));
        assert!(text.ends_with(']'));
    }

    #[test]
    fn test_json_empty_result() {
        assert_eq!(format_as_json(&QueryResult::empty(0)), "[]");
    }

    #[test]
    fn test_table_layout() {
        let text = format_as_table(&roles());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "+----+--------+----------+");
        assert_eq!(lines[1], "| id |  name  |  remark  |");
        assert_eq!(lines[3], "|  1 | admin  | NULL     |");
        assert_eq!(lines[4], "| 12 | 管理员 | 全部权限 |");
        assert_eq!(lines[6], "2 rows in set (1.25 sec)");
    }

    #[test]
    fn test_table_empty_set() {
        assert_eq!(format_as_table(&QueryResult::empty(0)), "Empty set");
    }

    #[test]
    fn test_markdown_layout() {
        let text = format_as_markdown(&roles());
        assert!(text.starts_with("| id | name | remark |\n|---|---|---|\n"));
        assert!(text.contains("| 1 | admin | NULL |"));
        assert!(text.ends_with("*2 rows*"));
    }

    #[test]
    fn test_render_dispatch() {
        let result = QueryResult::empty(0);
        assert_eq!(render(&result, OutputFormat::Json), "[]");
        assert_eq!(render(&result, OutputFormat::Table), "Empty set");
        assert_eq!(render(&result, OutputFormat::Markdown), "*Empty set*");
    }
}
