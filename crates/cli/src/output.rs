//! Printing of actions and executions as property lists, tables or JSON.

use std::io::Write;

use actionctl_types::{Action, Execution};
use anyhow::Result;
use serde::Serialize;
use serde_json::Value;

pub fn write_json<W: Write + ?Sized, T: Serialize + ?Sized>(out: &mut W, value: &T) -> Result<()> {
    writeln!(out, "{}", serde_json::to_string_pretty(value)?)?;
    Ok(())
}

pub fn action_properties(action: &Action) -> Result<Vec<(&'static str, String)>> {
    Ok(vec![
        ("id", action.id.clone().unwrap_or_default()),
        ("ref", action.reference().to_string()),
        ("pack", action.pack.clone()),
        ("name", action.name.clone()),
        ("description", action.description.clone().unwrap_or_default()),
        ("enabled", action.enabled.to_string()),
        ("runner_type", action.runner_type.clone()),
        ("entry_point", action.entry_point.clone().unwrap_or_default()),
        ("parameters", serde_json::to_string_pretty(&action.parameters)?),
    ])
}

pub fn execution_properties(execution: &Execution) -> Result<Vec<(&'static str, String)>> {
    Ok(vec![
        ("id", execution.id.clone().unwrap_or_default()),
        ("action", execution.action.to_string()),
        ("parameters", serde_json::to_string_pretty(&execution.parameters)?),
        ("status", status_text(execution)),
        ("start_timestamp", start_timestamp_text(execution)),
        ("result", execution.result.as_ref().map(display_value).transpose()?.unwrap_or_default()),
    ])
}

/// Render `key value` lines with keys padded to a common width. Continuation
/// lines of multi-line values are indented under the value column.
pub fn render_properties(properties: &[(&str, String)]) -> String {
    let width = properties.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let padding = " ".repeat(width + 2);
    let mut lines = Vec::new();
    for (key, value) in properties {
        let mut value_lines = value.lines();
        lines.push(format!("{key:<width$}  {}", value_lines.next().unwrap_or_default()).trim_end().to_string());
        lines.extend(value_lines.map(|line| format!("{padding}{line}")));
    }
    lines.join("\n")
}

/// Render rows under `headers`, each column as wide as its widest cell.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|header| header.len()).collect();
    for row in rows {
        for (index, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(index) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let render_row = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![render_row(headers.to_vec())];
    lines.push(widths.iter().map(|width| "-".repeat(*width)).collect::<Vec<_>>().join("-+-"));
    lines.extend(rows.iter().map(|row| render_row(row.iter().map(String::as_str).collect())));
    lines.join("\n")
}

pub fn action_rows(actions: &[Action]) -> Vec<Vec<String>> {
    actions
        .iter()
        .map(|action| {
            vec![
                action.id.clone().unwrap_or_default(),
                action.pack.clone(),
                action.name.clone(),
                action.description.clone().unwrap_or_default(),
            ]
        })
        .collect()
}

pub fn execution_rows(executions: &[Execution]) -> Vec<Vec<String>> {
    executions
        .iter()
        .map(|execution| {
            vec![
                execution.id.clone().unwrap_or_default(),
                execution.action.to_string(),
                status_text(execution),
                start_timestamp_text(execution),
            ]
        })
        .collect()
}

fn status_text(execution: &Execution) -> String {
    execution.status.as_ref().map(ToString::to_string).unwrap_or_default()
}

fn start_timestamp_text(execution: &Execution) -> String {
    execution
        .start_timestamp
        .map(|timestamp| timestamp.to_rfc3339())
        .unwrap_or_default()
}

fn display_value(value: &Value) -> Result<String> {
    Ok(match value {
        Value::String(text) => text.clone(),
        other => serde_json::to_string_pretty(other)?,
    })
}
