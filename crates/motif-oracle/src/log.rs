//! Roll history entries appended to the Oracle surface

use chrono::{DateTime, TimeZone};

use crate::game::GameRollResult;
use crate::table::OracleRoll;

/// 12-hour clock with seconds, e.g. `9:05:02 PM`
pub fn format_clock<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.format("%-I:%M:%S %p").to_string()
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
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

pub fn oracle_log_entry(question: &str, clock: &str, roll: &OracleRoll) -> String {
    let question = question.trim();
    let question = if question.is_empty() {
        "No question".to_string()
    } else {
        escape_html(question)
    };

    format!(
        "<p><em>[{clock}] - Oracle Roll</em><br><strong>Q:</strong> {question}<br><strong>A:</strong> {} | {}</p>",
        roll.faces_display(),
        roll.interpretation
    )
}

pub fn game_log_entry(action: &str, clock: &str, result: &GameRollResult) -> String {
    let action = action.trim();
    let action = if action.is_empty() {
        String::new()
    } else {
        format!("<br><strong>Action:</strong> {}", escape_html(action))
    };

    format!(
        "<p><em>[{clock}] - Game Roll</em>{action}<br><strong>Roll:</strong> {}<br><strong>Result:</strong> {}</p>",
        result.roll.notation(),
        result.details()
    )
}
