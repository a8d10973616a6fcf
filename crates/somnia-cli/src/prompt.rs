//! Terminal input parsing and line formatting.

use std::io::{self, Write};

use somnia_core::history::{HistoryEntry, HistoryStatus};

/// Parse a yes/no reply. Accepts `y`, `yes`, `n`, `no` in any case.
pub fn parse_answer(line: &str) -> Option<bool> {
  match line.trim().to_ascii_lowercase().as_str() {
    "y" | "yes" => Some(true),
    "n" | "no" => Some(false),
    _ => None,
  }
}

pub fn print_prompt() -> io::Result<()> {
  print!("(y/n) > ");
  io::stdout().flush()
}

/// One line per history entry: time, outcome, disease, patient.
pub fn history_line(entry: &HistoryEntry) -> String {
  let outcome = match entry.status {
    HistoryStatus::Completed => entry
      .disease_name
      .as_deref()
      .or(entry.disease_code.as_deref())
      .unwrap_or("?")
      .to_owned(),
    HistoryStatus::NoMatch => "no match".to_owned(),
    HistoryStatus::Unsatisfied => format!(
      "not {}",
      entry.disease_code.as_deref().unwrap_or("?")
    ),
  };
  let patient = entry
    .biodata
    .as_ref()
    .map(|b| format!("  ({}, {})", b.name, b.age))
    .unwrap_or_default();

  format!(
    "#{:<5} {}  {}{patient}",
    entry.history_id,
    entry.recorded_at.format("%Y-%m-%d %H:%M"),
    outcome
  )
}
