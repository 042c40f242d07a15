//! Terminal output utilities for styled CLI output.
//!
//! Everything the admin sees goes through [`Output`]: notifications, field errors, the user
//! table and the statistics block.

use std::fmt::Display;

use console::{Term, style};
use roster_business::{DerivedView, Notice, NoticeLevel, UserStats};
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Names")]
    names: String,
    #[tabled(rename = "Age")]
    age: u32,
    #[tabled(rename = "Gender")]
    gender: String,
    #[tabled(rename = "Residence")]
    residence: String,
    #[tabled(rename = "Guardian")]
    guardian: String,
}

fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{truncated}...")
    } else {
        s.to_owned()
    }
}

/// Terminal output helper for consistent styled output.
pub struct Output {
    term: Term,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Create a new output helper writing to stdout.
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
        }
    }

    fn line(&self, text: &str) {
        drop(self.term.write_line(text));
    }

    /// Print a success message with a green checkmark.
    pub fn success(&self, message: impl Display) {
        self.line(&format!("{} {}", style("✓").green().bold(), message));
    }

    /// Print an error message with a red X.
    pub fn error(&self, message: impl Display) {
        self.line(&format!("{} {}", style("✗").red().bold(), message));
    }

    /// Print a warning message with a yellow warning sign.
    pub fn warning(&self, message: impl Display) {
        self.line(&format!("{} {}", style("⚠").yellow().bold(), message));
    }

    /// Print an info message with a blue info icon.
    pub fn info(&self, message: impl Display) {
        self.line(&format!("{} {}", style("ℹ").blue().bold(), message));
    }

    /// Print a plain message without any prefix.
    pub fn print(&self, message: impl Display) {
        self.line(&message.to_string());
    }

    pub fn newline(&self) {
        self.line("");
    }

    /// Print a header with emphasis.
    pub fn header(&self, message: impl Display) {
        self.line(&style(message).bold().cyan().to_string());
    }

    /// Print a dim/muted message.
    pub fn dim(&self, message: impl Display) {
        self.line(&style(message).dim().to_string());
    }

    /// Print a labeled value with indentation.
    pub fn labeled(&self, label: impl Display, value: impl Display) {
        self.line(&format!("  {}: {}", style(label).dim(), value));
    }

    /// Print queued controller notices, oldest first.
    pub fn notices(&self, notices: impl IntoIterator<Item = Notice>) {
        for notice in notices {
            match notice.level {
                NoticeLevel::Success => self.success(notice.message),
                NoticeLevel::Error => self.error(notice.message),
            }
        }
    }

    /// Print per-field validation errors as `Label: message`.
    pub fn field_errors<'a>(&self, errors: impl IntoIterator<Item = (&'static str, &'a str)>) {
        for (label, message) in errors {
            self.line(&format!(
                "  {} {}: {}",
                style("•").red(),
                style(label).bold(),
                message
            ));
        }
    }

    pub fn stats(&self, stats: &UserStats) {
        self.line(&format!(
            "{} {}   {} {}   {} {}   {} {}   {} {}",
            style("Total").dim(),
            style(stats.total).cyan().bold(),
            style("Male").dim(),
            style(stats.male).cyan(),
            style("Female").dim(),
            style(stats.female).cyan(),
            style("Other").dim(),
            style(stats.other).cyan(),
            style("Avg age").dim(),
            style(stats.average_age).cyan(),
        ));
    }

    /// The filtered users as a table, followed by the statistics.
    pub fn users(&self, view: &DerivedView<'_>) {
        if view.users.is_empty() {
            self.dim("No users found.");
        } else {
            let rows: Vec<UserRow> = view
                .users
                .iter()
                .map(|user| UserRow {
                    id: user.id.clone(),
                    names: truncate_str(&user.names, 28),
                    age: user.age,
                    gender: user.gender.to_string(),
                    residence: truncate_str(&user.residence, 20),
                    guardian: truncate_str(&user.guardian, 24),
                })
                .collect();

            let mut table = Table::new(&rows);
            table.with(Style::rounded());
            self.print(table);
        }
        self.line(&format!(
            "{} {} of {}",
            style("Showing").dim(),
            style(view.users.len()).cyan().bold(),
            view.stats.total
        ));
        self.stats(&view.stats);
    }
}
