//! Interactive prompts built on `inquire`.

use anyhow::{Context as _, Result};
use inquire::{Password, PasswordDisplayMode, Select, Text};
use roster_business::{Confirm, FieldSpec, Form, FormSchema};

/// Which fields of a form to ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ask {
    /// Fields that are still blank.
    Missing,
    /// Fields whose last validation failed.
    Invalid,
    /// Every field, offering the current value as default.
    All,
}

/// Asks yes/no on the terminal. Anything other than an explicit yes declines.
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        inquire::Confirm::new(prompt)
            .with_default(false)
            .prompt()
            .unwrap_or(false)
    }
}

/// Stands in for the prompt when the admin passed `--yes`.
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, _prompt: &str) -> bool {
        true
    }
}

fn prompt_field<F>(spec: &FieldSpec<F>, current: &str) -> Result<String> {
    let message = format!("{}:", spec.label);

    if spec.secret {
        return Password::new(&message)
            .without_confirmation()
            .with_display_mode(PasswordDisplayMode::Masked)
            .prompt()
            .with_context(|| format!("Failed to read {}", spec.label));
    }

    if let Some(options) = spec.options() {
        let start = options.iter().position(|o| *o == current).unwrap_or(0);
        return Select::new(&message, options.to_vec())
            .with_starting_cursor(start)
            .prompt()
            .map(str::to_owned)
            .with_context(|| format!("Failed to read {}", spec.label));
    }

    let mut text = Text::new(&message);
    if !current.is_empty() {
        text = text.with_default(current);
    }
    text.prompt()
        .with_context(|| format!("Failed to read {}", spec.label))
}

/// Prompt for the selected fields in schema order, feeding answers through `on_change`.
pub fn fill_form<S: FormSchema>(form: &mut Form<S>, ask: Ask) -> Result<()> {
    for spec in S::FIELDS {
        let current = form.value(spec.field).to_owned();
        let wanted = match ask {
            Ask::Missing => current.trim().is_empty(),
            Ask::Invalid => form.error(spec.field).is_some(),
            Ask::All => true,
        };
        if wanted {
            let value = prompt_field(spec, &current)?;
            form.on_change(spec.field, value);
        }
    }
    Ok(())
}
