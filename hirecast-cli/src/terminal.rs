//! Terminal front end: dialoguer prompts as a `FormSource`.

use crossterm::style::Stylize;
use dialoguer::{Input, Select};
use hirecast_core::config::FormConfig;
use hirecast_core::{FORM_FIELDS, FormSource, FormSubmission, FormValues, Rendered};

/// Prompts for every field each cycle, keeping the previous answers as the
/// initial text.
pub struct TerminalForm {
    form: FormConfig,
    values: FormValues,
}

impl TerminalForm {
    pub fn new(form: FormConfig) -> Self {
        Self {
            form,
            values: FormValues::default(),
        }
    }

    pub fn print_title(&self) {
        println!("\n  {}\n", self.form.title.as_str().bold());
    }
}

impl FormSource for TerminalForm {
    type Error = dialoguer::Error;

    fn next_cycle(&mut self) -> Result<Option<FormSubmission>, Self::Error> {
        for field in FORM_FIELDS {
            let current = self.values.get(field.key).unwrap_or_default().to_string();
            let value: String = Input::new()
                .with_prompt(field.label)
                .with_initial_text(current)
                .allow_empty(true)
                .interact_text()?;
            self.values.set(field.key, value);
        }

        let actions = [self.form.submit_label.as_str(), "Edit values", "Quit"];
        let choice = Select::new()
            .with_prompt("Next")
            .items(&actions)
            .default(0)
            .interact()?;

        let triggered = match choice {
            0 => true,
            1 => false,
            _ => return Ok(None),
        };
        Ok(Some(FormSubmission {
            values: self.values.clone(),
            triggered,
        }))
    }
}

/// Success in green, failures in red.
pub fn print_rendered(rendered: &Rendered) {
    match rendered {
        Rendered::Success { message, .. } => println!("\n  {}\n", message.as_str().green()),
        Rendered::Failure { message, .. } => println!("\n  {}\n", message.as_str().red()),
    }
}
