//! Blocking line input for the menu.

use std::io::Write;

use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{CompletionType, Config, Editor};
use tracing::debug;

use crate::error::{OrchestraError, Result};

use super::completer::{MenuCompleter, OrchestraHelper};

/// Source of input lines for the menu.
pub trait LineSource {
    /// Replace the completion vocabulary.
    fn set_completer(&mut self, completer: MenuCompleter);

    /// Block for one line. `Ok(None)` means end of input; Ctrl-C is
    /// `Err(OrchestraError::Interrupted)`.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Terminal input through `rustyline`, with history and tab completion.
pub struct RustylineSource {
    editor: Editor<OrchestraHelper, DefaultHistory>,
}

impl RustylineSource {
    pub fn new() -> Result<Self> {
        let config = Config::builder()
            .completion_type(CompletionType::List)
            .auto_add_history(false)
            .build();
        let mut editor = Editor::with_config(config)
            .map_err(|e| OrchestraError::Input(format!("Failed to open terminal: {}", e)))?;
        editor.set_helper(Some(OrchestraHelper::new(MenuCompleter::default())));
        Ok(Self { editor })
    }
}

impl LineSource for RustylineSource {
    fn set_completer(&mut self, completer: MenuCompleter) {
        self.editor.set_helper(Some(OrchestraHelper::new(completer)));
    }

    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    if let Err(e) = self.editor.add_history_entry(line.as_str()) {
                        debug!(error = %e, "Failed to record history entry");
                    }
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Interrupted) => Err(OrchestraError::Interrupted),
            Err(ReadlineError::Eof) => Ok(None),
            Err(e) => Err(OrchestraError::Input(e.to_string())),
        }
    }
}

/// Wait for the user to press enter. End of input counts as a keypress.
pub fn pause(input: &mut dyn LineSource, out: &mut dyn Write, message: &str) -> Result<()> {
    writeln!(out)?;
    writeln!(out)?;
    out.flush()?;
    input.read_line(message)?;
    Ok(())
}

/// Scripted input for driving the menu in tests.
#[cfg(test)]
pub(crate) struct ScriptedInput {
    /// `None` entries simulate Ctrl-C.
    lines: std::collections::VecDeque<Option<String>>,
    pub prompts: Vec<String>,
    pub completers: Vec<MenuCompleter>,
}

#[cfg(test)]
impl ScriptedInput {
    pub fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|l| Some(l.to_string())).collect(),
            prompts: Vec::new(),
            completers: Vec::new(),
        }
    }

    pub fn then_interrupt(mut self) -> Self {
        self.lines.push_back(None);
        self
    }
}

#[cfg(test)]
impl LineSource for ScriptedInput {
    fn set_completer(&mut self, completer: MenuCompleter) {
        self.completers.push(completer);
    }

    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        match self.lines.pop_front() {
            Some(Some(line)) => Ok(Some(line)),
            Some(None) => Err(OrchestraError::Interrupted),
            None => Ok(None),
        }
    }
}
