//! Tab completion for the main menu.

use rustyline::completion::Completer;
use rustyline::{Context, Helper, Highlighter, Hinter, Validator};

/// Characters that separate words for completion purposes.
pub const WORD_DELIMITERS: &[char] = &[' ', '\t', '\n', ';'];

/// Commands whose argument is a tool selector.
const TOOL_COMMANDS: &[&str] = &["use", "info"];

/// Completion candidates for one menu context.
///
/// Holds nothing but the vocabulary it was built from; the controller builds
/// a fresh one whenever the menu is (re)entered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuCompleter {
    commands: Vec<String>,
    tools: Vec<String>,
}

impl MenuCompleter {
    pub fn new<C, T>(commands: C, tools: T) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        T: IntoIterator,
        T::Item: Into<String>,
    {
        let mut commands: Vec<String> = commands.into_iter().map(Into::into).collect();
        commands.sort();
        commands.dedup();
        let mut tools: Vec<String> = tools.into_iter().map(Into::into).collect();
        tools.sort();
        tools.dedup();
        Self { commands, tools }
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    pub fn tools(&self) -> &[String] {
        &self.tools
    }

    /// Candidates for the word ending at `pos`, with the byte offset where
    /// that word starts.
    ///
    /// The first word completes to command verbs. The second word of a
    /// `use`/`info` line completes to tool names. Matching is a
    /// case-sensitive prefix match.
    pub fn candidates(&self, line: &str, pos: usize) -> (usize, Vec<String>) {
        let mut pos = pos.min(line.len());
        while !line.is_char_boundary(pos) {
            pos -= 1;
        }
        let head = &line[..pos];
        let start = head
            .rfind(WORD_DELIMITERS)
            .map(|i| i + 1)
            .unwrap_or(0);
        let partial = &head[start..];

        let preceding: Vec<&str> = head[..start]
            .split(WORD_DELIMITERS)
            .filter(|w| !w.is_empty())
            .collect();

        let pool = match preceding.as_slice() {
            [] => &self.commands,
            [command] if TOOL_COMMANDS.contains(command) => &self.tools,
            _ => return (start, Vec::new()),
        };

        let matches = pool
            .iter()
            .filter(|candidate| candidate.starts_with(partial))
            .cloned()
            .collect();
        (start, matches)
    }
}

/// `rustyline` helper carrying the active completer.
#[derive(Helper, Hinter, Highlighter, Validator)]
pub struct OrchestraHelper {
    completer: MenuCompleter,
}

impl OrchestraHelper {
    pub fn new(completer: MenuCompleter) -> Self {
        Self { completer }
    }
}

impl Completer for OrchestraHelper {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        Ok(self.completer.candidates(line, pos))
    }
}
