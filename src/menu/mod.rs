//! Interactive main menu.
//!
//! The controller loops over: register completion, optionally render the
//! header, read one line, dispatch it. Dispatch is an ordered table of verb
//! prefixes where the first match wins, so `user` still triggers `use`.
//!
//! Tool sub-menus and administrative actions block the loop until they
//! return. Ctrl-C at any read, or while a tool or admin command runs,
//! surfaces as [`OrchestraError::Interrupted`] and ends the loop.

pub mod completer;
pub mod input;
pub mod render;

use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::admin::{AdminAction, AdminActions};
use crate::config::Settings;
use crate::error::{OrchestraError, Result};
use crate::interrupt;
use crate::tools::{PluginDescriptor, ToolRegistry};

use completer::MenuCompleter;
use input::{pause, LineSource};

/// Prompt shown at the main menu.
pub const PROMPT: &str = "Orchestra>: ";

/// A recognised command verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Use,
    List,
    Info,
    Admin(AdminAction),
    Exit,
}

/// Prefix rules in priority order.
const DISPATCH_RULES: &[(&str, Verb)] = &[
    ("use", Verb::Use),
    ("list", Verb::List),
    ("info", Verb::Info),
    ("option", Verb::Admin(AdminAction::ShowOptions)),
    ("config", Verb::Admin(AdminAction::Config)),
    ("setup", Verb::Admin(AdminAction::Setup)),
    ("update", Verb::Admin(AdminAction::Update)),
    ("exit", Verb::Exit),
    ("quit", Verb::Exit),
];

/// First rule whose prefix starts `line`.
pub fn match_verb(line: &str) -> Option<Verb> {
    DISPATCH_RULES
        .iter()
        .find(|(prefix, _)| line.starts_with(prefix))
        .map(|(_, verb)| *verb)
}

/// Commands shown in the table and offered for completion.
pub fn default_vocabulary() -> BTreeMap<&'static str, &'static str> {
    BTreeMap::from([
        ("use", "Use a specific tool"),
        ("list", "List available tools"),
        ("info", "Information on a specific tool"),
        ("options", "Show Orchestra configuration"),
        ("update", "Update Orchestra"),
        ("setup", "Run the Orchestra setup script"),
        ("config", "Regenerate the Orchestra settings file"),
        ("exit", "Exit Orchestra"),
    ])
}

/// One whitespace-tokenized input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub verb: String,
    pub args: Vec<String>,
}

impl CommandLine {
    /// `None` for a blank line.
    pub fn parse(line: &str) -> Option<Self> {
        let mut tokens = line.split_whitespace().map(str::to_string);
        let verb = tokens.next()?;
        Some(Self {
            verb,
            args: tokens.collect(),
        })
    }
}

/// Mutable state of the main menu, owned by the controller.
#[derive(Debug, Clone)]
pub struct MenuState {
    /// Command verbs and their descriptions, shown sorted by verb.
    pub vocabulary: BTreeMap<&'static str, &'static str>,
    /// Redraw the full header before the next prompt.
    pub show_header: bool,
}

impl Default for MenuState {
    fn default() -> Self {
        Self {
            vocabulary: default_vocabulary(),
            show_header: true,
        }
    }
}

/// Which menu currently owns the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuMode {
    /// Reading commands at the `Orchestra>: ` prompt.
    MainMenu,
    /// A tool's own menu is in control; holds its entry point.
    ToolSubMenu(PathBuf),
    /// The user left; the loop stops.
    Exiting,
}

/// Drives the main menu until the user exits.
pub struct MenuController<'a> {
    registry: &'a ToolRegistry,
    settings: &'a Settings,
    admin: AdminActions<'a>,
    state: MenuState,
    mode: MenuMode,
}

impl<'a> MenuController<'a> {
    /// Start at the main menu with the header pending.
    pub fn new(registry: &'a ToolRegistry, settings: &'a Settings, admin: AdminActions<'a>) -> Self {
        Self {
            registry,
            settings,
            admin,
            state: MenuState::default(),
            mode: MenuMode::MainMenu,
        }
    }

    /// Current mode. `Exiting` once `run` has returned normally.
    pub fn mode(&self) -> &MenuMode {
        &self.mode
    }

    /// Current menu state.
    pub fn state(&self) -> &MenuState {
        &self.state
    }

    /// Completion vocabulary for the main menu.
    pub fn completer(&self) -> MenuCompleter {
        MenuCompleter::new(self.state.vocabulary.keys().copied(), self.registry.names())
    }

    /// Run until `exit`, `quit` or end of input.
    ///
    /// Returns `Err(OrchestraError::Interrupted)` on Ctrl-C and propagates
    /// every administrative failure.
    pub fn run(&mut self, input: &mut dyn LineSource, out: &mut dyn Write) -> Result<()> {
        while self.mode == MenuMode::MainMenu {
            interrupt::check()?;
            input.set_completer(self.completer());

            if self.state.show_header {
                render::main_menu(out, self.settings, self.registry, &self.state.vocabulary)?;
                self.state.show_header = false;
            }
            out.flush()?;

            match input.read_line(PROMPT)? {
                Some(line) => self.handle_line(&line, input, out)?,
                None => {
                    debug!("End of input, leaving menu");
                    self.mode = MenuMode::Exiting;
                }
            }
        }
        Ok(())
    }

    /// Dispatch one line. Blank and unrecognised lines do nothing.
    pub fn handle_line(
        &mut self,
        line: &str,
        input: &mut dyn LineSource,
        out: &mut dyn Write,
    ) -> Result<()> {
        let registry = self.registry;
        let Some(command) = CommandLine::parse(line.trim()) else {
            return Ok(());
        };
        let Some(verb) = match_verb(&command.verb) else {
            debug!(verb = %command.verb, "Ignoring unrecognised command");
            return Ok(());
        };

        match verb {
            Verb::Use => match command.args.as_slice() {
                [] => render::tool_list(out, registry)?,
                [selector] => {
                    if let Some(tool) = registry.resolve(selector) {
                        self.open_tool(tool, out)?;
                    }
                }
                _ => {}
            },
            Verb::List => render::tool_list(out, registry)?,
            Verb::Info => match command.args.as_slice() {
                [selector] => {
                    if let Some(tool) = registry.resolve(selector) {
                        render::tool_info(out, tool)?;
                    }
                }
                _ => self.state.show_header = true,
            },
            Verb::Admin(action) => {
                self.admin.perform(action, out)?;
                pause(input, out, action.pause_message())?;
                self.state.show_header = true;
            }
            Verb::Exit => self.mode = MenuMode::Exiting,
        }
        Ok(())
    }

    fn open_tool(&mut self, tool: &PluginDescriptor, out: &mut dyn Write) -> Result<()> {
        info!(tool = %tool.cli_name(), "Entering tool menu");
        self.mode = MenuMode::ToolSubMenu(tool.source_path().to_path_buf());
        let result = tool.handle().interactive_menu();
        self.mode = MenuMode::MainMenu;

        match result {
            Ok(()) => {
                self.state.show_header = true;
                Ok(())
            }
            Err(OrchestraError::Interrupted) => Err(OrchestraError::Interrupted),
            Err(e) => {
                warn!(tool = %tool.cli_name(), error = %e, "Tool menu failed");
                writeln!(out)?;
                writeln!(out, "{}", render::warning(&format!(" [!] {}", e)))?;
                writeln!(out)?;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::MockCommandRunner;
    use crate::tools::Tool;
    use input::ScriptedInput;
    use std::cell::RefCell;
    use std::rc::Rc;

    type CallLog = Rc<RefCell<Vec<String>>>;

    /// Tool that records every invocation, optionally failing its menu.
    struct RecordingTool {
        name: String,
        calls: CallLog,
        menu_result: fn() -> Result<()>,
    }

    impl Tool for RecordingTool {
        fn cli_name(&self) -> &str {
            &self.name
        }
        fn description(&self) -> &str {
            "recording tool"
        }
        fn interactive_menu(&self) -> Result<()> {
            self.calls.borrow_mut().push(format!("{}:menu", self.name));
            (self.menu_result)()
        }
        fn run_direct(&self) -> Result<()> {
            self.calls.borrow_mut().push(format!("{}:direct", self.name));
            Ok(())
        }
    }

    fn succeed() -> Result<()> {
        Ok(())
    }

    fn fail() -> Result<()> {
        Err(OrchestraError::ToolFailed {
            name: "beta".into(),
            code: Some(4),
        })
    }

    fn interrupt() -> Result<()> {
        Err(OrchestraError::Interrupted)
    }

    fn make_registry(calls: &CallLog, beta_menu: fn() -> Result<()>) -> ToolRegistry {
        let specs: [(&str, fn() -> Result<()>); 3] =
            [("Alpha", succeed), ("beta", beta_menu), ("Gamma", succeed)];
        let descriptors = specs
            .into_iter()
            .map(|(name, menu_result)| {
                PluginDescriptor::new(
                    PathBuf::from(format!("tools/{}/tool.json", name.to_lowercase())),
                    Box::new(RecordingTool {
                        name: name.to_string(),
                        calls: Rc::clone(calls),
                        menu_result,
                    }),
                )
            });
        ToolRegistry::from_descriptors(descriptors)
    }

    fn make_settings(os: &str) -> Settings {
        serde_json::from_value(serde_json::json!({
            "operating_system": os,
            "terminal_clear": false
        }))
        .unwrap()
    }

    struct Outcome {
        result: Result<()>,
        mode: MenuMode,
        output: String,
        input: ScriptedInput,
    }

    fn drive(
        registry: &ToolRegistry,
        settings: &Settings,
        runner: &MockCommandRunner,
        mut input: ScriptedInput,
    ) -> Outcome {
        colored::control::set_override(false);
        let admin = AdminActions::new(settings, "/etc/orchestra/settings.json", runner, ".");
        let mut controller = MenuController::new(registry, settings, admin);
        let mut out = Vec::new();
        let result = controller.run(&mut input, &mut out);
        Outcome {
            result,
            mode: controller.mode().clone(),
            output: String::from_utf8(out).unwrap(),
            input,
        }
    }

    #[test]
    fn test_match_verb_first_rule_wins() {
        assert_eq!(match_verb("use"), Some(Verb::Use));
        assert_eq!(match_verb("user"), Some(Verb::Use));
        assert_eq!(match_verb("options"), Some(Verb::Admin(AdminAction::ShowOptions)));
        assert_eq!(match_verb("configure"), Some(Verb::Admin(AdminAction::Config)));
        assert_eq!(match_verb("updates"), Some(Verb::Admin(AdminAction::Update)));
        assert_eq!(match_verb("quitting"), Some(Verb::Exit));
        assert_eq!(match_verb("help"), None);
        assert_eq!(match_verb("Use"), None);
    }

    #[test]
    fn test_command_line_parse() {
        assert_eq!(CommandLine::parse("   "), None);
        let cmd = CommandLine::parse("info   gamma  extra").unwrap();
        assert_eq!(cmd.verb, "info");
        assert_eq!(cmd.args, vec!["gamma", "extra"]);
    }

    #[test]
    fn test_use_by_index_opens_tool_and_redraws_header() {
        let calls = CallLog::default();
        let registry = make_registry(&calls, succeed);
        let settings = make_settings("Ubuntu");
        let runner = MockCommandRunner::new();

        let outcome = drive(&registry, &settings, &runner, ScriptedInput::new(&["use 2", "exit"]));

        assert!(outcome.result.is_ok());
        assert_eq!(*calls.borrow(), vec!["beta:menu"]);
        assert_eq!(outcome.output.matches("Main Menu").count(), 2);
        assert_eq!(outcome.mode, MenuMode::Exiting);
    }

    #[test]
    fn test_use_by_name_is_case_insensitive() {
        let calls = CallLog::default();
        let registry = make_registry(&calls, succeed);
        let settings = make_settings("Ubuntu");
        let runner = MockCommandRunner::new();

        drive(&registry, &settings, &runner, ScriptedInput::new(&["use GAMMA", "quit"]));
        assert_eq!(*calls.borrow(), vec!["Gamma:menu"]);
    }

    #[test]
    fn test_info_prints_name_and_description() {
        let calls = CallLog::default();
        let registry = make_registry(&calls, succeed);
        let settings = make_settings("Ubuntu");
        let runner = MockCommandRunner::new();

        let outcome = drive(&registry, &settings, &runner, ScriptedInput::new(&["info gamma"]));

        assert!(outcome.output.contains("\nGamma => recording tool\n\n"));
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_info_without_exactly_one_selector_redraws_header() {
        let calls = CallLog::default();
        let registry = make_registry(&calls, succeed);
        let settings = make_settings("Ubuntu");
        let runner = MockCommandRunner::new();

        let outcome = drive(
            &registry,
            &settings,
            &runner,
            ScriptedInput::new(&["info", "info alpha beta"]),
        );
        assert_eq!(outcome.output.matches("Main Menu").count(), 3);
    }

    #[test]
    fn test_unresolved_selector_prints_nothing() {
        let calls = CallLog::default();
        let registry = make_registry(&calls, succeed);
        let settings = make_settings("Ubuntu");
        let runner = MockCommandRunner::new();

        let baseline = drive(&registry, &settings, &runner, ScriptedInput::new(&[]));
        let outcome = drive(
            &registry,
            &settings,
            &runner,
            ScriptedInput::new(&["use zzz", "info 9", "use 0", "use alpha beta", "frobnicate"]),
        );

        assert_eq!(outcome.output, baseline.output);
        assert!(calls.borrow().is_empty());
        assert_eq!(outcome.input.prompts.len(), 6);
    }

    #[test]
    fn test_bare_use_and_list_render_tool_list_only() {
        let calls = CallLog::default();
        let registry = make_registry(&calls, succeed);
        let settings = make_settings("Ubuntu");
        let runner = MockCommandRunner::new();

        let outcome = drive(
            &registry,
            &settings,
            &runner,
            ScriptedInput::new(&["use", "list", "user"]),
        );

        assert_eq!(outcome.output.matches("Available Tools:").count(), 4);
        assert_eq!(outcome.output.matches("Main Menu").count(), 1);
        assert!(outcome.output.contains("\t1)\tAlpha\n\t2)\tbeta\n\t3)\tGamma\n"));
    }

    #[test]
    fn test_exit_stops_reading() {
        let calls = CallLog::default();
        let registry = make_registry(&calls, succeed);
        let settings = make_settings("Ubuntu");
        let runner = MockCommandRunner::new();

        let outcome = drive(&registry, &settings, &runner, ScriptedInput::new(&["exit", "use 1"]));

        assert!(outcome.result.is_ok());
        assert_eq!(outcome.input.prompts, vec![PROMPT]);
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_end_of_input_exits_cleanly() {
        let calls = CallLog::default();
        let registry = make_registry(&calls, succeed);
        let settings = make_settings("Ubuntu");
        let runner = MockCommandRunner::new();

        let outcome = drive(&registry, &settings, &runner, ScriptedInput::new(&[]));
        assert!(outcome.result.is_ok());
        assert_eq!(outcome.mode, MenuMode::Exiting);
    }

    #[test]
    fn test_interrupt_at_prompt_ends_loop() {
        let calls = CallLog::default();
        let registry = make_registry(&calls, succeed);
        let settings = make_settings("Ubuntu");
        let runner = MockCommandRunner::new();

        let outcome = drive(
            &registry,
            &settings,
            &runner,
            ScriptedInput::new(&["list"]).then_interrupt(),
        );
        assert!(matches!(outcome.result, Err(OrchestraError::Interrupted)));
    }

    #[test]
    fn test_failing_tool_menu_warns_and_continues() {
        let calls = CallLog::default();
        let registry = make_registry(&calls, fail);
        let settings = make_settings("Ubuntu");
        let runner = MockCommandRunner::new();

        let outcome = drive(
            &registry,
            &settings,
            &runner,
            ScriptedInput::new(&["use beta", "use alpha", "exit"]),
        );

        assert!(outcome.result.is_ok());
        assert_eq!(*calls.borrow(), vec!["beta:menu", "Alpha:menu"]);
        assert!(outcome
            .output
            .contains(" [!] Tool 'beta' exited with error code 4"));
    }

    #[test]
    fn test_interrupt_inside_tool_menu_propagates() {
        let calls = CallLog::default();
        let registry = make_registry(&calls, interrupt);
        let settings = make_settings("Ubuntu");
        let runner = MockCommandRunner::new();

        let outcome = drive(
            &registry,
            &settings,
            &runner,
            ScriptedInput::new(&["use beta", "exit"]),
        );
        assert!(matches!(outcome.result, Err(OrchestraError::Interrupted)));
        assert_eq!(outcome.input.prompts.len(), 1);
    }

    #[test]
    fn test_options_pauses_then_redraws_header() {
        let calls = CallLog::default();
        let registry = make_registry(&calls, succeed);
        let settings = make_settings("Ubuntu");
        let runner = MockCommandRunner::new();

        let outcome = drive(
            &registry,
            &settings,
            &runner,
            ScriptedInput::new(&["options", "", "exit"]),
        );

        assert!(outcome.result.is_ok());
        assert!(outcome
            .output
            .contains(" [i] Orchestra configuration file: /etc/orchestra/settings.json"));
        assert_eq!(
            outcome.input.prompts,
            vec![
                PROMPT,
                AdminAction::ShowOptions.pause_message(),
                PROMPT
            ]
        );
        assert_eq!(outcome.output.matches("Main Menu").count(), 2);
    }

    #[test]
    fn test_update_from_menu_runs_git_pull() {
        let calls = CallLog::default();
        let registry = make_registry(&calls, succeed);
        let settings = make_settings("Ubuntu");
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|program, args| program == "git" && args == ["pull"])
            .times(1)
            .returning(|_, _| Ok(Some(0)));

        let outcome = drive(
            &registry,
            &settings,
            &runner,
            ScriptedInput::new(&["update", "", "exit"]),
        );
        assert!(outcome.result.is_ok());
        assert_eq!(
            outcome.input.prompts[1],
            "Orchestra has checked for updates, press enter to continue"
        );
    }

    #[test]
    fn test_admin_failure_is_fatal() {
        let calls = CallLog::default();
        let registry = make_registry(&calls, succeed);
        let settings = make_settings("Kali");
        let mut runner = MockCommandRunner::new();
        runner.expect_run().times(1).returning(|_, _| Ok(Some(100)));

        let outcome = drive(
            &registry,
            &settings,
            &runner,
            ScriptedInput::new(&["update", "", "exit"]),
        );
        assert!(matches!(
            outcome.result,
            Err(OrchestraError::ExternalCommand { .. })
        ));
        assert_eq!(outcome.input.prompts, vec![PROMPT]);
    }

    #[test]
    fn test_interrupt_at_pause_prompt_ends_loop() {
        let calls = CallLog::default();
        let registry = make_registry(&calls, succeed);
        let settings = make_settings("Ubuntu");
        let runner = MockCommandRunner::new();

        let outcome = drive(
            &registry,
            &settings,
            &runner,
            ScriptedInput::new(&["options"]).then_interrupt(),
        );
        assert!(matches!(outcome.result, Err(OrchestraError::Interrupted)));
    }

    #[test]
    fn test_completer_registered_every_iteration() {
        let calls = CallLog::default();
        let registry = make_registry(&calls, succeed);
        let settings = make_settings("Ubuntu");
        let runner = MockCommandRunner::new();

        let outcome = drive(
            &registry,
            &settings,
            &runner,
            ScriptedInput::new(&["list", "list", "exit"]),
        );

        assert_eq!(outcome.input.completers.len(), 3);
        let completer = &outcome.input.completers[0];
        assert_eq!(completer.tools(), ["Alpha", "Gamma", "beta"]);
        assert!(completer.commands().iter().any(|c| c == "use"));
    }
}
