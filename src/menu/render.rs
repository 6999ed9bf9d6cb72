//! Menu rendering.
//!
//! Every function writes to a caller-supplied `Write` so the controller can be
//! exercised against a buffer.

use std::collections::BTreeMap;
use std::io::Write;

use colored::{ColoredString, Colorize};

use crate::config::Settings;
use crate::error::Result;
use crate::tools::{PluginDescriptor, ToolRegistry};

const RULE: &str =
    "===============================================================================";

/// ANSI sequence clearing the screen and homing the cursor.
const CLEAR_SCREEN: &str = "\x1B[2J\x1B[1;1H";

/// Highlight for command verbs and tool names.
pub fn highlight(text: &str) -> ColoredString {
    text.blue().bold()
}

/// Warning and error text.
pub fn warning(text: &str) -> ColoredString {
    text.red().bold()
}

pub fn title_screen(out: &mut dyn Write, settings: &Settings) -> Result<()> {
    if settings.terminal_clear {
        write!(out, "{}", CLEAR_SCREEN)?;
    }
    writeln!(out, "{}", RULE)?;
    writeln!(
        out,
        "                         Orchestra | [Version]: {}",
        env!("CARGO_PKG_VERSION")
    )?;
    writeln!(out, "{}", RULE)?;
    writeln!(out)?;
    Ok(())
}

/// Numbered tool list in display order.
pub fn tool_list(out: &mut dyn Write, registry: &ToolRegistry) -> Result<()> {
    writeln!(out, "Available Tools:")?;
    writeln!(out)?;
    for (index, tool) in registry.all().iter().enumerate() {
        writeln!(out, "\t{})\t{}", index + 1, tool.cli_name())?;
    }
    writeln!(out)?;
    Ok(())
}

/// Command table sorted by verb.
pub fn command_table(out: &mut dyn Write, vocabulary: &BTreeMap<&str, &str>) -> Result<()> {
    writeln!(out, "Available Commands:")?;
    writeln!(out)?;
    for (command, description) in vocabulary {
        writeln!(out, "\t{}\t\t{}", highlight(command), description)?;
    }
    writeln!(out)?;
    Ok(())
}

/// Full main menu: title, tool count, tool list and commands.
pub fn main_menu(
    out: &mut dyn Write,
    settings: &Settings,
    registry: &ToolRegistry,
    vocabulary: &BTreeMap<&str, &str>,
) -> Result<()> {
    title_screen(out, settings)?;
    writeln!(out, "Main Menu")?;
    writeln!(out)?;
    writeln!(out, "\t{} tools loaded", registry.count())?;
    writeln!(out)?;
    tool_list(out, registry)?;
    command_table(out, vocabulary)?;
    Ok(())
}

/// `<name> => <description>` block printed by `info`.
pub fn tool_info(out: &mut dyn Write, tool: &PluginDescriptor) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{} => {}", highlight(tool.cli_name()), tool.description())?;
    writeln!(out)?;
    Ok(())
}
