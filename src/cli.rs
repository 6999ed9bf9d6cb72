//! Non-interactive requests from the outer command line.
//!
//! `--list-tools`, the admin flags and `--tool` are evaluated in that order,
//! all of them, before the caller decides whether to open the menu. The
//! first failure stops the sequence.

use std::io::Write;

use tracing::{debug, info};

use crate::admin::{AdminAction, AdminActions};
use crate::config::CliOptions;
use crate::error::{OrchestraError, Result};
use crate::interrupt;
use crate::menu::render;
use crate::tools::ToolRegistry;

/// Whether any non-interactive request was given.
pub fn has_requests(options: &CliOptions) -> bool {
    options.list_tools || options.wants_admin_action() || options.tool.is_some()
}

/// Admin flags in execution order.
pub fn requested_actions(options: &CliOptions) -> Vec<AdminAction> {
    [
        (options.update, AdminAction::Update),
        (options.setup, AdminAction::Setup),
        (options.config, AdminAction::Config),
    ]
    .into_iter()
    .filter_map(|(wanted, action)| wanted.then_some(action))
    .collect()
}

/// Run every requested non-interactive operation.
///
/// Returns `Ok(true)` when at least one was requested, so the menu should not
/// open. An unknown `--tool` name is `OrchestraError::InvalidTool`.
pub fn run_requests(
    options: &CliOptions,
    registry: &ToolRegistry,
    admin: &AdminActions<'_>,
    out: &mut dyn Write,
) -> Result<bool> {
    if !has_requests(options) {
        return Ok(false);
    }

    if options.list_tools {
        render::tool_list(out, registry)?;
    }

    for action in requested_actions(options) {
        debug!(action = ?action, "Running administrative action");
        admin.perform(action, out)?;
    }

    if let Some(name) = &options.tool {
        let tool = registry
            .find_by_name(name)
            .ok_or_else(|| OrchestraError::InvalidTool(name.clone()))?;
        info!(tool = %tool.cli_name(), "Running tool directly");
        tool.handle().run_direct()?;
        interrupt::check()?;
    }

    out.flush()?;
    Ok(true)
}
