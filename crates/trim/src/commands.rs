//! Executes parsed commands against a running orchestrator.
//!
//! Output is line oriented with tab-separated columns so it can be piped
//! through `cut` or `column -t`.

use std::io::Write;

use trim_plugins::{
    HostLoader, LifecycleState, Orchestrator, PluginError, PluginListing, ToolbarButtonExtension,
};

use crate::AppError;
use crate::cli::CliCommand;

pub(crate) fn execute<H, W>(
    command: &CliCommand,
    orchestrator: &Orchestrator<H>,
    out: &mut W,
) -> Result<(), AppError>
where
    H: HostLoader,
    W: Write,
{
    match command {
        CliCommand::List => list(orchestrator, out),
        CliCommand::Enable { id } => toggle(orchestrator, id, true, out),
        CliCommand::Disable { id } => toggle(orchestrator, id, false, out),
        CliCommand::Toolbar => toolbar(orchestrator, out),
    }
}

const fn policy(enabled: bool) -> &'static str {
    if enabled { "enabled" } else { "disabled" }
}

fn list<H: HostLoader, W: Write>(
    orchestrator: &Orchestrator<H>,
    out: &mut W,
) -> Result<(), AppError> {
    for listing in orchestrator.catalog() {
        write_listing(out, &listing)?;
    }
    for id in orchestrator.stale_records() {
        let enabled = orchestrator.is_enabled(&id);
        writeln!(out, "{id}\t{}\tnot installed", policy(enabled)).map_err(AppError::Write)?;
    }
    Ok(())
}

fn toggle<H: HostLoader, W: Write>(
    orchestrator: &Orchestrator<H>,
    id: &str,
    desired: bool,
    out: &mut W,
) -> Result<(), AppError> {
    orchestrator.set_enabled(id, desired);
    match orchestrator.describe(id) {
        Ok(listing) => {
            write_listing(out, &listing)?;
            match listing.failure {
                Some(source) if listing.state == LifecycleState::Failed => {
                    Err(AppError::PluginFailed {
                        id: id.to_owned(),
                        source,
                    })
                }
                _ => Ok(()),
            }
        }
        Err(PluginError::UnknownPluginId { .. }) => writeln!(
            out,
            "{id}\t{}\tnot installed; policy stored",
            policy(desired)
        )
        .map_err(AppError::Write),
        Err(error) => Err(AppError::Plugins(error)),
    }
}

fn toolbar<H: HostLoader, W: Write>(
    orchestrator: &Orchestrator<H>,
    out: &mut W,
) -> Result<(), AppError> {
    for button in orchestrator.extensions::<dyn ToolbarButtonExtension>() {
        let availability = if button.initially_disabled() {
            " (disabled)"
        } else {
            ""
        };
        let tooltip = button
            .tooltip()
            .map(|text| format!("\t{text}"))
            .unwrap_or_default();
        writeln!(out, "{}{availability}{tooltip}", button.text()).map_err(AppError::Write)?;
    }
    Ok(())
}

fn write_listing<W: Write>(out: &mut W, listing: &PluginListing) -> Result<(), AppError> {
    writeln!(
        out,
        "{}\t{}\t{}\t{}",
        listing.identity.id(),
        policy(listing.enabled),
        listing.state,
        listing.display_name
    )
    .map_err(AppError::Write)?;
    if let Some(failure) = &listing.failure {
        writeln!(out, "\terror: {failure}").map_err(AppError::Write)?;
    }
    Ok(())
}
