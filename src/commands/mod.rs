use crate::cli::{Cli, Commands, CreateAction};
use crate::config::Settings;
use crate::process::SystemRunner;
use crate::ui::{self, TerminalPrompt};
use crate::{Outcome, Workspace};
use anyhow::{Context, Result};
use std::env;

mod create;
mod create_app;

pub fn execute(cli: Cli) -> Result<()> {
    let settings = Settings::load_default()?.with_overrides(cli.package_manager, cli.templates);
    tracing::debug!(?settings, "resolved settings");

    // Every command operates on the directory it was invoked from
    let cwd = env::current_dir().context("Failed to determine current directory")?;
    let workspace = Workspace::new(cwd, &settings)?;
    let prompt = TerminalPrompt;

    let outcome = match cli.command {
        Commands::Create(args) => match args.action {
            Some(CreateAction::App { app_name }) => {
                create_app::execute(&workspace, &prompt, &SystemRunner, &app_name)
            }
            None => {
                let project_name = args
                    .project_name
                    .context("A project name is required (use `.` for the current directory)")?;
                create::execute(&workspace, &prompt, &project_name, args.yes)
            }
        },
    }?;

    if outcome == Outcome::Cancelled {
        ui::info("Operation cancelled.");
    }
    Ok(())
}
