use crate::app::AppCreator;
use crate::process::CommandRunner;
use crate::ui::Prompt;
use crate::{Outcome, Workspace};
use anyhow::Result;

pub fn execute(
    workspace: &Workspace,
    prompt: &dyn Prompt,
    runner: &dyn CommandRunner,
    app_name: &str,
) -> Result<Outcome> {
    AppCreator::new(workspace, prompt, runner).create(app_name)
}
