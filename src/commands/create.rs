use crate::project::ProjectCreator;
use crate::ui::Prompt;
use crate::{Outcome, Workspace};
use anyhow::Result;

pub fn execute(
    workspace: &Workspace,
    prompt: &dyn Prompt,
    project_name: &str,
    skip_confirmation: bool,
) -> Result<Outcome> {
    ProjectCreator::new(workspace, prompt).create(project_name, skip_confirmation)
}
