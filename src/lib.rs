// Public API
pub mod cli;
pub mod commands;
pub mod ui;

// Scaffolding flows
pub mod app;
pub mod configure;
pub mod project;

// Building blocks
pub mod aliases;
pub mod config;
pub mod fsutil;
pub mod manifest;
pub mod process;
pub mod templates;
pub mod tsconfig;
mod workspace;

// Re-export main types
pub use app::{AppCreator, Monorepo};
pub use config::Settings;
pub use configure::Configurator;
pub use process::{CommandRunner, PackageManager, SystemRunner};
pub use project::{ProjectCreator, ProjectTarget};
pub use templates::Templates;
pub use workspace::{Workspace, WorkspacePath};

/// How an interactive command finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Created,
    /// The user declined a confirmation; nothing was changed.
    Cancelled,
}
