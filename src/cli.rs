use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// ByteForge - scaffold React + TypeScript monorepos
///
/// byteforge creates a monorepo from a bundled template and adds Vite apps
/// under `apps/`, wiring them into the shared TypeScript and Vite
/// configuration so they are importable as `@<app>`.
#[derive(Parser, Debug)]
#[command(name = "byteforge", author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Package manager used to scaffold apps and install packages
    #[arg(
        long,
        global = true,
        value_name = "PROGRAM",
        env = "BYTEFORGE_PACKAGE_MANAGER"
    )]
    pub package_manager: Option<String>,

    /// Read templates from this directory instead of the bundled ones
    #[arg(long, global = true, value_name = "DIR", env = "BYTEFORGE_TEMPLATES")]
    pub templates: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new monorepo project, or an app inside one
    ///
    /// `byteforge create <NAME>` creates the project in ./<NAME>;
    /// `byteforge create .` initialises the current directory.
    /// Run `byteforge create app <NAME>` from a monorepo root to add an app.
    Create(CreateArgs),
}

#[derive(Args, Debug)]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
pub struct CreateArgs {
    #[command(subcommand)]
    pub action: Option<CreateAction>,

    /// Project directory name, or `.` for the current directory
    #[arg(value_name = "PROJECT_NAME", required = true)]
    pub project_name: Option<String>,

    /// Skip confirmation prompts
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Subcommand, Debug)]
pub enum CreateAction {
    /// Add a React app to apps/ in the current monorepo
    App {
        /// App directory name under apps/
        #[arg(value_name = "APP_NAME")]
        app_name: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_create_project() {
        let cli = Cli::try_parse_from(["byteforge", "create", "My App", "-y"]).unwrap();
        let Commands::Create(args) = cli.command;
        assert_eq!(args.project_name.as_deref(), Some("My App"));
        assert!(args.yes);
        assert!(args.action.is_none());
    }

    #[test]
    fn test_parse_create_app() {
        let cli = Cli::try_parse_from(["byteforge", "create", "app", "web"]).unwrap();
        let Commands::Create(args) = cli.command;
        match args.action {
            Some(CreateAction::App { app_name }) => assert_eq!(app_name, "web"),
            None => panic!("expected app action"),
        }
    }

    #[test]
    fn test_project_name_required() {
        assert!(Cli::try_parse_from(["byteforge", "create"]).is_err());
        assert!(Cli::try_parse_from(["byteforge", "create", "app"]).is_err());
    }

    #[test]
    fn test_global_overrides() {
        let cli = Cli::try_parse_from([
            "byteforge",
            "create",
            ".",
            "--package-manager",
            "pnpm",
            "--templates",
            "/tmp/tpl",
        ])
        .unwrap();
        assert_eq!(cli.package_manager.as_deref(), Some("pnpm"));
        assert_eq!(cli.templates, Some(PathBuf::from("/tmp/tpl")));
    }
}
