//! stepview CLI - builds and previews the step viewer site.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use stepview_static::BuildError;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "stepview")]
#[command(about = "Static site generator for step-by-step coding experiments")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project root holding the step tags, folders and docs
    #[arg(short, long, global = true, env = "STEPVIEW_ROOT", default_value = ".")]
    root: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the full site: steps, manifest and shell pages
    Build {
        /// Output directory (defaults to <root>/site)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip CSS minification
        #[arg(long)]
        no_minify: bool,

        /// Emit placeholder steps instead of building the project's steps
        #[arg(long)]
        mock: bool,
    },

    /// Render a Markdown file to an HTML fragment on stdout
    Render {
        /// Markdown file to render
        file: Option<PathBuf>,
    },

    /// Generate only the shell pages for the given steps
    Shell {
        /// Step ids, e.g. step-01 step-02 (or just 1 2)
        #[arg(required = true)]
        steps: Vec<String>,

        /// Output directory (defaults to <root>/site)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Preview the built site
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// Directory to serve (defaults to <root>/site)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Do not open browser
        #[arg(long)]
        no_open: bool,
    },

    /// Create a viewer config and sample docs
    Init {
        /// Overwrite existing files
        #[arg(short, long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so `render` output stays clean
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::from(exit_status(&e))
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let root = cli.root;

    match cli.command {
        Commands::Build {
            output,
            no_minify,
            mock,
        } => {
            commands::build::run(root, output, !no_minify, mock).await?;
        }
        Commands::Render { file } => {
            commands::render::run(file)?;
        }
        Commands::Shell { steps, output } => {
            commands::shell::run(root, steps, output)?;
        }
        Commands::Serve { port, dir, no_open } => {
            let dir = dir.unwrap_or_else(|| root.join("site"));
            commands::serve::run(port, dir, !no_open).await?;
        }
        Commands::Init { yes } => {
            commands::init::run(&root, yes)?;
        }
    }

    Ok(())
}

/// Exit status for a failed command: a failing tool's own status, else 1.
fn exit_status(err: &anyhow::Error) -> u8 {
    let code = err
        .downcast_ref::<BuildError>()
        .map(BuildError::exit_code)
        .unwrap_or(1);
    u8::try_from(code).ok().filter(|c| *c != 0).unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepview_static::ToolError;

    #[test]
    fn tool_failures_keep_their_status() {
        let err = anyhow::Error::new(BuildError::Tool(ToolError {
            command: "npx vite build".to_string(),
            status: Some(2),
            stderr: String::new(),
        }));

        assert_eq!(exit_status(&err), 2);
    }

    #[test]
    fn other_failures_exit_with_one() {
        assert_eq!(exit_status(&anyhow::anyhow!("usage")), 1);

        let out_of_range = anyhow::Error::new(BuildError::Tool(ToolError {
            command: "npm ci".to_string(),
            status: Some(300),
            stderr: String::new(),
        }));
        assert_eq!(exit_status(&out_of_range), 1);
    }

    #[test]
    fn parses_global_root() {
        let cli = Cli::try_parse_from(["stepview", "build", "--root", "/tmp/demo", "--mock"]).unwrap();

        assert_eq!(cli.root, PathBuf::from("/tmp/demo"));
        assert!(matches!(cli.command, Commands::Build { mock: true, .. }));
    }

    #[test]
    fn render_file_is_optional_for_usage_message() {
        let cli = Cli::try_parse_from(["stepview", "render"]).unwrap();

        assert!(matches!(cli.command, Commands::Render { file: None }));
    }
}
