use std::path::Path;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;

use zettel::commands::{CmdGet, CmdHealth, CmdInit, CmdLink, CmdNew};
use zettel::commit::{modification_time, system_now, CommitCmd};
use zettel::config::{expand_home, Config};
use zettel::error::{Result, ResultExt};
use zettel::git::{Git, ShellGit};

#[derive(Parser, Debug)]
#[command(name = "zettel")]
#[command(author, version, about = "Plain-text notes with TOML front matter")]
struct Cli {
    /// Path to config.toml file
    #[arg(
        long,
        global = true,
        default_value = "~/.config/zettel/config.toml",
        value_name = "PATH"
    )]
    config: String,

    /// Print full error chains instead of only the deepest cause
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create config and required directories
    Init {
        /// Workspace to create instead of the configured default
        #[arg(long)]
        workspace: Option<String>,
    },
    /// Create a new note and print its path
    New {
        /// Workspace to put the note in instead of the configured default
        #[arg(long)]
        workspace: Option<String>,
        /// Print the new note to stdout instead of saving it to a file
        #[arg(long)]
        stdout: bool,
    },
    /// Find links between notes and update their headers
    Link,
    /// Get a config key, a note by UID, or the workspace listing
    Get {
        /// Print filesystem paths instead of values
        #[arg(long)]
        path: bool,
        /// Resource and key, e.g. `config root_dir` or `note <UID>`
        #[arg(required = true)]
        query: Vec<String>,
    },
    /// Stage changes, generate a commit message and run git commit
    Commit {
        /// Seconds a file must stay unmodified before it may be staged
        #[arg(long, default_value_t = 0, value_name = "SECONDS")]
        cooldown: u64,
    },
    /// Try to decode every note and report the ones that fail
    Health,
    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(error) = run(&cli) {
        let rendered = if cli.verbose {
            error.render_chain()
        } else {
            error.root_cause()
        };
        eprintln!("{}", rendered.red());
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Command::Completion { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(*shell, &mut command, "zettel", &mut std::io::stdout());
            Ok(())
        }
        Command::Init { workspace } => CmdInit {
            config_path: &cli.config,
            workspace: workspace.as_deref(),
        }
        .run(),
        Command::New { workspace, stdout } => {
            let config = load_config(cli)?;
            CmdNew {
                root: &config.expanded_root(),
                workspace: workspace.as_deref().unwrap_or(&config.default_workspace),
                to_stdout: *stdout,
            }
            .run()
        }
        Command::Link => {
            let config = load_config(cli)?;
            CmdLink {
                root: &config.expanded_root(),
            }
            .run()
        }
        Command::Get { path, query } => CmdGet {
            config_path: &cli.config,
            query,
            provide_path: *path,
        }
        .run(),
        Command::Commit { cooldown } => {
            let config = load_config(cli)?;
            let mut dirs = vec![config.expanded_root().display().to_string()];
            if let Some(index_dir) = &config.index_dir {
                if !index_dir.is_empty() {
                    dirs.push(expand_home(index_dir));
                }
            }
            CommitCmd {
                dirs,
                git_factory: Box::new(|workdir| Box::new(ShellGit::new(workdir)) as Box<dyn Git>),
                now: Box::new(system_now),
                modtime: Box::new(modification_time),
                cooldown: chrono::Duration::seconds(*cooldown as i64),
            }
            .run()
        }
        Command::Health => {
            let config = load_config(cli)?;
            CmdHealth {
                root: &config.expanded_root(),
            }
            .run()
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    Config::load(Path::new(&expand_home(&cli.config)))
        .context("cannot get config; run `zettel init` to create one")
}
