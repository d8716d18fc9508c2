//! drb - Dropbox command line client
//!
//! Thin command layer over drb-core: every subcommand maps onto one Dropbox
//! Core API call, formats the answer and returns a stable exit code.

mod commands;
mod exit_code;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::GlobalOptions;
use exit_code::ExitCode;
use output::OutputConfig;

#[derive(Parser, Debug)]
#[command(name = "drb", version, about = "Command line client for Dropbox", long_about = None)]
pub struct Cli {
    /// Output JSON instead of human-readable text
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output (also set by NO_COLOR)
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log requests and responses to stderr
    #[arg(long, global = true)]
    pub debug: bool,

    /// Root namespace: dropbox, sandbox or auto
    #[arg(long, global = true, env = "DRB_ROOT", value_parser = ["dropbox", "sandbox", "auto"])]
    pub root: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Authorize drb to access a Dropbox account
    Auth(commands::auth::AuthArgs),

    /// Show account information and quota usage
    Account(commands::account::AccountArgs),

    /// List files and folders
    Ls(commands::ls::LsArgs),

    /// Show file or folder metadata
    Stat(commands::stat::StatArgs),

    /// Download a file
    Get(commands::get::GetArgs),

    /// Upload a file
    Put(commands::put::PutArgs),

    /// List previous revisions of a file
    Revisions(commands::revisions::RevisionsArgs),

    /// Search for files and folders by name
    Search(commands::search::SearchArgs),

    /// Download a thumbnail of an image
    Thumbnail(commands::thumbnail::ThumbnailArgs),

    /// Copy a file or folder
    Cp(commands::fileops::CpArgs),

    /// Move or rename a file or folder
    Mv(commands::fileops::MvArgs),

    /// Delete a file or folder
    Rm(commands::fileops::RmArgs),

    /// Create a folder
    Mkdir(commands::fileops::MkdirArgs),

    /// Restore a file to a previous revision
    Restore(commands::restore::RestoreArgs),

    /// Create a shareable link
    Share(commands::share::ShareArgs),

    /// Create a direct streaming link
    Media(commands::share::MediaArgs),

    /// Create a copy reference
    CopyRef(commands::copy_ref::CopyRefArgs),

    /// List changes since a cursor
    Delta(commands::delta::DeltaArgs),

    /// Wait for changes after a cursor
    Poll(commands::delta::PollArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

fn init_tracing(debug: bool) {
    let fallback = if debug { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let global = GlobalOptions {
        output: OutputConfig {
            json: cli.json,
            no_color: cli.no_color || std::env::var_os("NO_COLOR").is_some(),
            quiet: cli.quiet,
        },
        root: cli.root,
    };

    run(cli.command, &global).await.into()
}

async fn run(command: Commands, global: &GlobalOptions) -> ExitCode {
    use commands::*;

    match command {
        Commands::Auth(args) => auth::execute(args, global).await,
        Commands::Account(args) => account::execute(args, global).await,
        Commands::Ls(args) => ls::execute(args, global).await,
        Commands::Stat(args) => stat::execute(args, global).await,
        Commands::Get(args) => get::execute(args, global).await,
        Commands::Put(args) => put::execute(args, global).await,
        Commands::Revisions(args) => revisions::execute(args, global).await,
        Commands::Search(args) => search::execute(args, global).await,
        Commands::Thumbnail(args) => thumbnail::execute(args, global).await,
        Commands::Cp(args) => fileops::execute_cp(args, global).await,
        Commands::Mv(args) => fileops::execute_mv(args, global).await,
        Commands::Rm(args) => fileops::execute_rm(args, global).await,
        Commands::Mkdir(args) => fileops::execute_mkdir(args, global).await,
        Commands::Restore(args) => restore::execute(args, global).await,
        Commands::Share(args) => share::execute(args, global).await,
        Commands::Media(args) => share::execute_media(args, global).await,
        Commands::CopyRef(args) => copy_ref::execute(args, global).await,
        Commands::Delta(args) => delta::execute(args, global).await,
        Commands::Poll(args) => delta::execute_poll(args, global).await,
        Commands::Completions(args) => completions::execute(args),
    }
}
