//! search command - Find files by name

use clap::Args;
use drb_core::{OptionId, Options};

use crate::exit_code::ExitCode;
use crate::output::Formatter;

use super::ls::metadata_table;
use super::{GlobalOptions, connect, remote_path, report};

/// Search for files and folders whose name contains every query word
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Space separated words, each at least three characters
    pub query: String,

    /// Folder to search in
    #[arg(long, default_value = "/")]
    pub path: String,

    /// Maximum number of results (at most 1000)
    #[arg(long)]
    pub limit: Option<u32>,

    /// Include deleted entries
    #[arg(long)]
    pub deleted: bool,
}

pub async fn execute(args: SearchArgs, global: &GlobalOptions) -> ExitCode {
    let formatter = Formatter::new(global.output);

    if args.query.trim().is_empty() {
        formatter.error("Search query cannot be empty");
        return ExitCode::UsageError;
    }

    let client = match connect(global, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let options = Options::new()
        .with(OptionId::Path, remote_path(&args.path))
        .with(OptionId::Query, args.query.trim())
        .with(OptionId::FileLimit, args.limit)
        .with(OptionId::IncludeDeleted, args.deleted.then_some(true));

    match client.search(options).await {
        Ok(results) => {
            if formatter.is_json() {
                formatter.json(&results);
            } else if results.is_empty() {
                formatter.println("No matches");
            } else {
                formatter.print_table(&metadata_table(&formatter, &results));
                formatter.println(&format!("\n{} match(es)", results.len()));
            }
            ExitCode::Success
        }
        Err(e) => report(&formatter, "Search failed", &e),
    }
}
