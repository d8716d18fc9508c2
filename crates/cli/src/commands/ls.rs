//! ls command - List a folder
//!
//! Lists the direct children of a remote folder. Listing a file prints the
//! file itself.

use clap::Args;
use comfy_table::Table;
use drb_core::{Metadata, OptionId, Options};

use crate::exit_code::ExitCode;
use crate::output::Formatter;

use super::{GlobalOptions, connect, format_modified, format_size, remote_path, report};

/// List files and folders
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Remote folder
    #[arg(default_value = "/")]
    pub path: String,

    /// Maximum number of entries the server returns (it refuses larger folders)
    #[arg(long)]
    pub limit: Option<u32>,

    /// Include deleted entries
    #[arg(long)]
    pub deleted: bool,

    /// Only list when the folder hash differs from this one
    #[arg(long)]
    pub hash: Option<String>,

    /// Include photo and video metadata
    #[arg(long)]
    pub media_info: bool,
}

pub async fn execute(args: LsArgs, global: &GlobalOptions) -> ExitCode {
    let formatter = Formatter::new(global.output);
    let client = match connect(global, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let options = Options::new()
        .with(OptionId::Path, remote_path(&args.path))
        .with(OptionId::List, true)
        .with(OptionId::FileLimit, args.limit)
        .with(OptionId::IncludeDeleted, args.deleted.then_some(true))
        .with(OptionId::Hash, args.hash)
        .with(OptionId::IncludeMediaInfo, args.media_info.then_some(true));

    match client.metadata(options).await {
        Ok(meta) => {
            if formatter.is_json() {
                formatter.json(&meta);
                return ExitCode::Success;
            }

            let entries = match &meta.contents {
                Some(contents) if meta.is_dir() => contents.as_slice(),
                _ => std::slice::from_ref(&meta),
            };
            if entries.is_empty() {
                formatter.println("(empty)");
            } else {
                formatter.print_table(&metadata_table(&formatter, entries));
            }
            ExitCode::Success
        }
        Err(e) => report(&formatter, "Failed to list folder", &e),
    }
}

/// Table with one row per entry: size, modification date and name
pub fn metadata_table(formatter: &Formatter, entries: &[Metadata]) -> Table {
    let mut table = formatter.table(&["Size", "Modified", "Name"]);
    for entry in entries {
        table.add_row(entry_row(formatter, entry));
    }
    table
}

fn entry_row(formatter: &Formatter, entry: &Metadata) -> Vec<String> {
    let size = if entry.is_dir() {
        "-".to_string()
    } else {
        entry.bytes.map(format_size).unwrap_or_else(|| "-".into())
    };
    let modified = entry
        .modified
        .as_deref()
        .map(format_modified)
        .unwrap_or_default();

    let name = entry.name().unwrap_or("");
    let name = if entry.is_deleted() {
        formatter.style_deleted(name)
    } else if entry.is_dir() {
        formatter.style_dir(&format!("{name}/"))
    } else {
        formatter.style_file(name)
    };

    vec![
        formatter.style_size(&size),
        formatter.style_date(&modified),
        name,
    ]
}
