//! stat command - Show metadata of a single file or folder

use clap::Args;
use drb_core::{Metadata, OptionId, Options};

use crate::exit_code::ExitCode;
use crate::output::Formatter;

use super::{GlobalOptions, connect, format_modified, format_size, remote_path, report};

/// Show file or folder metadata
#[derive(Args, Debug)]
pub struct StatArgs {
    /// Remote path
    pub path: String,

    /// Revision to describe instead of the latest one
    #[arg(long)]
    pub rev: Option<String>,
}

pub async fn execute(args: StatArgs, global: &GlobalOptions) -> ExitCode {
    let formatter = Formatter::new(global.output);
    let client = match connect(global, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let options = Options::new()
        .with(OptionId::Path, remote_path(&args.path))
        .with(OptionId::List, false)
        .with(OptionId::Rev, args.rev);

    match client.metadata(options).await {
        Ok(meta) => {
            if formatter.is_json() {
                formatter.json(&meta);
            } else {
                formatter.key_values(&rows(&meta));
            }
            ExitCode::Success
        }
        Err(e) => report(&formatter, "Failed to stat", &e),
    }
}

/// `key: value` rows for every field present in `meta`
pub fn rows(meta: &Metadata) -> Vec<(&'static str, String)> {
    let mut rows = Vec::new();
    if let Some(path) = &meta.path {
        rows.push(("Path", path.clone()));
    }
    rows.push(("Type", if meta.is_dir() { "folder" } else { "file" }.to_string()));
    if let Some(bytes) = meta.bytes {
        rows.push(("Size", format!("{} ({bytes} bytes)", format_size(bytes))));
    }
    if let Some(modified) = &meta.modified {
        rows.push(("Modified", format_modified(modified)));
    }
    if let Some(mtime) = &meta.client_mtime {
        rows.push(("Client mtime", format_modified(mtime)));
    }
    if let Some(rev) = &meta.rev {
        rows.push(("Rev", rev.clone()));
    }
    if let Some(mime) = &meta.mime_type {
        rows.push(("MIME type", mime.clone()));
    }
    if let Some(root) = &meta.root {
        rows.push(("Root", root.clone()));
    }
    if let Some(hash) = &meta.hash {
        rows.push(("Hash", hash.clone()));
    }
    if meta.is_deleted() {
        rows.push(("Deleted", "yes".to_string()));
    }
    rows
}
