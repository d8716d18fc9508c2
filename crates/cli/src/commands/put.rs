//! put command - Upload a file

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use drb_core::{IoHandle, OptionId, Options};

use crate::exit_code::ExitCode;
use crate::output::Formatter;

use super::{GlobalOptions, connect, format_size, remote_path, report};

/// Upload a file
#[derive(Args, Debug)]
pub struct PutArgs {
    /// Local file, `-` for stdin
    pub source: PathBuf,

    /// Remote destination; a trailing `/` keeps the local file name
    pub dest: Option<String>,

    /// Keep both files instead of replacing an existing one
    #[arg(long)]
    pub no_overwrite: bool,

    /// Revision the upload is based on; a conflicting upload gets a new name
    #[arg(long)]
    pub parent_rev: Option<String>,
}

pub async fn execute(args: PutArgs, global: &GlobalOptions) -> ExitCode {
    let formatter = Formatter::new(global.output);

    let path = match destination(&args.source, args.dest.as_deref()) {
        Ok(p) => p,
        Err(e) => {
            formatter.error(&format!("{e:#}"));
            return ExitCode::UsageError;
        }
    };

    let source = match open_source(&args.source) {
        Ok(s) => s,
        Err(e) => {
            formatter.error(&format!("{e:#}"));
            return ExitCode::GeneralError;
        }
    };

    let client = match connect(global, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let options = Options::new()
        .with(OptionId::Path, &path)
        .with(OptionId::IoSource, source)
        .with(OptionId::Overwrite, args.no_overwrite.then_some(false))
        .with(OptionId::ParentRev, args.parent_rev);

    match client.put_file(options).await {
        Ok(meta) => {
            if formatter.is_json() {
                formatter.json(&meta);
            } else {
                let stored = meta.path.as_deref().unwrap_or(&path);
                let size = meta.bytes.map(format_size).unwrap_or_else(|| "?".into());
                formatter.success(&format!("Uploaded {stored} ({size})"));
                if stored != path {
                    formatter.warning(&format!("{path} already existed, stored as {stored}"));
                }
            }
            ExitCode::Success
        }
        Err(e) => report(&formatter, "Failed to upload", &e),
    }
}

/// Remote path for uploading `source` to `dest`
pub fn destination(source: &Path, dest: Option<&str>) -> anyhow::Result<String> {
    let file_name = || {
        source
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|_| source != Path::new("-"))
            .context("A remote file name is required when uploading from stdin")
    };

    match dest {
        None => Ok(remote_path(file_name()?)),
        Some(dest) if dest.ends_with('/') => Ok(remote_path(&format!("{dest}{}", file_name()?))),
        Some(dest) => Ok(remote_path(dest)),
    }
}

fn open_source(source: &Path) -> anyhow::Result<IoHandle> {
    if source == Path::new("-") {
        return Ok(IoHandle::source(io::stdin()));
    }
    let file = File::open(source).with_context(|| format!("Failed to open {}", source.display()))?;
    Ok(IoHandle::source(file))
}
