//! cp, mv, rm and mkdir commands - Server-side file operations

use clap::Args;
use drb_core::{Metadata, OptionId, Options, Result};

use crate::exit_code::ExitCode;
use crate::output::Formatter;

use super::{GlobalOptions, connect, remote_path, report};

/// Copy a file or folder
#[derive(Args, Debug)]
pub struct CpArgs {
    /// Source and destination paths (only the destination with --copy-ref)
    #[arg(required = true, num_args = 1..=2, value_name = "PATH")]
    pub paths: Vec<String>,

    /// Copy from a reference made with `drb copy-ref` instead of a path
    #[arg(long)]
    pub copy_ref: Option<String>,
}

impl CpArgs {
    /// Source path (if any) and destination path
    fn endpoints(&self) -> std::result::Result<(Option<String>, String), &'static str> {
        match (self.paths.as_slice(), &self.copy_ref) {
            ([to], Some(_)) => Ok((None, remote_path(to))),
            ([from, to], None) => Ok((Some(remote_path(from)), remote_path(to))),
            ([_, _], Some(_)) => Err("--copy-ref takes only a destination path"),
            _ => Err("Both a source and a destination path are required"),
        }
    }
}

/// Move or rename a file or folder
#[derive(Args, Debug)]
pub struct MvArgs {
    /// Source path
    pub from: String,

    /// Destination path
    pub to: String,
}

/// Delete a file or folder
#[derive(Args, Debug)]
pub struct RmArgs {
    /// Remote path
    pub path: String,
}

/// Create a folder
#[derive(Args, Debug)]
pub struct MkdirArgs {
    /// Remote path
    pub path: String,
}

pub async fn execute_cp(args: CpArgs, global: &GlobalOptions) -> ExitCode {
    let formatter = Formatter::new(global.output);
    let (from, to) = match args.endpoints() {
        Ok(paths) => paths,
        Err(message) => {
            formatter.error(message);
            return ExitCode::UsageError;
        }
    };

    let client = match connect(global, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let source = from.clone().unwrap_or_else(|| "reference".into());
    let options = Options::new()
        .with(OptionId::FromPath, from)
        .with(OptionId::FromCopyRef, args.copy_ref)
        .with(OptionId::ToPath, &to);

    finish(&formatter, client.copy(options).await, "Copied", &format!("{source} to {to}"))
}

pub async fn execute_mv(args: MvArgs, global: &GlobalOptions) -> ExitCode {
    let formatter = Formatter::new(global.output);
    let client = match connect(global, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let (from, to) = (remote_path(&args.from), remote_path(&args.to));
    let options = Options::new()
        .with(OptionId::FromPath, &from)
        .with(OptionId::ToPath, &to);

    finish(&formatter, client.move_item(options).await, "Moved", &format!("{from} to {to}"))
}

pub async fn execute_rm(args: RmArgs, global: &GlobalOptions) -> ExitCode {
    let formatter = Formatter::new(global.output);
    let client = match connect(global, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let path = remote_path(&args.path);
    if path == "/" {
        formatter.error("Refusing to delete the root folder");
        return ExitCode::UsageError;
    }

    let options = Options::new().with(OptionId::Path, &path);
    finish(&formatter, client.delete(options).await, "Deleted", &path)
}

pub async fn execute_mkdir(args: MkdirArgs, global: &GlobalOptions) -> ExitCode {
    let formatter = Formatter::new(global.output);
    let client = match connect(global, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let path = remote_path(&args.path);
    let options = Options::new().with(OptionId::Path, &path);
    finish(&formatter, client.create_folder(options).await, "Created", &path)
}

fn finish(formatter: &Formatter, result: Result<Metadata>, verb: &str, what: &str) -> ExitCode {
    match result {
        Ok(meta) => {
            if formatter.is_json() {
                formatter.json(&meta);
            } else {
                formatter.success(&format!("{verb} {what}"));
            }
            ExitCode::Success
        }
        Err(e) => report(formatter, &format!("{verb} failed for {what}"), &e),
    }
}
