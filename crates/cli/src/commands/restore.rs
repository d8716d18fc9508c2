//! restore command - Bring a file back to a previous revision

use clap::Args;
use drb_core::{OptionId, Options};

use crate::exit_code::ExitCode;
use crate::output::Formatter;

use super::{GlobalOptions, connect, remote_path, report};

/// Restore a file to a previous revision
#[derive(Args, Debug)]
pub struct RestoreArgs {
    /// Remote file
    pub path: String,

    /// Revision to restore (see `drb revisions`)
    pub rev: String,
}

pub async fn execute(args: RestoreArgs, global: &GlobalOptions) -> ExitCode {
    let formatter = Formatter::new(global.output);
    let client = match connect(global, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let path = remote_path(&args.path);
    let options = Options::new()
        .with(OptionId::Path, &path)
        .with(OptionId::Rev, &args.rev);

    match client.restore(options).await {
        Ok(meta) => {
            if formatter.is_json() {
                formatter.json(&meta);
            } else {
                let rev = meta.rev.as_deref().unwrap_or(&args.rev);
                formatter.success(&format!(
                    "Restored {path} (now at revision {})",
                    formatter.style_name(rev)
                ));
            }
            ExitCode::Success
        }
        Err(e) => report(&formatter, "Failed to restore", &e),
    }
}
