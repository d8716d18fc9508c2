//! copy-ref command - Create a reference for copying a file between accounts

use clap::Args;
use drb_core::{OptionId, Options};

use crate::exit_code::ExitCode;
use crate::output::Formatter;

use super::{GlobalOptions, connect, remote_path, report};

/// Create a copy reference usable with `drb cp --copy-ref`
#[derive(Args, Debug)]
pub struct CopyRefArgs {
    /// Remote file or folder
    pub path: String,
}

pub async fn execute(args: CopyRefArgs, global: &GlobalOptions) -> ExitCode {
    let formatter = Formatter::new(global.output);
    let client = match connect(global, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let options = Options::new().with(OptionId::Path, remote_path(&args.path));
    match client.copy_ref(options).await {
        Ok(reference) => {
            if formatter.is_json() {
                formatter.json(&reference);
            } else {
                let none = || "-".to_string();
                formatter.key_values(&[
                    ("Copy ref", formatter.style_name(&reference.copy_ref.clone().unwrap_or_else(none))),
                    ("Expires", reference.expires.clone().unwrap_or_else(none)),
                ]);
            }
            ExitCode::Success
        }
        Err(e) => report(&formatter, "Failed to create copy reference", &e),
    }
}
