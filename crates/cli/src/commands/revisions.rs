//! revisions command - List previous revisions of a file

use clap::Args;
use drb_core::{Metadata, OptionId, Options};

use crate::exit_code::ExitCode;
use crate::output::Formatter;

use super::{GlobalOptions, connect, format_modified, format_size, remote_path, report};

/// List previous revisions of a file
#[derive(Args, Debug)]
pub struct RevisionsArgs {
    /// Remote file
    pub path: String,

    /// Maximum number of revisions (server default 10, at most 1000)
    #[arg(long)]
    pub limit: Option<u32>,
}

pub async fn execute(args: RevisionsArgs, global: &GlobalOptions) -> ExitCode {
    let formatter = Formatter::new(global.output);
    let client = match connect(global, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let options = Options::new()
        .with(OptionId::Path, remote_path(&args.path))
        .with(OptionId::RevLimit, args.limit);

    match client.revisions(options).await {
        Ok(revisions) => {
            if formatter.is_json() {
                formatter.json(&revisions);
                return ExitCode::Success;
            }

            let mut table = formatter.table(&["Rev", "Size", "Modified", ""]);
            for rev in &revisions {
                table.add_row(row(&formatter, rev));
            }
            formatter.print_table(&table);
            ExitCode::Success
        }
        Err(e) => report(&formatter, "Failed to list revisions", &e),
    }
}

fn row(formatter: &Formatter, rev: &Metadata) -> Vec<String> {
    vec![
        formatter.style_name(rev.rev.as_deref().unwrap_or("-")),
        formatter.style_size(&rev.bytes.map(format_size).unwrap_or_else(|| "-".into())),
        formatter.style_date(&rev.modified.as_deref().map(format_modified).unwrap_or_default()),
        if rev.is_deleted() {
            formatter.style_deleted("deleted")
        } else {
            String::new()
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputConfig;

    #[test]
    fn test_row_marks_deleted_revisions() {
        let formatter = Formatter::new(OutputConfig {
            no_color: true,
            ..Default::default()
        });
        let rev = Metadata {
            rev: Some("a1c10ce0dd78".into()),
            bytes: Some(0),
            is_deleted: Some(true),
            ..Default::default()
        };
        assert_eq!(row(&formatter, &rev), vec!["a1c10ce0dd78", "0 B", "", "deleted"]);
    }
}
