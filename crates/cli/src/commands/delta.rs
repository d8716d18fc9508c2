//! delta and poll commands - Track changes
//!
//! `delta` pages through the change log starting at a cursor; `poll` blocks
//! until the change log moves past a cursor or the server gives up.

use clap::Args;
use drb_core::{Client, Delta, DeltaEntry, OptionId, Options, Result};

use crate::exit_code::ExitCode;
use crate::output::Formatter;

use super::{GlobalOptions, connect, remote_path, report};

/// Upper bound on pages fetched by `delta --all`
const MAX_PAGES: usize = 1000;

/// List changes since a cursor
#[derive(Args, Debug)]
pub struct DeltaArgs {
    /// Cursor from a previous call; omit to start from scratch
    #[arg(long)]
    pub cursor: Option<String>,

    /// Only report changes below this folder
    #[arg(long)]
    pub prefix: Option<String>,

    /// Keep fetching pages until the server has nothing more
    #[arg(long)]
    pub all: bool,

    /// Include photo and video metadata
    #[arg(long)]
    pub media_info: bool,
}

/// Wait for changes after a cursor
#[derive(Args, Debug)]
pub struct PollArgs {
    /// Cursor from `drb delta`
    pub cursor: String,

    /// Seconds the server may hold the request (30 to 480)
    #[arg(long, value_parser = clap::value_parser!(u32).range(30..=480))]
    pub timeout: Option<u32>,
}

pub async fn execute(args: DeltaArgs, global: &GlobalOptions) -> ExitCode {
    let formatter = Formatter::new(global.output);
    let client = match connect(global, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    match fetch(&client, &args).await {
        Ok(delta) => {
            if formatter.is_json() {
                formatter.json(&delta);
                return ExitCode::Success;
            }

            if delta.reset == Some(true) {
                formatter.warning("Reset: discard any local state before applying these entries");
            }
            for entry in &delta.entries {
                formatter.println(&entry_line(&formatter, entry));
            }
            if let Some(cursor) = &delta.cursor {
                formatter.println("");
                formatter.println(&format!("{} {cursor}", formatter.style_key("cursor:")));
            }
            if delta.has_more == Some(true) {
                formatter.println("More changes are pending, run again with this cursor or --all");
            }
            ExitCode::Success
        }
        Err(e) => report(&formatter, "Failed to fetch changes", &e),
    }
}

/// One page, or every page merged when `--all` is given
async fn fetch(client: &Client, args: &DeltaArgs) -> Result<Delta> {
    let mut merged = Delta::default();
    let mut cursor = args.cursor.clone();

    for page in 0..MAX_PAGES {
        let options = Options::new()
            .with(OptionId::Cursor, cursor.as_deref())
            .with(OptionId::PathPrefix, args.prefix.as_deref().map(remote_path))
            .with(OptionId::IncludeMediaInfo, args.media_info.then_some(true));

        let delta = client.delta(options).await?;
        tracing::debug!(page, entries = delta.entries.len(), has_more = ?delta.has_more, "Delta page");

        merge_page(&mut merged, delta, page == 0);

        if !args.all || merged.has_more != Some(true) || merged.cursor.is_none() {
            break;
        }
        cursor = merged.cursor.clone();
    }

    Ok(merged)
}

/// Fold one page into the merged listing
///
/// A page that asks for a reset starts the listing over.
fn merge_page(merged: &mut Delta, delta: Delta, first: bool) {
    if delta.reset == Some(true) {
        merged.entries.clear();
        merged.reset = Some(true);
    } else if first {
        merged.reset = delta.reset;
    }
    merged.entries.extend(delta.entries);
    merged.cursor = delta.cursor;
    merged.has_more = delta.has_more;
}

fn entry_line(formatter: &Formatter, entry: &DeltaEntry) -> String {
    let path = entry.path.as_deref().unwrap_or("?");
    match &entry.metadata {
        None => format!("- {}", formatter.style_deleted(path)),
        Some(meta) => {
            // the entry path is lowercased, the metadata keeps the real case
            let shown = meta.path.as_deref().unwrap_or(path);
            if meta.is_dir() {
                format!("+ {}", formatter.style_dir(&format!("{shown}/")))
            } else {
                format!("+ {}", formatter.style_file(shown))
            }
        }
    }
}

pub async fn execute_poll(args: PollArgs, global: &GlobalOptions) -> ExitCode {
    let formatter = Formatter::new(global.output);
    let client = match connect(global, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let options = Options::new()
        .with(OptionId::Cursor, &args.cursor)
        .with(OptionId::Timeout, args.timeout);

    match client.longpoll_delta(options).await {
        Ok(poll) => {
            if formatter.is_json() {
                formatter.json(&poll);
            } else {
                let message = if poll.changes == Some(true) {
                    "Changes available"
                } else {
                    "No changes"
                };
                formatter.println(message);
                if let Some(backoff) = poll.backoff {
                    formatter.println(&format!("Wait {backoff} second(s) before polling again"));
                }
            }
            ExitCode::Success
        }
        Err(e) => report(&formatter, "Long poll failed", &e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputConfig;
    use drb_core::Metadata;

    fn plain() -> Formatter {
        Formatter::new(OutputConfig {
            no_color: true,
            ..Default::default()
        })
    }

    #[test]
    fn test_entry_line_deleted() {
        let entry = DeltaEntry {
            path: Some("/old.txt".into()),
            metadata: None,
        };
        assert_eq!(entry_line(&plain(), &entry), "- /old.txt");
    }

    #[test]
    fn test_entry_line_keeps_real_case() {
        let entry = DeltaEntry {
            path: Some("/photos".into()),
            metadata: Some(Metadata {
                path: Some("/Photos".into()),
                is_dir: Some(true),
                ..Default::default()
            }),
        };
        assert_eq!(entry_line(&plain(), &entry), "+ /Photos/");
    }

    fn page(reset: bool, paths: &[&str], cursor: &str) -> Delta {
        Delta {
            reset: Some(reset),
            cursor: Some(cursor.into()),
            has_more: Some(true),
            entries: paths
                .iter()
                .map(|p| DeltaEntry {
                    path: Some((*p).into()),
                    metadata: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_merge_later_reset_starts_over() {
        let mut merged = Delta::default();
        merge_page(&mut merged, page(false, &["/a", "/b"], "c1"), true);
        merge_page(&mut merged, page(true, &["/c"], "c2"), false);

        assert_eq!(merged.reset, Some(true));
        assert_eq!(merged.cursor.as_deref(), Some("c2"));
        let paths: Vec<_> = merged.entries.iter().filter_map(|e| e.path.as_deref()).collect();
        assert_eq!(paths, ["/c"]);
    }

    #[test]
    fn test_merge_keeps_first_page_reset() {
        let mut merged = Delta::default();
        merge_page(&mut merged, page(true, &["/a"], "c1"), true);
        merge_page(&mut merged, page(false, &["/b"], "c2"), false);

        assert_eq!(merged.reset, Some(true));
        assert_eq!(merged.entries.len(), 2);
    }
}
