//! share and media commands - Create links to files
//!
//! `share` returns a shareable preview link, `media` a direct link suitable
//! for streaming that expires after a few hours.

use clap::Args;
use drb_core::{Link, OptionId, Options};
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::Formatter;

use super::{GlobalOptions, connect, remote_path, report};

/// Create a shareable link to a file or folder
#[derive(Args, Debug)]
pub struct ShareArgs {
    /// Remote path
    pub path: String,

    /// Return the full URL instead of a shortened db.tt link
    #[arg(long)]
    pub long_url: bool,

    /// Response language (e.g. en, fr)
    #[arg(long)]
    pub locale: Option<String>,
}

/// Create a direct link for streaming a file
#[derive(Args, Debug)]
pub struct MediaArgs {
    /// Remote path
    pub path: String,

    /// Response language (e.g. en, fr)
    #[arg(long)]
    pub locale: Option<String>,
}

#[derive(Debug, Serialize)]
struct LinkOutput {
    path: String,
    #[serde(rename = "type")]
    link_type: &'static str,
    #[serde(flatten)]
    link: Link,
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_secs: Option<u64>,
}

/// Execute the share command
pub async fn execute(args: ShareArgs, global: &GlobalOptions) -> ExitCode {
    let formatter = Formatter::new(global.output);
    let client = match connect(global, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let path = remote_path(&args.path);
    let options = Options::new()
        .with(OptionId::Path, &path)
        .with(OptionId::ShortUrl, args.long_url.then_some(false))
        .with(OptionId::Locale, args.locale);

    match client.share(options).await {
        Ok(link) => {
            print_link(&formatter, path, "share", link);
            ExitCode::Success
        }
        Err(e) => report(&formatter, "Failed to create share link", &e),
    }
}

/// Execute the media command
pub async fn execute_media(args: MediaArgs, global: &GlobalOptions) -> ExitCode {
    let formatter = Formatter::new(global.output);
    let client = match connect(global, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let path = remote_path(&args.path);
    let options = Options::new()
        .with(OptionId::Path, &path)
        .with(OptionId::Locale, args.locale);

    match client.media(options).await {
        Ok(link) => {
            print_link(&formatter, path, "media", link);
            ExitCode::Success
        }
        Err(e) => report(&formatter, "Failed to create media link", &e),
    }
}

fn print_link(formatter: &Formatter, path: String, link_type: &'static str, link: Link) {
    let expires_secs = link.expires.as_deref().and_then(seconds_until);

    if formatter.is_json() {
        formatter.json(&LinkOutput {
            path,
            link_type,
            link,
            expires_secs,
        });
        return;
    }

    let url = link.url.as_deref().unwrap_or("-");
    formatter.println(&format!("Link for {path}:"));
    formatter.println(&formatter.style_url(url));
    if let Some(secs) = expires_secs {
        formatter.println("");
        formatter.println(&format!("Expires in: {}", format_duration(secs)));
    }
}

/// Seconds from now until an RFC 2822 date, `None` if past or unparsable
fn seconds_until(expires: &str) -> Option<u64> {
    let expires = jiff::fmt::rfc2822::parse(expires).ok()?.timestamp();
    let remaining = expires.as_second() - jiff::Timestamp::now().as_second();
    u64::try_from(remaining).ok().filter(|secs| *secs > 0)
}

/// Format duration in human-readable form
fn format_duration(secs: u64) -> String {
    if secs >= 86400 {
        let days = secs / 86400;
        let hours = (secs % 86400) / 3600;
        if hours > 0 {
            format!("{days}d {hours}h")
        } else {
            format!("{days} day(s)")
        }
    } else if secs >= 3600 {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        if mins > 0 {
            format!("{hours}h {mins}m")
        } else {
            format!("{hours} hour(s)")
        }
    } else if secs >= 60 {
        format!("{} minute(s)", secs / 60)
    } else {
        format!("{secs} second(s)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(30), "30 second(s)");
        assert_eq!(format_duration(300), "5 minute(s)");
        assert_eq!(format_duration(3600), "1 hour(s)");
        assert_eq!(format_duration(4 * 3600 + 120), "4h 2m");
        assert_eq!(format_duration(86400 + 3600), "1d 1h");
    }

    #[test]
    fn test_seconds_until_past_date() {
        assert_eq!(seconds_until("Tue, 01 Jan 2030 00:00:00 +0000").map(|s| s > 0), Some(true));
        assert_eq!(seconds_until("Tue, 19 Jul 2011 21:55:38 +0000"), None);
        assert_eq!(seconds_until("never"), None);
    }

    #[test]
    fn test_link_output_flattens_record() {
        let output = LinkOutput {
            path: "/a.txt".into(),
            link_type: "share",
            link: Link {
                url: Some("https://db.tt/abc".into()),
                expires: None,
            },
            expires_secs: None,
        };
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["url"], "https://db.tt/abc");
        assert_eq!(json["type"], "share");
        assert!(json.get("expires").is_none());
    }
}
