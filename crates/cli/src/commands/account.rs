//! account command - Show account information and quota usage

use clap::Args;
use drb_core::{AccountInfo, OptionId, Options};

use crate::exit_code::ExitCode;
use crate::output::Formatter;

use super::{GlobalOptions, connect, format_size, report};

/// Show account information and quota usage
#[derive(Args, Debug)]
pub struct AccountArgs {
    /// Response language (e.g. en, fr)
    #[arg(long)]
    pub locale: Option<String>,
}

pub async fn execute(args: AccountArgs, global: &GlobalOptions) -> ExitCode {
    let formatter = Formatter::new(global.output);
    let client = match connect(global, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let options = Options::new().with(OptionId::Locale, args.locale);
    match client.account_info(options).await {
        Ok(info) => {
            if formatter.is_json() {
                formatter.json(&info);
            } else {
                formatter.key_values(&rows(&info, &formatter));
            }
            ExitCode::Success
        }
        Err(e) => report(&formatter, "Failed to get account info", &e),
    }
}

fn rows(info: &AccountInfo, formatter: &Formatter) -> Vec<(&'static str, String)> {
    let text = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
    let bytes = |value: Option<u64>| value.map(format_size).unwrap_or_else(|| "-".to_string());

    let quota = info.quota_info.clone().unwrap_or_default();
    let usage = match (quota.used(), quota.quota) {
        (Some(used), Some(total)) if total > 0 => format!(
            "{} of {} ({:.1}%)",
            format_size(used),
            format_size(total),
            used as f64 / total as f64 * 100.0
        ),
        (used, total) => format!("{} of {}", bytes(used), bytes(total)),
    };

    vec![
        ("Name", formatter.style_name(&text(&info.display_name))),
        ("Email", text(&info.email)),
        ("UID", info.uid.map(|u| u.to_string()).unwrap_or_else(|| "-".into())),
        ("Country", text(&info.country)),
        ("Quota", formatter.style_size(&usage)),
        ("Shared", bytes(quota.shared)),
        ("Referral", formatter.style_url(&text(&info.referral_link))),
    ]
}
