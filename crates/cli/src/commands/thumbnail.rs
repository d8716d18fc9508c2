//! thumbnail command - Download an image thumbnail

use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use drb_core::option::{SIZE_LARGE, SIZE_MEDIUM, SIZE_SMALL, SIZE_XLARGE, SIZE_XSMALL};
use drb_core::{OptionId, Options};

use crate::exit_code::ExitCode;
use crate::output::Formatter;

use super::get::Download;
use super::{GlobalOptions, base_name, connect, remote_path, report};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ThumbnailSize {
    /// 32x32
    Xs,
    /// 64x64
    #[default]
    S,
    /// 128x128
    M,
    /// 640x480
    L,
    /// 1024x768
    Xl,
}

impl ThumbnailSize {
    pub fn as_str(self) -> &'static str {
        match self {
            ThumbnailSize::Xs => SIZE_XSMALL,
            ThumbnailSize::S => SIZE_SMALL,
            ThumbnailSize::M => SIZE_MEDIUM,
            ThumbnailSize::L => SIZE_LARGE,
            ThumbnailSize::Xl => SIZE_XLARGE,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ThumbnailFormat {
    #[default]
    Jpeg,
    Png,
}

impl ThumbnailFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ThumbnailFormat::Jpeg => "jpeg",
            ThumbnailFormat::Png => "png",
        }
    }

    fn extension(self) -> &'static str {
        match self {
            ThumbnailFormat::Jpeg => "jpg",
            ThumbnailFormat::Png => "png",
        }
    }
}

/// Download a thumbnail of an image
#[derive(Args, Debug)]
pub struct ThumbnailArgs {
    /// Remote image
    pub path: String,

    /// Local destination, `-` for stdout
    pub dest: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t)]
    pub size: ThumbnailSize,

    #[arg(long, value_enum, default_value_t)]
    pub format: ThumbnailFormat,
}

pub async fn execute(args: ThumbnailArgs, global: &GlobalOptions) -> ExitCode {
    let formatter = Formatter::new(global.output);
    let client = match connect(global, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let path = remote_path(&args.path);
    let dest = args
        .dest
        .unwrap_or_else(|| default_dest(&path, args.size, args.format));
    let (download, sink) = match Download::open(&dest) {
        Ok(opened) => opened,
        Err(e) => {
            formatter.error(&format!("{e:#}"));
            return ExitCode::GeneralError;
        }
    };

    let options = Options::new()
        .with(OptionId::Path, &path)
        .with(OptionId::Size, args.size.as_str())
        .with(OptionId::Format, args.format.as_str())
        .with(OptionId::IoSink, sink);

    match client.thumbnail(options).await {
        Ok(meta) => {
            let to_stdout = matches!(download, Download::Stdout);
            if let Err(e) = download.commit() {
                formatter.error(&format!("{e:#}"));
                return ExitCode::GeneralError;
            }
            if to_stdout {
                return ExitCode::Success;
            }
            if formatter.is_json() {
                formatter.json(&meta);
            } else {
                formatter.success(&format!("Saved thumbnail of {path} to {}", dest.display()));
            }
            ExitCode::Success
        }
        Err(e) => report(&formatter, "Failed to get thumbnail", &e),
    }
}

/// `photo.jpg` becomes `photo_s.jpg`
fn default_dest(path: &str, size: ThumbnailSize, format: ThumbnailFormat) -> PathBuf {
    let name = base_name(path);
    let stem = Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name);
    PathBuf::from(format!("{stem}_{}.{}", size.as_str(), format.extension()))
}
