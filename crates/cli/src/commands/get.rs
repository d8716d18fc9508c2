//! get command - Download a file
//!
//! Streams the file content into a local file (or stdout with `-`) and
//! reports the metadata sent alongside it.

use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use drb_core::{IoHandle, OptionId, Options};
use tempfile::NamedTempFile;

use crate::exit_code::ExitCode;
use crate::output::Formatter;

use super::{GlobalOptions, base_name, connect, format_size, remote_path, report};

/// Download a file
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Remote file
    pub path: String,

    /// Local destination, `-` for stdout (defaults to the remote file name)
    pub dest: Option<PathBuf>,

    /// Revision to download instead of the latest one
    #[arg(long)]
    pub rev: Option<String>,
}

pub async fn execute(args: GetArgs, global: &GlobalOptions) -> ExitCode {
    let formatter = Formatter::new(global.output);
    let client = match connect(global, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let path = remote_path(&args.path);
    let dest = args
        .dest
        .unwrap_or_else(|| PathBuf::from(base_name(&path)));
    let (download, sink) = match Download::open(&dest) {
        Ok(opened) => opened,
        Err(e) => {
            formatter.error(&format!("{e:#}"));
            return ExitCode::GeneralError;
        }
    };

    let options = Options::new()
        .with(OptionId::Path, &path)
        .with(OptionId::Rev, args.rev)
        .with(OptionId::IoSink, sink);

    match client.get_file(options).await {
        Ok(meta) => {
            let to_stdout = matches!(download, Download::Stdout);
            if let Err(e) = download.commit() {
                formatter.error(&format!("{e:#}"));
                return ExitCode::GeneralError;
            }
            // stdout carries the file bytes
            if to_stdout {
                return ExitCode::Success;
            }
            if formatter.is_json() {
                formatter.json(&meta);
            } else {
                let size = meta.bytes.map(format_size).unwrap_or_else(|| "?".into());
                formatter.success(&format!(
                    "Downloaded {path} to {} ({size})",
                    dest.display()
                ));
            }
            ExitCode::Success
        }
        // dropping the download discards the partial temp file
        Err(e) => report(&formatter, "Failed to download", &e),
    }
}

/// Local target of a download
///
/// File downloads go to a temp file next to the destination, which only
/// replaces the destination on [`Download::commit`].
#[derive(Debug)]
pub enum Download {
    Stdout,
    File { temp: NamedTempFile, dest: PathBuf },
}

impl Download {
    /// Open `dest` (`-` for stdout) and return the sink to download into
    pub fn open(dest: &Path) -> anyhow::Result<(Self, IoHandle)> {
        if dest == Path::new("-") {
            return Ok((Download::Stdout, IoHandle::sink(io::stdout())));
        }

        let dir = match dest.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let temp = NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create a temporary file in {}", dir.display()))?;
        let file = temp
            .reopen()
            .with_context(|| format!("Failed to open {}", temp.path().display()))?;

        let download = Download::File {
            temp,
            dest: dest.to_path_buf(),
        };
        Ok((download, IoHandle::sink(BufWriter::new(file))))
    }

    /// Move the downloaded bytes into place
    pub fn commit(self) -> anyhow::Result<()> {
        match self {
            Download::Stdout => Ok(()),
            Download::File { temp, dest } => {
                temp.persist(&dest)
                    .with_context(|| format!("Failed to write {}", dest.display()))?;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_through(sink: &IoHandle, bytes: &[u8]) {
        let IoHandle::Sink(sink) = sink else {
            panic!("expected a sink");
        };
        let mut writer = sink.lock().unwrap();
        writer.write_all(bytes).unwrap();
        writer.flush().unwrap();
    }

    #[test]
    fn test_commit_replaces_destination() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.bin");
        std::fs::write(&dest, b"old").unwrap();

        let (download, sink) = Download::open(&dest).unwrap();
        write_through(&sink, b"new content");
        drop(sink);
        download.commit().unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"new content");
    }

    #[test]
    fn test_abandoned_download_keeps_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("precious.txt");
        std::fs::write(&dest, b"keep me").unwrap();

        let (download, sink) = Download::open(&dest).unwrap();
        write_through(&sink, b"partial");
        drop(sink);
        drop(download);

        assert_eq!(std::fs::read(&dest).unwrap(), b"keep me");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_open_reports_missing_folder() {
        let dir = tempfile::tempdir().unwrap();
        let err = Download::open(&dir.path().join("missing/out.bin")).unwrap_err();
        assert!(err.to_string().contains("Failed to create a temporary file"));
    }
}
