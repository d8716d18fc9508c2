//! Endpoint table
//!
//! Each endpoint knows its base URL, how its request travels over HTTP and
//! which options it treats as plumbing or as defaultable query parameters.

use std::fmt;

use crate::error::{Error, Result};
use crate::option::{OptionId, OptionSet};
use crate::resolve::{OptionRules, SpecialArgs};

const API: &str = "https://api.dropbox.com/1";
const CONTENT: &str = "https://api-content.dropbox.com/1";
const NOTIFY: &str = "https://api-notify.dropbox.com/1";

/// OAuth request token URL
pub const REQUEST_TOKEN_URL: &str = "https://api.dropbox.com/1/oauth/request_token";
/// OAuth access token URL
pub const ACCESS_TOKEN_URL: &str = "https://api.dropbox.com/1/oauth/access_token";
/// Page where the user authorizes a request token
pub const AUTHORIZE_URL: &str = "https://www.dropbox.com/1/oauth/authorize";

/// HTTP method on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a request carries its parameters and payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// Parameters signed into the URL, JSON answer
    Get,
    /// Parameters sent as a form-encoded body, JSON answer
    PostForm,
    /// Parameters signed into the URL, raw bytes as body
    Upload,
    /// Parameters signed into the URL, body piped to the caller's sink
    Download,
}

impl Style {
    pub fn method(self) -> Method {
        match self {
            Style::Get | Style::Download => Method::Get,
            Style::PostForm | Style::Upload => Method::Post,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    AccountInfo,
    Metadata,
    GetFile,
    PutFile,
    Revisions,
    Search,
    Thumbnail,
    Copy,
    CreateFolder,
    Delete,
    Move,
    Delta,
    Restore,
    Share,
    Media,
    CopyRef,
    LongpollDelta,
}

const TIMEOUT: OptionSet = OptionSet::of(&[OptionId::NetworkTimeout]);
const ROOTED: OptionSet = OptionSet::of(&[OptionId::NetworkTimeout, OptionId::Root, OptionId::Path]);
const ROOTED_SINK: OptionSet = OptionSet::of(&[
    OptionId::NetworkTimeout,
    OptionId::Root,
    OptionId::Path,
    OptionId::IoSink,
]);
const ROOTED_SOURCE: OptionSet = OptionSet::of(&[
    OptionId::NetworkTimeout,
    OptionId::Root,
    OptionId::Path,
    OptionId::IoSource,
]);

impl Endpoint {
    pub const ALL: [Endpoint; 17] = [
        Endpoint::AccountInfo,
        Endpoint::Metadata,
        Endpoint::GetFile,
        Endpoint::PutFile,
        Endpoint::Revisions,
        Endpoint::Search,
        Endpoint::Thumbnail,
        Endpoint::Copy,
        Endpoint::CreateFolder,
        Endpoint::Delete,
        Endpoint::Move,
        Endpoint::Delta,
        Endpoint::Restore,
        Endpoint::Share,
        Endpoint::Media,
        Endpoint::CopyRef,
        Endpoint::LongpollDelta,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Endpoint::AccountInfo => "account_info",
            Endpoint::Metadata => "metadata",
            Endpoint::GetFile => "get_file",
            Endpoint::PutFile => "put_file",
            Endpoint::Revisions => "revisions",
            Endpoint::Search => "search",
            Endpoint::Thumbnail => "thumbnail",
            Endpoint::Copy => "copy",
            Endpoint::CreateFolder => "create_folder",
            Endpoint::Delete => "delete",
            Endpoint::Move => "move",
            Endpoint::Delta => "delta",
            Endpoint::Restore => "restore",
            Endpoint::Share => "share",
            Endpoint::Media => "media",
            Endpoint::CopyRef => "copy_ref",
            Endpoint::LongpollDelta => "longpoll_delta",
        }
    }

    pub fn style(self) -> Style {
        match self {
            Endpoint::Metadata
            | Endpoint::Revisions
            | Endpoint::Search
            | Endpoint::CopyRef
            | Endpoint::LongpollDelta => Style::Get,
            Endpoint::GetFile | Endpoint::Thumbnail => Style::Download,
            Endpoint::PutFile => Style::Upload,
            Endpoint::AccountInfo
            | Endpoint::Copy
            | Endpoint::CreateFolder
            | Endpoint::Delete
            | Endpoint::Move
            | Endpoint::Delta
            | Endpoint::Restore
            | Endpoint::Share
            | Endpoint::Media => Style::PostForm,
        }
    }

    /// Base URL; rooted endpoints get `/{root}{path}` appended
    fn base(self) -> String {
        let (host, route) = match self {
            Endpoint::AccountInfo => (API, "account/info"),
            Endpoint::Metadata => (API, "metadata"),
            Endpoint::GetFile => (CONTENT, "files"),
            Endpoint::PutFile => (CONTENT, "files_put"),
            Endpoint::Revisions => (API, "revisions"),
            Endpoint::Search => (API, "search"),
            Endpoint::Thumbnail => (CONTENT, "thumbnails"),
            Endpoint::Copy => (API, "fileops/copy"),
            Endpoint::CreateFolder => (API, "fileops/create_folder"),
            Endpoint::Delete => (API, "fileops/delete"),
            Endpoint::Move => (API, "fileops/move"),
            Endpoint::Delta => (API, "delta"),
            Endpoint::Restore => (API, "restore"),
            Endpoint::Share => (API, "shares"),
            Endpoint::Media => (API, "media"),
            Endpoint::CopyRef => (API, "copy_ref"),
            Endpoint::LongpollDelta => (NOTIFY, "longpoll_delta"),
        };
        format!("{host}/{route}")
    }

    /// Whether root and path are part of the URL
    pub fn is_rooted(self) -> bool {
        self.rules().special.contains(OptionId::Root)
    }

    pub fn rules(self) -> OptionRules {
        use OptionId::*;

        let (special, regular) = match self {
            Endpoint::AccountInfo => (TIMEOUT, OptionSet::of(&[Locale])),
            Endpoint::Metadata => (
                ROOTED,
                OptionSet::of(&[Locale, FileLimit, Hash, List, IncludeDeleted, Rev, IncludeMediaInfo]),
            ),
            Endpoint::GetFile => (ROOTED_SINK, OptionSet::of(&[Rev])),
            Endpoint::PutFile => (ROOTED_SOURCE, OptionSet::of(&[Locale, Overwrite, ParentRev])),
            Endpoint::Revisions => (ROOTED, OptionSet::of(&[Locale, RevLimit])),
            Endpoint::Search => (ROOTED, OptionSet::of(&[Locale, Query, FileLimit, IncludeDeleted])),
            Endpoint::Thumbnail => (ROOTED_SINK, OptionSet::of(&[Format, Size])),
            Endpoint::Copy => (
                TIMEOUT,
                OptionSet::of(&[Locale, Root, FromPath, ToPath, FromCopyRef]),
            ),
            Endpoint::CreateFolder | Endpoint::Delete => {
                (TIMEOUT, OptionSet::of(&[Locale, Root, Path]))
            }
            Endpoint::Move => (TIMEOUT, OptionSet::of(&[Locale, Root, FromPath, ToPath])),
            Endpoint::Delta => (
                TIMEOUT,
                OptionSet::of(&[Locale, Cursor, PathPrefix, IncludeMediaInfo]),
            ),
            Endpoint::Restore => (ROOTED, OptionSet::of(&[Locale, Rev])),
            Endpoint::Share => (ROOTED, OptionSet::of(&[Locale, ShortUrl])),
            Endpoint::Media => (ROOTED, OptionSet::of(&[Locale])),
            Endpoint::CopyRef => (ROOTED, OptionSet::EMPTY),
            // The long poll is never cut short by a client-side timeout
            Endpoint::LongpollDelta => (OptionSet::EMPTY, OptionSet::of(&[Cursor, Timeout])),
        };

        OptionRules { special, regular }
    }

    /// Request URL without query parameters
    pub fn url(self, special: &SpecialArgs) -> Result<String> {
        let mut url = self.base();
        if !self.is_rooted() {
            return Ok(url);
        }

        let root = special.root.as_deref().ok_or(Error::MissingOption(OptionId::Root))?;
        let path = special.path.as_deref().ok_or(Error::MissingOption(OptionId::Path))?;

        url.push('/');
        url.push_str(root);
        if !path.starts_with('/') {
            url.push('/');
        }
        url.push_str(path);
        Ok(url)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
