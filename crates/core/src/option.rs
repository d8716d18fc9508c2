//! Option registry and call options
//!
//! Every endpoint takes an ordered list of `(OptionId, Value)` pairs. The
//! registry describes each identifier once: the query parameter name it is
//! sent under (if any) and the kind of value it expects.

use std::fmt;
use std::io::{Read, Write};
use std::sync::{Arc, Mutex};

/// Root namespace values accepted by the `root` option
pub const ROOT_DROPBOX: &str = "dropbox";
pub const ROOT_SANDBOX: &str = "sandbox";
pub const ROOT_AUTO: &str = "auto";

/// Thumbnail sizes accepted by the `size` option
pub const SIZE_XSMALL: &str = "xs";
pub const SIZE_SMALL: &str = "s";
pub const SIZE_MEDIUM: &str = "m";
pub const SIZE_LARGE: &str = "l";
pub const SIZE_XLARGE: &str = "xl";

/// Identifier of a call option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OptionId {
    Cursor,
    FileLimit,
    Format,
    FromCopyRef,
    FromPath,
    Hash,
    IncludeDeleted,
    List,
    Locale,
    Overwrite,
    Path,
    ParentRev,
    Query,
    Rev,
    RevLimit,
    Root,
    ShortUrl,
    Size,
    ToPath,
    /// Destination of downloaded bytes
    IoSink,
    /// Origin of uploaded bytes
    IoSource,
    /// Server-side long-poll timeout, in seconds
    Timeout,
    /// Client-side request timeout in seconds, 0 meaning none
    NetworkTimeout,
    IncludeMediaInfo,
    PathPrefix,
}

impl OptionId {
    pub const ALL: [OptionId; 25] = [
        OptionId::Cursor,
        OptionId::FileLimit,
        OptionId::Format,
        OptionId::FromCopyRef,
        OptionId::FromPath,
        OptionId::Hash,
        OptionId::IncludeDeleted,
        OptionId::List,
        OptionId::Locale,
        OptionId::Overwrite,
        OptionId::Path,
        OptionId::ParentRev,
        OptionId::Query,
        OptionId::Rev,
        OptionId::RevLimit,
        OptionId::Root,
        OptionId::ShortUrl,
        OptionId::Size,
        OptionId::ToPath,
        OptionId::IoSink,
        OptionId::IoSource,
        OptionId::Timeout,
        OptionId::NetworkTimeout,
        OptionId::IncludeMediaInfo,
        OptionId::PathPrefix,
    ];

    /// Human readable label, used in error messages
    pub fn label(self) -> &'static str {
        match describe(self).and_then(|d| d.name) {
            Some(name) => name,
            None => match self {
                OptionId::IoSink => "io_sink",
                OptionId::IoSource => "io_source",
                OptionId::NetworkTimeout => "network_timeout",
                _ => "unnamed",
            },
        }
    }

    const fn bit(self) -> u32 {
        1 << (self as u32)
    }
}

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Kind of value an option expects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Bool,
    Str,
    /// Non-negative integer sent as decimal text
    Int,
    /// String sent percent-encoded with `/` preserved
    Path,
    /// Caller I/O handle, never sent
    Handle,
    /// Integer consumed locally, never sent
    Raw,
}

/// Registry entry for an option identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor {
    pub id: OptionId,
    /// Query parameter name, `None` for plumbing-only options
    pub name: Option<&'static str>,
    pub kind: ValueKind,
}

/// Look up the descriptor of an option
///
/// Total over [`OptionId::ALL`] today. A `None` answer surfaces as an
/// unknown-option error at call time.
pub fn describe(id: OptionId) -> Option<Descriptor> {
    let (name, kind) = match id {
        OptionId::Cursor => (Some("cursor"), ValueKind::Str),
        OptionId::FileLimit => (Some("file_limit"), ValueKind::Int),
        OptionId::Format => (Some("format"), ValueKind::Str),
        OptionId::FromCopyRef => (Some("from_copy_ref"), ValueKind::Str),
        OptionId::FromPath => (Some("from_path"), ValueKind::Path),
        OptionId::Hash => (Some("hash"), ValueKind::Str),
        OptionId::IncludeDeleted => (Some("include_deleted"), ValueKind::Bool),
        OptionId::List => (Some("list"), ValueKind::Bool),
        OptionId::Locale => (Some("locale"), ValueKind::Str),
        OptionId::Overwrite => (Some("overwrite"), ValueKind::Bool),
        OptionId::Path => (Some("path"), ValueKind::Path),
        OptionId::ParentRev => (Some("parent_rev"), ValueKind::Str),
        OptionId::Query => (Some("query"), ValueKind::Str),
        OptionId::Rev => (Some("rev"), ValueKind::Str),
        OptionId::RevLimit => (Some("rev_limit"), ValueKind::Int),
        OptionId::Root => (Some("root"), ValueKind::Str),
        OptionId::ShortUrl => (Some("short_url"), ValueKind::Bool),
        OptionId::Size => (Some("size"), ValueKind::Str),
        OptionId::ToPath => (Some("to_path"), ValueKind::Path),
        OptionId::IoSink => (None, ValueKind::Handle),
        OptionId::IoSource => (None, ValueKind::Handle),
        OptionId::Timeout => (Some("timeout"), ValueKind::Int),
        OptionId::NetworkTimeout => (None, ValueKind::Raw),
        OptionId::IncludeMediaInfo => (Some("include_media_info"), ValueKind::Bool),
        OptionId::PathPrefix => (Some("path_prefix"), ValueKind::Path),
    };

    Some(Descriptor { id, name, kind })
}

/// Set of option identifiers
///
/// Each identifier owns exactly one member slot, so inserting an identifier
/// twice is observable and used for duplicate detection.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct OptionSet(u32);

impl OptionSet {
    pub const EMPTY: OptionSet = OptionSet(0);

    pub const fn of(ids: &[OptionId]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < ids.len() {
            bits |= ids[i].bit();
            i += 1;
        }
        OptionSet(bits)
    }

    pub fn contains(&self, id: OptionId) -> bool {
        self.0 & id.bit() != 0
    }

    /// Add an identifier, returning `false` if it was already present
    pub fn insert(&mut self, id: OptionId) -> bool {
        let fresh = !self.contains(id);
        self.0 |= id.bit();
        fresh
    }

    /// Remove an identifier, returning `true` if it was present
    pub fn remove(&mut self, id: OptionId) -> bool {
        let present = self.contains(id);
        self.0 &= !id.bit();
        present
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Members in declaration order
    pub fn iter(&self) -> impl Iterator<Item = OptionId> + '_ {
        OptionId::ALL.into_iter().filter(|id| self.contains(*id))
    }
}

impl fmt::Debug for OptionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<OptionId> for OptionSet {
    fn from_iter<I: IntoIterator<Item = OptionId>>(iter: I) -> Self {
        let mut set = OptionSet::EMPTY;
        for id in iter {
            set.insert(id);
        }
        set
    }
}

/// Shared destination for downloaded bytes
pub type SharedSink = Arc<Mutex<dyn Write + Send>>;

/// Shared origin for uploaded bytes
pub type SharedSource = Arc<Mutex<dyn Read + Send>>;

/// Caller I/O handle
///
/// Handles are borrowed by the call (reference counted), never consumed, so
/// one handle can be registered as a client default and reused.
#[derive(Clone)]
pub enum IoHandle {
    Sink(SharedSink),
    Source(SharedSource),
}

impl IoHandle {
    pub fn sink<W: Write + Send + 'static>(writer: W) -> Self {
        IoHandle::Sink(Arc::new(Mutex::new(writer)))
    }

    pub fn source<R: Read + Send + 'static>(reader: R) -> Self {
        IoHandle::Source(Arc::new(Mutex::new(reader)))
    }
}

impl fmt::Debug for IoHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoHandle::Sink(_) => f.write_str("IoHandle::Sink(..)"),
            IoHandle::Source(_) => f.write_str("IoHandle::Source(..)"),
        }
    }
}

/// Value of a call option
///
/// `Ignore` is the absent marker for every kind: the pair is consumed but has
/// no effect, so a client default may still apply.
#[derive(Debug, Clone)]
pub enum Value {
    Bool(bool),
    Str(String),
    Int(i64),
    Handle(IoHandle),
    Ignore,
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Str(v.clone())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v.into())
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Int(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<IoHandle> for Value {
    fn from(v: IoHandle) -> Self {
        Value::Handle(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Ignore)
    }
}

/// Ordered option list for one call
///
/// # Example
/// ```
/// use drb_core::{OptionId, Options};
///
/// let options = Options::new()
///     .with(OptionId::Path, "/Photos")
///     .with(OptionId::List, true)
///     .with(OptionId::FileLimit, 100);
/// assert_eq!(options.len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Options {
    entries: Vec<(OptionId, Value)>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: OptionId, value: impl Into<Value>) -> Self {
        self.push(id, value);
        self
    }

    pub fn push(&mut self, id: OptionId, value: impl Into<Value>) {
        self.entries.push((id, value.into()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(OptionId, Value)> {
        self.entries.iter()
    }
}

impl IntoIterator for Options {
    type Item = (OptionId, Value);
    type IntoIter = std::vec::IntoIter<(OptionId, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<(OptionId, Value)> for Options {
    fn from_iter<I: IntoIterator<Item = (OptionId, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
