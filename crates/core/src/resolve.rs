//! Argument resolution
//!
//! Turns a call's option list into the two things a request needs:
//! plumbing values ([`SpecialArgs`]) and the `&name=value` query string.
//!
//! Each endpoint names a *special* set (options consumed as plumbing, all of
//! them required) and a *regular* set (query options eligible for client
//! defaults). Any option outside the special set is sent as a query
//! parameter whether or not the endpoint lists it as regular.

use std::fmt;

use crate::defaults::Defaults;
use crate::encode::{encode_path, encode_value};
use crate::error::{Error, Result};
use crate::option::{
    Descriptor, IoHandle, OptionId, OptionSet, Options, SharedSink, SharedSource, Value,
    ValueKind, describe,
};

/// How an endpoint classifies options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionRules {
    /// Plumbing options; each must end up with a value
    pub special: OptionSet,
    /// Query options that fall back to client defaults
    pub regular: OptionSet,
}

/// An option value decoded according to its kind
#[derive(Debug, Clone)]
pub enum Decoded {
    /// Query-safe text (already percent-encoded)
    Text(String),
    Raw(u64),
    Handle(IoHandle),
}

/// Decode `value` for `descriptor`
///
/// Returns `Ok(None)` for [`Value::Ignore`].
pub fn decode(descriptor: &Descriptor, value: Value) -> Result<Option<Decoded>> {
    let id = descriptor.id;
    let decoded = match (descriptor.kind, value) {
        (_, Value::Ignore) => return Ok(None),
        (ValueKind::Bool, Value::Bool(b)) => Decoded::Text(b.to_string()),
        (ValueKind::Str, Value::Str(s)) => Decoded::Text(encode_value(&s).into_owned()),
        (ValueKind::Path, Value::Str(s)) => Decoded::Text(encode_path(&s)),
        (ValueKind::Int, Value::Int(n)) => {
            let n = u64::try_from(n).map_err(|_| Error::invalid(id, format!("{n} is negative")))?;
            Decoded::Text(n.to_string())
        }
        (ValueKind::Raw, Value::Int(n)) => {
            let n = u64::try_from(n).map_err(|_| Error::invalid(id, format!("{n} is negative")))?;
            Decoded::Raw(n)
        }
        (ValueKind::Handle, Value::Handle(h)) => Decoded::Handle(h),
        (kind, other) => {
            return Err(Error::invalid(
                id,
                format!("expected a {kind:?} value, got {other:?}"),
            ));
        }
    };
    Ok(Some(decoded))
}

/// Resolved plumbing values of one call
#[derive(Clone, Default)]
pub struct SpecialArgs {
    /// Seconds, 0 meaning no timeout
    pub network_timeout: u64,
    pub root: Option<String>,
    /// Percent-encoded path
    pub path: Option<String>,
    pub sink: Option<SharedSink>,
    pub source: Option<SharedSource>,
}

impl SpecialArgs {
    fn assign(&mut self, id: OptionId, decoded: Decoded) -> Result<()> {
        match (id, decoded) {
            (OptionId::NetworkTimeout, Decoded::Raw(secs)) => self.network_timeout = secs,
            (OptionId::Root, Decoded::Text(root)) => self.root = Some(root),
            (OptionId::Path, Decoded::Text(path)) => self.path = Some(path),
            (OptionId::IoSink, Decoded::Handle(IoHandle::Sink(sink))) => self.sink = Some(sink),
            (OptionId::IoSource, Decoded::Handle(IoHandle::Source(source))) => {
                self.source = Some(source)
            }
            (OptionId::IoSink, Decoded::Handle(_)) => {
                return Err(Error::invalid(id, "expected a sink handle"));
            }
            (OptionId::IoSource, Decoded::Handle(_)) => {
                return Err(Error::invalid(id, "expected a source handle"));
            }
            (id, _) => return Err(Error::Unknown(format!("{id} is not a plumbing option"))),
        }
        Ok(())
    }
}

impl fmt::Debug for SpecialArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecialArgs")
            .field("network_timeout", &self.network_timeout)
            .field("root", &self.root)
            .field("path", &self.path)
            .field("sink", &self.sink.is_some())
            .field("source", &self.source.is_some())
            .finish()
    }
}

/// Query string of `&name=value` pairs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryString(String);

impl QueryString {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pair; `value` must already be encoded
    pub fn append(&mut self, name: &str, value: &str) {
        self.0.push('&');
        self.0.push_str(name);
        self.0.push('=');
        self.0.push_str(value);
    }

    /// Raw form, each pair prefixed with `&`
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Form suitable after a `?`
    pub fn params(&self) -> &str {
        self.0.strip_prefix('&').unwrap_or(&self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(name, value)` pairs
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params()
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs().find(|(n, _)| *n == name).map(|(_, v)| v)
    }
}

impl fmt::Display for QueryString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of a successful resolution
#[derive(Debug, Clone, Default)]
pub struct Resolved {
    pub special: SpecialArgs,
    pub query: QueryString,
}

/// Resolve `options` against `rules`, filling gaps from `defaults`
///
/// Fails fast on the first duplicated, unknown or invalid option. After the
/// call's own options, regular defaults are appended for every regular
/// option the call did not set, then special defaults are applied; any
/// special option still without a value yields [`Error::MissingOption`].
pub fn resolve(options: Options, rules: OptionRules, defaults: &Defaults) -> Result<Resolved> {
    let mut seen = OptionSet::EMPTY;
    let mut special_pending = rules.special;
    let mut regular_pending = rules.regular;
    let mut resolved = Resolved::default();

    for (id, value) in options {
        if !seen.insert(id) {
            return Err(Error::DuplicatedOption(id));
        }

        let descriptor = describe(id).ok_or(Error::UnknownOption(id))?;

        if rules.special.contains(id) {
            if let Some(decoded) = decode(&descriptor, value)? {
                resolved.special.assign(id, decoded)?;
                special_pending.remove(id);
            }
            continue;
        }

        let name = descriptor.name.ok_or(Error::UnknownOption(id))?;
        match decode(&descriptor, value)? {
            Some(Decoded::Text(text)) => {
                resolved.query.append(name, &text);
                regular_pending.remove(id);
            }
            Some(_) => return Err(Error::UnknownOption(id)),
            None => {}
        }
    }

    merge_regular_defaults(&mut resolved.query, regular_pending, defaults);

    let missing = merge_special_defaults(&mut resolved.special, special_pending, defaults)?;
    if let Some(id) = missing.iter().next() {
        tracing::debug!(missing = ?missing, "Unresolved plumbing options");
        return Err(Error::MissingOption(id));
    }

    Ok(resolved)
}

/// Append the client default of every pending regular option that has one
pub fn merge_regular_defaults(query: &mut QueryString, pending: OptionSet, defaults: &Defaults) {
    for id in pending.iter() {
        let name = describe(id).and_then(|d| d.name);
        if let (Some(name), Some(text)) = (name, defaults.text(id)) {
            query.append(name, text);
        }
    }
}

/// Fill pending special options from client defaults
///
/// The network timeout is always eligible and falls back to 0. Returns the
/// options that are still unresolved.
pub fn merge_special_defaults(
    special: &mut SpecialArgs,
    mut pending: OptionSet,
    defaults: &Defaults,
) -> Result<OptionSet> {
    for id in pending.iter().collect::<Vec<_>>() {
        if id == OptionId::NetworkTimeout {
            special.network_timeout = defaults.network_timeout();
            pending.remove(id);
        } else if let Some(value) = defaults.get(id) {
            special.assign(id, value.clone())?;
            pending.remove(id);
        }
    }
    Ok(pending)
}
