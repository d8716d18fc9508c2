//! Client-wide default option values

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::option::{IoHandle, OptionId, Options, describe};
use crate::resolve::{Decoded, decode};

/// Per-client fallback values, keyed by option identifier
///
/// Values are decoded once when set. Setting an identifier again replaces
/// (and drops) the previous value; setting it to [`crate::Value::Ignore`]
/// removes it.
#[derive(Debug, Clone, Default)]
pub struct Defaults {
    slots: HashMap<OptionId, Decoded>,
}

impl Defaults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or clear defaults
    ///
    /// The whole list is validated before anything is stored, so a failing
    /// call leaves the table unchanged. Later occurrences of an identifier
    /// win over earlier ones.
    pub fn set(&mut self, options: Options) -> Result<()> {
        let mut updates = Vec::with_capacity(options.len());

        for (id, value) in options {
            let descriptor = describe(id).ok_or(Error::UnknownOption(id))?;
            let decoded = decode(&descriptor, value)?;

            match (id, &decoded) {
                (OptionId::IoSink, Some(Decoded::Handle(IoHandle::Source(_)))) => {
                    return Err(Error::invalid(id, "expected a sink handle"));
                }
                (OptionId::IoSource, Some(Decoded::Handle(IoHandle::Sink(_)))) => {
                    return Err(Error::invalid(id, "expected a source handle"));
                }
                _ => {}
            }

            updates.push((id, decoded));
        }

        for (id, decoded) in updates {
            match decoded {
                Some(value) => {
                    tracing::debug!(option = %id, "Default option set");
                    self.slots.insert(id, value);
                }
                None => {
                    tracing::debug!(option = %id, "Default option cleared");
                    self.slots.remove(&id);
                }
            }
        }

        Ok(())
    }

    pub fn get(&self, id: OptionId) -> Option<&Decoded> {
        self.slots.get(&id)
    }

    /// Encoded text default, if the identifier has one
    pub fn text(&self, id: OptionId) -> Option<&str> {
        match self.slots.get(&id) {
            Some(Decoded::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// Default network timeout in seconds, 0 when never configured
    pub fn network_timeout(&self) -> u64 {
        match self.slots.get(&OptionId::NetworkTimeout) {
            Some(Decoded::Raw(secs)) => *secs,
            _ => 0,
        }
    }

    pub fn contains(&self, id: OptionId) -> bool {
        self.slots.contains_key(&id)
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option::Value;

    #[test]
    fn test_set_and_replace() {
        let mut defaults = Defaults::new();
        defaults
            .set(Options::new().with(OptionId::Root, "auto"))
            .unwrap();
        assert_eq!(defaults.text(OptionId::Root), Some("auto"));

        defaults
            .set(Options::new().with(OptionId::Root, "dropbox"))
            .unwrap();
        assert_eq!(defaults.text(OptionId::Root), Some("dropbox"));
    }

    #[test]
    fn test_ignore_clears_value() {
        let mut defaults = Defaults::new();
        defaults
            .set(
                Options::new()
                    .with(OptionId::Locale, "fr")
                    .with(OptionId::NetworkTimeout, 20),
            )
            .unwrap();
        assert_eq!(defaults.network_timeout(), 20);

        defaults
            .set(
                Options::new()
                    .with(OptionId::Locale, Value::Ignore)
                    .with(OptionId::NetworkTimeout, Value::Ignore),
            )
            .unwrap();
        assert!(!defaults.contains(OptionId::Locale));
        assert_eq!(defaults.network_timeout(), 0);
    }

    #[test]
    fn test_failed_set_leaves_table_unchanged() {
        let mut defaults = Defaults::new();
        let err = defaults
            .set(
                Options::new()
                    .with(OptionId::Locale, "fr")
                    .with(OptionId::RevLimit, -4),
            )
            .unwrap_err();
        assert_eq!(err.code(), 4);
        assert!(!defaults.contains(OptionId::Locale));
    }

    #[test]
    fn test_path_default_is_encoded() {
        let mut defaults = Defaults::new();
        defaults
            .set(Options::new().with(OptionId::Path, "/a b"))
            .unwrap();
        assert_eq!(defaults.text(OptionId::Path), Some("/a%20b"));
    }

    #[test]
    fn test_handle_direction_checked() {
        let mut defaults = Defaults::new();
        let err = defaults
            .set(Options::new().with(OptionId::IoSource, IoHandle::sink(Vec::new())))
            .unwrap_err();
        assert_eq!(err.code(), 4);

        defaults
            .set(Options::new().with(OptionId::IoSink, IoHandle::sink(Vec::new())))
            .unwrap();
        assert!(defaults.contains(OptionId::IoSink));
        assert_eq!(defaults.text(OptionId::IoSink), None);
    }
}
