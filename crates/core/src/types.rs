//! Response records
//!
//! Every field is optional: a field missing from the server answer is `None`,
//! never a zero value.

use serde::{Deserialize, Serialize};

/// Account general information
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referral_link: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota_info: Option<QuotaInfo>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Storage quota, in bytes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuotaInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datastores: Option<u64>,

    /// Bytes used by shared folders
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared: Option<u64>,

    /// Total quota
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quota: Option<u64>,

    /// Bytes used outside shared folders
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normal: Option<u64>,
}

impl QuotaInfo {
    /// Total bytes in use, when both counters are known
    pub fn used(&self) -> Option<u64> {
        self.shared?.checked_add(self.normal?)
    }
}

/// File or folder metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_mtime: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_dir: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    /// RFC 2822 timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,

    /// Human readable size, e.g. "225.4KB"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumb_exists: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_deleted: Option<bool>,

    /// Folder listing hash, only present for folders
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub contents: Option<Vec<Metadata>>,
}

impl Metadata {
    pub fn is_dir(&self) -> bool {
        self.is_dir.unwrap_or(false)
    }

    pub fn is_deleted(&self) -> bool {
        self.is_deleted.unwrap_or(false)
    }

    /// Last path component
    pub fn name(&self) -> Option<&str> {
        self.path
            .as_deref()
            .map(|p| p.rsplit('/').next().unwrap_or(p))
    }
}

/// List of metadata, as returned by revisions and search
pub type MetadataList = Vec<Metadata>;

/// Shareable or direct link to a file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Link {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
}

/// Reference usable as `from_copy_ref` in a copy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CopyRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copy_ref: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
}

/// One changed path; `metadata` is `None` when the path was deleted
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "(Option<String>, Option<Metadata>)")]
pub struct DeltaEntry {
    pub path: Option<String>,
    pub metadata: Option<Metadata>,
}

impl From<(Option<String>, Option<Metadata>)> for DeltaEntry {
    fn from((path, metadata): (Option<String>, Option<Metadata>)) -> Self {
        Self { path, metadata }
    }
}

/// Page of changes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_more: Option<bool>,

    #[serde(default)]
    pub entries: Vec<DeltaEntry>,
}

/// Result of a long poll
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PollDelta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changes: Option<bool>,

    /// Seconds the server asks the caller to wait before polling again
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backoff: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_absent_fields_are_none() {
        let meta: Metadata = serde_json::from_str(r#"{"path":"/","is_dir":true}"#).unwrap();
        assert_eq!(meta.path.as_deref(), Some("/"));
        assert_eq!(meta.is_dir, Some(true));
        assert_eq!(meta.bytes, None);
        assert_eq!(meta.rev, None);
        assert_eq!(meta.contents, None);
        assert_eq!(meta.hash, None);
    }

    #[test]
    fn test_metadata_contents_nested() {
        let json = r#"{
            "path": "/Photos", "is_dir": true, "hash": "37eb1ba1849d4b0fb0b28caf7ef3af52",
            "contents": [
                {"path": "/Photos/a.jpg", "bytes": 225935, "size": "220.6KB", "is_dir": false,
                 "thumb_exists": true, "rev": "35e97029684fe", "revision": 220191,
                 "modified": "Tue, 19 Jul 2011 21:55:38 +0000", "mime_type": "image/jpeg"}
            ]
        }"#;
        let meta: Metadata = serde_json::from_str(json).unwrap();
        let contents = meta.contents.unwrap();
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0].bytes, Some(225935));
        assert_eq!(contents[0].name(), Some("a.jpg"));
        assert!(!contents[0].is_dir());
    }

    #[test]
    fn test_account_info_without_quota() {
        let info: AccountInfo =
            serde_json::from_str(r#"{"display_name":"John","uid":12345678}"#).unwrap();
        assert_eq!(info.uid, Some(12345678));
        assert_eq!(info.quota_info, None);
        assert!(!serde_json::to_string(&info).unwrap().contains("quota_info"));
    }

    #[test]
    fn test_quota_used() {
        let json = r#"{"quota_info":{"shared":253738410565,"quota":107374182400000,"normal":680031877871}}"#;
        let info: AccountInfo = serde_json::from_str(json).unwrap();
        let quota = info.quota_info.unwrap();
        assert_eq!(quota.used(), Some(933770288436));
        assert_eq!(quota.datastores, None);
    }

    #[test]
    fn test_quota_used_overflow() {
        let quota = QuotaInfo {
            shared: Some(u64::MAX),
            normal: Some(1),
            ..Default::default()
        };
        assert_eq!(quota.used(), None);
        assert_eq!(QuotaInfo { normal: Some(1), ..Default::default() }.used(), None);
    }

    #[test]
    fn test_delta_entries_from_pairs() {
        let json = r#"{
            "reset": false, "cursor": "AAE", "has_more": false,
            "entries": [["/a.txt", {"path": "/A.txt", "bytes": 3}], ["/gone", null]]
        }"#;
        let delta: Delta = serde_json::from_str(json).unwrap();
        assert_eq!(delta.entries.len(), 2);
        assert_eq!(delta.entries[0].path.as_deref(), Some("/a.txt"));
        assert_eq!(delta.entries[0].metadata.as_ref().unwrap().bytes, Some(3));
        assert!(delta.entries[1].metadata.is_none());
    }

    #[test]
    fn test_serialization_skips_absent_fields() {
        let link = Link {
            url: Some("https://db.tt/c0mFuu1Y".to_string()),
            expires: None,
        };
        let json = serde_json::to_string(&link).unwrap();
        assert_eq!(json, r#"{"url":"https://db.tt/c0mFuu1Y"}"#);
    }
}
