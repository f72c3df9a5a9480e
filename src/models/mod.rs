use serde::{Deserialize, Serialize};

// ============================================================================
// Metadata Models
// ============================================================================

/// Metadata returned by `GET /extract`.
///
/// Field order and names follow the public JSON contract: `site_name` is
/// serialized as `sitename` and `duration_ms` as `duration`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub title: String,
    pub description: String,
    pub images: Vec<ImageDescriptor>,
    #[serde(rename = "sitename")]
    pub site_name: String,
    pub favicon: String,
    /// Time spent serving the current request. Rewritten on every response,
    /// including cache hits.
    #[serde(rename = "duration")]
    pub duration_ms: u64,
    /// `scheme://host` of `url`, or empty if it could not be derived.
    pub domain: String,
    /// The URL as requested, not the post-redirect target.
    pub url: String,
}

impl MetadataRecord {
    pub fn new(url: impl Into<String>, domain: impl Into<String>) -> Self {
        MetadataRecord {
            url: url.into(),
            domain: domain.into(),
            ..Default::default()
        }
    }
}

/// Open Graph image metadata. Empty strings and zero dimensions mean the
/// corresponding tag was absent or unparsable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDescriptor {
    pub url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub alt: String,
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub width: u32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub height: u32,
}

fn is_zero(n: &u32) -> bool {
    *n == 0
}
