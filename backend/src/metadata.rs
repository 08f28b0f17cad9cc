use serde_json::{Map, Value};
use tracing::debug;

use crate::config::MediaSettings;
use crate::types::{MediaKind, MediaReference, NormalizedMetadata, RawNftRecord};

pub const DEFAULT_DISPLAY_NAME: &str = "Unnamed NFT";
pub const DEFAULT_DESCRIPTION: &str = "No description available";

const IPFS_SCHEME: &str = "ipfs://";
const HTTP_SCHEMES: &[&str] = &["https://", "http://"];
const VIDEO_EXTENSIONS: &[&str] = &[".mp4", ".webm", ".ogg"];

/// Turns whatever the indexer handed back as metadata into something a card
/// can render. Total: every input yields a fully populated descriptor.
#[derive(Debug, Clone)]
pub struct MetadataNormalizer {
    ipfs_gateway: String,
    placeholder_image: String,
}

impl Default for MetadataNormalizer {
    fn default() -> Self {
        Self::new(&MediaSettings::default())
    }
}

impl MetadataNormalizer {
    pub fn new(settings: &MediaSettings) -> Self {
        Self {
            ipfs_gateway: settings.ipfs_gateway.trim_end_matches('/').to_string(),
            placeholder_image: settings.placeholder_image.clone(),
        }
    }

    pub fn normalize(&self, raw: &RawNftRecord) -> NormalizedMetadata {
        match parse_payload(raw) {
            Some(fields) => self.from_fields(&fields),
            None => self.fallback(),
        }
    }

    pub fn fallback(&self) -> NormalizedMetadata {
        NormalizedMetadata {
            display_name: DEFAULT_DISPLAY_NAME.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            media: Some(self.placeholder()),
        }
    }

    pub fn placeholder(&self) -> MediaReference {
        MediaReference {
            kind: MediaKind::Image,
            url: self.placeholder_image.clone(),
        }
    }

    /// `ipfs://<cid>/<path>` becomes `<gateway>/<cid>/<path>` and HTTP(S) URLs pass
    /// through. Any other scheme or a relative path cannot be rendered and yields `None`.
    pub fn resolve_url(&self, candidate: &str) -> Option<String> {
        let candidate = candidate.trim();
        if let Some(rest) = strip_scheme(candidate, IPFS_SCHEME) {
            let rest = rest.strip_prefix("ipfs/").unwrap_or(rest);
            return Some(format!("{}/{}", self.ipfs_gateway, rest.trim_start_matches('/')));
        }

        if HTTP_SCHEMES.iter().any(|scheme| strip_scheme(candidate, scheme).is_some()) {
            Some(candidate.to_string())
        } else {
            debug!("Skipping media candidate with unsupported scheme: {}", candidate);
            None
        }
    }

    fn from_fields(&self, fields: &Map<String, Value>) -> NormalizedMetadata {
        let media = ["image", "video"]
            .iter()
            .find_map(|key| non_empty_str(fields, key).and_then(|candidate| self.resolve_url(candidate)))
            .map(|url| MediaReference { kind: classify(&url), url })
            .unwrap_or_else(|| self.placeholder());

        NormalizedMetadata {
            display_name: non_empty_str(fields, "name")
                .unwrap_or(DEFAULT_DISPLAY_NAME)
                .to_string(),
            description: non_empty_str(fields, "description")
                .unwrap_or(DEFAULT_DESCRIPTION)
                .to_string(),
            media: Some(media),
        }
    }
}

/// Extension based only; the query string and fragment are not part of the path.
pub fn classify(url: &str) -> MediaKind {
    let path = url
        .split(|c: char| c == '?' || c == '#')
        .next()
        .unwrap_or(url)
        .to_ascii_lowercase();

    if VIDEO_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
        MediaKind::Video
    } else {
        MediaKind::Image
    }
}

/// Case-insensitive scheme match.
fn strip_scheme<'a>(url: &'a str, scheme: &str) -> Option<&'a str> {
    match url.get(..scheme.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(scheme) => url.get(scheme.len()..),
        _ => None,
    }
}

fn parse_payload(raw: &RawNftRecord) -> Option<Map<String, Value>> {
    let value = match &raw.metadata {
        None | Some(Value::Null) => return None,
        Some(Value::String(encoded)) => match serde_json::from_str::<Value>(encoded) {
            Ok(value) => value,
            Err(e) => {
                debug!("Malformed metadata for token {}: {}", raw.token_id, e);
                return None;
            }
        },
        Some(value) => value.clone(),
    };

    match value {
        Value::Object(fields) => Some(fields),
        other => {
            debug!("Metadata for token {} is not an object: {}", raw.token_id, other);
            None
        }
    }
}

fn non_empty_str<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.trim().is_empty())
}
