use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

use crate::wallet::WalletError;

/// Identifier of one supported network as the indexing API names it ("eth", "polygon", ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(String);

impl ChainId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChainId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Only rejects blank input; the format is the wallet's business.
    pub fn parse(address: &str) -> Result<Self, WalletError> {
        let trimmed = address.trim();
        if trimmed.is_empty() {
            return Err(WalletError::EmptyAddress);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `0x1234...abcd` form used when showing an owner on a card.
    pub fn short(&self) -> String {
        shorten_address(&self.0)
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn shorten_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// One token as the indexing API returns it.
///
/// `metadata` is kept as raw JSON: the API hands it back as a JSON-encoded
/// string, but some providers (and cached payloads) already embed an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNftRecord {
    #[serde(default, deserialize_with = "string_or_number")]
    pub token_id: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub owner_of: String,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
}

impl RawNftRecord {
    pub fn new(token_id: impl Into<String>, owner_of: impl Into<String>, metadata: Option<Value>) -> Self {
        Self {
            token_id: token_id.into(),
            owner_of: owner_of.into(),
            metadata,
            token_address: None,
            name: None,
            symbol: None,
            contract_type: None,
            token_uri: None,
            amount: None,
        }
    }

    pub fn short_owner(&self) -> String {
        shorten_address(&self.owner_of)
    }
}

/// Indexers are not consistent about ids: accept a string, a bare number or null,
/// so a single odd row does not sink the whole page.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None => Ok(String::new()),
        Some(Value::String(s)) => Ok(s),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(de::Error::custom(format!("expected a string or number, got {}", other))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaReference {
    pub kind: MediaKind,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedMetadata {
    pub display_name: String,
    pub description: String,
    pub media: Option<MediaReference>,
}

/// A fetched token paired with its render-safe metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NftItem {
    pub chain: ChainId,
    pub record: RawNftRecord,
    pub metadata: NormalizedMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_address_rejects_blank() {
        assert!(matches!(WalletAddress::parse(""), Err(WalletError::EmptyAddress)));
        assert!(matches!(WalletAddress::parse("   "), Err(WalletError::EmptyAddress)));

        let address = WalletAddress::parse(" 0xabc ").unwrap();
        assert_eq!(address.as_str(), "0xabc");
    }

    #[test]
    fn test_short_address() {
        let address = WalletAddress::parse("0x7a250d5630B4cF539739dF2C5dAcb4c659F2488D").unwrap();
        assert_eq!(address.short(), "0x7a25...488D");

        // Too short to elide
        assert_eq!(shorten_address("0x1234"), "0x1234");
    }

    #[test]
    fn test_raw_record_tolerates_missing_fields() {
        let record: RawNftRecord = serde_json::from_str(
            r#"{"token_id":"7","owner_of":"0xowner","unknown_field":42}"#,
        )
        .unwrap();
        assert_eq!(record.token_id, "7");
        assert!(record.metadata.is_none());
        assert!(record.token_address.is_none());

        let record: RawNftRecord = serde_json::from_str(
            r#"{"token_id":"8","owner_of":"0xowner","metadata":null}"#,
        )
        .unwrap();
        assert!(record.metadata.is_none());
    }

    #[test]
    fn test_media_kind_serializes_lowercase() {
        let media = MediaReference { kind: MediaKind::Video, url: "https://x/a.webm".to_string() };
        let json = serde_json::to_value(&media).unwrap();
        assert_eq!(json["kind"], "video");
    }

    #[test]
    fn test_raw_record_tolerates_odd_ids() {
        let record: RawNftRecord = serde_json::from_str(r#"{"token_id":1234,"owner_of":null}"#).unwrap();
        assert_eq!(record.token_id, "1234");
        assert_eq!(record.owner_of, "");

        let record: RawNftRecord = serde_json::from_str(r#"{"metadata":"{}"}"#).unwrap();
        assert!(record.token_id.is_empty());

        assert!(serde_json::from_str::<RawNftRecord>(r#"{"token_id":{"id":1},"owner_of":"0x"}"#).is_err());
    }
}
