//! Core types for ingested emails

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;

/// A normalized email, one per input message
///
/// Built once by the ingestor and only read afterwards. Both feature
/// extractors consume it: headers work from `raw_headers`, body features
/// from `body`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Opaque per-message identifier (UUID v4)
    pub email_id: String,

    /// Header names in order of appearance, duplicates preserved
    #[serde(
        serialize_with = "join_header_names",
        deserialize_with = "split_header_names"
    )]
    pub header_list: Vec<String>,

    /// Header block decoded as UTF-8 with replacement
    pub raw_headers: String,

    /// Resolved plain-text body
    pub body: String,

    /// Name of the source file, for diagnostics
    pub og_fname: String,

    /// Attachment and inline parts in tree order
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// A decoded attachment, identified by the hash of its bytes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    /// Lowercase hex SHA-256 of `data`
    pub hash: String,
    #[serde(rename = "data_base64", with = "base64_bytes")]
    pub data: Vec<u8>,
}

impl Attachment {
    /// Build an attachment, hashing its decoded bytes
    #[must_use]
    pub fn new(filename: String, content_type: String, data: Vec<u8>) -> Self {
        let hash = content_hash(&data);
        Self {
            filename,
            content_type,
            hash,
            data,
        }
    }
}

/// SHA-256 of `data` as lowercase hex
#[must_use]
pub fn content_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

#[allow(clippy::ptr_arg)]
fn join_header_names<S: Serializer>(names: &Vec<String>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&names.join(","))
}

fn split_header_names<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let joined = String::deserialize(deserializer)?;
    if joined.is_empty() {
        return Ok(Vec::new());
    }
    Ok(joined.split(',').map(str::to_string).collect())
}

mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

/// Mailbox from an address header, split into display name and address
///
/// Never fails: a value with no recognizable address yields the trimmed
/// value as the address and an empty display name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mailbox {
    /// Display name (e.g., "John Doe"), empty when absent
    pub display_name: String,

    /// Address (e.g., "john@example.com"), empty when the header was empty
    pub address: String,
}

impl Mailbox {
    /// Parse the first mailbox of an address header value
    #[must_use]
    pub fn parse(s: &str) -> Self {
        let s = s.trim();

        // "Name <email@domain.com>"
        if let Some(start) = s.find('<')
            && let Some(len) = s[start..].find('>')
        {
            let display_name = s[..start].trim().trim_matches('"').trim().to_string();
            let address = s[start + 1..start + len].trim().to_string();
            return Self {
                display_name,
                address,
            };
        }

        let first = s.split(',').next().unwrap_or_default().trim();

        // "email@domain.com (Name)"
        if let Some(open) = first.find('(')
            && first.ends_with(')')
        {
            return Self {
                display_name: first[open + 1..first.len() - 1].trim().to_string(),
                address: first[..open].trim().to_string(),
            };
        }

        Self {
            display_name: String::new(),
            address: first.trim_matches('"').to_string(),
        }
    }

    /// Part before the last `@`, or the whole address when there is none
    #[must_use]
    pub fn local_part(&self) -> &str {
        self.address
            .rsplit_once('@')
            .map_or(self.address.as_str(), |(local, _)| local)
    }

    /// Lower-cased part after the last `@`, empty when there is none
    #[must_use]
    pub fn domain(&self) -> String {
        domain_of(&self.address)
    }
}

impl fmt::Display for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.display_name.is_empty() {
            write!(f, "{}", self.address)
        } else {
            write!(f, "{} <{}>", self.display_name, self.address)
        }
    }
}

/// Lower-cased text after the last `@` of `address`, empty when there is none
#[must_use]
pub fn domain_of(address: &str) -> String {
    address
        .rsplit_once('@')
        .map(|(_, domain)| domain.to_lowercase())
        .unwrap_or_default()
}

/// Ordered header collection with case-insensitive lookup
///
/// Values keep their raw form (encoded words are not decoded) with folded
/// lines joined back together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: Vec<(String, String)>,
}

impl HeaderMap {
    /// Parse a header block leniently
    ///
    /// `Name: value` lines start a header and lines beginning with a space or
    /// tab continue the previous one. A leading mbox `From ` envelope line is
    /// skipped. Parsing stops at the first empty line or the first line that
    /// is not a header.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut entries: Vec<(String, String)> = Vec::new();

        for (index, line) in raw.split('\n').enumerate() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.is_empty() {
                break;
            }
            if index == 0 && line.starts_with("From ") {
                continue;
            }

            if line.starts_with([' ', '\t']) {
                if let Some((_, value)) = entries.last_mut() {
                    value.push_str(line);
                }
                continue;
            }

            let Some((name, value)) = line.split_once(':') else {
                break;
            };
            let name = name.trim_end();
            if name.is_empty() || name.contains(char::is_whitespace) {
                break;
            }
            entries.push((name.to_string(), value.trim_start().to_string()));
        }

        Self { entries }
    }

    /// Header names in order of appearance
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Whether a header with this name exists
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n.eq_ignore_ascii_case(name))
    }

    /// First value of a header
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// First value of a header, or `""` when it is missing
    #[must_use]
    pub fn get_or_empty(&self, name: &str) -> &str {
        self.get(name).unwrap_or("")
    }

    /// Every value of a header, in order
    #[must_use]
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
            .collect()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
