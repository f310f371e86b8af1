//! Header feature extraction
//!
//! Every feature is derived from the raw header block of a [`Record`]. Missing
//! or malformed headers never fail extraction: they map to `false`, `0`, or the
//! `-1` weekday sentinel.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::date::parse_date;
use crate::lexicon::FREE_EMAIL_PROVIDERS;
use crate::types::{HeaderMap, Mailbox, Record, domain_of};

static RELAY_IP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[?(\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})\]?").unwrap());

static PRIVATE_IP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(127\.|10\.|192\.168\.|172\.(1[6-9]|2[0-9]|3[01])\.)").unwrap()
});

/// Content-Type parameter count above which the header is treated as corrupt
const EXTREME_COMPLEXITY: usize = 10;

/// Widest real-world UTC offset (+14:00), in seconds
const MAX_PLAUSIBLE_OFFSET: i64 = 50_400;

/// Header signals for one message
///
/// Serializes as a flat JSON object with `email_id` first and the category
/// fields in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderFeatures {
    pub email_id: String,
    #[serde(flatten)]
    pub authenticity: Authenticity,
    #[serde(flatten)]
    pub sender: Sender,
    #[serde(flatten)]
    pub structure: Structure,
    #[serde(flatten)]
    pub temporal: Temporal,
    #[serde(flatten)]
    pub encoding: Encoding,
    #[serde(flatten)]
    pub received_path: ReceivedPath,
    #[serde(flatten)]
    pub data_quality: DataQuality,
}

impl HeaderFeatures {
    /// Compute every header feature from a parsed header block
    #[must_use]
    pub fn from_headers(email_id: impl Into<String>, headers: &HeaderMap) -> Self {
        let structure = Structure::from_headers(headers);
        let temporal = Temporal::from_headers(headers);
        let data_quality = DataQuality::assess(&structure, &temporal);

        Self {
            email_id: email_id.into(),
            authenticity: Authenticity::from_headers(headers),
            sender: Sender::from_headers(headers),
            structure,
            temporal,
            encoding: Encoding::from_headers(headers),
            received_path: ReceivedPath::from_headers(headers),
            data_quality,
        }
    }
}

/// Header features of a record
#[must_use]
pub fn extract_header_features(record: &Record) -> HeaderFeatures {
    let headers = HeaderMap::parse(&record.raw_headers);
    HeaderFeatures::from_headers(&record.email_id, &headers)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct Authenticity {
    pub has_dkim: bool,
    pub has_spf: bool,
    /// From and Return-Path domains are both present and differ
    pub from_return_mismatch: bool,
    pub has_auth_results: bool,
}

impl Authenticity {
    fn from_headers(headers: &HeaderMap) -> Self {
        // Only the first Authentication-Results header is inspected
        let auth_results = headers.get_or_empty("Authentication-Results");

        let from_domain = Mailbox::parse(headers.get_or_empty("From")).domain();
        let return_path = headers
            .get_or_empty("Return-Path")
            .trim()
            .trim_matches(['<', '>']);
        let return_domain = domain_of(return_path);

        Self {
            has_dkim: headers.contains("DKIM-Signature"),
            has_spf: auth_results.to_lowercase().contains("spf="),
            from_return_mismatch: !from_domain.is_empty()
                && !return_domain.is_empty()
                && from_domain != return_domain,
            has_auth_results: !auth_results.is_empty(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct Sender {
    pub from_free_provider: bool,
    /// A digit appears in the local part of the From address
    pub from_has_numbers: bool,
    pub display_name_mismatch: bool,
    pub display_name_empty: bool,
    pub display_name_is_email: bool,
    /// Reply-To names an address other than From
    pub reply_to_differs: bool,
}

impl Sender {
    fn from_headers(headers: &HeaderMap) -> Self {
        let from = Mailbox::parse(headers.get_or_empty("From"));
        let reply_to = Mailbox::parse(headers.get_or_empty("Reply-To"));

        let display_name = from.display_name.trim().to_lowercase();
        let address = from.address.trim().to_lowercase();

        Self {
            from_free_provider: FREE_EMAIL_PROVIDERS.contains(&from.domain().as_str()),
            from_has_numbers: from.local_part().chars().any(|c| c.is_ascii_digit()),
            display_name_mismatch: !display_name.is_empty() && display_name != address,
            display_name_empty: display_name.is_empty(),
            display_name_is_email: !display_name.is_empty() && display_name == address,
            reply_to_differs: !reply_to.address.is_empty()
                && !reply_to.address.eq_ignore_ascii_case(&from.address),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Structure {
    pub missing_message_id: bool,
    pub has_x_mailer: bool,
    /// Number of `;` in Content-Type
    pub content_type_complexity: usize,
}

impl Structure {
    fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            missing_message_id: !headers.contains("Message-ID"),
            has_x_mailer: headers.contains("X-Mailer"),
            content_type_complexity: headers.get_or_empty("Content-Type").matches(';').count(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Temporal {
    /// Monday to Friday, 08:00 to 17:59 sender local time
    pub sent_business_hours: bool,
    /// Seconds east of UTC
    pub timezone_offset: i64,
    /// 0 = Monday .. 6 = Sunday, -1 when the date is missing or unreadable
    pub day_of_week: i32,
}

impl Temporal {
    pub const UNKNOWN: Self = Self {
        sent_business_hours: false,
        timezone_offset: 0,
        day_of_week: -1,
    };

    fn from_headers(headers: &HeaderMap) -> Self {
        parse_date(headers.get_or_empty("Date")).map_or(Self::UNKNOWN, |sent| {
            let weekday = sent.day_of_week < 5;
            Self {
                sent_business_hours: weekday && (8..18).contains(&sent.hour),
                timezone_offset: sent.offset_seconds,
                day_of_week: i32::try_from(sent.day_of_week).unwrap_or(-1),
            }
        })
    }
}

impl Default for Temporal {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct Encoding {
    pub uses_base64: bool,
    pub uses_quoted_printable: bool,
    pub unicode_in_from: bool,
    pub unicode_in_subject: bool,
}

impl Encoding {
    fn from_headers(headers: &HeaderMap) -> Self {
        let transfer_encoding = headers
            .get_or_empty("Content-Transfer-Encoding")
            .to_lowercase();

        Self {
            uses_base64: transfer_encoding.contains("base64"),
            uses_quoted_printable: transfer_encoding.contains("quoted-printable"),
            unicode_in_from: has_unicode(headers.get_or_empty("From")),
            unicode_in_subject: has_unicode(headers.get_or_empty("Subject")),
        }
    }
}

/// Encoded words or raw non-ASCII text in a header value
fn has_unicode(value: &str) -> bool {
    (value.contains("=?") && value.contains("?=")) || !value.is_ascii()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ReceivedPath {
    pub received_count: usize,
    pub unique_relay_ips: usize,
    /// Every relay IP is loopback or RFC 1918; false when there are none
    pub all_private_ips: bool,
    /// Unique relay IPs per Received header
    pub ip_diversity_ratio: f64,
}

impl ReceivedPath {
    #[allow(clippy::cast_precision_loss)]
    fn from_headers(headers: &HeaderMap) -> Self {
        let received = headers.get_all("Received");

        let ips: Vec<&str> = received
            .iter()
            .flat_map(|value| RELAY_IP.captures_iter(value))
            .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
            .collect();
        let unique: HashSet<&str> = ips.iter().copied().collect();

        let ip_diversity_ratio = if received.is_empty() {
            0.0
        } else {
            unique.len() as f64 / received.len() as f64
        };

        Self {
            received_count: received.len(),
            unique_relay_ips: unique.len(),
            all_private_ips: !ips.is_empty() && ips.iter().all(|ip| PRIVATE_IP.is_match(ip)),
            ip_diversity_ratio,
        }
    }
}

/// Well-formedness of the headers, kept apart from maliciousness signals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DataQuality {
    pub has_valid_date: bool,
    pub has_extreme_complexity: bool,
    pub has_unusual_timezone: bool,
    /// 0 to 3, one point per check passed
    pub data_quality_score: u8,
}

impl DataQuality {
    /// Derive quality flags from already computed features
    #[must_use]
    pub fn assess(structure: &Structure, temporal: &Temporal) -> Self {
        let has_valid_date = temporal.day_of_week != -1;
        let has_extreme_complexity = structure.content_type_complexity > EXTREME_COMPLEXITY;
        let has_unusual_timezone = temporal.timezone_offset.abs() > MAX_PLAUSIBLE_OFFSET;

        let data_quality_score = u8::from(has_valid_date)
            + u8::from(!has_extreme_complexity)
            + u8::from(!has_unusual_timezone);

        Self {
            has_valid_date,
            has_extreme_complexity,
            has_unusual_timezone,
            data_quality_score,
        }
    }
}
