//! Body feature extraction
//!
//! Keyword, pattern and structural signals over the resolved body text of a
//! [`Record`], plus the URLs found in it. Keyword matching runs on the
//! lower-cased body and counts non-overlapping substring occurrences, so
//! categories may share hits ("verify" counts as both authority and request
//! language).

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::extracted::{extract_urls, is_ip_host, url_host};
use crate::lexicon::{
    AUTHORITY_KEYWORDS, CONSEQUENCE_PATTERNS, FINANCIAL_PHRASES, FIRST_PERSON_PLURAL,
    FIRST_PERSON_SINGULAR, FORM_PHRASES, GENERIC_GREETINGS, IMPERATIVE_VERBS,
    IMPERSONATION_PATTERNS, MONEY_KEYWORDS, NAME_GREETING_PATTERNS, PASSWORD_PHRASES,
    PERSONAL_PHRASES, PRIZE_PHRASES, REQUEST_KEYWORDS, SECOND_PERSON_PRONOUNS, SUSPICIOUS_TLDS,
    THREAT_KEYWORDS, TIME_PRESSURE_PATTERNS, TRUSTED_DOMAINS, URGENCY_KEYWORDS, URL_SHORTENERS,
    contains_any, count_occurrences, matches_any,
};
use crate::types::Record;

static SENTENCE_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]+").unwrap());

static PARAGRAPH_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n").unwrap());

static EXCESSIVE_SPACING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{4,}").unwrap());

static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

static MONEY_AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"[\$£€¥]\s*\d+(?:,\d{3})*(?:\.\d{2})?|\d+(?:,\d{3})*(?:\.\d{2})?\s*(?:dollars|USD|EUR|GBP)",
    )
    .unwrap()
});

static LARGE_SUM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[\$£€¥]\s*\d{1,3}(?:,\d{3})+|\d+\s*(?:million|billion|thousand)").unwrap()
});

// <a href="URL1">URL2</a> left behind in the body text
static ANCHOR_WITH_URL_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)<a\s[^>]*?href\s*=\s*["']?([^"'\s>]+)[^>]*>\s*((?:https?://|www\.)[^<\s]+)\s*</a>"#,
    )
    .unwrap()
});

/// Characters scanned for a greeting
const GREETING_WINDOW: usize = 200;

/// Host dot count above which a URL is flagged for deep subdomains
const MAX_HOST_DOTS: usize = 3;

/// Body signals for one message
///
/// Serializes flat: `email_id`, then every category field in declaration
/// order, then `URLs`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BodyFeatures {
    pub email_id: String,
    #[serde(flatten)]
    pub urgency: Urgency,
    #[serde(flatten)]
    pub authority: Authority,
    #[serde(flatten)]
    pub threat: Threat,
    #[serde(flatten)]
    pub links: Links,
    #[serde(flatten)]
    pub requests: Requests,
    #[serde(flatten)]
    pub linguistic: Linguistic,
    #[serde(flatten)]
    pub layout: Layout,
    #[serde(flatten)]
    pub personalization: Personalization,
    #[serde(flatten)]
    pub money: Money,
    #[serde(rename = "URLs")]
    pub urls: Vec<String>,
}

impl BodyFeatures {
    /// Compute every body feature from body text
    ///
    /// An empty or whitespace-only body yields all defaults and no URLs.
    #[must_use]
    pub fn from_text(email_id: impl Into<String>, body: &str) -> Self {
        let email_id = email_id.into();
        if body.trim().is_empty() {
            return Self {
                email_id,
                ..Self::default()
            };
        }

        let lower = body.to_lowercase();
        let words: Vec<&str> = body.split_whitespace().collect();
        let urls = extract_urls(body);

        Self {
            email_id,
            urgency: Urgency::analyze(body, &lower),
            authority: Authority::analyze(&lower),
            threat: Threat::analyze(&lower),
            links: Links::analyze(body, &urls, words.len()),
            requests: Requests::analyze(&lower),
            linguistic: Linguistic::analyze(body, &lower, &words),
            layout: Layout::analyze(body),
            personalization: Personalization::analyze(&lower),
            money: Money::analyze(body, &lower),
            urls,
        }
    }
}

/// Body features of a record
#[must_use]
pub fn extract_body_features(record: &Record) -> BodyFeatures {
    BodyFeatures::from_text(&record.email_id, &record.body)
}

#[allow(clippy::cast_precision_loss)]
fn ratio(count: usize, total: usize, places: i32) -> f64 {
    round_to(count as f64 / total.max(1) as f64, places)
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10_f64.powi(places);
    (value * factor).round() / factor
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Urgency {
    pub urgency_keyword_count: usize,
    pub has_urgency: bool,
    pub has_time_pressure: bool,
    pub exclamation_count: usize,
    /// Three or more `!`
    pub excessive_exclamation: bool,
}

impl Urgency {
    fn analyze(body: &str, lower: &str) -> Self {
        let urgency_keyword_count = count_occurrences(lower, URGENCY_KEYWORDS);
        let exclamation_count = body.matches('!').count();

        Self {
            urgency_keyword_count,
            has_urgency: urgency_keyword_count > 0,
            has_time_pressure: matches_any(lower, &TIME_PRESSURE_PATTERNS),
            exclamation_count,
            excessive_exclamation: exclamation_count >= 3,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Authority {
    pub authority_keyword_count: usize,
    pub has_authority_language: bool,
    pub has_impersonation_pattern: bool,
    /// A well-known brand domain is mentioned anywhere in the text
    pub claims_trusted_domain: bool,
}

impl Authority {
    fn analyze(lower: &str) -> Self {
        let authority_keyword_count = count_occurrences(lower, AUTHORITY_KEYWORDS);

        Self {
            authority_keyword_count,
            has_authority_language: authority_keyword_count > 0,
            has_impersonation_pattern: matches_any(lower, &IMPERSONATION_PATTERNS),
            claims_trusted_domain: contains_any(lower, TRUSTED_DOMAINS),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Threat {
    pub threat_keyword_count: usize,
    pub has_threat: bool,
    pub has_consequence_language: bool,
}

impl Threat {
    fn analyze(lower: &str) -> Self {
        let threat_keyword_count = count_occurrences(lower, THREAT_KEYWORDS);

        Self {
            threat_keyword_count,
            has_threat: threat_keyword_count > 0,
            has_consequence_language: matches_any(lower, &CONSEQUENCE_PATTERNS),
        }
    }
}

/// Signals derived from the extracted URLs and leaked anchor markup
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct Links {
    pub url_count: usize,
    pub has_links: bool,
    /// URLs per word
    pub link_density: f64,
    pub has_ip_url: bool,
    pub has_shortened_url: bool,
    pub has_suspicious_tld: bool,
    pub has_at_in_url: bool,
    pub has_excessive_subdomains: bool,
    /// An anchor whose visible URL points somewhere other than its href
    pub has_misleading_link_text: bool,
}

impl Links {
    fn analyze(body: &str, urls: &[String], word_count: usize) -> Self {
        let hosts: Vec<String> = urls.iter().map(|url| url_host(url)).collect();

        Self {
            url_count: urls.len(),
            has_links: !urls.is_empty(),
            link_density: ratio(urls.len(), word_count, 3),
            has_ip_url: hosts.iter().any(|host| is_ip_host(host)),
            has_shortened_url: hosts
                .iter()
                .any(|host| URL_SHORTENERS.contains(&host.as_str())),
            has_suspicious_tld: hosts.iter().any(|host| {
                host.rsplit_once('.')
                    .is_some_and(|(_, tld)| SUSPICIOUS_TLDS.contains(&tld))
            }),
            has_at_in_url: urls.iter().any(|url| url.contains('@')),
            has_excessive_subdomains: hosts
                .iter()
                .any(|host| host.matches('.').count() > MAX_HOST_DOTS),
            has_misleading_link_text: has_misleading_anchor(body),
        }
    }
}

fn has_misleading_anchor(body: &str) -> bool {
    ANCHOR_WITH_URL_TEXT.captures_iter(body).any(|caps| {
        let href = url_host(&caps[1]);
        let shown = url_host(&caps[2]);
        !href.is_empty() && !shown.is_empty() && href != shown
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct Requests {
    pub request_keyword_count: usize,
    pub has_request: bool,
    pub requests_password: bool,
    pub requests_financial: bool,
    pub requests_personal: bool,
    pub mentions_form: bool,
}

impl Requests {
    fn analyze(lower: &str) -> Self {
        let request_keyword_count = count_occurrences(lower, REQUEST_KEYWORDS);

        Self {
            request_keyword_count,
            has_request: request_keyword_count > 0,
            requests_password: contains_any(lower, PASSWORD_PHRASES),
            requests_financial: contains_any(lower, FINANCIAL_PHRASES),
            requests_personal: contains_any(lower, PERSONAL_PHRASES),
            mentions_form: contains_any(lower, FORM_PHRASES),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Linguistic {
    pub word_count: usize,
    pub avg_word_length: f64,
    pub sentence_count: usize,
    pub avg_sentence_length: f64,
    /// Upper-case letters over all letters
    pub capitalization_ratio: f64,
    /// Adjacent identical words, case-insensitive
    pub repeated_word_count: usize,
    pub has_excessive_spacing: bool,
    /// Some sentence has fewer than 3 or more than 50 words
    pub has_irregular_sentences: bool,
    pub imperative_verb_count: usize,
    pub second_person_pronoun_ratio: f64,
    pub first_person_plural_ratio: f64,
}

impl Linguistic {
    fn analyze(body: &str, lower: &str, words: &[&str]) -> Self {
        let word_count = words.len();
        let letters: usize = words.iter().map(|word| word.chars().count()).sum();

        let sentences: Vec<&str> = SENTENCE_BREAK
            .split(body)
            .map(str::trim)
            .filter(|sentence| !sentence.is_empty())
            .collect();

        let uppercase = body.chars().filter(|c| c.is_uppercase()).count();
        let alphabetic = body.chars().filter(|c| c.is_alphabetic()).count();

        let repeated_word_count = words
            .windows(2)
            .filter(|pair| pair[0].to_lowercase() == pair[1].to_lowercase())
            .count();

        let has_irregular_sentences = sentences.iter().any(|sentence| {
            let length = sentence.split_whitespace().count();
            !(3..=50).contains(&length)
        });

        Self {
            word_count,
            avg_word_length: ratio(letters, word_count, 2),
            sentence_count: sentences.len(),
            avg_sentence_length: ratio(word_count, sentences.len(), 2),
            capitalization_ratio: ratio(uppercase, alphabetic, 3),
            repeated_word_count,
            has_excessive_spacing: EXCESSIVE_SPACING.is_match(body),
            has_irregular_sentences,
            imperative_verb_count: count_occurrences(lower, IMPERATIVE_VERBS),
            second_person_pronoun_ratio: ratio(second_person_count(lower), word_count, 3),
            first_person_plural_ratio: ratio(
                count_occurrences(lower, FIRST_PERSON_PLURAL),
                word_count,
                3,
            ),
        }
    }
}

/// Second-person pronouns as whole words, plus one for a pronoun opening the text
fn second_person_count(lower: &str) -> usize {
    SECOND_PERSON_PRONOUNS
        .iter()
        .map(|pronoun| {
            let framed: usize = [" ", ",", "."]
                .iter()
                .map(|end| lower.matches(&format!(" {pronoun}{end}")).count())
                .sum();
            framed + usize::from(lower.starts_with(&format!("{pronoun} ")))
        })
        .sum()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Layout {
    /// Length in characters
    pub body_length: usize,
    /// Non-blank lines
    pub line_count: usize,
    pub paragraph_count: usize,
    pub has_html_tags: bool,
    pub html_tag_count: usize,
    /// Non-ASCII characters over all characters
    pub special_char_ratio: f64,
}

impl Layout {
    fn analyze(body: &str) -> Self {
        let body_length = body.chars().count();
        let html_tag_count = HTML_TAG.find_iter(body).count();
        let non_ascii = body.chars().filter(|c| !c.is_ascii()).count();

        Self {
            body_length,
            line_count: body.split('\n').filter(|line| !line.trim().is_empty()).count(),
            paragraph_count: PARAGRAPH_BREAK
                .split(body)
                .filter(|paragraph| !paragraph.trim().is_empty())
                .count(),
            has_html_tags: html_tag_count > 0,
            html_tag_count,
            special_char_ratio: ratio(non_ascii, body_length, 3),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Personalization {
    pub has_generic_greeting: bool,
    pub has_name_in_greeting: bool,
    pub uses_first_person: bool,
}

impl Personalization {
    fn analyze(lower: &str) -> Self {
        let opening: String = lower.chars().take(GREETING_WINDOW).collect();

        Self {
            has_generic_greeting: contains_any(&opening, GENERIC_GREETINGS),
            has_name_in_greeting: matches_any(&opening, &NAME_GREETING_PATTERNS),
            uses_first_person: contains_any(lower, FIRST_PERSON_SINGULAR),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Money {
    pub money_mention_count: usize,
    pub mentions_money: bool,
    pub mentions_large_sum: bool,
    pub money_keyword_count: usize,
    pub has_prize_language: bool,
}

impl Money {
    fn analyze(body: &str, lower: &str) -> Self {
        let money_mention_count = MONEY_AMOUNT.find_iter(body).count();

        Self {
            money_mention_count,
            mentions_money: money_mention_count > 0,
            mentions_large_sum: LARGE_SUM.is_match(body),
            money_keyword_count: count_occurrences(lower, MONEY_KEYWORDS),
            has_prize_language: contains_any(lower, PRIZE_PHRASES),
        }
    }
}
