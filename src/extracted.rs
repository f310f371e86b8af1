//! URL extraction from body text
//!
//! Three tiers of decreasing confidence are matched in order and merged:
//!
//! 1. explicit `http://` / `https://` URLs,
//! 2. scheme-less dotted names ending in a known TLD,
//! 3. `www.`-prefixed names with any TLD.
//!
//! Tiers 2 and 3 only match whole tokens: a match starts at the beginning of
//! the text or after whitespace and ends at whitespace, the end of the text or
//! one of `,;!?)`. Tier 2 also skips tokens that turn out to be email
//! addresses.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::lexicon::COMMON_TLDS;

const LABEL: &str = r"[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?";
const PATH: &str = r#"(?:[/?#][^\s<>"{}|\\^`\[\]]*)?"#;

/// Characters allowed right after a tier 2/3 match inside a token
const URL_TERMINATORS: &[char] = &[',', ';', '!', '?', ')'];

/// Characters stripped from the end of every extracted URL
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', '!', '?', ')', ']'];

static HTTP_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)https?://(?:(?:{LABEL}\.)+[a-z]{{2,}}|\d{{1,3}}(?:\.\d{{1,3}}){{3}}){PATH}"
    ))
    .unwrap()
});

static BARE_DOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    let tlds = COMMON_TLDS.join("|");
    Regex::new(&format!(r"(?i)^(?:{LABEL}\.)+(?:{tlds}){PATH}$")).unwrap()
});

static WWW_DOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)^www\.(?:{LABEL}\.)*{LABEL}{PATH}$")).unwrap()
});

static IPV4_HOST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,3}(?:\.\d{1,3}){3}$").unwrap());

/// Extract URLs from text
///
/// Tiers are concatenated in order, trailing punctuation is stripped and exact
/// duplicates are dropped keeping the first occurrence. Near duplicates such as
/// `example.com` and `example.com/` both survive.
#[must_use]
pub fn extract_urls(text: &str) -> Vec<String> {
    let explicit = HTTP_URL.find_iter(text).map(|m| m.as_str());
    let bare = token_matches(text, &BARE_DOMAIN, true);
    let www = token_matches(text, &WWW_DOMAIN, false);

    let mut seen = HashSet::new();
    explicit
        .chain(bare)
        .chain(www)
        .map(|url| url.trim().trim_end_matches(TRAILING_PUNCTUATION))
        .filter(|url| !url.is_empty() && seen.insert(*url))
        .map(str::to_string)
        .collect()
}

/// Whole-token matches of an anchored pattern
fn token_matches<'t>(text: &'t str, pattern: &Regex, skip_addresses: bool) -> Vec<&'t str> {
    let mut found = Vec::new();
    let mut prev: Option<char> = None;

    for (start, ch) in text.char_indices() {
        let at_token_start = prev.is_none_or(char::is_whitespace) && !ch.is_whitespace();
        prev = Some(ch);
        if !at_token_start {
            continue;
        }

        let rest = &text[start..];
        let token = &rest[..rest.find(char::is_whitespace).unwrap_or(rest.len())];
        if skip_addresses && is_address_like(token) {
            continue;
        }
        if let Some(url) = longest_match(token, pattern) {
            found.push(url);
        }
    }

    found
}

/// Longest prefix of `token` that ends at a terminator and fully matches
fn longest_match<'t>(token: &'t str, pattern: &Regex) -> Option<&'t str> {
    let inner_ends = token
        .char_indices()
        .filter(|(_, c)| URL_TERMINATORS.contains(c))
        .map(|(i, _)| i)
        .rev();

    std::iter::once(token.len())
        .chain(inner_ends)
        .find(|&end| end > 0 && pattern.is_match(&token[..end]))
        .map(|end| &token[..end])
}

/// Whether the leading run of word characters, dots and hyphens ends in `@`
fn is_address_like(token: &str) -> bool {
    token
        .chars()
        .find(|c| !(c.is_alphanumeric() || matches!(c, '_' | '.' | '-')))
        == Some('@')
}

/// Lower-cased host of a URL with or without scheme, without port or userinfo
#[must_use]
pub fn url_host(url: &str) -> String {
    let lower = url.to_lowercase();
    let rest = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"))
        .unwrap_or(&lower);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
    host.split(':').next().unwrap_or_default().to_string()
}

/// Whether a host is a dotted IPv4 literal
#[must_use]
pub fn is_ip_host(host: &str) -> bool {
    IPV4_HOST.is_match(host)
}
