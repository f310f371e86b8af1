//! Fixed keyword, phrase, pattern and domain tables
//!
//! All matching against these tables is done on lower-cased text, so every
//! entry is lower case.

use std::sync::LazyLock;

use regex::Regex;

pub const URGENCY_KEYWORDS: &[&str] = &[
    "urgent",
    "immediately",
    "asap",
    "right now",
    "expire",
    "expires",
    "expiring",
    "limited time",
    "act now",
    "don't wait",
    "hurry",
    "quick",
    "fast",
    "deadline",
    "today only",
    "last chance",
    "final notice",
    "time sensitive",
    "respond now",
    "immediate action",
    "within 24 hours",
    "within 48 hours",
];

pub const AUTHORITY_KEYWORDS: &[&str] = &[
    "verify",
    "confirm",
    "validate",
    "authenticate",
    "security alert",
    "account",
    "suspended",
    "locked",
    "unauthorized",
    "unusual activity",
    "fraud",
    "fraudulent",
    "verify your identity",
    "confirm your identity",
    "security team",
    "security department",
    "customer service",
    "support team",
    "administrator",
    "system administrator",
    "it department",
];

pub const THREAT_KEYWORDS: &[&str] = &[
    "suspend",
    "terminated",
    "cancelled",
    "closed",
    "blocked",
    "restricted",
    "legal action",
    "lawsuit",
    "court",
    "penalty",
    "fine",
    "police",
    "arrest",
    "criminal",
    "prosecution",
    "consequences",
    "lose access",
    "permanently deleted",
    "violation",
    "breach",
    "compromised",
];

pub const REQUEST_KEYWORDS: &[&str] = &[
    "click here",
    "click the link",
    "click below",
    "log in",
    "login",
    "sign in",
    "update",
    "confirm",
    "verify",
    "provide",
    "enter",
    "submit",
    "reset password",
    "change password",
    "update payment",
    "billing information",
    "credit card",
    "social security",
    "ssn",
    "account number",
    "routing number",
    "date of birth",
    "mother's maiden name",
];

pub const MONEY_KEYWORDS: &[&str] = &[
    "refund",
    "prize",
    "lottery",
    "inheritance",
    "compensation",
    "owed",
    "transfer",
    "wire",
    "payment",
    "invoice",
];

pub const TRUSTED_DOMAINS: &[&str] = &[
    "google.com",
    "microsoft.com",
    "apple.com",
    "amazon.com",
    "facebook.com",
    "paypal.com",
    "ebay.com",
    "netflix.com",
    "linkedin.com",
    "twitter.com",
    "instagram.com",
    "yahoo.com",
    "outlook.com",
    "gmail.com",
];

pub const FREE_EMAIL_PROVIDERS: &[&str] = &[
    "gmail.com",
    "yahoo.com",
    "hotmail.com",
    "outlook.com",
    "aol.com",
    "icloud.com",
    "mail.com",
    "protonmail.com",
    "yandex.com",
    "zoho.com",
    "gmx.com",
];

pub const GENERIC_GREETINGS: &[&str] = &[
    "dear customer",
    "dear user",
    "dear member",
    "dear sir/madam",
    "dear sir or madam",
    "hello user",
    "valued customer",
    "dear valued customer",
    "dear account holder",
    "dear client",
    "greetings",
];

pub const PASSWORD_PHRASES: &[&str] = &["password", "passphrase", "pin", "security code"];

pub const FINANCIAL_PHRASES: &[&str] = &[
    "credit card",
    "bank account",
    "routing number",
    "card number",
    "cvv",
    "billing",
];

pub const PERSONAL_PHRASES: &[&str] = &[
    "social security",
    "ssn",
    "date of birth",
    "driver's license",
    "passport",
];

pub const FORM_PHRASES: &[&str] = &[
    "fill out",
    "complete the form",
    "enter your",
    "input your",
    "provide your",
];

pub const IMPERATIVE_VERBS: &[&str] = &[
    "click", "verify", "confirm", "update", "download", "open", "call", "contact", "respond",
    "reply", "send", "provide", "enter", "submit", "reset", "change", "renew", "activate",
    "complete", "review",
];

pub const SECOND_PERSON_PRONOUNS: &[&str] = &["you", "your", "yours", "you're", "you've", "you'll"];

pub const FIRST_PERSON_PLURAL: &[&str] = &[" we ", " our ", " us ", "we're", "we've", "we'll"];

pub const FIRST_PERSON_SINGULAR: &[&str] =
    &["i am", "i have", "i will", "i need", "i want", "my name"];

pub const PRIZE_PHRASES: &[&str] = &[
    "you have won",
    "you've won",
    "congratulations",
    "claim your",
    "you are selected",
    "you have been chosen",
];

pub const URL_SHORTENERS: &[&str] = &[
    "bit.ly",
    "tinyurl.com",
    "t.co",
    "goo.gl",
    "ow.ly",
    "is.gd",
    "buff.ly",
    "rebrand.ly",
    "cutt.ly",
    "shorturl.at",
    "tiny.cc",
    "rb.gy",
    "v.gd",
    "short.link",
    "u.to",
];

pub const SUSPICIOUS_TLDS: &[&str] = &[
    "tk", "ml", "ga", "cf", "gq", "xyz", "top", "click", "work", "zip", "review", "country",
    "kim", "loan", "men", "date", "racing", "download", "stream", "gdn", "icu",
];

/// TLDs accepted for scheme-less URLs
pub const COMMON_TLDS: &[&str] = &[
    "com", "org", "net", "edu", "gov", "mil", "co", "io", "ai", "app", "dev", "tech", "info",
    "biz", "name", "pro", "xyz", "online", "site", "website", "store", "shop", "blog", "news",
    "media", "tv", "me", "us", "uk", "ca", "au", "de", "fr", "jp", "cn", "in", "br", "ru", "it",
    "es", "nl", "se", "no", "dk", "fi", "pl", "be", "ch", "at", "cz", "gr", "pt", "ie", "nz",
    "sg", "hk", "kr", "tw", "th", "my", "id", "ph", "vn", "za", "ae", "il", "tr", "mx", "ar",
    "cl",
];

fn compile_all(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().map(|p| Regex::new(p).unwrap()).collect()
}

pub static TIME_PRESSURE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile_all(&[
        r"within\s+\d+\s+(hour|day|minute)s?",
        r"in\s+the\s+next\s+\d+\s+(hour|day)s?",
        r"\d+\s+(hour|day)s?\s+to\s+",
        r"before\s+\d+[:/]\d+",
    ])
});

pub static IMPERSONATION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile_all(&[
        r"(we are|this is|i am)\s+(from|with|representing)\s+",
        r"official\s+(notice|notification|communication|email)",
        r"on\s+behalf\s+of",
        r"authorized\s+(representative|agent|personnel)",
    ])
});

pub static CONSEQUENCE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile_all(&[
        r"(will|may|could)\s+be\s+(suspended|terminated|closed|deleted|removed)",
        r"(lose|loss of)\s+(access|account|data|information)",
        r"unable\s+to\s+(access|use|log in|sign in)",
    ])
});

pub static NAME_GREETING_PATTERNS: LazyLock<Vec<Regex>> =
    LazyLock::new(|| compile_all(&["dear [a-z]+", "hi [a-z]+", "hello [a-z]+"]));

/// Sum of non-overlapping occurrences of every phrase in `text`
#[must_use]
pub fn count_occurrences(text: &str, phrases: &[&str]) -> usize {
    phrases.iter().map(|phrase| text.matches(phrase).count()).sum()
}

/// Whether any phrase occurs in `text`
#[must_use]
pub fn contains_any(text: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|phrase| text.contains(phrase))
}

/// Whether any pattern matches anywhere in `text`
#[must_use]
pub fn matches_any(text: &str, patterns: &[Regex]) -> bool {
    patterns.iter().any(|pattern| pattern.is_match(text))
}
