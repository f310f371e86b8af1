use eml_signals::extract_urls;
use eml_signals::extracted::{is_ip_host, url_host};

#[test]
fn test_tiers_merge_in_order() {
    let text = "See https://example.com/a, docs.example.org and www.test.io now";
    assert_eq!(
        extract_urls(text),
        vec!["https://example.com/a", "docs.example.org", "www.test.io"]
    );
}

#[test]
fn test_explicit_urls() {
    let text = "Visit https://example.com or \
                HTTP://LinkedIn.com/in/johndoe?ref=mail#top";
    assert_eq!(
        extract_urls(text),
        vec!["https://example.com", "HTTP://LinkedIn.com/in/johndoe?ref=mail#top"]
    );
}

#[test]
fn test_explicit_url_stops_at_markup() {
    let text = "<a href=\"https://example.com/login\">click</a>";
    assert_eq!(extract_urls(text), vec!["https://example.com/login"]);
}

#[test]
fn test_ip_literal_url() {
    assert_eq!(
        extract_urls("Open http://10.1.2.3/admin now"),
        vec!["http://10.1.2.3/admin"]
    );
}

#[test]
fn test_email_addresses_are_not_urls() {
    assert!(extract_urls("Contact john.doe@example.com today").is_empty());
    assert!(extract_urls("support@help.example.org").is_empty());
}

#[test]
fn test_bare_domain_terminators() {
    let text = "Go to example.com, then (news.example.net) or example.org!";
    assert_eq!(extract_urls(text), vec!["example.com", "example.org"]);
}

#[test]
fn test_bare_domain_needs_known_tld() {
    assert!(extract_urls("the file report.docx is attached").is_empty());
    assert_eq!(extract_urls("go to shop.example.zzz"), Vec::<String>::new());
}

#[test]
fn test_bare_domain_must_start_token() {
    assert!(extract_urls("prefix:example.com").is_empty());
}

#[test]
fn test_www_with_unlisted_tld() {
    assert_eq!(extract_urls("Try www.example.zzz today"), vec!["www.example.zzz"]);
}

#[test]
fn test_bare_domain_with_path() {
    assert_eq!(
        extract_urls("login at secure.example.net/verify?id=42 please"),
        vec!["secure.example.net/verify?id=42"]
    );
}

#[test]
fn test_trailing_punctuation_stripped() {
    assert_eq!(
        extract_urls("(see https://example.com/path)."),
        vec!["https://example.com/path"]
    );
    assert_eq!(
        extract_urls("Link: https://example.com/x?y=1;!"),
        vec!["https://example.com/x?y=1"]
    );
}

#[test]
fn test_exact_dedup_only() {
    let text = "example.com and example.com/ and example.com again";
    assert_eq!(extract_urls(text), vec!["example.com", "example.com/"]);
}

#[test]
fn test_scheme_and_bare_forms_both_kept() {
    let text = "https://example.com and www.example.com";
    assert_eq!(
        extract_urls(text),
        vec!["https://example.com", "www.example.com"]
    );
}

#[test]
fn test_deterministic() {
    let text = "a.example.com b.example.org https://c.example.net www.d.example";
    assert_eq!(extract_urls(text), extract_urls(text));
    assert!(extract_urls("").is_empty());
    assert!(extract_urls("   \n  ").is_empty());
}

#[test]
fn test_multiline_text() {
    let text = "first line\nwww.example.com\n\texample.org\n";
    assert_eq!(extract_urls(text), vec!["www.example.com", "example.org"]);
}

#[test]
fn test_url_host() {
    assert_eq!(url_host("http://user@Example.COM:8080/path"), "example.com");
    assert_eq!(url_host("www.example.com/a?b=c"), "www.example.com");
    assert_eq!(url_host("example.org#frag"), "example.org");
    assert_eq!(url_host("https://bit.ly"), "bit.ly");
}

#[test]
fn test_is_ip_host() {
    assert!(is_ip_host("10.0.0.1"));
    assert!(!is_ip_host("10.0.0"));
    assert!(!is_ip_host("example.com"));
}
