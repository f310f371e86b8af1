use eml_signals::{BodyFeatures, extract_body_features, parse_eml};

fn approx(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < 1e-9
}

#[test]
fn test_free_prize_example() {
    let f = BodyFeatures::from_text(
        "id",
        "FREE!!! Click here now www.example.com to claim $1,000,000",
    );

    assert_eq!(f.urgency.exclamation_count, 3);
    assert!(f.urgency.excessive_exclamation);
    assert!(f.money.mentions_money);
    assert_eq!(f.money.money_mention_count, 1);
    assert!(f.money.mentions_large_sum);
    assert!(f.requests.has_request);
    assert_eq!(f.urls, vec!["www.example.com"]);
    assert_eq!(f.links.url_count, 1);
    assert!(f.links.has_links);
}

#[test]
fn test_empty_body_is_all_defaults() {
    for body in ["", "   \r\n\t  "] {
        let f = BodyFeatures::from_text("empty", body);
        assert_eq!(
            f,
            BodyFeatures {
                email_id: "empty".to_string(),
                ..BodyFeatures::default()
            }
        );
        assert!(f.urls.is_empty());
        assert_eq!(f.linguistic.word_count, 0);
        assert!(!f.links.has_links);
    }
}

#[test]
fn test_schema_is_total() {
    let empty = serde_json::to_value(BodyFeatures::from_text("a", "")).unwrap();
    let full = serde_json::to_value(BodyFeatures::from_text(
        "b",
        "Dear customer, verify at https://example.com now!",
    ))
    .unwrap();

    let empty_keys: Vec<&String> = empty.as_object().unwrap().keys().collect();
    let full_keys: Vec<&String> = full.as_object().unwrap().keys().collect();
    assert_eq!(empty_keys.len(), 54);
    assert_eq!(empty_keys, full_keys);
    assert!(empty.get("URLs").unwrap().as_array().unwrap().is_empty());
}

#[test]
fn test_serialized_key_order() {
    let line = serde_json::to_string(&BodyFeatures::from_text("x", "hello there")).unwrap();

    let keys = [
        "\"email_id\"",
        "\"urgency_keyword_count\"",
        "\"claims_trusted_domain\"",
        "\"has_consequence_language\"",
        "\"url_count\"",
        "\"has_misleading_link_text\"",
        "\"request_keyword_count\"",
        "\"word_count\"",
        "\"first_person_plural_ratio\"",
        "\"body_length\"",
        "\"special_char_ratio\"",
        "\"has_generic_greeting\"",
        "\"money_mention_count\"",
        "\"has_prize_language\"",
        "\"URLs\"",
    ];
    let positions: Vec<usize> = keys.iter().map(|key| line.find(key).unwrap()).collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn test_authority_and_greeting() {
    let f = BodyFeatures::from_text(
        "id",
        "Dear customer, your account is locked. We need you to verify your details.",
    );

    assert_eq!(f.authority.authority_keyword_count, 3);
    assert!(f.authority.has_authority_language);
    assert!(f.personalization.has_generic_greeting);
    assert_eq!(f.requests.request_keyword_count, 1);
    assert_eq!(f.linguistic.word_count, 13);
    assert!(approx(f.linguistic.second_person_pronoun_ratio, 0.231));
    assert!(approx(f.linguistic.first_person_plural_ratio, 0.077));
}

#[test]
fn test_impersonation_and_trusted_domain() {
    let f = BodyFeatures::from_text(
        "id",
        "This is from the PayPal security team. Official notice sent on behalf of paypal.com",
    );

    assert!(f.authority.has_impersonation_pattern);
    assert!(f.authority.claims_trusted_domain);
}

#[test]
fn test_threat_and_time_pressure() {
    let f = BodyFeatures::from_text(
        "id",
        "Respond within 24 hours or lose access. Your account will be suspended.",
    );

    assert!(f.urgency.has_time_pressure);
    assert!(f.urgency.has_urgency);
    assert!(f.threat.has_threat);
    assert!(f.threat.has_consequence_language);
}

#[test]
fn test_sensitive_requests() {
    let f = BodyFeatures::from_text(
        "id",
        "Please fill out the form with your password, credit card and date of birth.",
    );

    assert!(f.requests.requests_password);
    assert!(f.requests.requests_financial);
    assert!(f.requests.requests_personal);
    assert!(f.requests.mentions_form);
}

#[test]
fn test_linguistic_features() {
    let f = BodyFeatures::from_text("id", "Hello hello world. This is a test sentence here!");

    assert_eq!(f.linguistic.word_count, 9);
    assert!(approx(f.linguistic.avg_word_length, 4.44));
    assert_eq!(f.linguistic.sentence_count, 2);
    assert!(approx(f.linguistic.avg_sentence_length, 4.5));
    assert!(approx(f.linguistic.capitalization_ratio, 0.053));
    assert_eq!(f.linguistic.repeated_word_count, 1);
    assert!(!f.linguistic.has_irregular_sentences);
    assert!(!f.linguistic.has_excessive_spacing);
}

#[test]
fn test_irregular_sentences_and_spacing() {
    let f = BodyFeatures::from_text("id", "Act now.     Click the link below to continue.");

    assert!(f.linguistic.has_irregular_sentences);
    assert!(f.linguistic.has_excessive_spacing);
    assert!(f.linguistic.imperative_verb_count >= 1);
}

#[test]
fn test_layout_features() {
    let f = BodyFeatures::from_text(
        "id",
        "Line one\n\nLine two\nLine three\n\n\nLine four <b>bold</b> caf\u{e9}",
    );

    assert_eq!(f.layout.line_count, 4);
    assert_eq!(f.layout.paragraph_count, 3);
    assert!(f.layout.has_html_tags);
    assert_eq!(f.layout.html_tag_count, 2);
    assert_eq!(f.layout.body_length, 58);
    assert!(approx(f.layout.special_char_ratio, 0.017));
}

#[test]
fn test_personalized_greeting() {
    let f = BodyFeatures::from_text("id", "Hi Maria, I am sending the notes from today.");

    assert!(f.personalization.has_name_in_greeting);
    assert!(!f.personalization.has_generic_greeting);
    assert!(f.personalization.uses_first_person);
}

#[test]
fn test_money_features() {
    let f = BodyFeatures::from_text(
        "id",
        "Congratulations! You have won 5 million dollars. Claim your prize of \u{20ac}500 today.",
    );

    assert_eq!(f.money.money_mention_count, 1);
    assert!(f.money.mentions_large_sum);
    assert_eq!(f.money.money_keyword_count, 1);
    assert!(f.money.has_prize_language);
}

#[test]
fn test_url_risk_flags() {
    let f = BodyFeatures::from_text(
        "id",
        "Login at http://192.168.0.1/login and https://bit.ly/abc or http://secure.login.paypal.com.evil.tk/x",
    );

    assert_eq!(
        f.urls,
        vec![
            "http://192.168.0.1/login",
            "https://bit.ly/abc",
            "http://secure.login.paypal.com.evil.tk/x",
        ]
    );
    assert!(f.links.has_ip_url);
    assert!(f.links.has_shortened_url);
    assert!(f.links.has_suspicious_tld);
    assert!(f.links.has_excessive_subdomains);
    assert!(!f.links.has_at_in_url);
    assert!(approx(f.links.link_density, 0.429));
}

#[test]
fn test_at_sign_in_url() {
    let f = BodyFeatures::from_text("id", "Go to http://evil.example.com/r?u=me@paypal.com now");

    assert!(f.links.has_at_in_url);
    assert!(!f.links.has_ip_url);
    assert!(!f.links.has_shortened_url);
}

#[test]
fn test_misleading_link_text() {
    let misleading = BodyFeatures::from_text(
        "id",
        "Update here: <a href=\"http://evil.example.net/login\">https://www.paypal.com</a>",
    );
    assert!(misleading.links.has_misleading_link_text);
    assert!(misleading.layout.has_html_tags);

    let honest = BodyFeatures::from_text(
        "id",
        "Update here: <a href=\"https://www.paypal.com/signin\">https://www.paypal.com</a>",
    );
    assert!(!honest.links.has_misleading_link_text);
}

#[test]
fn test_features_from_record() {
    let raw = b"Subject: hi\r\n\r\nUrgent: confirm at www.example.org";
    let record = parse_eml(raw, "hi.eml");
    let f = extract_body_features(&record);

    assert_eq!(f.email_id, record.email_id);
    assert!(f.urgency.has_urgency);
    assert_eq!(f.urls, vec!["www.example.org"]);
}
