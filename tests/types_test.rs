use eml_signals::types::{content_hash, domain_of};
use eml_signals::{Attachment, HeaderMap, Mailbox, Record};

#[test]
fn test_mailbox_angle_brackets() {
    let mailbox = Mailbox::parse("\"John Doe\" <John@Example.com>");
    assert_eq!(mailbox.display_name, "John Doe");
    assert_eq!(mailbox.address, "John@Example.com");
    assert_eq!(mailbox.local_part(), "John");
    assert_eq!(mailbox.domain(), "example.com");
}

#[test]
fn test_mailbox_comment_form() {
    let mailbox = Mailbox::parse("jane@example.org (Jane Roe)");
    assert_eq!(mailbox.display_name, "Jane Roe");
    assert_eq!(mailbox.address, "jane@example.org");
}

#[test]
fn test_mailbox_bare_and_empty() {
    let bare = Mailbox::parse("  bob@corp.com , other@corp.com");
    assert_eq!(bare.display_name, "");
    assert_eq!(bare.address, "bob@corp.com");

    let empty = Mailbox::parse("");
    assert_eq!(empty, Mailbox::default());
    assert_eq!(empty.domain(), "");
}

#[test]
fn test_mailbox_display() {
    assert_eq!(
        Mailbox::parse("Alice <alice@example.com>").to_string(),
        "Alice <alice@example.com>"
    );
    assert_eq!(Mailbox::parse("alice@example.com").to_string(), "alice@example.com");
}

#[test]
fn test_domain_of_uses_last_at() {
    assert_eq!(domain_of("a@b@Evil.COM"), "evil.com");
    assert_eq!(domain_of("no-at-sign"), "");
}

#[test]
fn test_header_map_lookup() {
    let raw = "Received: from a\r\n\
               Subject: Hello\r\n\
               \tworld\r\n\
               received: from b\r\n\
               X-Empty:\r\n\
               \r\n\
               Body: ignored";
    let headers = HeaderMap::parse(raw);

    assert_eq!(headers.len(), 4);
    assert_eq!(
        headers.names().collect::<Vec<_>>(),
        vec!["Received", "Subject", "received", "X-Empty"]
    );
    assert_eq!(headers.get("SUBJECT"), Some("Hello\tworld"));
    assert_eq!(headers.get_all("Received"), vec!["from a", "from b"]);
    assert_eq!(headers.get_or_empty("X-Empty"), "");
    assert!(headers.contains("x-empty"));
    assert!(!headers.contains("Body"));
    assert_eq!(headers.get("Missing"), None);
}

#[test]
fn test_header_map_stops_at_non_header_line() {
    let raw = "From a@example.com Mon Jan  1 10:00:00 2025\r\n\
               Subject: kept\r\n\
               not a header line\r\n\
               X-After: dropped\r\n";
    let headers = HeaderMap::parse(raw);

    assert_eq!(headers.names().collect::<Vec<_>>(), vec!["Subject"]);
    assert!(!headers.contains("X-After"));

    let spaced = HeaderMap::parse("Subject: kept\r\nBad Name: x\r\nX-After: y\r\n");
    assert_eq!(spaced.len(), 1);
}

#[test]
fn test_header_map_empty() {
    let headers = HeaderMap::parse("");
    assert!(headers.is_empty());
    assert_eq!(headers.get_or_empty("From"), "");
}

#[test]
fn test_attachment_hash() {
    let attachment = Attachment::new(
        "greeting.txt".to_string(),
        "text/plain".to_string(),
        b"hello".to_vec(),
    );
    assert_eq!(
        attachment.hash,
        "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
    );
    assert_eq!(attachment.hash, content_hash(b"hello"));
}

#[test]
fn test_record_json_shape() {
    let record = Record {
        email_id: "id-1".to_string(),
        header_list: vec!["From".to_string(), "Received".to_string(), "Received".to_string()],
        raw_headers: "From: a@example.com".to_string(),
        body: "Hi".to_string(),
        og_fname: "one.eml".to_string(),
        attachments: vec![Attachment::new(
            "a.bin".to_string(),
            "application/octet-stream".to_string(),
            vec![0, 159, 146, 150],
        )],
    };

    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["header_list"], "From,Received,Received");
    assert_eq!(json["attachments"][0]["data_base64"], "AJ+Slg==");
    assert!(json["attachments"][0].get("data").is_none());

    let line = serde_json::to_string(&record).unwrap();
    let back: Record = serde_json::from_str(&line).unwrap();
    assert_eq!(back, record);
}

#[test]
fn test_record_empty_header_list() {
    let line = r#"{"email_id":"x","header_list":"","raw_headers":"","body":"","og_fname":"x.eml"}"#;
    let record: Record = serde_json::from_str(line).unwrap();
    assert!(record.header_list.is_empty());
    assert!(record.attachments.is_empty());
}
