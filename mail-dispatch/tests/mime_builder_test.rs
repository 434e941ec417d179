use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use mail_dispatch::mime::encoding::wrap_base64;
use mail_dispatch::mime::{Attachment, FixedBoundary, Message, MessageBuilder};

const BOUNDARY: &str = "XBOUNDARYX";

fn builder() -> MessageBuilder {
    MessageBuilder::with_boundary(FixedBoundary(BOUNDARY.to_string()))
}

fn header_block(payload: &str) -> &str {
    let end = payload.find("\r\n\r\n").expect("header block terminator");
    &payload[..end]
}

#[test]
fn test_simple_message_scenario() {
    let msg = Message::new()
        .from("a@x.com")
        .to(["b@x.com"])
        .subject("Hi")
        .body("hello");

    let payload = MessageBuilder::new().render(&msg);

    assert!(payload.starts_with("From: a@x.com\r\nTo: b@x.com\r\n"));
    assert!(payload.contains("Subject: Hi\r\n"));
    assert!(payload.contains("MIME-Version: 1.0\r\n"));
    assert_eq!(payload.matches("hello").count(), 1);
    assert!(!payload.contains("Content-Disposition: attachment"));
}

#[test]
fn test_body_follows_first_boundary() {
    let body = "Quarterly numbers are in.";
    let msg = Message::new()
        .from("a@x.com")
        .to(["b@x.com"])
        .subject("Numbers")
        .body(body);

    let payload = builder().render(&msg);

    assert!(payload.contains("Subject: Numbers\r\n"));
    let first_boundary = payload.find(&format!("--{}\r\n", BOUNDARY)).unwrap();
    let after_boundary = &payload[first_boundary..];
    let blank = after_boundary.find("\r\n\r\n").unwrap();
    assert!(after_boundary[blank + 4..].starts_with(body));
}

#[test]
fn test_bcc_never_in_headers() {
    let msg = Message::new()
        .from("a@x.com")
        .to(["b@x.com"])
        .cc(["c@x.com"])
        .bcc(["hidden1@x.com", "hidden2@x.com"])
        .subject("Hi")
        .body("hello")
        .attachment(Attachment::new("a.txt", "text/plain", &b"data"[..]));

    let payload = builder().render(&msg);

    for line in payload.split("\r\n") {
        assert!(!line.contains("hidden1@x.com"), "leaked in {:?}", line);
        assert!(!line.contains("hidden2@x.com"), "leaked in {:?}", line);
        assert!(!line.to_ascii_lowercase().starts_with("bcc:"));
    }
    assert!(header_block(&payload).contains("Cc: c@x.com"));
}

#[test]
fn test_part_count_matches_attachments() {
    for k in 0..4 {
        let mut msg = Message::new().from("a@x.com").to(["b@x.com"]).body("body");
        for i in 0..k {
            msg.push_attachment(Attachment::new(
                format!("file{}.bin", i),
                "application/octet-stream",
                vec![i as u8; 100],
            ));
        }

        let payload = builder().render(&msg);
        let lines: Vec<&str> = payload.split("\r\n").collect();

        let delimiters = lines
            .iter()
            .filter(|line| **line == format!("--{}", BOUNDARY))
            .count();
        let closing = lines
            .iter()
            .filter(|line| **line == format!("--{}--", BOUNDARY))
            .count();

        assert_eq!(delimiters, k + 1, "with {} attachments", k);
        assert_eq!(closing, 1);
        assert!(payload.ends_with(&format!("--{}--", BOUNDARY)));
    }
}

#[test]
fn test_attachment_round_trip_through_payload() {
    let data: Vec<u8> = (0..5000u32).map(|i| (i * 31 % 251) as u8).collect();
    let msg = Message::new()
        .from("a@x.com")
        .to(["b@x.com"])
        .attachment(Attachment::new("blob.bin", "application/octet-stream", data.clone()));

    let payload = builder().render(&msg);

    let part_start = payload
        .find("Content-Disposition: attachment; filename=\"blob.bin\"\r\n\r\n")
        .unwrap();
    let encoded_start = payload[part_start..].find("\r\n\r\n").unwrap() + part_start + 4;
    let encoded_end = payload.rfind(&format!("--{}--", BOUNDARY)).unwrap();
    let encoded = &payload[encoded_start..encoded_end];

    for line in encoded.split("\r\n") {
        assert!(line.len() <= 76);
    }
    let joined: String = encoded.split("\r\n").collect();
    assert_eq!(BASE64.decode(joined).unwrap(), data);
}

#[test]
fn test_wrap_base64_laws() {
    for len in [0usize, 1, 45, 57, 76, 100, 1000, 4096] {
        let data: Vec<u8> = (0..len).map(|i| (i % 256) as u8).collect();
        let encoded = wrap_base64(&data);

        assert!(encoded.split("\r\n").all(|line| line.len() <= 76));
        assert_eq!(encoded.matches('\n').count(), encoded.matches("\r\n").count());

        let joined: String = encoded.split("\r\n").collect();
        assert_eq!(BASE64.decode(joined).unwrap(), data);
    }
}

#[test]
fn test_crlf_line_endings_throughout() {
    let msg = Message::new()
        .from("a@x.com")
        .to(["b@x.com"])
        .subject("Hi")
        .body("one\ntwo\r\nthree")
        .attachment(Attachment::new("x.txt", "text/plain", vec![b'x'; 300]));

    let payload = builder().render(&msg);
    let bytes = payload.as_bytes();

    for (i, byte) in bytes.iter().enumerate() {
        if *byte == b'\n' {
            assert_eq!(bytes[i - 1], b'\r', "bare LF at offset {}", i);
        }
    }
}

#[test]
fn test_attachment_headers_escape_filename() {
    let msg = Message::new()
        .from("a@x.com")
        .to(["b@x.com"])
        .attachment(Attachment::new("q\"uote.txt", "text/plain", &b"hi"[..]));

    let payload = builder().render(&msg);

    assert!(payload.contains("Content-Type: text/plain; name=\"q\\\"uote.txt\"\r\n"));
    assert!(payload.contains("Content-Disposition: attachment; filename=\"q\\\"uote.txt\"\r\n"));
}

#[test]
fn test_non_ascii_subject_is_encoded() {
    let msg = Message::new()
        .from("a@x.com")
        .to(["b@x.com"])
        .subject("Réunion");

    let payload = builder().render(&msg);
    assert!(header_block(&payload).contains("Subject: =?utf-8?B?"));
    assert!(payload.is_ascii());
}
