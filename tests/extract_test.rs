use email_ticket::*;

fn ticket(raw: &[u8]) -> TicketRecord {
    extract(&parse(raw).unwrap())
}

#[test]
fn test_simple_ticket() {
    let record = ticket(
        b"From: John Doe <john@example.com>\r\n\
          To: support@example.com\r\n\
          Subject: Test Email\r\n\
          \r\n\
          This is a test email message.\r\n",
    );

    assert_eq!(
        record,
        TicketRecord {
            subject: "Test Email".into(),
            sender_name: "John Doe".into(),
            sender_email: "john@example.com".into(),
            message: "This is a test email message.".into(),
            attachments: vec![],
        }
    );
}

#[test]
fn test_attachment_ticket() {
    let raw = "From: John Doe <john@example.com>
To: support@example.com
Subject: Email with Attachment
MIME-Version: 1.0
Content-Type: multipart/mixed; boundary=\"boundary123\"

--boundary123
Content-Type: text/plain

This is the email body.

--
Regards
Test User

--boundary123
Content-Type: text/plain; name=\"attachment.txt\"
Content-Transfer-Encoding: base64
Content-Disposition: attachment; filename=\"attachment.txt\"

VGhpcyBpcyBhbiBhdHRhY2htZW50Lg==

--boundary123--
    ";

    let record = ticket(raw.as_bytes());

    assert_eq!(record.subject, "Email with Attachment");
    assert_eq!(record.sender_name, "John Doe");
    assert_eq!(record.sender_email, "john@example.com");
    assert_eq!(record.message, "This is the email body.\n\n--\nRegards\nTest User");
    assert_eq!(
        record.attachments,
        vec![AttachmentRecord {
            filename: "attachment.txt".into(),
            mime_type: "text/plain".into(),
            content: "VGhpcyBpcyBhbiBhdHRhY2htZW50Lg==".into(),
        }]
    );
}

#[test]
fn test_bare_address_sender() {
    let record = ticket(b"From: john@example.com\r\n\r\nhi");
    assert_eq!(record.sender_name, "john@example.com");
    assert_eq!(record.sender_email, "john@example.com");
}

#[test]
fn test_quoted_display_name_with_comma() {
    let record = ticket(b"From: \"Doe, John\" <john@example.com>\r\n\r\nhi");
    assert_eq!(record.sender_name, "Doe, John");
    assert_eq!(record.sender_email, "john@example.com");
}

#[test]
fn test_encoded_display_name() {
    let record = ticket(
        b"From: =?UTF-8?Q?Ren=C3=A9_Fran=C3=A7ois?= <rene@example.fr>\r\n\
          Subject: =?ISO-8859-1?Q?Probl=E8me?=\r\n\
          \r\n\
          Bonjour",
    );
    assert_eq!(record.sender_name, "René François");
    assert_eq!(record.sender_email, "rene@example.fr");
    assert_eq!(record.subject, "Problème");
}

#[test]
fn test_missing_headers_degrade_to_empty() {
    let record = ticket(b"\r\nNo headers at all");
    assert_eq!(record.subject, "");
    assert_eq!(record.sender_name, "");
    assert_eq!(record.sender_email, "");
    assert_eq!(record.message, "No headers at all");
}

#[test]
fn test_plain_parts_joined_in_order() {
    let raw = b"Content-Type: multipart/mixed; boundary=b\r\n\
                \r\n\
                --b\r\n\
                Content-Type: text/plain\r\n\
                \r\n\
                first part\r\n\
                --b\r\n\
                Content-Type: multipart/alternative; boundary=c\r\n\
                \r\n\
                --c\r\n\
                Content-Type: text/plain; charset=iso-8859-1\r\n\
                Content-Transfer-Encoding: quoted-printable\r\n\
                \r\n\
                second =E9t=E9\r\n\
                --c\r\n\
                Content-Type: text/html\r\n\
                \r\n\
                <p>second</p>\r\n\
                --c--\r\n\
                --b\r\n\
                Content-Type: text/plain\r\n\
                \r\n\
                third\r\nline\r\n\
                --b--\r\n";

    let record = ticket(raw);

    assert_eq!(record.message, "first part\n\nsecond été\n\nthird\nline");
    assert_eq!(record.attachments.len(), 1);
    assert_eq!(record.attachments[0].mime_type, "text/html");
    assert_eq!(record.attachments[0].filename, "");
}

#[test]
fn test_html_only_gives_empty_message() {
    let record = ticket(
        b"Content-Type: text/html\r\n\
          \r\n\
          <html><body><p>Hello</p></body></html>",
    );
    assert_eq!(record.message, "");
    assert_eq!(record.attachments.len(), 1);
    assert_eq!(record.attachments[0].mime_type, "text/html");
}

#[test]
fn test_attachment_bytes_round_trip() {
    let blob: Vec<u8> = (0..=255u8).cycle().take(1000).collect();
    let encoded = encode_base64(&blob);
    let wrapped: Vec<&str> = encoded
        .as_bytes()
        .chunks(76)
        .map(|c| std::str::from_utf8(c).unwrap())
        .collect();

    let raw = format!(
        "From: a@example.com\r\n\
         Content-Type: multipart/mixed; boundary=zz\r\n\
         \r\n\
         --zz\r\n\
         Content-Type: text/plain\r\n\
         \r\n\
         see attached\r\n\
         --zz\r\n\
         Content-Type: Application/Octet-Stream\r\n\
         Content-Disposition: attachment; filename*=UTF-8''donn%C3%A9es.bin\r\n\
         Content-Transfer-Encoding: base64\r\n\
         \r\n\
         {}\r\n\
         --zz\r\n\
         Content-Type: image/png; name=\"pixel.png\"\r\n\
         Content-Disposition: inline\r\n\
         \r\n\
         PNG\r\n\
         --zz--\r\n",
        wrapped.join("\r\n")
    );

    let record = ticket(raw.as_bytes());

    assert_eq!(record.message, "see attached");
    assert_eq!(record.attachments.len(), 2);

    let bin = &record.attachments[0];
    assert_eq!(bin.filename, "données.bin");
    assert_eq!(bin.mime_type, "application/octet-stream");
    assert_eq!(decode_base64(bin.content.as_bytes()).unwrap(), blob);

    let png = &record.attachments[1];
    assert_eq!(png.filename, "pixel.png");
    assert_eq!(png.mime_type, "image/png");
    assert_eq!(decode_base64(png.content.as_bytes()).unwrap(), b"PNG");
}

#[test]
fn test_text_plain_attachment_not_in_body() {
    let raw = b"Content-Type: multipart/mixed; boundary=b\r\n\
                \r\n\
                --b\r\n\
                \r\n\
                body\r\n\
                --b\r\n\
                Content-Type: text/plain\r\n\
                Content-Disposition: attachment\r\n\
                \r\n\
                log line\r\n\
                --b--\r\n";

    let record = ticket(raw);

    assert_eq!(record.message, "body");
    assert_eq!(record.attachments.len(), 1);
    assert_eq!(record.attachments[0].filename, "");
    assert_eq!(
        decode_base64(record.attachments[0].content.as_bytes()).unwrap(),
        b"log line"
    );
}

#[test]
fn test_group_sender_uses_first_member() {
    let record = ticket(b"From: Support: Ann <ann@example.com>, bob@example.com;\r\n\r\nhi");
    assert_eq!(record.sender_name, "Ann");
    assert_eq!(record.sender_email, "ann@example.com");
}

#[test]
fn test_body_keeps_leading_blank_line_and_trailing_spaces() {
    let record = ticket(b"Subject: layout\r\n\r\n\r\n    indented after blank\r\nsig   \r\n");
    assert_eq!(record.message, "\n    indented after blank\nsig   ");
}

#[test]
fn test_empty_plain_part_keeps_its_place() {
    let raw = b"Content-Type: multipart/mixed; boundary=b\r\n\
                \r\n\
                --b\r\n\
                \r\n\
                first\r\n\
                --b\r\n\
                Content-Type: text/plain\r\n\
                \r\n\
                \r\n\
                --b\r\n\
                \r\n\
                third\r\n\
                --b--\r\n";

    let record = ticket(raw);

    assert_eq!(record.message, "first\n\n\n\nthird");
    assert!(record.attachments.is_empty());
}

#[test]
fn test_obsolete_from_header_syntax() {
    let record = ticket(b"From : John Doe <john@example.com>\r\nSubject: hi\r\n\r\nbody");
    assert_eq!(record.sender_name, "John Doe");
    assert_eq!(record.sender_email, "john@example.com");
    assert_eq!(record.subject, "hi");
}

#[test]
fn test_encoded_attachment_name() {
    let raw = b"Content-Type: multipart/mixed; boundary=b\r\n\
                \r\n\
                --b\r\n\
                \r\n\
                body\r\n\
                --b\r\n\
                Content-Type: application/pdf; name=\"=?UTF-8?B?UmVwb3J0LnBkZg==?=\"\r\n\
                \r\n\
                %PDF-\r\n\
                --b--\r\n";

    let record = ticket(raw);

    assert_eq!(record.attachments[0].filename, "Report.pdf");
}
