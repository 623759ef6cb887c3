//! The SMTP response parser (§4.1).
//!
//! A pure function over an accumulating byte buffer: it never mutates its
//! input and never blocks. The session layer (`smtp::session`) owns the
//! growing buffer and re-invokes this parser as more bytes arrive, since a
//! real peer may split a multi-line response across several socket reads.

use regex::Regex;
use std::sync::OnceLock;

use super::types::{Classification, SmtpResponse};

/// Result of attempting to frame a response out of `buf`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// A complete response was framed. `consumed` is the number of leading
    /// bytes of `buf` that made up the response; any trailing bytes belong
    /// to whatever comes next and must be kept by the caller.
    Complete { response: SmtpResponse, consumed: usize },
    /// Not enough data yet; the caller should read more bytes and retry.
    Incomplete,
}

fn enhanced_code_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d{3}[ -](\d{1,3}\.\d{1,3}\.\d{1,3})\s").unwrap())
}

/// Frames one SMTP response out of `buf`. See module docs for the
/// incremental contract.
pub fn parse(buf: &[u8]) -> ParseOutcome {
    let mut entries: Vec<(String, usize)> = Vec::new();
    let mut start = 0usize;

    for (idx, &byte) in buf.iter().enumerate() {
        if byte != b'\n' {
            continue;
        }
        let mut raw = &buf[start..idx];
        if raw.last() == Some(&b'\r') {
            raw = &raw[..raw.len() - 1];
        }
        let end = idx + 1;
        let line = String::from_utf8_lossy(raw).into_owned();
        if !line.is_empty() {
            entries.push((line, end));
        }
        start = end;
    }

    let Some((last_line, last_end)) = entries.last().cloned() else {
        return ParseOutcome::Incomplete;
    };

    if last_line.len() < 3 || !last_line.as_bytes()[..3].iter().all(u8::is_ascii_digit) {
        return ParseOutcome::Incomplete;
    }
    let code: u16 = last_line[..3].parse().unwrap();
    match last_line.as_bytes().get(3) {
        None | Some(b' ') => {}
        Some(b'-') => return ParseOutcome::Incomplete,
        Some(_) => return ParseOutcome::Incomplete,
    }

    let lines: Vec<String> = entries.iter().map(|(l, _)| l.clone()).collect();
    let message = synthesize_message(&lines);
    let enhanced_code = extract_enhanced_code(&lines);
    let message = match &enhanced_code {
        Some(ec) => strip_enhanced_code(&message, ec),
        None => message,
    };

    ParseOutcome::Complete {
        response: SmtpResponse {
            code,
            enhanced_code,
            message,
            lines,
            classification: Classification::from_code(code),
        },
        consumed: last_end,
    }
}

/// Strips the 3-digit-code + separator prefix from each line and joins with
/// a single space, trimmed (§4.1 Message synthesis).
fn synthesize_message(lines: &[String]) -> String {
    let parts: Vec<&str> = lines
        .iter()
        .map(|line| {
            let prefix_len = if line.len() > 3 { 4 } else { 3 };
            line.get(prefix_len.min(line.len())..).unwrap_or("")
        })
        .collect();
    parts.join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}

fn extract_enhanced_code(lines: &[String]) -> Option<String> {
    for line in lines {
        if let Some(caps) = enhanced_code_regex().captures(line) {
            return Some(caps[1].to_string());
        }
    }
    None
}

/// Removes the leading occurrence of `code` from `message`, adjacent
/// whitespace collapsed — never a blind global replace, since a human
/// message could legitimately contain the same digits (§9 design note).
fn strip_enhanced_code(message: &str, code: &str) -> String {
    if let Some(pos) = message.find(code) {
        let mut out = String::with_capacity(message.len());
        out.push_str(&message[..pos]);
        out.push_str(&message[pos + code.len()..]);
        out.split_whitespace().collect::<Vec<_>>().join(" ")
    } else {
        message.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete(buf: &[u8]) -> (SmtpResponse, usize) {
        match parse(buf) {
            ParseOutcome::Complete { response, consumed } => (response, consumed),
            ParseOutcome::Incomplete => panic!("expected complete parse for {buf:?}"),
        }
    }

    #[test]
    fn empty_buffer_is_incomplete() {
        assert_eq!(parse(b""), ParseOutcome::Incomplete);
    }

    #[test]
    fn simple_success() {
        let (resp, consumed) = complete(b"250 OK\r\n");
        assert_eq!(resp.code, 250);
        assert_eq!(resp.enhanced_code, None);
        assert_eq!(resp.message, "OK");
        assert_eq!(resp.classification, Classification::Success);
        assert_eq!(resp.lines, vec!["250 OK".to_string()]);
        assert_eq!(consumed, buf_len(b"250 OK\r\n"));
    }

    fn buf_len(b: &[u8]) -> usize {
        b.len()
    }

    #[test]
    fn multiline_ehlo() {
        let input = b"250-mx.google.com at your service\r\n250-SIZE 35882577\r\n250-8BITMIME\r\n250-STARTTLS\r\n250-ENHANCEDSTATUSCODES\r\n250 CHUNKING\r\n";
        let (resp, _) = complete(input);
        assert_eq!(resp.code, 250);
        assert_eq!(resp.lines.len(), 6);
        assert_eq!(resp.classification, Classification::Success);
    }

    #[test]
    fn enhanced_code_extracted_and_removed() {
        let input = b"550 5.1.1 The email account that you tried to reach does not exist.\r\n";
        let (resp, _) = complete(input);
        assert_eq!(resp.code, 550);
        assert_eq!(resp.enhanced_code.as_deref(), Some("5.1.1"));
        assert!(!resp.message.contains("5.1.1"));
        assert_eq!(resp.classification, Classification::PermanentFail);
    }

    #[test]
    fn incomplete_multiline() {
        let input = b"250-mx.google.com at your service\r\n250-SIZE 35882577\r\n";
        assert_eq!(parse(input), ParseOutcome::Incomplete);
    }

    #[test]
    fn only_continuation_lines_is_incomplete() {
        assert_eq!(parse(b"250-only continuation\r\n"), ParseOutcome::Incomplete);
    }

    #[test]
    fn malformed_last_line_is_incomplete() {
        assert_eq!(parse(b"not-a-code\r\n"), ParseOutcome::Incomplete);
    }

    #[test]
    fn classification_buckets_match_code_range() {
        for (code, expected) in [
            (200u16, Classification::Success),
            (299, Classification::Success),
            (300, Classification::Intermediate),
            (399, Classification::Intermediate),
            (400, Classification::TransientFail),
            (499, Classification::TransientFail),
            (500, Classification::PermanentFail),
            (599, Classification::PermanentFail),
        ] {
            let input = format!("{code} OK\r\n");
            let (resp, _) = complete(input.as_bytes());
            assert_eq!(resp.classification, expected, "code {code}");
        }
    }

    #[test]
    fn trailing_bytes_after_response_are_not_consumed() {
        let input = b"250 OK\r\n250 again\r\n";
        let (resp, consumed) = complete(input);
        assert_eq!(resp.code, 250);
        assert_eq!(consumed, "250 OK\r\n".len());
        assert_eq!(&input[consumed..], b"250 again\r\n");
    }

    #[test]
    fn round_trip_reparse_matches() {
        let input = b"250-first line\r\n250 second line\r\n";
        let (first, consumed) = complete(input);
        let reserialized: Vec<u8> = first
            .lines
            .iter()
            .enumerate()
            .flat_map(|(i, line)| {
                let sep = if i + 1 == first.lines.len() { ' ' } else { '-' };
                format!("{}{}{}\r\n", first.code, sep, line).into_bytes()
            })
            .collect();
        let (second, consumed2) = complete(&reserialized);
        assert_eq!(first.code, second.code);
        assert_eq!(first.enhanced_code, second.enhanced_code);
        assert_eq!(first.classification, second.classification);
        assert_eq!(consumed, input.len());
        assert_eq!(consumed2, reserialized.len());
    }
}
