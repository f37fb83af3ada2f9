//! Lyric payload decoding.
//!
//! With `nobase64=1` the lyric endpoint returns LRC text with most
//! punctuation escaped as HTML character references (`&#58;` for `:` and so
//! on), so the text has to be unescaped before it can be parsed as LRC.

use cadenza_core::{CoreError, LrcFile, LyricTimeline};
use tracing::debug;

/// Replace numeric (`&#58;`, `&#x3A;`) and the common named character
/// references. Unknown or malformed references are kept verbatim.
#[must_use]
pub fn decode_entities(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];

        let decoded = tail
            .find(';')
            .filter(|&end| end <= 10)
            .and_then(|end| decode_reference(&tail[1..end]).map(|c| (c, end)));

        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_reference(name: &str) -> Option<char> {
    if let Some(numeric) = name.strip_prefix('#') {
        let code = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => numeric.parse().ok()?,
        };
        return char::from_u32(code);
    }

    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => None,
    }
}

/// Turn an escaped lyric payload into a timeline.
///
/// # Errors
///
/// Returns [`CoreError::LyricsNotFound`] for an empty payload or one without
/// any timed line, and [`CoreError::LrcParseError`] for text that is not LRC.
pub fn parse_lyric_payload(track_id: &str, payload: &str) -> Result<LyricTimeline, CoreError> {
    let text = decode_entities(payload);
    if text.trim().is_empty() {
        return Err(CoreError::LyricsNotFound {
            track_id: track_id.to_string(),
        });
    }

    let lrc = LrcFile::parse(&text)?;
    if lrc.timeline.is_empty() {
        debug!("Lyric payload for {} has no timed lines", track_id);
        return Err(CoreError::LyricsNotFound {
            track_id: track_id.to_string(),
        });
    }
    Ok(lrc.timeline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_decode_numeric_references() {
        assert_eq!(
            decode_entities("&#91;00&#58;01&#46;50&#93;Hello&#32;world&#10;"),
            "[00:01.50]Hello world\n"
        );
        assert_eq!(decode_entities("&#x5B;&#X5d;"), "[]");
    }

    #[test]
    fn test_decode_named_references() {
        assert_eq!(decode_entities("Tom &amp; Jerry &lt;3"), "Tom & Jerry <3");
    }

    #[test]
    fn test_decode_keeps_unknown_references() {
        assert_eq!(decode_entities("A & B"), "A & B");
        assert_eq!(decode_entities("&bogus; &#xZZ;"), "&bogus; &#xZZ;");
        assert_eq!(decode_entities("trailing &"), "trailing &");
    }

    #[test]
    fn test_parse_escaped_payload() {
        let payload = "&#91;ti&#58;Song&#93;&#10;&#91;00&#58;01&#46;00&#93;first&#10;&#91;00&#58;04&#46;00&#93;second";
        let timeline = parse_lyric_payload("003mid", payload).unwrap();

        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline.lines()[0].time, Duration::from_secs(1));
        assert_eq!(timeline.lines()[1].text, "second");
    }

    #[test]
    fn test_empty_payload_is_not_found() {
        assert!(matches!(
            parse_lyric_payload("003mid", "  "),
            Err(CoreError::LyricsNotFound { track_id }) if track_id == "003mid"
        ));
        assert!(matches!(
            parse_lyric_payload("003mid", "&#91;ti&#58;Song&#93;"),
            Err(CoreError::LyricsNotFound { .. })
        ));
    }
}
