use crate::error::{CoreError, Result};
use crate::timeline::{LyricLine, LyricTimeline};
use std::time::Duration;

/// LRC metadata from ID tags
#[derive(Debug, Clone, Default)]
pub struct LrcMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub author: Option<String>,
    pub offset: i64, // milliseconds, can be negative
}

/// Parsed LRC document
#[derive(Debug, Clone, Default)]
pub struct LrcFile {
    pub metadata: LrcMetadata,
    pub timeline: LyricTimeline,
}

impl LrcFile {
    /// Parse an LRC string.
    ///
    /// Blank lines, unknown tags and lines without a timestamp are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::LrcParseError`] if the input has content but not a
    /// single timed line could be read from it.
    pub fn parse(input: &str) -> Result<Self> {
        let mut metadata = LrcMetadata::default();
        let mut lines = Vec::new();
        let mut saw_content = false;
        let mut saw_tag = false;

        for line in input.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            saw_content = true;

            if let Some((tag, value)) = parse_id_tag(line) {
                saw_tag = true;
                match tag.to_lowercase().as_str() {
                    "ti" => metadata.title = Some(value),
                    "ar" => metadata.artist = Some(value),
                    "al" => metadata.album = Some(value),
                    "au" | "by" => metadata.author = Some(value),
                    "offset" => {
                        if let Ok(offset) = value.parse::<i64>() {
                            metadata.offset = offset;
                        }
                    }
                    _ => {}
                }
                continue;
            }

            if let Some(parsed) = parse_lyric_line(line) {
                lines.extend(parsed);
            }
        }

        if saw_content && !saw_tag && lines.is_empty() {
            return Err(CoreError::LrcParseError {
                reason: "no timed lines found".into(),
            });
        }

        if metadata.offset != 0 {
            for line in &mut lines {
                line.time = apply_offset(line.time, metadata.offset);
            }
        }

        Ok(Self {
            metadata,
            timeline: LyricTimeline::new(lines),
        })
    }
}

/// Parse an ID tag like [ti:Title] or [ar:Artist]
fn parse_id_tag(line: &str) -> Option<(String, String)> {
    if !line.starts_with('[') || !line.contains(':') {
        return None;
    }

    let end = line.find(']')?;
    let content = &line[1..end];

    let first_colon = content.find(':')?;
    let tag = &content[..first_colon];

    // A numeric tag is a timestamp, not an ID tag
    if tag.is_empty() || tag.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let value = content[first_colon + 1..].trim().to_string();
    Some((tag.to_string(), value))
}

/// Parse a lyric line like [00:12.34]Hello or [00:12.34][00:15.67]Same lyrics
fn parse_lyric_line(line: &str) -> Option<Vec<LyricLine>> {
    let mut remaining = line;
    let mut timestamps = Vec::new();

    while remaining.starts_with('[') {
        let Some(end) = remaining.find(']') else {
            break;
        };
        match parse_timestamp(&remaining[1..end]) {
            Some(time) => {
                timestamps.push(time);
                remaining = &remaining[end + 1..];
            }
            None => break,
        }
    }

    if timestamps.is_empty() {
        return None;
    }

    let text = remaining.trim();
    Some(
        timestamps
            .into_iter()
            .map(|time| LyricLine::new(time, text))
            .collect(),
    )
}

/// Parse a timestamp string like "00:12.34", "00:12:34" or "00:12".
///
/// Values that do not fit in a [`Duration`] are rejected.
fn parse_timestamp(s: &str) -> Option<Duration> {
    let parts: Vec<&str> = s.trim().split(':').collect();

    match parts.as_slice() {
        [minutes, seconds] => {
            let minutes: u64 = minutes.parse().ok()?;
            let seconds: f64 = seconds.parse().ok()?;
            if !seconds.is_finite() || seconds < 0.0 {
                return None;
            }
            let whole = Duration::from_secs(minutes.checked_mul(60)?);
            whole.checked_add(Duration::try_from_secs_f64(seconds).ok()?)
        }
        [minutes, seconds, hundredths] => {
            let minutes: u64 = minutes.parse().ok()?;
            let seconds: u64 = seconds.parse().ok()?;
            let hundredths: u64 = hundredths.parse().ok()?;
            let millis = minutes
                .checked_mul(60_000)?
                .checked_add(seconds.checked_mul(1000)?)?
                .checked_add(hundredths.checked_mul(10)?)?;
            Some(Duration::from_millis(millis))
        }
        _ => None,
    }
}

/// Apply a millisecond offset to a duration (can be negative)
fn apply_offset(duration: Duration, offset_ms: i64) -> Duration {
    let magnitude = Duration::from_millis(offset_ms.unsigned_abs());
    if offset_ms >= 0 {
        duration.saturating_add(magnitude)
    } else {
        duration.saturating_sub(magnitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_lrc() {
        let result = LrcFile::parse("[00:12.34]Hello world").unwrap();
        assert_eq!(result.timeline.len(), 1);
        let line = result.timeline.get(0).unwrap();
        assert_eq!(line.time, Duration::from_millis(12340));
        assert_eq!(line.text, "Hello world");
    }

    #[test]
    fn test_parse_id_tags() {
        let input = r"
[ti:Song Title]
[ar:Artist Name]
[al:Album Name]
[by:Someone]
[00:05.00]Lyrics here
";
        let result = LrcFile::parse(input).unwrap();
        assert_eq!(result.metadata.title.as_deref(), Some("Song Title"));
        assert_eq!(result.metadata.artist.as_deref(), Some("Artist Name"));
        assert_eq!(result.metadata.album.as_deref(), Some("Album Name"));
        assert_eq!(result.metadata.author.as_deref(), Some("Someone"));
    }

    #[test]
    fn test_parse_offsets() {
        let result = LrcFile::parse("[offset:500]\n[00:10.00]Test").unwrap();
        assert_eq!(result.timeline.get(0).unwrap().time, Duration::from_millis(10500));

        let result = LrcFile::parse("[offset:-500]\n[00:10.00]Test").unwrap();
        assert_eq!(result.timeline.get(0).unwrap().time, Duration::from_millis(9500));
    }

    #[test]
    fn test_parse_multi_timestamp_line_is_sorted() {
        let input = "[00:15.00][00:05.00]Chorus\n[00:10.00]Verse";
        let result = LrcFile::parse(input).unwrap();
        let texts: Vec<_> = result.timeline.lines().iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, ["Chorus", "Verse", "Chorus"]);
    }

    #[test]
    fn test_alternative_timestamp_format() {
        let result = LrcFile::parse("[00:12:34]Hello world").unwrap();
        assert_eq!(result.timeline.get(0).unwrap().time, Duration::from_millis(12340));
    }

    #[test]
    fn test_parse_cjk_lyrics() {
        let result = LrcFile::parse("[00:05.00]你好世界").unwrap();
        assert_eq!(result.timeline.get(0).unwrap().text, "你好世界");
    }

    #[test]
    fn test_empty_input_is_empty_timeline() {
        let result = LrcFile::parse("\n\n").unwrap();
        assert!(result.timeline.is_empty());
    }

    #[test]
    fn test_garbage_input_is_error() {
        assert!(matches!(
            LrcFile::parse("this is not lrc"),
            Err(CoreError::LrcParseError { .. })
        ));
    }

    #[test]
    fn test_out_of_range_timestamps_are_skipped() {
        for input in [
            "[00:1e300]boom",
            "[307445734561825861:00.00]boom",
            "[307445734561825861:00:00]boom",
        ] {
            assert!(matches!(LrcFile::parse(input), Err(CoreError::LrcParseError { .. })));
        }
        assert_eq!(parse_timestamp("00:1e300"), None);
        assert_eq!(parse_timestamp("307445734561825861:00.00"), None);
    }

    #[test]
    fn test_out_of_range_line_does_not_drop_the_rest() {
        let result = LrcFile::parse("[00:1e300]boom\n[00:03.00]fine").unwrap();
        assert_eq!(result.timeline.len(), 1);
        assert_eq!(result.timeline.get(0).unwrap().text, "fine");
    }

    #[test]
    fn test_large_offset_saturates() {
        let result = LrcFile::parse(&format!("[offset:{}]\n[00:10.00]Test", i64::MAX)).unwrap();
        assert!(result.timeline.get(0).unwrap().time > Duration::from_secs(10));
    }
}
