//! Parser for ffmpeg `silencedetect` filter output
//!
//! ffmpeg reports silence on stderr as lines such as:
//!
//! ```text
//! [silencedetect @ 0x600] silence_start: 1.234
//! [silencedetect @ 0x600] silence_end: 2.5 | silence_duration: 1.266
//! ```

use crate::interval::SilenceInterval;

const START_MARKER: &str = "silence_start: ";
const END_MARKER: &str = "silence_end: ";

/// Parse a `silencedetect` log into ordered silence intervals
///
/// An end marker closes the most recent interval only if it is still open.
/// A start without a matching end stays open (silence ran to end of stream).
pub fn parse_silencedetect_log(log: &str) -> Vec<SilenceInterval> {
    let mut intervals: Vec<SilenceInterval> = Vec::new();

    for line in log.lines() {
        if let Some(value) = value_after(line, START_MARKER) {
            match value {
                Some(start) => intervals.push(SilenceInterval::open(start)),
                None => tracing::warn!("Unparseable silence_start line: {}", line.trim()),
            }
        } else if let Some(value) = value_after(line, END_MARKER) {
            let Some(end) = value else {
                tracing::warn!("Unparseable silence_end line: {}", line.trim());
                continue;
            };
            if let Some(last) = intervals.last_mut() {
                if last.end_secs.is_none() {
                    last.end_secs = Some(end);
                }
            }
        }
    }

    intervals
}

/// Find `marker` in `line` and parse the first token after it
///
/// Outer `None` means the marker is absent; inner `None` means it is present
/// but not followed by a number.
fn value_after(line: &str, marker: &str) -> Option<Option<f64>> {
    let (_, rest) = line.split_once(marker)?;
    Some(
        rest.split_whitespace()
            .next()
            .and_then(|token| token.parse::<f64>().ok()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pairs() {
        let log = "\
Input #0, mp3, from 'voiceover.mp3':
[silencedetect @ 0x55d1] silence_start: 1.5
[silencedetect @ 0x55d1] silence_end: 2.75 | silence_duration: 1.25
[silencedetect @ 0x55d1] silence_start: 6
[silencedetect @ 0x55d1] silence_end: 7.125 | silence_duration: 1.125
size=N/A time=00:00:10.00 bitrate=N/A speed= 900x";

        let intervals = parse_silencedetect_log(log);
        assert_eq!(
            intervals,
            vec![
                SilenceInterval::new(1.5, 2.75),
                SilenceInterval::new(6.0, 7.125),
            ]
        );
    }

    #[test]
    fn test_unterminated_start_stays_open() {
        let log = "[silencedetect @ 0x1] silence_start: 8.2\n";
        let intervals = parse_silencedetect_log(log);
        assert_eq!(intervals, vec![SilenceInterval::open(8.2)]);
    }

    #[test]
    fn test_orphan_end_ignored() {
        let log = "\
[silencedetect @ 0x1] silence_end: 0.4 | silence_duration: 0.4
[silencedetect @ 0x1] silence_start: 1
[silencedetect @ 0x1] silence_end: 2 | silence_duration: 1
[silencedetect @ 0x1] silence_end: 3 | silence_duration: 1";

        let intervals = parse_silencedetect_log(log);
        assert_eq!(intervals, vec![SilenceInterval::new(1.0, 2.0)]);
    }

    #[test]
    fn test_garbage_values_skipped() {
        let log = "\
[silencedetect @ 0x1] silence_start: abc
[silencedetect @ 0x1] silence_start: 2.0
[silencedetect @ 0x1] silence_end: nan? | silence_duration: 0";

        let intervals = parse_silencedetect_log(log);
        assert_eq!(intervals, vec![SilenceInterval::open(2.0)]);
    }

    #[test]
    fn test_empty_log() {
        assert!(parse_silencedetect_log("").is_empty());
    }
}
