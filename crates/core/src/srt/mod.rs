//! This module is responsible for SRT parsing and formatting.
//! Timing and indices are carried through untouched so a parse/format cycle
//! only ever changes caption text.

use crate::error::{Error, Result};
use tracing::trace;

/// A single caption block: index, time range and its text lines joined by `\n`.
#[derive(Debug, Clone, PartialEq)]
pub struct Caption {
    pub index: u32,
    pub start_ms: u64,
    pub end_ms: u64,
    pub content: String,
}

/// Parse SRT text into captions, preserving their order.
/// Blank lines between blocks are skipped, CRLF input is accepted.
pub fn parse(input: &str) -> Result<Vec<Caption>> {
    trace!("parse len={}", input.len());
    let mut captions = Vec::new();
    let mut lines = input.lines().enumerate().map(|(n, l)| (n + 1, l));
    loop {
        let (line_no, index_line) = match lines.next() {
            Some((_, l)) if l.trim().is_empty() => continue,
            Some((n, l)) => (n, l.trim().trim_start_matches('\u{feff}')),
            None => break,
        };
        let index: u32 = index_line.parse().map_err(|_| Error::Parse {
            line: line_no,
            message: format!("expected a caption index, found {index_line:?}"),
        })?;
        let (time_no, time_line) = lines.next().ok_or_else(|| Error::Parse {
            line: line_no + 1,
            message: format!("caption {index} has no time range"),
        })?;
        let (start_ms, end_ms) =
            parse_times(time_line).map_err(|message| Error::Parse { line: time_no, message })?;
        let mut content = Vec::new();
        for (_, line) in lines.by_ref() {
            if line.trim().is_empty() {
                break;
            }
            content.push(line);
        }
        captions.push(Caption {
            index,
            start_ms,
            end_ms,
            content: content.join("\n"),
        });
    }
    Ok(captions)
}

/// Format captions back to SRT text.
/// Each block is written as stored; indices are never renumbered.
pub fn format(captions: &[Caption]) -> String {
    let mut out = String::new();
    for caption in captions {
        out.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            caption.index,
            format_time(caption.start_ms),
            format_time(caption.end_ms),
            caption.content
        ));
    }
    out
}

/// Parse a time range like `00:00:01,000 --> 00:00:02,000` to milliseconds.
/// Anything after the end time (display coordinates) is ignored.
fn parse_times(line: &str) -> std::result::Result<(u64, u64), String> {
    let (start, rest) = line
        .split_once("-->")
        .ok_or_else(|| format!("expected a time range, found {line:?}"))?;
    let end = rest
        .split_whitespace()
        .next()
        .ok_or_else(|| format!("time range {line:?} has no end"))?;
    Ok((parse_time(start.trim())?, parse_time(end)?))
}

/// Parse `HH:MM:SS,mmm` (or `HH:MM:SS.mmm`) into milliseconds.
fn parse_time(t: &str) -> std::result::Result<u64, String> {
    let bad = || format!("bad timestamp {t:?}");
    let parts: Vec<&str> = t.split([':', ',', '.']).collect();
    if parts.len() != 4 || parts[3].is_empty() || parts[3].len() > 3 {
        return Err(bad());
    }
    let field = |s: &str| s.parse::<u64>().map_err(|_| bad());
    let h = field(parts[0])?;
    let m = field(parts[1])?;
    let s = field(parts[2])?;
    // "1,5" means 500 ms, not 5 ms.
    let ms = field(parts[3])? * 10u64.pow(3 - parts[3].len() as u32);
    if m >= 60 || s >= 60 {
        return Err(bad());
    }
    h.checked_mul(3_600_000)
        .and_then(|total| total.checked_add((m * 60 + s) * 1000 + ms))
        .ok_or_else(bad)
}

/// Format milliseconds back to `HH:MM:SS,mmm`.
fn format_time(ms: u64) -> String {
    let h = ms / 3_600_000;
    let m = (ms % 3_600_000) / 60_000;
    let s = (ms % 60_000) / 1000;
    let ms = ms % 1000;
    format!("{h:02}:{m:02}:{s:02},{ms:03}")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "1\n00:00:01,000 --> 00:00:02,500\nHello\n\n\
                          2\n00:00:03,000 --> 00:00:05,250\nThis is a long\nsentence wrapped\n\n\
                          7\n01:02:03,004 --> 01:02:04,000\n-Hi\n-Bye\n\n";

    #[test]
    fn roundtrip_srt() {
        let captions = parse(SAMPLE).unwrap();
        assert_eq!(captions.len(), 3);
        assert_eq!(captions[1].content, "This is a long\nsentence wrapped");
        assert_eq!(format(&captions), SAMPLE);
    }

    #[test]
    fn keeps_indices_and_timestamps_in_order() {
        let captions = parse(SAMPLE).unwrap();
        let reparsed = parse(&format(&captions)).unwrap();
        let timing = |c: &Caption| (c.index, c.start_ms, c.end_ms);
        assert_eq!(
            captions.iter().map(timing).collect::<Vec<_>>(),
            reparsed.iter().map(timing).collect::<Vec<_>>()
        );
        assert_eq!(timing(&captions[2]), (7, 3_723_004, 3_724_000));
    }

    #[test]
    fn accepts_crlf_and_extra_blank_lines() {
        let input = "\r\n\r\n1\r\n00:00:00,000 --> 00:00:01,000\r\nA\r\nB\r\n\r\n\r\n\
                     2\r\n00:00:01.000 --> 00:00:02.000 X1:10 X2:20\r\nC\r\n";
        let captions = parse(input).unwrap();
        assert_eq!(captions.len(), 2);
        assert_eq!(captions[0].content, "A\nB");
        assert_eq!(captions[1].end_ms, 2000);
    }

    #[test]
    fn reports_line_of_bad_index() {
        let err = parse("1\n00:00:00,000 --> 00:00:01,000\nA\n\nnope\n").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 5, .. }));
    }

    #[test]
    fn rejects_bad_timestamp() {
        let err = parse("1\n00:00:00 --> 00:00:01,000\nA\n").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, .. }));
        assert!(parse("1\n00:61:00,000 --> 00:00:01,000\nA\n").is_err());
        assert!(parse("1\n").is_err());
        let err = parse("1\n99999999999999:00:00,000 --> 00:00:01,000\nA\n").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, .. }));
    }

    #[test]
    fn pads_short_milliseconds() {
        let captions = parse("1\n00:00:01,5 --> 00:00:02,25\nA\n").unwrap();
        assert_eq!((captions[0].start_ms, captions[0].end_ms), (1500, 2250));
    }
}
