//! SRT (SubRip) subtitle format writer and preview parser.

use super::timestamp::format_srt_time;
#[cfg(test)]
use super::timestamp::parse_timestamp;
use super::Cue;
use log::debug;
use serde::Serialize;

/// Render cues as an SRT document. Every block, the last included, ends with a blank line.
pub fn serialize_srt(cues: &[Cue]) -> String {
    let mut out = String::new();
    for cue in cues {
        out.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            cue.index,
            format_srt_time(cue.start),
            format_srt_time(cue.end),
            cue.text
        ));
    }
    out
}

/// One block read back from an SRT document, as shown in API previews.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedCue {
    pub index: String,
    pub time_range: String,
    pub start: String,
    pub end: String,
    pub text: String,
}

#[cfg(test)]
impl ParsedCue {
    /// Convert back to a [`Cue`]. `None` when the index or either timestamp does not parse.
    pub fn to_cue(&self) -> Option<Cue> {
        Some(Cue {
            index: self.index.trim().parse().ok()?,
            start: parse_timestamp(&self.start)?,
            end: parse_timestamp(&self.end)?,
            text: self.text.clone(),
        })
    }
}

fn blocks(text: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();
    for line in text.lines() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

/// Parse an SRT document into preview entries.
///
/// Blocks with fewer than three lines are skipped rather than failing the parse.
pub fn parse_srt(text: &str) -> Vec<ParsedCue> {
    blocks(text)
        .into_iter()
        .filter_map(|block| {
            if block.len() < 3 {
                debug!("[srt] skipping malformed block: {:?}", block);
                return None;
            }
            let time_range = block[1].trim().to_string();
            let (start, end) = match time_range.split_once(" --> ") {
                Some((start, end)) => (start.trim().to_string(), end.trim().to_string()),
                None => (time_range.clone(), String::new()),
            };
            let text = block[2..]
                .iter()
                .map(|l| l.trim())
                .collect::<Vec<_>>()
                .join(" ");
            Some(ParsedCue {
                index: block[0].trim().to_string(),
                time_range,
                start,
                end,
                text,
            })
        })
        .collect()
}

/// First `limit` entries of [`parse_srt`].
pub fn preview(text: &str, limit: usize) -> Vec<ParsedCue> {
    let mut cues = parse_srt(text);
    cues.truncate(limit);
    cues
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cue(index: u32, start: f64, end: f64, text: &str) -> Cue {
        Cue {
            index,
            start,
            end,
            text: text.to_string(),
        }
    }

    #[test]
    fn writes_three_line_blocks_with_trailing_blank() {
        let out = serialize_srt(&[
            cue(1, 0.0, 30.0 / 11.0, "alpha beta"),
            cue(2, 30.0 / 11.0, 3.0, "lambda"),
        ]);
        assert_eq!(
            out,
            "1\n00:00:00,000 --> 00:00:02,727\nalpha beta\n\n\
             2\n00:00:02,727 --> 00:00:03,000\nlambda\n\n"
        );
        assert!(out.ends_with("lambda\n\n"));
        assert!(!out.ends_with("\n\n\n"));
    }

    #[test]
    fn malformed_block_between_good_ones_is_dropped() {
        let input = "1\n00:00:00,000 --> 00:00:01,000\nfirst\n\n\
                     2\n00:00:01,000 --> 00:00:02,000\n\n\
                     3\n00:00:02,000 --> 00:00:03,000\nthird\n\n";
        let parsed = parse_srt(input);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].index, "1");
        assert_eq!(parsed[0].text, "first");
        assert_eq!(parsed[1].index, "3");
        assert_eq!(parsed[1].start, "00:00:02,000");
        assert_eq!(parsed[1].text, "third");
    }

    #[test]
    fn multi_line_text_is_joined_with_spaces() {
        let input = "7\r\n00:01:00,000 --> 00:01:02,500\r\nline one\r\nline two\r\n\r\n";
        let parsed = parse_srt(input);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].time_range, "00:01:00,000 --> 00:01:02,500");
        assert_eq!(parsed[0].end, "00:01:02,500");
        assert_eq!(parsed[0].text, "line one line two");
    }

    #[test]
    fn missing_arrow_is_tolerated() {
        let parsed = parse_srt("1\nnonsense\nstill text\n");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].start, "nonsense");
        assert_eq!(parsed[0].end, "");
        assert!(parsed[0].to_cue().is_none());
    }

    #[test]
    fn serialize_parse_serialize_is_stable() {
        let cues = vec![
            cue(1, 0.0, 1.234, "hello world"),
            cue(2, 1.234, 4.5, "second cue here"),
            cue(3, 3661.001, 3662.0, "an hour in"),
        ];
        let first = serialize_srt(&cues);
        let reparsed: Vec<Cue> = parse_srt(&first)
            .iter()
            .filter_map(ParsedCue::to_cue)
            .collect();
        assert_eq!(reparsed.len(), 3);
        assert_eq!(serialize_srt(&reparsed), first);
    }

    #[test]
    fn preview_is_capped() {
        let cues: Vec<Cue> = (1..=120)
            .map(|i| cue(i, i as f64, i as f64 + 0.5, "word"))
            .collect();
        let text = serialize_srt(&cues);
        let shown = preview(&text, 50);
        assert_eq!(shown.len(), 50);
        assert_eq!(shown[49].index, "50");
        assert_eq!(preview("", 50), Vec::new());
    }
}
