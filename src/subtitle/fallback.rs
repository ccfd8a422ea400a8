//! Placeholder cues so a subtitle document is never empty.

use super::Cue;
use crate::transcription::TranscriptionError;

pub const NO_SPEECH_TEXT: &str = "No speech detected in video";

/// Length of a placeholder cue in seconds.
pub const FALLBACK_CUE_SECONDS: f64 = 5.0;

fn placeholder(text: String) -> Vec<Cue> {
    vec![Cue {
        index: 1,
        start: 0.0,
        end: FALLBACK_CUE_SECONDS,
        text,
    }]
}

/// Pick the cues that actually get written.
///
/// A transcription failure wins over everything else; an empty result becomes
/// the no-speech notice; otherwise the cues pass through untouched.
pub fn resolve(cues: Vec<Cue>, failure: Option<&TranscriptionError>) -> Vec<Cue> {
    if let Some(err) = failure {
        // may carry a raw response body; cue text stays on one line
        let message = err.message().split_whitespace().collect::<Vec<_>>().join(" ");
        return placeholder(format!("Error generating captions: {}", message));
    }
    if cues.is_empty() {
        return placeholder(NO_SPEECH_TEXT.to_string());
    }
    cues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subtitle::{parse_srt, serialize_srt};

    #[test]
    fn empty_cues_become_no_speech_notice() {
        let cues = resolve(Vec::new(), None);
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].text, NO_SPEECH_TEXT);
        assert_eq!(
            serialize_srt(&cues),
            "1\n00:00:00,000 --> 00:00:05,000\nNo speech detected in video\n\n"
        );
    }

    #[test]
    fn failure_replaces_whatever_was_produced() {
        let err = TranscriptionError::Unavailable("whisper-cli not found".into());
        let some = vec![Cue {
            index: 1,
            start: 0.0,
            end: 1.0,
            text: "ignored".into(),
        }];
        let cues = resolve(some, Some(&err));
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].index, 1);
        assert_eq!(cues[0].end, 5.0);
        assert_eq!(
            cues[0].text,
            "Error generating captions: whisper-cli not found"
        );
    }

    #[test]
    fn multi_line_failure_message_stays_one_srt_block() {
        let err = TranscriptionError::Unavailable(
            "API error 502 Bad Gateway: <html>\n\n<body>bad gateway</body>\r\n".into(),
        );
        let cues = resolve(Vec::new(), Some(&err));
        assert_eq!(
            cues[0].text,
            "Error generating captions: API error 502 Bad Gateway: <html> <body>bad gateway</body>"
        );

        let parsed = parse_srt(&serialize_srt(&cues));
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].text, cues[0].text);
    }

    #[test]
    fn real_cues_pass_through() {
        let cues = vec![
            Cue { index: 1, start: 0.5, end: 1.5, text: "hello".into() },
            Cue { index: 2, start: 1.5, end: 2.0, text: "there".into() },
        ];
        assert_eq!(resolve(cues.clone(), None), cues);
    }
}
