//! Split utterances into word-bounded cues with proportional timing.
//!
//! Each utterance's time span is divided among its cues by word-count share,
//! not by a fixed per-word duration. Source timing is coarse, so this is as
//! precise as the input allows.

use super::Cue;
use crate::transcription::Utterance;

/// Tuning for [`segment`].
#[derive(Debug, Clone, Copy)]
pub struct SegmentOptions {
    /// Maximum words per cue. Zero is treated as one.
    pub words_per_cue: usize,
    /// Duration given to a cue whose interval collapsed to nothing.
    pub min_cue_duration: f64,
    /// Total media length; collapsed cues are never stretched past it.
    pub media_duration: Option<f64>,
}

impl Default for SegmentOptions {
    fn default() -> Self {
        Self {
            words_per_cue: 10,
            min_cue_duration: 0.1,
            media_duration: None,
        }
    }
}

fn same_millisecond(a: f64, b: f64) -> bool {
    (a * 1000.0).round() == (b * 1000.0).round()
}

/// Turn recognizer utterances into indexed cues.
///
/// Utterances with blank text are skipped. Indices run 1..=n across all
/// utterances in start order. A cue never starts before the previous one ends,
/// so a stretched cue pushes the ones after it forward.
pub fn segment(utterances: &[Utterance], options: &SegmentOptions) -> Vec<Cue> {
    let words_per_cue = options.words_per_cue.max(1);
    let min_cue_duration = options.min_cue_duration.max(0.001);

    let mut kept: Vec<&Utterance> = utterances
        .iter()
        .filter(|u| !u.text.trim().is_empty())
        .collect();
    // Stable: sources that already emit in order keep their order.
    kept.sort_by(|a, b| a.start.total_cmp(&b.start));

    let mut cues = Vec::new();
    let mut prev_end = 0.0f64;
    for (pos, utterance) in kept.iter().enumerate() {
        let words: Vec<&str> = utterance.text.split_whitespace().collect();
        let total = words.len();
        if total == 0 {
            continue;
        }

        let start = utterance.start.max(0.0);
        let end = utterance.end.max(start);
        let duration = end - start;
        let at_word = |word: usize| start + (word as f64 / total as f64) * duration;

        let next_utterance = kept.get(pos + 1).map_or(f64::INFINITY, |next| next.start);
        let media_end = options.media_duration.unwrap_or(f64::INFINITY);

        for (batch_idx, batch) in words.chunks(words_per_cue).enumerate() {
            let first_word = batch_idx * words_per_cue;
            let past_last = first_word + batch.len();
            let batch_start = at_word(first_word).max(prev_end);
            let mut batch_end = at_word(past_last).min(end).max(batch_start);

            if same_millisecond(batch_start, batch_end) {
                // Upper bound for the stretch: whatever comes next, then the media end.
                let following = if past_last < total {
                    at_word(past_last)
                } else {
                    next_utterance
                };
                let limit = following.min(media_end);
                batch_end = batch_start + min_cue_duration;
                if limit > batch_start && !same_millisecond(batch_start, limit) {
                    batch_end = batch_end.min(limit);
                }
            }

            prev_end = batch_end;
            cues.push(Cue {
                index: cues.len() as u32 + 1,
                start: batch_start,
                end: batch_end,
                text: batch.join(" "),
            });
        }
    }

    cues
}
