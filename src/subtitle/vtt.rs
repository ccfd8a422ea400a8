//! VTT (WebVTT) subtitle format writer.

use super::timestamp::format_vtt_time;
use super::Cue;

pub fn serialize_vtt(cues: &[Cue]) -> String {
    let mut out = String::from("WEBVTT\n\n");
    for cue in cues {
        out.push_str(&format!(
            "{} --> {}\n{}\n\n",
            format_vtt_time(cue.start),
            format_vtt_time(cue.end),
            cue.text
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_then_dot_separated_blocks() {
        let cues = [Cue {
            index: 1,
            start: 1.5,
            end: 3.25,
            text: "hi".into(),
        }];
        assert_eq!(
            serialize_vtt(&cues),
            "WEBVTT\n\n00:00:01.500 --> 00:00:03.250\nhi\n\n"
        );
    }
}
