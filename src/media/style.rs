//! Burn-in style: font size and colour, rendered as an ASS `force_style`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleStyle {
    pub font_size: u32,
    pub font_color: String,
}

impl Default for SubtitleStyle {
    fn default() -> Self {
        Self {
            font_size: 24,
            font_color: "white".to_string(),
        }
    }
}

impl SubtitleStyle {
    /// `force_style` argument for ffmpeg's subtitles filter.
    pub fn force_style(&self) -> Result<String, String> {
        Ok(format!(
            "Fontsize={},PrimaryColour={}",
            self.font_size,
            ass_colour(&self.font_color)?
        ))
    }
}

/// Convert a colour name or `#RRGGBB` into ASS `&H00BBGGRR` notation.
pub fn ass_colour(color: &str) -> Result<String, String> {
    let color = color.trim();
    let hex = match color.to_ascii_lowercase().as_str() {
        "white" => "FFFFFF".to_string(),
        "black" => "000000".to_string(),
        "yellow" => "FFFF00".to_string(),
        "red" => "FF0000".to_string(),
        "green" => "00FF00".to_string(),
        "blue" => "0000FF".to_string(),
        "cyan" => "00FFFF".to_string(),
        "magenta" => "FF00FF".to_string(),
        _ => {
            let digits = color.strip_prefix('#').unwrap_or(color);
            if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(format!("Unsupported font color: {}", color));
            }
            digits.to_ascii_uppercase()
        }
    };
    let (r, g, b) = (&hex[0..2], &hex[2..4], &hex[4..6]);
    Ok(format!("&H00{}{}{}", b, g, r))
}
