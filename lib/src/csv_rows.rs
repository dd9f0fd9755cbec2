//! CSV row shapes and sentinel rules for both output files (spec §6).

use serde::Serialize;

pub const SYSTEM_HEADER: [&str; 3] = ["Text", "CharaId", "AudioFilePath"];
pub const STORY_HEADER: [&str; 11] = [
    "StoryId",
    "BlockIndex",
    "CharaId",
    "SpeakerName",
    "Text",
    "RubyText",
    "VoiceSheetId",
    "CueId",
    "AudioFilePath",
    "AudioLength",
    "CharacterPerSecond",
];

#[derive(Debug, Serialize)]
pub struct SystemVoiceRow {
    #[serde(rename = "Text")]
    pub text: String,
    #[serde(rename = "CharaId")]
    pub chara_id: i64,
    #[serde(rename = "AudioFilePath")]
    pub audio_file_path: String,
}

#[derive(Debug, Serialize)]
pub struct StoryRow {
    #[serde(rename = "StoryId")]
    pub story_id: String,
    #[serde(rename = "BlockIndex")]
    pub block_index: i64,
    #[serde(rename = "CharaId")]
    pub chara_id: i64,
    #[serde(rename = "SpeakerName")]
    pub speaker_name: String,
    #[serde(rename = "Text")]
    pub text: String,
    #[serde(rename = "RubyText")]
    pub ruby_text: String,
    #[serde(rename = "VoiceSheetId")]
    pub voice_sheet_id: String,
    #[serde(rename = "CueId")]
    pub cue_id: i64,
    #[serde(rename = "AudioFilePath")]
    pub audio_file_path: String,
    #[serde(rename = "AudioLength")]
    pub audio_length: f64,
    #[serde(rename = "CharacterPerSecond")]
    pub character_per_second: f64,
}

/// `AudioFilePath`/`AudioLength` sentinel handling for a resolved extraction
/// result: `audio_file_path` is `None` when no audio was targeted at all
/// (distinct from a targeted-but-failed extraction).
pub fn audio_file_path(result: Option<&Option<std::path::PathBuf>>) -> String {
    match result {
        None => String::new(),
        Some(None) => "FAILED".to_owned(),
        Some(Some(path)) => path.display().to_string(),
    }
}

/// `AudioLength`, rounded to 4 decimals, when a path was resolved (even a
/// zero-length one — a measurement failure still wrote the file), or `-1.0`
/// when no audio was targeted at all.
pub fn audio_length(duration: Option<f64>) -> f64 {
    match duration {
        Some(seconds) => round_to(seconds, 4),
        None => -1.0,
    }
}

/// `CharacterPerSecond = round(len(Text)/AudioLength, 2)` when `AudioLength >
/// 0` and `Text` non-empty; else `-1.0` (spec §6).
pub fn characters_per_second(text: &str, audio_length: f64) -> f64 {
    if audio_length > 0.0 && !text.is_empty() {
        round_to(text.chars().count() as f64 / audio_length, 2)
    } else {
        -1.0
    }
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cps_matches_worked_example() {
        assert_eq!(characters_per_second("hello", 2.0), 2.5);
    }

    #[test]
    fn cps_sentinel_when_no_audio() {
        assert_eq!(characters_per_second("hello", -1.0), -1.0);
        assert_eq!(characters_per_second("", 2.0), -1.0);
    }

    #[test]
    fn audio_length_sentinel_and_rounding() {
        assert_eq!(audio_length(None), -1.0);
        // A resolved path with a zero-length measurement is still a
        // successful extraction, not "no audio was targeted".
        assert_eq!(audio_length(Some(0.0)), 0.0);
        assert_eq!(audio_length(Some(1.23456)), 1.2346);
    }

    #[test]
    fn audio_file_path_distinguishes_untargeted_from_failed() {
        assert_eq!(audio_file_path(None), "");
        assert_eq!(audio_file_path(Some(&None)), "FAILED");
        assert_eq!(
            audio_file_path(Some(&Some(std::path::PathBuf::from("/x.wav")))),
            "/x.wav"
        );
    }
}
