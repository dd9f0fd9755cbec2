//! Story pipeline: decrypt → parse → ruby-join → resolve voice → extract
//! audio → emit row (spec §2 data flow, §4.4-§4.7).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::audio::{AudioContainer, AudioExtractor};
use crate::blocks::{self, DialogueBlock};
use crate::cipher::Cipher;
use crate::csv_rows::{self, StoryRow};
use crate::error::UmaVoiceError;
use crate::manifest::{AssetDescriptor, SheetAudio};
use crate::object_reader::JsonObjectReader;
use crate::ruby;

/// One story's work item, as enumerated by [`crate::indexer::Indexer::story_timelines`].
#[derive(Debug, Clone)]
pub struct StoryPacket {
    pub story_id: String,
    pub timeline: AssetDescriptor,
    pub ruby: Option<AssetDescriptor>,
}

/// Decrypt and parse one story's timeline (and ruby overlay, if present)
/// into its dialogue blocks, in ascending BlockIndex order.
pub fn parse_story_blocks(
    packet: &StoryPacket,
    cipher: &Cipher,
) -> Result<Vec<DialogueBlock>, UmaVoiceError> {
    let timeline_bytes = cipher
        .decrypt_file(&packet.timeline.resolved_path, packet.timeline.encryption_key)
        .map_err(|e| e.context(format!("decrypting timeline for story {}", packet.story_id)))?;
    let timeline_objects = JsonObjectReader::parse_mono_behaviours(&timeline_bytes);
    let mut blocks = blocks::parse_blocks(&timeline_objects);

    if let Some(ruby_descriptor) = &packet.ruby {
        match cipher.decrypt_file(&ruby_descriptor.resolved_path, ruby_descriptor.encryption_key) {
            Ok(ruby_bytes) => {
                let ruby_objects = JsonObjectReader::parse_mono_behaviours(&ruby_bytes);
                ruby::join_ruby(&mut blocks, &ruby_objects);
            }
            Err(e) => {
                log::debug!("ruby decode failed for story {}: {e}", packet.story_id);
            }
        }
    }

    Ok(blocks.into_values().collect())
}

/// `<output>/story/<story_id>/<vs_id>_<cueid:03d>.wav` (spec §6).
pub fn story_wav_path(output_root: &Path, story_id: &str, vs_id: &str, cue_id: i64) -> PathBuf {
    output_root
        .join("story")
        .join(story_id)
        .join(format!("{vs_id}_{cue_id:03}.wav"))
}

/// Build the emitted CSV rows for one story's blocks, extracting audio along
/// the way. A row is emitted only for blocks with non-empty `Text` or a
/// resolved `CueId` (spec §3 "CSV row (story)").
pub fn build_story_rows<C: AudioContainer>(
    story_id: &str,
    blocks: &[DialogueBlock],
    voice_sheet_audio: &HashMap<String, SheetAudio>,
    extractor: &AudioExtractor<C>,
    output_root: &Path,
) -> Vec<StoryRow> {
    blocks
        .iter()
        .filter(|b| !b.text.is_empty() || b.cue_id != -1)
        .map(|block| {
            let targeted_sheet = if block.cue_id != -1 {
                voice_sheet_audio
                    .get(&block.voice_sheet_id)
                    .filter(|sheet| sheet.is_usable())
            } else {
                None
            };

            let (audio_file_path, audio_length) = match targeted_sheet {
                None => (csv_rows::audio_file_path(None), -1.0),
                Some(sheet) => {
                    let output_path =
                        story_wav_path(output_root, story_id, &block.voice_sheet_id, block.cue_id);
                    let (resolved, duration) = extractor.extract(
                        sheet.acb_path.as_deref().expect("usable implies acb_path"),
                        sheet.awb_path.as_deref(),
                        block.cue_id,
                        &output_path,
                    );
                    let length = if resolved.is_some() {
                        csv_rows::audio_length(Some(duration))
                    } else {
                        -1.0
                    };
                    (csv_rows::audio_file_path(Some(&resolved)), length)
                }
            };

            StoryRow {
                story_id: story_id.to_owned(),
                block_index: block.block_index,
                chara_id: block.chara_id,
                speaker_name: block.speaker_name.clone(),
                text: block.text.clone(),
                ruby_text: block.ruby_info.clone(),
                voice_sheet_id: block.voice_sheet_id.clone(),
                cue_id: block.cue_id,
                audio_file_path,
                audio_length,
                character_per_second: csv_rows::characters_per_second(&block.text, audio_length),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(index: i64, text: &str, cue_id: i64, vs_id: &str) -> DialogueBlock {
        DialogueBlock {
            block_index: index,
            speaker_name: "Speaker".into(),
            text: text.into(),
            chara_id: 1,
            voice_sheet_id: vs_id.into(),
            cue_id,
            ruby_info: String::new(),
        }
    }

    struct NoopContainer;
    impl AudioContainer for NoopContainer {
        fn open(_: &Path, _: Option<&Path>, _: &str) -> Result<Self, UmaVoiceError> {
            Ok(Self)
        }
        fn track_count(&self) -> usize {
            0
        }
        fn track_cue_id(&self, _: usize) -> Option<i64> {
            None
        }
        fn decode_track(&self, _: usize, _: &Path) -> Result<(), UmaVoiceError> {
            Err(UmaVoiceError::AudioExtract("no tracks".into()))
        }
    }

    #[test]
    fn skips_blocks_with_no_text_and_no_cue() {
        let blocks = vec![block(0, "", -1, "")];
        let extractor = AudioExtractor::<NoopContainer>::new(&test_config(), false);
        let rows =
            build_story_rows("s1", &blocks, &HashMap::new(), &extractor, Path::new("/out"));
        assert!(rows.is_empty());
    }

    #[test]
    fn emits_text_only_rows_with_sentinel_audio_fields() {
        let blocks = vec![block(0, "hello", -1, "")];
        let extractor = AudioExtractor::<NoopContainer>::new(&test_config(), false);
        let rows =
            build_story_rows("s1", &blocks, &HashMap::new(), &extractor, Path::new("/out"));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].audio_file_path, "");
        assert_eq!(rows[0].audio_length, -1.0);
        assert_eq!(rows[0].character_per_second, -1.0);
    }

    #[test]
    fn untracked_voice_sheet_is_treated_as_no_audio() {
        let blocks = vec![block(0, "hi", 3, "missing_sheet")];
        let extractor = AudioExtractor::<NoopContainer>::new(&test_config(), false);
        let rows =
            build_story_rows("s1", &blocks, &HashMap::new(), &extractor, Path::new("/out"));
        assert_eq!(rows[0].audio_file_path, "");
        assert_eq!(rows[0].audio_length, -1.0);
    }

    fn test_config() -> crate::config::Config {
        crate::config::Config {
            db_base_key: vec![0],
            db_key_jp: vec![0],
            ab_key: vec![0],
            header_size: 0,
            uma_hca_key: String::new(),
            expose_stress_mode: false,
            paths: crate::config::Paths {
                meta: PathBuf::new(),
                master: PathBuf::new(),
                dat: PathBuf::new(),
                output: PathBuf::new(),
            },
        }
    }
}
