//! Full story-row assembly from a fabricated object graph: timeline + ruby
//! JSON on disk, decrypted (unencrypted, key 0) and parsed end to end.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::json;

use uma_voice_extract::audio::{AudioContainer, AudioExtractor};
use uma_voice_extract::cipher::Cipher;
use uma_voice_extract::config::{Config, Paths};
use uma_voice_extract::error::UmaVoiceError;
use uma_voice_extract::manifest::{AssetDescriptor, SheetAudio};
use uma_voice_extract::story::{self, StoryPacket};

struct NoAudioContainer;

impl AudioContainer for NoAudioContainer {
    fn open(_acb: &Path, _awb: Option<&Path>, _hca_key: &str) -> Result<Self, UmaVoiceError> {
        Ok(Self)
    }
    fn track_count(&self) -> usize {
        0
    }
    fn track_cue_id(&self, _index: usize) -> Option<i64> {
        None
    }
    fn decode_track(&self, _index: usize, _output_path: &Path) -> Result<(), UmaVoiceError> {
        Err(UmaVoiceError::AudioExtract("no tracks in fixture".into()))
    }
}

fn test_config() -> Config {
    Config {
        db_base_key: vec![0],
        db_key_jp: vec![0],
        ab_key: vec![0xAA],
        header_size: 0,
        uma_hca_key: String::new(),
        expose_stress_mode: false,
        paths: Paths {
            meta: PathBuf::new(),
            master: PathBuf::new(),
            dat: PathBuf::new(),
            output: PathBuf::new(),
        },
    }
}

fn write_json(dir: &tempfile::TempDir, name: &str, value: serde_json::Value) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, value.to_string()).unwrap();
    path
}

#[test]
fn assembles_story_rows_from_timeline_and_ruby_fixtures() {
    let dir = tempfile::tempdir().unwrap();

    let timeline_path = write_json(
        &dir,
        "timeline.json",
        json!([
            {
                "$Type": "MonoBehaviour",
                "NextBlock": 1,
                "Name": "Special Week",
                "Text": "Hello, trainer!",
                "CharaId": 1001,
                "VoiceSheetId": "snd_voi_story_0001",
                "CueId": 5
            },
            {
                "$Type": "MonoBehaviour",
                "NextBlock": -1,
                "Name": "",
                "Text": ""
            }
        ]),
    );

    let ruby_path = write_json(
        &dir,
        "ruby.json",
        json!([
            {
                "$Type": "MonoBehaviour",
                "DataArray": [
                    {
                        "BlockIndex": 0,
                        "RubyDataList": [
                            {"CharX": 0.0, "RubyText": "はろー"}
                        ]
                    }
                ]
            }
        ]),
    );

    let packet = StoryPacket {
        story_id: "story_0001".into(),
        timeline: AssetDescriptor {
            logical_name: "storytimeline_0001".into(),
            content_hash: "deadbeef".into(),
            encryption_key: 0,
            resolved_path: timeline_path,
        },
        ruby: Some(AssetDescriptor {
            logical_name: "ast_ruby_0001".into(),
            content_hash: "cafef00d".into(),
            encryption_key: 0,
            resolved_path: ruby_path,
        }),
    };

    let cipher = Cipher::new(&test_config());
    let blocks = story::parse_story_blocks(&packet, &cipher).unwrap();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].text, "Hello, trainer!");
    assert_eq!(blocks[0].ruby_info, "0.0:はろー");

    let mut voice_sheet_audio = HashMap::new();
    voice_sheet_audio.insert(
        "snd_voi_story_0001".to_string(),
        SheetAudio { acb_path: None, awb_path: None },
    );

    let extractor = AudioExtractor::<NoAudioContainer>::new(&test_config(), false);
    let rows = story::build_story_rows(
        &packet.story_id,
        &blocks,
        &voice_sheet_audio,
        &extractor,
        dir.path(),
    );

    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.story_id, "story_0001");
    assert_eq!(row.speaker_name, "Special Week");
    assert_eq!(row.ruby_text, "0.0:はろー");
    // The voice sheet carries no acb_path, so it's unusable and audio stays
    // at the sentinel "no audio" values even though cue_id resolved.
    assert_eq!(row.audio_file_path, "");
    assert_eq!(row.audio_length, -1.0);
    assert_eq!(row.character_per_second, -1.0);
}
