//! System-voice pipeline: joins `character_system_text` rows against the
//! sheet-audio index and extracts one WAV per entry (spec §3 "System voice
//! entry", §4.7).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::audio::{AudioContainer, AudioExtractor};
use crate::csv_rows::{self, SystemVoiceRow};
use crate::manifest::SheetAudio;
use crate::master_store::SystemTextRow;

/// A system voice entry with its sheet resolved to an audio pair, ready for
/// extraction. Entries whose sheet is absent or unusable never reach here
/// (spec §3: "silently dropped").
#[derive(Debug, Clone)]
pub struct SystemVoiceEntry {
    pub character_id: i64,
    pub transcript: String,
    pub acb_path: PathBuf,
    pub awb_path: Option<PathBuf>,
    pub cue_sheet: String,
    pub cue_id: i64,
}

/// Join master rows against the sheet index, dropping rows with no usable
/// sheet (spec §3).
pub fn resolve_system_entries(
    rows: Vec<SystemTextRow>,
    sheet_audio: &HashMap<String, SheetAudio>,
) -> Vec<SystemVoiceEntry> {
    rows.into_iter()
        .filter_map(|row| {
            let sheet = sheet_audio.get(&row.cue_sheet)?;
            if !sheet.is_usable() {
                return None;
            }
            Some(SystemVoiceEntry {
                character_id: row.character_id,
                transcript: row.text,
                acb_path: sheet.acb_path.clone()?,
                awb_path: sheet.awb_path.clone(),
                cue_sheet: row.cue_sheet,
                cue_id: row.cue_id,
            })
        })
        .collect()
}

/// `<output>/system/<character_id>/sys_<char>_<sheet>_<cueid>.wav` (spec §6).
pub fn system_wav_path(output_root: &Path, entry: &SystemVoiceEntry) -> PathBuf {
    output_root
        .join("system")
        .join(entry.character_id.to_string())
        .join(format!(
            "sys_{}_{}_{}.wav",
            entry.character_id, entry.cue_sheet, entry.cue_id
        ))
}

/// Extracts this entry's audio and builds its CSV row. Returns `None` when
/// extraction fails to resolve a path — the system CSV has no "FAILED"
/// sentinel (that's a story-only concept, spec §6); a failed system entry is
/// silently dropped, matching `system_worker_task`'s `if final_path: ...`.
pub fn process_system_entry<C: AudioContainer>(
    entry: &SystemVoiceEntry,
    extractor: &AudioExtractor<C>,
    output_root: &Path,
) -> Option<SystemVoiceRow> {
    let output_path = system_wav_path(output_root, entry);
    let (resolved_path, _duration) = extractor.extract(
        &entry.acb_path,
        entry.awb_path.as_deref(),
        entry.cue_id,
        &output_path,
    );
    let resolved_path = resolved_path?;

    Some(SystemVoiceRow {
        text: entry.transcript.clone(),
        chara_id: entry.character_id,
        audio_file_path: csv_rows::audio_file_path(Some(&Some(resolved_path))),
    })
}
