//! One-pass manifest scans that build the global lookup tables used by both
//! the system and story pipelines (spec §4.2).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::UmaVoiceError;
use crate::manifest::{AssetDescriptor, ManifestRow, SheetAudio};
use crate::meta_store::MetaStore;

/// Global, read-only lookup tables built once per run and shared by
/// reference across every worker shard (spec §3 "Story packet", §5).
#[derive(Debug, Default)]
pub struct Indexer {
    /// `sound/%` basename (no extension) → acb/awb pair.
    pub sheet_audio: HashMap<String, SheetAudio>,
    /// `%snd_voi_story_%` voice-sheet-id → acb/awb pair.
    pub voice_sheet_audio: HashMap<String, SheetAudio>,
    /// `%ast_ruby_%` story-id → ruby asset descriptor.
    pub story_ruby: HashMap<String, AssetDescriptor>,
    dat_root: PathBuf,
}

impl Indexer {
    /// Run the three indexing scans. The fourth scan (`storytimeline`) is not
    /// materialized here; [`Indexer::story_timelines`] enumerates it lazily
    /// since story packets are produced one at a time by the worker pool.
    pub fn build(meta: &MetaStore, dat_root: &Path) -> Result<Self, UmaVoiceError> {
        debug!("indexing sound/ sheets");
        let sheet_audio = build_slot_map(meta.scan_like("sound/%")?, dat_root, basename_stem);

        debug!("indexing snd_voi_story audio");
        let voice_sheet_audio = build_slot_map(
            meta.scan_like("%snd_voi_story_%")?,
            dat_root,
            last_underscore_segment_of_stem,
        );

        debug!("indexing ast_ruby assets");
        let mut story_ruby = HashMap::new();
        for row in meta.scan_like("%ast_ruby_%")? {
            let story_id = last_underscore_segment(&row.name).to_owned();
            if story_ruby.contains_key(&story_id) {
                debug!("ruby index collision overwriting story {story_id}");
            }
            story_ruby.insert(story_id, AssetDescriptor::from_row(&row, dat_root));
        }

        Ok(Self {
            sheet_audio,
            voice_sheet_audio,
            story_ruby,
            dat_root: dat_root.to_owned(),
        })
    }

    /// Lazily enumerate every story timeline, paired with its ruby descriptor
    /// (if any). Mirrors the source's generator: `storytimeline` rows minus
    /// `resource` rows, keyed by the last underscore-separated segment.
    pub fn story_timelines(
        &self,
        meta: &MetaStore,
    ) -> Result<Vec<(String, AssetDescriptor, Option<AssetDescriptor>)>, UmaVoiceError> {
        let rows = meta.scan_like_excluding("%storytimeline_%", "%resource%")?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let story_id = last_underscore_segment(&row.name).to_owned();
                let timeline = AssetDescriptor::from_row(&row, &self.dat_root);
                let ruby = self.story_ruby.get(&story_id).cloned();
                (story_id, timeline, ruby)
            })
            .collect())
    }
}

fn build_slot_map(
    rows: Vec<ManifestRow>,
    dat_root: &Path,
    key_fn: impl Fn(&str) -> String,
) -> HashMap<String, SheetAudio> {
    let mut map: HashMap<String, SheetAudio> = HashMap::new();
    for row in rows {
        let key = key_fn(&row.name);
        let slot = map.entry(key.clone()).or_default();
        let path = crate::manifest::resolve_blob_path(dat_root, &row.hash);
        if row.name.contains(".acb") {
            if slot.acb_path.is_some() {
                debug!("sheet index collision overwriting acb slot for {key}");
            }
            slot.acb_path = Some(path);
        } else if row.name.contains(".awb") {
            if slot.awb_path.is_some() {
                debug!("sheet index collision overwriting awb slot for {key}");
            }
            slot.awb_path = Some(path);
        }
    }
    map
}

/// `n.split('/').last().split('.').first()` — basename with its first
/// extension stripped.
fn basename_stem(name: &str) -> String {
    let basename = name.rsplit('/').next().unwrap_or(name);
    basename.split('.').next().unwrap_or(basename).to_owned()
}

fn last_underscore_segment(name: &str) -> &str {
    name.rsplit('_').next().unwrap_or(name)
}

fn last_underscore_segment_of_stem(name: &str) -> String {
    let stem = basename_stem(name);
    last_underscore_segment(&stem).to_owned()
}
