//! Block parser: turns a timeline's object list into a BlockIndex → dialogue
//! block mapping (spec §4.4).

use std::collections::BTreeMap;

use log::debug;

use crate::object_reader::GameObject;

/// One dialogue block, keyed by its reconstructed `BlockIndex` (spec §3).
#[derive(Debug, Clone, PartialEq)]
pub struct DialogueBlock {
    pub block_index: i64,
    pub speaker_name: String,
    pub text: String,
    pub chara_id: i64,
    pub voice_sheet_id: String,
    pub cue_id: i64,
    pub ruby_info: String,
}

/// Build the BlockIndex → DialogueBlock mapping from one timeline's objects.
///
/// Uses a `BTreeMap` so callers that need ascending-BlockIndex iteration
/// (spec §5: "Within a single story, CSV rows are emitted in ascending
/// BlockIndex order") get it for free.
pub fn parse_blocks(objects: &[impl GameObject]) -> BTreeMap<i64, DialogueBlock> {
    let raw: Vec<_> = objects.iter().filter(|o| o.has_attr("Text")).collect();

    let last_block_num = raw
        .iter()
        .map(|o| o.attr_i64("NextBlock", -1))
        .filter(|&n| n != -1)
        .max()
        .unwrap_or(0);

    let mut blocks = BTreeMap::new();
    for obj in raw {
        let next_block = obj.attr_i64("NextBlock", -1);
        let block_index = if next_block == -1 {
            last_block_num
        } else {
            next_block - 1
        };

        let block = DialogueBlock {
            block_index,
            speaker_name: obj.attr_str("Name", ""),
            text: obj.attr_str("Text", ""),
            chara_id: obj.attr_i64("CharaId", 0),
            voice_sheet_id: obj.attr_str("VoiceSheetId", ""),
            cue_id: obj.attr_i64("CueId", -1),
            ruby_info: String::new(),
        };

        if let Some(existing) = blocks.get(&block_index) {
            let existing: &DialogueBlock = existing;
            if !existing.text.is_empty() {
                debug!(
                    "block {block_index} overwritten while discarding non-empty text {:?}",
                    existing.text
                );
            }
        }
        blocks.insert(block_index, block);
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object_reader::JsonObject;
    use serde_json::json;

    fn obj(next_block: i64, name: &str, text: &str) -> JsonObject {
        JsonObject::new(json!({
            "NextBlock": next_block,
            "Name": name,
            "Text": text,
        }))
    }

    #[test]
    fn reconstructs_block_index_from_next_block() {
        let objects = vec![obj(2, "a", "A"), obj(3, "b", "B"), obj(5, "c", "C"), obj(-1, "", "")];
        let blocks = parse_blocks(&objects);
        let mut keys: Vec<_> = blocks.keys().copied().collect();
        keys.sort();
        assert_eq!(keys, vec![1, 2, 4, 5]);
        assert_eq!(blocks[&1].speaker_name, "a");
    }

    #[test]
    fn terminal_node_overwrites_colliding_block_benignly() {
        let objects = vec![obj(-1, "last", "Final line"), obj(-1, "", "")];
        let blocks = parse_blocks(&objects);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[&0].text, "");
    }

    #[test]
    fn defaults_apply_when_attributes_absent() {
        let objects = vec![JsonObject::new(json!({"Text": "hi"}))];
        let blocks = parse_blocks(&objects);
        let block = &blocks[&0];
        assert_eq!(block.chara_id, 0);
        assert_eq!(block.voice_sheet_id, "");
        assert_eq!(block.cue_id, -1);
    }
}
