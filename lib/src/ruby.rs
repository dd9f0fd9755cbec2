//! Ruby-annotation joiner: overlays furigana entries onto parsed dialogue
//! blocks, keyed by BlockIndex (spec §4.5).

use std::collections::BTreeMap;

use crate::blocks::DialogueBlock;
use crate::object_reader::GameObject;

/// Join ruby data onto `blocks` in place. Any failure to find a usable ruby
/// array, or entries pointing at unknown blocks, are silently skipped per
/// §4.5 ("Failures in ruby decoding are swallowed").
pub fn join_ruby(blocks: &mut BTreeMap<i64, DialogueBlock>, ruby_objects: &[impl GameObject]) {
    let data_array = match ruby_objects
        .iter()
        .find(|o| o.type_name() == "MonoBehaviour" && !o.attr_object_list("DataArray").is_empty())
    {
        Some(owner) => owner.attr_object_list("DataArray"),
        None => return,
    };

    for entry in &data_array {
        let block_index = match entry.attr("BlockIndex").and_then(serde_json::Value::as_i64) {
            Some(idx) => idx,
            None => continue,
        };
        let Some(block) = blocks.get_mut(&block_index) else {
            continue;
        };

        let ruby_text = entry
            .attr_object_list("RubyDataList")
            .iter()
            .map(|item| {
                let char_x = item
                    .attr("CharX")
                    .and_then(serde_json::Value::as_f64)
                    .unwrap_or_else(|| item.attr_f64("CharIndex", 0.0));
                let text = item.attr_str("RubyText", "");
                format!("{}:{text}", format_char_x(char_x))
            })
            .collect::<Vec<_>>()
            .join(" | ");

        block.ruby_info = ruby_text;
    }
}

/// Mirrors Python's `str(float)`: whole numbers keep one decimal place.
fn format_char_x(x: f64) -> String {
    if x.fract() == 0.0 {
        format!("{x:.1}")
    } else {
        format!("{x}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object_reader::JsonObject;
    use serde_json::json;

    fn block(index: i64) -> DialogueBlock {
        DialogueBlock {
            block_index: index,
            speaker_name: String::new(),
            text: String::new(),
            chara_id: 0,
            voice_sheet_id: String::new(),
            cue_id: -1,
            ruby_info: String::new(),
        }
    }

    #[test]
    fn joins_ruby_text_for_known_block() {
        let mut blocks = BTreeMap::new();
        blocks.insert(7, block(7));

        let ruby_objects = vec![JsonObject::new(json!({
            "$Type": "MonoBehaviour",
            "DataArray": [
                {
                    "BlockIndex": 7,
                    "RubyDataList": [
                        {"CharX": 1.5, "RubyText": "あ"},
                        {"CharX": 3.0, "RubyText": "い"},
                    ]
                }
            ]
        }))];

        join_ruby(&mut blocks, &ruby_objects);
        assert_eq!(blocks[&7].ruby_info, "1.5:あ | 3.0:い");
    }

    #[test]
    fn unknown_block_index_is_skipped() {
        let mut blocks = BTreeMap::new();
        blocks.insert(1, block(1));

        let ruby_objects = vec![JsonObject::new(json!({
            "$Type": "MonoBehaviour",
            "DataArray": [{"BlockIndex": 99, "RubyDataList": []}]
        }))];

        join_ruby(&mut blocks, &ruby_objects);
        assert_eq!(blocks[&1].ruby_info, "");
    }

    #[test]
    fn no_usable_data_array_leaves_blocks_untouched() {
        let mut blocks = BTreeMap::new();
        blocks.insert(1, block(1));
        let ruby_objects: Vec<JsonObject> = vec![JsonObject::new(json!({"$Type": "Scaffold"}))];
        join_ruby(&mut blocks, &ruby_objects);
        assert_eq!(blocks[&1].ruby_info, "");
    }
}
