//! Stress-mode checksum comparator (spec §4.8): reuses the cipher, block
//! parser, and ruby joiner but skips audio extraction, summing a checksum
//! per story and diffing successive loops against a baseline.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::cipher::Cipher;
use crate::pool;
use crate::story::{self, StoryPacket};

/// `Σ BlockIndex + Σ codepoint(c) for c ∈ Text ∪ SpeakerName ∪ RubyInfo` of
/// every block, or `-1` if the story failed to decrypt/parse (spec §4.8).
pub fn checksum_for_story(packet: &StoryPacket, cipher: &Cipher) -> i64 {
    match story::parse_story_blocks(packet, cipher) {
        Ok(blocks) => blocks
            .iter()
            .map(|b| {
                b.block_index
                    + codepoint_sum(&b.text)
                    + codepoint_sum(&b.speaker_name)
                    + codepoint_sum(&b.ruby_info)
            })
            .sum(),
        Err(e) => {
            log::warn!("stress checksum failed for story {}: {e}", packet.story_id);
            -1
        }
    }
}

fn codepoint_sum(s: &str) -> i64 {
    s.chars().map(|c| c as i64).sum()
}

/// Shuffle `packets`, shard across `worker_count` rayon tasks, and compute
/// every story's checksum. Each task builds its own [`Cipher`] clone,
/// matching the no-shared-mutable-state invariant (§5).
pub fn compute_checksums(
    packets: Vec<StoryPacket>,
    cipher: &Cipher,
    worker_count: usize,
) -> HashMap<String, i64> {
    let shards = pool::shuffle_into_shards(packets, worker_count, false);
    let cipher = cipher.clone();
    let pairs = pool::run_shards(shards, move |_shard_id, shard| {
        shard
            .into_iter()
            .map(|packet| {
                let checksum = checksum_for_story(&packet, &cipher);
                (packet.story_id, checksum)
            })
            .collect::<Vec<_>>()
    });
    pairs.into_iter().collect()
}

#[derive(Debug, Clone)]
pub struct LoopSummary {
    pub loop_number: u64,
    pub elapsed: Duration,
    pub mismatches: Vec<String>,
}

impl LoopSummary {
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
    }

    /// `"Loop N PASSED in X.XXs"` / `"Loop N FAILED with K errors in
    /// X.XXs"` (spec §10.6, reproduced from the source's per-loop report).
    pub fn report_line(&self) -> String {
        let seconds = self.elapsed.as_secs_f64();
        if self.passed() {
            format!("Loop {} PASSED in {seconds:.2}s", self.loop_number)
        } else {
            format!(
                "Loop {} FAILED with {} errors in {seconds:.2}s",
                self.loop_number,
                self.mismatches.len()
            )
        }
    }
}

/// Run one comparison loop: recompute every story's checksum and diff
/// against `baseline`. Loop 0 (the baseline loop itself) is always reported
/// as passed.
pub fn run_loop(
    loop_number: u64,
    packets: Vec<StoryPacket>,
    cipher: &Cipher,
    worker_count: usize,
    baseline: &HashMap<String, i64>,
) -> LoopSummary {
    let start = Instant::now();
    let current = compute_checksums(packets, cipher, worker_count);

    let mismatches = if loop_number == 0 {
        Vec::new()
    } else {
        current
            .iter()
            .filter_map(|(story_id, checksum)| match baseline.get(story_id) {
                Some(expected) if expected != checksum => Some(story_id.clone()),
                _ => None,
            })
            .collect()
    };

    for story_id in &mismatches {
        log::error!(
            "checksum mismatch for story {story_id}: expected {:?}, got {:?}",
            baseline.get(story_id),
            current.get(story_id)
        );
    }

    LoopSummary {
        loop_number,
        elapsed: start.elapsed(),
        mismatches,
    }
}
