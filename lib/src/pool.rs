//! Worker pool & merger (spec §4.7, §5): shuffle, shard into `W` contiguous
//! chunks, run one rayon task per shard, merge shard CSVs behind a single
//! header row.

use std::fs;
use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;
use rayon::prelude::*;
use serde::Serialize;

use crate::error::UmaVoiceError;

/// Test-mode cap on total work items (spec §4.7: "Optional test mode
/// truncates to 1000 items").
pub const TEST_MODE_CAP: usize = 1000;

pub fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(1)
}

/// Shuffle `items` uniformly at random, optionally cap to [`TEST_MODE_CAP`],
/// then split into `worker_count` contiguous chunks of `⌈len/worker_count⌉`.
pub fn shuffle_into_shards<T>(mut items: Vec<T>, worker_count: usize, test_mode: bool) -> Vec<Vec<T>> {
    items.shuffle(&mut rand::thread_rng());
    if test_mode {
        items.truncate(TEST_MODE_CAP);
    }
    if items.is_empty() {
        return Vec::new();
    }
    let worker_count = worker_count.max(1);
    let shard_size = items.len().div_ceil(worker_count);
    items
        .chunks(shard_size)
        .map(|chunk| chunk.to_vec())
        .collect()
}

/// Run one rayon task per shard. Each task builds whatever per-shard state it
/// needs (cipher, extractor) itself — `process` receives only the shard id
/// and its items, matching the "no shared mutable state" invariant of §4.7.
pub fn run_shards<T, R, F>(shards: Vec<Vec<T>>, process: F) -> Vec<R>
where
    T: Send,
    R: Send,
    F: Fn(usize, Vec<T>) -> Vec<R> + Sync,
{
    shards
        .into_par_iter()
        .enumerate()
        .flat_map_iter(|(shard_id, shard)| process(shard_id, shard).into_iter())
        .collect()
}

/// Write one worker's rows to its shard file, with no header row (spec
/// §4.7: `temp_{scope}_worker_{id}.csv`).
pub fn write_shard_csv<R: Serialize>(rows: &[R], path: &Path) -> Result<(), UmaVoiceError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| UmaVoiceError::Csv(format!("opening shard {}", path.display()), e))?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| UmaVoiceError::Csv(format!("writing shard row to {}", path.display()), e))?;
    }
    writer
        .flush()
        .map_err(|e| UmaVoiceError::Io(format!("flushing shard {}", path.display()), e))
}

pub fn shard_path(output_dir: &Path, scope: &str, shard_id: usize) -> PathBuf {
    output_dir.join(format!("temp_{scope}_worker_{shard_id}.csv"))
}

/// Concatenate shard files in filesystem enumeration order behind a single
/// header row, then remove the shards (spec §4.7).
pub fn merge_shards(shard_paths: &[PathBuf], final_path: &Path, header: &[&str]) -> Result<(), UmaVoiceError> {
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(final_path)
            .map_err(|e| UmaVoiceError::Csv(format!("creating {}", final_path.display()), e))?;
        writer
            .write_record(header)
            .map_err(|e| UmaVoiceError::Csv("writing merged csv header".into(), e))?;
        writer
            .flush()
            .map_err(|e| UmaVoiceError::Io("flushing merged csv header".into(), e))?;
    }

    let mut output = fs::OpenOptions::new()
        .append(true)
        .open(final_path)
        .map_err(|e| UmaVoiceError::Io(format!("reopening {}", final_path.display()), e))?;
    for shard_path in shard_paths {
        let mut input = fs::File::open(shard_path)
            .map_err(|e| UmaVoiceError::Io(format!("opening shard {}", shard_path.display()), e))?;
        std::io::copy(&mut input, &mut output)
            .map_err(|e| UmaVoiceError::Io(format!("appending shard {}", shard_path.display()), e))?;
    }
    for shard_path in shard_paths {
        let _ = fs::remove_file(shard_path);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shards_are_contiguous_and_cover_every_item() {
        let items: Vec<i32> = (0..10).collect();
        let shards = shuffle_into_shards(items.clone(), 3, false);
        assert_eq!(shards.len(), 3);
        let mut flattened: Vec<i32> = shards.into_iter().flatten().collect();
        flattened.sort();
        assert_eq!(flattened, items);
    }

    #[test]
    fn test_mode_caps_total_items() {
        let items: Vec<i32> = (0..5000).collect();
        let shards = shuffle_into_shards(items, 4, true);
        let total: usize = shards.iter().map(Vec::len).sum();
        assert_eq!(total, TEST_MODE_CAP);
    }

    #[test]
    fn empty_input_yields_no_shards() {
        let shards = shuffle_into_shards::<i32>(Vec::new(), 4, false);
        assert!(shards.is_empty());
    }

    #[test]
    fn merge_concatenates_shards_behind_one_header() {
        let dir = tempfile::tempdir().unwrap();
        let shard_a = dir.path().join("a.csv");
        let shard_b = dir.path().join("b.csv");
        fs::write(&shard_a, "1,2\n").unwrap();
        fs::write(&shard_b, "3,4\n").unwrap();
        let final_path = dir.path().join("final.csv");

        merge_shards(&[shard_a.clone(), shard_b.clone()], &final_path, &["X", "Y"]).unwrap();

        let contents = fs::read_to_string(&final_path).unwrap();
        assert_eq!(contents, "X,Y\n1,2\n3,4\n");
        assert!(!shard_a.exists());
        assert!(!shard_b.exists());
    }
}
