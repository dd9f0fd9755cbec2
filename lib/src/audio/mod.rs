//! Audio extraction (spec §4.6): locate a cue in a container, decode it to
//! WAV, measure duration, and cache by output path.
//!
//! The container-audio decoder is an external black box (spec §1); this
//! module defines the contract (`AudioContainer`) a concrete adapter must
//! satisfy and drives the caching/cue-resolution/write pipeline against it
//! generically. [`vgmstream`] supplies the concrete adapter used in
//! production, shelling out to `vgmstream-cli` the same way the teacher's
//! `ffmpeg` module shells out to `ffmpeg`/`ffprobe`.

pub mod vgmstream;
mod wav;

use std::fs;
use std::path::{Path, PathBuf};

use log::warn;

use crate::config::Config;
use crate::error::UmaVoiceError;

/// The narrow contract the container-audio decoder must satisfy (spec §4.6,
/// §1). One instance is scoped to a single `(acb_path, awb_path)` pair.
pub trait AudioContainer: Sized {
    fn open(acb_path: &Path, awb_path: Option<&Path>, hca_key: &str) -> Result<Self, UmaVoiceError>;

    fn track_count(&self) -> usize;

    /// The track's own `cue_id` attribute, if the container exposes one.
    fn track_cue_id(&self, index: usize) -> Option<i64>;

    /// Decode track `index` with codec hint `"hca"` and write WAV bytes to
    /// `output_path`.
    fn decode_track(&self, index: usize, output_path: &Path) -> Result<(), UmaVoiceError>;
}

/// Drives the cue-resolution, caching, and atomic-write pipeline over any
/// [`AudioContainer`] implementation.
pub struct AudioExtractor<C> {
    hca_key: String,
    overwrite: bool,
    _container: std::marker::PhantomData<C>,
}

impl<C: AudioContainer> AudioExtractor<C> {
    /// `overwrite` bypasses the cache-hit check below, re-extracting a cue
    /// even when its output WAV already exists (spec §10.4's `--overwrite`
    /// flag).
    pub fn new(config: &Config, overwrite: bool) -> Self {
        Self {
            hca_key: config.uma_hca_key.clone(),
            overwrite,
            _container: std::marker::PhantomData,
        }
    }

    /// Extract the cue into `output_path`. Never propagates an error: any
    /// failure at steps 2-6 of §4.6 is logged and reported as `(None, 0.0)`,
    /// matching the source's catch-all behavior.
    pub fn extract(
        &self,
        acb_path: &Path,
        awb_path: Option<&Path>,
        cue_id: i64,
        output_path: &Path,
    ) -> (Option<PathBuf>, f64) {
        if !self.overwrite && output_path.exists() {
            return match wav::read_duration(output_path) {
                Ok(duration) => (Some(output_path.to_owned()), duration),
                Err(_) => (Some(output_path.to_owned()), 0.0),
            };
        }

        match self.try_extract(acb_path, awb_path, cue_id, output_path) {
            Ok(result) => result,
            Err(e) => {
                warn!("audio extraction failed for {}: {e}", output_path.display());
                (None, 0.0)
            }
        }
    }

    fn try_extract(
        &self,
        acb_path: &Path,
        awb_path: Option<&Path>,
        cue_id: i64,
        output_path: &Path,
    ) -> Result<(Option<PathBuf>, f64), UmaVoiceError> {
        let container = C::open(acb_path, awb_path, &self.hca_key)?;
        let track_count = container.track_count();

        let resolved = (0..track_count)
            .find(|&i| container.track_cue_id(i) == Some(cue_id))
            .or_else(|| {
                let as_index = usize::try_from(cue_id).ok()?;
                (as_index < track_count).then_some(as_index)
            });

        let Some(index) = resolved else {
            return Ok((None, 0.0));
        };

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| UmaVoiceError::Io(format!("creating {}", parent.display()), e))?;
        }

        let parent = output_path.parent().unwrap_or_else(|| Path::new("."));
        let staging = tempfile::NamedTempFile::new_in(parent)
            .map_err(|e| UmaVoiceError::Io("creating staging wav file".into(), e))?;
        container.decode_track(index, staging.path())?;

        let duration = wav::read_duration(staging.path()).unwrap_or(0.0);

        staging
            .persist(output_path)
            .map_err(|e| UmaVoiceError::Io(format!("persisting {}", output_path.display()), e.error))?;

        Ok((Some(output_path.to_owned()), duration))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    struct FakeContainer {
        cue_ids: Vec<Option<i64>>,
    }

    thread_local! {
        static DECODED: RefCell<HashMap<PathBuf, usize>> = RefCell::new(HashMap::new());
    }

    impl AudioContainer for FakeContainer {
        fn open(_acb: &Path, _awb: Option<&Path>, _key: &str) -> Result<Self, UmaVoiceError> {
            Ok(Self {
                cue_ids: vec![Some(5), Some(9)],
            })
        }

        fn track_count(&self) -> usize {
            self.cue_ids.len()
        }

        fn track_cue_id(&self, index: usize) -> Option<i64> {
            self.cue_ids[index]
        }

        fn decode_track(&self, index: usize, output_path: &Path) -> Result<(), UmaVoiceError> {
            DECODED.with(|d| d.borrow_mut().insert(output_path.to_owned(), index));
            wav::write_silence(output_path, 1.0)
        }
    }

    #[test]
    fn attribute_match_picks_the_matching_cue() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.wav");
        let extractor = AudioExtractor::<FakeContainer> {
            hca_key: String::new(),
            overwrite: false,
            _container: std::marker::PhantomData,
        };
        let (path, duration) = extractor.extract(Path::new("x.acb"), None, 9, &out);
        assert_eq!(path, Some(out));
        assert!(duration > 0.0);
    }

    #[test]
    fn unresolved_cue_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.wav");
        let extractor = AudioExtractor::<FakeContainer> {
            hca_key: String::new(),
            overwrite: false,
            _container: std::marker::PhantomData,
        };
        let (path, duration) = extractor.extract(Path::new("x.acb"), None, 999, &out);
        assert_eq!(path, None);
        assert_eq!(duration, 0.0);
    }

    #[test]
    fn existing_output_is_not_regenerated() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.wav");
        wav::write_silence(&out, 2.0).unwrap();
        let extractor = AudioExtractor::<FakeContainer> {
            hca_key: String::new(),
            overwrite: false,
            _container: std::marker::PhantomData,
        };
        let (path, duration) = extractor.extract(Path::new("x.acb"), None, 5, &out);
        assert_eq!(path, Some(out));
        assert!((duration - 2.0).abs() < 0.01);
    }

    #[test]
    fn overwrite_bypasses_the_cache_hit() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.wav");
        wav::write_silence(&out, 2.0).unwrap();
        let extractor = AudioExtractor::<FakeContainer> {
            hca_key: String::new(),
            overwrite: true,
            _container: std::marker::PhantomData,
        };
        // Cue 9 decodes to 1.0s of silence in FakeContainer; a cache hit
        // would have returned the pre-existing 2.0s file unchanged.
        let (path, duration) = extractor.extract(Path::new("x.acb"), None, 9, &out);
        assert_eq!(path, Some(out));
        assert!((duration - 1.0).abs() < 0.01);
    }
}
