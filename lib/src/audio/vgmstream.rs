//! `vgmstream-cli` adapter: the concrete container-audio decoder collaborator
//! (spec §1, §4.6). Shells out the same way the teacher's `ffmpeg` module
//! shells out to `ffmpeg`/`ffprobe` — a `Command` per call, stdio piped,
//! non-zero exit turned into an error with stderr attached.

use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use crate::error::UmaVoiceError;

use super::AudioContainer;

#[derive(Debug, Clone)]
struct Subsong {
    cue_id: Option<i64>,
}

pub struct VgmstreamContainer {
    acb_path: PathBuf,
    hca_key: String,
    subsongs: Vec<Subsong>,
}

impl AudioContainer for VgmstreamContainer {
    fn open(acb_path: &Path, _awb_path: Option<&Path>, hca_key: &str) -> Result<Self, UmaVoiceError> {
        let subsongs = probe_subsongs(acb_path, hca_key)?;
        Ok(Self {
            acb_path: acb_path.to_owned(),
            hca_key: hca_key.to_owned(),
            subsongs,
        })
    }

    fn track_count(&self) -> usize {
        self.subsongs.len()
    }

    fn track_cue_id(&self, index: usize) -> Option<i64> {
        self.subsongs.get(index).and_then(|s| s.cue_id)
    }

    fn decode_track(&self, index: usize, output_path: &Path) -> Result<(), UmaVoiceError> {
        // vgmstream subsongs are 1-indexed on the command line.
        let args = [
            "-K".into(),
            self.hca_key.clone(),
            "-S".into(),
            (index + 1).to_string(),
            "-o".into(),
            output_path.display().to_string(),
            self.acb_path.display().to_string(),
        ];
        let output = run(&args)?;
        check_exit(&output)
    }
}

fn probe_subsongs(acb_path: &Path, hca_key: &str) -> Result<Vec<Subsong>, UmaVoiceError> {
    let args = [
        "-K".into(),
        hca_key.to_owned(),
        "-m".into(),
        "-S".into(),
        "0".into(),
        acb_path.display().to_string(),
    ];
    let output = run(&args)?;
    check_exit(&output)?;
    let stdout = String::from_utf8_lossy(&output.stdout);

    let total = stdout
        .lines()
        .find_map(|line| line.strip_prefix("stream count: "))
        .and_then(|n| n.trim().parse::<usize>().ok())
        .unwrap_or(0);

    (0..total)
        .map(|i| probe_one_subsong(acb_path, hca_key, i))
        .collect()
}

fn probe_one_subsong(acb_path: &Path, hca_key: &str, index: usize) -> Result<Subsong, UmaVoiceError> {
    let args = [
        "-K".into(),
        hca_key.to_owned(),
        "-m".into(),
        "-S".into(),
        (index + 1).to_string(),
        acb_path.display().to_string(),
    ];
    let output = run(&args)?;
    check_exit(&output)?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    let cue_id = stdout
        .lines()
        .find_map(|line| line.strip_prefix("stream name: "))
        .and_then(|name| name.trim().parse::<i64>().ok());
    Ok(Subsong { cue_id })
}

fn run(args: &[String]) -> Result<Output, UmaVoiceError> {
    log::debug!("Running vgmstream-cli {:?}", args);
    Command::new("vgmstream-cli")
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| UmaVoiceError::Io("Couldn't run vgmstream-cli".into(), e))
}

fn check_exit(output: &Output) -> Result<(), UmaVoiceError> {
    if !output.status.success() {
        return Err(UmaVoiceError::AudioExtract(format!(
            "vgmstream-cli exit code {}, {}",
            output.status,
            String::from_utf8_lossy(&output.stderr)
        )));
    }
    Ok(())
}
