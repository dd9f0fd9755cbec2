//! JSON configuration loading (spec §6, §10.3).

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::UmaVoiceError;

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(rename = "DB_BASE_KEY_HEX")]
    db_base_key_hex: String,
    #[serde(rename = "DB_KEY_JP_HEX")]
    db_key_jp_hex: String,
    #[serde(rename = "AB_KEY_HEX")]
    ab_key_hex: String,
    #[serde(rename = "HEADER_SIZE")]
    header_size: usize,
    #[serde(rename = "UMA_HCA_KEY")]
    uma_hca_key: String,
    #[serde(rename = "EXPOSE_STRESS_MODE")]
    expose_stress_mode: bool,
    #[serde(rename = "PATHS")]
    paths: RawPaths,
}

#[derive(Debug, Deserialize)]
struct RawPaths {
    meta: PathBuf,
    master: PathBuf,
    dat: PathBuf,
    output: PathBuf,
}

/// Fully parsed, hex-decoded configuration. Hex fields are decoded once here
/// so the cipher layer never re-parses hex per call (§10.3).
#[derive(Debug, Clone)]
pub struct Config {
    pub db_base_key: Vec<u8>,
    pub db_key_jp: Vec<u8>,
    pub ab_key: Vec<u8>,
    pub header_size: usize,
    pub uma_hca_key: String,
    pub expose_stress_mode: bool,
    pub paths: Paths,
}

#[derive(Debug, Clone)]
pub struct Paths {
    pub meta: PathBuf,
    pub master: PathBuf,
    pub dat: PathBuf,
    pub output: PathBuf,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, UmaVoiceError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                UmaVoiceError::NotFound(path.to_owned())
            } else {
                UmaVoiceError::Io(format!("reading config {}", path.display()), e)
            }
        })?;
        let raw: RawConfig = serde_json::from_str(&contents)
            .map_err(|e| UmaVoiceError::Config(format!("{}: {e}", path.display())))?;

        let db_base_key = decode_hex(&raw.db_base_key_hex, "DB_BASE_KEY_HEX")?;
        let db_key_jp = decode_hex(&raw.db_key_jp_hex, "DB_KEY_JP_HEX")?;
        let ab_key = decode_hex(&raw.ab_key_hex, "AB_KEY_HEX")?;

        Ok(Config {
            db_base_key,
            db_key_jp,
            ab_key,
            header_size: raw.header_size,
            uma_hca_key: raw.uma_hca_key,
            expose_stress_mode: raw.expose_stress_mode,
            paths: Paths {
                meta: raw.paths.meta,
                master: raw.paths.master,
                dat: raw.paths.dat,
                output: raw.paths.output,
            },
        })
    }
}

fn decode_hex(value: &str, field: &str) -> Result<Vec<u8>, UmaVoiceError> {
    hex::decode(value).map_err(|e| UmaVoiceError::Config(format!("{field} is not valid hex: {e}")))
}
