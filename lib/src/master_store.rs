//! Access to the plaintext master database: `character_system_text` (spec §4.2).

use rusqlite::Connection;

use crate::config::Config;
use crate::error::UmaVoiceError;

/// One row of `character_system_text`: a system voice line keyed by cue.
#[derive(Debug, Clone)]
pub struct SystemTextRow {
    pub character_id: i64,
    pub text: String,
    pub cue_sheet: String,
    pub cue_id: i64,
}

pub struct MasterStore {
    conn: Connection,
}

impl MasterStore {
    pub fn open(config: &Config) -> Result<Self, UmaVoiceError> {
        if !config.paths.master.exists() {
            return Err(UmaVoiceError::NotFound(config.paths.master.clone()));
        }
        let conn = Connection::open(&config.paths.master)
            .map_err(|e| UmaVoiceError::Sql("opening master database".into(), e))?;
        Ok(Self { conn })
    }

    /// `SELECT character_id, text, cue_sheet, cue_id FROM character_system_text
    /// WHERE cue_sheet IS NOT NULL AND cue_sheet != ''` (spec §4.2).
    pub fn system_text_rows(&self) -> Result<Vec<SystemTextRow>, UmaVoiceError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT character_id, text, cue_sheet, cue_id FROM character_system_text \
                 WHERE cue_sheet IS NOT NULL AND cue_sheet != ''",
            )
            .map_err(|e| UmaVoiceError::Sql("preparing system text query".into(), e))?;
        let rows = stmt
            .query_map([], |row| {
                Ok(SystemTextRow {
                    character_id: row.get(0)?,
                    text: row.get(1)?,
                    cue_sheet: row.get(2)?,
                    cue_id: row.get(3)?,
                })
            })
            .map_err(|e| UmaVoiceError::Sql("running system text query".into(), e))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| UmaVoiceError::Sql("reading system text row".into(), e))
    }
}
