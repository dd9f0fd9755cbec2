//! Access to the ciphered manifest database: one table `a(n, h, e)`, queried
//! with name-pattern `LIKE` scans (spec §4.2, §6).

use rusqlite::Connection;

use crate::cipher::derive_meta_key_hex;
use crate::config::Config;
use crate::error::UmaVoiceError;
use crate::manifest::ManifestRow;

pub struct MetaStore {
    conn: Connection,
}

impl MetaStore {
    /// Open the ciphered manifest and apply the three pragmas that define its
    /// format: `hexkey`, `cipher='chacha20'`, `cipher_use_hmac=OFF`.
    pub fn open(config: &Config) -> Result<Self, UmaVoiceError> {
        if !config.paths.meta.exists() {
            return Err(UmaVoiceError::NotFound(config.paths.meta.clone()));
        }
        let conn = Connection::open(&config.paths.meta)
            .map_err(|e| UmaVoiceError::CipherOpen(e.to_string()))?;

        let key_hex = derive_meta_key_hex(&config.db_base_key, &config.db_key_jp);
        conn.execute_batch(&format!(
            "PRAGMA hexkey='{key_hex}'; PRAGMA cipher='chacha20'; PRAGMA cipher_use_hmac=OFF;"
        ))
        .map_err(|e| UmaVoiceError::CipherOpen(e.to_string()))?;

        // Force the cipher to actually engage now, so a bad key surfaces here
        // rather than on the first real query.
        conn.query_row("SELECT count(*) FROM sqlite_master", [], |_| Ok(()))
            .map_err(|e| UmaVoiceError::CipherOpen(format!("key rejected: {e}")))?;

        Ok(Self { conn })
    }

    /// `SELECT n, h, e FROM a WHERE n LIKE pattern`.
    pub fn scan_like(&self, pattern: &str) -> Result<Vec<ManifestRow>, UmaVoiceError> {
        let mut stmt = self
            .conn
            .prepare("SELECT n, h, e FROM a WHERE n LIKE ?1")
            .map_err(|e| UmaVoiceError::Sql("preparing manifest scan".into(), e))?;
        collect_rows(
            stmt.query_map([pattern], row_to_manifest_row)
                .map_err(|e| UmaVoiceError::Sql("running manifest scan".into(), e))?,
        )
    }

    /// `SELECT n, h, e FROM a WHERE n LIKE pattern AND n NOT LIKE exclude`.
    pub fn scan_like_excluding(
        &self,
        pattern: &str,
        exclude: &str,
    ) -> Result<Vec<ManifestRow>, UmaVoiceError> {
        let mut stmt = self
            .conn
            .prepare("SELECT n, h, e FROM a WHERE n LIKE ?1 AND n NOT LIKE ?2")
            .map_err(|e| UmaVoiceError::Sql("preparing manifest scan".into(), e))?;
        collect_rows(
            stmt.query_map([pattern, exclude], row_to_manifest_row)
                .map_err(|e| UmaVoiceError::Sql("running manifest scan".into(), e))?,
        )
    }
}

fn row_to_manifest_row(row: &rusqlite::Row) -> rusqlite::Result<ManifestRow> {
    Ok(ManifestRow {
        name: row.get(0)?,
        hash: row.get(1)?,
        encryption_key: row.get::<_, i64>(2)? as u64,
    })
}

fn collect_rows(
    rows: impl Iterator<Item = rusqlite::Result<ManifestRow>>,
) -> Result<Vec<ManifestRow>, UmaVoiceError> {
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| UmaVoiceError::Sql("reading manifest row".into(), e))
}
