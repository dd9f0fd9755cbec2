//! Manifest-row and asset-descriptor types shared by the indexer and the
//! story/system pipelines (spec §3).

use std::path::{Path, PathBuf};

/// One row of the ciphered manifest table `a(n, h, e)`.
#[derive(Debug, Clone)]
pub struct ManifestRow {
    pub name: String,
    pub hash: String,
    pub encryption_key: u64,
}

/// Resolve a content hash to its on-disk blob path: `<dat_root>/<hash[0..2]>/<hash>`.
pub fn resolve_blob_path(dat_root: &Path, hash: &str) -> PathBuf {
    let shard = &hash[..hash.len().min(2)];
    dat_root.join(shard).join(hash)
}

/// An immutable, resolved manifest entry: everything the cipher needs to read
/// and decrypt one asset blob.
#[derive(Debug, Clone)]
pub struct AssetDescriptor {
    pub logical_name: String,
    pub content_hash: String,
    pub encryption_key: u64,
    pub resolved_path: PathBuf,
}

impl AssetDescriptor {
    pub fn from_row(row: &ManifestRow, dat_root: &Path) -> Self {
        Self {
            logical_name: row.name.clone(),
            content_hash: row.hash.clone(),
            encryption_key: row.encryption_key,
            resolved_path: resolve_blob_path(dat_root, &row.hash),
        }
    }
}

/// The acb/awb pair for one sheet or voice-sheet-id. Usable iff `acb_path`
/// is present (§3: "a pair is usable iff acb_path is present").
#[derive(Debug, Clone, Default)]
pub struct SheetAudio {
    pub acb_path: Option<PathBuf>,
    pub awb_path: Option<PathBuf>,
}

impl SheetAudio {
    pub fn is_usable(&self) -> bool {
        self.acb_path.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_blob_path_from_hash_prefix() {
        let root = Path::new("/data/dat");
        let path = resolve_blob_path(root, "abcdef0123456789");
        assert_eq!(path, PathBuf::from("/data/dat/ab/abcdef0123456789"));
    }

    #[test]
    fn usable_requires_acb() {
        let mut sheet = SheetAudio::default();
        assert!(!sheet.is_usable());
        sheet.acb_path = Some(PathBuf::from("x.acb"));
        assert!(sheet.is_usable());
    }
}
