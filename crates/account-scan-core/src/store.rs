use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use glob::{Pattern, glob};
use tracing::{debug, warn};

use crate::error::{Result, ScanError};
use crate::model::{ProfileRecord, UserId};

/// File backed store of profile records, one `<id>.json` file per user.
///
/// Records are write-once: [RecordStore::write] never replaces an existing record, so a store
/// only ever grows and a partially completed run can be resumed safely.
#[derive(Debug, Clone)]
pub struct RecordStore {
    root: PathBuf,
}

impl RecordStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, id: UserId) -> PathBuf {
        self.root.join(format!("{id}.json"))
    }

    pub fn exists(&self, id: UserId) -> bool {
        self.path_for(id).is_file()
    }

    pub fn read(&self, id: UserId) -> Result<ProfileRecord> {
        let contents = match fs::read_to_string(self.path_for(id)) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(ScanError::NotFound(id)),
            Err(e) => return Err(e.into()),
        };

        Ok(serde_json::from_str(&contents)?)
    }

    /// Persist `record` under `id` unless a record already exists. Returns whether it was
    /// written.
    pub fn write(&self, id: UserId, record: &ProfileRecord) -> Result<bool> {
        fs::create_dir_all(&self.root)?;

        let path = self.path_for(id);
        if path.exists() {
            debug!(%id, "record already cached, not overwriting");
            return Ok(false);
        }

        // A crash mid-write must not leave a truncated `<id>.json` behind
        let staging = self.root.join(format!("{id}.json.partial"));
        fs::write(&staging, serde_json::to_vec(record)?)?;
        fs::rename(&staging, &path)?;

        debug!(%id, path = %path.display(), "record written");
        Ok(true)
    }

    /// Identifiers of every persisted record, ascending.
    pub fn list_known_ids(&self) -> Result<Vec<UserId>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let pattern = format!(
            "{}/*.json",
            Pattern::escape(&self.root.to_string_lossy())
        );

        let mut ids = Vec::new();
        for entry in glob(&pattern)? {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    warn!(error = %e, "skipping unreadable store entry");
                    continue;
                }
            };

            match path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| stem.parse::<UserId>().ok())
            {
                Some(id) => ids.push(id),
                None => warn!(path = %path.display(), "skipping file that is not a user record"),
            }
        }

        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }

    /// Read the records of `ids` in order, leaving out ids that have no record.
    pub fn read_many(&self, ids: &[UserId]) -> Result<Vec<ProfileRecord>> {
        let mut records = Vec::with_capacity(ids.len());
        for &id in ids {
            match self.read(id) {
                Ok(record) => records.push(record),
                Err(ScanError::NotFound(_)) => debug!(%id, "no cached record, skipping"),
                Err(e) => return Err(e),
            }
        }
        Ok(records)
    }

    /// Read up to `limit` cached records (all of them when `None`) without touching the
    /// network.
    pub fn read_known(&self, limit: Option<usize>) -> Result<Vec<ProfileRecord>> {
        let mut ids = self.list_known_ids()?;
        if let Some(limit) = limit {
            ids.truncate(limit);
        }
        self.read_many(&ids)
    }
}
