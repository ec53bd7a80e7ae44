//! JSON-file persistence for projects, plus the backup interchange format.
//!
//! The store is a single JSON file holding every project — the desktop-class
//! replacement for the browser database the tool grew up with. It is small
//! on purpose: load the whole list, mutate in memory, write the whole list
//! back atomically (temp file + rename, so a crash mid-write never leaves a
//! truncated store behind).
//!
//! Identity rules:
//!
//! * A project without an `id` is "new, unsaved"; [`ProjectStore::upsert`]
//!   assigns a fresh uuid on first save.
//! * Backup import merges by `id` (upsert): existing projects are replaced,
//!   unknown ones appended — the same semantics a bulk put had.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::CopilotoError;
use crate::model::Project;

/// The backup interchange file: a versioned, timestamped project dump.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Backup {
    pub version: u32,
    /// ISO-8601 creation instant.
    pub timestamp: String,
    pub projects: Vec<Project>,
}

/// Current backup format version.
pub const BACKUP_VERSION: u32 = 1;

/// A file-backed collection of projects.
#[derive(Debug)]
pub struct ProjectStore {
    path: PathBuf,
    projects: Vec<Project>,
}

impl ProjectStore {
    /// Open (or initialise) the store at `path`.
    ///
    /// A missing file is an empty store, not an error — first launch has
    /// nothing to load.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CopilotoError> {
        let path = path.into();
        let projects = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| CopilotoError::CorruptStore {
                path: path.clone(),
                detail: e.to_string(),
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                return Err(CopilotoError::StoreIo {
                    path,
                    source: e,
                })
            }
        };
        debug!(path = %path.display(), count = projects.len(), "opened project store");
        Ok(Self { path, projects })
    }

    /// All projects, most recently touched first.
    pub fn list(&self) -> Vec<&Project> {
        let mut all: Vec<&Project> = self.projects.iter().collect();
        all.sort_by_key(|p| std::cmp::Reverse(p.timestamp));
        all
    }

    pub fn get(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id.as_deref() == Some(id))
    }

    /// Insert or replace a project and persist the store.
    ///
    /// Assigns an id when absent and refreshes the modification timestamp;
    /// returns the stored project's id.
    pub fn upsert(&mut self, mut project: Project) -> Result<String, CopilotoError> {
        let id = match project.id.clone() {
            Some(id) => id,
            None => {
                let id = Uuid::new_v4().to_string();
                project.id = Some(id.clone());
                id
            }
        };
        project.timestamp = Utc::now().timestamp_millis();

        match self.projects.iter_mut().find(|p| p.id.as_deref() == Some(id.as_str())) {
            Some(slot) => *slot = project,
            None => self.projects.push(project),
        }

        self.persist()?;
        info!(id = %id, "project saved");
        Ok(id)
    }

    /// Delete a project by id and persist the store.
    pub fn delete(&mut self, id: &str) -> Result<(), CopilotoError> {
        let before = self.projects.len();
        self.projects.retain(|p| p.id.as_deref() != Some(id));
        if self.projects.len() == before {
            return Err(CopilotoError::ProjectNotFound { id: id.to_string() });
        }
        self.persist()
    }

    /// Dump every project into a backup document.
    pub fn export_backup(&self) -> Backup {
        Backup {
            version: BACKUP_VERSION,
            timestamp: Utc::now().to_rfc3339(),
            projects: self.projects.clone(),
        }
    }

    /// Merge a backup into the store (upsert by id); returns how many
    /// projects were imported.
    ///
    /// Backup projects without an id are treated as new and get one — an
    /// edited or hand-built backup should not be able to collide everything
    /// onto a missing key.
    pub fn import_backup(&mut self, backup: Backup) -> Result<usize, CopilotoError> {
        if backup.version != BACKUP_VERSION {
            return Err(CopilotoError::InvalidBackup(format!(
                "unsupported version {} (expected {BACKUP_VERSION})",
                backup.version
            )));
        }

        let count = backup.projects.len();
        for mut incoming in backup.projects {
            if incoming.id.is_none() {
                incoming.id = Some(Uuid::new_v4().to_string());
            }
            let id = incoming.id.clone();
            match self
                .projects
                .iter_mut()
                .find(|p| p.id.is_some() && p.id == id)
            {
                Some(slot) => *slot = incoming,
                None => self.projects.push(incoming),
            }
        }

        self.persist()?;
        info!(count, "backup imported");
        Ok(count)
    }

    /// Parse a backup file's contents, validating the envelope.
    pub fn parse_backup(raw: &str) -> Result<Backup, CopilotoError> {
        let value: serde_json::Value = serde_json::from_str(raw)
            .map_err(|e| CopilotoError::InvalidBackup(e.to_string()))?;
        if !value.get("projects").map(serde_json::Value::is_array).unwrap_or(false) {
            return Err(CopilotoError::InvalidBackup(
                "missing 'projects' array".to_string(),
            ));
        }
        serde_json::from_value(value).map_err(|e| CopilotoError::InvalidBackup(e.to_string()))
    }

    /// Atomic write: serialise to a sibling temp file, then rename over the
    /// store so readers never observe a partial file.
    fn persist(&self) -> Result<(), CopilotoError> {
        let io_err = |e: std::io::Error| CopilotoError::StoreIo {
            path: self.path.clone(),
            source: e,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let json = serde_json::to_string_pretty(&self.projects).map_err(|e| {
            CopilotoError::CorruptStore {
                path: self.path.clone(),
                detail: e.to_string(),
            }
        })?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> ProjectStore {
        ProjectStore::open(dir.path().join("projects.json")).unwrap()
    }

    fn named(name: &str) -> Project {
        Project {
            nombre_proyecto: name.into(),
            ..Project::default()
        }
    }

    #[test]
    fn missing_file_is_an_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store_in(&dir).list().is_empty());
    }

    #[test]
    fn upsert_assigns_id_on_first_save() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        let id = store.upsert(named("Huerto")).unwrap();
        assert!(!id.is_empty());

        let stored = store.get(&id).unwrap();
        assert_eq!(stored.nombre_proyecto, "Huerto");
        assert!(stored.timestamp > 0);
    }

    #[test]
    fn upsert_replaces_by_id() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        let id = store.upsert(named("Huerto")).unwrap();

        let mut edited = store.get(&id).unwrap().clone();
        edited.nombre_proyecto = "Huerto Escolar".into();
        store.upsert(edited).unwrap();

        assert_eq!(store.list().len(), 1);
        assert_eq!(store.get(&id).unwrap().nombre_proyecto, "Huerto Escolar");
    }

    #[test]
    fn store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("projects.json");
        let id = {
            let mut store = ProjectStore::open(&path).unwrap();
            store.upsert(named("Persistente")).unwrap()
        };
        let reopened = ProjectStore::open(&path).unwrap();
        assert_eq!(reopened.get(&id).unwrap().nombre_proyecto, "Persistente");
    }

    #[test]
    fn delete_unknown_id_errors() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        assert!(matches!(
            store.delete("nope"),
            Err(CopilotoError::ProjectNotFound { .. })
        ));
    }

    #[test]
    fn backup_round_trip_merges_by_id() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = store_in(&dir);
        source.upsert(named("A")).unwrap();
        source.upsert(named("B")).unwrap();
        let backup = source.export_backup();
        assert_eq!(backup.version, BACKUP_VERSION);

        let dir2 = tempfile::tempdir().unwrap();
        let mut target = store_in(&dir2);
        target.upsert(named("C")).unwrap();

        let imported = target.import_backup(backup.clone()).unwrap();
        assert_eq!(imported, 2);
        assert_eq!(target.list().len(), 3);

        // Importing again replaces rather than duplicates.
        target.import_backup(backup).unwrap();
        assert_eq!(target.list().len(), 3);
    }

    #[test]
    fn backup_version_is_checked() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        let bad = Backup {
            version: 99,
            timestamp: Utc::now().to_rfc3339(),
            projects: vec![],
        };
        assert!(matches!(
            store.import_backup(bad),
            Err(CopilotoError::InvalidBackup(_))
        ));
    }

    #[test]
    fn parse_backup_requires_projects_array() {
        assert!(ProjectStore::parse_backup(r#"{"version":1}"#).is_err());
        assert!(ProjectStore::parse_backup("no json").is_err());
        let ok = ProjectStore::parse_backup(
            r#"{"version":1,"timestamp":"2026-01-01T00:00:00Z","projects":[]}"#,
        )
        .unwrap();
        assert!(ok.projects.is_empty());
    }

    #[test]
    fn corrupt_store_is_reported_with_detail() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("projects.json");
        fs::write(&path, "{{{{").unwrap();
        assert!(matches!(
            ProjectStore::open(&path),
            Err(CopilotoError::CorruptStore { .. })
        ));
    }
}
