//! Helper definitions kept on disk, one `<id>.json` file per helper.

use crate::helpers::{load_definition, save_definition};
use crate::string::simplify;
use crate::transform::{convert, Action, Format};
use helpercore::{HelperDefinition, HelperError};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const EXTENSION: &str = "json";

/// A directory of stored helper definitions
#[derive(Debug, Clone)]
pub struct HelperStore {
    dir: PathBuf,
}

impl HelperStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Id derived from a display name: simplified, then URI-encoded
    pub fn id_for(name: &str) -> Result<String, HelperError> {
        Ok(convert(&simplify(name), Action::Encode, Format::Uri)?)
    }

    fn path(&self, id: &str) -> Result<PathBuf, HelperError> {
        let unsafe_id = id.is_empty()
            || id.starts_with('.')
            || id.contains(['/', '\\']);
        if unsafe_id {
            return Err(HelperError::InvalidId(id.to_string()));
        }
        Ok(self.dir.join(format!("{}.{}", id, EXTENSION)))
    }

    pub async fn exists(&self, id: &str) -> Result<bool, HelperError> {
        Ok(tokio::fs::try_exists(self.path(id)?).await?)
    }

    /// Start an empty helper named `name` and store it; fails when the
    /// derived id is taken
    pub async fn create(&self, name: &str) -> Result<(String, HelperDefinition), HelperError> {
        let id = Self::id_for(name)?;
        if self.exists(&id).await? {
            return Err(HelperError::AlreadyExists(id));
        }

        let definition = HelperDefinition::new(name);
        self.save(&id, &definition).await?;
        tracing::info!("Created helper {} ({})", id, name);
        Ok((id, definition))
    }

    pub async fn load(&self, id: &str) -> Result<HelperDefinition, HelperError> {
        load_definition(self.path(id)?).await
    }

    pub async fn save(&self, id: &str, definition: &HelperDefinition) -> Result<(), HelperError> {
        let path = self.path(id)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        save_definition(path, definition).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), HelperError> {
        tokio::fs::remove_file(self.path(id)?).await?;
        tracing::debug!("Deleted helper {}", id);
        Ok(())
    }

    /// Store a copy of `id` under the first free `<id>_copy_<n>`, named
    /// `<name> - Copy (<n>)`
    pub async fn duplicate(&self, id: &str) -> Result<(String, HelperDefinition), HelperError> {
        let mut definition = self.load(id).await?;

        let mut index = 1;
        let copy_id = loop {
            let candidate = format!("{}_copy_{}", id, index);
            if !self.exists(&candidate).await? {
                break candidate;
            }
            index += 1;
        };

        definition.name = format!("{} - Copy ({})", definition.name, index);
        self.save(&copy_id, &definition).await?;
        Ok((copy_id, definition))
    }

    /// Ids of every stored helper, sorted; a missing directory holds none
    pub async fn all_ids(&self) -> Result<Vec<String>, HelperError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_definition = entry.file_type().await?.is_file()
                && path.extension().is_some_and(|ext| ext == EXTENSION);
            if !is_definition {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_string());
            }
        }

        ids.sort();
        Ok(ids)
    }

    /// Every stored helper that loads; unreadable files are skipped
    pub async fn all(&self) -> Result<Vec<(String, HelperDefinition)>, HelperError> {
        let mut helpers = Vec::new();
        for id in self.all_ids().await? {
            match self.load(&id).await {
                Ok(definition) => helpers.push((id, definition)),
                Err(e) => tracing::warn!("Skipping helper {}: {}", id, e),
            }
        }
        Ok(helpers)
    }
}
