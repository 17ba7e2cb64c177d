//! File-backed repository of chain definitions.

use std::fs;
use std::path::{Path, PathBuf};

use super::error::StoreError;
use super::model::{is_valid_chain_id, ChainPrompt};

/// Read/write access to saved chains, keyed by chain id.
pub trait ChainRepository {
    fn get(&self, id: &str) -> Result<ChainPrompt, StoreError>;
    fn list(&self) -> Result<Vec<ChainPrompt>, StoreError>;
    /// Persists the chain, replacing any previous version with the same id.
    fn save(&self, chain: &ChainPrompt) -> Result<(), StoreError>;
    fn delete(&self, id: &str) -> Result<(), StoreError>;
}

/// Stores each chain as `<dir>/<id>.yaml`.
///
/// This structure is cheap to create; it only holds the directory path.
#[derive(Debug, Clone)]
pub struct ChainStore {
    dir: PathBuf,
}

impl ChainStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Ids that could escape the store directory are rejected.
    fn chain_path(&self, id: &str) -> Result<PathBuf, StoreError> {
        if !is_valid_chain_id(id) {
            return Err(StoreError::InvalidId(id.to_string()));
        }
        Ok(self.dir.join(format!("{}.yaml", id)))
    }

    /// Looks a chain up by exact id first, then by case-insensitive name.
    pub fn find_chain(&self, id_or_name: &str) -> Result<ChainPrompt, StoreError> {
        if is_valid_chain_id(id_or_name) && self.chain_path(id_or_name)?.exists() {
            return self.get(id_or_name);
        }

        let mut found: Vec<ChainPrompt> = self
            .list()?
            .into_iter()
            .filter(|c| c.name.eq_ignore_ascii_case(id_or_name))
            .collect();

        match found.len() {
            0 => Err(StoreError::NotFound(id_or_name.to_string())),
            1 => Ok(found.remove(0)),
            _ => Err(StoreError::AmbiguousName(id_or_name.to_string())),
        }
    }

    /// Saves a chain that must not exist yet.
    pub fn insert(&self, chain: &ChainPrompt) -> Result<(), StoreError> {
        if self.chain_path(&chain.id)?.exists() {
            return Err(StoreError::AlreadyExists(chain.id.clone()));
        }
        self.save(chain)
    }

    fn read_chain(path: &Path) -> Result<ChainPrompt, StoreError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }
}

impl ChainRepository for ChainStore {
    fn get(&self, id: &str) -> Result<ChainPrompt, StoreError> {
        let path = self.chain_path(id)?;
        if !path.exists() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Self::read_chain(&path)
    }

    fn list(&self) -> Result<Vec<ChainPrompt>, StoreError> {
        let mut chains = Vec::new();
        if !self.dir.exists() {
            return Ok(chains);
        }
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("yaml") {
                match Self::read_chain(&path) {
                    Ok(chain) => chains.push(chain),
                    Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping unreadable chain file"),
                }
            }
        }
        chains.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(chains)
    }

    fn save(&self, chain: &ChainPrompt) -> Result<(), StoreError> {
        let path = self.chain_path(&chain.id)?;
        fs::create_dir_all(&self.dir)?;
        let yaml = serde_yaml::to_string(chain)?;
        fs::write(path, yaml)?;
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        let path = self.chain_path(id)?;
        if !path.exists() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        fs::remove_file(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, ChainStore) {
        let tmp = TempDir::new().unwrap();
        let store = ChainStore::new(tmp.path().join("chains"));
        (tmp, store)
    }

    #[test]
    fn save_and_get_round_trip() {
        let (_tmp, store) = store();
        let chain = ChainPrompt::new("explain", "Explain")
            .variable("topic")
            .step("first", "Explain {{topic}}");
        store.save(&chain).unwrap();
        assert_eq!(store.get("explain").unwrap(), chain);
    }

    #[test]
    fn missing_chain_is_not_found() {
        let (_tmp, store) = store();
        assert!(matches!(store.get("nope"), Err(StoreError::NotFound(_))));
        assert!(matches!(store.delete("nope"), Err(StoreError::NotFound(_))));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn find_by_name_is_case_insensitive() {
        let (_tmp, store) = store();
        store.save(&ChainPrompt::new("a1", "Daily Report")).unwrap();
        store.save(&ChainPrompt::new("b2", "Other")).unwrap();
        assert_eq!(store.find_chain("daily report").unwrap().id, "a1");
        assert_eq!(store.find_chain("b2").unwrap().name, "Other");
    }

    #[test]
    fn duplicate_names_are_ambiguous() {
        let (_tmp, store) = store();
        store.save(&ChainPrompt::new("a1", "Same")).unwrap();
        store.save(&ChainPrompt::new("a2", "same")).unwrap();
        assert!(matches!(store.find_chain("SAME"), Err(StoreError::AmbiguousName(_))));
    }

    #[test]
    fn insert_refuses_to_overwrite() {
        let (_tmp, store) = store();
        let chain = ChainPrompt::new("a1", "First");
        store.insert(&chain).unwrap();
        assert!(matches!(store.insert(&chain), Err(StoreError::AlreadyExists(_))));
    }

    #[test]
    fn list_skips_unreadable_files() {
        let (_tmp, store) = store();
        store.save(&ChainPrompt::new("ok", "Fine")).unwrap();
        fs::write(store.dir().join("broken.yaml"), "steps: [").unwrap();
        fs::write(store.dir().join("notes.txt"), "ignored").unwrap();
        let ids: Vec<_> = store.list().unwrap().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["ok".to_string()]);
    }

    #[test]
    fn delete_removes_the_file() {
        let (_tmp, store) = store();
        store.save(&ChainPrompt::new("gone", "Gone")).unwrap();
        store.delete("gone").unwrap();
        assert!(matches!(store.get("gone"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn ids_cannot_escape_the_store_dir() {
        let (tmp, store) = store();
        let escaping = ChainPrompt::new("../escaped", "x");
        assert!(matches!(store.insert(&escaping), Err(StoreError::InvalidId(_))));
        assert!(matches!(store.save(&escaping), Err(StoreError::InvalidId(_))));
        assert!(!tmp.path().join("escaped.yaml").exists());

        fs::write(tmp.path().join("outside.yaml"), "name: Outside").unwrap();
        assert!(matches!(store.delete("../outside"), Err(StoreError::InvalidId(_))));
        assert!(matches!(store.get("../outside"), Err(StoreError::InvalidId(_))));
        assert!(matches!(store.find_chain("../outside"), Err(StoreError::NotFound(_))));
        assert!(tmp.path().join("outside.yaml").exists());
    }
}
