use super::utils::ensure_dir;
use std::env;
use std::path::PathBuf;

use crate::api::ChainStore;

/// Environment variable that overrides the home directory.
pub const HOME_ENV: &str = "CHAIN_PROMPT_HOME";

/// Runtime context holding the resolved paths.
pub struct AppCtx {
    pub base_dir: PathBuf,
    pub chains_dir: PathBuf,
    pub config_path: PathBuf,
}

impl AppCtx {
    /// Resolves `$CHAIN_PROMPT_HOME` or `~/.chain-prompt` and makes sure the
    /// directory layout exists.
    pub fn init() -> Result<Self, String> {
        let base_dir = match env::var(HOME_ENV) {
            Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => {
                let home = env::var("HOME")
                    .map_err(|_| "Unable to determine HOME directory".to_string())?;
                PathBuf::from(home).join(".chain-prompt")
            }
        };
        Self::at(base_dir)
    }

    /// Uses `base_dir` as the home directory.
    pub fn at(base_dir: PathBuf) -> Result<Self, String> {
        let chains_dir = base_dir.join("chains");
        let config_path = base_dir.join("config.toml");

        ensure_dir(&base_dir)?;
        ensure_dir(&chains_dir)?;

        Ok(Self {
            base_dir,
            chains_dir,
            config_path,
        })
    }

    pub fn store(&self) -> ChainStore {
        ChainStore::new(self.chains_dir.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_layout() {
        let tmp = tempfile::TempDir::new().unwrap();
        let ctx = AppCtx::at(tmp.path().join("home")).unwrap();
        assert!(ctx.chains_dir.is_dir());
        assert_eq!(ctx.config_path, tmp.path().join("home").join("config.toml"));
        assert_eq!(ctx.store().dir(), ctx.chains_dir.as_path());
    }
}
