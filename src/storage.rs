use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// The single locally-stored user record. Plain-text equality check only;
/// signup overwrites whatever was there before.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CredentialRecord {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct Prefs {
    pub dark_mode: bool,
}

/// Small key-value persistence over JSON files in the platform config
/// directory. Holds exactly two records: the credential pair and the UI
/// preferences. Annotations are deliberately not persisted.
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn open() -> Result<Self> {
        let dirs = ProjectDirs::from("", "", "pinmark")
            .ok_or_else(|| anyhow!("cannot resolve a config directory"))?;
        Self::with_dir(dirs.config_dir().to_path_buf())
    }

    pub fn with_dir(dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("cannot create config dir {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn user_path(&self) -> PathBuf {
        self.dir.join("user.json")
    }

    fn prefs_path(&self) -> PathBuf {
        self.dir.join("prefs.json")
    }

    pub fn load_user(&self) -> Option<CredentialRecord> {
        let data = std::fs::read_to_string(self.user_path()).ok()?;
        serde_json::from_str(&data).ok()
    }

    /// Persist the credential pair, replacing any existing record.
    pub fn signup(&self, email: &str, password: &str) -> Result<()> {
        let record = CredentialRecord {
            email: email.to_owned(),
            password: password.to_owned(),
        };
        let data = serde_json::to_string_pretty(&record).context("cannot encode user record")?;
        std::fs::write(self.user_path(), data)
            .with_context(|| format!("cannot write {}", self.user_path().display()))
    }

    /// Equality match against the stored record. Missing or unreadable
    /// record counts as a failed login.
    pub fn login(&self, email: &str, password: &str) -> bool {
        match self.load_user() {
            Some(record) => record.email == email && record.password == password,
            None => false,
        }
    }

    pub fn load_prefs(&self) -> Prefs {
        std::fs::read_to_string(self.prefs_path())
            .ok()
            .and_then(|data| serde_json::from_str(&data).ok())
            .unwrap_or_default()
    }

    pub fn save_prefs(&self, prefs: Prefs) -> Result<()> {
        let data = serde_json::to_string_pretty(&prefs).context("cannot encode prefs")?;
        std::fs::write(self.prefs_path(), data)
            .with_context(|| format!("cannot write {}", self.prefs_path().display()))
    }
}
