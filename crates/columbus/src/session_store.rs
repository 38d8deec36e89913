use std::fs;
use std::path::{Path, PathBuf};

use applicant::Identity;
use color_eyre::{Result, eyre::WrapErr};
use tracing::{debug, warn};

/// The signed-in identity, kept between runs as a small JSON file.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `None` when nobody is signed in. An unreadable file counts as signed out.
    pub fn load(&self) -> Result<Option<Identity>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&self.path)
            .wrap_err_with(|| format!("reading {}", self.path.display()))?;
        match serde_json::from_str(&data) {
            Ok(identity) => Ok(Some(identity)),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "discarding corrupt session file");
                Ok(None)
            }
        }
    }

    pub fn save(&self, identity: &Identity) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let data = serde_json::to_vec_pretty(identity)?;
        fs::write(&self.path, data).wrap_err_with(|| format!("writing {}", self.path.display()))?;
        debug!(uid = %identity.uid, "session stored");
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn identity_round_trips_through_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("data").join("session.json"));
        assert_eq!(store.load().unwrap(), None);

        let identity = Identity {
            token: Some("id".into()),
            refresh_token: Some("refresh".into()),
            ..Identity::new("u1", "aru@mail.kz")
        };
        store.save(&identity).unwrap();
        assert_eq!(store.load().unwrap(), Some(identity));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        store.clear().unwrap();
    }

    #[test]
    fn corrupt_file_means_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{").unwrap();
        assert_eq!(SessionStore::new(path).load().unwrap(), None);
    }
}
