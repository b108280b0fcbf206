//! Persisted "current user" record and the context containers receive.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::models::{User, UserType};

/// Key the serialized user is stored under
pub const USER_KEY: &str = "user";

/// String key/value storage persisted as a JSON object on disk.
pub struct SessionStorage {
    path: PathBuf,
}

impl SessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("reading session file {}", self.path.display()))?;
        let items = serde_json::from_str(&content)
            .with_context(|| format!("parsing session file {}", self.path.display()))?;
        Ok(items)
    }

    pub fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.read_all()?;
        items.insert(key.to_string(), value.to_string());
        fs::write(&self.path, serde_json::to_string_pretty(&items)?)
            .with_context(|| format!("writing session file {}", self.path.display()))?;
        Ok(())
    }
}

/// The signed-in user, handed to containers at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    user: User,
}

impl Session {
    pub fn new(user: User) -> Self {
        Self { user }
    }

    /// Read the user record, if one has been stored
    pub fn load(storage: &SessionStorage) -> Result<Option<Self>> {
        match storage.get_item(USER_KEY)? {
            Some(raw) => {
                let user: User = serde_json::from_str(&raw).context("decoding stored user")?;
                Ok(Some(Self::new(user)))
            }
            None => Ok(None),
        }
    }

    pub fn save(&self, storage: &SessionStorage) -> Result<()> {
        storage.set_item(USER_KEY, &serde_json::to_string(&self.user)?)
    }

    pub fn email(&self) -> Option<&str> {
        self.user.email.as_deref()
    }

    pub fn is_employee(&self) -> bool {
        self.user.user_type == UserType::Employee
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_means_no_session() {
        let dir = tempfile::tempdir().unwrap();
        let storage = SessionStorage::new(dir.path().join("session.json"));

        assert!(Session::load(&storage).unwrap().is_none());
    }

    #[test]
    fn user_is_stored_as_json_under_the_user_key() {
        let dir = tempfile::tempdir().unwrap();
        let storage = SessionStorage::new(dir.path().join("session.json"));

        Session::new(User::employee("a@a")).save(&storage).unwrap();

        let raw = storage.get_item(USER_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["type"], "Employee");
        assert_eq!(value["email"], "a@a");

        let session = Session::load(&storage).unwrap().unwrap();
        assert!(session.is_employee());
        assert_eq!(session.email(), Some("a@a"));
    }

    #[test]
    fn record_without_email_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let storage = SessionStorage::new(dir.path().join("session.json"));
        storage.set_item(USER_KEY, r#"{"type":"Employee"}"#).unwrap();

        let session = Session::load(&storage).unwrap().unwrap();
        assert!(session.is_employee());
        assert_eq!(session.email(), None);
    }

    #[test]
    fn other_keys_are_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let storage = SessionStorage::new(dir.path().join("session.json"));
        storage.set_item("jwt", "token").unwrap();

        Session::new(User::employee("a@a")).save(&storage).unwrap();

        assert_eq!(storage.get_item("jwt").unwrap().as_deref(), Some("token"));
    }
}
