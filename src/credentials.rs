use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::config::Config;
use crate::error::{BoardError, Result};

/// Where the auth token lives. Passed into the network client at construction.
pub trait CredentialProvider: Send + Sync + std::fmt::Debug {
    fn get(&self) -> Option<String>;
    fn set(&self, token: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Token kept on disk at ~/.config/msgboard/token
#[derive(Debug)]
pub struct FileCredentials {
    path: PathBuf,
}

impl FileCredentials {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn default_path() -> Option<PathBuf> {
        let config_dir = dirs::config_dir()?;
        Some(config_dir.join("msgboard").join("token"))
    }
}

impl CredentialProvider for FileCredentials {
    fn get(&self) -> Option<String> {
        let token = std::fs::read_to_string(&self.path).ok()?;
        let token = token.trim().to_string();
        if token.is_empty() {
            None
        } else {
            Some(token)
        }
    }

    fn set(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, token)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Process-lifetime token, never persisted
#[derive(Debug, Default)]
pub struct MemoryCredentials {
    token: Mutex<Option<String>>,
}

impl MemoryCredentials {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: Mutex::new(token),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>> {
        self.token
            .lock()
            .map_err(|_| BoardError::Auth("credential store poisoned".to_string()))
    }
}

impl CredentialProvider for MemoryCredentials {
    fn get(&self) -> Option<String> {
        self.lock().ok()?.clone()
    }

    fn set(&self, token: &str) -> Result<()> {
        *self.lock()? = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.lock()? = None;
        Ok(())
    }
}

/// Pick a credential store:
/// 1. Token from the configured env var (kept in memory only)
/// 2. Token file in the config directory
/// 3. Empty in-memory store when no config directory exists
pub fn load_credentials(config: &Config) -> Arc<dyn CredentialProvider> {
    if let Some(env_var) = &config.auth.token_env {
        if let Ok(token) = std::env::var(env_var) {
            if !token.is_empty() {
                tracing::info!(env_var = %env_var, "using token from environment");
                return Arc::new(MemoryCredentials::new(Some(token)));
            }
        }
    }

    match FileCredentials::default_path() {
        Some(path) => Arc::new(FileCredentials::new(path)),
        None => {
            tracing::warn!("no config directory; login will not persist");
            Arc::new(MemoryCredentials::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_token_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("msgboard-test-{}-{}", name, std::process::id()))
            .join("token")
    }

    #[test]
    fn memory_set_get_clear() {
        let creds = MemoryCredentials::default();
        assert_eq!(creds.get(), None);
        creds.set("abc").unwrap();
        assert_eq!(creds.get().as_deref(), Some("abc"));
        creds.clear().unwrap();
        assert_eq!(creds.get(), None);
    }

    #[test]
    fn file_roundtrip_and_clear() {
        let path = temp_token_path("roundtrip");
        let creds = FileCredentials::new(path.clone());
        assert_eq!(creds.get(), None);

        creds.set("jwt-token").unwrap();
        assert_eq!(creds.get().as_deref(), Some("jwt-token"));

        creds.clear().unwrap();
        assert_eq!(creds.get(), None);
        assert!(!path.exists());

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn file_trims_whitespace_and_ignores_empty() {
        let path = temp_token_path("trim");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();

        std::fs::write(&path, "  tok\n").unwrap();
        let creds = FileCredentials::new(path.clone());
        assert_eq!(creds.get().as_deref(), Some("tok"));

        std::fs::write(&path, "\n").unwrap();
        assert_eq!(creds.get(), None);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn clearing_missing_file_is_ok() {
        let creds = FileCredentials::new(temp_token_path("missing"));
        assert!(creds.clear().is_ok());
    }
}
