//! Cookie jar behind the transport. With a session file the jar outlives the
//! process, the way a browser keeps its cookies across a reload; startup
//! reconciliation still decides whether the saved cookie is any good.

use super::errors::ApiError;
use cookie_store::CookieStore;
use reqwest_cookie_store::CookieStoreMutex;
use std::{
    fmt, fs,
    io::{self, BufReader, Write},
    path::{Path, PathBuf},
    sync::{Arc, MutexGuard, PoisonError},
};
use tracing::{debug, warn};

/// Shared cookie jar, optionally backed by a file. Clones share the jar.
#[derive(Clone)]
pub struct SessionJar {
    store: Arc<CookieStoreMutex>,
    path: Option<PathBuf>,
}

impl fmt::Debug for SessionJar {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("SessionJar")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SessionJar {
    /// Jar that lives and dies with the process.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(CookieStoreMutex::new(CookieStore::default())),
            path: None,
        }
    }

    /// Opens the jar saved at `path`. A missing file gives an empty jar; an
    /// unreadable one is logged and overwritten by the next save.
    #[must_use]
    pub fn open(path: PathBuf) -> Self {
        let store = match fs::File::open(&path) {
            Ok(file) => cookie_store::serde::json::load(BufReader::new(file)).unwrap_or_else(|err| {
                warn!(path = %path.display(), error = %err, "ignoring unreadable session file");
                CookieStore::default()
            }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => CookieStore::default(),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "cannot open session file");
                CookieStore::default()
            }
        };

        Self {
            store: Arc::new(CookieStoreMutex::new(store)),
            path: Some(path),
        }
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub(crate) fn provider(&self) -> Arc<CookieStoreMutex> {
        Arc::clone(&self.store)
    }

    /// Number of cookies currently held, expired ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().iter_any().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Writes the jar to its file, session cookies included. Does nothing for
    /// an in-memory jar.
    ///
    /// # Errors
    /// Returns `ApiError::Storage` if the file can't be written.
    pub fn save(&self) -> Result<(), ApiError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let mut contents = Vec::new();
        cookie_store::serde::json::save_incl_expired_and_nonpersistent(&self.lock(), &mut contents)
            .map_err(|err| ApiError::Storage(format!("Failed to encode session cookies: {err}")))?;

        write_private(path, &contents)?;
        debug!(path = %path.display(), "session cookies saved");
        Ok(())
    }

    /// Drops every cookie and saves the empty jar.
    ///
    /// # Errors
    /// Returns `ApiError::Storage` if the file can't be written.
    pub fn clear(&self) -> Result<(), ApiError> {
        self.lock().clear();
        self.save()
    }

    fn lock(&self) -> MutexGuard<'_, CookieStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Default location of the session file, under the user's state directory.
#[must_use]
pub fn default_session_file() -> Option<PathBuf> {
    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .map(|dir| dir.join(env!("CARGO_PKG_NAME")).join("session.json"))
}

/// Replaces `path` with `contents`, readable by the owner only.
fn write_private(path: &Path, contents: &[u8]) -> Result<(), ApiError> {
    let storage_error =
        |err: io::Error| ApiError::Storage(format!("Failed to write {}: {err}", path.display()));

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(storage_error)?;
    }

    let staging = path.with_extension("tmp");
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(&staging).map_err(storage_error)?;
    file.write_all(contents).map_err(storage_error)?;
    file.sync_all().map_err(storage_error)?;
    drop(file);

    fs::rename(&staging, path).map_err(storage_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn jar_with_session(path: PathBuf) -> SessionJar {
        let jar = SessionJar::open(path);
        let url = Url::parse("http://127.0.0.1:5000/login").unwrap();
        jar.lock()
            .parse("session=tok1; Path=/; HttpOnly", &url)
            .unwrap();
        jar
    }

    #[test]
    fn missing_file_is_an_empty_jar() {
        let dir = tempfile::tempdir().unwrap();
        let jar = SessionJar::open(dir.path().join("session.json"));
        assert!(jar.is_empty());
    }

    #[test]
    fn session_cookies_survive_a_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        jar_with_session(path.clone()).save().unwrap();
        assert!(path.exists());

        let reopened = SessionJar::open(path);
        assert_eq!(reopened.len(), 1);
    }

    #[test]
    fn clear_empties_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let jar = jar_with_session(path.clone());
        jar.save().unwrap();
        jar.clear().unwrap();

        assert!(SessionJar::open(path).is_empty());
    }

    #[test]
    fn unreadable_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();

        assert!(SessionJar::open(path).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn saved_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        jar_with_session(path.clone()).save().unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn in_memory_jar_never_touches_disk() {
        let jar = SessionJar::in_memory();
        assert!(jar.path().is_none());
        assert!(jar.save().is_ok());
    }
}
