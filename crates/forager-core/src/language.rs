//! Teleport-language mirror.
//!
//! The teleport collaborator resolves aetheryte names in its own configured
//! language, which need not match the client. Its JSON configuration holds
//! that choice under a `TeleporterLanguage` key (any casing) as an integer
//! `0..=3`. [`LanguageMirror`] keeps the current value in an atomic so the
//! pipeline can read it without locking, and falls back to the session
//! language whenever the file is missing, unreadable, or holds anything
//! else.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use forager_types::ClientLanguage;
use notify::{Event, EventKind, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Key holding the teleport language in the collaborator's configuration.
pub const TELEPORTER_LANGUAGE_KEY: &str = "teleporterlanguage";

/// Why a teleporter configuration could not supply a language.
#[derive(Debug, thiserror::Error)]
pub enum LanguageError {
    /// The configuration file could not be read.
    #[error("failed to read teleporter config: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The configuration is not valid JSON.
    #[error("failed to parse teleporter config: {source}")]
    Parse {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// The document has no language key.
    #[error("teleporter config has no language setting")]
    Missing,

    /// The language value is not an integer in `0..=3`.
    #[error("unsupported teleporter language value: {value}")]
    Unsupported {
        /// The offending value, as written.
        value: String,
    },

    /// The file-system watcher could not be started.
    #[error("failed to watch teleporter config: {source}")]
    Watch {
        /// The underlying watcher error.
        #[from]
        source: notify::Error,
    },
}

/// Extract the teleport language from a teleporter JSON configuration.
///
/// # Errors
///
/// Returns [`LanguageError`] when the document is not JSON, lacks the key,
/// or holds an unsupported value.
pub fn parse_teleporter_language(json: &str) -> Result<ClientLanguage, LanguageError> {
    let document: serde_json::Value = serde_json::from_str(json)?;
    let value = document
        .as_object()
        .and_then(|object| {
            object
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(TELEPORTER_LANGUAGE_KEY))
        })
        .map(|(_, value)| value)
        .ok_or(LanguageError::Missing)?;
    value
        .as_i64()
        .and_then(ClientLanguage::from_index)
        .ok_or_else(|| LanguageError::Unsupported {
            value: value.to_string(),
        })
}

/// Lock-free holder of the language used for teleport commands.
#[derive(Debug)]
pub struct LanguageMirror {
    session: ClientLanguage,
    current: AtomicU8,
}

impl LanguageMirror {
    /// Mirror that starts at (and falls back to) `session`.
    pub const fn new(session: ClientLanguage) -> Self {
        Self {
            session,
            current: AtomicU8::new(session.index()),
        }
    }

    /// The session language used as fallback.
    pub const fn session(&self) -> ClientLanguage {
        self.session
    }

    /// The language teleport commands should use right now.
    pub fn get(&self) -> ClientLanguage {
        ClientLanguage::from_index(i64::from(self.current.load(Ordering::Acquire)))
            .unwrap_or(self.session)
    }

    /// Replace the current language.
    pub fn set(&self, language: ClientLanguage) {
        self.current.store(language.index(), Ordering::Release);
    }

    /// Return to the session language.
    pub fn reset(&self) {
        self.set(self.session);
    }

    /// Re-read `path` and update the mirror. Any failure resets to the
    /// session language. Returns the language now in effect.
    pub async fn refresh_from_file(&self, path: &Path) -> ClientLanguage {
        let result = match tokio::fs::read_to_string(path).await {
            Ok(contents) => parse_teleporter_language(&contents),
            Err(source) => Err(LanguageError::from(source)),
        };
        match result {
            Ok(language) => {
                if language != self.get() {
                    tracing::info!(?language, "teleport language changed");
                }
                self.set(language);
            }
            Err(error) => {
                tracing::warn!(
                    path = %path.display(),
                    %error,
                    fallback = ?self.session,
                    "teleport language unavailable; using session language"
                );
                self.reset();
            }
        }
        self.get()
    }

    /// Watch `path` and refresh whenever it is written, created, replaced
    /// or removed. Stops when `cancel` fires.
    ///
    /// The parent directory is watched rather than the file itself so that
    /// editors replacing the file atomically are still seen.
    ///
    /// # Errors
    ///
    /// Returns [`LanguageError::Watch`] if the watcher cannot be started.
    pub fn spawn_watcher(
        self: Arc<Self>,
        path: PathBuf,
        cancel: CancellationToken,
    ) -> Result<JoinHandle<()>, LanguageError> {
        let (tx, mut events) = mpsc::unbounded_channel();
        let mut watcher = notify::recommended_watcher(move |event: notify::Result<Event>| {
            // The receiver is gone once the task has stopped.
            let _ = tx.send(event);
        })?;
        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        watcher.watch(&directory, RecursiveMode::NonRecursive)?;
        tracing::debug!(path = %path.display(), "watching teleport configuration");

        Ok(tokio::spawn(async move {
            // Dropping the watcher ends the event stream.
            let _watcher = watcher;
            loop {
                let event = tokio::select! {
                    () = cancel.cancelled() => {
                        tracing::debug!("teleport language watcher stopped");
                        return;
                    }
                    event = events.recv() => event,
                };
                match event {
                    Some(Ok(event)) => {
                        if touches(&event, &path) {
                            self.refresh_from_file(&path).await;
                        }
                    }
                    Some(Err(error)) => {
                        tracing::warn!(%error, "teleport configuration watch error");
                    }
                    None => return,
                }
            }
        }))
    }
}

/// Whether `event` changed the file at `path`.
fn touches(event: &Event, path: &Path) -> bool {
    if matches!(event.kind, EventKind::Access(_)) {
        return false;
    }
    let Some(name) = path.file_name() else {
        return false;
    };
    event
        .paths
        .iter()
        .any(|changed| changed.file_name() == Some(name))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_any_key_casing() {
        assert_eq!(
            parse_teleporter_language(r#"{"TeleporterLanguage": 2}"#).unwrap(),
            ClientLanguage::German
        );
        assert_eq!(
            parse_teleporter_language(r#"{"Other": true, "teleporterLANGUAGE": 1}"#).unwrap(),
            ClientLanguage::Japanese
        );
    }

    #[test]
    fn rejects_missing_and_out_of_range() {
        assert!(matches!(
            parse_teleporter_language(r#"{"Language": 2}"#),
            Err(LanguageError::Missing)
        ));
        assert!(matches!(
            parse_teleporter_language(r#"{"TeleporterLanguage": 7}"#),
            Err(LanguageError::Unsupported { .. })
        ));
        assert!(matches!(
            parse_teleporter_language(r#"{"TeleporterLanguage": "fr"}"#),
            Err(LanguageError::Unsupported { .. })
        ));
        assert!(matches!(
            parse_teleporter_language("not json"),
            Err(LanguageError::Parse { .. })
        ));
    }

    #[tokio::test]
    async fn refresh_falls_back_to_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Teleporter.json");
        let mirror = LanguageMirror::new(ClientLanguage::French);

        std::fs::write(&path, r#"{"TeleporterLanguage": 0}"#).unwrap();
        assert_eq!(mirror.refresh_from_file(&path).await, ClientLanguage::English);

        std::fs::write(&path, r#"{"TeleporterLanguage": 9}"#).unwrap();
        assert_eq!(mirror.refresh_from_file(&path).await, ClientLanguage::French);

        std::fs::write(&path, r#"{"TeleporterLanguage": 3}"#).unwrap();
        mirror.refresh_from_file(&path).await;
        std::fs::remove_file(&path).unwrap();
        assert_eq!(mirror.refresh_from_file(&path).await, ClientLanguage::French);
    }

    #[test]
    fn only_events_on_the_watched_file_count() {
        let path = Path::new("/plugins/Teleporter.json");
        let write = Event::new(EventKind::Modify(notify::event::ModifyKind::Any));
        assert!(touches(&write.clone().add_path("/plugins/Teleporter.json".into()), path));
        assert!(!touches(&write.add_path("/plugins/Other.json".into()), path));
        let read = Event::new(EventKind::Access(notify::event::AccessKind::Any))
            .add_path("/plugins/Teleporter.json".into());
        assert!(!touches(&read, path));
    }

    async fn wait_for(mirror: &LanguageMirror, language: ClientLanguage) {
        for _ in 0..200 {
            if mirror.get() == language {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    }

    #[tokio::test]
    async fn watcher_follows_writes_and_stops_on_cancel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Teleporter.json");
        std::fs::write(&path, r#"{"TeleporterLanguage": 0}"#).unwrap();

        let mirror = Arc::new(LanguageMirror::new(ClientLanguage::English));
        let cancel = CancellationToken::new();
        let handle = Arc::clone(&mirror)
            .spawn_watcher(path.clone(), cancel.clone())
            .unwrap();

        std::fs::write(&path, r#"{"TeleporterLanguage": 1}"#).unwrap();
        wait_for(&mirror, ClientLanguage::Japanese).await;
        assert_eq!(mirror.get(), ClientLanguage::Japanese);

        std::fs::remove_file(&path).unwrap();
        wait_for(&mirror, ClientLanguage::English).await;
        assert_eq!(mirror.get(), ClientLanguage::English);

        cancel.cancel();
        handle.await.unwrap();
    }
}
