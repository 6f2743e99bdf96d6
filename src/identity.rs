//! Persistent identity: the per-installation anonymous id and the optional user id.
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// The identifier pair stamped onto every envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Stable per-installation identifier, generated once and never changed.
    pub anonymous_id: String,
    /// Set by `identify`; persists until explicitly changed.
    pub user_id: Option<String>,
}

/// File-backed store for [`Identity`].
///
/// The anonymous id is generated on first run and persisted forever; the user
/// id is absent until [`IdentityStore::set_user_id`] and persisted from then
/// on. Storage failures degrade to in-memory operation with a warning:
/// identity persistence is not worth breaking the host application over.
pub struct IdentityStore {
    path: PathBuf,
    identity: Mutex<Identity>,
}

impl IdentityStore {
    /// Opens the store at `path`, loading the persisted identity or
    /// generating a fresh anonymous id on first run.
    pub fn open(path: impl Into<PathBuf>) -> IdentityStore {
        let path = path.into();
        let identity = match std::fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(identity) => identity,
                Err(err) => {
                    log::warn!(target: "beacon", "identity file is corrupt, regenerating: {:?}", err);
                    IdentityStore::generate(&path)
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                IdentityStore::generate(&path)
            }
            Err(err) => {
                log::warn!(target: "beacon", "failed to read identity file: {:?}", err);
                IdentityStore::generate(&path)
            }
        };

        IdentityStore {
            path,
            identity: Mutex::new(identity),
        }
    }

    /// Current identity snapshot.
    pub fn snapshot(&self) -> Identity {
        self.identity
            .lock()
            .expect("thread holding identity lock should not panic")
            .clone()
    }

    /// Sets the user id. The new value is persisted before the updated
    /// snapshot is returned, so the identify envelope built from it observes
    /// the anonymous-id linkage atomically.
    pub fn set_user_id(&self, user_id: impl Into<String>) -> Identity {
        let mut identity = self
            .identity
            .lock()
            .expect("thread holding identity lock should not panic");

        identity.user_id = Some(user_id.into());
        IdentityStore::persist(&self.path, &identity);

        identity.clone()
    }

    fn generate(path: &Path) -> Identity {
        let identity = Identity {
            anonymous_id: uuid::Uuid::new_v4().to_string(),
            user_id: None,
        };
        IdentityStore::persist(path, &identity);
        identity
    }

    fn persist(path: &Path, identity: &Identity) {
        let write = || -> std::io::Result<()> {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, serde_json::to_vec(identity)?)
        };

        if let Err(err) = write() {
            log::warn!(target: "beacon", "failed to persist identity: {:?}", err);
        }
    }
}
