//! File-backed [`CredentialStore`] writing one owner-only JSON file per consumer key.

// std
use std::{
	fs::{self, OpenOptions},
	io::{ErrorKind, Write},
	path::{Path, PathBuf},
	process,
};
// self
use crate::{
	_prelude::*,
	auth::{CachedCredentials, ConsumerKey},
	config::ConfigFolder,
	store::{CredentialStore, StoreError, StoreFuture},
};

/// Stores credentials under `<folder>/.etrade/.<consumerKey>`.
#[derive(Clone, Debug)]
pub struct FileCredentialStore {
	folder: ConfigFolder,
}
impl FileCredentialStore {
	/// Creates a store rooted at the provided configuration folder.
	pub fn new(folder: ConfigFolder) -> Self {
		Self { folder }
	}

	/// Path of the cache file for `key`.
	pub fn path_for(&self, key: &ConsumerKey) -> PathBuf {
		self.folder.credential_file(key)
	}

	fn load_now(path: &Path) -> CachedCredentials {
		let bytes = match fs::read(path) {
			Ok(bytes) => bytes,
			Err(e) if e.kind() == ErrorKind::NotFound => return CachedCredentials::empty(),
			Err(e) => {
				tracing::warn!(path = %path.display(), error = %e, "Credential cache is unreadable; ignoring it.");

				return CachedCredentials::empty();
			},
		};

		match CachedCredentials::from_slice(&bytes) {
			Ok(credentials) => credentials,
			Err(e) => {
				tracing::warn!(path = %path.display(), error = %e, "Credential cache is corrupt; ignoring it.");

				CachedCredentials::empty()
			},
		}
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create cache directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn persist(path: &Path, credentials: &CachedCredentials) -> Result<(), StoreError> {
		Self::ensure_parent_exists(path)?;

		let serialized =
			serde_json::to_vec_pretty(credentials).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize cached credentials: {e}"),
			})?;
		let tmp_path = Self::tmp_path(path);
		let written = Self::write_owner_only(&tmp_path, &serialized)
			.and_then(|()| {
				fs::rename(&tmp_path, path).map_err(|e| StoreError::Backend {
					message: format!("Failed to replace {}: {e}", path.display()),
				})
			});

		if written.is_err() {
			let _ = fs::remove_file(&tmp_path);
		}

		written
	}

	fn write_owner_only(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
		let mut options = OpenOptions::new();

		options.write(true).create_new(true);

		#[cfg(unix)]
		{
			use std::os::unix::fs::OpenOptionsExt;

			options.mode(0o600);
		}

		let mut file = options.open(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to create {}: {e}", path.display()),
		})?;

		file.write_all(bytes).map_err(|e| StoreError::Backend {
			message: format!("Failed to write {}: {e}", path.display()),
		})?;
		file.sync_all().map_err(|e| StoreError::Backend {
			message: format!("Failed to sync {}: {e}", path.display()),
		})
	}

	fn tmp_path(path: &Path) -> PathBuf {
		let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();

		name.push(format!(
			".{}.{}.tmp",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos()
		));

		path.with_file_name(name)
	}

	fn remove_now(path: &Path) -> Result<(), StoreError> {
		match fs::remove_file(path) {
			Ok(()) => Ok(()),
			Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
			Err(e) => Err(StoreError::Backend {
				message: format!("Failed to remove {}: {e}", path.display()),
			}),
		}
	}
}
impl CredentialStore for FileCredentialStore {
	fn load<'a>(&'a self, key: &'a ConsumerKey) -> StoreFuture<'a, CachedCredentials> {
		Box::pin(async move { Ok(Self::load_now(&self.path_for(key))) })
	}

	fn save<'a>(
		&'a self,
		key: &'a ConsumerKey,
		credentials: CachedCredentials,
	) -> StoreFuture<'a, ()> {
		Box::pin(async move { Self::persist(&self.path_for(key), &credentials) })
	}

	fn remove<'a>(&'a self, key: &'a ConsumerKey) -> StoreFuture<'a, ()> {
		Box::pin(async move { Self::remove_now(&self.path_for(key)) })
	}
}
