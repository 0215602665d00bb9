//! Paths of the two persisted files under the per-user configuration folder.

// std
use std::path::{Path, PathBuf};
// crates.io
use directories::BaseDirs;
// self
use crate::{auth::ConsumerKey, error::ConfigError};

const CONFIG_FILE_NAME: &str = ".etradecfg";
const CACHE_DIR_NAME: &str = ".etrade";

/// Root folder holding `.etradecfg` and the `.etrade/` credential cache directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigFolder(PathBuf);
impl ConfigFolder {
	/// Uses an explicit folder.
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self(root.into())
	}

	/// Uses the current user's home directory.
	pub fn from_home() -> Result<Self, ConfigError> {
		BaseDirs::new()
			.map(|dirs| Self(dirs.home_dir().to_path_buf()))
			.ok_or(ConfigError::MissingHomeDirectory)
	}

	/// Uses `root` when supplied, otherwise the home directory.
	pub fn resolve(root: Option<PathBuf>) -> Result<Self, ConfigError> {
		match root {
			Some(root) => Ok(Self::new(root)),
			None => Self::from_home(),
		}
	}

	/// Folder root.
	pub fn root(&self) -> &Path {
		&self.0
	}

	/// `<root>/.etradecfg`.
	pub fn config_file(&self) -> PathBuf {
		self.0.join(CONFIG_FILE_NAME)
	}

	/// `<root>/.etrade`.
	pub fn cache_dir(&self) -> PathBuf {
		self.0.join(CACHE_DIR_NAME)
	}

	/// `<root>/.etrade/.<consumerKey>`.
	pub fn credential_file(&self, consumer_key: &ConsumerKey) -> PathBuf {
		self.cache_dir().join(format!(".{consumer_key}"))
	}
}
