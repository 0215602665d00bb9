//! Customer configuration file (`.etradecfg`) and the per-user configuration folder.
//!
//! The file is a JSON object keyed by customer id. Each value carries the display name, the
//! production flag, and the consumer key/secret pair issued by the upstream. Unknown fields are
//! ignored and missing fields default to empty strings or `false`; consumer credentials are only
//! validated when a session is built for that customer.

pub mod folder;

pub use folder::ConfigFolder;

// std
use std::{
	collections::btree_map::Entry,
	fs::{self, OpenOptions},
	io::Write,
	path::Path,
};
// self
use crate::{
	_prelude::*,
	auth::{ConsumerKey, CustomerId, Secret},
	error::ConfigError,
};

/// Per-customer profile stored in the configuration file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerProfile {
	/// Free-form name shown in listings.
	#[serde(rename = "customerName")]
	pub display_name: String,
	/// Selects the production endpoints when `true`, sandbox otherwise.
	#[serde(rename = "customerProduction")]
	pub production: bool,
	/// Raw consumer key; see [`CustomerProfile::consumer_key`].
	#[serde(rename = "customerConsumerKey")]
	pub consumer_key: String,
	/// Consumer secret paired with the key.
	#[serde(rename = "customerConsumerSecret")]
	pub consumer_secret: Secret,
}
impl CustomerProfile {
	/// Creates a profile from its four fields.
	pub fn new(
		display_name: impl Into<String>,
		production: bool,
		consumer_key: impl Into<String>,
		consumer_secret: impl Into<Secret>,
	) -> Self {
		Self {
			display_name: display_name.into(),
			production,
			consumer_key: consumer_key.into(),
			consumer_secret: consumer_secret.into(),
		}
	}

	/// Validated consumer key, which also names the credential cache file.
	pub fn consumer_key(&self) -> Result<ConsumerKey, ConfigError> {
		Ok(ConsumerKey::new(&self.consumer_key)?)
	}

	/// Consumer secret; an empty one cannot sign anything and is refused.
	pub fn consumer_secret(&self) -> Result<&Secret, ConfigError> {
		if self.consumer_secret.is_empty() {
			return Err(ConfigError::EmptyConsumerSecret);
		}

		Ok(&self.consumer_secret)
	}
}

/// Listing row for `cfg list` and `GET /customers`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
	/// Customer identifier (configuration key).
	pub customer_id: CustomerId,
	/// Display name from the profile.
	pub customer_name: String,
	/// Whether the profile targets production.
	pub production_access: bool,
}

/// Immutable customer map loaded from the configuration file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigurationStore {
	customers: BTreeMap<CustomerId, CustomerProfile>,
}
impl ConfigurationStore {
	/// Builds a store from in-memory profiles.
	pub fn from_profiles<I>(profiles: I) -> Self
	where
		I: IntoIterator<Item = (CustomerId, CustomerProfile)>,
	{
		Self { customers: profiles.into_iter().collect() }
	}

	/// Reads and parses the configuration file.
	///
	/// A file that is empty or whitespace-only yields an empty store. Customer ids are trimmed;
	/// an entry whose id is still unusable, or repeats an earlier one, is skipped with a warning
	/// so the remaining customers stay available.
	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let bytes = fs::read(path)
			.map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;

		Self::from_slice(path, &bytes)
	}

	fn from_slice(path: &Path, bytes: &[u8]) -> Result<Self, ConfigError> {
		if bytes.iter().all(u8::is_ascii_whitespace) {
			return Ok(Self::default());
		}

		let mut de = serde_json::Deserializer::from_slice(bytes);
		let raw: BTreeMap<String, CustomerProfile> = serde_path_to_error::deserialize(&mut de)
			.map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
		let mut customers = BTreeMap::new();

		for (key, profile) in raw {
			let id = match CustomerId::new(key.trim()) {
				Ok(id) => id,
				Err(e) => {
					tracing::warn!(path = %path.display(), error = %e, "Skipping a customer with an unusable id.");

					continue;
				},
			};

			match customers.entry(id) {
				Entry::Vacant(slot) => {
					slot.insert(profile);
				},
				Entry::Occupied(slot) => {
					tracing::warn!(path = %path.display(), customer = %slot.key(), "Skipping a duplicate customer id.");
				},
			}
		}

		Ok(Self { customers })
	}

	/// Looks up a customer profile; surrounding whitespace in `customer_id` is ignored.
	pub fn get(&self, customer_id: &str) -> Result<&CustomerProfile> {
		self.customers
			.get(customer_id.trim())
			.ok_or_else(|| Error::NotFound { customer_id: customer_id.to_owned() })
	}

	/// Listing rows sorted by customer id.
	pub fn list(&self) -> Vec<CustomerSummary> {
		self.customers
			.iter()
			.map(|(id, profile)| CustomerSummary {
				customer_id: id.clone(),
				customer_name: profile.display_name.clone(),
				production_access: profile.production,
			})
			.collect()
	}

	/// Iterates over configured customers in id order.
	pub fn iter(&self) -> impl Iterator<Item = (&CustomerId, &CustomerProfile)> {
		self.customers.iter()
	}

	/// Number of configured customers.
	pub fn len(&self) -> usize {
		self.customers.len()
	}

	/// Returns `true` when no customer is configured.
	pub fn is_empty(&self) -> bool {
		self.customers.is_empty()
	}

	/// Writes the store as pretty JSON.
	///
	/// Parent directories are created on demand. Without `overwrite` an existing file is left
	/// untouched and [`ConfigError::AlreadyExists`] is returned.
	pub fn save(&self, path: impl AsRef<Path>, overwrite: bool) -> Result<(), ConfigError> {
		let path = path.as_ref();
		let io_err = |source| ConfigError::Io { path: path.to_path_buf(), source };

		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(io_err)?;
		}

		let mut options = OpenOptions::new();

		options.write(true);

		if overwrite {
			options.create(true).truncate(true);
		} else {
			options.create_new(true);
		}

		let mut file = options.open(path).map_err(|source| match source.kind() {
			std::io::ErrorKind::AlreadyExists =>
				ConfigError::AlreadyExists { path: path.to_path_buf() },
			_ => io_err(source),
		})?;
		let mut payload = serde_json::to_vec_pretty(&self.customers)
			.map_err(|e| io_err(std::io::Error::other(e)))?;

		payload.push(b'\n');
		file.write_all(&payload).map_err(io_err)?;

		Ok(())
	}

	/// Template written by `cfg create` for operators to edit.
	pub fn template() -> Result<Self, ConfigError> {
		Ok(Self::from_profiles([
			(
				CustomerId::new("CustomerId1")?,
				CustomerProfile::new("Customer Name 1", true, "consumer key", "consumer secret"),
			),
			(
				CustomerId::new("CustomerId2")?,
				CustomerProfile::new(
					"A human-readable name of your choosing; select this entry with --customerId CustomerId2.",
					false,
					"The consumer key issued by E*TRADE; set customerProduction to match the key's environment.",
					"The consumer secret issued by E*TRADE. Request sandbox keys at https://us.etrade.com/etx/ris/apikey.",
				),
			),
		]))
	}
}
