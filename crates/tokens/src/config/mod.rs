//! TOML configuration for directories and literal token namespaces.
//!
//! ```toml
//! [directory]
//! cache = true
//! delimiter = ":"
//! global_namespaces = ["global"]
//!
//! [namespaces.project.tokens]
//! name = "Apollo"
//! take = { value = "12", display_name = "Take number" }
//!
//! [custom.global]
//! studio = "North"
//! ```
//!
//! `[namespaces.<ns>]` tables define namespaces served by the directory's
//! dynamic locator. `[custom.<ns>]` tables are appended as custom tokens to
//! the provider for `<ns>` whenever the directory creates it.

mod load;

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub use self::load::{CONFIG_FILE, LOCAL_CONFIG_FILE, ConfigLoadReport, load_config_file, load_config_from_dir};
use crate::descriptor::TokenDescriptor;
use crate::directory::DirectoryConfig;
use crate::error::ScannerError;
use crate::name::validate_name;

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("failed to read {}: {source}", path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("TOML parse error: {0}")]
	Parse(#[from] toml::de::Error),

	/// The configured delimiter cannot be used in placeholders.
	#[error(transparent)]
	Scanner(#[from] ScannerError),
}

/// Non-fatal problem found in a parsed configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
	/// A namespace or token key will be rejected by name validation.
	InvalidName {
		/// Table the name appeared in (e.g. "namespaces").
		section: &'static str,
		name: String,
		reason: String,
	},
}

impl fmt::Display for ConfigWarning {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ConfigWarning::InvalidName { section, name, reason } => {
				write!(f, "invalid name {name:?} in [{section}]: {reason}")
			}
		}
	}
}

/// A token value, either bare or with presentation text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TokenEntry {
	Value(String),
	Detailed(TokenDetails),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenDetails {
	pub value: String,
	#[serde(default)]
	pub display_name: String,
	#[serde(default)]
	pub description: String,
}

impl TokenEntry {
	pub fn value(&self) -> &str {
		match self {
			TokenEntry::Value(value) => value,
			TokenEntry::Detailed(details) => &details.value,
		}
	}

	/// Literal descriptor for `key`.
	pub fn to_descriptor(&self, key: &str) -> TokenDescriptor {
		let token = TokenDescriptor::literal(key.to_string(), self.value());
		match self {
			TokenEntry::Value(_) => token,
			TokenEntry::Detailed(details) => token
				.with_display_name(details.display_name.clone())
				.with_description(details.description.clone()),
		}
	}
}

/// A literal-valued namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NamespaceConfig {
	pub tokens: BTreeMap<String, TokenEntry>,
}

impl NamespaceConfig {
	pub fn descriptors(&self) -> Vec<TokenDescriptor> {
		self.tokens.iter().map(|(key, entry)| entry.to_descriptor(key)).collect()
	}
}

/// Parsed `moniker.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	pub directory: Option<DirectoryConfig>,
	pub namespaces: BTreeMap<String, NamespaceConfig>,
	/// Custom tokens per namespace.
	pub custom: BTreeMap<String, BTreeMap<String, TokenEntry>>,
}

impl Config {
	pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(content)?)
	}

	/// Merge another config into this one.
	///
	/// Values from `other` override values in `self`; token tables merge per key.
	pub fn merge(&mut self, other: Config) {
		if other.directory.is_some() {
			self.directory = other.directory;
		}
		for (namespace, config) in other.namespaces {
			self.namespaces.entry(namespace).or_default().tokens.extend(config.tokens);
		}
		for (namespace, tokens) in other.custom {
			self.custom.entry(namespace).or_default().extend(tokens);
		}
	}

	/// Names that registration will report as invalid.
	pub fn warnings(&self) -> Vec<ConfigWarning> {
		let mut warnings = Vec::new();
		let mut check = |section: &'static str, name: &str| {
			if let Err(error) = validate_name(name) {
				warnings.push(ConfigWarning::InvalidName {
					section,
					name: name.to_string(),
					reason: error.to_string(),
				});
			}
		};

		if let Some(directory) = &self.directory {
			for namespace in &directory.global_namespaces {
				check("directory", namespace);
			}
		}
		for (namespace, config) in &self.namespaces {
			check("namespaces", namespace);
			for key in config.tokens.keys() {
				check("namespaces", key);
			}
		}
		for (namespace, tokens) in &self.custom {
			check("custom", namespace);
			for key in tokens.keys() {
				check("custom", key);
			}
		}
		warnings
	}
}

#[cfg(test)]
mod tests;
