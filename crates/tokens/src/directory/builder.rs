use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;

use super::{DirectoryConfig, ProviderCache, ProviderDirectory};
use crate::config::{Config, ConfigError, NamespaceConfig};
use crate::descriptor::TokenDescriptor;
use crate::locator::{DynamicLocator, NativeLocator, ProviderLocator, ProviderType};
use crate::provider::NamespaceProvider;
use crate::scanner::TokenScanner;

/// Builder for [`ProviderDirectory`].
///
/// Locators are consulted in this order: the native inventory (unless
/// disabled), the directory's [`DynamicLocator`], then locators added with
/// [`DirectoryBuilder::with_locator`].
pub struct DirectoryBuilder {
	native_inventory: bool,
	locators: Vec<Arc<dyn ProviderLocator>>,
	dynamic: Arc<DynamicLocator>,
	scanner: TokenScanner,
	cache_enabled: bool,
	globals: Vec<String>,
	seeds: FxHashMap<String, Vec<TokenDescriptor>>,
}

impl Default for DirectoryBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl DirectoryBuilder {
	pub fn new() -> Self {
		let defaults = DirectoryConfig::default();
		Self {
			native_inventory: true,
			locators: Vec::new(),
			dynamic: Arc::new(DynamicLocator::new()),
			scanner: TokenScanner::default(),
			cache_enabled: defaults.cache,
			globals: defaults.global_namespaces,
			seeds: FxHashMap::default(),
		}
	}

	/// Whether `inventory`-registered provider types are discoverable.
	pub fn with_native_inventory(mut self, enabled: bool) -> Self {
		self.native_inventory = enabled;
		self
	}

	pub fn with_locator(mut self, locator: Arc<dyn ProviderLocator>) -> Self {
		self.locators.push(locator);
		self
	}

	/// Registers a runtime provider type on the directory's dynamic locator.
	pub fn with_provider_type(self, provider_type: ProviderType) -> Self {
		self.dynamic.register(provider_type);
		self
	}

	pub fn with_scanner(mut self, scanner: TokenScanner) -> Self {
		self.scanner = scanner;
		self
	}

	pub fn cache_enabled(mut self, enabled: bool) -> Self {
		self.cache_enabled = enabled;
		self
	}

	/// Appends a global namespace.
	pub fn global(mut self, namespace: impl Into<String>) -> Self {
		self.globals.push(namespace.into());
		self
	}

	/// Replaces the global namespace list.
	pub fn globals<I, S>(mut self, namespaces: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.globals = namespaces.into_iter().map(Into::into).collect();
		self
	}

	/// Custom tokens added to `namespace`'s provider each time the directory
	/// creates it.
	pub fn custom_tokens(mut self, namespace: &str, tokens: impl IntoIterator<Item = TokenDescriptor>) -> Self {
		self.seeds.entry(namespace.to_ascii_lowercase()).or_default().extend(tokens);
		self
	}

	/// Applies a `[directory]` table.
	pub fn with_directory_config(self, config: &DirectoryConfig) -> Result<Self, ConfigError> {
		let scanner = TokenScanner::new(config.delimiter)?;
		Ok(self
			.with_scanner(scanner)
			.cache_enabled(config.cache)
			.globals(config.global_namespaces.iter().cloned()))
	}

	/// Applies a whole configuration: directory settings, literal namespaces
	/// and custom tokens.
	pub fn with_config(mut self, config: &Config) -> Result<Self, ConfigError> {
		if let Some(directory) = &config.directory {
			self = self.with_directory_config(directory)?;
		}
		for (namespace, namespace_config) in &config.namespaces {
			self = self.with_provider_type(config_provider_type(namespace, namespace_config));
		}
		for (namespace, tokens) in &config.custom {
			self = self.custom_tokens(namespace, tokens.iter().map(|(key, entry)| entry.to_descriptor(key)));
		}
		Ok(self)
	}

	pub fn build(self) -> ProviderDirectory {
		let mut locators: Vec<Arc<dyn ProviderLocator>> = Vec::with_capacity(self.locators.len() + 2);
		if self.native_inventory {
			locators.push(Arc::new(NativeLocator));
		}
		locators.push(Arc::clone(&self.dynamic) as Arc<dyn ProviderLocator>);
		locators.extend(self.locators);

		let directory = ProviderDirectory {
			cache: Mutex::new(ProviderCache {
				providers: FxHashMap::default(),
				enabled: self.cache_enabled,
			}),
			globals: RwLock::new(Default::default()),
			filters: RwLock::new(IndexMap::new()),
			locators: RwLock::new(locators),
			dynamic: self.dynamic,
			seeds: self.seeds,
			scanner: self.scanner,
		};

		for namespace in &self.globals {
			// Failures are logged by register_global.
			let _ = directory.register_global(namespace);
		}
		directory
	}
}

fn config_provider_type(namespace: &str, config: &NamespaceConfig) -> ProviderType {
	let namespace = namespace.to_string();
	let tokens = config.descriptors();
	ProviderType::dynamic(format!("config::{namespace}"), namespace.clone(), move || {
		NamespaceProvider::builder(namespace.as_str()).tokens(tokens.iter().cloned()).build().into_shared()
	})
}
