//! Provider discovery, caching and multi-namespace evaluation.
//!
//! A [`ProviderDirectory`] owns the set of [`ProviderLocator`]s, a cache of
//! instantiated providers keyed by namespace, the global namespaces that every
//! evaluation may include, and per-owner namespace filters. Evaluating a
//! string runs one provider pass per namespace and feeds each pass's text
//! into the next.

mod builder;
mod namespaces;

use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, OnceLock};

use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub use self::builder::DirectoryBuilder;
pub use self::namespaces::NamespaceSet;
use crate::context::{ContextObject, EvaluationContext};
use crate::descriptor::TokenDescriptor;
use crate::error::DirectoryError;
use crate::filter::FilterArgs;
use crate::locator::{DynamicLocator, ProviderLocator, ProviderOrigin, ProviderType};
use crate::name::{check_name, validate_name};
use crate::provider::TokenProvider;
use crate::result::{EvaluationResult, TokenValue};
use crate::scanner::{DEFAULT_DELIMITER, TokenScanner};

/// Namespace registered as global by default.
pub const GLOBAL_NAMESPACE: &str = "global";

/// Callback that may add or remove namespaces before an evaluation.
pub type NamespaceFilter = Arc<dyn Fn(&mut NamespaceSet) + Send + Sync>;

/// Identifies the owner of a namespace filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FilterOwner(String);

impl FilterOwner {
	pub fn new(owner: impl Into<String>) -> Self {
		Self(owner.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl From<&str> for FilterOwner {
	fn from(owner: &str) -> Self {
		Self::new(owner)
	}
}

impl From<String> for FilterOwner {
	fn from(owner: String) -> Self {
		Self(owner)
	}
}

impl fmt::Display for FilterOwner {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Directory settings, as read from the `[directory]` configuration table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DirectoryConfig {
	pub cache: bool,
	pub delimiter: char,
	pub global_namespaces: Vec<String>,
}

impl Default for DirectoryConfig {
	fn default() -> Self {
		Self {
			cache: true,
			delimiter: DEFAULT_DELIMITER,
			global_namespaces: vec![GLOBAL_NAMESPACE.to_string()],
		}
	}
}

/// Lowercased namespace and the origin of the type that produced the provider.
type CacheKey = (String, ProviderOrigin);

struct ProviderCache {
	providers: FxHashMap<CacheKey, Arc<dyn TokenProvider>>,
	enabled: bool,
}

impl ProviderCache {
	fn get(&self, namespace: &str, native_only: bool) -> Option<Arc<dyn TokenProvider>> {
		if !self.enabled {
			return None;
		}
		let native = self.providers.get(&(namespace.to_string(), ProviderOrigin::Native));
		let found = match native {
			Some(provider) => Some(provider),
			None if native_only => None,
			None => self.providers.get(&(namespace.to_string(), ProviderOrigin::Dynamic)),
		};
		found.map(Arc::clone)
	}
}

/// Discovers, caches and composes token providers across namespaces.
///
/// Every method takes `&self`; the directory is shared between threads
/// behind an `Arc` or through [`ProviderDirectory::global`]. No lock is held
/// while a provider evaluates, so provider callbacks and namespace filters
/// may call back into the directory.
pub struct ProviderDirectory {
	cache: Mutex<ProviderCache>,
	globals: RwLock<NamespaceSet>,
	filters: RwLock<IndexMap<FilterOwner, NamespaceFilter>>,
	locators: RwLock<Vec<Arc<dyn ProviderLocator>>>,
	dynamic: Arc<DynamicLocator>,
	/// Custom tokens seeded into providers when the directory creates them.
	seeds: FxHashMap<String, Vec<TokenDescriptor>>,
	scanner: TokenScanner,
}

static GLOBAL: OnceLock<ProviderDirectory> = OnceLock::new();

impl Default for ProviderDirectory {
	fn default() -> Self {
		Self::new()
	}
}

impl ProviderDirectory {
	/// Directory with the native inventory, caching enabled and the
	/// [`GLOBAL_NAMESPACE`] registered as global.
	pub fn new() -> Self {
		Self::builder().build()
	}

	pub fn builder() -> DirectoryBuilder {
		DirectoryBuilder::new()
	}

	/// Process-wide directory, created with [`ProviderDirectory::new`] on first use.
	pub fn global() -> &'static ProviderDirectory {
		GLOBAL.get_or_init(ProviderDirectory::new)
	}

	/// Locator for provider types registered at runtime.
	pub fn dynamic_locator(&self) -> &Arc<DynamicLocator> {
		&self.dynamic
	}

	/// Adds a locator consulted after the ones already registered.
	pub fn add_locator(&self, locator: Arc<dyn ProviderLocator>) {
		self.locators.write().push(locator);
	}

	pub fn scanner(&self) -> &TokenScanner {
		&self.scanner
	}

	/// Fresh evaluation context using this directory's scanner.
	pub fn new_context(&self) -> EvaluationContext {
		EvaluationContext::new().with_scanner(self.scanner.clone())
	}

	/// Returns the provider for `namespace`, creating and caching it on first use.
	///
	/// Native provider types are preferred over dynamic ones; among candidates
	/// of the same origin the first located wins and the rest are reported as
	/// conflicts. With `native_only`, dynamic types are not considered and a
	/// cached dynamic provider is not returned.
	pub fn get_provider(&self, namespace: &str, native_only: bool) -> Option<Arc<dyn TokenProvider>> {
		let folded = namespace.to_ascii_lowercase();
		if let Some(provider) = self.cache.lock().get(&folded, native_only) {
			return Some(provider);
		}

		let provider_type = self.locate(namespace, native_only)?;
		let provider = self.instantiate(&provider_type);

		let mut cache = self.cache.lock();
		if !cache.enabled {
			return Some(provider);
		}
		let cached = cache.providers.entry((folded, provider_type.origin())).or_insert_with(|| {
			debug!(namespace, provider = provider_type.name(), "provider cached");
			provider
		});
		Some(Arc::clone(cached))
	}

	fn locate(&self, namespace: &str, native_only: bool) -> Option<ProviderType> {
		let locators: Vec<Arc<dyn ProviderLocator>> = self.locators.read().clone();
		let mut candidates: Vec<ProviderType> = locators
			.iter()
			.flat_map(|locator| locator.find_provider_types(namespace))
			.filter(|ty| !native_only || ty.is_native())
			.collect();
		candidates.sort_by_key(|ty| !ty.is_native());

		let mut candidates = candidates.into_iter();
		let Some(chosen) = candidates.next() else {
			debug!(namespace, native_only, "no provider type for namespace");
			return None;
		};
		for ignored in candidates {
			warn!(namespace, chosen = chosen.name(), ignored = ignored.name(), "namespace conflict, ignoring provider type");
		}
		Some(chosen)
	}

	fn instantiate(&self, provider_type: &ProviderType) -> Arc<dyn TokenProvider> {
		let provider = provider_type.instantiate();
		let namespace = provider.namespace();

		check_name("namespace", namespace, namespace);
		if !namespace.eq_ignore_ascii_case(provider_type.namespace()) {
			warn!(
				provider = provider_type.name(),
				advertised = provider_type.namespace(),
				namespace,
				"provider namespace differs from its type"
			);
		}
		for token in provider.tokens().defaults() {
			check_name("default token", namespace, token.key());
		}
		if let Some(seed) = self.seeds.get(&namespace.to_ascii_lowercase()) {
			provider.tokens().add_custom_tokens(seed.iter().cloned());
		}

		debug!(namespace, provider = provider_type.name(), origin = ?provider_type.origin(), "provider created");
		provider
	}

	/// Evaluates `text` across every namespace it names plus those added by
	/// filters, `filter.additional_namespaces` and (optionally) the globals.
	///
	/// The context's scanner is used for namespace extraction and for every
	/// pass. Namespaces without a provider are skipped; any placeholder still
	/// in the final text without a record gets an unresolved one, so
	/// [`EvaluationResult::is_fully_evaluated`] reflects every placeholder.
	pub fn evaluate(&self, text: &str, filter: &FilterArgs, context: &EvaluationContext) -> EvaluationResult {
		let namespaces = self.collect_namespaces(text, filter, context.scanner());
		let mut result = EvaluationResult::unchanged(text);

		for namespace in namespaces.iter() {
			let Some(provider) = self.get_provider(namespace, filter.native_only) else {
				debug!(namespace, "skipping namespace without provider");
				continue;
			};
			let pass = provider.evaluate(&result.evaluated_text, context, filter);
			result.merge_pass(pass);
		}

		let scanner = context.scanner();
		for key in scanner.extract_keys(&result.evaluated_text) {
			let (namespace, bare_key) = scanner.split_namespace(&key);
			let recorded = result
				.token_values
				.iter()
				.any(|value| value.key.eq_ignore_ascii_case(bare_key) && value.provided_namespace.eq_ignore_ascii_case(namespace));
			if !recorded {
				debug!(namespace, key = bare_key, "placeholder left unresolved");
				result.token_values.push(TokenValue::unresolved(bare_key, namespace));
			}
		}

		result
	}

	/// Evaluates `text` with a fresh context carrying `contexts`.
	pub fn evaluate_text(&self, text: &str, filter: &FilterArgs, contexts: impl IntoIterator<Item = ContextObject>) -> EvaluationResult {
		let context = self.new_context().with_objects(contexts);
		self.evaluate(text, filter, &context)
	}

	/// Owned-input form of [`ProviderDirectory::evaluate_text`].
	pub fn evaluate_string(&self, text: String, filter: &FilterArgs, contexts: impl IntoIterator<Item = ContextObject>) -> EvaluationResult {
		self.evaluate_text(&text, filter, contexts)
	}

	/// Namespace order for one evaluation: explicit prefixes in `text`, then
	/// filter edits in registration order, then additional namespaces, then
	/// globals in registration order.
	pub fn collect_namespaces(&self, text: &str, filter: &FilterArgs, scanner: &TokenScanner) -> NamespaceSet {
		let mut namespaces: NamespaceSet = scanner.extract_namespaces(text).into_iter().collect();

		let filters: Vec<NamespaceFilter> = self.filters.read().values().cloned().collect();
		for namespace_filter in filters {
			namespace_filter(&mut namespaces);
		}

		namespaces.extend(filter.additional_namespaces.iter().cloned());
		if filter.include_global {
			namespaces.extend(self.global_namespaces());
		}
		namespaces
	}

	/// Sorted namespaces of every provider type the locators know about.
	pub fn get_all_namespaces(&self) -> Vec<String> {
		let locators: Vec<Arc<dyn ProviderLocator>> = self.locators.read().clone();
		let namespaces: BTreeSet<String> = locators
			.iter()
			.flat_map(|locator| locator.provider_types())
			.map(|ty| ty.namespace().to_string())
			.collect();
		namespaces.into_iter().collect()
	}

	/// One `{key} - display name` line per token visible under `filter`.
	///
	/// Global namespaces list bare keys; every other namespace lists
	/// qualified `{namespace:key}` placeholders.
	pub fn get_formatted_tokens_for_display(&self, filter: &FilterArgs) -> String {
		let namespaces = self.collect_namespaces("", filter, &self.scanner);
		let globals = self.globals.read().clone();
		let mut lines = Vec::new();

		for namespace in namespaces.iter() {
			let Some(provider) = self.get_provider(namespace, filter.native_only) else {
				continue;
			};
			let global = globals.contains(namespace);
			for token in provider.tokens().all_tokens() {
				let placeholder = if global {
					TokenScanner::format(token.key())
				} else {
					self.scanner.format_qualified(provider.namespace(), token.key())
				};
				lines.push(format!("{placeholder} - {}", token.display_name()));
			}
		}

		lines.join("\n")
	}

	pub fn clear_cache(&self) {
		self.cache.lock().providers.clear();
		debug!("provider cache cleared");
	}

	/// Enables or disables provider caching. Disabling also clears the cache.
	pub fn set_cache_enabled(&self, enabled: bool) {
		let mut cache = self.cache.lock();
		cache.enabled = enabled;
		if !enabled {
			cache.providers.clear();
		}
		debug!(enabled, "provider cache toggled");
	}

	pub fn is_cache_enabled(&self) -> bool {
		self.cache.lock().enabled
	}

	/// Number of cached providers.
	pub fn cached_len(&self) -> usize {
		self.cache.lock().providers.len()
	}

	/// Adds a namespace included whenever a filter asks for globals.
	pub fn register_global(&self, namespace: &str) -> Result<(), DirectoryError> {
		if let Err(source) = validate_name(namespace) {
			warn!(namespace, error = %source, "rejected global namespace");
			return Err(DirectoryError::InvalidNamespace {
				namespace: namespace.to_string(),
				source,
			});
		}
		if !self.globals.write().insert(namespace) {
			warn!(namespace, "global namespace already registered");
			return Err(DirectoryError::DuplicateGlobal(namespace.to_string()));
		}
		debug!(namespace, "global namespace registered");
		Ok(())
	}

	/// Removes a global namespace. Returns whether it was registered.
	pub fn unregister_global(&self, namespace: &str) -> bool {
		self.globals.write().remove(namespace)
	}

	pub fn global_namespaces(&self) -> Vec<String> {
		self.globals.read().iter().map(str::to_string).collect()
	}

	/// Registers `owner`'s namespace filter, replacing any previous one in place.
	pub fn register_filter<F>(&self, owner: impl Into<FilterOwner>, filter: F)
	where
		F: Fn(&mut NamespaceSet) + Send + Sync + 'static,
	{
		let owner = owner.into();
		debug!(owner = %owner, "namespace filter registered");
		self.filters.write().insert(owner, Arc::new(filter));
	}

	/// Removes `owner`'s filter. Returns whether one was registered.
	pub fn unregister_filter(&self, owner: &FilterOwner) -> bool {
		self.filters.write().shift_remove(owner).is_some()
	}

	/// Unregisters every global and filter and empties the cache.
	pub fn shutdown(&self) {
		self.globals.write().clear();
		self.filters.write().clear();
		self.cache.lock().providers.clear();
		debug!("provider directory shut down");
	}
}

impl fmt::Debug for ProviderDirectory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let cache = self.cache.lock();
		let mut cached: Vec<&CacheKey> = cache.providers.keys().collect();
		cached.sort();
		f.debug_struct("ProviderDirectory")
			.field("cache_enabled", &cache.enabled)
			.field("cached", &cached)
			.field("globals", &*self.globals.read())
			.field("filters", &self.filters.read().keys().collect::<Vec<_>>())
			.field("locators", &self.locators.read().len())
			.field("delimiter", &self.scanner.delimiter())
			.finish()
	}
}
