//! Provider type discovery.
//!
//! Native provider types are registered at link time with
//! [`token_provider!`](crate::token_provider) and collected through
//! `inventory`. Dynamic types are registered at runtime (plugins,
//! configuration) through a [`DynamicLocator`] or any other
//! [`ProviderLocator`] implementation.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::provider::TokenProvider;

/// Factory producing a fresh provider instance.
pub type ProviderFactory = Arc<dyn Fn() -> Arc<dyn TokenProvider> + Send + Sync>;

/// Link-time registered provider type.
pub struct NativeProviderDef {
	/// Unique type name, `crate::IDENT` when registered via the macro.
	pub name: &'static str,
	pub namespace: &'static str,
	pub construct: fn() -> Arc<dyn TokenProvider>,
}

/// Wrapper for `inventory::collect!`.
pub struct NativeProviderReg(pub &'static NativeProviderDef);

inventory::collect!(NativeProviderReg);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProviderOrigin {
	/// Statically known at link time.
	Native,
	/// Registered at runtime.
	Dynamic,
}

/// A discoverable provider type and the namespace it advertises.
#[derive(Clone)]
pub struct ProviderType {
	name: Cow<'static, str>,
	namespace: Cow<'static, str>,
	origin: ProviderOrigin,
	factory: ProviderFactory,
}

impl ProviderType {
	pub fn native(def: &'static NativeProviderDef) -> Self {
		Self {
			name: Cow::Borrowed(def.name),
			namespace: Cow::Borrowed(def.namespace),
			origin: ProviderOrigin::Native,
			factory: Arc::new(def.construct),
		}
	}

	pub fn dynamic<F>(name: impl Into<Cow<'static, str>>, namespace: impl Into<Cow<'static, str>>, factory: F) -> Self
	where
		F: Fn() -> Arc<dyn TokenProvider> + Send + Sync + 'static,
	{
		Self {
			name: name.into(),
			namespace: namespace.into(),
			origin: ProviderOrigin::Dynamic,
			factory: Arc::new(factory),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Namespace this type claims.
	pub fn namespace(&self) -> &str {
		&self.namespace
	}

	pub fn origin(&self) -> ProviderOrigin {
		self.origin
	}

	pub fn is_native(&self) -> bool {
		self.origin == ProviderOrigin::Native
	}

	pub fn instantiate(&self) -> Arc<dyn TokenProvider> {
		(self.factory)()
	}
}

impl fmt::Debug for ProviderType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ProviderType")
			.field("name", &self.name)
			.field("namespace", &self.namespace)
			.field("origin", &self.origin)
			.finish()
	}
}

/// Source of provider types.
pub trait ProviderLocator: Send + Sync {
	/// Every provider type this locator knows about.
	fn provider_types(&self) -> Vec<ProviderType>;

	/// Provider types claiming `namespace` (ASCII case-insensitive).
	fn find_provider_types(&self, namespace: &str) -> Vec<ProviderType> {
		self.provider_types()
			.into_iter()
			.filter(|ty| ty.namespace().eq_ignore_ascii_case(namespace))
			.collect()
	}
}

/// Locator over `inventory`-registered native provider types.
///
/// Types are reported sorted by name so conflict resolution does not depend
/// on link order.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeLocator;

impl ProviderLocator for NativeLocator {
	fn provider_types(&self) -> Vec<ProviderType> {
		let mut defs: Vec<&'static NativeProviderDef> = inventory::iter::<NativeProviderReg>.into_iter().map(|reg| reg.0).collect();
		defs.sort_by_key(|def| def.name);
		defs.into_iter().map(ProviderType::native).collect()
	}
}

/// Runtime-registered provider types, reported in registration order.
#[derive(Default)]
pub struct DynamicLocator {
	types: RwLock<Vec<ProviderType>>,
}

impl DynamicLocator {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn register(&self, provider_type: ProviderType) {
		tracing::debug!(name = provider_type.name(), namespace = provider_type.namespace(), "provider type registered");
		self.types.write().push(provider_type);
	}

	/// Removes every type registered under `name`. Returns whether any was removed.
	pub fn unregister(&self, name: &str) -> bool {
		let mut types = self.types.write();
		let before = types.len();
		types.retain(|ty| ty.name() != name);
		types.len() != before
	}

	pub fn len(&self) -> usize {
		self.types.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.types.read().is_empty()
	}
}

impl ProviderLocator for DynamicLocator {
	fn provider_types(&self) -> Vec<ProviderType> {
		self.types.read().clone()
	}
}

impl fmt::Debug for DynamicLocator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_list().entries(self.types.read().iter()).finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::provider::NamespaceProvider;

	fn empty(namespace: &'static str) -> impl Fn() -> Arc<dyn TokenProvider> + Send + Sync + 'static {
		move || NamespaceProvider::builder(namespace).build().into_shared()
	}

	#[test]
	fn dynamic_locator_finds_by_namespace_ignoring_case() {
		let locator = DynamicLocator::new();
		locator.register(ProviderType::dynamic("t::a", "Shot", empty("Shot")));
		locator.register(ProviderType::dynamic("t::b", "take", empty("take")));

		let found = locator.find_provider_types("shot");
		assert_eq!(found.len(), 1);
		assert_eq!(found[0].name(), "t::a");
		assert_eq!(found[0].origin(), ProviderOrigin::Dynamic);
		assert_eq!(found[0].instantiate().namespace(), "Shot");
	}

	#[test]
	fn dynamic_locator_unregisters_by_name() {
		let locator = DynamicLocator::new();
		locator.register(ProviderType::dynamic("t::a", "a", empty("a")));
		assert!(locator.unregister("t::a"));
		assert!(!locator.unregister("t::a"));
		assert!(locator.is_empty());
	}

	static NATIVE_DEF: NativeProviderDef = NativeProviderDef {
		name: "test::native",
		namespace: "native",
		construct: || NamespaceProvider::builder("native").build().into_shared(),
	};

	#[test]
	fn native_types_report_origin() {
		let ty = ProviderType::native(&NATIVE_DEF);
		assert!(ty.is_native());
		assert_eq!(ty.namespace(), "native");
		assert_eq!(ty.instantiate().namespace(), "native");
	}
}
