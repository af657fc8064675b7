//! Naming token evaluation.
//!
//! Resolves `{key}` and `{namespace:key}` placeholders embedded in arbitrary
//! strings into computed values. Each namespace is owned by one
//! [`TokenProvider`]; the [`ProviderDirectory`] discovers, caches and composes
//! providers so a single string can draw tokens from many namespaces.
//!
//! ```
//! use moniker_tokens::{FilterArgs, NamespaceProvider, ProviderDirectory, ProviderType, TokenDescriptor};
//!
//! let directory = ProviderDirectory::builder().with_native_inventory(false).build();
//! directory.dynamic_locator().register(ProviderType::dynamic("doc::shot", "shot", || {
//! 	NamespaceProvider::builder("shot")
//! 		.token(TokenDescriptor::literal("take", "12"))
//! 		.build()
//! 		.into_shared()
//! }));
//!
//! let result = directory.evaluate_text("take_{shot:take}", &FilterArgs::default(), []);
//! assert_eq!(result.evaluated_text, "take_12");
//! ```

/// Link-time registered builtin namespaces.
#[cfg(feature = "builtins")]
pub mod builtins;
/// TOML configuration for directories and literal namespaces.
pub mod config;
/// Per-call evaluation state.
pub mod context;
/// Token descriptors and value sources.
pub mod descriptor;
/// Provider discovery, caching and multi-namespace evaluation.
pub mod directory;
/// Error types.
pub mod error;
/// Caller-supplied evaluation filters.
pub mod filter;
/// Provider type discovery.
pub mod locator;
/// Namespace and key validation.
pub mod name;
/// Single-namespace token providers.
pub mod provider;
/// Evaluation output records.
pub mod result;
/// Placeholder scanning and substitution.
pub mod scanner;

pub use config::{Config, ConfigError, ConfigLoadReport, ConfigWarning, NamespaceConfig, TokenEntry, load_config_file, load_config_from_dir};
pub use context::{ContextObject, EvaluationContext, TokenScope};
pub use descriptor::{TokenDescriptor, ValueFn, ValueSource};
pub use directory::{DirectoryBuilder, DirectoryConfig, FilterOwner, GLOBAL_NAMESPACE, NamespaceFilter, NamespaceSet, ProviderDirectory};
pub use error::{DirectoryError, NameError, ScannerError};
pub use filter::FilterArgs;
pub use locator::{DynamicLocator, NativeLocator, NativeProviderDef, NativeProviderReg, ProviderLocator, ProviderOrigin, ProviderType};
pub use name::{is_valid_name, validate_name};
pub use provider::{ExternalHandle, ExternalTokens, NamespaceProvider, NamespaceProviderBuilder, TokenProvider, TokenTables};
pub use result::{EvaluationResult, TokenValue};
pub use scanner::{CaseSensitivity, DEFAULT_DELIMITER, TokenScanner};

#[doc(hidden)]
pub use inventory as __inventory;

/// Registers a native token provider type via `inventory`.
///
/// The constructor must be a `fn() -> Arc<dyn TokenProvider>`. Providers
/// registered this way are visible to every directory that keeps the native
/// inventory locator enabled, and satisfy `native_only` lookups.
#[macro_export]
macro_rules! token_provider {
	($name:ident, namespace: $namespace:expr, construct: $construct:expr $(,)?) => {
		#[allow(non_upper_case_globals)]
		pub static $name: $crate::locator::NativeProviderDef = $crate::locator::NativeProviderDef {
			name: concat!(env!("CARGO_PKG_NAME"), "::", stringify!($name)),
			namespace: $namespace,
			construct: $construct,
		};

		$crate::__inventory::submit! { $crate::locator::NativeProviderReg(&$name) }
	};
}
