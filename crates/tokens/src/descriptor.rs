//! Token descriptors.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::context::TokenScope;
use crate::scanner::CaseSensitivity;

/// Native value callback.
///
/// Receives the evaluation scope (context objects, the provider's current
/// time) and returns the token's text.
pub type ValueFn = Arc<dyn Fn(&TokenScope<'_>) -> String + Send + Sync>;

/// Where a token's value comes from.
#[derive(Clone)]
pub enum ValueSource {
	/// Statically bound callback.
	Native(ValueFn),
	/// Function looked up by name on the owning provider at evaluation time.
	///
	/// See [`TokenProvider::resolve_named_function`].
	///
	/// [`TokenProvider::resolve_named_function`]: crate::provider::TokenProvider::resolve_named_function
	Named(Cow<'static, str>),
}

impl fmt::Debug for ValueSource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Native(_) => f.write_str("Native(..)"),
			Self::Named(name) => f.debug_tuple("Named").field(name).finish(),
		}
	}
}

/// One resolvable token.
#[derive(Clone)]
pub struct TokenDescriptor {
	key: Cow<'static, str>,
	display_name: Cow<'static, str>,
	description: Cow<'static, str>,
	source: ValueSource,
}

impl TokenDescriptor {
	/// Creates a token with an explicit value source.
	pub fn new(key: impl Into<Cow<'static, str>>, source: ValueSource) -> Self {
		Self {
			key: key.into(),
			display_name: Cow::Borrowed(""),
			description: Cow::Borrowed(""),
			source,
		}
	}

	/// Creates a token backed by a native callback.
	pub fn native<F>(key: impl Into<Cow<'static, str>>, f: F) -> Self
	where
		F: Fn(&TokenScope<'_>) -> String + Send + Sync + 'static,
	{
		Self::new(key, ValueSource::Native(Arc::new(f)))
	}

	/// Creates a token dispatched to a named provider function.
	pub fn named(key: impl Into<Cow<'static, str>>, function: impl Into<Cow<'static, str>>) -> Self {
		Self::new(key, ValueSource::Named(function.into()))
	}

	/// Creates a token that always evaluates to `value`.
	pub fn literal(key: impl Into<Cow<'static, str>>, value: impl Into<String>) -> Self {
		let value = value.into();
		Self::native(key, move |_| value.clone())
	}

	pub fn with_display_name(mut self, display_name: impl Into<Cow<'static, str>>) -> Self {
		self.display_name = display_name.into();
		self
	}

	pub fn with_description(mut self, description: impl Into<Cow<'static, str>>) -> Self {
		self.description = description.into();
		self
	}

	pub fn key(&self) -> &str {
		&self.key
	}

	/// Display name, falling back to the key when none was given.
	pub fn display_name(&self) -> &str {
		if self.display_name.is_empty() { &self.key } else { &self.display_name }
	}

	pub fn description(&self) -> &str {
		&self.description
	}

	pub fn source(&self) -> &ValueSource {
		&self.source
	}

	pub fn matches(&self, key: &str, case: CaseSensitivity) -> bool {
		case.matches(&self.key, key)
	}
}

impl fmt::Debug for TokenDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TokenDescriptor")
			.field("key", &self.key)
			.field("display_name", &self.display_name)
			.field("source", &self.source)
			.finish()
	}
}
