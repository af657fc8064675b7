use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Local};
use rustc_hash::FxHashMap;

use super::{TokenProvider, TokenTables};
use crate::context::{EvaluationContext, TokenScope};
use crate::descriptor::{TokenDescriptor, ValueFn};

type ClockFn = Arc<dyn Fn(&EvaluationContext) -> DateTime<Local> + Send + Sync>;

/// General-purpose provider: a namespace, its default tokens, and a static
/// table of named value functions.
pub struct NamespaceProvider {
	tokens: TokenTables,
	functions: FxHashMap<Cow<'static, str>, ValueFn>,
	clock: Option<ClockFn>,
}

impl NamespaceProvider {
	pub fn builder(namespace: impl Into<Box<str>>) -> NamespaceProviderBuilder {
		NamespaceProviderBuilder {
			namespace: namespace.into(),
			defaults: Vec::new(),
			functions: FxHashMap::default(),
			clock: None,
		}
	}

	/// Wraps the provider for sharing through a directory.
	pub fn into_shared(self) -> Arc<dyn TokenProvider> {
		Arc::new(self)
	}
}

impl TokenProvider for NamespaceProvider {
	fn tokens(&self) -> &TokenTables {
		&self.tokens
	}

	fn current_time(&self, context: &EvaluationContext) -> DateTime<Local> {
		match &self.clock {
			Some(clock) => clock(context),
			None => context.timestamp(),
		}
	}

	fn resolve_named_function(&self, name: &str) -> Option<ValueFn> {
		self.functions.get(name).cloned()
	}
}

impl fmt::Debug for NamespaceProvider {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut functions: Vec<_> = self.functions.keys().collect();
		functions.sort();
		f.debug_struct("NamespaceProvider")
			.field("tokens", &self.tokens)
			.field("functions", &functions)
			.field("clock", &self.clock.is_some())
			.finish()
	}
}

/// Builder for [`NamespaceProvider`].
pub struct NamespaceProviderBuilder {
	namespace: Box<str>,
	defaults: Vec<TokenDescriptor>,
	functions: FxHashMap<Cow<'static, str>, ValueFn>,
	clock: Option<ClockFn>,
}

impl NamespaceProviderBuilder {
	/// Adds a default token.
	pub fn token(mut self, token: TokenDescriptor) -> Self {
		self.defaults.push(token);
		self
	}

	pub fn tokens(mut self, tokens: impl IntoIterator<Item = TokenDescriptor>) -> Self {
		self.defaults.extend(tokens);
		self
	}

	/// Registers a value function for [`TokenDescriptor::named`] tokens.
	pub fn function<F>(mut self, name: impl Into<Cow<'static, str>>, f: F) -> Self
	where
		F: Fn(&TokenScope<'_>) -> String + Send + Sync + 'static,
	{
		self.functions.insert(name.into(), Arc::new(f));
		self
	}

	/// Overrides [`TokenProvider::current_time`].
	pub fn clock<F>(mut self, clock: F) -> Self
	where
		F: Fn(&EvaluationContext) -> DateTime<Local> + Send + Sync + 'static,
	{
		self.clock = Some(Arc::new(clock));
		self
	}

	pub fn build(self) -> NamespaceProvider {
		NamespaceProvider {
			tokens: TokenTables::new(self.namespace, self.defaults),
			functions: self.functions,
			clock: self.clock,
		}
	}
}
