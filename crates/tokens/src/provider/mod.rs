//! Single-namespace token providers.
//!
//! A provider owns one namespace and its token tables, and performs one
//! evaluation pass over a string: every placeholder that is bare or qualified
//! with this namespace is looked up, evaluated at most once, and substituted.
//! Placeholders for other namespaces, and keys this provider does not define,
//! are left in the text for later passes.

mod namespace;
mod tables;

use std::sync::Arc;

use chrono::{DateTime, Local};
use rustc_hash::FxHashSet;
use tracing::{debug, trace, warn};

pub use self::namespace::{NamespaceProvider, NamespaceProviderBuilder};
pub use self::tables::{ExternalHandle, ExternalTokens, TokenTables};
use crate::context::{EvaluationContext, TokenScope};
use crate::descriptor::{ValueFn, ValueSource};
use crate::filter::FilterArgs;
use crate::result::{EvaluationResult, TokenValue};

/// Owner of one namespace's tokens.
///
/// Implementors supply their [`TokenTables`]; every hook has a default.
pub trait TokenProvider: Send + Sync {
	fn tokens(&self) -> &TokenTables;

	fn namespace(&self) -> &str {
		self.tokens().namespace()
	}

	/// Called before a pass begins.
	fn pre_evaluate(&self, _context: &EvaluationContext) {}

	/// Called with the finished pass, before it is returned.
	fn post_evaluate(&self, _result: &mut EvaluationResult) {}

	/// Instant used by time-based tokens during this evaluation.
	///
	/// Override to source time from domain state (a recording's start time,
	/// say) rather than the context's captured wall clock.
	fn current_time(&self, context: &EvaluationContext) -> DateTime<Local> {
		context.timestamp()
	}

	/// Resolves a [`ValueSource::Named`] function.
	fn resolve_named_function(&self, _name: &str) -> Option<ValueFn> {
		None
	}

	/// Runs one evaluation pass over `text`.
	fn evaluate(&self, text: &str, context: &EvaluationContext, filter: &FilterArgs) -> EvaluationResult {
		evaluate_pass(self, text, context, filter)
	}
}

impl std::fmt::Debug for dyn TokenProvider {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TokenProvider").field("namespace", &self.namespace()).finish()
	}
}

fn evaluate_pass<P>(provider: &P, text: &str, context: &EvaluationContext, filter: &FilterArgs) -> EvaluationResult
where
	P: TokenProvider + ?Sized,
{
	provider.pre_evaluate(context);

	let scanner = context.scanner();
	let namespace = provider.namespace();
	let mut result = EvaluationResult::unchanged(text);
	let mut processed = FxHashSet::default();

	for key in scanner.extract_keys(text) {
		let (token_namespace, bare_key) = scanner.split_namespace(&key);
		if !token_namespace.is_empty() && !token_namespace.eq_ignore_ascii_case(namespace) {
			continue;
		}
		if !processed.insert(bare_key.to_ascii_lowercase()) {
			continue;
		}

		match resolve_value(provider, bare_key, context, filter) {
			Some(value) => {
				let qualified = scanner.qualify(if token_namespace.is_empty() { namespace } else { token_namespace }, bare_key);
				let substituted = scanner.substitute(&result.evaluated_text, &[bare_key, &qualified], &value, filter.substitution_case());
				result.evaluated_text = substituted.into_owned();
				trace!(namespace, key = bare_key, value = %value, "token evaluated");
				result.token_values.push(TokenValue::evaluated(bare_key, token_namespace, value));
			}
			None => {
				debug!(namespace, key = bare_key, "token unresolved");
				result.token_values.push(TokenValue::unresolved(bare_key, token_namespace));
			}
		}
	}

	provider.post_evaluate(&mut result);
	result
}

fn resolve_value<P>(provider: &P, key: &str, context: &EvaluationContext, filter: &FilterArgs) -> Option<String>
where
	P: TokenProvider + ?Sized,
{
	let token = provider.tokens().lookup(key, filter.force_case_sensitive)?;
	let callback: ValueFn = match token.source() {
		ValueSource::Native(callback) => Arc::clone(callback),
		ValueSource::Named(function) => match provider.resolve_named_function(function) {
			Some(callback) => callback,
			None => {
				warn!(namespace = provider.namespace(), key, function = %function, "token has no resolvable value function");
				return None;
			}
		},
	};

	let now = provider.current_time(context);
	let scope = TokenScope::new(context, provider.namespace(), key, now);
	Some(callback(&scope))
}
