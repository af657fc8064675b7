//! Per-call evaluation state.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Local};

use crate::scanner::TokenScanner;

/// Opaque object a caller attaches to an evaluation for providers to inspect.
pub type ContextObject = Arc<dyn Any + Send + Sync>;

/// State shared by every pass of one evaluation.
///
/// The timestamp is captured once so that all time-based tokens resolved in
/// the same call agree on the instant.
#[derive(Clone)]
pub struct EvaluationContext {
	timestamp: DateTime<Local>,
	objects: Vec<ContextObject>,
	scanner: TokenScanner,
}

impl Default for EvaluationContext {
	fn default() -> Self {
		Self::new()
	}
}

impl EvaluationContext {
	/// Captures the current wall-clock time.
	pub fn new() -> Self {
		Self::at(Local::now())
	}

	pub fn at(timestamp: DateTime<Local>) -> Self {
		Self {
			timestamp,
			objects: Vec::new(),
			scanner: TokenScanner::default(),
		}
	}

	pub fn with_object<T: Any + Send + Sync>(mut self, object: T) -> Self {
		self.objects.push(Arc::new(object));
		self
	}

	pub fn with_objects(mut self, objects: impl IntoIterator<Item = ContextObject>) -> Self {
		self.objects.extend(objects);
		self
	}

	pub fn with_scanner(mut self, scanner: TokenScanner) -> Self {
		self.scanner = scanner;
		self
	}

	pub fn timestamp(&self) -> DateTime<Local> {
		self.timestamp
	}

	pub fn objects(&self) -> &[ContextObject] {
		&self.objects
	}

	/// Returns the first context object of type `T`.
	pub fn get<T: Any>(&self) -> Option<&T> {
		self.objects.iter().find_map(|object| (**object).downcast_ref::<T>())
	}

	pub fn scanner(&self) -> &TokenScanner {
		&self.scanner
	}
}

impl fmt::Debug for EvaluationContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("EvaluationContext")
			.field("timestamp", &self.timestamp)
			.field("objects", &self.objects.len())
			.field("delimiter", &self.scanner.delimiter())
			.finish()
	}
}

/// View handed to value callbacks while a token is resolved.
pub struct TokenScope<'a> {
	context: &'a EvaluationContext,
	namespace: &'a str,
	key: &'a str,
	now: DateTime<Local>,
}

impl<'a> TokenScope<'a> {
	pub(crate) fn new(context: &'a EvaluationContext, namespace: &'a str, key: &'a str, now: DateTime<Local>) -> Self {
		Self {
			context,
			namespace,
			key,
			now,
		}
	}

	pub fn context(&self) -> &'a EvaluationContext {
		self.context
	}

	/// Namespace of the provider resolving the token.
	pub fn namespace(&self) -> &'a str {
		self.namespace
	}

	/// Bare key as written in the text.
	pub fn key(&self) -> &'a str {
		self.key
	}

	/// The provider's notion of "now" for this evaluation.
	///
	/// Defaults to the context timestamp; providers may source it from domain
	/// state instead (see [`TokenProvider::current_time`]).
	///
	/// [`TokenProvider::current_time`]: crate::provider::TokenProvider::current_time
	pub fn now(&self) -> DateTime<Local> {
		self.now
	}

	pub fn get<T: Any>(&self) -> Option<&'a T> {
		self.context.get::<T>()
	}
}
