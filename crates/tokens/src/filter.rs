use serde::{Deserialize, Serialize};

use crate::scanner::CaseSensitivity;

/// Caller options for one evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterArgs {
	/// Namespaces evaluated regardless of whether the text names them.
	pub additional_namespaces: Vec<String>,
	/// Adds the directory's global namespaces.
	pub include_global: bool,
	/// Disables the case-insensitive fallback lookup.
	pub force_case_sensitive: bool,
	/// Restricts provider lookup to link-time registered provider types.
	pub native_only: bool,
}

impl Default for FilterArgs {
	fn default() -> Self {
		Self {
			additional_namespaces: Vec::new(),
			include_global: true,
			force_case_sensitive: false,
			native_only: false,
		}
	}
}

impl FilterArgs {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
		self.additional_namespaces.push(namespace.into());
		self
	}

	pub fn with_namespaces<I, S>(mut self, namespaces: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.additional_namespaces.extend(namespaces.into_iter().map(Into::into));
		self
	}

	pub fn with_global(mut self, include_global: bool) -> Self {
		self.include_global = include_global;
		self
	}

	pub fn with_case_sensitive(mut self, force_case_sensitive: bool) -> Self {
		self.force_case_sensitive = force_case_sensitive;
		self
	}

	pub fn with_native_only(mut self, native_only: bool) -> Self {
		self.native_only = native_only;
		self
	}

	/// Case sensitivity used when substituting resolved placeholders.
	pub fn substitution_case(&self) -> CaseSensitivity {
		if self.force_case_sensitive {
			CaseSensitivity::Sensitive
		} else {
			CaseSensitivity::Insensitive
		}
	}
}
