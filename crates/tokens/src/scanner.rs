//! Placeholder scanning and substitution.
//!
//! A placeholder is `{key}` or `{namespace:key}` with optional whitespace
//! inside the braces. Keys and namespaces use `[A-Za-z0-9_]+`; the namespace
//! delimiter is one configurable character. There is no escape for literal
//! braces.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use rustc_hash::FxHashSet;

use crate::error::ScannerError;
use crate::name::is_name_char;

/// Namespace delimiter used when none is configured.
pub const DEFAULT_DELIMITER: char = ':';

const IDENT: &str = "[A-Za-z0-9_]+";

static DEFAULT_SCANNER: LazyLock<TokenScanner> =
	LazyLock::new(|| TokenScanner::new(DEFAULT_DELIMITER).expect("default delimiter is a valid placeholder delimiter"));

/// How token keys are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaseSensitivity {
	#[default]
	Sensitive,
	/// ASCII case-insensitive.
	Insensitive,
}

impl CaseSensitivity {
	pub fn matches(self, a: &str, b: &str) -> bool {
		match self {
			Self::Sensitive => a == b,
			Self::Insensitive => a.eq_ignore_ascii_case(b),
		}
	}
}

/// Extracts and substitutes placeholders for one delimiter.
#[derive(Debug, Clone)]
pub struct TokenScanner {
	delimiter: char,
	pattern: Regex,
}

impl Default for TokenScanner {
	fn default() -> Self {
		DEFAULT_SCANNER.clone()
	}
}

impl TokenScanner {
	/// Compiles a scanner for `delimiter`.
	///
	/// The delimiter may not be a name character, whitespace or a brace.
	pub fn new(delimiter: char) -> Result<Self, ScannerError> {
		if is_name_char(delimiter) || delimiter.is_whitespace() || matches!(delimiter, '{' | '}') {
			return Err(ScannerError::InvalidDelimiter(delimiter));
		}

		let delim = regex::escape(delimiter.encode_utf8(&mut [0; 4]));
		let pattern = Regex::new(&format!(r"\{{\s*((?:{IDENT}{delim})*{IDENT})\s*\}}"))?;
		Ok(Self { delimiter, pattern })
	}

	/// Scanner for [`DEFAULT_DELIMITER`], compiled once.
	pub fn shared() -> &'static TokenScanner {
		&DEFAULT_SCANNER
	}

	pub const fn delimiter(&self) -> char {
		self.delimiter
	}

	/// Returns every placeholder key in `text`, in order of first appearance.
	///
	/// Keys are deduplicated case-insensitively; the first spelling wins.
	pub fn extract_keys(&self, text: &str) -> Vec<String> {
		let mut seen = FxHashSet::default();
		self.pattern
			.captures_iter(text)
			.filter_map(|caps| caps.get(1))
			.map(|m| m.as_str())
			.filter(|key| seen.insert(key.to_ascii_lowercase()))
			.map(str::to_owned)
			.collect()
	}

	/// Returns the explicit namespace prefixes used in `text`, in order of
	/// first appearance, deduplicated case-insensitively.
	pub fn extract_namespaces(&self, text: &str) -> Vec<String> {
		let mut seen = FxHashSet::default();
		self.extract_keys(text)
			.iter()
			.map(|key| self.split_namespace(key).0)
			.filter(|namespace| !namespace.is_empty() && seen.insert(namespace.to_ascii_lowercase()))
			.map(str::to_owned)
			.collect()
	}

	/// Splits a key on the first delimiter into `(namespace, bare_key)`.
	///
	/// A key without a delimiter has an empty namespace.
	pub fn split_namespace<'k>(&self, key: &'k str) -> (&'k str, &'k str) {
		key.split_once(self.delimiter).unwrap_or(("", key))
	}

	/// Joins a namespace and a bare key with this scanner's delimiter.
	pub fn qualify(&self, namespace: &str, key: &str) -> String {
		format!("{namespace}{}{key}", self.delimiter)
	}

	/// Renders a key in placeholder form: `{key}`.
	pub fn format(key: &str) -> String {
		format!("{{{key}}}")
	}

	/// Renders a namespaced placeholder: `{namespace:key}`.
	pub fn format_qualified(&self, namespace: &str, key: &str) -> String {
		Self::format(&self.qualify(namespace, key))
	}

	/// Replaces each placeholder whose key matches one of `names` with `value`.
	///
	/// All other placeholders are left exactly as written, so later passes can
	/// still see them.
	pub fn substitute<'t>(&self, text: &'t str, names: &[&str], value: &str, case: CaseSensitivity) -> Cow<'t, str> {
		self.pattern.replace_all(text, |caps: &Captures<'_>| {
			if names.iter().any(|name| case.matches(name, &caps[1])) {
				value.to_owned()
			} else {
				caps[0].to_owned()
			}
		})
	}

	/// Returns true when `text` contains at least one placeholder.
	pub fn has_placeholders(&self, text: &str) -> bool {
		self.pattern.is_match(text)
	}
}
