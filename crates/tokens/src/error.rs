use std::collections::BTreeSet;

/// Namespace or token key failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
	#[error("name is empty")]
	Empty,

	/// Every distinct disallowed character, in sorted order.
	#[error("name contains invalid characters: {}", format_chars(.0))]
	InvalidCharacters(BTreeSet<char>),
}

/// Scanner construction errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ScannerError {
	/// The namespace delimiter would be ambiguous inside a placeholder.
	#[error("invalid namespace delimiter {0:?}")]
	InvalidDelimiter(char),

	#[error("placeholder pattern failed to compile: {0}")]
	Pattern(#[from] regex::Error),
}

/// Directory registration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectoryError {
	#[error("invalid namespace {namespace:?}: {source}")]
	InvalidNamespace {
		namespace: String,
		#[source]
		source: NameError,
	},

	#[error("global namespace already registered: {0:?}")]
	DuplicateGlobal(String),
}

fn format_chars(chars: &BTreeSet<char>) -> String {
	chars.iter().map(|c| format!("{c:?}")).collect::<Vec<_>>().join(", ")
}
