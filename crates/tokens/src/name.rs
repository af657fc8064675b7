//! Namespace and token key validation.
//!
//! Names are restricted to ASCII alphanumerics and `_`. Validation is
//! advisory: registration paths log violations and keep going, so a provider
//! with an invalid name stays usable but is reported.

use std::collections::BTreeSet;

use crate::error::NameError;

/// Returns true for characters allowed in namespaces and token keys.
pub const fn is_name_char(c: char) -> bool {
	c.is_ascii_alphanumeric() || c == '_'
}

/// Validates a namespace or token key.
pub fn validate_name(name: &str) -> Result<(), NameError> {
	if name.is_empty() {
		return Err(NameError::Empty);
	}

	let invalid: BTreeSet<char> = name.chars().filter(|&c| !is_name_char(c)).collect();
	if invalid.is_empty() {
		Ok(())
	} else {
		Err(NameError::InvalidCharacters(invalid))
	}
}

pub fn is_valid_name(name: &str) -> bool {
	validate_name(name).is_ok()
}

/// Validates `name` and logs a warning when it is rejected.
pub(crate) fn check_name(kind: &'static str, namespace: &str, name: &str) -> bool {
	match validate_name(name) {
		Ok(()) => true,
		Err(error) => {
			tracing::warn!(kind, namespace, name, %error, "invalid token name");
			false
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn accepts_alphanumerics_and_underscore() {
		assert_eq!(validate_name("take_01"), Ok(()));
		assert_eq!(validate_name("_"), Ok(()));
		assert!(is_valid_name("Mmm"));
	}

	#[test]
	fn rejects_empty() {
		assert_eq!(validate_name(""), Err(NameError::Empty));
	}

	#[test]
	fn lists_each_invalid_character_once() {
		let err = validate_name("a-b c-d").unwrap_err();
		assert_eq!(err, NameError::InvalidCharacters(BTreeSet::from([' ', '-'])));
		assert_eq!(err.to_string(), "name contains invalid characters: ' ', '-'");
	}

	#[test]
	fn rejects_non_ascii() {
		assert!(matches!(validate_name("café"), Err(NameError::InvalidCharacters(set)) if set.contains(&'é')));
	}
}
