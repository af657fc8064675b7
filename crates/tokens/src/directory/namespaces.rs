use std::fmt;

use indexmap::IndexMap;

/// Insertion-ordered set of namespaces, deduplicated ignoring ASCII case.
///
/// The first spelling inserted is kept.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct NamespaceSet {
	entries: IndexMap<String, String>,
}

impl NamespaceSet {
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends `namespace` unless already present. Returns whether it was added.
	pub fn insert(&mut self, namespace: impl Into<String>) -> bool {
		let namespace = namespace.into();
		let folded = namespace.to_ascii_lowercase();
		if self.entries.contains_key(&folded) {
			return false;
		}
		self.entries.insert(folded, namespace);
		true
	}

	/// Removes `namespace`, preserving the order of the rest.
	pub fn remove(&mut self, namespace: &str) -> bool {
		self.entries.shift_remove(&namespace.to_ascii_lowercase()).is_some()
	}

	pub fn contains(&self, namespace: &str) -> bool {
		self.entries.contains_key(&namespace.to_ascii_lowercase())
	}

	pub fn clear(&mut self) {
		self.entries.clear();
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Namespaces in insertion order, as first spelled.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.entries.values().map(String::as_str)
	}

	pub fn to_vec(&self) -> Vec<String> {
		self.entries.values().cloned().collect()
	}
}

impl<S: Into<String>> Extend<S> for NamespaceSet {
	fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
		for namespace in iter {
			self.insert(namespace);
		}
	}
}

impl<S: Into<String>> FromIterator<S> for NamespaceSet {
	fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
		let mut set = Self::new();
		set.extend(iter);
		set
	}
}

impl fmt::Debug for NamespaceSet {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_set().entries(self.iter()).finish()
	}
}
