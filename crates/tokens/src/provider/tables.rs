//! Default, custom and external token sets for one namespace.

use std::fmt;
use std::ops::{Deref, DerefMut};

use parking_lot::RwLock;
use slab::Slab;

use crate::descriptor::TokenDescriptor;
use crate::name::check_name;
use crate::scanner::CaseSensitivity;

/// Opaque handle to an external token slot.
///
/// Handles carry a generation, so a handle kept past
/// [`TokenTables::unregister_external`] never aliases a slot reused by a later
/// registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExternalHandle {
	index: usize,
	generation: u64,
}

struct ExternalSlot {
	generation: u64,
	tokens: Vec<TokenDescriptor>,
}

#[derive(Default)]
struct ExternalSlots {
	slots: Slab<ExternalSlot>,
	next_generation: u64,
}

impl ExternalSlots {
	fn get(&self, handle: ExternalHandle) -> Option<&ExternalSlot> {
		self.slots.get(handle.index).filter(|slot| slot.generation == handle.generation)
	}

	fn get_mut(&mut self, handle: ExternalHandle) -> Option<&mut ExternalSlot> {
		self.slots.get_mut(handle.index).filter(|slot| slot.generation == handle.generation)
	}

	fn contains(&self, handle: ExternalHandle) -> bool {
		self.get(handle).is_some()
	}
}

/// Mutable view of one external slot, lent to the closure passed to
/// [`TokenTables::register_external`] or [`TokenTables::with_external`].
///
/// No table lock is held while the closure runs, so it may evaluate or touch
/// other slots of the same provider.
pub struct ExternalTokens<'a> {
	namespace: &'a str,
	tokens: &'a mut Vec<TokenDescriptor>,
}

impl ExternalTokens<'_> {
	/// Appends a token, logging an invalid key.
	pub fn push(&mut self, token: TokenDescriptor) {
		check_name("external token", self.namespace, token.key());
		self.tokens.push(token);
	}

	pub fn extend(&mut self, tokens: impl IntoIterator<Item = TokenDescriptor>) {
		for token in tokens {
			self.push(token);
		}
	}
}

impl Deref for ExternalTokens<'_> {
	type Target = Vec<TokenDescriptor>;

	fn deref(&self) -> &Self::Target {
		self.tokens
	}
}

impl DerefMut for ExternalTokens<'_> {
	fn deref_mut(&mut self) -> &mut Self::Target {
		self.tokens
	}
}

/// Token sets owned by one provider.
///
/// Lookup order is defaults, then custom tokens, then external slots in slot
/// order; the first match wins.
pub struct TokenTables {
	namespace: Box<str>,
	defaults: Vec<TokenDescriptor>,
	custom: RwLock<Vec<TokenDescriptor>>,
	external: RwLock<ExternalSlots>,
}

impl TokenTables {
	/// Creates tables with the provider's default tokens.
	pub fn new(namespace: impl Into<Box<str>>, defaults: Vec<TokenDescriptor>) -> Self {
		Self {
			namespace: namespace.into(),
			defaults,
			custom: RwLock::new(Vec::new()),
			external: RwLock::new(ExternalSlots::default()),
		}
	}

	pub fn namespace(&self) -> &str {
		&self.namespace
	}

	pub fn defaults(&self) -> &[TokenDescriptor] {
		&self.defaults
	}

	pub fn custom_tokens(&self) -> Vec<TokenDescriptor> {
		self.custom.read().clone()
	}

	pub fn add_custom_token(&self, token: TokenDescriptor) {
		check_name("custom token", &self.namespace, token.key());
		self.custom.write().push(token);
	}

	pub fn add_custom_tokens(&self, tokens: impl IntoIterator<Item = TokenDescriptor>) {
		for token in tokens {
			self.add_custom_token(token);
		}
	}

	/// Replaces the custom token set.
	pub fn set_custom_tokens(&self, tokens: Vec<TokenDescriptor>) {
		for token in &tokens {
			check_name("custom token", &self.namespace, token.key());
		}
		*self.custom.write() = tokens;
	}

	/// Opens a new external slot filled by `fill`.
	pub fn register_external(&self, fill: impl FnOnce(&mut ExternalTokens<'_>)) -> ExternalHandle {
		let mut tokens = Vec::new();
		fill(&mut self.lend(&mut tokens));

		let mut external = self.external.write();
		external.next_generation += 1;
		let generation = external.next_generation;
		let index = external.slots.insert(ExternalSlot { generation, tokens });
		tracing::debug!(namespace = %self.namespace, index, generation, "external token slot registered");
		ExternalHandle { index, generation }
	}

	/// Runs `f` on a registered slot, or returns `None` for a stale handle.
	///
	/// The slot is edited on a copy and written back when `f` returns; edits
	/// are dropped if the slot was released in the meantime.
	pub fn with_external<R>(&self, handle: ExternalHandle, f: impl FnOnce(&mut ExternalTokens<'_>) -> R) -> Option<R> {
		let mut tokens = self.external.read().get(handle)?.tokens.clone();
		let output = f(&mut self.lend(&mut tokens));

		match self.external.write().get_mut(handle) {
			Some(slot) => slot.tokens = tokens,
			None => tracing::debug!(namespace = %self.namespace, index = handle.index, "external token slot released during edit"),
		}
		Some(output)
	}

	/// Releases a slot. Returns false when the handle was already released.
	pub fn unregister_external(&self, handle: ExternalHandle) -> bool {
		let mut external = self.external.write();
		if !external.contains(handle) {
			return false;
		}
		external.slots.remove(handle.index);
		tracing::debug!(namespace = %self.namespace, index = handle.index, "external token slot released");
		true
	}

	pub fn is_registered(&self, handle: ExternalHandle) -> bool {
		self.external.read().contains(handle)
	}

	/// Every token in lookup order.
	pub fn all_tokens(&self) -> Vec<TokenDescriptor> {
		let mut tokens = self.defaults.clone();
		tokens.extend(self.custom.read().iter().cloned());
		tokens.extend(self.external.read().slots.iter().flat_map(|(_, slot)| slot.tokens.iter().cloned()));
		tokens
	}

	/// Finds the descriptor for `key`.
	///
	/// Searches case-sensitively first and, unless `force_case_sensitive`,
	/// repeats the same ordered search ignoring ASCII case. The descriptor is
	/// cloned out so no table lock is held while its value is produced.
	pub fn lookup(&self, key: &str, force_case_sensitive: bool) -> Option<TokenDescriptor> {
		self.find(key, CaseSensitivity::Sensitive).or_else(|| {
			if force_case_sensitive {
				None
			} else {
				self.find(key, CaseSensitivity::Insensitive)
			}
		})
	}

	fn find(&self, key: &str, case: CaseSensitivity) -> Option<TokenDescriptor> {
		if let Some(token) = self.defaults.iter().find(|token| token.matches(key, case)) {
			return Some(token.clone());
		}
		if let Some(token) = self.custom.read().iter().find(|token| token.matches(key, case)) {
			return Some(token.clone());
		}
		self.external
			.read()
			.slots
			.iter()
			.find_map(|(_, slot)| slot.tokens.iter().find(|token| token.matches(key, case)))
			.cloned()
	}

	fn lend<'a>(&'a self, tokens: &'a mut Vec<TokenDescriptor>) -> ExternalTokens<'a> {
		ExternalTokens {
			namespace: &self.namespace,
			tokens,
		}
	}
}

impl fmt::Debug for TokenTables {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TokenTables")
			.field("namespace", &self.namespace)
			.field("defaults", &self.defaults.len())
			.field("custom", &self.custom.read().len())
			.field("external_slots", &self.external.read().slots.len())
			.finish()
	}
}
