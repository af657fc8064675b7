use serde::Serialize;

/// Outcome for one token key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenValue {
	pub key: String,
	/// Namespace as written in the placeholder; empty for bare keys.
	pub provided_namespace: String,
	/// Empty when the token was not evaluated.
	pub value: String,
	pub was_evaluated: bool,
}

impl TokenValue {
	pub fn evaluated(key: impl Into<String>, namespace: impl Into<String>, value: impl Into<String>) -> Self {
		Self {
			key: key.into(),
			provided_namespace: namespace.into(),
			value: value.into(),
			was_evaluated: true,
		}
	}

	pub fn unresolved(key: impl Into<String>, namespace: impl Into<String>) -> Self {
		Self {
			key: key.into(),
			provided_namespace: namespace.into(),
			value: String::new(),
			was_evaluated: false,
		}
	}
}

/// Text before and after evaluation, plus one record per token key seen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EvaluationResult {
	pub original_text: String,
	pub evaluated_text: String,
	pub token_values: Vec<TokenValue>,
}

impl EvaluationResult {
	/// A result that has not substituted anything yet.
	pub fn unchanged(text: impl Into<String>) -> Self {
		let text = text.into();
		Self {
			evaluated_text: text.clone(),
			original_text: text,
			token_values: Vec::new(),
		}
	}

	/// Record for `key`, compared case-sensitively.
	pub fn token(&self, key: &str) -> Option<&TokenValue> {
		self.token_values.iter().find(|value| value.key == key)
	}

	/// True when every recorded token was evaluated.
	pub fn is_fully_evaluated(&self) -> bool {
		self.token_values.iter().all(|value| value.was_evaluated)
	}

	pub fn unresolved(&self) -> impl Iterator<Item = &TokenValue> {
		self.token_values.iter().filter(|value| !value.was_evaluated)
	}

	/// Folds one namespace pass into this accumulated result.
	///
	/// The pass's text becomes the current text. Its records replace earlier
	/// records with the same key outright, even when the earlier record was
	/// evaluated and the new one was not; replaced records keep their position.
	// TODO: only replace records that were not evaluated, once callers no
	// longer depend on last-pass-wins merging.
	pub(crate) fn merge_pass(&mut self, pass: EvaluationResult) {
		self.evaluated_text = pass.evaluated_text;
		for value in pass.token_values {
			match self.token_values.iter_mut().find(|existing| existing.key == value.key) {
				Some(existing) => *existing = value,
				None => self.token_values.push(value),
			}
		}
	}
}
