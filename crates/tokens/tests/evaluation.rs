use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use moniker_tokens::{
	EvaluationContext, FilterArgs, NamespaceProvider, ProviderDirectory, ProviderType, TokenDescriptor, TokenProvider, TokenScanner,
	TokenValue,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn literal(namespace: &'static str, tokens: &[(&'static str, &'static str)]) -> ProviderType {
	let tokens: Vec<TokenDescriptor> = tokens.iter().map(|&(key, value)| TokenDescriptor::literal(key, value)).collect();
	ProviderType::dynamic(format!("it::{namespace}"), namespace, move || {
		NamespaceProvider::builder(namespace).tokens(tokens.iter().cloned()).build().into_shared()
	})
}

fn directory(globals: &[&str], types: Vec<ProviderType>) -> ProviderDirectory {
	types
		.into_iter()
		.fold(
			ProviderDirectory::builder().with_native_inventory(false).globals(globals.iter().copied()),
			|builder, ty| builder.with_provider_type(ty),
		)
		.build()
}

#[test]
fn hello_user_scenario() {
	let dir = directory(&["g"], vec![literal("g", &[("user", "Ann")])]);
	let result = dir.evaluate_text("Hello {g:user}!", &FilterArgs::default().with_global(true), []);
	assert_eq!(result.evaluated_text, "Hello Ann!");
	assert_eq!(result.token_values, vec![TokenValue::evaluated("user", "g", "Ann")]);
}

#[test]
fn resolved_text_is_a_fixed_point() {
	let dir = directory(&["g"], vec![literal("g", &[("a", "x"), ("b", "y")]), literal("shot", &[("take", "7")])]);
	let filter = FilterArgs::default();
	let once = dir.evaluate_string("{a}_{b}_{shot:take}_{missing}".into(), &filter, []);
	let twice = dir.evaluate_string(once.evaluated_text.clone(), &filter, []);
	assert_eq!(once.evaluated_text, "x_y_7_{missing}");
	assert_eq!(once.evaluated_text, twice.evaluated_text);
	assert_eq!(twice.token_values, vec![TokenValue::unresolved("missing", "")]);
}

#[test]
fn namespaces_are_isolated() {
	let provider = NamespaceProvider::builder("a").token(TokenDescriptor::literal("k", "A")).build();
	let result = provider.evaluate("{b:k}", &EvaluationContext::new(), &FilterArgs::default());
	assert_eq!(result.evaluated_text, "{b:k}");
	assert!(result.token_values.is_empty());
}

#[rstest]
#[case(false, "foo-value")]
#[case(true, "{foo}")]
fn case_insensitive_fallback_and_suppression(#[case] force_case_sensitive: bool, #[case] expected: &str) {
	let dir = directory(&["g"], vec![literal("g", &[("Foo", "foo-value")])]);
	let filter = FilterArgs::default().with_case_sensitive(force_case_sensitive);
	assert_eq!(dir.evaluate_string("{foo}".into(), &filter, []).evaluated_text, expected);
}

#[test]
fn repeated_keys_invoke_the_callback_once() {
	let calls = Arc::new(AtomicUsize::new(0));
	let counter = Arc::clone(&calls);
	let dir = ProviderDirectory::builder()
		.with_native_inventory(false)
		.globals(["g"])
		.with_provider_type(ProviderType::dynamic("it::counting", "g", move || {
			let counter = Arc::clone(&counter);
			NamespaceProvider::builder("g")
				.token(TokenDescriptor::native("n", move |_| {
					counter.fetch_add(1, Ordering::SeqCst);
					"v".to_string()
				}))
				.build()
				.into_shared()
		}))
		.build();

	assert_eq!(dir.evaluate_string("{n}{n}{N}{g:n}".into(), &FilterArgs::default(), []).evaluated_text, "vvvv");
	assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn unknown_keys_pass_through_unevaluated() {
	let dir = directory(&["g"], vec![literal("g", &[("user", "Ann")])]);
	let result = dir.evaluate_text("{unknown_key}", &FilterArgs::default(), []);
	assert_eq!(result.evaluated_text, "{unknown_key}");
	assert_eq!(result.token_values, vec![TokenValue::unresolved("unknown_key", "")]);
	assert!(!result.is_fully_evaluated());
}

#[test]
fn last_pass_wins_for_shared_keys() {
	let dir = directory(&["g1", "g2"], vec![literal("g1", &[("a", "1")]), literal("g2", &[("a", "2")])]);

	// Bare `{a}` is consumed by the first global pass, so the overwrite only
	// shows with qualified placeholders (see "Last-writer-wins scenario" in DESIGN.md).
	let result = dir.evaluate_text("{g1:a}{g2:a}", &FilterArgs::default(), []);
	assert_eq!(result.evaluated_text, "12");
	assert_eq!(result.token("a"), Some(&TokenValue::evaluated("a", "g2", "2")));

	// `{a}` is consumed by the first pass, so only `{b}` reaches the second.
	let result = dir.evaluate_text("{a}{b}", &FilterArgs::default(), []);
	assert_eq!(result.evaluated_text, "1{b}");
	assert_eq!(result.token_values, vec![TokenValue::evaluated("a", "", "1"), TokenValue::unresolved("b", "")]);
}

#[rstest]
#[case(':', "{take}", "take")]
#[case(':', "{ shot:take }", "shot:take")]
#[case('.', "{shot.take}", "shot.take")]
fn scanner_round_trip(#[case] delimiter: char, #[case] text: &str, #[case] key: &str) {
	let scanner = TokenScanner::new(delimiter).expect("valid delimiter");
	let keys = scanner.extract_keys(text);
	assert_eq!(keys, vec![key.to_string()]);
	assert_eq!(scanner.extract_keys(&TokenScanner::format(&keys[0])), keys);
}

#[test]
fn directory_is_shareable_across_threads() {
	let dir = Arc::new(directory(&["g"], vec![literal("g", &[("user", "Ann")])]));
	let handles: Vec<_> = (0..4)
		.map(|i| {
			let dir = Arc::clone(&dir);
			std::thread::spawn(move || dir.evaluate_string(format!("{{user}}-{i}"), &FilterArgs::default(), []).evaluated_text)
		})
		.collect();

	let mut outputs: Vec<String> = handles.into_iter().map(|h| h.join().expect("thread should not panic")).collect();
	outputs.sort();
	assert_eq!(outputs, vec!["Ann-0", "Ann-1", "Ann-2", "Ann-3"]);
	assert_eq!(dir.cached_len(), 1);
}

#[test]
fn provider_trait_objects_expose_their_tables() {
	let dir = directory(&[], vec![literal("shot", &[("take", "7")])]);
	let provider: Arc<dyn TokenProvider> = dir.get_provider("shot", false).expect("provider exists");
	let handle = provider.tokens().register_external(|slot| slot.push(TokenDescriptor::literal("scene", "4")));

	assert_eq!(dir.evaluate_string("{shot:scene}/{shot:take}".into(), &FilterArgs::default(), []).evaluated_text, "4/7");
	assert!(provider.tokens().unregister_external(handle));
	assert_eq!(dir.evaluate_string("{shot:scene}".into(), &FilterArgs::default(), []).evaluated_text, "{shot:scene}");
}
