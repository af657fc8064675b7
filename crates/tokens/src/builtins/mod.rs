//! The `global` namespace: date, time and user tokens.
//!
//! Every time token reads [`TokenScope::now`], so all of them agree on one
//! instant within an evaluation.

use std::sync::Arc;

use chrono::{Datelike, Timelike};

use crate::context::TokenScope;
use crate::descriptor::TokenDescriptor;
use crate::directory::GLOBAL_NAMESPACE;
use crate::provider::{NamespaceProvider, TokenProvider};

crate::token_provider!(GLOBAL_TOKENS, namespace: GLOBAL_NAMESPACE, construct: global_provider);

/// Constructs the builtin `global` provider.
pub fn global_provider() -> Arc<dyn TokenProvider> {
	NamespaceProvider::builder(GLOBAL_NAMESPACE)
		.tokens(time_tokens())
		.token(
			TokenDescriptor::named("user", "user_name")
				.with_display_name("User name")
				.with_description("Login name of the current user"),
		)
		.function("user_name", |_| user_name())
		.build()
		.into_shared()
}

fn time_tokens() -> Vec<TokenDescriptor> {
	vec![
		time_token("yyyy", "Year", |scope| format!("{:04}", scope.now().year())),
		time_token("yy", "Year (2 digits)", |scope| format!("{:02}", scope.now().year().rem_euclid(100))),
		time_token("mm", "Month", |scope| format!("{:02}", scope.now().month())),
		time_token("mon", "Month name", |scope| scope.now().format("%b").to_string()),
		time_token("dd", "Day", |scope| format!("{:02}", scope.now().day())),
		time_token("day", "Weekday name", |scope| scope.now().format("%a").to_string()),
		time_token("hh", "Hour (24h)", |scope| format!("{:02}", scope.now().hour())),
		time_token("hh12", "Hour (12h)", |scope| format!("{:02}", scope.now().hour12().1)),
		time_token("ampm", "AM/PM", |scope| (if scope.now().hour12().0 { "PM" } else { "AM" }).to_string()),
		time_token("min", "Minute", |scope| format!("{:02}", scope.now().minute())),
		time_token("sec", "Second", |scope| format!("{:02}", scope.now().second())),
		time_token("ms", "Millisecond", |scope| format!("{:03}", scope.now().timestamp_subsec_millis() % 1000)),
		time_token("date", "Date (yyyy-mm-dd)", |scope| scope.now().format("%Y-%m-%d").to_string()),
		time_token("time", "Time (hh-min-sec)", |scope| scope.now().format("%H-%M-%S").to_string()),
	]
}

fn time_token<F>(key: &'static str, display_name: &'static str, f: F) -> TokenDescriptor
where
	F: Fn(&TokenScope<'_>) -> String + Send + Sync + 'static,
{
	TokenDescriptor::native(key, f).with_display_name(display_name)
}

fn user_name() -> String {
	["USER", "USERNAME"]
		.into_iter()
		.find_map(|var| std::env::var(var).ok().filter(|name| !name.is_empty()))
		.unwrap_or_else(|| "unknown".to_string())
}
