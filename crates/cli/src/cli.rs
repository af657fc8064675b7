use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use moniker_tokens::FilterArgs;

#[derive(Parser, Debug)]
#[command(name = "moniker")]
#[command(about = "Evaluate naming tokens such as {yyyy} or {shot:take}")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Configuration file (defaults to the user config directory)
	#[arg(long, short = 'c', value_name = "PATH", global = true)]
	pub config: Option<PathBuf>,

	/// Verbose logging
	#[arg(long, short = 'v', global = true)]
	pub verbose: bool,

	/// Subcommand to execute.
	#[command(subcommand)]
	pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
	/// Evaluate the placeholders in TEXT
	Eval {
		/// Text containing `{key}` or `{namespace:key}` placeholders
		text: String,

		#[command(flatten)]
		filter: FilterOpts,

		/// Print the full evaluation result as JSON
		#[arg(long)]
		json: bool,

		/// Exit with status 2 when any placeholder stays unresolved
		#[arg(long)]
		strict: bool,
	},
	/// List the tokens visible under the given filter
	List {
		#[command(flatten)]
		filter: FilterOpts,
	},
	/// List every namespace a provider is known for
	Namespaces,
}

/// Options shared by commands that evaluate or list tokens.
#[derive(Args, Debug, Default, Clone, PartialEq, Eq)]
pub struct FilterOpts {
	/// Extra namespace to evaluate (repeatable)
	#[arg(long = "namespace", short = 'n', value_name = "NS")]
	pub namespaces: Vec<String>,

	/// Skip the global namespaces
	#[arg(long)]
	pub no_global: bool,

	/// Disable the case-insensitive key fallback
	#[arg(long)]
	pub case_sensitive: bool,

	/// Only use providers compiled into the binary
	#[arg(long)]
	pub native_only: bool,
}

impl FilterOpts {
	pub fn to_filter(&self) -> FilterArgs {
		FilterArgs::new()
			.with_namespaces(self.namespaces.iter().cloned())
			.with_global(!self.no_global)
			.with_case_sensitive(self.case_sensitive)
			.with_native_only(self.native_only)
	}
}
