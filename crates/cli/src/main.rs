//! `moniker` command-line tool.
//!
//! Evaluates naming token placeholders using the builtin providers plus any
//! namespaces defined in `moniker.toml`.

mod cli;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use moniker_tokens::{Config, ProviderDirectory, load_config_file, load_config_from_dir};
use tracing::{debug, warn};

use crate::cli::{Cli, Command};

/// Exit status for `eval --strict` when placeholders remain.
const EXIT_UNRESOLVED: u8 = 2;

fn main() -> anyhow::Result<ExitCode> {
	let cli = Cli::parse();
	setup_tracing(cli.verbose);

	let config = load_config(cli.config.as_deref())?;
	let directory = build_directory(config.as_ref())?;
	Ok(ExitCode::from(run(&directory, cli.command)?))
}

/// Runs one subcommand and returns the process exit status.
fn run(directory: &ProviderDirectory, command: Command) -> anyhow::Result<u8> {
	match command {
		Command::Eval { text, filter, json, strict } => {
			let result = directory.evaluate_text(&text, &filter.to_filter(), []);
			if json {
				println!("{}", serde_json::to_string_pretty(&result)?);
			} else {
				println!("{}", result.evaluated_text);
			}

			if strict && !result.is_fully_evaluated() {
				for token in result.unresolved() {
					eprintln!("unresolved token: {}", token.key);
				}
				return Ok(EXIT_UNRESOLVED);
			}
		}
		Command::List { filter } => {
			let listing = directory.get_formatted_tokens_for_display(&filter.to_filter());
			if !listing.is_empty() {
				println!("{listing}");
			}
		}
		Command::Namespaces => {
			for namespace in directory.get_all_namespaces() {
				println!("{namespace}");
			}
		}
	}
	Ok(0)
}

/// Loads the explicit config file, or the layered user config when none is given.
fn load_config(explicit: Option<&Path>) -> anyhow::Result<Option<Config>> {
	if let Some(path) = explicit {
		let config = load_config_file(path).with_context(|| format!("loading {}", path.display()))?;
		for warning in config.warnings() {
			warn!(path = %path.display(), %warning, "config warning");
		}
		return Ok(Some(config));
	}

	let Some(dir) = default_config_dir() else {
		debug!("no user config directory");
		return Ok(None);
	};
	let report = load_config_from_dir(&dir);
	for (path, error) in &report.errors {
		eprintln!("moniker: ignoring {}: {error}", path.display());
	}
	Ok(report.config)
}

fn default_config_dir() -> Option<PathBuf> {
	dirs::config_dir().map(|dir| dir.join("moniker"))
}

fn build_directory(config: Option<&Config>) -> anyhow::Result<ProviderDirectory> {
	let builder = ProviderDirectory::builder();
	let builder = match config {
		Some(config) => builder.with_config(config).context("applying configuration")?,
		None => builder,
	};
	Ok(builder.build())
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;
	use tracing_subscriber::prelude::*;

	let filter = EnvFilter::try_from_env("MONIKER_LOG")
		.or_else(|_| EnvFilter::try_from_default_env())
		.unwrap_or_else(|_| {
			if verbose {
				EnvFilter::new("moniker_tokens=debug,moniker=debug,info")
			} else {
				EnvFilter::new("warn")
			}
		});

	tracing_subscriber::registry()
		.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false))
		.with(filter)
		.init();
}

#[cfg(test)]
mod tests;
