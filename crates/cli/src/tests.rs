use clap::Parser;
use moniker_tokens::{Config, FilterArgs};
use pretty_assertions::assert_eq;

use super::*;
use crate::cli::FilterOpts;

fn parse(args: &[&str]) -> Cli {
	Cli::try_parse_from(std::iter::once("moniker").chain(args.iter().copied())).expect("arguments should parse")
}

fn project_directory() -> ProviderDirectory {
	let config = Config::from_toml_str("[namespaces.project.tokens]\nname = \"Apollo\"\n").expect("config should parse");
	build_directory(Some(&config)).expect("config should apply")
}

#[test]
fn parses_eval_with_filter_flags() {
	let cli = parse(&["eval", "{shot:take}", "-n", "shot", "--namespace", "scene", "--no-global", "--case-sensitive", "--json"]);
	let Command::Eval { text, filter, json, strict } = cli.command else {
		panic!("expected eval command");
	};
	assert_eq!(text, "{shot:take}");
	assert!(json);
	assert!(!strict);
	assert_eq!(
		filter.to_filter(),
		FilterArgs::new()
			.with_namespaces(["shot", "scene"])
			.with_global(false)
			.with_case_sensitive(true)
	);
}

#[test]
fn global_options_follow_subcommands() {
	let cli = parse(&["list", "--config", "custom.toml", "-v"]);
	assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
	assert!(cli.verbose);
	assert!(matches!(cli.command, Command::List { filter } if filter == FilterOpts::default()));
}

#[test]
fn eval_requires_text() {
	assert!(Cli::try_parse_from(["moniker", "eval"]).is_err());
}

#[test]
fn default_filter_includes_globals() {
	assert_eq!(FilterOpts::default().to_filter(), FilterArgs::default());
}

#[test]
fn strict_eval_reports_unresolved_tokens() {
	let directory = project_directory();
	let eval = |text: &str, strict: bool| Command::Eval {
		text: text.to_string(),
		filter: FilterOpts::default(),
		json: false,
		strict,
	};

	assert_eq!(run(&directory, eval("{project:name}", true)).expect("eval runs"), 0);
	assert_eq!(run(&directory, eval("{project:missing}", true)).expect("eval runs"), EXIT_UNRESOLVED);
	assert_eq!(run(&directory, eval("{project:missing}", false)).expect("eval runs"), 0);
}

#[test]
fn strict_eval_reports_placeholders_no_pass_reached() {
	let directory = project_directory();
	let eval = |text: &str, filter: FilterOpts| Command::Eval {
		text: text.to_string(),
		filter,
		json: false,
		strict: true,
	};
	let no_global = FilterOpts {
		no_global: true,
		..FilterOpts::default()
	};

	assert_eq!(run(&directory, eval("{typo:name}", FilterOpts::default())).expect("eval runs"), EXIT_UNRESOLVED);
	assert_eq!(run(&directory, eval("{name}", no_global)).expect("eval runs"), EXIT_UNRESOLVED);
}

#[test]
fn config_namespaces_are_listed() {
	let directory = project_directory();
	assert!(directory.get_all_namespaces().contains(&"project".to_string()));
	assert_eq!(run(&directory, Command::Namespaces).expect("namespaces runs"), 0);
}

#[test]
fn missing_explicit_config_is_an_error() {
	let path = std::env::temp_dir().join(format!("moniker-cli-missing-{}.toml", std::process::id()));
	assert!(load_config(Some(&path)).is_err());
}

#[test]
fn invalid_delimiter_in_config_is_an_error() {
	let config = Config::from_toml_str("[directory]\ndelimiter = \"_\"\n").expect("config should parse");
	assert!(build_directory(Some(&config)).is_err());
}
