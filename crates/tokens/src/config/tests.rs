use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;

use super::*;

fn unique_temp_dir(prefix: &str) -> PathBuf {
	let nanos = std::time::SystemTime::now()
		.duration_since(std::time::UNIX_EPOCH)
		.expect("system time should be after unix epoch")
		.as_nanos();
	let dir = std::env::temp_dir().join(format!("moniker-config-{prefix}-{}-{nanos}", std::process::id()));
	std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
	dir
}

fn write_file(path: &Path, content: &str) {
	std::fs::write(path, content).expect("file should be writable");
}

const SAMPLE: &str = r#"
[directory]
cache = false
delimiter = "."
global_namespaces = ["global", "studio"]

[namespaces.project.tokens]
name = "Apollo"
take = { value = "12", display_name = "Take number" }

[custom.global]
studio = "North"
"#;

#[test]
fn parses_all_sections() {
	let config = Config::from_toml_str(SAMPLE).expect("sample should parse");

	let directory = config.directory.as_ref().expect("directory table present");
	assert!(!directory.cache);
	assert_eq!(directory.delimiter, '.');
	assert_eq!(directory.global_namespaces, vec!["global".to_string(), "studio".to_string()]);

	let project = &config.namespaces["project"];
	assert_eq!(project.tokens["name"], TokenEntry::Value("Apollo".into()));
	assert_eq!(project.tokens["take"].value(), "12");

	assert_eq!(config.custom["global"]["studio"].value(), "North");
	assert!(config.warnings().is_empty());
}

#[test]
fn directory_defaults_fill_missing_fields() {
	let config = Config::from_toml_str("[directory]\ncache = false\n").expect("should parse");
	let directory = config.directory.expect("directory table present");
	assert_eq!(directory.delimiter, ':');
	assert_eq!(directory.global_namespaces, vec!["global".to_string()]);
}

#[test]
fn detailed_entries_become_descriptors() {
	let config = Config::from_toml_str(SAMPLE).expect("sample should parse");
	let descriptors = config.namespaces["project"].descriptors();
	assert_eq!(descriptors.len(), 2);
	assert_eq!(descriptors[0].key(), "name");
	assert_eq!(descriptors[0].display_name(), "name");
	assert_eq!(descriptors[1].key(), "take");
	assert_eq!(descriptors[1].display_name(), "Take number");
}

#[test]
fn rejects_unknown_fields() {
	let err = Config::from_toml_str("[directory]\ncaching = true\n").unwrap_err();
	assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn rejects_multi_character_delimiter() {
	assert!(Config::from_toml_str("[directory]\ndelimiter = \"::\"\n").is_err());
}

#[test]
fn warns_on_invalid_names() {
	let config = Config::from_toml_str("[custom.my-ns]\n\"bad key\" = \"x\"\n").expect("should parse");
	let warnings = config.warnings();
	assert_eq!(warnings.len(), 2);
	assert!(matches!(&warnings[0], ConfigWarning::InvalidName { section: "custom", name, .. } if name == "my-ns"));
	assert_eq!(warnings[1].to_string(), "invalid name \"bad key\" in [custom]: name contains invalid characters: ' '");
}

#[test]
fn merge_overrides_per_key() {
	let mut base = Config::from_toml_str(SAMPLE).expect("sample should parse");
	let overlay = Config::from_toml_str("[namespaces.project.tokens]\ntake = \"13\"\nscene = \"4\"\n").expect("should parse");
	base.merge(overlay);

	let project = &base.namespaces["project"];
	assert_eq!(project.tokens["name"].value(), "Apollo");
	assert_eq!(project.tokens["take"].value(), "13");
	assert_eq!(project.tokens["scene"].value(), "4");
	assert!(base.directory.is_some());
}

#[test]
fn load_ignores_missing_files() {
	let dir = unique_temp_dir("missing");
	let report = load_config_from_dir(&dir);
	assert!(report.config.is_none());
	assert!(report.warnings.is_empty());
	assert!(report.errors.is_empty());
	let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn local_layer_overrides_main() {
	let dir = unique_temp_dir("layers");
	write_file(&dir.join(CONFIG_FILE), "[custom.global]\nstudio = \"North\"\nsite = \"A\"\n");
	write_file(&dir.join(LOCAL_CONFIG_FILE), "[custom.global]\nstudio = \"South\"\n");

	let report = load_config_from_dir(&dir);
	let config = report.config.expect("both layers should load");
	assert_eq!(config.custom["global"]["studio"].value(), "South");
	assert_eq!(config.custom["global"]["site"].value(), "A");
	assert!(report.errors.is_empty());

	let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn broken_layer_is_reported_and_others_still_load() {
	let dir = unique_temp_dir("broken");
	write_file(&dir.join(CONFIG_FILE), "[custom.global]\nstudio = \"North\"\n");
	write_file(&dir.join(LOCAL_CONFIG_FILE), "[custom.global\n");

	let report = load_config_from_dir(&dir);
	let config = report.config.expect("main layer should load");
	assert_eq!(config.custom["global"]["studio"].value(), "North");
	assert_eq!(report.errors.len(), 1);
	assert_eq!(report.errors[0].0, dir.join(LOCAL_CONFIG_FILE));
	assert!(matches!(report.errors[0].1, ConfigError::Parse(_)));

	let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn missing_file_is_an_io_error() {
	let dir = unique_temp_dir("io");
	let err = load_config_file(&dir.join("absent.toml")).unwrap_err();
	assert!(matches!(err, ConfigError::Io { .. }));
	let _ = std::fs::remove_dir_all(dir);
}
