//! Config file loading utilities.

use std::path::{Path, PathBuf};

use super::{Config, ConfigError, ConfigWarning};

/// Main configuration file name.
pub const CONFIG_FILE: &str = "moniker.toml";
/// Machine-local overrides, merged over [`CONFIG_FILE`].
pub const LOCAL_CONFIG_FILE: &str = "moniker.local.toml";

/// Aggregate result of loading configuration layers.
#[derive(Debug, Default)]
pub struct ConfigLoadReport {
	/// Merged config if any layer was loaded successfully.
	pub config: Option<Config>,
	/// Non-fatal warnings keyed by source file path.
	pub warnings: Vec<(PathBuf, ConfigWarning)>,
	/// File read or parse errors keyed by source file path.
	pub errors: Vec<(PathBuf, ConfigError)>,
}

/// Reads and parses one configuration file.
pub fn load_config_file(path: &Path) -> Result<Config, ConfigError> {
	let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
		path: path.to_path_buf(),
		source,
	})?;
	Config::from_toml_str(&content)
}

/// Loads and merges `moniker.toml` and `moniker.local.toml` from `config_dir`.
///
/// Missing files are skipped. A layer that fails to read or parse is
/// reported and the remaining layers still load.
pub fn load_config_from_dir(config_dir: &Path) -> ConfigLoadReport {
	let mut report = ConfigLoadReport::default();
	let mut merged = Config::default();
	let mut found_any = false;

	for filename in [CONFIG_FILE, LOCAL_CONFIG_FILE] {
		let path = config_dir.join(filename);
		if !path.exists() {
			continue;
		}

		match load_config_file(&path) {
			Ok(config) => {
				for warning in config.warnings() {
					tracing::warn!(path = %path.display(), %warning, "config warning");
					report.warnings.push((path.clone(), warning));
				}
				merged.merge(config);
				found_any = true;
			}
			Err(error) => {
				tracing::warn!(path = %path.display(), %error, "failed to load config layer");
				report.errors.push((path, error));
			}
		}
	}

	if found_any {
		report.config = Some(merged);
	}

	report
}
