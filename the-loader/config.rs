use std::{
  io,
  path::{
    Path,
    PathBuf,
  },
};

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SettingsError {
  #[error("failed to read {}: {source}", path.display())]
  Read {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },
  #[error("failed to parse {}: {source}", path.display())]
  Parse {
    path:   PathBuf,
    #[source]
    source: toml::de::Error,
  },
}

/// Global `settings.toml` with the workspace one merged over it.
pub fn user_settings() -> Result<toml::Value, SettingsError> {
  load_settings_from(&[crate::settings_file(), crate::workspace_settings_file()])
}

/// Reads and merges settings files in order, later files winning. Missing
/// files are skipped.
pub fn load_settings_from(paths: &[PathBuf]) -> Result<toml::Value, SettingsError> {
  let mut merged = toml::Value::Table(toml::Table::new());
  for path in paths {
    let Some(value) = read_settings_file(path)? else {
      debug!(path = %path.display(), "no settings file");
      continue;
    };
    merged = crate::merge_toml_values(merged, value, 3);
  }
  Ok(merged)
}

fn read_settings_file(path: &Path) -> Result<Option<toml::Value>, SettingsError> {
  let text = match std::fs::read_to_string(path) {
    Ok(text) => text,
    Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
    Err(source) => {
      return Err(SettingsError::Read {
        path: path.to_path_buf(),
        source,
      });
    },
  };

  toml::from_str(&text)
    .map(Some)
    .map_err(|source| SettingsError::Parse {
      path: path.to_path_buf(),
      source,
    })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn merges_existing_files_in_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    let global = dir.path().join("global.toml");
    let workspace = dir.path().join("workspace.toml");
    std::fs::write(&global, "modifier = \"Shift\"\nother = 1\n").expect("write global");
    std::fs::write(&workspace, "modifier = \"Control\"\n").expect("write workspace");

    let merged =
      load_settings_from(&[global, dir.path().join("missing.toml"), workspace]).expect("load");
    assert_eq!(merged["modifier"].as_str(), Some("Control"));
    assert_eq!(merged["other"].as_integer(), Some(1));
  }

  #[test]
  fn no_files_gives_an_empty_table() {
    let dir = tempfile::tempdir().expect("tempdir");
    let merged = load_settings_from(&[dir.path().join("settings.toml")]).expect("load");
    assert_eq!(merged.as_table().map(|table| table.len()), Some(0));
  }

  #[test]
  fn malformed_file_reports_its_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("settings.toml");
    std::fs::write(&path, "modifier = ").expect("write");

    let err = load_settings_from(std::slice::from_ref(&path)).expect_err("parse error");
    assert!(matches!(err, SettingsError::Parse { .. }));
    assert!(err.to_string().contains("settings.toml"));
  }
}
