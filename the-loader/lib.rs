pub mod config;

use std::{
  ffi::OsString,
  path::{
    Path,
    PathBuf,
  },
};

use etcetera::base_strategy::{
  BaseStrategy,
  choose_base_strategy,
};

/// Environment variable overriding the config directory.
pub const CONFIG_DIR_ENV: &str = "THE_GOTO_CONFIG_DIR";

/// Directory name used both under the platform config dir and as the
/// workspace-local config directory.
pub const CONFIG_DIR_NAME: &str = "the-goto";
pub const WORKSPACE_CONFIG_DIR: &str = ".the-goto";

pub const SETTINGS_FILE: &str = "settings.toml";

pub fn config_dir() -> PathBuf {
  config_dir_with(std::env::var_os(CONFIG_DIR_ENV))
}

fn config_dir_with(override_dir: Option<OsString>) -> PathBuf {
  if let Some(dir) = override_dir {
    return expand_tilde(Path::new(&dir));
  }
  let strategy = choose_base_strategy().expect("Unable to find the config directory!");
  let mut path = strategy.config_dir();
  path.push(CONFIG_DIR_NAME);
  path
}

pub fn settings_file() -> PathBuf {
  config_dir().join(SETTINGS_FILE)
}

pub fn workspace_settings_file() -> PathBuf {
  workspace_settings_file_in(find_workspace().0)
}

pub fn workspace_settings_file_in(workspace: impl AsRef<Path>) -> PathBuf {
  workspace
    .as_ref()
    .join(WORKSPACE_CONFIG_DIR)
    .join(SETTINGS_FILE)
}

fn expand_tilde(path: &Path) -> PathBuf {
  let Ok(rest) = path.strip_prefix("~") else {
    return path.to_path_buf();
  };
  match etcetera::home_dir() {
    Ok(home) => home.join(rest),
    Err(_) => path.to_path_buf(),
  }
}

/// Merge two TOML documents, merging values from `right` onto `left`.
///
/// `merge_depth` sets the nesting depth up to which tables and arrays are
/// merged instead of replaced. Array items carrying the same `name` key are
/// merged with each other; other items are appended.
pub fn merge_toml_values(left: toml::Value, right: toml::Value, merge_depth: usize) -> toml::Value {
  use toml::Value;

  fn get_name(v: &Value) -> Option<&str> {
    v.get("name").and_then(Value::as_str)
  }

  match (left, right) {
    (Value::Array(mut left_items), Value::Array(right_items)) => {
      if merge_depth == 0 {
        return Value::Array(right_items);
      }
      left_items.reserve(right_items.len());
      for rvalue in right_items {
        let lvalue = get_name(&rvalue)
          .and_then(|rname| left_items.iter().position(|v| get_name(v) == Some(rname)))
          .map(|lpos| left_items.remove(lpos));
        left_items.push(match lvalue {
          Some(lvalue) => merge_toml_values(lvalue, rvalue, merge_depth - 1),
          None => rvalue,
        });
      }
      Value::Array(left_items)
    },
    (Value::Table(mut left_map), Value::Table(right_map)) => {
      if merge_depth == 0 {
        return Value::Table(right_map);
      }
      for (rname, rvalue) in right_map {
        let merged = match left_map.remove(&rname) {
          Some(lvalue) => merge_toml_values(lvalue, rvalue, merge_depth - 1),
          None => rvalue,
        };
        left_map.insert(rname, merged);
      }
      Value::Table(left_map)
    },
    (_, value) => value,
  }
}

/// Finds the workspace the process runs in: the nearest ancestor of the
/// current directory holding `.git`, `.svn`, `.jj` or `.the-goto`.
///
/// Returns `(cwd, true)` when no marker is found.
pub fn find_workspace() -> (PathBuf, bool) {
  match std::env::current_dir() {
    Ok(current_dir) => find_workspace_in(current_dir),
    Err(_) => (PathBuf::new(), true),
  }
}

pub fn find_workspace_in(dir: impl AsRef<Path>) -> (PathBuf, bool) {
  let dir = dir.as_ref();
  for ancestor in dir.ancestors() {
    if ancestor.join(".git").exists()
      || ancestor.join(".svn").exists()
      || ancestor.join(".jj").exists()
      || ancestor.join(WORKSPACE_CONFIG_DIR).exists()
    {
      return (ancestor.to_owned(), false);
    }
  }

  (dir.to_owned(), true)
}
