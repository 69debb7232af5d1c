//! User settings and their live application.

use serde::{
  Deserialize,
  Serialize,
};
use the_lib::hook::{
  KeyModifier,
  set_trigger_modifier,
};
use the_loader::config::SettingsError;
use tracing::{
  debug,
  warn,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
  /// Modifier held while clicking to jump to a definition.
  pub modifier: KeyModifier,
}

impl Settings {
  /// Decodes settings from a merged TOML document. Unknown keys are logged
  /// and skipped.
  pub fn from_toml(value: toml::Value) -> Result<Self, toml::de::Error> {
    if let Some(table) = value.as_table() {
      for key in table.keys().filter(|key| key.as_str() != "modifier") {
        debug!(key = %key, "ignoring unknown setting");
      }
    }
    value.try_into()
  }

  /// Makes these settings current for every hook.
  pub fn apply(&self) {
    set_trigger_modifier(self.modifier);
    debug!(modifier = ?self.modifier, "applied settings");
  }
}

/// Loads the user's settings and applies them. On failure the settings in
/// effect stay untouched and `current` is returned.
pub fn reload(current: Settings) -> Settings {
  reload_from(the_loader::config::user_settings(), current)
}

pub fn reload_from(loaded: Result<toml::Value, SettingsError>, current: Settings) -> Settings {
  let settings = match loaded {
    Ok(value) => {
      match Settings::from_toml(value) {
        Ok(settings) => settings,
        Err(err) => {
          warn!(error = %err, "invalid settings, keeping previous values");
          return current;
        },
      }
    },
    Err(err) => {
      warn!(error = %err, "failed to load settings, keeping previous values");
      return current;
    },
  };
  settings.apply();
  settings
}

#[cfg(test)]
mod tests {
  use std::path::PathBuf;

  use the_lib::hook::trigger_modifier;

  use super::*;

  fn parse(text: &str) -> toml::Value {
    toml::from_str(text).expect("valid toml")
  }

  #[test]
  fn defaults_to_alt() {
    let settings = Settings::from_toml(parse("")).expect("settings");
    assert_eq!(settings.modifier, KeyModifier::Alt);
  }

  #[test]
  fn unknown_keys_are_ignored() {
    let settings =
      Settings::from_toml(parse("modifier = \"Shift\"\ntheme = \"dark\"\n")).expect("settings");
    assert_eq!(settings.modifier, KeyModifier::Shift);
  }

  #[test]
  fn workspace_file_overrides_global() {
    let dir = tempfile::tempdir().expect("temp dir");
    let global = dir.path().join("global.toml");
    let workspace = dir.path().join("workspace.toml");
    std::fs::write(&global, "modifier = \"Shift\"\n").expect("write global");
    std::fs::write(&workspace, "modifier = \"AccelKey\"\n").expect("write workspace");

    let loaded = the_loader::config::load_settings_from(&[global, workspace]).expect("load");
    let settings = Settings::from_toml(loaded).expect("settings");
    assert_eq!(settings.modifier, KeyModifier::AccelKey);
  }

  #[test]
  fn bad_values_are_rejected() {
    assert!(Settings::from_toml(parse("modifier = \"Hyper\"")).is_err());
  }

  // Only test in this binary touching the global modifier.
  #[test]
  fn reload_applies_or_keeps_previous() {
    let current = Settings {
      modifier: KeyModifier::Meta,
    };

    let applied = reload_from(Ok(parse("modifier = \"Control\"")), current);
    assert_eq!(applied.modifier, KeyModifier::Control);
    assert_eq!(trigger_modifier(), KeyModifier::Control);

    let kept = reload_from(Ok(parse("modifier = 3")), applied);
    assert_eq!(kept, applied);

    let failed = reload_from(
      Err(SettingsError::Read {
        path:   PathBuf::from("settings.toml"),
        source: std::io::Error::other("denied"),
      }),
      applied,
    );
    assert_eq!(failed, applied);
    assert_eq!(trigger_modifier(), KeyModifier::Control);

    Settings::default().apply();
  }
}
