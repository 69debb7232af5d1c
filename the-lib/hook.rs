//! Editor hooks: turn navigation gestures on one editor instance into
//! `jump_to_definition` calls on the jumper that owns it.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde::{
  Deserialize,
  Serialize,
};
use tracing::trace;

use crate::{
  editor::{
    CodeEditor,
    ScreenCoords,
  },
  jump::Jump,
  jumper::CodeJumper,
  token::Token,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Modifiers {
  bits: u8,
}

impl Modifiers {
  pub const CTRL: u8 = 0b0000_0001;
  pub const ALT: u8 = 0b0000_0010;
  pub const SHIFT: u8 = 0b0000_0100;
  pub const META: u8 = 0b0000_1000;

  #[must_use]
  pub const fn empty() -> Self {
    Self { bits: 0 }
  }

  #[must_use]
  pub const fn from_bits(bits: u8) -> Self {
    Self { bits }
  }

  #[must_use]
  pub const fn is_empty(self) -> bool {
    self.bits == 0
  }

  #[must_use]
  pub const fn contains(self, bits: u8) -> bool {
    bits != 0 && (self.bits & bits) == bits
  }

  pub fn insert(&mut self, bits: u8) {
    self.bits |= bits;
  }
}

/// Modifier that turns a pointer click into a jump.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyModifier {
  #[default]
  Alt,
  Control,
  Shift,
  Meta,
  /// Meta on macOS, Control elsewhere.
  AccelKey,
}

impl KeyModifier {
  pub const fn bits(self) -> u8 {
    match self {
      Self::Alt => Modifiers::ALT,
      Self::Control => Modifiers::CTRL,
      Self::Shift => Modifiers::SHIFT,
      Self::Meta => Modifiers::META,
      Self::AccelKey if cfg!(target_os = "macos") => Modifiers::META,
      Self::AccelKey => Modifiers::CTRL,
    }
  }
}

static TRIGGER_MODIFIER: RwLock<KeyModifier> = RwLock::new(KeyModifier::Alt);

/// Currently configured trigger modifier. Read on every gesture, so a change
/// applies to all hooks immediately.
pub fn trigger_modifier() -> KeyModifier {
  *TRIGGER_MODIFIER.read()
}

pub fn set_trigger_modifier(modifier: KeyModifier) {
  *TRIGGER_MODIFIER.write() = modifier;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
  /// Pointer press at `coords` with `modifiers` held.
  Pointer {
    coords:    ScreenCoords,
    modifiers: Modifiers,
  },
  /// The jump keybinding, acting on the caret.
  Keybinding,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorHook {
  editor_id: String,
}

impl EditorHook {
  pub fn new(editor_id: impl Into<String>) -> Self {
    Self {
      editor_id: editor_id.into(),
    }
  }

  pub fn editor_id(&self) -> &str {
    &self.editor_id
  }

  /// Resolves the token targeted by `gesture` and asks `jumper` to jump to
  /// its definition.
  pub fn handle(&self, gesture: &Gesture, jumper: &mut dyn CodeJumper) -> bool {
    let jump = {
      let editors = jumper.editors();
      let Some((index, editor)) = editors
        .iter()
        .enumerate()
        .find(|(_, editor)| editor.id() == self.editor_id)
      else {
        trace!(editor = %self.editor_id, "hooked editor is gone");
        return false;
      };

      let Some(token) = token_for_gesture(*editor, gesture) else {
        return false;
      };
      if token.is_empty() {
        return false;
      }
      Jump::new(token).in_cell(index)
    };

    jumper.jump_to_definition(&jump)
  }
}

fn token_for_gesture(editor: &dyn CodeEditor, gesture: &Gesture) -> Option<Token> {
  match gesture {
    Gesture::Pointer { coords, modifiers } => {
      if !modifiers.contains(trigger_modifier().bits()) {
        return None;
      }
      let position = editor.position_at_coords(*coords)?;
      Some(editor.token_at(position))
    },
    Gesture::Keybinding => Some(editor.token_at(editor.cursor())),
  }
}

/// Hooks keyed by editor instance id. Registering the same editor twice
/// keeps a single hook.
#[derive(Debug, Default)]
pub struct HookRegistry {
  hooks: HashMap<String, EditorHook>,
}

impl HookRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Returns `false` when the editor already has a hook.
  pub fn register(&mut self, editor_id: &str) -> bool {
    if self.hooks.contains_key(editor_id) {
      return false;
    }
    trace!(editor = editor_id, "registered editor hook");
    self
      .hooks
      .insert(editor_id.to_string(), EditorHook::new(editor_id));
    true
  }

  pub fn unregister(&mut self, editor_id: &str) -> bool {
    self.hooks.remove(editor_id).is_some()
  }

  pub fn is_registered(&self, editor_id: &str) -> bool {
    self.hooks.contains_key(editor_id)
  }

  pub fn len(&self) -> usize {
    self.hooks.len()
  }

  pub fn is_empty(&self) -> bool {
    self.hooks.is_empty()
  }

  /// Routes a gesture on `editor_id` to `jumper`. Unhooked editors ignore
  /// gestures.
  pub fn dispatch(&self, editor_id: &str, gesture: &Gesture, jumper: &mut dyn CodeJumper) -> bool {
    match self.hooks.get(editor_id) {
      Some(hook) => hook.handle(gesture, jumper),
      None => false,
    }
  }
}

#[cfg(test)]
mod tests {
  use std::rc::Rc;

  use super::*;
  use crate::{
    editor::TextEditor,
    history::JumpHistory,
    jumper::{
      FileJumper,
      test_support::RecordingHost,
    },
    position::Position,
  };

  const SOURCE: &str = "value = 1\nprint(value)\n";

  fn jumper(cursor: Position) -> FileJumper {
    let editor = TextEditor::new("ed", SOURCE, "text/x-python")
      .with_metrics(ScreenCoords::default(), 10.0, 20.0)
      .with_cursor(cursor);
    FileJumper::new(
      Box::new(editor),
      "main.py",
      JumpHistory::shared(),
      Rc::new(RecordingHost::default()),
    )
  }

  fn click(column: usize, line: usize, modifiers: u8) -> Gesture {
    Gesture::Pointer {
      coords:    ScreenCoords::new(column as f32 * 10.0 + 1.0, line as f32 * 20.0 + 1.0),
      modifiers: Modifiers::from_bits(modifiers),
    }
  }

  #[test]
  fn keybinding_uses_the_caret_token() {
    let mut jumper = jumper(Position::new(1, 8));
    let hook = EditorHook::new("ed");
    assert!(hook.handle(&Gesture::Keybinding, &mut jumper));
    assert_eq!(jumper.editor().cursor(), Position::new(0, 0));
  }

  #[test]
  fn keybinding_on_whitespace_does_nothing() {
    let mut jumper = jumper(Position::new(0, 6));
    let hook = EditorHook::new("ed");
    assert!(!hook.handle(&Gesture::Keybinding, &mut jumper));
    assert_eq!(jumper.editor().cursor(), Position::new(0, 6));
  }

  // Single test touching the global modifier, so parallel tests can't race
  // on it.
  #[test]
  fn pointer_requires_the_configured_modifier() {
    let hook = EditorHook::new("ed");

    set_trigger_modifier(KeyModifier::Alt);
    let mut plain = jumper(Position::zero());
    assert!(!hook.handle(&click(8, 1, 0), &mut plain));
    assert!(!hook.handle(&click(8, 1, Modifiers::CTRL), &mut plain));
    assert_eq!(plain.editor().cursor(), Position::zero());

    let mut alt = jumper(Position::new(1, 0));
    assert!(hook.handle(&click(8, 1, Modifiers::ALT | Modifiers::SHIFT), &mut alt));
    assert_eq!(alt.editor().cursor(), Position::new(0, 0));

    set_trigger_modifier(KeyModifier::Control);
    let mut ctrl = jumper(Position::new(1, 0));
    assert!(!hook.handle(&click(8, 1, Modifiers::ALT), &mut ctrl));
    assert!(hook.handle(&click(8, 1, Modifiers::CTRL), &mut ctrl));

    set_trigger_modifier(KeyModifier::default());
    assert_eq!(trigger_modifier(), KeyModifier::Alt);
  }

  #[test]
  fn hooks_for_other_editors_ignore_gestures() {
    let mut jumper = jumper(Position::new(1, 8));
    let hook = EditorHook::new("someone-else");
    assert!(!hook.handle(&Gesture::Keybinding, &mut jumper));
  }

  #[test]
  fn registration_is_idempotent() {
    let mut registry = HookRegistry::new();
    assert!(registry.register("ed"));
    assert!(!registry.register("ed"));
    assert_eq!(registry.len(), 1);

    let mut jumper = jumper(Position::new(1, 8));
    assert!(registry.dispatch("ed", &Gesture::Keybinding, &mut jumper));
    assert!(!registry.dispatch("other", &Gesture::Keybinding, &mut jumper));

    assert!(registry.unregister("ed"));
    assert!(registry.is_empty());
  }

  #[test]
  fn accel_key_follows_platform() {
    let expected = if cfg!(target_os = "macos") {
      Modifiers::META
    } else {
      Modifiers::CTRL
    };
    assert_eq!(KeyModifier::AccelKey.bits(), expected);
  }

  #[test]
  fn modifier_names_deserialize() {
    #[derive(Deserialize)]
    struct Wrapper {
      modifier: KeyModifier,
    }
    let parsed: Wrapper = toml::from_str("modifier = \"AccelKey\"").expect("valid toml");
    assert_eq!(parsed.modifier, KeyModifier::AccelKey);
  }
}
