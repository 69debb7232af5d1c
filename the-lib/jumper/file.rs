use std::{
  path::{
    Path,
    PathBuf,
  },
  rc::Rc,
  sync::Arc,
};

use tracing::debug;

use super::{
  CodeJumper,
  open_global_target,
};
use crate::{
  editor::CodeEditor,
  history::{
    EditorIdentity,
    SharedHistory,
  },
  host::DocumentHost,
  jump::{
    GlobalJumpTarget,
    Jump,
    JumpPosition,
  },
  language::language_from_mime,
  locator::Locator,
  position::Position,
  rules::RuleRegistry,
};

/// Jumper over a single text editor.
pub struct FileJumper {
  editor:   Box<dyn CodeEditor>,
  path:     PathBuf,
  language: String,
  rules:    Arc<RuleRegistry>,
  history:  SharedHistory,
  host:     Rc<dyn DocumentHost>,
}

impl FileJumper {
  pub fn new(
    editor: Box<dyn CodeEditor>,
    path: impl Into<PathBuf>,
    history: SharedHistory,
    host: Rc<dyn DocumentHost>,
  ) -> Self {
    let language = language_from_mime(editor.mime_type());
    Self {
      editor,
      path: path.into(),
      language,
      rules: Arc::new(RuleRegistry::default()),
      history,
      host,
    }
  }

  pub fn with_rules(mut self, rules: Arc<RuleRegistry>) -> Self {
    self.rules = rules;
    self
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Directory containing the document; the LSP root for it.
  pub fn cwd(&self) -> &Path {
    self.path.parent().unwrap_or_else(|| Path::new(""))
  }

  pub fn editor(&self) -> &dyn CodeEditor {
    self.editor.as_ref()
  }

  pub fn editor_mut(&mut self) -> &mut dyn CodeEditor {
    self.editor.as_mut()
  }

  /// Re-derives the language after the document's content type changed.
  pub fn mime_type_changed(&mut self, mime_type: &str) {
    let language = language_from_mime(mime_type);
    if language != self.language {
      debug!(from = %self.language, to = %language, "file editor language changed");
      self.language = language;
    }
  }

  fn locator(&self) -> Locator {
    Locator::new(self.rules.for_language(&self.language))
  }
}

impl CodeJumper for FileJumper {
  fn identity(&self) -> EditorIdentity {
    EditorIdentity::File(self.editor.id().to_string())
  }

  fn language(&self) -> &str {
    &self.language
  }

  fn editors(&self) -> Vec<&dyn CodeEditor> {
    vec![self.editor.as_ref()]
  }

  fn active_editor(&self) -> Option<&dyn CodeEditor> {
    Some(self.editor.as_ref())
  }

  fn current_position(&self) -> Option<JumpPosition> {
    Some(JumpPosition::from_coords(self.editor.cursor()))
  }

  fn jump_position(&self, position: Position) -> JumpPosition {
    JumpPosition::from_coords(position)
  }

  fn jump(&mut self, position: &JumpPosition) -> bool {
    let target = position.resolve(self.editor.text());
    self.editor.set_cursor(target);
    self.editor.focus();
    true
  }

  fn jump_to_definition(&mut self, jump: &Jump) -> bool {
    let found =
      self
        .locator()
        .find_last_definition(self.editor.text(), &jump.token, jump.token.offset);
    let Some(found) = found else {
      debug!(name = %jump.token.value, editor = self.editor.id(), "no definition found");
      return false;
    };

    let origin = JumpPosition::from_coords(self.editor.cursor());
    self.history.borrow_mut().store(&self.identity(), origin);
    self.jump(&JumpPosition::from_token(found))
  }

  fn jump_back(&mut self) -> bool {
    let previous = self.history.borrow_mut().recollect(&self.identity());
    match previous {
      Some(position) => self.jump(&position),
      None => false,
    }
  }

  fn global_jump(&mut self, target: &GlobalJumpTarget, is_symlinked: bool) -> bool {
    open_global_target(self.host.as_ref(), target, is_symlinked)
  }
}
