//! Code Jumper: the navigation contract shared by file editors and
//! notebooks.
//!
//! Every operation either moves the caret or completes as a silent no-op;
//! the returned `bool` reports whether anything moved.

mod file;
mod notebook;

pub use file::FileJumper;
pub use notebook::NotebookJumper;
use the_core::uri::external_reference;
use tracing::debug;

use crate::{
  editor::CodeEditor,
  history::EditorIdentity,
  host::{
    DocumentHost,
    OpenRequest,
  },
  jump::{
    GlobalJumpTarget,
    Jump,
    JumpPosition,
  },
  position::Position,
};

pub trait CodeJumper {
  fn identity(&self) -> EditorIdentity;

  fn language(&self) -> &str;

  /// Concrete editors, in reading order.
  fn editors(&self) -> Vec<&dyn CodeEditor>;

  /// Editor holding the caret: the file editor, or the active cell.
  fn active_editor(&self) -> Option<&dyn CodeEditor>;

  /// Caret position of the active editor.
  fn current_position(&self) -> Option<JumpPosition>;

  /// Builds a line/column position in the active editor, as reported by a
  /// language server for this document.
  fn jump_position(&self, position: Position) -> JumpPosition;

  /// Places the caret at `position` and focuses the owning editor.
  fn jump(&mut self, position: &JumpPosition) -> bool;

  /// Moves to the nearest preceding definition of `jump.token`, recording
  /// the current caret so [`CodeJumper::jump_back`] can return to it.
  fn jump_to_definition(&mut self, jump: &Jump) -> bool;

  fn jump_back(&mut self) -> bool;

  /// Asks the host to show a location in a possibly different document.
  fn global_jump(&mut self, target: &GlobalJumpTarget, is_symlinked: bool) -> bool;
}

pub(crate) fn open_global_target(
  host: &dyn DocumentHost,
  target: &GlobalJumpTarget,
  is_symlinked: bool,
) -> bool {
  let path = if is_symlinked {
    external_reference(&target.uri)
  } else {
    target.uri.clone()
  };
  let request = OpenRequest {
    path,
    editor_index: target.editor_index,
    position: Position::new(target.line, target.column),
  };

  match host.open(&request) {
    Ok(()) => true,
    Err(err) => {
      debug!(path = %request.path, error = %err, "global jump target unavailable");
      false
    },
  }
}
