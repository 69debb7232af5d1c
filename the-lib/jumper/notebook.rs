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
  locator::{
    CellSequence,
    Locator,
  },
  position::Position,
  rules::RuleRegistry,
};

/// Jumper over the ordered cell editors of a notebook.
///
/// Positions recorded here always carry the index of the cell they belong
/// to. A position whose cell has since been removed is dropped on jump.
pub struct NotebookJumper {
  id:          String,
  path:        PathBuf,
  language:    String,
  cells:       Vec<Box<dyn CodeEditor>>,
  active_cell: usize,
  rules:       Arc<RuleRegistry>,
  history:     SharedHistory,
  host:        Rc<dyn DocumentHost>,
}

impl NotebookJumper {
  pub fn new(
    id: impl Into<String>,
    path: impl Into<PathBuf>,
    language: impl Into<String>,
    history: SharedHistory,
    host: Rc<dyn DocumentHost>,
  ) -> Self {
    Self {
      id: id.into(),
      path: path.into(),
      language: language.into(),
      cells: Vec::new(),
      active_cell: 0,
      rules: Arc::new(RuleRegistry::default()),
      history,
      host,
    }
  }

  pub fn with_rules(mut self, rules: Arc<RuleRegistry>) -> Self {
    self.rules = rules;
    self
  }

  pub fn id(&self) -> &str {
    &self.id
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn set_language(&mut self, language: impl Into<String>) {
    self.language = language.into();
  }

  pub fn cell_count(&self) -> usize {
    self.cells.len()
  }

  pub fn cell(&self, index: usize) -> Option<&dyn CodeEditor> {
    self.cells.get(index).map(|cell| cell.as_ref())
  }

  pub fn cell_mut(&mut self, index: usize) -> Option<&mut (dyn CodeEditor + 'static)> {
    self.cells.get_mut(index).map(|cell| cell.as_mut())
  }

  /// Index of the cell whose editor has the given id.
  pub fn cell_index(&self, editor_id: &str) -> Option<usize> {
    self.cells.iter().position(|cell| cell.id() == editor_id)
  }

  pub fn active_cell(&self) -> usize {
    self.active_cell
  }

  pub fn set_active_cell(&mut self, index: usize) -> bool {
    if index >= self.cells.len() {
      return false;
    }
    self.active_cell = index;
    true
  }

  pub fn push_cell(&mut self, cell: Box<dyn CodeEditor>) -> usize {
    self.cells.push(cell);
    self.cells.len() - 1
  }

  /// Inserts a cell at `index`, clamped to the end. The active cell keeps
  /// pointing at the same editor.
  pub fn insert_cell(&mut self, index: usize, cell: Box<dyn CodeEditor>) -> usize {
    let index = index.min(self.cells.len());
    self.cells.insert(index, cell);
    if index <= self.active_cell && self.cells.len() > 1 {
      self.active_cell += 1;
    }
    index
  }

  pub fn remove_cell(&mut self, index: usize) -> Option<Box<dyn CodeEditor>> {
    if index >= self.cells.len() {
      return None;
    }
    let removed = self.cells.remove(index);
    if index < self.active_cell || self.active_cell >= self.cells.len() {
      self.active_cell = self.active_cell.saturating_sub(1);
    }
    Some(removed)
  }

  fn locator(&self) -> Locator {
    Locator::new(self.rules.for_language(&self.language))
  }

  /// Cell a position lands in: its editor when recorded, else its index,
  /// else the active cell.
  fn target_cell(&self, position: &JumpPosition) -> Option<usize> {
    match &position.editor {
      Some(editor_id) => self.cell_index(editor_id),
      None => Some(position.cell.unwrap_or(self.active_cell)),
    }
  }

  /// Where jumping back should return to after a jump started in
  /// `origin_cell`: the caret when that cell is active, the token otherwise.
  fn origin_position(&self, jump: &Jump, origin_cell: usize) -> JumpPosition {
    let cell = &self.cells[origin_cell];
    let position = if origin_cell == self.active_cell {
      JumpPosition::from_coords(cell.cursor())
    } else {
      JumpPosition::from_token(jump.token.clone())
    };
    position.in_cell(origin_cell).in_editor(cell.id())
  }
}

impl CodeJumper for NotebookJumper {
  fn identity(&self) -> EditorIdentity {
    EditorIdentity::Notebook(self.id.clone())
  }

  fn language(&self) -> &str {
    &self.language
  }

  fn editors(&self) -> Vec<&dyn CodeEditor> {
    self.cells.iter().map(|cell| cell.as_ref()).collect()
  }

  fn active_editor(&self) -> Option<&dyn CodeEditor> {
    self.cell(self.active_cell)
  }

  fn current_position(&self) -> Option<JumpPosition> {
    let cell = self.cells.get(self.active_cell)?;
    Some(
      JumpPosition::from_coords(cell.cursor())
        .in_cell(self.active_cell)
        .in_editor(cell.id()),
    )
  }

  fn jump_position(&self, position: Position) -> JumpPosition {
    JumpPosition::from_coords(position).in_cell(self.active_cell)
  }

  fn jump(&mut self, position: &JumpPosition) -> bool {
    let Some(index) = self.target_cell(position) else {
      debug!(notebook = %self.id, cell = ?position.cell, "jump target cell no longer exists");
      return false;
    };
    let Some(cell) = self.cells.get_mut(index) else {
      debug!(notebook = %self.id, cell = index, "jump target cell no longer exists");
      return false;
    };

    let target = position.resolve(cell.text());
    cell.set_cursor(target);
    cell.focus();
    self.active_cell = index;
    true
  }

  fn jump_to_definition(&mut self, jump: &Jump) -> bool {
    let origin_cell = jump.cell.unwrap_or(self.active_cell);
    if origin_cell >= self.cells.len() {
      return false;
    }

    let sequence = CellSequence::new(self.cells[..=origin_cell].iter().map(|cell| cell.text()));
    let Some((cell, found)) =
      self
        .locator()
        .find_last_definition_in_cells(&sequence, origin_cell, &jump.token)
    else {
      debug!(name = %jump.token.value, notebook = %self.id, "no definition found");
      return false;
    };

    let origin = self.origin_position(jump, origin_cell);
    self.history.borrow_mut().store(&self.identity(), origin);
    self.jump(&JumpPosition::from_token(found).in_cell(cell))
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

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    editor::TextEditor,
    history::JumpHistory,
    jumper::test_support::RecordingHost,
    token::Token,
  };

  fn notebook(cells: &[&str]) -> (NotebookJumper, SharedHistory) {
    let history = JumpHistory::shared();
    let mut jumper = NotebookJumper::new(
      "nb-1",
      "analysis.ipynb",
      "python",
      Rc::clone(&history),
      Rc::new(RecordingHost::default()),
    );
    for (idx, source) in cells.iter().enumerate() {
      jumper.push_cell(Box::new(TextEditor::new(
        format!("cell-{idx}"),
        *source,
        "text/x-ipython",
      )));
    }
    (jumper, history)
  }

  fn caret(jumper: &NotebookJumper, cell: usize) -> Position {
    jumper.cell(cell).expect("cell").cursor()
  }

  #[test]
  fn definition_in_earlier_cell() {
    let (mut jumper, history) = notebook(&[
      "import pandas as pd\nframe = pd.DataFrame()",
      "frame.head()",
      "summary = frame.describe()",
    ]);
    jumper.set_active_cell(2);
    jumper
      .cell_mut(2)
      .expect("cell")
      .set_cursor(Position::new(0, 12));
    let token = jumper.cell(2).expect("cell").token_at(Position::new(0, 12));
    assert_eq!(token, Token::new("frame", 10));

    assert!(jumper.jump_to_definition(&Jump::new(token).in_cell(2)));
    assert_eq!(jumper.active_cell(), 0);
    assert_eq!(caret(&jumper, 0), Position::new(1, 0));
    assert!(jumper.cell(0).expect("cell").has_focus());
    assert_eq!(history.borrow().depth(&jumper.identity()), 1);

    assert!(jumper.jump_back());
    assert_eq!(jumper.active_cell(), 2);
    assert_eq!(caret(&jumper, 2), Position::new(0, 12));
  }

  #[test]
  fn later_cells_are_never_searched() {
    let (mut jumper, history) = notebook(&["print(total)", "total = 3"]);
    let token = Token::new("total", 6);

    assert!(!jumper.jump_to_definition(&Jump::new(token).in_cell(0)));
    assert_eq!(jumper.active_cell(), 0);
    assert!(history.borrow().is_empty());
  }

  #[test]
  fn nearest_preceding_cell_wins() {
    let (mut jumper, _) = notebook(&["x = 1", "print(x)\nx = 2", "x + 1"]);
    let token = Token::new("x", 0);

    assert!(jumper.jump_to_definition(&Jump::new(token).in_cell(2)));
    assert_eq!(jumper.active_cell(), 1);
    assert_eq!(caret(&jumper, 1), Position::new(1, 0));
  }

  #[test]
  fn stale_cell_positions_are_dropped() {
    let (mut jumper, history) = notebook(&["y = 1", "y"]);
    jumper.set_active_cell(1);
    assert!(jumper.jump_to_definition(&Jump::new(Token::new("y", 0))));
    assert_eq!(jumper.active_cell(), 0);

    jumper.remove_cell(1);
    assert!(!jumper.jump_back());
    assert!(history.borrow().is_empty());
    assert_eq!(jumper.active_cell(), 0);
  }

  #[test]
  fn jump_from_an_inactive_cell_returns_to_that_cell() {
    let (mut jumper, _) = notebook(&["y = 1", "print(y)", "zzz = 0"]);
    jumper.set_active_cell(2);
    jumper
      .cell_mut(2)
      .expect("cell")
      .set_cursor(Position::new(0, 3));

    assert!(jumper.jump_to_definition(&Jump::new(Token::new("y", 6)).in_cell(1)));
    assert_eq!(jumper.active_cell(), 0);

    assert!(jumper.jump_back());
    assert_eq!(jumper.active_cell(), 1);
    assert_eq!(caret(&jumper, 1), Position::new(0, 6));
    assert_eq!(caret(&jumper, 2), Position::new(0, 3));
  }

  #[test]
  fn jump_back_follows_its_cell_across_insertions() {
    let (mut jumper, _) = notebook(&["w = 1", "print(w)"]);
    jumper.set_active_cell(1);
    jumper
      .cell_mut(1)
      .expect("cell")
      .set_cursor(Position::new(0, 6));
    assert!(jumper.jump_to_definition(&Jump::new(Token::new("w", 6)).in_cell(1)));

    jumper.insert_cell(0, Box::new(TextEditor::new("new", "w = 0", "text/x-ipython")));
    assert!(jumper.jump_back());
    assert_eq!(jumper.active_cell(), 2);
    assert_eq!(jumper.cell(2).expect("cell").id(), "cell-1");
    assert_eq!(caret(&jumper, 2), Position::new(0, 6));
  }

  #[test]
  fn jump_position_targets_active_cell() {
    let (mut jumper, _) = notebook(&["a = 1", "b = 2\nc = 3"]);
    jumper.set_active_cell(1);
    let position = jumper.jump_position(Position::new(1, 2));
    assert_eq!(position.cell, Some(1));

    assert!(jumper.jump(&position));
    assert_eq!(caret(&jumper, 1), Position::new(1, 2));
  }

  #[test]
  fn active_cell_tracks_insertions_and_removals() {
    let (mut jumper, _) = notebook(&["a", "b", "c"]);
    assert!(jumper.set_active_cell(1));
    assert!(!jumper.set_active_cell(3));

    jumper.insert_cell(0, Box::new(TextEditor::new("new", "", "text/x-ipython")));
    assert_eq!(jumper.active_cell(), 2);
    assert_eq!(jumper.cell_index("cell-1"), Some(2));

    jumper.remove_cell(0);
    assert_eq!(jumper.active_cell(), 1);
    jumper.remove_cell(2);
    jumper.remove_cell(1);
    assert_eq!(jumper.active_cell(), 0);
    assert_eq!(jumper.cell_count(), 1);
  }

  #[test]
  fn out_of_range_origin_cell_is_a_no_op() {
    let (mut jumper, _) = notebook(&["z = 1"]);
    assert!(!jumper.jump_to_definition(&Jump::new(Token::new("z", 0)).in_cell(4)));
  }
}
