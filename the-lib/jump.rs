//! Navigation targets.

use ropey::RopeSlice;

use crate::{
  position::{
    Position,
    clamp_position,
    position_at_char_idx,
  },
  token::Token,
};

/// How a [`JumpPosition`] addresses its target.
///
/// Lexical lookups produce token offsets; LSP results and saved carets
/// produce line/column pairs. Only one form is authoritative per position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Anchor {
  Token(Token),
  Coords(Position),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JumpPosition {
  pub anchor: Anchor,
  /// Owning cell for notebook positions.
  pub cell:   Option<usize>,
  /// Id of the owning cell editor. Takes precedence over `cell` so the
  /// position follows its cell when cells are inserted or removed.
  pub editor: Option<String>,
}

impl JumpPosition {
  pub fn from_token(token: Token) -> Self {
    Self {
      anchor: Anchor::Token(token),
      cell:   None,
      editor: None,
    }
  }

  pub fn from_coords(position: Position) -> Self {
    Self {
      anchor: Anchor::Coords(position),
      cell:   None,
      editor: None,
    }
  }

  pub fn in_cell(mut self, cell: usize) -> Self {
    self.cell = Some(cell);
    self
  }

  pub fn in_editor(mut self, editor_id: impl Into<String>) -> Self {
    self.editor = Some(editor_id.into());
    self
  }

  /// Concrete caret placement for this position within `text`.
  pub fn resolve(&self, text: RopeSlice) -> Position {
    match &self.anchor {
      Anchor::Token(token) => position_at_char_idx(text, token.offset),
      Anchor::Coords(position) => clamp_position(text, *position),
    }
  }
}

/// A jump request originating from a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Jump {
  pub token: Token,
  /// Cell holding `token`; `None` means the active cell.
  pub cell:  Option<usize>,
}

impl Jump {
  pub fn new(token: Token) -> Self {
    Self { token, cell: None }
  }

  pub fn in_cell(mut self, cell: usize) -> Self {
    self.cell = Some(cell);
    self
  }
}

/// A target that may live in another document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalJumpTarget {
  pub uri:          String,
  pub editor_index: usize,
  pub line:         usize,
  pub column:       usize,
}

#[cfg(test)]
mod tests {
  use ropey::Rope;

  use super::*;

  #[test]
  fn resolves_both_addressing_forms() {
    let text = Rope::from("import os\nx = os.getcwd()\n");
    let slice = text.slice(..);

    let by_token = JumpPosition::from_token(Token::new("x", 10));
    assert_eq!(by_token.resolve(slice), Position::new(1, 0));

    let by_coords = JumpPosition::from_coords(Position::new(1, 4));
    assert_eq!(by_coords.resolve(slice), Position::new(1, 4));

    let past_end = JumpPosition::from_coords(Position::new(1, 400));
    assert_eq!(past_end.resolve(slice), Position::new(1, 15));
  }
}
