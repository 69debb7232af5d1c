use std::ops::{
  Add,
  AddAssign,
};

use ropey::RopeSlice;

/// A caret location in a text buffer.
/// 0-indexed line, column counted in `char`s.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
  pub line:   usize,
  pub column: usize,
}

impl AddAssign for Position {
  fn add_assign(&mut self, rhs: Self) {
    self.line += rhs.line;
    self.column += rhs.column;
  }
}

impl Add for Position {
  type Output = Position;

  fn add(mut self, rhs: Self) -> Self::Output {
    self += rhs;
    self
  }
}

impl Position {
  pub const fn new(line: usize, column: usize) -> Self {
    Self { line, column }
  }

  pub const fn zero() -> Self {
    Self { line: 0, column: 0 }
  }

  pub const fn is_zero(&self) -> bool {
    self.line == 0 && self.column == 0
  }
}

impl From<(usize, usize)> for Position {
  fn from(value: (usize, usize)) -> Self {
    Position::new(value.0, value.1)
  }
}

/// Converts a char index into a `Position`.
pub fn position_at_char_idx(text: RopeSlice, char_idx: usize) -> Position {
  let char_idx = char_idx.min(text.len_chars());
  let line = text.char_to_line(char_idx);
  let line_start = text.line_to_char(line);
  Position::new(line, char_idx - line_start)
}

/// Converts a `Position` into a char index.
///
/// A line past the end clamps to the last line; a column past the end of the
/// line clamps to the last character before the line break.
pub fn char_idx_at_position(text: RopeSlice, position: Position) -> usize {
  let line = position.line.min(text.len_lines().saturating_sub(1));
  let line_start = text.line_to_char(line);
  line_start + position.column.min(line_content_len(text.line(line)))
}

/// Clamps `position` onto the text.
pub fn clamp_position(text: RopeSlice, position: Position) -> Position {
  position_at_char_idx(text, char_idx_at_position(text, position))
}

/// Number of chars on a line, not counting its line break.
pub fn line_content_len(line: RopeSlice) -> usize {
  let mut len = line.len_chars();
  if len > 0 && line.char(len - 1) == '\n' {
    len -= 1;
  }
  if len > 0 && line.char(len - 1) == '\r' {
    len -= 1;
  }
  len
}
