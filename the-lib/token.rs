use ropey::RopeSlice;
use the_core::chars::identifier_range_at;

use crate::position::{
  Position,
  char_idx_at_position,
};

/// An identifier and the char offset it starts at.
///
/// For notebook cells the offset is local to the owning cell's text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
  pub value:  String,
  pub offset: usize,
}

impl Token {
  pub fn new(value: impl Into<String>, offset: usize) -> Self {
    Self {
      value: value.into(),
      offset,
    }
  }

  /// A token with no text, reported when nothing word-like is under the
  /// caret.
  pub fn empty(offset: usize) -> Self {
    Self {
      value: String::new(),
      offset,
    }
  }

  pub fn is_empty(&self) -> bool {
    self.value.is_empty()
  }

  pub fn len(&self) -> usize {
    self.value.chars().count()
  }

  pub fn end(&self) -> usize {
    self.offset + self.len()
  }
}

/// Identifier under `char_idx`, or an empty token.
pub fn token_at_char_idx(text: RopeSlice, char_idx: usize) -> Token {
  match identifier_range_at(text, char_idx) {
    Some((start, end)) => Token::new(text.slice(start..end).to_string(), start),
    None => Token::empty(char_idx.min(text.len_chars())),
  }
}

pub fn token_at_position(text: RopeSlice, position: Position) -> Token {
  token_at_char_idx(text, char_idx_at_position(text, position))
}

#[cfg(test)]
mod tests {
  use ropey::Rope;

  use super::*;

  #[test]
  fn extracts_identifier_under_caret() {
    let text = Rope::from("value = compute(x)\n");
    let token = token_at_position(text.slice(..), Position::new(0, 10));
    assert_eq!(token, Token::new("compute", 8));
    assert_eq!(token.end(), 15);
  }

  #[test]
  fn reports_empty_token_between_words() {
    let text = Rope::from("a  +  b");
    let token = token_at_char_idx(text.slice(..), 3);
    assert!(token.is_empty());
    assert_eq!(token.offset, 3);
  }
}
