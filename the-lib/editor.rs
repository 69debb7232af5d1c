//! Editor surface consumed by the jumpers.
//!
//! The host owns real editor widgets; the navigation engine only needs the
//! handful of operations below. [`TextEditor`] is a plain in-memory surface
//! used by headless callers and tests.

use ropey::{
  Rope,
  RopeSlice,
};

use crate::{
  position::{
    Position,
    clamp_position,
  },
  token::{
    Token,
    token_at_position,
  },
};

/// A point on screen in window coordinates.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ScreenCoords {
  pub left: f32,
  pub top:  f32,
}

impl ScreenCoords {
  pub const fn new(left: f32, top: f32) -> Self {
    Self { left, top }
  }
}

pub trait CodeEditor {
  /// Identifier of this editor instance, unique among open editors.
  fn id(&self) -> &str;

  fn text(&self) -> RopeSlice<'_>;

  fn cursor(&self) -> Position;

  fn set_cursor(&mut self, position: Position);

  fn focus(&mut self);

  fn has_focus(&self) -> bool;

  fn mime_type(&self) -> &str;

  /// Maps a screen coordinate to a document position, if it falls on text.
  fn position_at_coords(&self, coords: ScreenCoords) -> Option<Position>;

  fn token_at(&self, position: Position) -> Token {
    token_at_position(self.text(), position)
  }
}

#[derive(Debug, Clone)]
pub struct TextEditor {
  id:          String,
  text:        Rope,
  cursor:      Position,
  focused:     bool,
  mime_type:   String,
  origin:      ScreenCoords,
  char_width:  f32,
  line_height: f32,
}

impl TextEditor {
  pub fn new(id: impl Into<String>, text: impl Into<Rope>, mime_type: impl Into<String>) -> Self {
    Self {
      id:          id.into(),
      text:        text.into(),
      cursor:      Position::zero(),
      focused:     false,
      mime_type:   mime_type.into(),
      origin:      ScreenCoords::default(),
      char_width:  8.0,
      line_height: 16.0,
    }
  }

  /// Sets the monospace cell metrics used by `position_at_coords`.
  pub fn with_metrics(mut self, origin: ScreenCoords, char_width: f32, line_height: f32) -> Self {
    self.origin = origin;
    self.char_width = char_width;
    self.line_height = line_height;
    self
  }

  pub fn with_cursor(mut self, position: Position) -> Self {
    self.set_cursor(position);
    self
  }

  pub fn set_text(&mut self, text: impl Into<Rope>) {
    self.text = text.into();
    self.cursor = clamp_position(self.text.slice(..), self.cursor);
  }

  pub fn set_mime_type(&mut self, mime_type: impl Into<String>) {
    self.mime_type = mime_type.into();
  }

  pub fn blur(&mut self) {
    self.focused = false;
  }
}

impl CodeEditor for TextEditor {
  fn id(&self) -> &str {
    &self.id
  }

  fn text(&self) -> RopeSlice<'_> {
    self.text.slice(..)
  }

  fn cursor(&self) -> Position {
    self.cursor
  }

  fn set_cursor(&mut self, position: Position) {
    self.cursor = clamp_position(self.text.slice(..), position);
  }

  fn focus(&mut self) {
    self.focused = true;
  }

  fn has_focus(&self) -> bool {
    self.focused
  }

  fn mime_type(&self) -> &str {
    &self.mime_type
  }

  fn position_at_coords(&self, coords: ScreenCoords) -> Option<Position> {
    let left = coords.left - self.origin.left;
    let top = coords.top - self.origin.top;
    if left < 0.0 || top < 0.0 || self.char_width <= 0.0 || self.line_height <= 0.0 {
      return None;
    }

    let line = (top / self.line_height) as usize;
    if line >= self.text.len_lines() {
      return None;
    }
    let column = (left / self.char_width) as usize;
    Some(clamp_position(self.text.slice(..), Position::new(line, column)))
  }
}
