//! Token Locator: nearest preceding definition of a name.
//!
//! The scan walks lines backward from the search start and, within a line,
//! occurrences right to left. The first occurrence a [`RuleSet`] accepts as
//! definition-like wins, so the closest preceding definition is reported
//! rather than the first one in the document.

use std::sync::Arc;

use ropey::{
  Rope,
  RopeSlice,
};
use the_core::chars::{
  is_identifier,
  is_whole_identifier,
};
use tracing::trace;

use crate::{
  rules::RuleSet,
  token::Token,
};

#[derive(Debug, Clone)]
pub struct Locator {
  rules: Arc<RuleSet>,
}

impl Locator {
  pub fn new(rules: Arc<RuleSet>) -> Self {
    Self { rules }
  }

  pub fn rules(&self) -> &RuleSet {
    &self.rules
  }

  /// Searches `text` backward from `search_start` (exclusive) for a
  /// definition-like occurrence of `token`.
  pub fn find_last_definition(
    &self,
    text: RopeSlice,
    token: &Token,
    search_start: usize,
  ) -> Option<Token> {
    if !is_identifier(&token.value) {
      return None;
    }
    let needle: Vec<char> = token.value.chars().collect();
    let search_start = search_start.min(text.len_chars());
    let last_line = text.char_to_line(search_start);

    for line_idx in (0..=last_line).rev() {
      let line_start = text.line_to_char(line_idx);
      let line: Vec<char> = text
        .line(line_idx)
        .chars()
        .take_while(|ch| *ch != '\n' && *ch != '\r')
        .collect();
      let limit = if line_idx == last_line {
        (search_start - line_start).min(line.len())
      } else {
        line.len()
      };

      for column in (0..limit).rev() {
        let end = column + needle.len();
        if end > line.len()
          || line[column..end] != needle[..]
          || !is_whole_identifier(&line, column, end)
        {
          continue;
        }

        let before: String = line[..column].iter().collect();
        let after: String = line[end..].iter().collect();
        if let Some(rule) = self.rules.definition_rule(&before, &after) {
          trace!(
            name = %token.value,
            line = line_idx,
            rule = rule.name(),
            "definition-like occurrence"
          );
          return Some(Token::new(token.value.clone(), line_start + column));
        }
      }
    }

    None
  }

  /// Searches a notebook: the origin cell backward from `token.offset`, then
  /// each earlier cell from its end. Later cells are never searched.
  ///
  /// Returns the owning cell and a token whose offset is local to it.
  pub fn find_last_definition_in_cells(
    &self,
    cells: &CellSequence,
    cell: usize,
    token: &Token,
  ) -> Option<(usize, Token)> {
    let search_start = cells.to_global(cell, token.offset)?;
    let found = self.find_last_definition(cells.text(), token, search_start)?;
    let (owner, offset) = cells.to_local(found.offset);
    Some((owner, Token::new(found.value, offset)))
  }
}

/// Cells joined in reading order, one line break between neighbours.
#[derive(Debug, Clone)]
pub struct CellSequence {
  text:  Rope,
  bases: Vec<usize>,
  lens:  Vec<usize>,
}

impl CellSequence {
  pub fn new<'a>(cells: impl IntoIterator<Item = RopeSlice<'a>>) -> Self {
    let mut text = String::new();
    let mut bases = Vec::new();
    let mut lens = Vec::new();
    let mut base = 0;

    for (idx, cell) in cells.into_iter().enumerate() {
      if idx > 0 {
        text.push('\n');
        base += 1;
      }
      bases.push(base);
      lens.push(cell.len_chars());
      base += cell.len_chars();
      text.extend(cell.chunks());
    }

    Self {
      text: Rope::from(text),
      bases,
      lens,
    }
  }

  pub fn text(&self) -> RopeSlice<'_> {
    self.text.slice(..)
  }

  pub fn len(&self) -> usize {
    self.bases.len()
  }

  pub fn is_empty(&self) -> bool {
    self.bases.is_empty()
  }

  pub fn to_global(&self, cell: usize, offset: usize) -> Option<usize> {
    let base = self.bases.get(cell)?;
    Some(base + offset.min(self.lens[cell]))
  }

  pub fn to_local(&self, global: usize) -> (usize, usize) {
    let cell = self
      .bases
      .partition_point(|base| *base <= global)
      .saturating_sub(1);
    let base = self.bases.get(cell).copied().unwrap_or(0);
    (cell, global - base)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    position::{
      Position,
      position_at_char_idx,
    },
    rules::RuleSet,
  };

  fn python() -> Locator {
    Locator::new(Arc::new(RuleSet::python()))
  }

  fn offset_of(text: &str, needle: &str, nth: usize) -> usize {
    let byte = text
      .match_indices(needle)
      .nth(nth)
      .map(|(idx, _)| idx)
      .expect("needle present");
    text[..byte].chars().count()
  }

  #[test]
  fn finds_function_definition_before_call() {
    let source = "def foo():\n    pass\n\nfoo()\n";
    let text = Rope::from(source);
    let call = offset_of(source, "foo", 1);
    let token = Token::new("foo", call);

    let found = python()
      .find_last_definition(text.slice(..), &token, call)
      .expect("definition");
    assert_eq!(found.offset, 4);
    assert_eq!(
      position_at_char_idx(text.slice(..), found.offset),
      Position::new(0, 4)
    );
  }

  #[test]
  fn closest_preceding_definition_wins() {
    let source = "x = 1\nprint(x)\nx = 2\nprint(x)\n";
    let text = Rope::from(source);
    let use_site = offset_of(source, "x", 3);

    let found = python()
      .find_last_definition(text.slice(..), &Token::new("x", use_site), use_site)
      .expect("definition");
    assert_eq!(found.offset, offset_of(source, "x", 2));
  }

  #[test]
  fn later_definitions_are_ignored() {
    let source = "print(y)\ny = 1\n";
    let text = Rope::from(source);

    let found = python().find_last_definition(text.slice(..), &Token::new("y", 6), 6);
    assert_eq!(found, None);
  }

  #[test]
  fn partial_names_and_comments_do_not_match() {
    let source = "foobar = 1\n# foo = 2\nfoo\n";
    let text = Rope::from(source);
    let use_site = offset_of(source, "foo", 2);

    let found =
      python().find_last_definition(text.slice(..), &Token::new("foo", use_site), use_site);
    assert_eq!(found, None);
  }

  #[test]
  fn empty_or_non_identifier_tokens_find_nothing() {
    let text = Rope::from("x = 1\n+\n");
    assert_eq!(
      python().find_last_definition(text.slice(..), &Token::empty(6), 6),
      None
    );
    assert_eq!(
      python().find_last_definition(text.slice(..), &Token::new("+", 6), 6),
      None
    );
  }

  #[test]
  fn notebook_search_walks_back_through_cells() {
    let cells = [
      Rope::from("import numpy as np\ndata = np.arange(3)"),
      Rope::from("print(data)\nother = 1"),
      Rope::from("data.sum()\ndata = None"),
    ];
    let sequence = CellSequence::new(cells.iter().map(|cell| cell.slice(..)));
    let token = Token::new("data", 0);

    let (cell, found) = python()
      .find_last_definition_in_cells(&sequence, 2, &token)
      .expect("definition in first cell");
    assert_eq!(cell, 0);
    assert_eq!(found.offset, 19);
    assert_eq!(cells[0].slice(19..23).to_string(), "data");
  }

  #[test]
  fn notebook_search_prefers_origin_cell() {
    let cells = [Rope::from("a = 1"), Rope::from("a = 2\nb = a")];
    let sequence = CellSequence::new(cells.iter().map(|cell| cell.slice(..)));
    let token = Token::new("a", 10);

    let (cell, found) = python()
      .find_last_definition_in_cells(&sequence, 1, &token)
      .expect("definition");
    assert_eq!((cell, found.offset), (1, 0));
  }

  #[test]
  fn cell_sequence_maps_offsets_both_ways() {
    let cells = [Rope::from("ab"), Rope::from(""), Rope::from("cd")];
    let sequence = CellSequence::new(cells.iter().map(|cell| cell.slice(..)));
    assert_eq!(sequence.text().to_string(), "ab\n\ncd");
    assert_eq!(sequence.to_global(2, 1), Some(5));
    assert_eq!(sequence.to_local(5), (2, 1));
    assert_eq!(sequence.to_local(3), (1, 0));
    assert_eq!(sequence.to_global(3, 0), None);
  }

  quickcheck::quickcheck! {
      fn never_reports_an_occurrence_at_or_after_the_start(lines: Vec<u8>, start: usize) -> bool {
          let source: String = lines
              .iter()
              .map(|n| if n % 2 == 0 { "v = 1\n" } else { "print(v)\n" })
              .collect();
          let text = Rope::from(source.as_str());
          let start = start % (text.len_chars() + 1);
          match python().find_last_definition(text.slice(..), &Token::new("v", start), start) {
              Some(found) => found.offset < start && text.slice(found.offset..found.offset + 1) == "v",
              None => true,
          }
      }
  }
}
