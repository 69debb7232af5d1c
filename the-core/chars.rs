use ropey::RopeSlice;

#[derive(Debug, Eq, PartialEq)]
pub enum CharCategory {
  Whitespace,
  Eol,
  Identifier,
  Other,
}

pub fn categorize_char(ch: char) -> CharCategory {
  match ch {
    c if char_is_line_ending(c) => CharCategory::Eol,
    c if c.is_whitespace() => CharCategory::Whitespace,
    c if char_is_identifier(c) => CharCategory::Identifier,
    _ => CharCategory::Other,
  }
}

#[inline]
pub fn char_is_line_ending(ch: char) -> bool {
  matches!(
    ch,
    '\u{000A}' | '\u{000B}' | '\u{000C}' | '\u{000D}' | '\u{0085}' | '\u{2028}' | '\u{2029}'
  )
}

/// Characters that may continue an identifier.
///
/// `.` is deliberately absent: `os.path` yields the tokens `os` and `path`.
#[inline]
pub fn char_is_identifier(ch: char) -> bool {
  ch.is_alphanumeric() || ch == '_'
}

#[inline]
pub fn char_is_identifier_start(ch: char) -> bool {
  ch.is_alphabetic() || ch == '_'
}

/// Returns `true` if `word` looks like a name a definition could bind.
pub fn is_identifier(word: &str) -> bool {
  let mut chars = word.chars();
  match chars.next() {
    Some(first) if char_is_identifier_start(first) => chars.all(char_is_identifier),
    _ => false,
  }
}

/// Char range of the identifier touching `char_idx`.
///
/// A caret sitting right after the last character of an identifier still
/// resolves to that identifier, matching how editors report the token under
/// the cursor at a word end.
pub fn identifier_range_at(text: RopeSlice, char_idx: usize) -> Option<(usize, usize)> {
  let len = text.len_chars();
  let char_idx = char_idx.min(len);

  let at = (char_idx < len && char_is_identifier(text.char(char_idx))).then_some(char_idx);
  let before = (char_idx > 0 && char_is_identifier(text.char(char_idx - 1))).then(|| char_idx - 1);
  let seed = at.or(before)?;

  let mut start = seed;
  while start > 0 && char_is_identifier(text.char(start - 1)) {
    start -= 1;
  }
  let mut end = seed + 1;
  while end < len && char_is_identifier(text.char(end)) {
    end += 1;
  }

  Some((start, end))
}

/// Whether the occurrence `start..end` stands on identifier boundaries.
pub fn is_whole_identifier(text: &[char], start: usize, end: usize) -> bool {
  let left = start == 0 || !char_is_identifier(text[start - 1]);
  let right = end >= text.len() || !char_is_identifier(text[end]);
  left && right
}
