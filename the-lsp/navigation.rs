//! Navigation payloads: request parameters, location decoding and the
//! UTF-16 coordinate conversion between LSP and the editor.

use ropey::RopeSlice;
use serde::Deserialize;
use serde_json::{
  Value,
  json,
};
use the_lib::position::{
  Position,
  char_idx_at_position,
  line_content_len,
};
use thiserror::Error;

use crate::command::LspCommand;

/// A position as sent over the wire. `character` counts UTF-16 code units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LspPosition {
  pub line:      u32,
  pub character: u32,
}

impl LspPosition {
  pub const fn new(line: u32, character: u32) -> Self {
    Self { line, character }
  }

  fn as_json(self) -> Value {
    json!({
      "line": self.line,
      "character": self.character,
    })
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LspRange {
  pub start: LspPosition,
  pub end:   LspPosition,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LspLocation {
  pub uri:   String,
  pub range: LspRange,
}

#[derive(Debug, Error)]
pub enum NavigationParseError {
  #[error("invalid lsp navigation result shape")]
  InvalidShape,
  #[error("failed to decode lsp navigation payload: {0}")]
  Decode(#[from] serde_json::Error),
}

/// Parameters for `command` at `position` in `uri`.
pub fn navigation_params(command: LspCommand, uri: &str, position: LspPosition) -> Value {
  match command {
    LspCommand::Definition | LspCommand::TypeDefinition => {
      json!({
        "textDocument": { "uri": uri },
        "position": position.as_json(),
      })
    },
    LspCommand::References => {
      json!({
        "textDocument": { "uri": uri },
        "position": position.as_json(),
        "context": { "includeDeclaration": true },
      })
    },
  }
}

/// Decodes `Location`, `Location[]` or `LocationLink[]`. A null result is
/// an empty list.
pub fn parse_locations_response(
  result: Option<&Value>,
) -> Result<Vec<LspLocation>, NavigationParseError> {
  let Some(result) = result else {
    return Ok(Vec::new());
  };
  if result.is_null() {
    return Ok(Vec::new());
  }

  if result.is_object() {
    let location = serde_json::from_value::<LocationPayload>(result.clone())?;
    return Ok(vec![location.into_location()]);
  }

  let Some(items) = result.as_array() else {
    return Err(NavigationParseError::InvalidShape);
  };
  if items.first().is_some_and(|item| item.get("targetUri").is_some()) {
    let links = serde_json::from_value::<Vec<LocationLinkPayload>>(result.clone())?;
    return Ok(
      links
        .into_iter()
        .map(LocationLinkPayload::into_location)
        .collect(),
    );
  }

  let locations = serde_json::from_value::<Vec<LocationPayload>>(result.clone())?;
  Ok(
    locations
      .into_iter()
      .map(LocationPayload::into_location)
      .collect(),
  )
}

/// Converts a server position into an editor position in `text`.
///
/// Lines past the end clamp to the last line and characters past the end
/// of the line clamp to the line end. A character pointing inside a
/// surrogate pair lands on that char.
pub fn from_lsp_position(text: RopeSlice, position: LspPosition) -> Position {
  let line = (position.line as usize).min(text.len_lines().saturating_sub(1));
  let line_start = text.line_to_char(line);
  let line_end = line_start + line_content_len(text.line(line));

  let start_cu = text.char_to_utf16_cu(line_start);
  let end_cu = text.char_to_utf16_cu(line_end);
  let target_cu = (start_cu + position.character as usize).min(end_cu);

  Position::new(line, text.utf16_cu_to_char(target_cu) - line_start)
}

/// Converts an editor position in `text` into a server position.
pub fn to_lsp_position(text: RopeSlice, position: Position) -> LspPosition {
  let char_idx = char_idx_at_position(text, position);
  let line = text.char_to_line(char_idx);
  let line_start = text.line_to_char(line);
  let character = text.char_to_utf16_cu(char_idx) - text.char_to_utf16_cu(line_start);
  LspPosition::new(line as u32, character as u32)
}

#[derive(Debug, Deserialize)]
struct PositionPayload {
  line:      u32,
  character: u32,
}

impl PositionPayload {
  fn into_position(self) -> LspPosition {
    LspPosition::new(self.line, self.character)
  }
}

#[derive(Debug, Deserialize)]
struct RangePayload {
  start: PositionPayload,
  end:   PositionPayload,
}

impl RangePayload {
  fn into_range(self) -> LspRange {
    LspRange {
      start: self.start.into_position(),
      end:   self.end.into_position(),
    }
  }
}

#[derive(Debug, Deserialize)]
struct LocationPayload {
  uri:   String,
  range: RangePayload,
}

impl LocationPayload {
  fn into_location(self) -> LspLocation {
    LspLocation {
      uri:   self.uri,
      range: self.range.into_range(),
    }
  }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LocationLinkPayload {
  target_uri:             String,
  target_selection_range: Option<RangePayload>,
  target_range:           RangePayload,
}

impl LocationLinkPayload {
  fn into_location(self) -> LspLocation {
    let range = self
      .target_selection_range
      .unwrap_or(self.target_range)
      .into_range();
    LspLocation {
      uri: self.target_uri,
      range,
    }
  }
}

#[cfg(test)]
mod tests {
  use ropey::Rope;
  use serde_json::json;

  use super::*;

  fn range(line: u32, start: u32, end: u32) -> Value {
    json!({
      "start": { "line": line, "character": start },
      "end": { "line": line, "character": end }
    })
  }

  #[test]
  fn parses_single_location() {
    let value = json!({ "uri": "file:///tmp/a.py", "range": range(3, 4, 7) });
    let locations = parse_locations_response(Some(&value)).expect("location parse");
    assert_eq!(locations.len(), 1);
    assert_eq!(locations[0].uri, "file:///tmp/a.py");
    assert_eq!(locations[0].range.start, LspPosition::new(3, 4));
  }

  #[test]
  fn parses_locations_array() {
    let value = json!([
      { "uri": "file:///tmp/a.py", "range": range(1, 2, 4) },
      { "uri": "file:///tmp/b.py", "range": range(0, 0, 1) }
    ]);
    let locations = parse_locations_response(Some(&value)).expect("locations parse");
    assert_eq!(locations.len(), 2);
    assert_eq!(locations[1].uri, "file:///tmp/b.py");
  }

  #[test]
  fn location_links_prefer_selection_range() {
    let value = json!([{
      "targetUri": "file:///lib/os.py",
      "targetRange": range(10, 0, 40),
      "targetSelectionRange": range(10, 4, 10)
    }]);
    let locations = parse_locations_response(Some(&value)).expect("links parse");
    assert_eq!(locations[0].uri, "file:///lib/os.py");
    assert_eq!(locations[0].range.start, LspPosition::new(10, 4));
  }

  #[test]
  fn null_and_empty_results_are_empty() {
    assert!(parse_locations_response(None).expect("none").is_empty());
    assert!(
      parse_locations_response(Some(&Value::Null))
        .expect("null")
        .is_empty()
    );
    assert!(
      parse_locations_response(Some(&json!([])))
        .expect("empty")
        .is_empty()
    );
  }

  #[test]
  fn rejects_unexpected_shapes() {
    assert!(matches!(
      parse_locations_response(Some(&json!("nope"))),
      Err(NavigationParseError::InvalidShape)
    ));
    assert!(matches!(
      parse_locations_response(Some(&json!({ "uri": 3 }))),
      Err(NavigationParseError::Decode(_))
    ));
  }

  #[test]
  fn references_include_declaration() {
    let params = navigation_params(
      LspCommand::References,
      "file:///a.py",
      LspPosition::new(2, 5),
    );
    assert_eq!(params["context"]["includeDeclaration"], json!(true));
    assert_eq!(params["position"]["character"], json!(5));
  }

  #[test]
  fn converts_utf16_columns() {
    let text = Rope::from("s = \"😀\"; name = 1\nname\n");
    let slice = text.slice(..);

    // The emoji is one char but two UTF-16 code units.
    let editor = Position::new(0, 9);
    let wire = to_lsp_position(slice, editor);
    assert_eq!(wire, LspPosition::new(0, 10));
    assert_eq!(from_lsp_position(slice, wire), editor);

    assert_eq!(
      from_lsp_position(slice, LspPosition::new(1, 99)),
      Position::new(1, 4)
    );
    assert_eq!(
      from_lsp_position(slice, LspPosition::new(40, 0)),
      Position::new(2, 0)
    );
  }
}
