/// Prefix carried by source-code content types, e.g. `text/x-python`.
pub const MIME_PREFIX: &str = "text/x-";

/// Derives a language id from a document content type.
///
/// `text/x-rsrc` is the legacy R identifier and maps to `R`; every other
/// identifier passes through with the prefix removed.
pub fn language_from_mime(mime: &str) -> String {
  let language = mime.strip_prefix(MIME_PREFIX).unwrap_or(mime);
  match language {
    "rsrc" => "R".to_string(),
    other => other.to_string(),
  }
}

/// Content type for a language id; the inverse of [`language_from_mime`].
pub fn mime_from_language(language: &str) -> String {
  match language {
    "R" | "r" => format!("{MIME_PREFIX}rsrc"),
    other => format!("{MIME_PREFIX}{other}"),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn strips_prefix_and_remaps_r() {
    assert_eq!(language_from_mime("text/x-python"), "python");
    assert_eq!(language_from_mime("text/x-rsrc"), "R");
    assert_eq!(language_from_mime("text/x-julia"), "julia");
    assert_eq!(language_from_mime("text/plain"), "text/plain");
  }

  #[test]
  fn mime_round_trips_through_language() {
    for language in ["python", "R", "julia"] {
      assert_eq!(language_from_mime(&mime_from_language(language)), language);
    }
    assert_eq!(mime_from_language("r"), "text/x-rsrc");
  }
}
