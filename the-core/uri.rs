use std::{
  path::{
    Path,
    PathBuf,
  },
  sync::Arc,
};

use thiserror::Error;

/// Scheme prefix stripped from cross-document LSP targets.
pub const FILE_SCHEME_PREFIX: &str = "file://";

/// Directory marker under which out-of-project files are addressed.
///
/// The host resolves `<marker>/<path>` through a symlink-style mount, so a
/// file outside the editable tree can be opened like any project file.
pub const EXTERNAL_REFERENCE_MARKER: &str = ".lsp_symlink";

/// A document location known to the navigation engine.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[non_exhaustive]
pub enum Uri {
  File(Arc<Path>),
}

impl Uri {
  pub fn to_url(&self) -> Result<url::Url, UrlConversionError> {
    match self {
      Uri::File(path) => {
        url::Url::from_file_path(path)
          .map_err(|()| UrlConversionError::PathToUrlFailed(Arc::clone(path)))
      },
    }
  }

  /// LSP document URI for this file.
  ///
  /// Relative paths are appended to `file:///` verbatim; language servers
  /// bridged over the navigation endpoint resolve them against the server
  /// root.
  pub fn to_document_uri(&self) -> String {
    match self {
      Self::File(path) if path.is_absolute() => {
        match self.to_url() {
          Ok(url) => url.to_string(),
          Err(_) => format!("{FILE_SCHEME_PREFIX}{}", slash_path(path)),
        }
      },
      Self::File(path) => format!("{FILE_SCHEME_PREFIX}/{}", slash_path(path)),
    }
  }
}

impl From<PathBuf> for Uri {
  fn from(path: PathBuf) -> Self {
    Self::File(path.into())
  }
}

impl From<&Path> for Uri {
  fn from(path: &Path) -> Self {
    Self::File(path.into())
  }
}

#[derive(Debug, Error)]
pub enum UrlConversionError {
  #[error("unable to convert path to URL: {}", .0.display())]
  PathToUrlFailed(Arc<Path>),
}

/// Strips one leading `file://` if present.
pub fn strip_file_scheme(uri: &str) -> &str {
  uri.strip_prefix(FILE_SCHEME_PREFIX).unwrap_or(uri)
}

/// Builds `<marker>/<path>` with one leading slash of `path` removed.
pub fn external_reference(path: &str) -> String {
  let path = path.strip_prefix('/').unwrap_or(path);
  format!("{EXTERNAL_REFERENCE_MARKER}/{path}")
}

/// Compares two document URIs, tolerating differences in percent-encoding.
pub fn same_document(left: &str, right: &str) -> bool {
  if left == right {
    return true;
  }
  match (url::Url::parse(left), url::Url::parse(right)) {
    (Ok(left), Ok(right)) => left == right,
    _ => false,
  }
}

fn slash_path(path: &Path) -> String {
  path
    .components()
    .map(|component| component.as_os_str().to_string_lossy())
    .filter(|part| part != "/" && part != "\\")
    .collect::<Vec<_>>()
    .join("/")
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn strips_file_scheme_once() {
    assert_eq!(strip_file_scheme("file:///usr/lib/x.py"), "/usr/lib/x.py");
    assert_eq!(strip_file_scheme("file://file:///x"), "file:///x");
    assert_eq!(strip_file_scheme("/already/plain"), "/already/plain");
  }

  #[test]
  fn external_reference_drops_leading_slash() {
    assert_eq!(
      external_reference("/usr/lib/python3/os.py"),
      ".lsp_symlink/usr/lib/python3/os.py"
    );
    assert_eq!(external_reference("notes/a.py"), ".lsp_symlink/notes/a.py");
  }

  #[test]
  fn relative_document_uri_uses_triple_slash() {
    let uri = Uri::from(PathBuf::from("project/src/main.py"));
    assert_eq!(uri.to_document_uri(), "file:///project/src/main.py");
  }

  #[cfg(unix)]
  #[test]
  fn absolute_document_uri_is_percent_encoded() {
    let uri = Uri::from(PathBuf::from("/tmp/my file.py"));
    assert_eq!(uri.to_document_uri(), "file:///tmp/my%20file.py");
    assert!(same_document(
      "file:///tmp/my%20file.py",
      &uri.to_document_uri()
    ));
    assert!(!same_document("file:///tmp/a.py", "file:///tmp/b.py"));
  }
}
