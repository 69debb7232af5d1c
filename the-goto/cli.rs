use std::path::{
  Path,
  PathBuf,
};

use anyhow::{
  Result,
  bail,
};
use clap::{
  ArgAction,
  Parser,
};
use the_lib::position::Position;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CliOptions {
  pub file:      PathBuf,
  /// 0-based caret position.
  pub position:  Position,
  pub language:  String,
  pub back:      bool,
  pub verbosity: u8,
  pub log_file:  Option<PathBuf>,
}

impl CliOptions {
  pub fn parse() -> Result<Self> {
    RawCli::parse().try_into()
  }
}

#[derive(Parser, Debug)]
#[command(name = "the-goto", about, long_about = None)]
struct RawCli {
  /// File to search, optionally as FILE:LINE[:COLUMN]
  #[arg(value_name = "FILE")]
  target: String,

  /// Caret line (1-based)
  #[arg(short = 'l', long = "line", value_name = "N")]
  line: Option<usize>,

  /// Caret column (1-based)
  #[arg(short = 'c', long = "column", value_name = "N")]
  column: Option<usize>,

  /// Language id, derived from the file extension when omitted
  #[arg(long = "language", value_name = "ID")]
  language: Option<String>,

  /// Jump back after jumping and print the restored location
  #[arg(long = "back")]
  back: bool,

  /// Increase logging verbosity (repeat for more detail)
  #[arg(short = 'v', action = ArgAction::Count)]
  verbosity: u8,

  /// Save logs to a specific file
  #[arg(long = "log", value_name = "FILE")]
  log_file: Option<PathBuf>,
}

impl TryFrom<RawCli> for CliOptions {
  type Error = anyhow::Error;

  fn try_from(raw: RawCli) -> Result<Self> {
    let (file, suffix) = parse_target(&raw.target);
    let line = raw.line.or(suffix.map(|(line, _)| line)).unwrap_or(1);
    let column = raw
      .column
      .or(suffix.and_then(|(_, column)| column))
      .unwrap_or(1);
    if line == 0 || column == 0 {
      bail!("line and column are 1-based");
    }

    let language = match raw.language {
      Some(language) => language,
      None => language_for_path(&file),
    };

    Ok(Self {
      file,
      position: Position::new(line - 1, column - 1),
      language,
      back: raw.back,
      verbosity: raw.verbosity,
      log_file: raw.log_file,
    })
  }
}

/// Splits an optional `:LINE[:COLUMN]` suffix off `target`, unless the whole
/// argument names an existing file.
fn parse_target(target: &str) -> (PathBuf, Option<(usize, Option<usize>)>) {
  if Path::new(target).exists() {
    return (PathBuf::from(target), None);
  }

  let Some((head, last)) = target.rsplit_once(':') else {
    return (PathBuf::from(target), None);
  };
  let Ok(last) = last.parse::<usize>() else {
    return (PathBuf::from(target), None);
  };

  match head.rsplit_once(':') {
    Some((path, line)) => {
      match line.parse::<usize>() {
        Ok(line) => (PathBuf::from(path), Some((line, Some(last)))),
        Err(_) => (PathBuf::from(head), Some((last, None))),
      }
    },
    None => (PathBuf::from(head), Some((last, None))),
  }
}

fn language_for_path(path: &Path) -> String {
  match path.extension().and_then(|ext| ext.to_str()) {
    Some("py" | "pyi" | "ipy") => "python".to_string(),
    Some("r" | "R") => "R".to_string(),
    Some(ext) => ext.to_ascii_lowercase(),
    None => "generic".to_string(),
  }
}
