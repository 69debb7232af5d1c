mod cli;
mod logging;

use std::{
  fs::File,
  io::BufReader,
  process::ExitCode,
  rc::Rc,
};

use anyhow::{
  Context,
  Result,
};
use ropey::Rope;
use the_goto::{
  Navigator,
  Settings,
  commands::JumpCommand,
  settings,
};
use the_lib::{
  editor::{
    CodeEditor,
    TextEditor,
  },
  host::{
    DocumentHost,
    HostError,
    OpenRequest,
  },
  language::mime_from_language,
};

use crate::cli::CliOptions;

const EDITOR_ID: &str = "cli";

/// Only the file given on the command line is open.
struct SingleFileHost;

impl DocumentHost for SingleFileHost {
  fn open(&self, request: &OpenRequest) -> Result<(), HostError> {
    Err(HostError::Rejected {
      path:   request.path.clone(),
      reason: "only the searched file is open".to_string(),
    })
  }
}

fn main() -> Result<ExitCode> {
  let options = CliOptions::parse()?;
  logging::setup(options.verbosity, options.log_file.as_deref())
    .context("could not initialize logging")?;
  settings::reload(Settings::default());

  run(&options)
}

fn run(options: &CliOptions) -> Result<ExitCode> {
  let file = File::open(&options.file)
    .with_context(|| format!("could not open {}", options.file.display()))?;
  let text = Rope::from_reader(BufReader::new(file))
    .with_context(|| format!("could not read {}", options.file.display()))?;

  let editor = TextEditor::new(EDITOR_ID, text, mime_from_language(&options.language))
    .with_cursor(options.position);
  let mut navigator = Navigator::new(Rc::new(SingleFileHost));
  navigator.file_editor_added(Box::new(editor), &options.file);

  if !navigator.execute(JumpCommand::JumpFileEditor) {
    log::info!("no definition found");
    return Ok(ExitCode::FAILURE);
  }
  print_location(&navigator, options);

  if options.back {
    if !navigator.execute(JumpCommand::JumpBackFileEditor) {
      return Ok(ExitCode::FAILURE);
    }
    print_location(&navigator, options);
  }

  Ok(ExitCode::SUCCESS)
}

fn print_location(navigator: &Navigator, options: &CliOptions) {
  let Some(jumper) = navigator.file_jumper(EDITOR_ID) else {
    return;
  };
  let cursor = jumper.editor().cursor();
  println!(
    "{}:{}:{}",
    options.file.display(),
    cursor.line + 1,
    cursor.column + 1
  );
}
