use std::path::Path;

use log::LevelFilter;

/// Installs the process logger: stderr, or `log_file` when given.
/// Library `tracing` events arrive here through their `log` records.
pub fn setup(verbosity: u8, log_file: Option<&Path>) -> Result<(), fern::InitError> {
  let level = match verbosity {
    0 => LevelFilter::Warn,
    1 => LevelFilter::Info,
    2 => LevelFilter::Debug,
    _ => LevelFilter::Trace,
  };

  let dispatch = fern::Dispatch::new()
    .format(|out, message, record| {
      out.finish(format_args!(
        "{} [{}] {}",
        record.level(),
        record.target(),
        message
      ))
    })
    .level(level);

  let dispatch = match log_file {
    Some(path) => dispatch.chain(fern::log_file(path)?),
    None => dispatch.chain(std::io::stderr()),
  };
  dispatch.apply()?;
  Ok(())
}
