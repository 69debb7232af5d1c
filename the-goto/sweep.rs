//! Deferred hook registration for freshly opened notebooks.
//!
//! Cell editors of a new notebook are not queryable right away, so the
//! sweep over its cells runs once a fixed delay has elapsed. The host drives
//! time through [`DeferredSweeps::due`] from its own event loop.

use std::{
  collections::HashMap,
  time::{
    Duration,
    Instant,
  },
};

/// Delay between a notebook being added and its cells being hooked.
pub const NOTEBOOK_SWEEP_DELAY: Duration = Duration::from_millis(2000);

#[derive(Debug, Default)]
pub struct DeferredSweeps {
  deadlines: HashMap<String, Instant>,
}

impl DeferredSweeps {
  pub fn new() -> Self {
    Self::default()
  }

  /// Schedules a sweep of `notebook` at `now + NOTEBOOK_SWEEP_DELAY`. An
  /// already scheduled sweep keeps its deadline.
  pub fn schedule(&mut self, notebook: &str, now: Instant) -> Instant {
    *self
      .deadlines
      .entry(notebook.to_string())
      .or_insert(now + NOTEBOOK_SWEEP_DELAY)
  }

  pub fn cancel(&mut self, notebook: &str) -> bool {
    self.deadlines.remove(notebook).is_some()
  }

  pub fn is_scheduled(&self, notebook: &str) -> bool {
    self.deadlines.contains_key(notebook)
  }

  /// Earliest pending deadline, for hosts that sleep until the next sweep.
  pub fn next_deadline(&self) -> Option<Instant> {
    self.deadlines.values().min().copied()
  }

  /// Removes and returns the notebooks whose deadline has passed, oldest
  /// deadline first.
  pub fn due(&mut self, now: Instant) -> Vec<String> {
    let mut due: Vec<(Instant, String)> = self
      .deadlines
      .iter()
      .filter(|(_, deadline)| **deadline <= now)
      .map(|(notebook, deadline)| (*deadline, notebook.clone()))
      .collect();
    due.sort();

    for (_, notebook) in &due {
      self.deadlines.remove(notebook);
    }
    due.into_iter().map(|(_, notebook)| notebook).collect()
  }
}
