use std::io::{BufRead, BufReader};
use std::time::Duration;
use tokio::sync::mpsc;

/// Session events
#[derive(Debug, PartialEq, Eq)]
pub enum Event {
  /// One line of user input, without the newline
  Line(String),
  /// Periodic tick for store polling
  Tick,
  /// Input closed
  Eof,
}

/// Event handler that produces events from line input and a tick timer
pub struct EventHandler {
  rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
  /// Read lines from stdin, ticking at the given rate
  pub fn new(tick_rate: Duration) -> Self {
    Self::from_reader(BufReader::new(std::io::stdin()), tick_rate)
  }

  /// Read lines from any blocking reader, ticking at the given rate.
  ///
  /// The reader runs on its own OS thread so runtime shutdown never waits on
  /// a blocked read.
  pub fn from_reader<R>(reader: R, tick_rate: Duration) -> Self
  where
    R: BufRead + Send + 'static,
  {
    let (tx, rx) = mpsc::unbounded_channel();

    let input_tx = tx.clone();
    std::thread::spawn(move || {
      for line in reader.lines() {
        let Ok(line) = line else { break };
        if input_tx.send(Event::Line(line)).is_err() {
          return;
        }
      }
      let _ = input_tx.send(Event::Eof);
    });

    tokio::spawn(async move {
      let mut interval = tokio::time::interval(tick_rate);
      interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
      loop {
        interval.tick().await;
        if tx.send(Event::Tick).is_err() {
          break;
        }
      }
    });

    Self { rx }
  }

  /// Receive the next event
  pub async fn next(&mut self) -> Option<Event> {
    self.rx.recv().await
  }
}
