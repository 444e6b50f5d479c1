use tokio::sync::watch;

/// Store state plus its change notifications.
///
/// The owner reads the state directly; observers get a snapshot through a
/// `watch` receiver after every update.
pub struct Observable<S> {
  value: S,
  tx: watch::Sender<S>,
}

impl<S: Clone> Observable<S> {
  pub fn new(value: S) -> Self {
    let (tx, _rx) = watch::channel(value.clone());
    Self { value, tx }
  }

  pub fn get(&self) -> &S {
    &self.value
  }

  /// Mutate the state and notify observers.
  pub fn update(&mut self, f: impl FnOnce(&mut S)) {
    f(&mut self.value);
    self.tx.send_replace(self.value.clone());
  }

  pub fn subscribe(&self) -> watch::Receiver<S> {
    self.tx.subscribe()
  }
}
