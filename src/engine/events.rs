/// Single-subscriber, synchronous notification slot.
///
/// Registering replaces any previous listener. Dispatch happens inline on the
/// caller's thread, so the listener must not re-enter the emitter.
pub struct Signal<E> {
    listener: Option<Box<dyn FnMut(&E)>>,
}

impl<E> Default for Signal<E> {
    fn default() -> Self {
        Self { listener: None }
    }
}

impl<E> Signal<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, listener: impl FnMut(&E) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn clear(&mut self) {
        self.listener = None;
    }

    pub fn is_registered(&self) -> bool {
        self.listener.is_some()
    }

    pub fn emit(&mut self, event: &E) {
        if let Some(listener) = self.listener.as_mut() {
            listener(event);
        }
    }
}
