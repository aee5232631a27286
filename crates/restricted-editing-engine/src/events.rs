//! Listener registration with cancellable subscriptions.

/// Handle returned by [`Emitter::subscribe`]; pass it back to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

/// An ordered set of listeners of type `L` (usually a boxed closure)
pub struct Emitter<L> {
    next_id: u64,
    listeners: Vec<(Subscription, L)>,
}

impl<L> Default for Emitter<L> {
    fn default() -> Self {
        Self {
            next_id: 0,
            listeners: Vec::new(),
        }
    }
}

impl<L> Emitter<L> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: L) -> Subscription {
        let subscription = Subscription(self.next_id);
        self.next_id += 1;
        self.listeners.push((subscription, listener));
        subscription
    }

    /// Returns false if the subscription was already cancelled
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(id, _)| *id != subscription);
        self.listeners.len() != before
    }

    /// Listeners in subscription order
    pub fn listeners_mut(&mut self) -> impl Iterator<Item = &mut L> {
        self.listeners.iter_mut().map(|(_, listener)| listener)
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
