//! Change notifications from the editing engine.
//!
//! The host feeds engine callbacks (content updates, transactions, DOM
//! mutations, resizes) into an [`EditorEvents`] hub; consumers such as the
//! pagination engine subscribe to it.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditorEvent {
    /// Document content changed.
    Update,
    /// Any committed transaction, including selection-only ones.
    Transaction,
    /// The content element changed size.
    ContentResized,
    /// The rendered DOM subtree was mutated outside a transaction.
    DomMutated,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&EditorEvent)>;

/// Subscription hub. Callbacks run synchronously, in subscription order.
#[derive(Default)]
pub struct EditorEvents {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Callback)>,
}

impl EditorEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&EditorEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    pub fn emit(&mut self, event: &EditorEvent) {
        log::trace!("editor event {event:?} -> {} subscribers", self.subscribers.len());
        for (_, callback) in &mut self.subscribers {
            callback(event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
