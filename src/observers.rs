/// Handle returned by [`Observers::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type Callback<T> = Box<dyn Fn(&T) + Send>;

/// Change listeners attached to a store. Stores call `notify` after every
/// state change with the new state.
pub struct Observers<T> {
    next_id: u64,
    callbacks: Vec<(ObserverId, Callback<T>)>,
}

impl<T> Default for Observers<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            callbacks: Vec::new(),
        }
    }
}

impl<T> std::fmt::Debug for Observers<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("count", &self.callbacks.len())
            .finish()
    }
}

impl<T> Observers<T> {
    pub fn subscribe(&mut self, callback: impl Fn(&T) + Send + 'static) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.callbacks.push((id, Box::new(callback)));
        id
    }

    /// Returns false if the id was not subscribed.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(cid, _)| *cid != id);
        self.callbacks.len() != before
    }

    pub fn notify(&self, value: &T) {
        for (_, callback) in &self.callbacks {
            callback(value);
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_notify_reaches_every_subscriber() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut observers: Observers<u32> = Observers::default();
        for _ in 0..3 {
            let hits = hits.clone();
            observers.subscribe(move |v| {
                hits.fetch_add(*v as usize, Ordering::SeqCst);
            });
        }
        observers.notify(&2);
        assert_eq!(hits.load(Ordering::SeqCst), 6);
    }

    #[test]
    fn test_unsubscribe() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut observers: Observers<()> = Observers::default();
        let h = hits.clone();
        let id = observers.subscribe(move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });
        assert!(observers.unsubscribe(id));
        assert!(!observers.unsubscribe(id));
        observers.notify(&());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert!(observers.is_empty());
    }
}
