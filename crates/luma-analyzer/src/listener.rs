//! Luminance listener registration

use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Receiver of luminance samples.
///
/// Called synchronously on the analysis thread; slow consumers should hand
/// samples off (see `ForwardingListener`) instead of doing the work inline.
pub trait LumaListener: Send {
    fn on_luma(&mut self, luma: f64);
}

impl<F> LumaListener for F
where
    F: FnMut(f64) + Send,
{
    fn on_luma(&mut self, luma: f64) {
        self(luma)
    }
}

/// Token returned by `register`, used to remove the listener again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerHandle(u64);

/// Ordered set of listeners
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: Vec<(ListenerHandle, Box<dyn LumaListener>)>,
    next_id: u64,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a listener; it is called after every listener registered before it
    pub fn register(&mut self, listener: impl LumaListener + 'static) -> ListenerHandle {
        let handle = ListenerHandle(self.next_id);
        self.next_id += 1;
        self.listeners.push((handle, Box::new(listener)));
        debug!("Registered luma listener {:?} ({} total)", handle, self.listeners.len());
        handle
    }

    /// Remove a listener. Returns false if the handle is unknown.
    pub fn unregister(&mut self, handle: ListenerHandle) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(h, _)| *h != handle);
        let removed = self.listeners.len() != before;
        if removed {
            debug!("Unregistered luma listener {:?}", handle);
        }
        removed
    }

    /// Invoke every listener in registration order
    pub fn notify(&mut self, luma: f64) {
        for (_, listener) in self.listeners.iter_mut() {
            listener.on_luma(luma);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.listeners.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

/// Listener that moves samples onto a channel.
///
/// Never blocks the analysis thread. With a bounded channel, samples are
/// discarded while the receiver is behind; an unbounded channel keeps every
/// sample.
#[derive(Debug, Clone)]
pub struct ForwardingListener {
    tx: Sink,
}

#[derive(Debug, Clone)]
enum Sink {
    Bounded(mpsc::Sender<f64>),
    Unbounded(mpsc::UnboundedSender<f64>),
}

impl ForwardingListener {
    pub fn new(tx: mpsc::Sender<f64>) -> Self {
        Self {
            tx: Sink::Bounded(tx),
        }
    }

    /// Create a listener together with the receiving end of its channel
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<f64>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }

    /// Create a lossless listener; the receiver buffers any backlog
    pub fn unbounded() -> (Self, mpsc::UnboundedReceiver<f64>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let listener = Self {
            tx: Sink::Unbounded(tx),
        };
        (listener, rx)
    }
}

impl LumaListener for ForwardingListener {
    fn on_luma(&mut self, luma: f64) {
        let result = match &self.tx {
            Sink::Bounded(tx) => tx.try_send(luma).map_err(|e| e.to_string()),
            Sink::Unbounded(tx) => tx.send(luma).map_err(|e| e.to_string()),
        };
        if let Err(e) = result {
            warn!("Luma sample {:.1} not forwarded: {}", luma, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recorder(log: &Arc<Mutex<Vec<&'static str>>>, name: &'static str) -> impl LumaListener {
        let log = Arc::clone(log);
        move |_luma: f64| log.lock().unwrap().push(name)
    }

    #[test]
    fn test_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ListenerRegistry::new();

        registry.register(recorder(&log, "first"));
        registry.register(recorder(&log, "second"));
        registry.register(recorder(&log, "third"));
        registry.register(recorder(&log, "fourth"));

        registry.notify(42.0);
        registry.notify(43.0);

        assert_eq!(
            *log.lock().unwrap(),
            vec!["first", "second", "third", "fourth", "first", "second", "third", "fourth"]
        );
    }

    #[test]
    fn test_unregister() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ListenerRegistry::new();

        let a = registry.register(recorder(&log, "a"));
        let b = registry.register(recorder(&log, "b"));
        registry.register(recorder(&log, "c"));

        assert!(registry.unregister(b));
        assert!(!registry.unregister(b));
        assert_eq!(registry.len(), 2);

        registry.notify(1.0);
        assert_eq!(*log.lock().unwrap(), vec!["a", "c"]);

        assert!(registry.unregister(a));
        assert_ne!(a, b);
    }

    #[test]
    fn test_handles_not_reused() {
        let mut registry = ListenerRegistry::new();
        let first = registry.register(|_: f64| {});
        registry.unregister(first);
        let second = registry.register(|_: f64| {});

        assert_ne!(first, second);
        assert!(!registry.unregister(first));
    }

    #[test]
    fn test_forwarding_listener_drops_when_full() {
        let (mut listener, mut rx) = ForwardingListener::channel(1);

        listener.on_luma(10.0);
        listener.on_luma(20.0);

        assert_eq!(rx.try_recv().unwrap(), 10.0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_unbounded_forwarding_keeps_backlog() {
        let (mut listener, mut rx) = ForwardingListener::unbounded();

        for luma in 0..200 {
            listener.on_luma(luma as f64);
        }
        drop(listener);

        let mut received = Vec::new();
        while let Ok(luma) = rx.try_recv() {
            received.push(luma);
        }
        assert_eq!(received.len(), 200);
        assert_eq!(received[199], 199.0);
    }
}
