use std::fmt;

use uuid::Uuid;

/// Handle returned by [`DataAvailableEvent::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl From<Uuid> for SubscriptionId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

pub type DataAvailableHandler = Box<dyn FnMut() + Send>;

/// Raised whenever a source has new data ready to plot.
#[derive(Default)]
pub struct DataAvailableEvent {
    handlers: Vec<(SubscriptionId, DataAvailableHandler)>,
}

impl DataAvailableEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, handler: impl FnMut() + Send + 'static) -> SubscriptionId {
        let id = SubscriptionId::from(Uuid::new_v4());
        self.handlers.push((id, Box::new(handler)));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(handler_id, _)| *handler_id != id);
        self.handlers.len() != before
    }

    /// Calls every handler, oldest subscription first.
    pub fn raise(&mut self) {
        for (_, handler) in &mut self.handlers {
            handler();
        }
    }

    pub fn listener_count(&self) -> usize {
        self.handlers.len()
    }
}

impl fmt::Debug for DataAvailableEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataAvailableEvent")
            .field("listeners", &self.handlers.len())
            .finish()
    }
}

/// Something that produces data for a plot and announces when it has more.
pub trait PlotSource {
    fn data_available(&mut self) -> &mut DataAvailableEvent;
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    use super::*;

    #[derive(Default)]
    struct SampleSource {
        points: Vec<f32>,
        event: DataAvailableEvent,
    }

    impl SampleSource {
        fn push(&mut self, point: f32) {
            self.points.push(point);
            self.event.raise();
        }
    }

    impl PlotSource for SampleSource {
        fn data_available(&mut self) -> &mut DataAvailableEvent {
            &mut self.event
        }
    }

    #[test]
    fn test_source_notifies_subscribers() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);

        let mut source = SampleSource::default();
        source.data_available().subscribe(move || {
            counter.fetch_add(1, Ordering::Relaxed);
        });

        source.push(0.5);
        source.push(0.25);
        assert_eq!(hits.load(Ordering::Relaxed), 2);
        assert_eq!(source.points, vec![0.5, 0.25]);
    }

    #[test]
    fn test_handlers_run_in_subscription_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut event = DataAvailableEvent::new();
        for name in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            event.subscribe(move || order.lock().unwrap().push(name));
        }

        event.raise();
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_unsubscribed_handler_is_not_called() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);

        let mut event = DataAvailableEvent::new();
        let id = event.subscribe(move || {
            counter.fetch_add(1, Ordering::Relaxed);
        });
        assert_eq!(event.listener_count(), 1);

        assert!(event.unsubscribe(id));
        assert!(!event.unsubscribe(id));
        event.raise();
        assert_eq!(hits.load(Ordering::Relaxed), 0);
        assert_eq!(event.listener_count(), 0);
    }

    #[test]
    fn test_raise_without_listeners_is_noop() {
        let mut event = DataAvailableEvent::new();
        event.raise();
        assert_eq!(event.listener_count(), 0);
    }
}
