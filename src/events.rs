//! Event-publication seam and its recording double
//!
//! Components under test publish notifications through the
//! [`EventAggregator`] seam. The auto-mocking container stands
//! [`EventAggregatorDouble`] in for it, which records every published event;
//! the assertion helpers on [`crate::TestContext`] query that log to check
//! whether (and how often) a given event type went out. They do not track
//! events independently - the double's log is the single source of truth.

use std::any::{Any, TypeId, type_name};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::container::Mockable;
use crate::doubles::CallLog;

/// A notification a component can publish. Blanket-implemented for every
/// `'static` thread-safe type, so tests declare events as plain structs.
pub trait Event: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any + Send + Sync> Event for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// The well-known event-publication channel.
pub trait EventAggregator: Send + Sync {
    fn publish(&self, event: Arc<dyn Event>);
}

/// Recording double for [`EventAggregator`].
#[derive(Default)]
pub struct EventAggregatorDouble {
    log: CallLog,
    published: Mutex<Vec<Arc<dyn Event>>>,
}

impl EventAggregatorDouble {
    /// Number of published events of concrete type `E`.
    pub fn count_of<E: Any>(&self) -> usize {
        self.published
            .lock()
            .iter()
            .filter(|event| (***event).as_any().type_id() == TypeId::of::<E>())
            .count()
    }

    /// The published events of type `E`, in publication order.
    pub fn published_of<E: Any + Send + Sync>(&self) -> Vec<Arc<dyn Event>> {
        self.published
            .lock()
            .iter()
            .filter(|event| (***event).as_any().type_id() == TypeId::of::<E>())
            .cloned()
            .collect()
    }

    /// Total number of publish calls, regardless of event type.
    pub fn published_total(&self) -> usize {
        self.log.count("publish")
    }

    /// Assert that exactly `times` events of type `E` were published.
    pub fn assert_published_times<E: Any>(&self, times: usize) {
        let count = self.count_of::<E>();
        assert!(
            count == times,
            "expected {times} publication(s) of {}, saw {count}",
            type_name::<E>()
        );
    }

    /// Assert that no event of type `E` was published.
    pub fn assert_not_published<E: Any>(&self) {
        let count = self.count_of::<E>();
        assert!(
            count == 0,
            "expected no publication of {}, saw {count}",
            type_name::<E>()
        );
    }
}

impl EventAggregator for EventAggregatorDouble {
    fn publish(&self, event: Arc<dyn Event>) {
        self.log.record("publish", "");
        self.published.lock().push(event);
    }
}

impl Mockable for dyn EventAggregator {
    type Double = EventAggregatorDouble;
    fn from_double(double: Arc<EventAggregatorDouble>) -> Arc<dyn EventAggregator> {
        double
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    use super::*;

    struct Saved {
        name: String,
    }
    struct Deleted;

    #[test]
    fn counts_publications_by_concrete_type() {
        let agg = EventAggregatorDouble::default();
        agg.publish(Arc::new(Saved {
            name: "a".to_string(),
        }));
        agg.publish(Arc::new(Saved {
            name: "b".to_string(),
        }));
        agg.publish(Arc::new(Deleted));

        assert_eq!(agg.count_of::<Saved>(), 2);
        assert_eq!(agg.count_of::<Deleted>(), 1);
        assert_eq!(agg.published_total(), 3);
    }

    #[test]
    fn published_of_preserves_order_and_contents() {
        let agg = EventAggregatorDouble::default();
        agg.publish(Arc::new(Saved {
            name: "first".to_string(),
        }));
        agg.publish(Arc::new(Saved {
            name: "second".to_string(),
        }));

        let saved = agg.published_of::<Saved>();
        let names: Vec<&str> = saved
            .iter()
            .map(|e| (**e).as_any().downcast_ref::<Saved>().unwrap().name.as_str())
            .collect();
        assert_eq!(names, ["first", "second"]);
    }

    #[test]
    fn assertions_pass_on_the_expected_counts() {
        let agg = EventAggregatorDouble::default();
        agg.publish(Arc::new(Deleted));
        agg.assert_published_times::<Deleted>(1);
        agg.assert_not_published::<Saved>();
    }

    #[test]
    fn assertions_fail_on_the_opposite_condition() {
        let agg = EventAggregatorDouble::default();
        agg.publish(Arc::new(Deleted));

        let missing = catch_unwind(AssertUnwindSafe(|| agg.assert_published_times::<Saved>(1)));
        assert!(missing.is_err());

        let unexpected = catch_unwind(AssertUnwindSafe(|| agg.assert_not_published::<Deleted>()));
        assert!(unexpected.is_err());
    }
}
