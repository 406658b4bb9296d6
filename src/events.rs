//! The typed topic event bus (C6, §4.5). Four topics — `OrderPlaced`,
//! `TradeExecuted`, `OrderCancelled`, `OrderModified` — each with its own
//! subscriber list. Publication is fire-and-forget: the publisher enqueues
//! onto an unbounded channel and returns immediately; a single background
//! dispatcher thread drains the channel and invokes subscribers, so a
//! subscriber that panics or runs long never blocks `OrderManager`.
//!
//! A single dispatcher thread draining one ordered channel also gives the
//! stronger-than-required guarantee that subscribers see *all* events in
//! global publish order, not just same-order-id order (§4.5).

use crate::domain::{Fill, Order};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use tracing::{error, warn};

/// One of the four lifecycle events the core publishes.
#[derive(Debug, Clone)]
pub enum Event {
    OrderPlaced(Order),
    TradeExecuted(Fill),
    OrderCancelled(Order),
    OrderModified { old: Order, new: Order },
}

impl Event {
    fn topic(&self) -> Topic {
        match self {
            Event::OrderPlaced(_) => Topic::OrderPlaced,
            Event::TradeExecuted(_) => Topic::TradeExecuted,
            Event::OrderCancelled(_) => Topic::OrderCancelled,
            Event::OrderModified { .. } => Topic::OrderModified,
        }
    }
}

/// The four topics subscribers register against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    OrderPlaced,
    TradeExecuted,
    OrderCancelled,
    OrderModified,
}

/// A subscriber callback for one topic. `Arc<dyn Fn>` mirrors the
/// teacher's `TradeListener` pattern (a shared, thread-safe listener
/// handle registered once at startup).
pub type Handler = Arc<dyn Fn(&Event) + Send + Sync>;

struct Subscribers {
    order_placed: Vec<Handler>,
    trade_executed: Vec<Handler>,
    order_cancelled: Vec<Handler>,
    order_modified: Vec<Handler>,
}

impl Subscribers {
    fn new() -> Self {
        Self {
            order_placed: Vec::new(),
            trade_executed: Vec::new(),
            order_cancelled: Vec::new(),
            order_modified: Vec::new(),
        }
    }

    fn for_topic(&self, topic: Topic) -> &[Handler] {
        match topic {
            Topic::OrderPlaced => &self.order_placed,
            Topic::TradeExecuted => &self.trade_executed,
            Topic::OrderCancelled => &self.order_cancelled,
            Topic::OrderModified => &self.order_modified,
        }
    }

    fn add(&mut self, topic: Topic, handler: Handler) {
        match topic {
            Topic::OrderPlaced => self.order_placed.push(handler),
            Topic::TradeExecuted => self.trade_executed.push(handler),
            Topic::OrderCancelled => self.order_cancelled.push(handler),
            Topic::OrderModified => self.order_modified.push(handler),
        }
    }
}

/// The publish/subscribe event bus. Subscribers register once, typically
/// at startup (§9: "no dynamic `on(string, any)` surface").
pub struct EventBus {
    sender: crossbeam::channel::Sender<Event>,
    subscribers: Arc<parking_lot::RwLock<Subscribers>>,
    _dispatcher: std::thread::JoinHandle<()>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, receiver) = crossbeam::channel::unbounded::<Event>();
        let subscribers = Arc::new(parking_lot::RwLock::new(Subscribers::new()));
        let dispatcher_subscribers = Arc::clone(&subscribers);

        let dispatcher = std::thread::spawn(move || {
            while let Ok(event) = receiver.recv() {
                let topic = event.topic();
                let handlers = dispatcher_subscribers.read();
                for handler in handlers.for_topic(topic) {
                    // Subscribers log and swallow their own errors (§4.5);
                    // a panicking handler must not take down the
                    // dispatcher thread or any other subscriber.
                    if catch_unwind(AssertUnwindSafe(|| handler(&event))).is_err() {
                        error!(?topic, "event subscriber panicked");
                    }
                }
            }
            warn!("event bus dispatcher stopped: all senders dropped");
        });

        Self {
            sender,
            subscribers,
            _dispatcher: dispatcher,
        }
    }

    /// Registers `handler` against `topic`. Subscribers are expected to
    /// register at startup; nothing prevents a later call, but there is no
    /// corresponding `unsubscribe`.
    pub fn subscribe(&self, topic: Topic, handler: Handler) {
        self.subscribers.write().add(topic, handler);
    }

    /// Publishes `event`. Never blocks on subscriber work and never
    /// surfaces a subscriber's error to the caller (§4.5).
    pub fn publish(&self, event: Event) {
        if self.sender.send(event).is_err() {
            error!("event bus dispatcher is gone; event dropped");
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Commodity, OrderKind, OrderStatus, Side, TimeInForce, UserId};
    use rust_decimal::Decimal;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use uuid::Uuid;

    fn sample_order() -> Order {
        Order {
            id: Uuid::new_v4(),
            user_id: UserId::new_v4(),
            commodity: Commodity::CrudeOil,
            side: Side::Buy,
            kind: OrderKind::Limit,
            quantity: Decimal::from(100),
            limit_price: Some(Decimal::from(80)),
            stop_price: None,
            time_in_force: TimeInForce::Gtc,
            created_at: 0,
            updated_at: 0,
            status: OrderStatus::Pending,
            filled_quantity: Decimal::ZERO,
            remaining_quantity: Decimal::from(100),
            avg_fill_price: Decimal::ZERO,
            fill_ids: Vec::new(),
        }
    }

    fn wait_until(mut pred: impl FnMut() -> bool) {
        for _ in 0..200 {
            if pred() {
                return;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        panic!("condition never became true");
    }

    #[test]
    fn subscriber_receives_published_event() {
        let bus = EventBus::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);
        bus.subscribe(
            Topic::OrderPlaced,
            Arc::new(move |_event| {
                count_clone.fetch_add(1, Ordering::SeqCst);
            }),
        );

        bus.publish(Event::OrderPlaced(sample_order()));
        wait_until(|| count.load(Ordering::SeqCst) == 1);
    }

    #[test]
    fn panicking_subscriber_does_not_stop_other_subscribers() {
        let bus = EventBus::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);

        bus.subscribe(Topic::OrderPlaced, Arc::new(|_event| panic!("boom")));
        bus.subscribe(
            Topic::OrderPlaced,
            Arc::new(move |_event| {
                count_clone.fetch_add(1, Ordering::SeqCst);
            }),
        );

        bus.publish(Event::OrderPlaced(sample_order()));
        wait_until(|| count.load(Ordering::SeqCst) == 1);
    }

    #[test]
    fn subscribers_only_see_their_own_topic() {
        let bus = EventBus::new();
        let trade_count = Arc::new(AtomicUsize::new(0));
        let trade_count_clone = Arc::clone(&trade_count);
        bus.subscribe(
            Topic::TradeExecuted,
            Arc::new(move |_event| {
                trade_count_clone.fetch_add(1, Ordering::SeqCst);
            }),
        );

        bus.publish(Event::OrderPlaced(sample_order()));
        bus.publish(Event::OrderCancelled(sample_order()));
        // Give the dispatcher a moment; neither event should reach the
        // TradeExecuted subscriber.
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(trade_count.load(Ordering::SeqCst), 0);
    }
}
