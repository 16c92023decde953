use std::{future::Future, pin::Pin, sync::Arc};

use log::warn;

use crate::{
    events::{EventHandler, EventProducer, Handler, OrderPlacedEvent, OrderStatusChangedEvent},
    traits::NotificationSink,
};

#[derive(Default, Clone)]
pub struct EventProducers {
    pub order_placed_producer: Vec<EventProducer<OrderPlacedEvent>>,
    pub status_changed_producer: Vec<EventProducer<OrderStatusChangedEvent>>,
}

pub struct EventHandlers {
    pub on_order_placed: Option<EventHandler<OrderPlacedEvent>>,
    pub on_status_changed: Option<EventHandler<OrderStatusChangedEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_order_placed = hooks.on_order_placed.map(|f| EventHandler::new(buffer_size, f));
        let on_status_changed = hooks.on_status_changed.map(|f| EventHandler::new(buffer_size, f));
        Self { on_order_placed, on_status_changed }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_order_placed {
            result.order_placed_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_status_changed {
            result.status_changed_producer.push(handler.subscribe());
        }
        result
    }

    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_order_placed {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
        if let Some(handler) = self.on_status_changed {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_order_placed: Option<Handler<OrderPlacedEvent>>,
    pub on_status_changed: Option<Handler<OrderStatusChangedEvent>>,
}

impl EventHooks {
    pub fn on_order_placed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(OrderPlacedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_order_placed = Some(Arc::new(f));
        self
    }

    pub fn on_status_changed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(OrderStatusChangedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_status_changed = Some(Arc::new(f));
        self
    }
}

/// Builds a status-changed hook that forwards the change to a push [`NotificationSink`].
///
/// Delivery runs on the event channel, off the request path, and a failed send is logged and dropped -- it never
/// affects the transition that triggered it.
pub fn notification_hook<S>(sink: Arc<S>) -> Handler<OrderStatusChangedEvent>
where S: NotificationSink + 'static {
    Arc::new(move |event: OrderStatusChangedEvent| {
        let sink = Arc::clone(&sink);
        Box::pin(async move {
            let title = format!("Order {}: {}", event.order.tracking_id, event.entry.status);
            if let Err(e) = sink.notify(event.order.user_id, &title, &event.entry.description).await {
                warn!("📣️ Could not deliver status notification for order {}: {e}", event.order.tracking_id);
            }
        }) as Pin<Box<dyn Future<Output = ()> + Send>>
    })
}
