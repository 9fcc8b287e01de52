use std::{future::Future, pin::Pin, sync::Arc};

use log::*;

use crate::events::{EventHandler, EventProducer, Handler, WebhookEvent};

#[derive(Default, Clone)]
pub struct EventProducers {
    pub webhook_event_producer: Vec<EventProducer<WebhookEvent>>,
}

impl EventProducers {
    /// Sends the event to every subscribed webhook observer.
    pub async fn publish_webhook_event(&self, event: &WebhookEvent) {
        for producer in &self.webhook_event_producer {
            producer.publish_event(event.clone()).await;
        }
    }
}

pub struct EventHandlers {
    pub on_webhook_event: Option<EventHandler<WebhookEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_webhook_event = hooks.on_webhook_event.map(|f| EventHandler::new(buffer_size, f));
        Self { on_webhook_event }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_webhook_event {
            result.webhook_event_producer.push(handler.subscribe());
        }
        result
    }

    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_webhook_event {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_webhook_event: Option<Handler<WebhookEvent>>,
}

impl EventHooks {
    /// Registers the generic payload observer. It sees every verified webhook event, including event types that do
    /// not change any payment status.
    pub fn on_webhook_event<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(WebhookEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_webhook_event = Some(Arc::new(f));
        self
    }
}

/// An observer that logs every webhook event it receives and does nothing else.
pub fn logging_observer() -> Handler<WebhookEvent> {
    Arc::new(|event: WebhookEvent| {
        Box::pin(async move {
            info!("🪝️ Webhook event received: {}", event.event_type());
            debug!("🪝️ Webhook payload: {}", event.payload());
        }) as Pin<Box<dyn Future<Output = ()> + Send>>
    })
}
