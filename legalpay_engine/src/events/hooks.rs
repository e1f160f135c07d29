use std::{future::Future, pin::Pin, sync::Arc};

use crate::events::{AuditEvent, EventHandler, EventProducer, Handler};

#[derive(Default, Clone)]
pub struct EventProducers {
    pub audit_producer: Vec<EventProducer<AuditEvent>>,
}

pub struct EventHandlers {
    pub on_audit_event: Option<EventHandler<AuditEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_audit_event = hooks.on_audit_event.map(|f| EventHandler::new(buffer_size, f));
        Self { on_audit_event }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_audit_event {
            result.audit_producer.push(handler.subscribe());
        }
        result
    }

    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_audit_event {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_audit_event: Option<Handler<AuditEvent>>,
}

impl EventHooks {
    pub fn on_audit_event<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(AuditEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_audit_event = Some(Arc::new(f));
        self
    }
}
