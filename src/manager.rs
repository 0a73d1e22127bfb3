use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::consumer::{ConsumerOptions, SqsConsumer, SqsErrorHandler, SqsMessageHandler};
use crate::errors::HandlerRegistryError;
use crate::service::SqsMessageService;

/// Owns one [`SqsConsumer`] per queue identifier and drives their lifecycle.
///
/// Registration happens once, at startup. [`start_all`](Self::start_all) and
/// [`stop_all`](Self::stop_all) are the application start and teardown hooks;
/// consumers registered after `start_all` are not started automatically.
pub struct SqsHandlersManager {
    sqs_service: Arc<dyn SqsMessageService>,
    consumer_options: ConsumerOptions,
    consumers: HashMap<String, SqsConsumer>,
}

impl std::fmt::Debug for SqsHandlersManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqsHandlersManager")
            .field("consumer_options", &self.consumer_options)
            .field("consumers", &self.consumers)
            .finish()
    }
}

impl SqsHandlersManager {
    pub fn new(sqs_service: Arc<dyn SqsMessageService>, consumer_options: ConsumerOptions) -> Self {
        SqsHandlersManager {
            sqs_service,
            consumer_options,
            consumers: HashMap::new(),
        }
    }

    /// Registered consumers by queue identifier.
    pub fn consumers(&self) -> &HashMap<String, SqsConsumer> {
        &self.consumers
    }

    pub fn consumer(&self, queue_identifier: &str) -> Option<&SqsConsumer> {
        self.consumers.get(queue_identifier)
    }

    /// Creates the consumer for `queue_identifier`. The consumer is not started.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerRegistryError::ConsumerAlreadyRegistered`] if the
    /// identifier already has a consumer; that consumer is left as it was.
    pub fn register_consumer(
        &mut self,
        queue_identifier: impl Into<String>,
        message_handler: Arc<dyn SqsMessageHandler>,
    ) -> Result<(), HandlerRegistryError> {
        let queue_identifier = queue_identifier.into();

        if self.consumers.contains_key(&queue_identifier) {
            return Err(HandlerRegistryError::ConsumerAlreadyRegistered(
                queue_identifier,
            ));
        }

        let consumer = SqsConsumer::new(
            queue_identifier.clone(),
            message_handler,
            Arc::clone(&self.sqs_service),
            self.consumer_options.clone(),
        );

        debug!(queue = %queue_identifier, "registered consumer");
        self.consumers.insert(queue_identifier, consumer);

        Ok(())
    }

    /// Attaches `error_handler` to the consumer of `queue_identifier`.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerRegistryError::ErrorHandlerWithoutConsumer`] if no
    /// consumer is registered for the identifier.
    pub fn register_error_handler(
        &mut self,
        queue_identifier: &str,
        error_handler: Arc<dyn SqsErrorHandler>,
    ) -> Result<(), HandlerRegistryError> {
        let consumer = self.consumers.get(queue_identifier).ok_or_else(|| {
            HandlerRegistryError::ErrorHandlerWithoutConsumer(queue_identifier.to_string())
        })?;

        consumer.add_error_handler(error_handler);
        debug!(queue = %queue_identifier, "registered error handler");

        Ok(())
    }

    /// Starts every registered consumer. Each first poll cycle runs on its own task.
    pub fn start_all(&self) {
        info!(consumers = self.consumers.len(), "starting consumers");

        for consumer in self.consumers.values() {
            consumer.spawn_start();
        }
    }

    /// Stops every registered consumer.
    pub fn stop_all(&self) {
        info!(consumers = self.consumers.len(), "stopping consumers");

        for consumer in self.consumers.values() {
            consumer.stop();
        }
    }
}
