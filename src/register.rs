use tracing::{debug, info};

use crate::config::SqsFeatureConfiguration;
use crate::discovery::SqsHandlerDiscovery;
use crate::errors::BootstrapError;
use crate::manager::SqsHandlersManager;

/// Binds discovered handlers to consumers at startup.
///
/// Queues are processed one at a time, in configuration order: message
/// handler, then error handler, then the next queue. Queues without a message
/// handler get no consumer. The first error aborts the whole run.
pub struct SqsHandlerRegister<'a> {
    handler_manager: &'a mut SqsHandlersManager,
    handler_discovery: &'a dyn SqsHandlerDiscovery,
    feature_config: &'a SqsFeatureConfiguration,
}

impl<'a> SqsHandlerRegister<'a> {
    pub fn new(
        handler_manager: &'a mut SqsHandlersManager,
        handler_discovery: &'a dyn SqsHandlerDiscovery,
        feature_config: &'a SqsFeatureConfiguration,
    ) -> Self {
        SqsHandlerRegister {
            handler_manager,
            handler_discovery,
            feature_config,
        }
    }

    /// Runs registration for every configured queue.
    pub async fn register_handlers(&mut self) -> Result<(), BootstrapError> {
        let feature_config = self.feature_config;

        for queue in &feature_config.queues {
            let queue_identifier = queue.identifier.as_str();

            let Some(message_handler) = self
                .handler_discovery
                .discover_message_handler(queue_identifier)
                .await?
            else {
                debug!(queue = %queue_identifier, "no message handler declared, skipping queue");
                continue;
            };

            self.handler_manager
                .register_consumer(queue_identifier, message_handler)?;

            if let Some(error_handler) = self
                .handler_discovery
                .discover_error_handler(queue_identifier)
                .await?
            {
                self.handler_manager
                    .register_error_handler(queue_identifier, error_handler)?;
            }

            info!(queue = %queue_identifier, "handlers registered");
        }

        Ok(())
    }
}
