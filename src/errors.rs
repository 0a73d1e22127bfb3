use thiserror::Error;

use crate::service::SqsMessage;

/// Boxed error returned by message handlers and carried as the cause of
/// transport failures.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by the queue directory.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SqsQueuesError {
    /// The identifier is already mapped to a queue URL. Existing mappings are
    /// never overwritten.
    #[error("queue already exists: {0}")]
    QueueIdentifierAlreadyRegistered(String),
}

/// Errors raised by a [`SqsMessageService`](crate::service::SqsMessageService).
///
/// Every operation resolves the queue identifier first; SDK failures are
/// wrapped with the identifier, the resolved URL and the attempted request.
#[derive(Debug, Error)]
pub enum SqsServiceError {
    #[error("queue does not exist: {0}")]
    QueueIdentifierNotRegistered(String),

    #[error("error while receiving message in queue: {queue_url}")]
    ReceiveMessage {
        queue_identifier: String,
        queue_url: String,
        #[source]
        source: HandlerError,
    },

    #[error("error while deleting message in queue: {queue_url}")]
    DeleteMessage {
        queue_identifier: String,
        queue_url: String,
        receipt_handle: String,
        #[source]
        source: HandlerError,
    },

    #[error("error while sending message to queue: {queue_url}")]
    SendMessage {
        queue_identifier: String,
        queue_url: String,
        message: Box<SqsMessage>,
        #[source]
        source: HandlerError,
    },
}

impl SqsServiceError {
    /// The queue identifier the failed operation targeted.
    pub fn queue_identifier(&self) -> &str {
        match self {
            SqsServiceError::QueueIdentifierNotRegistered(queue_identifier)
            | SqsServiceError::ReceiveMessage {
                queue_identifier, ..
            }
            | SqsServiceError::DeleteMessage {
                queue_identifier, ..
            }
            | SqsServiceError::SendMessage {
                queue_identifier, ..
            } => queue_identifier,
        }
    }
}

/// A message handler failed while a consumer was processing a batch.
///
/// Delivered to every error handler attached to the consumer.
#[derive(Debug, Error)]
#[error("message handler failed for queue {queue_identifier}: {source}")]
pub struct HandlerProcessingError {
    pub queue_identifier: String,
    #[source]
    pub source: HandlerError,
}

/// Errors raised while registering handlers with the manager.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HandlerRegistryError {
    #[error("consumer for queue {0} already exists")]
    ConsumerAlreadyRegistered(String),

    #[error("registering error handler for {0} without existing consumer is not allowed")]
    ErrorHandlerWithoutConsumer(String),
}

/// Errors raised by handler discovery.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscoveryError {
    #[error("multiple handlers not allowed for: {queue_identifier} trying to register handlers in {}", .declared_by.join(","))]
    MultipleHandlersNotAllowed {
        queue_identifier: String,
        declared_by: Vec<String>,
    },
}

/// Errors that abort handler registration at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BootstrapError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Registry(#[from] HandlerRegistryError),
}

/// Configuration-time failures of [`SqsModule`](crate::module::SqsModule).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SqsModuleError {
    #[error(transparent)]
    Queues(#[from] SqsQueuesError),

    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),
}
