use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_sqs::types::Message;

use crate::errors::{HandlerError, HandlerProcessingError};

/// Processes one message received from a queue.
///
/// Acknowledging the message is the handler's job: call
/// [`SqsMessageService::delete_message`](crate::service::SqsMessageService::delete_message)
/// with the message's receipt handle once it has been processed.
#[async_trait]
pub trait SqsMessageHandler: Send + Sync {
    async fn handle_message(&self, message: &Message) -> Result<(), HandlerError>;
}

/// Notified when the message handler of a consumer fails.
///
/// An error handler may fail too. The consumer logs the failure and moves on
/// to the next error handler; it is never retried or reported anywhere else.
#[async_trait]
pub trait SqsErrorHandler: Send + Sync {
    async fn handle_error(
        &self,
        message: &Message,
        error: Arc<HandlerProcessingError>,
    ) -> Result<(), HandlerError>;
}

/// Implementation of [`SqsMessageHandler`] that wraps an async closure.
///
/// The closure receives an owned copy of the message.
///
/// # Type Parameters
///
/// * `F` - The message handler function type
/// * `Fut` - The future returned by the handler function
pub struct MessageHandlerFn<F> {
    handler_fn: F,
}

#[async_trait]
impl<F, Fut> SqsMessageHandler for MessageHandlerFn<F>
where
    F: Fn(Message) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    async fn handle_message(&self, message: &Message) -> Result<(), HandlerError> {
        (self.handler_fn)(message.clone()).await
    }
}

/// Implementation of [`SqsErrorHandler`] that wraps an async closure.
pub struct ErrorHandlerFn<F> {
    handler_fn: F,
}

#[async_trait]
impl<F, Fut> SqsErrorHandler for ErrorHandlerFn<F>
where
    F: Fn(Message, Arc<HandlerProcessingError>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    async fn handle_error(
        &self,
        message: &Message,
        error: Arc<HandlerProcessingError>,
    ) -> Result<(), HandlerError> {
        (self.handler_fn)(message.clone(), error).await
    }
}

/// Wraps an async closure as a message handler.
///
/// # Example
///
/// ```rust
/// use rs_sqs_consumer::consumer::message_handler_fn;
///
/// let handler = message_handler_fn(|message| async move {
///     println!("received: {:?}", message.body());
///     Ok::<(), rs_sqs_consumer::HandlerError>(())
/// });
/// ```
pub fn message_handler_fn<F, Fut>(handler_fn: F) -> Arc<MessageHandlerFn<F>>
where
    F: Fn(Message) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    Arc::new(MessageHandlerFn { handler_fn })
}

/// Wraps an async closure as an error handler.
pub fn error_handler_fn<F, Fut>(handler_fn: F) -> Arc<ErrorHandlerFn<F>>
where
    F: Fn(Message, Arc<HandlerProcessingError>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    Arc::new(ErrorHandlerFn { handler_fn })
}
