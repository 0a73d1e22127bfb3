//! Locating the handlers declared for a queue identifier.
//!
//! Handlers are declared explicitly in a [`SqsHandlerTable`]; anything else
//! that can answer "which handler serves this queue" may implement
//! [`SqsHandlerDiscovery`] instead.

use std::any::type_name;
use std::sync::Arc;

use async_trait::async_trait;

use crate::consumer::{SqsErrorHandler, SqsMessageHandler};
use crate::errors::DiscoveryError;

/// Finds at most one message handler and one error handler per queue identifier.
///
/// Finding more than one candidate for the same identifier is a configuration
/// error and must be reported, never resolved by picking one.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SqsHandlerDiscovery: Send + Sync {
    async fn discover_message_handler(
        &self,
        queue_identifier: &str,
    ) -> Result<Option<Arc<dyn SqsMessageHandler>>, DiscoveryError>;

    async fn discover_error_handler(
        &self,
        queue_identifier: &str,
    ) -> Result<Option<Arc<dyn SqsErrorHandler>>, DiscoveryError>;
}

struct DeclaredHandler<H: ?Sized> {
    queue_identifier: String,
    declared_by: &'static str,
    handler: Arc<H>,
}

/// Static table of handlers declared by the application.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
///
/// use async_trait::async_trait;
/// use aws_sdk_sqs::types::Message;
/// use rs_sqs_consumer::consumer::SqsMessageHandler;
/// use rs_sqs_consumer::discovery::SqsHandlerTable;
/// use rs_sqs_consumer::errors::HandlerError;
///
/// struct OrderHandler;
///
/// #[async_trait]
/// impl SqsMessageHandler for OrderHandler {
///     async fn handle_message(&self, message: &Message) -> Result<(), HandlerError> {
///         println!("order: {:?}", message.body());
///         Ok(())
///     }
/// }
///
/// let mut handlers = SqsHandlerTable::new();
/// handlers.add_message_handler("orders", Arc::new(OrderHandler));
/// ```
#[derive(Default)]
pub struct SqsHandlerTable {
    message_handlers: Vec<DeclaredHandler<dyn SqsMessageHandler>>,
    error_handlers: Vec<DeclaredHandler<dyn SqsErrorHandler>>,
}

impl std::fmt::Debug for SqsHandlerTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let describe = |queue: &String, declared_by: &str| format!("{queue} -> {declared_by}");

        f.debug_struct("SqsHandlerTable")
            .field(
                "message_handlers",
                &self
                    .message_handlers
                    .iter()
                    .map(|h| describe(&h.queue_identifier, h.declared_by))
                    .collect::<Vec<_>>(),
            )
            .field(
                "error_handlers",
                &self
                    .error_handlers
                    .iter()
                    .map(|h| describe(&h.queue_identifier, h.declared_by))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl SqsHandlerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `handler` as the message handler of `queue_identifier`.
    ///
    /// Declaring a second one for the same identifier is not rejected here;
    /// discovery reports it.
    pub fn add_message_handler<H>(
        &mut self,
        queue_identifier: impl Into<String>,
        handler: Arc<H>,
    ) -> &mut Self
    where
        H: SqsMessageHandler + 'static,
    {
        self.declare_message_handler(queue_identifier.into(), type_name::<H>(), handler)
    }

    /// Declares an already type-erased message handler. Discovery errors name
    /// it by the trait object type.
    pub fn add_dyn_message_handler(
        &mut self,
        queue_identifier: impl Into<String>,
        handler: Arc<dyn SqsMessageHandler>,
    ) -> &mut Self {
        self.declare_message_handler(
            queue_identifier.into(),
            type_name::<dyn SqsMessageHandler>(),
            handler,
        )
    }

    /// Declares `handler` as the error handler of `queue_identifier`.
    pub fn add_error_handler<H>(
        &mut self,
        queue_identifier: impl Into<String>,
        handler: Arc<H>,
    ) -> &mut Self
    where
        H: SqsErrorHandler + 'static,
    {
        self.declare_error_handler(queue_identifier.into(), type_name::<H>(), handler)
    }

    /// Declares an already type-erased error handler.
    pub fn add_dyn_error_handler(
        &mut self,
        queue_identifier: impl Into<String>,
        handler: Arc<dyn SqsErrorHandler>,
    ) -> &mut Self {
        self.declare_error_handler(
            queue_identifier.into(),
            type_name::<dyn SqsErrorHandler>(),
            handler,
        )
    }

    fn declare_message_handler(
        &mut self,
        queue_identifier: String,
        declared_by: &'static str,
        handler: Arc<dyn SqsMessageHandler>,
    ) -> &mut Self {
        self.message_handlers.push(DeclaredHandler {
            queue_identifier,
            declared_by,
            handler,
        });
        self
    }

    fn declare_error_handler(
        &mut self,
        queue_identifier: String,
        declared_by: &'static str,
        handler: Arc<dyn SqsErrorHandler>,
    ) -> &mut Self {
        self.error_handlers.push(DeclaredHandler {
            queue_identifier,
            declared_by,
            handler,
        });
        self
    }
}

fn filter_found_handlers<H: ?Sized>(
    queue_identifier: &str,
    handlers: &[DeclaredHandler<H>],
) -> Result<Option<Arc<H>>, DiscoveryError> {
    let matching: Vec<&DeclaredHandler<H>> = handlers
        .iter()
        .filter(|h| h.queue_identifier == queue_identifier)
        .collect();

    match matching.as_slice() {
        [] => Ok(None),
        [found] => Ok(Some(Arc::clone(&found.handler))),
        _ => Err(DiscoveryError::MultipleHandlersNotAllowed {
            queue_identifier: queue_identifier.to_string(),
            declared_by: matching.iter().map(|h| h.declared_by.to_string()).collect(),
        }),
    }
}

#[async_trait]
impl SqsHandlerDiscovery for SqsHandlerTable {
    async fn discover_message_handler(
        &self,
        queue_identifier: &str,
    ) -> Result<Option<Arc<dyn SqsMessageHandler>>, DiscoveryError> {
        filter_found_handlers(queue_identifier, &self.message_handlers)
    }

    async fn discover_error_handler(
        &self,
        queue_identifier: &str,
    ) -> Result<Option<Arc<dyn SqsErrorHandler>>, DiscoveryError> {
        filter_found_handlers(queue_identifier, &self.error_handlers)
    }
}
