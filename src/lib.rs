//! # SQS Consumer
//!
//! Managed, per-queue AWS SQS polling consumers with a handler registry that
//! binds one message handler and any number of error handlers to each queue.
//!
//! ## Features
//!
//! - Queues addressed by application-chosen identifiers instead of URLs
//! - One polling consumer per queue, started and stopped in bulk
//! - Sequential, in-order processing of every received batch
//! - Continue-on-error semantics: receive and handler failures are logged and
//!   never stop a consumer
//! - Error handlers notified with the failed message and the handler error
//! - Trait-based and closure-based handlers
//!
//! Handlers acknowledge messages themselves through
//! [`SqsMessageService::delete_message`](service::SqsMessageService::delete_message).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use rs_sqs_consumer::client::create_sqs_client_from_env;
//! use rs_sqs_consumer::consumer::message_handler_fn;
//! use rs_sqs_consumer::config::SqsFeatureConfiguration;
//! use rs_sqs_consumer::discovery::SqsHandlerTable;
//! use rs_sqs_consumer::module::SqsModule;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = create_sqs_client_from_env().await;
//!     let feature = SqsFeatureConfiguration::default()
//!         .with_queue("orders", "https://sqs.region.amazonaws.com/account/orders")
//!         .with_poll_interval_ms(500);
//!     let mut module = SqsModule::for_client(client, feature)?;
//!
//!     let sqs_service = module.message_service();
//!     let mut handlers = SqsHandlerTable::new();
//!     handlers.add_message_handler(
//!         "orders",
//!         message_handler_fn(move |message| {
//!             let sqs_service = Arc::clone(&sqs_service);
//!             async move {
//!                 println!("Processing message: {:?}", message.body());
//!                 if let Some(receipt_handle) = message.receipt_handle() {
//!                     sqs_service.delete_message("orders", receipt_handle).await?;
//!                 }
//!                 Ok::<(), rs_sqs_consumer::HandlerError>(())
//!             }
//!         }),
//!     );
//!     module.init(&handlers).await?;
//!
//!     module
//!         .run_until(async {
//!             tokio::signal::ctrl_c().await.ok();
//!         })
//!         .await;
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod consumer;
pub mod discovery;
pub mod errors;
pub mod manager;
pub mod module;
pub mod queues;
pub mod register;
pub mod service;

pub use consumer::{SqsConsumer, SqsErrorHandler, SqsMessageHandler};
pub use errors::HandlerError;
pub use manager::SqsHandlersManager;
pub use module::SqsModule;
pub use service::{SqsMessage, SqsMessageService};
