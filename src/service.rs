use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_sqs::operation::delete_message::DeleteMessageOutput;
use aws_sdk_sqs::operation::receive_message::ReceiveMessageOutput;
use aws_sdk_sqs::operation::send_message::SendMessageOutput;
use aws_sdk_sqs::types::MessageAttributeValue;
use tracing::debug;

use crate::errors::SqsServiceError;
use crate::queues::SqsQueues;

mod config;

pub use config::ReceiveOptions;

/// Queue operations addressed by queue identifier rather than URL.
///
/// Implementations resolve the identifier first and fail with
/// [`SqsServiceError::QueueIdentifierNotRegistered`] without contacting the
/// queue when it is unknown. Failures are never retried at this layer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SqsMessageService: Send + Sync {
    async fn receive_messages(
        &self,
        queue_identifier: &str,
    ) -> Result<ReceiveMessageOutput, SqsServiceError>;

    async fn delete_message(
        &self,
        queue_identifier: &str,
        receipt_handle: &str,
    ) -> Result<DeleteMessageOutput, SqsServiceError>;

    async fn send_message(
        &self,
        queue_identifier: &str,
        message: SqsMessage,
    ) -> Result<SendMessageOutput, SqsServiceError>;
}

/// An outbound message: a send request without the queue URL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqsMessage {
    pub body: String,
    pub delay_seconds: Option<i32>,
    pub message_group_id: Option<String>,
    pub message_deduplication_id: Option<String>,
    pub message_attributes: Option<HashMap<String, MessageAttributeValue>>,
}

impl SqsMessage {
    pub fn new(body: impl Into<String>) -> Self {
        SqsMessage {
            body: body.into(),
            ..Default::default()
        }
    }

    pub fn with_delay_seconds(mut self, delay_seconds: i32) -> Self {
        self.delay_seconds = Some(delay_seconds);
        self
    }

    /// Sets the FIFO message group.
    pub fn with_group_id(mut self, message_group_id: impl Into<String>) -> Self {
        self.message_group_id = Some(message_group_id.into());
        self
    }

    /// Sets the FIFO deduplication id.
    pub fn with_deduplication_id(mut self, message_deduplication_id: impl Into<String>) -> Self {
        self.message_deduplication_id = Some(message_deduplication_id.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: MessageAttributeValue) -> Self {
        self.message_attributes
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), value);
        self
    }
}

/// [`SqsMessageService`] backed by the AWS SDK.
#[derive(Debug, Clone)]
pub struct SqsService {
    sqs_client: aws_sdk_sqs::Client,
    queues: Arc<SqsQueues>,
    receive_options: ReceiveOptions,
}

impl SqsService {
    pub fn new(sqs_client: aws_sdk_sqs::Client, queues: Arc<SqsQueues>) -> Self {
        Self::with_receive_options(sqs_client, queues, ReceiveOptions::default())
    }

    pub fn with_receive_options(
        sqs_client: aws_sdk_sqs::Client,
        queues: Arc<SqsQueues>,
        receive_options: ReceiveOptions,
    ) -> Self {
        SqsService {
            sqs_client,
            queues,
            receive_options,
        }
    }

    pub fn queues(&self) -> &Arc<SqsQueues> {
        &self.queues
    }

    fn queue_url(&self, queue_identifier: &str) -> Result<String, SqsServiceError> {
        self.queues.queue_url(queue_identifier).ok_or_else(|| {
            SqsServiceError::QueueIdentifierNotRegistered(queue_identifier.to_string())
        })
    }
}

#[async_trait]
impl SqsMessageService for SqsService {
    async fn receive_messages(
        &self,
        queue_identifier: &str,
    ) -> Result<ReceiveMessageOutput, SqsServiceError> {
        let queue_url = self.queue_url(queue_identifier)?;

        debug!(queue = %queue_identifier, url = %queue_url, "receiving messages");

        self.sqs_client
            .receive_message()
            .queue_url(&queue_url)
            .max_number_of_messages(self.receive_options.max_number_of_messages)
            .wait_time_seconds(self.receive_options.wait_time_seconds)
            .send()
            .await
            .map_err(|e| SqsServiceError::ReceiveMessage {
                queue_identifier: queue_identifier.to_string(),
                queue_url,
                source: Box::new(e),
            })
    }

    async fn delete_message(
        &self,
        queue_identifier: &str,
        receipt_handle: &str,
    ) -> Result<DeleteMessageOutput, SqsServiceError> {
        let queue_url = self.queue_url(queue_identifier)?;

        self.sqs_client
            .delete_message()
            .queue_url(&queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .map_err(|e| SqsServiceError::DeleteMessage {
                queue_identifier: queue_identifier.to_string(),
                queue_url,
                receipt_handle: receipt_handle.to_string(),
                source: Box::new(e),
            })
    }

    async fn send_message(
        &self,
        queue_identifier: &str,
        message: SqsMessage,
    ) -> Result<SendMessageOutput, SqsServiceError> {
        let queue_url = self.queue_url(queue_identifier)?;

        let result = self
            .sqs_client
            .send_message()
            .queue_url(&queue_url)
            .message_body(&message.body)
            .set_delay_seconds(message.delay_seconds)
            .set_message_group_id(message.message_group_id.clone())
            .set_message_deduplication_id(message.message_deduplication_id.clone())
            .set_message_attributes(message.message_attributes.clone())
            .send()
            .await;

        result.map_err(|e| SqsServiceError::SendMessage {
            queue_identifier: queue_identifier.to_string(),
            queue_url,
            message: Box::new(message),
            source: Box::new(e),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use aws_sdk_sqs::config::retry::RetryConfig;

    use super::*;
    use crate::client::create_sqs_client_from_config;
    use crate::config::{SqsClientConfig, StaticCredentials};

    const QUEUE_URL: &str = "http://127.0.0.1:9/000000000000/orders";

    /// Client pointed at a port nothing listens on, with retries off so every
    /// request fails fast.
    fn unreachable_client() -> aws_sdk_sqs::Client {
        let client = create_sqs_client_from_config(&SqsClientConfig {
            region: Some("us-east-1".to_string()),
            endpoint: Some("http://127.0.0.1:9".to_string()),
            credentials: Some(StaticCredentials {
                access_key_id: "test".to_string(),
                secret_access_key: "test".to_string(),
                session_token: None,
            }),
        });
        let config = client
            .config()
            .to_builder()
            .retry_config(RetryConfig::disabled())
            .build();

        aws_sdk_sqs::Client::from_conf(config)
    }

    fn service_without_queues() -> SqsService {
        SqsService::new(unreachable_client(), Arc::new(SqsQueues::new()))
    }

    fn service_with_orders_queue() -> SqsService {
        let queues = Arc::new(SqsQueues::new());
        queues.add_queue("orders", QUEUE_URL).unwrap();

        SqsService::new(unreachable_client(), queues)
    }

    #[tokio::test]
    async fn receive_failure_carries_queue_and_cause() {
        let service = service_with_orders_queue();

        let error = service.receive_messages("orders").await.unwrap_err();

        match &error {
            SqsServiceError::ReceiveMessage {
                queue_identifier,
                queue_url,
                ..
            } => {
                assert_eq!(queue_identifier, "orders");
                assert_eq!(queue_url, QUEUE_URL);
            }
            other => panic!("expected ReceiveMessage, got {other:?}"),
        }
        assert_eq!(error.queue_identifier(), "orders");
        assert!(error.source().is_some());
    }

    #[tokio::test]
    async fn delete_failure_carries_receipt_handle() {
        let service = service_with_orders_queue();

        let error = service
            .delete_message("orders", "handle-1")
            .await
            .unwrap_err();

        match &error {
            SqsServiceError::DeleteMessage {
                queue_url,
                receipt_handle,
                ..
            } => {
                assert_eq!(queue_url, QUEUE_URL);
                assert_eq!(receipt_handle, "handle-1");
            }
            other => panic!("expected DeleteMessage, got {other:?}"),
        }
        assert_eq!(error.queue_identifier(), "orders");
        assert!(error.source().is_some());
    }

    #[tokio::test]
    async fn send_failure_carries_the_attempted_message() {
        let service = service_with_orders_queue();
        let outgoing = SqsMessage::new("hello").with_group_id("greetings");

        let error = service
            .send_message("orders", outgoing.clone())
            .await
            .unwrap_err();

        match &error {
            SqsServiceError::SendMessage {
                queue_url, message, ..
            } => {
                assert_eq!(queue_url, QUEUE_URL);
                assert_eq!(message.as_ref(), &outgoing);
            }
            other => panic!("expected SendMessage, got {other:?}"),
        }
        assert_eq!(error.queue_identifier(), "orders");
        assert!(error.source().is_some());
    }

    #[tokio::test]
    async fn receive_fails_for_unregistered_queue() {
        let service = service_without_queues();

        let result = service.receive_messages("orders").await;

        assert!(matches!(
            result,
            Err(SqsServiceError::QueueIdentifierNotRegistered(ref id)) if id == "orders"
        ));
    }

    #[tokio::test]
    async fn delete_fails_for_unregistered_queue() {
        let service = service_without_queues();

        let result = service.delete_message("orders", "handle-1").await;

        assert!(matches!(
            result,
            Err(SqsServiceError::QueueIdentifierNotRegistered(_))
        ));
    }

    #[tokio::test]
    async fn send_fails_for_unregistered_queue() {
        let service = service_without_queues();

        let result = service
            .send_message("orders", SqsMessage::new("hello"))
            .await;

        assert!(matches!(
            result,
            Err(SqsServiceError::QueueIdentifierNotRegistered(_))
        ));
    }

    #[test]
    fn message_builder_sets_fifo_fields() {
        let message = SqsMessage::new("hello")
            .with_group_id("group")
            .with_deduplication_id("dedup")
            .with_delay_seconds(5);

        assert_eq!(message.body, "hello");
        assert_eq!(message.message_group_id.as_deref(), Some("group"));
        assert_eq!(message.message_deduplication_id.as_deref(), Some("dedup"));
        assert_eq!(message.delay_seconds, Some(5));
        assert!(message.message_attributes.is_none());
    }
}
