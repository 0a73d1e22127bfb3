#![allow(dead_code)]

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use aws_sdk_sqs::operation::delete_message::DeleteMessageOutput;
use aws_sdk_sqs::operation::receive_message::ReceiveMessageOutput;
use aws_sdk_sqs::operation::send_message::SendMessageOutput;
use aws_sdk_sqs::types::Message;
use rs_sqs_consumer::errors::SqsServiceError;
use rs_sqs_consumer::queues::SqsQueues;
use rs_sqs_consumer::service::{SqsMessage, SqsMessageService};
use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;

pub fn message(body: &str) -> Message {
    Message::builder()
        .body(body)
        .receipt_handle(format!("receipt-{body}"))
        .build()
}

/// Queue service answering receives from a script; once the script runs out
/// every receive returns an empty batch. Queue identifiers are resolved
/// against a real directory.
pub struct ScriptedSqsService {
    queues: Arc<SqsQueues>,
    responses: Mutex<VecDeque<Result<Vec<Message>, String>>>,
    receive_calls: Mutex<Vec<String>>,
    deleted: Mutex<Vec<(String, String)>>,
    sent: Mutex<Vec<(String, SqsMessage)>>,
}

impl ScriptedSqsService {
    pub fn new(queues: Arc<SqsQueues>) -> Self {
        ScriptedSqsService {
            queues,
            responses: Mutex::new(VecDeque::new()),
            receive_calls: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Service with `queue_identifier` already registered.
    pub fn with_queue(queue_identifier: &str, queue_url: &str) -> Self {
        let queues = Arc::new(SqsQueues::new());
        queues.add_queue(queue_identifier, queue_url).unwrap();
        Self::new(queues)
    }

    pub fn push_messages(&self, messages: Vec<Message>) -> &Self {
        self.responses.lock().unwrap().push_back(Ok(messages));
        self
    }

    pub fn push_failure(&self, reason: &str) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(reason.to_string()));
        self
    }

    pub fn receive_calls(&self) -> Vec<String> {
        self.receive_calls.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<(String, String)> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<(String, SqsMessage)> {
        self.sent.lock().unwrap().clone()
    }

    fn queue_url(&self, queue_identifier: &str) -> Result<String, SqsServiceError> {
        self.queues.queue_url(queue_identifier).ok_or_else(|| {
            SqsServiceError::QueueIdentifierNotRegistered(queue_identifier.to_string())
        })
    }
}

#[async_trait]
impl SqsMessageService for ScriptedSqsService {
    async fn receive_messages(
        &self,
        queue_identifier: &str,
    ) -> Result<ReceiveMessageOutput, SqsServiceError> {
        let queue_url = self.queue_url(queue_identifier)?;
        self.receive_calls
            .lock()
            .unwrap()
            .push(queue_identifier.to_string());

        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(Ok(messages)) => Ok(ReceiveMessageOutput::builder()
                .set_messages(Some(messages))
                .build()),
            Some(Err(reason)) => Err(SqsServiceError::ReceiveMessage {
                queue_identifier: queue_identifier.to_string(),
                queue_url,
                source: reason.into(),
            }),
            None => Ok(ReceiveMessageOutput::builder().build()),
        }
    }

    async fn delete_message(
        &self,
        queue_identifier: &str,
        receipt_handle: &str,
    ) -> Result<DeleteMessageOutput, SqsServiceError> {
        self.queue_url(queue_identifier)?;
        self.deleted
            .lock()
            .unwrap()
            .push((queue_identifier.to_string(), receipt_handle.to_string()));
        Ok(DeleteMessageOutput::builder().build())
    }

    async fn send_message(
        &self,
        queue_identifier: &str,
        message: SqsMessage,
    ) -> Result<SendMessageOutput, SqsServiceError> {
        self.queue_url(queue_identifier)?;
        self.sent
            .lock()
            .unwrap()
            .push((queue_identifier.to_string(), message));
        Ok(SendMessageOutput::builder().build())
    }
}

#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub message: String,
    pub fields: Vec<(String, String)>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Tracing layer that records every event it sees.
#[derive(Clone, Default)]
pub struct LogCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl LogCapture {
    /// Installs the capture as the default subscriber of the current thread.
    pub fn install() -> (Self, DefaultGuard) {
        let capture = LogCapture::default();
        let subscriber = tracing_subscriber::registry().with(capture.clone());
        let guard = tracing::subscriber::set_default(subscriber);
        (capture, guard)
    }

    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn errors_with_message(&self, message: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|event| event.level == Level::ERROR && event.message == message)
            .collect()
    }
}

impl<S: Subscriber> Layer<S> for LogCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message: visitor.message,
            fields: visitor.fields,
        });
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: Vec<(String, String)>,
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push((field.name().to_string(), value.to_string()));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields
                .push((field.name().to_string(), format!("{:?}", value)));
        }
    }
}
