use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use aws_sdk_sqs::types::Message;
use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::errors::{HandlerError, HandlerProcessingError};
use crate::service::SqsMessageService;

mod config;
mod handler;

pub use config::ConsumerOptions;
pub use handler::{
    ErrorHandlerFn, MessageHandlerFn, SqsErrorHandler, SqsMessageHandler, error_handler_fn,
    message_handler_fn,
};

/// Counters collected by a consumer since it was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumerStats {
    /// Poll cycles that got past the running check.
    pub poll_cycles: u64,
    /// Messages handed to the message handler.
    pub messages_received: u64,
    /// Receive calls that failed.
    pub receive_failures: u64,
    /// Messages whose handler failed or panicked.
    pub handler_failures: u64,
    /// Error handler calls that failed or panicked.
    pub error_handler_failures: u64,
    /// Times the next poll was armed.
    pub polls_scheduled: u64,
}

#[derive(Debug, Default)]
struct Counters {
    poll_cycles: AtomicU64,
    messages_received: AtomicU64,
    receive_failures: AtomicU64,
    handler_failures: AtomicU64,
    error_handler_failures: AtomicU64,
    polls_scheduled: AtomicU64,
}

/// Polling consumer bound to a single queue identifier and message handler.
///
/// A started consumer runs one poll cycle immediately, then one cycle every
/// [`ConsumerOptions::poll_interval`] after the previous cycle finished:
///
/// 1. exit if the consumer is stopped
/// 2. receive a batch from the queue; a failure is logged and swallowed
/// 3. hand each message to the message handler, in order; a failure or panic
///    is logged and delivered to every attached error handler
/// 4. arm the next cycle
///
/// Nothing raised by the queue, a message handler or an error handler stops
/// the loop. Only [`SqsConsumer::stop`] does. At most one cycle runs at a
/// time, so receives of one consumer never overlap.
///
/// Cloning is cheap and every clone controls the same consumer. Once the last
/// clone is dropped no further cycles are armed.
#[derive(Clone)]
pub struct SqsConsumer {
    inner: Arc<ConsumerInner>,
}

struct ConsumerInner {
    queue_identifier: String,
    message_handler: Arc<dyn SqsMessageHandler>,
    sqs_service: Arc<dyn SqsMessageService>,
    consumer_options: ConsumerOptions,
    running: AtomicBool,
    error_handlers: RwLock<Vec<Arc<dyn SqsErrorHandler>>>,
    /// Held for a whole cycle.
    cycle: tokio::sync::Mutex<()>,
    /// Timer task sleeping until the next cycle. Arming and `stop` both hold
    /// this lock, so no timer is armed after `stop` returns.
    pending_poll: Mutex<Option<JoinHandle<()>>>,
    counters: Counters,
}

impl std::fmt::Debug for SqsConsumer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqsConsumer")
            .field("queue_identifier", &self.inner.queue_identifier)
            .field("consumer_options", &self.inner.consumer_options)
            .field("running", &self.running())
            .field("error_handlers", &self.error_handler_count())
            .finish()
    }
}

impl SqsConsumer {
    pub fn new(
        queue_identifier: impl Into<String>,
        message_handler: Arc<dyn SqsMessageHandler>,
        sqs_service: Arc<dyn SqsMessageService>,
        consumer_options: ConsumerOptions,
    ) -> Self {
        SqsConsumer {
            inner: Arc::new(ConsumerInner {
                queue_identifier: queue_identifier.into(),
                message_handler,
                sqs_service,
                consumer_options,
                running: AtomicBool::new(false),
                error_handlers: RwLock::new(Vec::new()),
                cycle: tokio::sync::Mutex::new(()),
                pending_poll: Mutex::new(None),
                counters: Counters::default(),
            }),
        }
    }

    pub fn queue_identifier(&self) -> &str {
        &self.inner.queue_identifier
    }

    pub fn consumer_options(&self) -> &ConsumerOptions {
        &self.inner.consumer_options
    }

    pub fn running(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }

    /// Whether a timer for the next poll cycle is currently armed.
    pub fn has_pending_poll(&self) -> bool {
        self.inner
            .pending_poll
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn error_handler_count(&self) -> usize {
        self.inner.error_handlers.read().len()
    }

    pub fn stats(&self) -> ConsumerStats {
        let counters = &self.inner.counters;
        ConsumerStats {
            poll_cycles: counters.poll_cycles.load(Ordering::Relaxed),
            messages_received: counters.messages_received.load(Ordering::Relaxed),
            receive_failures: counters.receive_failures.load(Ordering::Relaxed),
            handler_failures: counters.handler_failures.load(Ordering::Relaxed),
            error_handler_failures: counters.error_handler_failures.load(Ordering::Relaxed),
            polls_scheduled: counters.polls_scheduled.load(Ordering::Relaxed),
        }
    }

    /// Appends an error handler. Handlers are notified in the order they were added.
    pub fn add_error_handler(&self, error_handler: Arc<dyn SqsErrorHandler>) {
        self.inner.error_handlers.write().push(error_handler);
    }

    /// Marks the consumer running and runs the first poll cycle to completion.
    ///
    /// The next cycle is armed before this returns. Starting a running
    /// consumer runs a cycle right away and re-arms the timer. If a cycle is
    /// already in flight, for example after `stop()` and `start()` in quick
    /// succession, the new one waits for it to finish.
    pub async fn start(&self) {
        self.mark_running();
        Arc::clone(&self.inner).poll().await;
    }

    /// Like [`start`](Self::start), but runs the first cycle on a new task.
    /// The consumer reports `running` as soon as this returns.
    pub fn spawn_start(&self) -> JoinHandle<()> {
        self.mark_running();
        tokio::spawn(Arc::clone(&self.inner).poll())
    }

    /// Stops the consumer and cancels the armed poll, if any.
    ///
    /// A cycle already in flight is not interrupted; it finishes its batch but
    /// does not arm another cycle. Stopping a stopped consumer does nothing.
    pub fn stop(&self) {
        let mut pending_poll = self.inner.pending_poll.lock();
        let was_running = self.inner.running.swap(false, Ordering::SeqCst);

        if let Some(handle) = pending_poll.take() {
            handle.abort();
        }

        if was_running {
            info!(queue = %self.inner.queue_identifier, "consumer stopped");
        }
    }

    fn mark_running(&self) {
        self.inner.running.store(true, Ordering::SeqCst);
        info!(
            queue = %self.inner.queue_identifier,
            poll_interval_ms = self.inner.consumer_options.poll_interval_ms,
            "consumer started"
        );
    }
}

impl ConsumerInner {
    fn poll(self: Arc<Self>) -> BoxFuture<'static, ()> {
        async move {
            let _cycle = self.cycle.lock().await;

            if !self.running.load(Ordering::SeqCst) {
                return;
            }

            self.counters.poll_cycles.fetch_add(1, Ordering::Relaxed);

            match self.sqs_service.receive_messages(&self.queue_identifier).await {
                Ok(output) => self.dispatch(output.messages()).await,
                Err(e) => {
                    self.counters.receive_failures.fetch_add(1, Ordering::Relaxed);
                    error!(
                        queue = %self.queue_identifier,
                        error = %e,
                        "failed to receive messages"
                    );
                }
            }

            self.schedule_next_poll();
        }
        .boxed()
    }

    async fn dispatch(&self, messages: &[Message]) {
        if messages.is_empty() {
            debug!(queue = %self.queue_identifier, "no messages received");
            return;
        }

        debug!(queue = %self.queue_identifier, count = messages.len(), "received messages");

        for message in messages {
            self.counters.messages_received.fetch_add(1, Ordering::Relaxed);

            let outcome = AssertUnwindSafe(self.message_handler.handle_message(message))
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| Err(panic_error(panic)));

            if let Err(source) = outcome {
                self.counters.handler_failures.fetch_add(1, Ordering::Relaxed);
                error!(
                    queue = %self.queue_identifier,
                    message_id = message.message_id().unwrap_or_default(),
                    error = %source,
                    "message handler failed"
                );

                let error = Arc::new(HandlerProcessingError {
                    queue_identifier: self.queue_identifier.clone(),
                    source,
                });
                self.notify_error_handlers(message, error).await;
            }
        }
    }

    async fn notify_error_handlers(&self, message: &Message, error: Arc<HandlerProcessingError>) {
        let error_handlers: Vec<_> = self.error_handlers.read().clone();

        for error_handler in error_handlers {
            let outcome = AssertUnwindSafe(error_handler.handle_error(message, Arc::clone(&error)))
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| Err(panic_error(panic)));

            if let Err(e) = outcome {
                self.counters
                    .error_handler_failures
                    .fetch_add(1, Ordering::Relaxed);
                error!(
                    queue = %self.queue_identifier,
                    message_id = message.message_id().unwrap_or_default(),
                    error = %e,
                    "error handler failed"
                );
            }
        }
    }

    fn schedule_next_poll(self: &Arc<Self>) {
        let mut pending_poll = self.pending_poll.lock();

        if let Some(stale) = pending_poll.take() {
            stale.abort();
        }

        if !self.running.load(Ordering::SeqCst) {
            debug!(queue = %self.queue_identifier, "consumer stopped, next poll not scheduled");
            return;
        }

        let interval = self.consumer_options.poll_interval();
        let inner: Weak<Self> = Arc::downgrade(self);

        *pending_poll = Some(tokio::spawn(async move {
            tokio::time::sleep(interval).await;

            if let Some(inner) = inner.upgrade() {
                tokio::spawn(inner.poll());
            }
        }));
        self.counters.polls_scheduled.fetch_add(1, Ordering::Relaxed);
    }
}

fn panic_error(panic: Box<dyn Any + Send>) -> HandlerError {
    let reason = panic
        .downcast_ref::<&str>()
        .map(|reason| reason.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string());

    format!("handler panicked: {reason}").into()
}
