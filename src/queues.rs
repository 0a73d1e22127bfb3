use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::debug;

use crate::errors::SqsQueuesError;

/// Directory mapping queue identifiers to queue URLs.
///
/// Identifiers are chosen by the application and decoupled from the physical
/// queue. A mapping, once added, is never replaced.
#[derive(Debug, Default)]
pub struct SqsQueues {
    queues: RwLock<HashMap<String, String>>,
}

impl SqsQueues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `queue_url` under `queue_identifier`.
    ///
    /// # Errors
    ///
    /// Returns [`SqsQueuesError::QueueIdentifierAlreadyRegistered`] if the
    /// identifier is already present; the existing URL is kept.
    pub fn add_queue(
        &self,
        queue_identifier: impl Into<String>,
        queue_url: impl Into<String>,
    ) -> Result<(), SqsQueuesError> {
        let queue_identifier = queue_identifier.into();
        let mut queues = self.queues.write();

        if queues.contains_key(&queue_identifier) {
            return Err(SqsQueuesError::QueueIdentifierAlreadyRegistered(
                queue_identifier,
            ));
        }

        let queue_url = queue_url.into();
        debug!(queue = %queue_identifier, url = %queue_url, "registered queue");
        queues.insert(queue_identifier, queue_url);

        Ok(())
    }

    /// Looks up the URL registered for `queue_identifier`.
    pub fn queue_url(&self, queue_identifier: &str) -> Option<String> {
        self.queues.read().get(queue_identifier).cloned()
    }

    pub fn contains(&self, queue_identifier: &str) -> bool {
        self.queues.read().contains_key(queue_identifier)
    }

    pub fn len(&self) -> usize {
        self.queues.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queues.read().is_empty()
    }
}
