//! Feature and client configuration.
//!
//! All structs deserialize with serde so hosts can load them from whatever
//! format they already use for settings.

use serde::Deserialize;

use crate::consumer::ConsumerOptions;
use crate::service::ReceiveOptions;

/// A queue identifier bound to its physical queue URL.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QueueDefinition {
    pub identifier: String,
    pub url: String,
}

impl QueueDefinition {
    pub fn new(identifier: impl Into<String>, url: impl Into<String>) -> Self {
        QueueDefinition {
            identifier: identifier.into(),
            url: url.into(),
        }
    }
}

/// Queues and consumer settings of one feature.
///
/// The order of `queues` is the order handlers are registered in at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SqsFeatureConfiguration {
    pub queues: Vec<QueueDefinition>,
    pub consumer_options: ConsumerOptions,
    pub receive_options: ReceiveOptions,
}

impl SqsFeatureConfiguration {
    /// Adds a queue definition, builder style.
    pub fn with_queue(mut self, identifier: impl Into<String>, url: impl Into<String>) -> Self {
        self.queues.push(QueueDefinition::new(identifier, url));
        self
    }

    pub fn with_poll_interval_ms(mut self, poll_interval_ms: u64) -> Self {
        self.consumer_options.poll_interval_ms = poll_interval_ms;
        self
    }
}

/// Static AWS credentials.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct StaticCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    #[serde(default)]
    pub session_token: Option<String>,
}

impl std::fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"** redacted **")
            .field("session_token", &self.session_token.as_ref().map(|_| "** redacted **"))
            .finish()
    }
}

/// Client settings. Anything left unset falls back to the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SqsClientConfig {
    pub region: Option<String>,
    pub endpoint: Option<String>,
    pub credentials: Option<StaticCredentials>,
}
