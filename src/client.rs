use aws_config::Region;
use aws_sdk_sqs::config::{Credentials, SharedCredentialsProvider};

use crate::config::{SqsClientConfig, StaticCredentials};

/// Creates an AWS SQS client using credentials and configuration from the environment.
///
/// This function loads AWS configuration from environment variables such as:
/// - `AWS_ACCESS_KEY_ID`
/// - `AWS_SECRET_ACCESS_KEY`
/// - `AWS_REGION`
/// - `AWS_PROFILE`
///
/// # Example
///
/// ```rust,no_run
/// use rs_sqs_consumer::client::create_sqs_client_from_env;
///
/// #[tokio::main]
/// async fn main() {
///     let client = create_sqs_client_from_env().await;
///     // Use the client...
/// }
/// ```
pub async fn create_sqs_client_from_env() -> aws_sdk_sqs::Client {
    let config = aws_config::load_from_env().await;
    aws_sdk_sqs::Client::new(&config)
}

/// Creates an AWS SQS client from a [`SqsClientConfig`].
///
/// The environment is loaded first; `region`, `endpoint` and `credentials`
/// override it when set. Pointing `endpoint` at a local emulator
/// (e.g. `http://localhost:4566`) is the usual reason to set it.
///
/// # Example
///
/// ```rust,no_run
/// use rs_sqs_consumer::{client::create_sqs_client, config::SqsClientConfig};
///
/// #[tokio::main]
/// async fn main() {
///     let config = SqsClientConfig {
///         region: Some("eu-west-1".to_string()),
///         endpoint: Some("http://localhost:4566".to_string()),
///         credentials: None,
///     };
///     let client = create_sqs_client(&config).await;
/// }
/// ```
pub async fn create_sqs_client(config: &SqsClientConfig) -> aws_sdk_sqs::Client {
    let shared_config = aws_config::load_from_env().await;
    let builder = aws_sdk_sqs::config::Builder::from(&shared_config);

    aws_sdk_sqs::Client::from_conf(apply_client_config(builder, config).build())
}

/// Creates an AWS SQS client from a [`SqsClientConfig`] without reading the
/// environment. Unset fields stay unset on the client.
pub fn create_sqs_client_from_config(config: &SqsClientConfig) -> aws_sdk_sqs::Client {
    let builder = aws_sdk_sqs::config::Builder::new()
        .behavior_version(aws_sdk_sqs::config::BehaviorVersion::latest());

    aws_sdk_sqs::Client::from_conf(apply_client_config(builder, config).build())
}

fn apply_client_config(
    mut builder: aws_sdk_sqs::config::Builder,
    config: &SqsClientConfig,
) -> aws_sdk_sqs::config::Builder {
    if let Some(region) = &config.region {
        builder = builder.region(Region::new(region.clone()));
    }

    if let Some(endpoint) = &config.endpoint {
        builder = builder.endpoint_url(endpoint);
    }

    if let Some(credentials) = &config.credentials {
        builder = builder.credentials_provider(shared_credentials(credentials));
    }

    builder
}

fn shared_credentials(credentials: &StaticCredentials) -> SharedCredentialsProvider {
    let credentials = Credentials::new(
        &credentials.access_key_id,
        &credentials.secret_access_key,
        credentials.session_token.clone(),
        None,
        "rs-sqs-consumer",
    );

    SharedCredentialsProvider::new(credentials)
}
