use std::future::Future;
use std::sync::Arc;

use tracing::info;

use crate::client::create_sqs_client;
use crate::config::{SqsClientConfig, SqsFeatureConfiguration};
use crate::discovery::SqsHandlerDiscovery;
use crate::errors::SqsModuleError;
use crate::manager::SqsHandlersManager;
use crate::queues::SqsQueues;
use crate::register::SqsHandlerRegister;
use crate::service::{SqsMessageService, SqsService};

/// Wires the queue directory, queue service and handler manager of one feature.
///
/// The host drives the lifecycle:
///
/// 1. [`init`](Self::init) once handlers are declared
/// 2. [`on_application_bootstrap`](Self::on_application_bootstrap) when the application starts
/// 3. [`on_module_destroy`](Self::on_module_destroy) on teardown
///
/// [`run_until`](Self::run_until) does 2 and 3 around a shutdown future.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
///
/// use rs_sqs_consumer::config::{SqsClientConfig, SqsFeatureConfiguration};
/// use rs_sqs_consumer::consumer::message_handler_fn;
/// use rs_sqs_consumer::discovery::SqsHandlerTable;
/// use rs_sqs_consumer::module::SqsModule;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let feature = SqsFeatureConfiguration::default()
///         .with_queue("orders", "https://sqs.eu-west-1.amazonaws.com/123456789012/orders");
///     let mut module = SqsModule::for_root(&SqsClientConfig::default(), feature).await?;
///
///     let mut handlers = SqsHandlerTable::new();
///     handlers.add_message_handler(
///         "orders",
///         message_handler_fn(|message| async move {
///             println!("order: {:?}", message.body());
///             Ok::<(), rs_sqs_consumer::HandlerError>(())
///         }),
///     );
///     module.init(&handlers).await?;
///
///     module.run_until(async { tokio::signal::ctrl_c().await.ok(); }).await;
///     Ok(())
/// }
/// ```
pub struct SqsModule {
    queues: Arc<SqsQueues>,
    sqs_service: Arc<dyn SqsMessageService>,
    handlers_manager: SqsHandlersManager,
    feature_config: SqsFeatureConfiguration,
}

impl std::fmt::Debug for SqsModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqsModule")
            .field("queues", &self.queues)
            .field("handlers_manager", &self.handlers_manager)
            .field("feature_config", &self.feature_config)
            .finish()
    }
}

impl SqsModule {
    /// Builds an AWS client from `client_config` and wires the feature on top of it.
    pub async fn for_root(
        client_config: &SqsClientConfig,
        feature_config: SqsFeatureConfiguration,
    ) -> Result<Self, SqsModuleError> {
        let sqs_client = create_sqs_client(client_config).await;
        Self::for_client(sqs_client, feature_config)
    }

    /// Wires the feature on an existing AWS client.
    pub fn for_client(
        sqs_client: aws_sdk_sqs::Client,
        feature_config: SqsFeatureConfiguration,
    ) -> Result<Self, SqsModuleError> {
        let queues = Arc::new(SqsQueues::new());
        let sqs_service = Arc::new(SqsService::with_receive_options(
            sqs_client,
            Arc::clone(&queues),
            feature_config.receive_options.clone(),
        ));

        Self::for_feature(queues, sqs_service, feature_config)
    }

    /// Registers the configured queues in `queues` and creates the handler
    /// manager on top of `sqs_service`.
    ///
    /// # Errors
    ///
    /// Fails with [`SqsModuleError::Queues`] if an identifier is already in
    /// the directory or listed twice.
    pub fn for_feature(
        queues: Arc<SqsQueues>,
        sqs_service: Arc<dyn SqsMessageService>,
        feature_config: SqsFeatureConfiguration,
    ) -> Result<Self, SqsModuleError> {
        for queue in &feature_config.queues {
            queues.add_queue(&queue.identifier, &queue.url)?;
        }

        let handlers_manager = SqsHandlersManager::new(
            Arc::clone(&sqs_service),
            feature_config.consumer_options.clone(),
        );

        Ok(SqsModule {
            queues,
            sqs_service,
            handlers_manager,
            feature_config,
        })
    }

    pub fn queues(&self) -> &Arc<SqsQueues> {
        &self.queues
    }

    /// The service handlers use to delete or send messages.
    pub fn message_service(&self) -> Arc<dyn SqsMessageService> {
        Arc::clone(&self.sqs_service)
    }

    pub fn handlers_manager(&self) -> &SqsHandlersManager {
        &self.handlers_manager
    }

    pub fn handlers_manager_mut(&mut self) -> &mut SqsHandlersManager {
        &mut self.handlers_manager
    }

    pub fn feature_config(&self) -> &SqsFeatureConfiguration {
        &self.feature_config
    }

    /// Registers the handlers `discovery` finds for every configured queue.
    pub async fn init(
        &mut self,
        discovery: &dyn SqsHandlerDiscovery,
    ) -> Result<(), SqsModuleError> {
        SqsHandlerRegister::new(&mut self.handlers_manager, discovery, &self.feature_config)
            .register_handlers()
            .await?;

        Ok(())
    }

    /// Application start hook: starts every registered consumer.
    pub fn on_application_bootstrap(&self) {
        self.handlers_manager.start_all();
    }

    /// Teardown hook: stops every registered consumer.
    pub fn on_module_destroy(&self) {
        self.handlers_manager.stop_all();
    }

    /// Starts all consumers, waits for `shutdown`, then stops them.
    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        self.on_application_bootstrap();
        shutdown.await;
        info!("shutdown requested");
        self.on_module_destroy();
    }
}
