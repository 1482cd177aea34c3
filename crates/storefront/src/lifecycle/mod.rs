//! # System Lifecycle
//!
//! Starts and wires the storefront: three resource actors, the channel senders built from
//! configuration, the notification dispatcher (optionally behind its queue) and the
//! [`OrderService`] on top.
//!
//! ## Wiring Order
//!
//! 1. User and Product actors (no context).
//! 2. Order actor, with a [`UserClient`] as its context so creation can check the owner.
//! 3. Channel senders and dispatcher. Providers are built once here and shared.
//! 4. The service, which holds clones of the clients.
//!
//! ## Shutdown
//!
//! Dropping every client closes the actor channels. [`StorefrontSystem::shutdown`] drops the
//! system's own clients and the service, then awaits each task. The notification worker
//! drains its backlog before exiting, and the Order actor releases its `UserClient` when it
//! stops, so the User actor always finishes.
//!
//! ```rust,no_run
//! use storefront::config::StorefrontConfig;
//! use storefront::lifecycle::StorefrontSystem;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let system = StorefrontSystem::start(StorefrontConfig::from_env()?)?;
//! // ... use system.service ...
//! system.shutdown().await?;
//! # Ok(())
//! # }
//! ```

use crate::channels::{
    Channel, EmailSender, EmailTransport, HttpEmailTransport, HttpMessagingProvider, MailSpool,
    MessagingProvider, MessagingSender,
};
use crate::clients::{OrderClient, ProductClient, UserClient};
use crate::config::{HttpEndpoint, MessagingCredentials, StorefrontConfig};
use crate::notify::{
    ActivityLogSink, ChannelSenders, NotificationDispatcher, NotificationQueue,
    TracingActivityLog,
};
use crate::pricing::PricingEngine;
use crate::service::OrderService;
use crate::{order_actor, product_actor, user_actor};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    #[error("Failed to build {provider} client: {source}")]
    Provider {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("Task failed during shutdown: {0}")]
    Task(String),
}

/// The running storefront.
pub struct StorefrontSystem {
    pub service: OrderService,
    pub user_client: UserClient,
    pub product_client: ProductClient,
    pub order_client: OrderClient,
    pub activity_log: Arc<dyn ActivityLogSink>,
    handles: Vec<(&'static str, JoinHandle<()>)>,
}

/// Startup options. Tests use it to swap real providers and the audit sink for fakes.
pub struct SystemBuilder {
    config: StorefrontConfig,
    senders: Option<ChannelSenders>,
    activity_log: Option<Arc<dyn ActivityLogSink>>,
}

impl SystemBuilder {
    pub fn with_channels(mut self, senders: ChannelSenders) -> Self {
        self.senders = Some(senders);
        self
    }

    pub fn with_activity_log(mut self, sink: Arc<dyn ActivityLogSink>) -> Self {
        self.activity_log = Some(sink);
        self
    }

    /// Spawn every task. Must be called inside a Tokio runtime.
    pub fn start(self) -> Result<StorefrontSystem, SystemError> {
        let config = self.config;
        let senders = match self.senders {
            Some(senders) => senders,
            None => channel_senders(&config)?,
        };
        let activity_log = self
            .activity_log
            .unwrap_or_else(|| Arc::new(TracingActivityLog));

        let (user_actor, user_resource) = user_actor::new();
        let user_client = UserClient::new(user_resource);
        let (product_actor, product_resource) = product_actor::new();
        let product_client = ProductClient::new(product_resource);
        let (order_actor, order_resource) = order_actor::new();
        let order_client = OrderClient::new(order_resource);

        let mut handles = vec![
            ("user", tokio::spawn(user_actor.run(()))),
            ("product", tokio::spawn(product_actor.run(()))),
            ("order", tokio::spawn(order_actor.run(user_client.clone()))),
        ];

        let dispatcher = Arc::new(NotificationDispatcher::new(
            senders,
            activity_log.clone(),
            config.notifications.channel_timeout,
        ));
        let queue = if config.notifications.background {
            let (queue, handle) = NotificationQueue::spawn(
                dispatcher.clone(),
                config.notifications.dispatch_queue_capacity,
            );
            handles.push(("notifications", handle));
            Some(queue)
        } else {
            None
        };

        let pricing = PricingEngine::new(Arc::new(product_client.clone()), config.pricing);
        let service = OrderService::new(
            pricing,
            order_client.clone(),
            Arc::new(user_client.clone()),
            dispatcher,
            queue,
        );

        info!(
            background = config.notifications.background,
            "Storefront started"
        );
        Ok(StorefrontSystem {
            service,
            user_client,
            product_client,
            order_client,
            activity_log,
            handles,
        })
    }
}

impl StorefrontSystem {
    pub fn builder(config: StorefrontConfig) -> SystemBuilder {
        SystemBuilder {
            config,
            senders: None,
            activity_log: None,
        }
    }

    /// Start with providers built from `config`.
    pub fn start(config: StorefrontConfig) -> Result<Self, SystemError> {
        Self::builder(config).start()
    }

    pub async fn shutdown(self) -> Result<(), SystemError> {
        info!("Shutting down storefront");
        drop(self.service);
        drop(self.order_client);
        drop(self.product_client);
        drop(self.user_client);

        for (name, handle) in self.handles {
            if let Err(e) = handle.await {
                error!(task = name, error = %e, "Task failed");
                return Err(SystemError::Task(format!("{name}: {e}")));
            }
        }
        info!("Shutdown complete");
        Ok(())
    }
}

/// Build the three senders from provider settings. Missing email providers fall through to the
/// spool; missing SMS/WhatsApp credentials select simulation mode.
///
/// Provider requests get a timeout short enough that a channel's whole chain (retries, backoff
/// and the email sandbox) runs before the dispatcher's per-channel deadline.
pub fn channel_senders(config: &StorefrontConfig) -> Result<ChannelSenders, SystemError> {
    let n = &config.notifications;
    let p = &config.providers;

    let email_policy = n.email_retry_policy();
    let sandbox_calls = u32::from(p.email_sandbox.is_some());
    let email_timeout = n.provider_request_timeout(&email_policy, sandbox_calls);
    let email_transport = |name: &'static str, endpoint: &Option<HttpEndpoint>| {
        endpoint
            .clone()
            .map(|e| HttpEmailTransport::new(name, e, email_timeout))
            .transpose()
            .map_err(provider_error(name))
            .map(|t| t.map(|t| Arc::new(t) as Arc<dyn EmailTransport>))
    };
    let email = EmailSender::new(
        n.email_from.clone(),
        email_transport("email-primary", &p.email_primary)?,
        email_transport("email-sandbox", &p.email_sandbox)?,
        MailSpool::new(n.mail_spool_dir.clone()),
        email_policy,
    );

    let messaging_policy = n.messaging_retry_policy();
    let messaging_timeout = n.provider_request_timeout(&messaging_policy, 0);
    let messaging = |channel: Channel, name: &'static str, credentials: &Option<MessagingCredentials>| {
        let provider = credentials
            .clone()
            .map(|c| {
                HttpMessagingProvider::new(
                    &p.messaging_api_url,
                    c,
                    channel == Channel::WhatsApp,
                    messaging_timeout,
                )
            })
            .transpose()
            .map_err(provider_error(name))?
            .map(|t| Arc::new(t) as Arc<dyn MessagingProvider>);
        if provider.is_none() {
            info!(%channel, "No credentials, channel runs in simulation mode");
        }
        Ok::<_, SystemError>(MessagingSender::new(
            channel,
            provider,
            messaging_policy.clone(),
            n.default_country_code.clone(),
        ))
    };

    info!(
        email_timeout_ms = email_timeout.as_millis() as u64,
        messaging_timeout_ms = messaging_timeout.as_millis() as u64,
        "Provider request timeouts"
    );
    Ok(ChannelSenders {
        email: Arc::new(email),
        sms: Arc::new(messaging(Channel::Sms, "sms", &p.sms)?),
        whatsapp: Arc::new(messaging(Channel::WhatsApp, "whatsapp", &p.whatsapp)?),
    })
}

fn provider_error(provider: &'static str) -> impl Fn(reqwest::Error) -> SystemError {
    move |source| SystemError::Provider { provider, source }
}
