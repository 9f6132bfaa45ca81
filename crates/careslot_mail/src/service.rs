use careslot_common::services::{
    BoxFuture, EmailMessage, NotificationError, NotificationResult, NotificationService,
};
use careslot_common::{config_error, CareslotError};
use careslot_config::MailConfig;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use std::time::Duration;
use tracing::{debug, info};

use crate::message::{build_message, sender};

/// Sends reservation emails through an SMTP relay using STARTTLS.
pub struct MailNotificationService {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl MailNotificationService {
    pub fn new(transport: AsyncSmtpTransport<Tokio1Executor>, from: Mailbox) -> Self {
        Self { transport, from }
    }

    /// Builds the relay transport from the `mail` config section.
    ///
    /// No connection is opened here; the first send does that.
    pub fn from_config(config: &MailConfig) -> Result<Self, CareslotError> {
        let from = sender(&config.from_address, config.from_name.as_deref())
            .map_err(|e| config_error(format!("mail.from_address: {}", e)))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| config_error(format!("mail.smtp_host: {}", e)))?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .timeout(Some(Duration::from_secs(config.timeout_secs)))
            .build();

        info!(
            "Mail notifications via {}:{} as {}",
            config.smtp_host, config.smtp_port, from
        );
        Ok(Self::new(transport, from))
    }

    pub fn from_mailbox(&self) -> &Mailbox {
        &self.from
    }
}

impl NotificationService for MailNotificationService {
    fn send_email(
        &self,
        message: EmailMessage,
    ) -> BoxFuture<'_, NotificationResult, NotificationError> {
        Box::pin(async move {
            let email = build_message(&self.from, &message)?;
            let id = email
                .headers()
                .get_raw("Message-ID")
                .unwrap_or_default()
                .to_string();

            debug!("Sending '{}' to {:?}", message.subject, message.to);
            let response = self
                .transport
                .send(email)
                .await
                .map_err(|e| NotificationError::Send(e.to_string()))?;

            Ok(NotificationResult {
                id,
                status: response.code().to_string(),
            })
        })
    }
}
