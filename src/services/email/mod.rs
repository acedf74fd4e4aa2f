// Email service: renders handlebars templates and hands messages to the sender

pub mod builders;
pub mod sender;
pub mod types;

use self::types::EmailBuilder;
use crate::app_config::EmailConfig;
use crate::models::ContactRequest;
use builders::{ContactConfirmationEmailBuilder, ContactNotificationEmailBuilder};
use handlebars::Handlebars;
use sender::EmailSender;
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub use types::{EmailError, EmailMessage};

#[derive(Clone)]
pub struct EmailService {
    sender: EmailSender,
    config: EmailConfig,
    templates: Arc<Handlebars<'static>>,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Result<Self, EmailError> {
        let mut templates = Handlebars::new();
        Self::register_templates(&mut templates)?;

        let sender = EmailSender::new(config.api_url.clone(), config.api_key.clone())
            .with_max_retries(3)
            .with_retry_delay(std::time::Duration::from_secs(1));

        Ok(Self {
            sender,
            config,
            templates: Arc::new(templates),
        })
    }

    fn register_templates(templates: &mut Handlebars) -> Result<(), EmailError> {
        let notification = include_str!("../../templates/email/contact_notification.html");
        templates
            .register_template_string("contact_notification", notification)
            .map_err(|e| EmailError::TemplateError(e.to_string()))?;

        let confirmation = include_str!("../../templates/email/contact_confirmation.html");
        templates
            .register_template_string("contact_confirmation", confirmation)
            .map_err(|e| EmailError::TemplateError(e.to_string()))?;

        Ok(())
    }

    /// Render both contact emails without sending them
    pub fn build_contact_emails(
        &self,
        request: &ContactRequest,
    ) -> Result<(EmailMessage, EmailMessage), EmailError> {
        let notification =
            ContactNotificationEmailBuilder::new(request, &self.config, &self.templates).build()?;
        let confirmation =
            ContactConfirmationEmailBuilder::new(request, &self.config, &self.templates).build()?;
        Ok((notification, confirmation))
    }

    /// Returns whether the messages were handed to the provider.
    /// Without an API key the messages are rendered and logged only.
    #[instrument(skip(self, request), fields(from = %request.email))]
    pub async fn send_contact_emails(&self, request: &ContactRequest) -> Result<bool, EmailError> {
        let (notification, confirmation) = self.build_contact_emails(request)?;

        if !self.config.delivery_enabled() {
            warn!(
                "Email delivery disabled (no API key); skipping contact emails to {} and {}",
                self.config.support_email, request.email
            );
            return Ok(false);
        }

        self.sender.send_with_retry(notification).await?;
        info!("Contact notification delivered to {}", self.config.support_email);

        self.sender.send_with_retry(confirmation).await?;
        info!("Contact confirmation delivered to {}", request.email);

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_config::AppConfig;

    fn request() -> ContactRequest {
        ContactRequest {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            subject: Some("Mentorship".to_string()),
            message: "I'd like to book a <mentorship> session.".to_string(),
            service: Some("Mentorship".to_string()),
        }
    }

    #[test]
    fn test_notification_goes_to_support_with_reply_to() {
        let service = EmailService::new(AppConfig::for_test().email).unwrap();
        let (notification, _) = service.build_contact_emails(&request()).unwrap();

        assert_eq!(notification.to, vec!["support@test.local"]);
        assert_eq!(notification.reply_to.as_deref(), Some("ada@example.com"));
        assert_eq!(notification.subject, "[Contact] Mentorship");
        assert!(notification.html.contains("Ada Lovelace"));
        // handlebars escapes user input
        assert!(notification.html.contains("&lt;mentorship&gt;"));
    }

    #[test]
    fn test_confirmation_goes_to_visitor() {
        let service = EmailService::new(AppConfig::for_test().email).unwrap();
        let (_, confirmation) = service.build_contact_emails(&request()).unwrap();

        assert_eq!(confirmation.to, vec!["ada@example.com"]);
        assert!(confirmation.reply_to.is_none());
        assert!(confirmation.html.contains("http://localhost:3000"));
        assert!(confirmation.text.unwrap().contains("Hi Ada Lovelace"));
    }

    #[test]
    fn test_missing_subject_uses_default() {
        let service = EmailService::new(AppConfig::for_test().email).unwrap();
        let mut request = request();
        request.subject = None;
        request.service = None;

        let (notification, _) = service.build_contact_emails(&request).unwrap();
        assert_eq!(notification.subject, "[Contact] New contact form submission");
    }

    #[tokio::test]
    async fn test_delivery_skipped_without_api_key() {
        let service = EmailService::new(AppConfig::for_test().email).unwrap();
        let delivered = service.send_contact_emails(&request()).await.unwrap();
        assert!(!delivered);
    }
}
