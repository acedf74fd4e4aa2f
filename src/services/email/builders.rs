// Builders for the contact form emails

use super::types::{
    ContactConfirmationData, ContactNotificationData, EmailBuilder, EmailError, EmailMessage,
};
use crate::app_config::EmailConfig;
use crate::models::ContactRequest;
use handlebars::Handlebars;
use tracing::instrument;

const DEFAULT_SUBJECT: &str = "New contact form submission";

fn subject_of(request: &ContactRequest) -> String {
    request
        .subject
        .clone()
        .unwrap_or_else(|| DEFAULT_SUBJECT.to_string())
}

fn sender_address(config: &EmailConfig) -> String {
    format!("{} <{}>", config.from_name, config.from_email)
}

/// Notification to the support inbox; replies go straight to the visitor
pub struct ContactNotificationEmailBuilder<'a> {
    request: &'a ContactRequest,
    config: &'a EmailConfig,
    templates: &'a Handlebars<'a>,
}

impl<'a> ContactNotificationEmailBuilder<'a> {
    pub fn new(
        request: &'a ContactRequest,
        config: &'a EmailConfig,
        templates: &'a Handlebars<'a>,
    ) -> Self {
        Self {
            request,
            config,
            templates,
        }
    }
}

impl<'a> EmailBuilder for ContactNotificationEmailBuilder<'a> {
    #[instrument(skip(self))]
    fn build(&self) -> Result<EmailMessage, EmailError> {
        let subject = subject_of(self.request);
        let data = ContactNotificationData {
            name: self.request.name.clone(),
            email: self.request.email.clone(),
            subject: subject.clone(),
            message: self.request.message.clone(),
            service: self.request.service.clone(),
            received_at: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            app_name: self.config.from_name.clone(),
        };

        let html = self
            .templates
            .render("contact_notification", &data)
            .map_err(|e| EmailError::TemplateError(e.to_string()))?;

        let text = format!(
            "New message from {} <{}>\n\nSubject: {}\nService: {}\n\n{}",
            data.name,
            data.email,
            data.subject,
            data.service.as_deref().unwrap_or("-"),
            data.message
        );

        Ok(EmailMessage::new(
            sender_address(self.config),
            vec![self.config.support_email.clone()],
            format!("[Contact] {}", subject),
            html,
        )
        .with_text(text)
        .with_reply_to(self.request.email.clone()))
    }
}

/// Acknowledgement sent to the visitor
pub struct ContactConfirmationEmailBuilder<'a> {
    request: &'a ContactRequest,
    config: &'a EmailConfig,
    templates: &'a Handlebars<'a>,
}

impl<'a> ContactConfirmationEmailBuilder<'a> {
    pub fn new(
        request: &'a ContactRequest,
        config: &'a EmailConfig,
        templates: &'a Handlebars<'a>,
    ) -> Self {
        Self {
            request,
            config,
            templates,
        }
    }
}

impl<'a> EmailBuilder for ContactConfirmationEmailBuilder<'a> {
    #[instrument(skip(self))]
    fn build(&self) -> Result<EmailMessage, EmailError> {
        let data = ContactConfirmationData {
            name: self.request.name.clone(),
            subject: subject_of(self.request),
            message: self.request.message.clone(),
            app_name: self.config.from_name.clone(),
            app_url: self.config.site_url.clone(),
            support_email: self.config.support_email.clone(),
        };

        let html = self
            .templates
            .render("contact_confirmation", &data)
            .map_err(|e| EmailError::TemplateError(e.to_string()))?;

        let text = format!(
            "Hi {},\n\n\
            Thanks for reaching out. We received your message and will reply within two business days.\n\n\
            Your message:\n{}\n\n\
            The {} Team",
            data.name, data.message, data.app_name
        );

        Ok(EmailMessage::new(
            sender_address(self.config),
            vec![self.request.email.clone()],
            format!("We received your message - {}", self.config.from_name),
            html,
        )
        .with_text(text))
    }
}
