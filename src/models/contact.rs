// Contact form submission

use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactRequest {
    #[validate(length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(max = 200, message = "Subject cannot exceed 200 characters"))]
    pub subject: Option<String>,
    #[validate(length(
        min = 10,
        max = 5000,
        message = "Message must be between 10 and 5000 characters"
    ))]
    pub message: String,
    /// Service or product the visitor is asking about
    pub service: Option<String>,
}

impl ContactRequest {
    pub fn sanitize(&mut self) {
        self.name = self.name.trim().to_string();
        self.email = self.email.trim().to_lowercase();
        self.message = self.message.trim().to_string();
        self.subject = self
            .subject
            .take()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        self.service = self
            .service
            .take()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
    }
}
