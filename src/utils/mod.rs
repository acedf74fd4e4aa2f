pub mod api_error;
pub mod audit_logger;
pub mod password;
pub mod slug;
pub mod validation;

pub use api_error::{ApiError, ErrorResponse};
pub use audit_logger::AuditLogger;
pub use password::{hash_password_with_config, verify_password, PasswordConfig, PasswordError};
pub use slug::{generate_short_id, slug_with_id, slugify};
pub use validation::{
    clean_text, is_valid_url, trim_optional_field, truncate_chars,
    RequiredFields,
};
