// Service offerings sold as packages (hiring, mentorship, writing, ...)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;
use validator::Validate;

use super::content::{Faq, Feature, Package};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceType {
    Hiring,
    Education,
    Mentorship,
    Professional,
    Writing,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Hiring => "Hiring",
            ServiceType::Education => "Education",
            ServiceType::Mentorship => "Mentorship",
            ServiceType::Professional => "Professional",
            ServiceType::Writing => "Writing",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "hiring" => Some(ServiceType::Hiring),
            "education" => Some(ServiceType::Education),
            "mentorship" => Some(ServiceType::Mentorship),
            "professional" => Some(ServiceType::Professional),
            "writing" => Some(ServiceType::Writing),
            _ => None,
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceStatus {
    Active,
    Inactive,
    ComingSoon,
}

impl ServiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceStatus::Active => "active",
            ServiceStatus::Inactive => "inactive",
            ServiceStatus::ComingSoon => "coming-soon",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "active" => Some(ServiceStatus::Active),
            "inactive" => Some(ServiceStatus::Inactive),
            "coming-soon" | "coming_soon" => Some(ServiceStatus::ComingSoon),
            _ => None,
        }
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub long_description: Option<String>,
    #[serde(rename = "type")]
    pub service_type: ServiceType,
    pub price: f64,
    pub status: ServiceStatus,
    pub featured: bool,
    pub thumbnail: Option<String>,
    pub delivery_time: Option<String>,
    pub packages: Vec<Package>,
    pub features: Vec<Feature>,
    pub faqs: Vec<Faq>,
    pub clients: i64,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields applied to every service matched by a bulk update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServicePatch {
    pub status: Option<ServiceStatus>,
    pub featured: Option<bool>,
    pub service_type: Option<ServiceType>,
}

impl ServicePatch {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.featured.is_none() && self.service_type.is_none()
    }
}

// =============================================================================
// REQUEST MODELS
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateServiceRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub long_description: Option<String>,
    #[serde(rename = "type")]
    pub service_type: Option<String>,
    #[validate(range(min = 0.0, max = 100000.0, message = "Price must be between 0 and 100000"))]
    pub price: Option<f64>,
    pub status: Option<String>,
    pub featured: Option<bool>,
    pub thumbnail: Option<String>,
    pub delivery_time: Option<String>,
    pub packages: Option<Vec<Package>>,
    pub features: Option<Vec<Feature>>,
    pub faqs: Option<Vec<Faq>>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateServiceRequest {
    #[validate(length(min = 3, max = 100, message = "Title must be between 3 and 100 characters"))]
    pub title: Option<String>,
    #[validate(length(
        min = 10,
        max = 500,
        message = "Description must be between 10 and 500 characters"
    ))]
    pub description: Option<String>,
    #[validate(length(max = 5000, message = "Long description cannot exceed 5000 characters"))]
    pub long_description: Option<String>,
    #[serde(rename = "type")]
    pub service_type: Option<String>,
    #[validate(range(min = 0.0, max = 100000.0, message = "Price must be between 0 and 100000"))]
    pub price: Option<f64>,
    pub status: Option<String>,
    pub featured: Option<bool>,
    pub thumbnail: Option<String>,
    pub delivery_time: Option<String>,
    pub packages: Option<Vec<Package>>,
    pub features: Option<Vec<Feature>>,
    pub faqs: Option<Vec<Faq>>,
}

impl UpdateServiceRequest {
    pub fn sanitize(&mut self) {
        for field in [
            &mut self.title,
            &mut self.description,
            &mut self.long_description,
            &mut self.service_type,
            &mut self.status,
            &mut self.thumbnail,
            &mut self.delivery_time,
        ] {
            if let Some(value) = field.as_mut() {
                *value = value.trim().to_string();
            }
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceListParams {
    pub search: Option<String>,
    #[serde(rename = "type")]
    pub service_type: Option<String>,
    pub status: Option<String>,
    pub featured: Option<bool>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Body of `PATCH /api/services/bulk`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BulkServiceRequest {
    pub action: String,
    pub ids: Vec<String>,
    pub update_data: Option<Value>,
}

/// Partial fields for the `bulk-update` action
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BulkUpdateData {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub service_type: Option<String>,
    pub featured: Option<bool>,
}
