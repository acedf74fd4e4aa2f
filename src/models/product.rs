// Product catalog model: courses, bootcamps, ebooks and codebases

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::Validate;

use super::content::{Faq, Feature, Testimonial};
use super::curriculum::{Module, ModuleInput};

// =============================================================================
// ENUMS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductType {
    Course,
    Bootcamp,
    Ebook,
    Codebase,
}

impl ProductType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Course => "Course",
            ProductType::Bootcamp => "Bootcamp",
            ProductType::Ebook => "Ebook",
            ProductType::Codebase => "Codebase",
        }
    }

    /// Case-insensitive parse, so "course" and "COURSE" both map to `Course`
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "course" => Some(ProductType::Course),
            "bootcamp" => Some(ProductType::Bootcamp),
            "ebook" => Some(ProductType::Ebook),
            "codebase" => Some(ProductType::Codebase),
            _ => None,
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Published,
    Draft,
    Archived,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Published => "published",
            ProductStatus::Draft => "draft",
            ProductStatus::Archived => "archived",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "published" => Some(ProductStatus::Published),
            "draft" => Some(ProductStatus::Draft),
            "archived" => Some(ProductStatus::Archived),
            _ => None,
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Advanced => "Advanced",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "beginner" => Some(Difficulty::Beginner),
            "intermediate" => Some(Difficulty::Intermediate),
            "advanced" => Some(Difficulty::Advanced),
            _ => None,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// DOMAIN MODEL
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instructor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub long_description: Option<String>,
    #[serde(rename = "type")]
    pub product_type: ProductType,
    pub price: f64,
    pub original_price: Option<f64>,
    pub status: ProductStatus,
    pub category: String,
    pub difficulty: Difficulty,
    pub thumbnail: Option<String>,
    pub featured: bool,
    pub tags: Vec<String>,
    pub instructor: Instructor,
    pub modules: Vec<Module>,
    pub features: Vec<Feature>,
    pub testimonials: Vec<Testimonial>,
    pub faqs: Vec<Faq>,
    pub enrollments: i64,
    pub rating: f64,
    pub total_reviews: i64,
    pub created_by: Uuid,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub curriculum_updated_at: Option<DateTime<Utc>>,
}

impl Product {
    pub fn is_published(&self) -> bool {
        self.status == ProductStatus::Published
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.created_by == user_id
    }
}

// =============================================================================
// REQUEST MODELS
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstructorInput {
    pub name: Option<String>,
    pub title: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
}

/// Request to create a product. Required fields are checked by the service
/// so that every missing field is reported at once.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateProductRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub long_description: Option<String>,
    #[serde(rename = "type")]
    pub product_type: Option<String>,
    #[validate(range(min = 0.0, max = 10000.0, message = "Price must be between 0 and 10000"))]
    pub price: Option<f64>,
    #[validate(range(min = 0.0, message = "Original price cannot be negative"))]
    pub original_price: Option<f64>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub thumbnail: Option<String>,
    pub featured: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub instructor: Option<InstructorInput>,
    pub modules: Option<Vec<ModuleInput>>,
    pub features: Option<Vec<Feature>>,
    pub testimonials: Option<Vec<Testimonial>>,
    pub faqs: Option<Vec<Faq>>,
    #[validate(range(min = 0.0, max = 5.0, message = "Rating must be between 0 and 5"))]
    pub rating: Option<f64>,
    #[validate(range(min = 0, message = "Total reviews cannot be negative"))]
    pub total_reviews: Option<i64>,
}

/// Partial update. Only supplied fields are validated and applied.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateProductRequest {
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
    pub product_type: Option<String>,
    #[validate(range(min = 0.0, max = 10000.0, message = "Price must be between 0 and 10000"))]
    pub price: Option<f64>,
    #[validate(range(min = 0.0, message = "Original price cannot be negative"))]
    pub original_price: Option<f64>,
    pub status: Option<String>,
    #[validate(length(min = 1, max = 50, message = "Category must be between 1 and 50 characters"))]
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub thumbnail: Option<String>,
    pub featured: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub instructor: Option<InstructorInput>,
    pub features: Option<Vec<Feature>>,
    pub testimonials: Option<Vec<Testimonial>>,
    pub faqs: Option<Vec<Faq>>,
}

impl UpdateProductRequest {
    /// Trim free-text fields before validation
    pub fn sanitize(&mut self) {
        let trim = |field: &mut Option<String>| {
            if let Some(value) = field.as_mut() {
                *value = value.trim().to_string();
            }
        };
        trim(&mut self.title);
        trim(&mut self.description);
        trim(&mut self.long_description);
        trim(&mut self.product_type);
        trim(&mut self.status);
        trim(&mut self.category);
        trim(&mut self.difficulty);
        trim(&mut self.thumbnail);
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.long_description.is_none()
            && self.product_type.is_none()
            && self.price.is_none()
            && self.original_price.is_none()
            && self.status.is_none()
            && self.category.is_none()
            && self.difficulty.is_none()
            && self.thumbnail.is_none()
            && self.featured.is_none()
            && self.tags.is_none()
            && self.instructor.is_none()
            && self.features.is_none()
            && self.testimonials.is_none()
            && self.faqs.is_none()
    }
}

/// Query parameters accepted by the product listing
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductListParams {
    pub search: Option<String>,
    #[serde(rename = "type")]
    pub product_type: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub featured: Option<bool>,
    pub status: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_product_type_parse_is_case_insensitive() {
        assert_eq!(ProductType::parse("course"), Some(ProductType::Course));
        assert_eq!(ProductType::parse(" EBOOK "), Some(ProductType::Ebook));
        assert_eq!(ProductType::parse("invalidtype"), None);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(ProductStatus::Published).unwrap(),
            json!("published")
        );
        assert_eq!(serde_json::to_value(ProductType::Codebase).unwrap(), json!("Codebase"));
    }

    #[test]
    fn test_update_request_validation_only_checks_supplied_fields() {
        let empty = UpdateProductRequest::default();
        assert!(empty.validate().is_ok());
        assert!(empty.is_empty());

        let short_title = UpdateProductRequest {
            title: Some("ab".to_string()),
            ..Default::default()
        };
        assert!(short_title.validate().is_err());

        let bad_price = UpdateProductRequest {
            price: Some(10_000.5),
            ..Default::default()
        };
        assert!(bad_price.validate().is_err());
    }

    #[test]
    fn test_update_request_sanitize_trims() {
        let mut request: UpdateProductRequest =
            serde_json::from_value(json!({ "title": "  Rust 101  ", "type": " course " }))
                .unwrap();
        request.sanitize();
        assert_eq!(request.title.as_deref(), Some("Rust 101"));
        assert_eq!(request.product_type.as_deref(), Some("course"));
    }
}
