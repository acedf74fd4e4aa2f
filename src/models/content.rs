// Marketing content blocks embedded in products and services.
// All fields default so that partially filled dashboard payloads deserialize;
// the validators module decides what survives.

use serde::{Deserialize, Serialize};

/// Selling point shown on a product or service page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Feature {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

fn default_rating() -> i64 {
    5
}

/// Customer quote with a 1-5 star rating
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Testimonial {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub content: String,
    pub rating: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl Default for Testimonial {
    fn default() -> Self {
        Self {
            name: String::new(),
            role: None,
            content: String::new(),
            rating: default_rating(),
            avatar: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Faq {
    pub question: String,
    pub answer: String,
}

/// Purchasable tier of a service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Package {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub features: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_time: Option<String>,
    pub popular: bool,
}
