// Validation utilities for string fields

/// Trim an optional field, mapping blank values to `None`
pub fn trim_optional_field(field: Option<&String>) -> Option<String> {
    field.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Cut a string to at most `max_chars` characters, respecting char boundaries
pub fn truncate_chars(value: &str, max_chars: usize) -> String {
    match value.char_indices().nth(max_chars) {
        Some((byte_index, _)) => value[..byte_index].to_string(),
        None => value.to_string(),
    }
}

/// Trim then truncate; blank input becomes `None`
pub fn clean_text(value: Option<&String>, max_chars: usize) -> Option<String> {
    trim_optional_field(value).map(|s| truncate_chars(&s, max_chars))
}

/// Collects "`field` is required" messages for blank or absent fields
#[derive(Debug, Default)]
pub struct RequiredFields {
    missing: Vec<String>,
}

impl RequiredFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the trimmed value, recording the field as missing when blank
    pub fn text(&mut self, name: &str, value: Option<&String>) -> String {
        match trim_optional_field(value) {
            Some(v) => v,
            None => {
                self.missing.push(format!("{} is required", name));
                String::new()
            },
        }
    }

    pub fn present<T: Copy + Default>(&mut self, name: &str, value: Option<T>) -> T {
        match value {
            Some(v) => v,
            None => {
                self.missing.push(format!("{} is required", name));
                T::default()
            },
        }
    }

    pub fn into_missing(self) -> Vec<String> {
        self.missing
    }
}

/// True when the value parses as an absolute URL
pub fn is_valid_url(value: &str) -> bool {
    url::Url::parse(value).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_is_char_aware() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn test_clean_text() {
        let long = "x".repeat(120);
        assert_eq!(clean_text(Some(&long), 100).unwrap().len(), 100);
        assert_eq!(clean_text(Some(&"  ".to_string()), 100), None);
        assert_eq!(clean_text(None, 100), None);
    }

    #[test]
    fn test_required_fields_collects_every_missing_field() {
        let mut required = RequiredFields::new();
        let title = required.text("title", Some(&"  Rust ".to_string()));
        required.text("description", Some(&" ".to_string()));
        let price: f64 = required.present("price", None);

        assert_eq!(title, "Rust");
        assert_eq!(price, 0.0);
        assert_eq!(
            required.into_missing(),
            vec!["description is required", "price is required"]
        );
    }

    #[test]
    fn test_is_valid_url() {
        assert!(is_valid_url("https://cdn.example.com/a.png"));
        assert!(!is_valid_url("not a url"));
    }
}
