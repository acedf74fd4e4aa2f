// Service package sanitizer

use crate::models::Package;
use crate::utils::clean_text;

pub const MAX_PACKAGES: usize = 5;
pub const MAX_PACKAGE_FEATURES: usize = 20;

pub fn sanitize_packages(packages: Vec<Package>) -> Vec<Package> {
    packages
        .into_iter()
        .filter_map(|package| {
            let name = clean_text(Some(&package.name), 100)?;
            let price = if package.price.is_finite() {
                package.price.max(0.0)
            } else {
                0.0
            };
            let features = package
                .features
                .iter()
                .filter_map(|f| clean_text(Some(f), 200))
                .take(MAX_PACKAGE_FEATURES)
                .collect();

            Some(Package {
                name,
                description: clean_text(Some(&package.description), 500).unwrap_or_default(),
                price,
                features,
                delivery_time: clean_text(package.delivery_time.as_ref(), 50),
                popular: package.popular,
            })
        })
        .take(MAX_PACKAGES)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packages_sanitized() {
        let packages = sanitize_packages(vec![
            Package {
                name: " Basic ".to_string(),
                price: -10.0,
                features: vec![" One ".to_string(), "".to_string()],
                ..Default::default()
            },
            Package {
                name: "".to_string(),
                price: 99.0,
                ..Default::default()
            },
        ]);

        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].name, "Basic");
        assert_eq!(packages[0].price, 0.0);
        assert_eq!(packages[0].features, vec!["One"]);
    }

    #[test]
    fn test_package_count_capped() {
        let packages = sanitize_packages(
            (0..8)
                .map(|i| Package {
                    name: format!("Tier {}", i),
                    ..Default::default()
                })
                .collect(),
        );
        assert_eq!(packages.len(), MAX_PACKAGES);
    }
}
