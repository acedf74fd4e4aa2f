// Service offerings: CRUD plus the admin bulk actions

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    middleware::AuthenticatedUser,
    models::{
        ActivityAction, BulkServiceRequest, BulkUpdateData, CreateServiceRequest, Listing,
        PageRequest, Pagination, Service, ServiceListParams, ServicePatch, ServiceStatus,
        ServiceType, UpdateServiceRequest,
    },
    repositories::{LookupKey, ServiceQuery, ServiceRepository},
    services::activity::ActivityService,
    utils::{clean_text, is_valid_url, slug_with_id, truncate_chars, ApiError, RequiredFields},
    validators::{sanitize_faqs, sanitize_features, sanitize_packages},
};

const MAX_TITLE: usize = 100;
const MAX_DESCRIPTION: usize = 500;
const MAX_LONG_DESCRIPTION: usize = 5000;
const MAX_DELIVERY_TIME: usize = 50;
const MAX_PRICE: f64 = 100_000.0;

fn parse_type(value: &str) -> Result<ServiceType, ApiError> {
    ServiceType::parse(value)
        .ok_or_else(|| ApiError::BadRequest(format!("Invalid service type: {}", value)))
}

fn parse_status(value: &str) -> Result<ServiceStatus, ApiError> {
    ServiceStatus::parse(value)
        .ok_or_else(|| ApiError::BadRequest(format!("Invalid status: {}", value)))
}

fn check_thumbnail(thumbnail: Option<String>) -> Result<Option<String>, ApiError> {
    match thumbnail {
        Some(url) if !is_valid_url(&url) => Err(ApiError::validation(vec![
            "thumbnail: Thumbnail must be a valid URL".to_string(),
        ])),
        other => Ok(other),
    }
}

fn plural(count: u64) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

// =============================================================================
// BULK ACTIONS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    StatusChange,
    FeaturedToggle,
    TypeChange,
    Update,
    Delete,
}

impl BulkAction {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "bulk-status-change" => Some(BulkAction::StatusChange),
            "bulk-featured-toggle" => Some(BulkAction::FeaturedToggle),
            "bulk-type-change" => Some(BulkAction::TypeChange),
            "bulk-update" => Some(BulkAction::Update),
            "bulk-delete" => Some(BulkAction::Delete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BulkAction::StatusChange => "bulk-status-change",
            BulkAction::FeaturedToggle => "bulk-featured-toggle",
            BulkAction::TypeChange => "bulk-type-change",
            BulkAction::Update => "bulk-update",
            BulkAction::Delete => "bulk-delete",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum BulkOutcome {
    #[serde(rename_all = "camelCase")]
    Updated {
        message: String,
        modified_count: u64,
        services: Vec<Service>,
    },
    #[serde(rename_all = "camelCase")]
    Deleted { message: String, deleted_count: u64 },
}

fn update_field<'a>(data: &'a Option<Value>, field: &str) -> Option<&'a Value> {
    data.as_ref()
        .and_then(|d| d.get(field))
        .filter(|v| !v.is_null())
}

// =============================================================================
// SERVICE
// =============================================================================

#[derive(Clone)]
pub struct ServiceCatalog {
    services: Arc<dyn ServiceRepository>,
    activity: ActivityService,
}

impl ServiceCatalog {
    pub fn new(services: Arc<dyn ServiceRepository>, activity: ActivityService) -> Self {
        Self { services, activity }
    }

    #[instrument(skip(self, params, caller))]
    pub async fn list(
        &self,
        params: ServiceListParams,
        caller: Option<&AuthenticatedUser>,
    ) -> Result<Listing<Service>, ApiError> {
        let service_type = params.service_type.as_deref().map(parse_type).transpose()?;
        let status = params.status.as_deref().map(parse_status).transpose()?;
        let is_admin = caller.is_some_and(AuthenticatedUser::is_admin);

        let query = ServiceQuery {
            search: params.search.clone().filter(|s| !s.trim().is_empty()),
            service_type,
            status,
            featured: params.featured,
            hide_inactive: !is_admin,
            page: PageRequest::new(params.page, params.limit),
        };

        let (services, total) = self.services.list(&query).await?;

        Ok(Listing {
            items: services,
            pagination: Pagination::new(query.page, total),
            filters: json!({
                "search": params.search,
                "type": service_type,
                "status": status,
                "featured": params.featured,
            }),
        })
    }

    #[instrument(skip(self, request, caller), fields(user_id = %caller.user_id))]
    pub async fn create(
        &self,
        request: CreateServiceRequest,
        caller: &AuthenticatedUser,
    ) -> Result<Service, ApiError> {
        caller.require_admin()?;

        let mut required = RequiredFields::new();
        let title = required.text("title", request.title.as_ref());
        let description = required.text("description", request.description.as_ref());
        let type_raw = required.text("type", request.service_type.as_ref());
        let price = required.present("price", request.price);

        let missing = required.into_missing();
        if !missing.is_empty() {
            return Err(ApiError::validation(missing));
        }
        request.validate()?;

        let service_type = parse_type(&type_raw)?;
        let status = match request.status.as_deref() {
            Some(value) => parse_status(value)?,
            None => ServiceStatus::Active,
        };
        let thumbnail = check_thumbnail(clean_text(request.thumbnail.as_ref(), 500))?;

        let id = Uuid::new_v4();
        let now = Utc::now();
        let title = truncate_chars(&title, MAX_TITLE);
        let service = Service {
            id,
            slug: slug_with_id(&title, id),
            title,
            description: truncate_chars(&description, MAX_DESCRIPTION),
            long_description: clean_text(request.long_description.as_ref(), MAX_LONG_DESCRIPTION),
            service_type,
            price,
            status,
            featured: request.featured.unwrap_or(false),
            thumbnail,
            delivery_time: clean_text(request.delivery_time.as_ref(), MAX_DELIVERY_TIME),
            packages: sanitize_packages(request.packages.unwrap_or_default()),
            features: sanitize_features(request.features.unwrap_or_default()),
            faqs: sanitize_faqs(request.faqs.unwrap_or_default()),
            clients: 0,
            created_by: caller.user_id,
            created_at: now,
            updated_at: now,
        };

        let service = self.services.insert(service).await?;
        info!("Created service {} ({})", service.id, service.slug);

        self.activity
            .record(
                ActivityAction::ServiceCreated,
                caller.user_id,
                service.id.to_string(),
                json!({ "title": service.title, "type": service.service_type }),
            )
            .await;

        Ok(service)
    }

    /// Inactive services are invisible to everyone but admins
    #[instrument(skip(self, caller))]
    pub async fn get(
        &self,
        key: &LookupKey,
        caller: Option<&AuthenticatedUser>,
    ) -> Result<Service, ApiError> {
        let is_admin = caller.is_some_and(AuthenticatedUser::is_admin);
        self.services
            .find(key)
            .await?
            .filter(|s| is_admin || s.status != ServiceStatus::Inactive)
            .ok_or_else(|| ApiError::NotFound("Service not found".to_string()))
    }

    async fn find(&self, key: &LookupKey) -> Result<Service, ApiError> {
        self.services
            .find(key)
            .await?
            .ok_or_else(|| ApiError::NotFound("Service not found".to_string()))
    }

    #[instrument(skip(self, request, caller), fields(user_id = %caller.user_id))]
    pub async fn update(
        &self,
        key: &LookupKey,
        mut request: UpdateServiceRequest,
        caller: &AuthenticatedUser,
    ) -> Result<Service, ApiError> {
        caller.require_admin()?;
        request.sanitize();
        request.validate()?;

        let mut service = self.find(key).await?;
        let mut changed = Vec::new();

        if let Some(title) = request.title {
            if title != service.title {
                service.slug = slug_with_id(&title, service.id);
                service.title = title;
                changed.push("title");
            }
        }
        if let Some(description) = request.description {
            service.description = description;
            changed.push("description");
        }
        if let Some(long_description) = request.long_description {
            service.long_description = Some(long_description).filter(|s| !s.is_empty());
            changed.push("longDescription");
        }
        if let Some(value) = request.service_type {
            service.service_type = parse_type(&value)?;
            changed.push("type");
        }
        if let Some(price) = request.price {
            service.price = price;
            changed.push("price");
        }
        if let Some(value) = request.status {
            service.status = parse_status(&value)?;
            changed.push("status");
        }
        if let Some(featured) = request.featured {
            service.featured = featured;
            changed.push("featured");
        }
        if let Some(thumbnail) = request.thumbnail {
            service.thumbnail = check_thumbnail(Some(thumbnail).filter(|s| !s.is_empty()))?;
            changed.push("thumbnail");
        }
        if let Some(delivery_time) = request.delivery_time {
            service.delivery_time = clean_text(Some(&delivery_time), MAX_DELIVERY_TIME);
            changed.push("deliveryTime");
        }
        if let Some(packages) = request.packages {
            service.packages = sanitize_packages(packages);
            changed.push("packages");
        }
        if let Some(features) = request.features {
            service.features = sanitize_features(features);
            changed.push("features");
        }
        if let Some(faqs) = request.faqs {
            service.faqs = sanitize_faqs(faqs);
            changed.push("faqs");
        }

        service.updated_at = Utc::now();
        let service = self.services.update(service).await?;

        self.activity
            .record(
                ActivityAction::ServiceUpdated,
                caller.user_id,
                service.id.to_string(),
                json!({ "fields": changed }),
            )
            .await;

        Ok(service)
    }

    #[instrument(skip(self, caller), fields(user_id = %caller.user_id))]
    pub async fn delete(&self, key: &LookupKey, caller: &AuthenticatedUser) -> Result<Uuid, ApiError> {
        caller.require_admin()?;
        let service = self.find(key).await?;

        if service.clients > 0 {
            return Err(ApiError::BadRequest(format!(
                "Cannot delete a service with {} active clients. Set it to inactive instead",
                service.clients
            )));
        }

        self.services.delete(service.id).await?;
        info!("Deleted service {}", service.id);

        self.activity
            .record(
                ActivityAction::ServiceDeleted,
                caller.user_id,
                service.id.to_string(),
                json!({ "title": service.title }),
            )
            .await;

        Ok(service.id)
    }

    #[instrument(skip(self, request, caller), fields(action = %request.action, count = request.ids.len()))]
    pub async fn bulk(
        &self,
        request: BulkServiceRequest,
        caller: &AuthenticatedUser,
    ) -> Result<BulkOutcome, ApiError> {
        caller.require_admin()?;

        if request.ids.is_empty() {
            return Err(ApiError::BadRequest("No service ids provided".to_string()));
        }
        let ids = request
            .ids
            .iter()
            .map(|raw| Uuid::parse_str(raw).map_err(|_| ApiError::InvalidId))
            .collect::<Result<Vec<_>, _>>()?;
        let action = BulkAction::parse(&request.action)
            .ok_or_else(|| ApiError::BadRequest(format!("Invalid bulk action: {}", request.action)))?;

        let found = self.services.find_many(&ids).await?;
        if found.is_empty() {
            return Err(ApiError::NotFound(
                "No services found for the given ids".to_string(),
            ));
        }
        let found_ids: Vec<Uuid> = found.iter().map(|s| s.id).collect();
        let data = &request.update_data;

        let outcome = match action {
            BulkAction::StatusChange => {
                let raw = update_field(data, "status")
                    .and_then(Value::as_str)
                    .ok_or_else(|| ApiError::BadRequest("updateData.status is required".to_string()))?;
                let status = parse_status(raw)?;
                let patch = ServicePatch {
                    status: Some(status),
                    ..Default::default()
                };
                let count = self.services.update_many(&found_ids, &patch, Utc::now()).await?;
                BulkOutcome::Updated {
                    message: format!("{} service{} set to {}", count, plural(count), status),
                    modified_count: count,
                    services: self.services.find_many(&found_ids).await?,
                }
            },
            BulkAction::FeaturedToggle => {
                let featured = update_field(data, "featured")
                    .and_then(Value::as_bool)
                    .ok_or_else(|| {
                        ApiError::BadRequest("updateData.featured must be a boolean".to_string())
                    })?;
                let patch = ServicePatch {
                    featured: Some(featured),
                    ..Default::default()
                };
                let count = self.services.update_many(&found_ids, &patch, Utc::now()).await?;
                BulkOutcome::Updated {
                    message: format!(
                        "{} service{} {}",
                        count,
                        plural(count),
                        if featured { "featured" } else { "unfeatured" }
                    ),
                    modified_count: count,
                    services: self.services.find_many(&found_ids).await?,
                }
            },
            BulkAction::TypeChange => {
                let raw = update_field(data, "type")
                    .and_then(Value::as_str)
                    .ok_or_else(|| ApiError::BadRequest("updateData.type is required".to_string()))?;
                let service_type = parse_type(raw)?;
                let patch = ServicePatch {
                    service_type: Some(service_type),
                    ..Default::default()
                };
                let count = self.services.update_many(&found_ids, &patch, Utc::now()).await?;
                BulkOutcome::Updated {
                    message: format!(
                        "{} service{} changed to type {}",
                        count,
                        plural(count),
                        service_type
                    ),
                    modified_count: count,
                    services: self.services.find_many(&found_ids).await?,
                }
            },
            BulkAction::Update => self.bulk_update(found, data.clone()).await?,
            BulkAction::Delete => {
                let with_clients: Vec<Value> = found
                    .iter()
                    .filter(|s| s.clients > 0)
                    .map(|s| json!({ "id": s.id, "title": s.title, "clients": s.clients }))
                    .collect();
                if !with_clients.is_empty() {
                    return Err(ApiError::Refused {
                        message: format!(
                            "Cannot delete {} service{} with active clients",
                            with_clients.len(),
                            plural(with_clients.len() as u64)
                        ),
                        details: json!({ "servicesWithClients": with_clients }),
                    });
                }

                let count = self.services.delete_many(&found_ids).await?;
                BulkOutcome::Deleted {
                    message: format!("{} service{} deleted", count, plural(count)),
                    deleted_count: count,
                }
            },
        };

        let (activity_action, count) = match &outcome {
            BulkOutcome::Updated { modified_count, .. } => {
                (ActivityAction::ServicesBulkUpdated, *modified_count)
            },
            BulkOutcome::Deleted { deleted_count, .. } => {
                (ActivityAction::ServicesBulkDeleted, *deleted_count)
            },
        };
        let joined = found_ids
            .iter()
            .map(Uuid::to_string)
            .collect::<Vec<_>>()
            .join(",");
        self.activity
            .record(
                activity_action,
                caller.user_id,
                joined,
                json!({ "action": action.as_str(), "count": count, "updateData": request.update_data }),
            )
            .await;

        info!("Bulk action {} touched {} services", action.as_str(), count);
        Ok(outcome)
    }

    /// Per-document partial update, written in one transaction
    async fn bulk_update(
        &self,
        mut services: Vec<Service>,
        data: Option<Value>,
    ) -> Result<BulkOutcome, ApiError> {
        let data: BulkUpdateData = match data {
            Some(value) => serde_json::from_value(value)
                .map_err(|e| ApiError::BadRequest(format!("Invalid updateData: {}", e)))?,
            None => return Err(ApiError::BadRequest("updateData is required".to_string())),
        };

        let title = data.title.as_deref().map(str::trim).filter(|t| !t.is_empty());
        let description = data
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty());
        let status = data.status.as_deref().map(parse_status).transpose()?;
        let service_type = data.service_type.as_deref().map(parse_type).transpose()?;
        if let Some(price) = data.price {
            if !(0.0..=MAX_PRICE).contains(&price) {
                return Err(ApiError::validation(vec![
                    "price: Price must be between 0 and 100000".to_string(),
                ]));
            }
        }
        if title.is_none()
            && description.is_none()
            && data.price.is_none()
            && status.is_none()
            && service_type.is_none()
            && data.featured.is_none()
        {
            return Err(ApiError::BadRequest(
                "updateData has no fields to update".to_string(),
            ));
        }

        let now = Utc::now();
        for service in services.iter_mut() {
            if let Some(title) = title {
                let title = truncate_chars(title, MAX_TITLE);
                if title != service.title {
                    service.slug = slug_with_id(&title, service.id);
                    service.title = title;
                }
            }
            if let Some(description) = description {
                service.description = truncate_chars(description, MAX_DESCRIPTION);
            }
            if let Some(price) = data.price {
                service.price = price;
            }
            if let Some(status) = status {
                service.status = status;
            }
            if let Some(service_type) = service_type {
                service.service_type = service_type;
            }
            if let Some(featured) = data.featured {
                service.featured = featured;
            }
            service.updated_at = now;
        }

        let ids: Vec<Uuid> = services.iter().map(|s| s.id).collect();
        let count = self.services.save_many(services).await?;

        Ok(BulkOutcome::Updated {
            message: format!("{} service{} updated", count, plural(count)),
            modified_count: count,
            services: self.services.find_many(&ids).await?,
        })
    }
}
