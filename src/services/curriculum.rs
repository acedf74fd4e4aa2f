// Curriculum endpoint logic: read and replace a product's modules

use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    middleware::AuthenticatedUser,
    models::{curriculum::sorted_modules, ActivityAction, Module, ModuleInput, Product},
    repositories::{LookupKey, ProductRepository, RepositoryError},
    services::activity::ActivityService,
    utils::ApiError,
    validators::normalize_modules,
};

/// Result of a successful curriculum write
#[derive(Debug, Clone)]
pub struct ModulesUpdate {
    pub modules: Vec<Module>,
    pub version: i64,
    pub message: String,
}

/// Decoded PUT body: `{ "modules": [...], "version"?: n }`
#[derive(Debug)]
pub struct ModulesPayload {
    pub modules: Vec<ModuleInput>,
    pub version: Option<i64>,
}

impl ModulesPayload {
    pub fn from_json(body: Value) -> Result<Self, ApiError> {
        let Value::Object(mut body) = body else {
            return Err(ApiError::BadRequest(
                "Request body must be a JSON object".to_string(),
            ));
        };

        let modules = match body.remove("modules") {
            Some(value @ Value::Array(_)) => serde_json::from_value::<Vec<ModuleInput>>(value)
                .map_err(|e| ApiError::BadRequest(format!("Invalid modules payload: {}", e)))?,
            _ => return Err(ApiError::BadRequest("Modules must be an array".to_string())),
        };

        let version = match body.remove("version") {
            None | Some(Value::Null) => None,
            Some(value) => Some(value.as_i64().ok_or_else(|| {
                ApiError::BadRequest("Version must be an integer".to_string())
            })?),
        };

        Ok(Self { modules, version })
    }
}

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::InvalidId)
}

#[derive(Clone)]
pub struct CurriculumService {
    products: Arc<dyn ProductRepository>,
    activity: ActivityService,
}

impl CurriculumService {
    pub fn new(products: Arc<dyn ProductRepository>, activity: ActivityService) -> Self {
        Self { products, activity }
    }

    async fn load(&self, id: Uuid) -> Result<Product, ApiError> {
        self.products
            .find(&LookupKey::Id(id))
            .await?
            .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))
    }

    /// Modules ordered by position. Unpublished products need the owner or an admin.
    #[instrument(skip(self, caller))]
    pub async fn get_modules(
        &self,
        raw_id: &str,
        caller: Option<&AuthenticatedUser>,
    ) -> Result<Vec<Module>, ApiError> {
        let id = parse_id(raw_id)?;
        let product = self.load(id).await?;

        if !product.is_published() {
            match caller {
                None => return Err(ApiError::unauthenticated()),
                Some(user) if !user.can_manage(product.created_by) => {
                    return Err(ApiError::Forbidden(
                        "You do not have access to this product".to_string(),
                    ))
                },
                Some(_) => {},
            }
        }

        Ok(sorted_modules(&product.modules))
    }

    /// Replace the whole module list. The write is conditioned on the version that was
    /// read (or the one the client sent), so a concurrent edit yields a conflict.
    #[instrument(skip(self, body, caller), fields(user_id = %caller.user_id))]
    pub async fn replace_modules(
        &self,
        raw_id: &str,
        body: Value,
        caller: &AuthenticatedUser,
    ) -> Result<ModulesUpdate, ApiError> {
        caller.require_author()?;
        let id = parse_id(raw_id)?;
        let product = self.load(id).await?;

        if !caller.can_manage(product.created_by) {
            return Err(ApiError::Forbidden(
                "You can only edit modules of your own products".to_string(),
            ));
        }

        let payload = ModulesPayload::from_json(body)?;
        if let Some(version) = payload.version {
            if version != product.version {
                return Err(ApiError::Conflict(format!(
                    "Product was modified (version {} is current, {} was sent). Reload and try again",
                    product.version, version
                )));
            }
        }

        let (modules, message) = if payload.modules.is_empty() {
            (Vec::new(), "All modules cleared".to_string())
        } else {
            let modules = normalize_modules(payload.modules).map_err(ApiError::validation)?;
            let message = format!("{} modules updated successfully", modules.len());
            (modules, message)
        };

        let updated = match self
            .products
            .replace_modules(id, product.version, modules, Utc::now())
            .await
        {
            Ok(updated) => updated,
            Err(RepositoryError::VersionConflict) => {
                warn!("Concurrent curriculum edit on product {}", id);
                return Err(RepositoryError::VersionConflict.into());
            },
            Err(e) => return Err(e.into()),
        };

        info!(
            "Product {} now has {} modules (version {})",
            id,
            updated.modules.len(),
            updated.version
        );

        self.activity
            .record(
                ActivityAction::ProductModulesUpdated,
                caller.user_id,
                id.to_string(),
                json!({
                    "moduleCount": updated.modules.len(),
                    "lessonCount": updated.modules.iter().map(|m| m.lessons.len()).sum::<usize>(),
                    "version": updated.version,
                }),
            )
            .await;

        Ok(ModulesUpdate {
            modules: sorted_modules(&updated.modules),
            version: updated.version,
            message,
        })
    }
}
