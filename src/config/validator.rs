use std::collections::HashMap;
use thiserror::Error;

use crate::config::Settings;
use crate::domain::registry;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Duplicate entry: {0}")]
    Duplicate(String),
}

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(settings: &Settings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if settings.server.host.is_empty() {
            errors.push(ValidationError::MissingField("server.host".to_string()));
        }
        if settings.server.port == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        Self::validate_domains(settings, &mut errors);
        Self::validate_repository(settings, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_domains(settings: &Settings, errors: &mut Vec<ValidationError>) {
        if settings.content.domains.is_empty() {
            errors.push(ValidationError::MissingField("content.domains".to_string()));
        }

        let mut seen = HashMap::new();
        for (idx, slug) in settings.content.domains.iter().enumerate() {
            if let Some(prev_idx) = seen.insert(slug, idx) {
                errors.push(ValidationError::Duplicate(format!(
                    "Domain '{slug}' appears at indices {prev_idx} and {idx}"
                )));
            }
            if registry::fields_for(slug, &serde_json::json!({})).is_none() {
                errors.push(ValidationError::InvalidValue {
                    field: format!("content.domains[{idx}]"),
                    reason: format!("no field schema registered for '{slug}'"),
                });
            }
        }
    }

    fn validate_repository(settings: &Settings, errors: &mut Vec<ValidationError>) {
        let repo = &settings.repository;
        // Publishing config is optional as a whole, but owner/name must come
        // as a pair for it to ever work
        let owner_set = repo.owner.as_deref().is_some_and(|o| !o.trim().is_empty());
        let name_set = repo.name.as_deref().is_some_and(|n| !n.trim().is_empty());
        if owner_set != name_set {
            let missing = if owner_set {
                "repository.name"
            } else {
                "repository.owner"
            };
            errors.push(ValidationError::MissingField(missing.to_string()));
        }

        if repo.branch.trim().is_empty() {
            errors.push(ValidationError::MissingField("repository.branch".to_string()));
        }
        if repo.base_url.trim().is_empty() {
            errors.push(ValidationError::MissingField(
                "repository.base_url".to_string(),
            ));
        }
    }
}
