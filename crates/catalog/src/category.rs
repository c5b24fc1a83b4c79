use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{CategoryId, DomainError, Entity};

/// Product category. Read-only from the order core's perspective; admin CRUD
/// happens elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    id: CategoryId,
    name: String,
    slug: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl Category {
    /// Create a category; the slug is derived from the name when not given.
    pub fn new(
        id: CategoryId,
        name: impl Into<String>,
        description: Option<String>,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("category name cannot be empty"));
        }
        let slug = slugify(&name);
        Ok(Self {
            id,
            name,
            slug,
            description,
            created_at: Utc::now(),
        })
    }

    pub fn id_typed(&self) -> CategoryId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// URL-safe slug: lowercase alphanumerics with single hyphens between words.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_was_hyphen = true;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
