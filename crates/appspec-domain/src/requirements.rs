//! Requirements module - what callers send and what they get back

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// An application description that passed input validation (trimmed text)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Natural-language description of the application
    pub text: String,
}

/// Structured requirements extracted from an application description
///
/// List items are kept as opaque JSON so that a provider reply which passed
/// validation reaches the caller unchanged, whatever shape its items have.
/// Unknown top-level keys are carried along in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    /// Name of the application
    pub app_name: String,

    /// Data entities, usually `{name, attributes}`
    pub entities: Vec<Value>,

    /// User roles, usually `{name, description}`
    pub user_roles: Vec<Value>,

    /// Features, usually `{name, description}`
    pub features: Vec<Value>,

    /// Any additional top-level keys from the provider reply
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GenerationResult {
    /// Assemble a result from typed parts
    ///
    /// # Examples
    ///
    /// ```
    /// use appspec_domain::{Entity, Feature, GenerationResult, UserRole};
    ///
    /// let result = GenerationResult::from_parts(
    ///     "Notes",
    ///     vec![Entity::new("Note", &["id", "body"])],
    ///     vec![UserRole::new("Writer", "Writes notes")],
    ///     vec![Feature::new("Search", "Find notes")],
    /// );
    /// assert_eq!(result.entities[0]["name"], "Note");
    /// ```
    pub fn from_parts(
        app_name: impl Into<String>,
        entities: Vec<Entity>,
        user_roles: Vec<UserRole>,
        features: Vec<Feature>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            entities: entities.into_iter().map(Value::from).collect(),
            user_roles: user_roles.into_iter().map(Value::from).collect(),
            features: features.into_iter().map(Value::from).collect(),
            extra: Map::new(),
        }
    }
}

/// A data entity with its attribute names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Entity name
    pub name: String,
    /// Attribute names
    pub attributes: Vec<String>,
}

impl Entity {
    /// Create an entity from a name and attribute list
    pub fn new(name: impl Into<String>, attributes: &[&str]) -> Self {
        Self {
            name: name.into(),
            attributes: attributes.iter().map(|a| a.to_string()).collect(),
        }
    }
}

impl From<Entity> for Value {
    fn from(entity: Entity) -> Self {
        json!({ "name": entity.name, "attributes": entity.attributes })
    }
}

/// A kind of user of the application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRole {
    /// Role name
    pub name: String,
    /// What the role does
    pub description: String,
}

impl UserRole {
    /// Create a role
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

impl From<UserRole> for Value {
    fn from(role: UserRole) -> Self {
        json!({ "name": role.name, "description": role.description })
    }
}

/// A capability of the application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    /// Feature name
    pub name: String,
    /// What the feature does
    pub description: String,
}

impl Feature {
    /// Create a feature
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

impl From<Feature> for Value {
    fn from(feature: Feature) -> Self {
        json!({ "name": feature.name, "description": feature.description })
    }
}
