use super::SiteSchema;
use crate::SchemaError;

/// Ordered collection of site schemas
///
/// Detection walks schemas in registration order and returns the first
/// match. Overwriting a schema keeps its original position.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: Vec<SiteSchema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a schema
    ///
    /// # Errors
    ///
    /// [`SchemaError::AlreadyRegistered`] if a schema with the same name
    /// exists and `overwrite` is false.
    pub fn register(&mut self, schema: SiteSchema, overwrite: bool) -> Result<(), SchemaError> {
        match self.schemas.iter().position(|s| s.name == schema.name) {
            Some(_) if !overwrite => Err(SchemaError::AlreadyRegistered(schema.name)),
            Some(index) => {
                tracing::debug!("Replacing schema '{}'", schema.name);
                self.schemas[index] = schema;
                Ok(())
            }
            None => {
                tracing::debug!("Registered schema '{}'", schema.name);
                self.schemas.push(schema);
                Ok(())
            }
        }
    }

    /// Removes a schema by name, returning true if it was present
    pub fn unregister(&mut self, name: &str) -> bool {
        let before = self.schemas.len();
        self.schemas.retain(|s| s.name != name);
        self.schemas.len() != before
    }

    pub fn get(&self, name: &str) -> Option<&SiteSchema> {
        self.schemas.iter().find(|s| s.name == name)
    }

    /// First schema, in registration order, whose pattern matches the URL
    pub fn detect(&self, url: &str) -> Option<&SiteSchema> {
        let found = self.schemas.iter().find(|s| s.matches(url));
        if let Some(schema) = found {
            tracing::debug!("Detected schema '{}' for {}", schema.name, url);
        }
        found
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.iter().map(|s| s.name.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Schemas in registration order
    pub fn iter(&self) -> impl Iterator<Item = &SiteSchema> {
        self.schemas.iter()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn clear(&mut self) {
        self.schemas.clear();
    }
}
