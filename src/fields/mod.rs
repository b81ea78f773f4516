use thiserror::Error;


pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("invalid storage name '{0}': storage names may not be empty or start with dollars")]
    InvalidStorageName(String),
}

/// Separator used by logical paths to address embedded fields.
pub const PATH_SEPARATOR: &str = "__";

/// A storage-level field handle exposed by the schema layer.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct FieldDescriptor {
    storage_name: String,
}

impl FieldDescriptor {
    pub fn new(storage_name: impl Into<String>) -> Self {
        FieldDescriptor {
            storage_name: storage_name.into(),
        }
    }

    pub fn storage_name(&self) -> &str {
        &self.storage_name
    }
}

/// A reference to a document field, either as a logical path or as a schema
/// field descriptor.
#[derive(PartialEq, Eq, Debug, Clone)]
pub enum FieldRef {
    Path(String),
    Stored(FieldDescriptor),
}

impl FieldRef {
    /// resolve returns the storage-level name for this reference. Logical
    /// paths have their separators rewritten to dots; descriptors resolve to
    /// their storage name without translation.
    pub fn resolve(&self) -> String {
        match self {
            FieldRef::Path(path) => path.split(PATH_SEPARATOR).collect::<Vec<_>>().join("."),
            FieldRef::Stored(descriptor) => descriptor.storage_name().to_string(),
        }
    }

    pub(crate) fn checked_resolve(&self) -> Result<String> {
        let name = self.resolve();
        if name.is_empty() || name.starts_with('$') {
            return Err(Error::InvalidStorageName(name));
        }
        Ok(name)
    }
}

impl From<&str> for FieldRef {
    fn from(path: &str) -> Self {
        FieldRef::Path(path.to_string())
    }
}

impl From<String> for FieldRef {
    fn from(path: String) -> Self {
        FieldRef::Path(path)
    }
}

impl From<FieldDescriptor> for FieldRef {
    fn from(descriptor: FieldDescriptor) -> Self {
        FieldRef::Stored(descriptor)
    }
}

impl From<&FieldDescriptor> for FieldRef {
    fn from(descriptor: &FieldDescriptor) -> Self {
        FieldRef::Stored(descriptor.clone())
    }
}
