use crate::{
    directive::{CollectionType, FirestoreDirective},
    error::{DirectiveProblem, Result, UserError},
    permissions::{CollectionPermissions, Permission},
};

/// A validated collection, built once from a `@firestore` annotated type
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionDescriptor {
    name: String,
    type_name: String,
    variant: CollectionVariant,
}

/// Per access pattern data. Each variant only carries the permissions its
/// rules can use.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionVariant {
    IndexedByTenant {
        permissions: CollectionPermissions,
        allow_public_read: bool,
    },
    DocPerTenant {
        read: Permission,
        write: Permission,
    },
    /// Policy is fixed, no permissions are taken from the directive
    DocPerUser,
}

impl CollectionDescriptor {
    pub fn from_directive(type_name: &str, directive: &FirestoreDirective) -> Result<Self> {
        let problem = |problem| UserError::SchemaDirective {
            type_name: type_name.to_string(),
            problem,
        };

        let name = match &directive.name {
            Some(name) if name.is_empty() => return Err(problem(DirectiveProblem::EmptyName))?,
            Some(name) => name.clone(),
            None => return Err(problem(DirectiveProblem::MissingArgument("name")))?,
        };

        let collection_type = match &directive.collection_type {
            Some(t) => t.parse::<CollectionType>().map_err(|_| {
                problem(DirectiveProblem::UnknownCollectionType(t.to_string()))
            })?,
            None => return Err(problem(DirectiveProblem::MissingArgument("type")))?,
        };

        let read = directive.read_permission.clone().map(Permission::from);
        let write = directive.write_permission.clone().map(Permission::from);

        let variant = match collection_type {
            CollectionType::IndexedByTenant => {
                let update = if directive.allow_update {
                    write.clone()
                } else {
                    None
                };
                let delete = if directive.allow_delete {
                    write.clone()
                } else {
                    None
                };

                CollectionVariant::IndexedByTenant {
                    permissions: CollectionPermissions::new(read, write, update, delete)?,
                    allow_public_read: directive.allow_public_read,
                }
            }
            CollectionType::DocPerTenant => {
                let (Some(read), Some(write)) = (read.clone(), write.clone()) else {
                    return Err(UserError::Configuration {
                        collection: name,
                        argument: match read {
                            None => "readPermission",
                            Some(_) => "writePermission",
                        },
                    })?;
                };

                // Update and delete have no separate control here, they follow write
                CollectionPermissions::new(
                    Some(read.clone()),
                    Some(write.clone()),
                    Some(write.clone()),
                    Some(write.clone()),
                )?;

                CollectionVariant::DocPerTenant { read, write }
            }
            CollectionType::DocPerUser => CollectionVariant::DocPerUser,
        };

        Ok(Self {
            name,
            type_name: type_name.to_string(),
            variant,
        })
    }

    /// Collection identifier, used as the first path segment
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The schema type this collection was declared on
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn variant(&self) -> &CollectionVariant {
        &self.variant
    }

    pub fn collection_type(&self) -> CollectionType {
        match self.variant {
            CollectionVariant::IndexedByTenant { .. } => CollectionType::IndexedByTenant,
            CollectionVariant::DocPerTenant { .. } => CollectionType::DocPerTenant,
            CollectionVariant::DocPerUser => CollectionType::DocPerUser,
        }
    }

    /// Effective permission per operation
    pub fn permissions(&self) -> CollectionPermissions {
        match &self.variant {
            CollectionVariant::IndexedByTenant { permissions, .. } => permissions.clone(),
            // checked in from_directive
            CollectionVariant::DocPerTenant { read, write } => CollectionPermissions::new_unchecked(
                Some(read.clone()),
                Some(write.clone()),
                Some(write.clone()),
                Some(write.clone()),
            ),
            CollectionVariant::DocPerUser => CollectionPermissions::default(),
        }
    }

    pub fn allow_public_read(&self) -> bool {
        matches!(
            self.variant,
            CollectionVariant::IndexedByTenant {
                allow_public_read: true,
                ..
            }
        )
    }
}
