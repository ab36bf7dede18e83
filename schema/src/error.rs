use crate::permissions::Operation;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    User(#[from] UserError),

    #[error("failed to parse schema:\n{0}")]
    Parse(String),

    #[error("serde_json error")]
    SerdeJSON(#[from] serde_json::Error),
}

/// Mistakes in the annotated schema. Each of these aborts generation, there is
/// no partial output.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum UserError {
    #[error("invalid @firestore directive on type {type_name}: {problem}")]
    SchemaDirective {
        type_name: String,
        problem: DirectiveProblem,
    },

    #[error("collection {collection:?} of type DOC_PER_TENANT requires {argument}")]
    Configuration {
        collection: String,
        argument: &'static str,
    },

    #[error("{operation} permission {permission:?} contains the word {forbidden:?}, it looks like a permission for another operation")]
    PermissionSanity {
        operation: Operation,
        permission: String,
        forbidden: &'static str,
    },
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum DirectiveProblem {
    #[error("missing required argument {0:?}")]
    MissingArgument(&'static str),

    #[error("argument \"name\" cannot be empty")]
    EmptyName,

    #[error("unknown collection type {0}")]
    UnknownCollectionType(String),
}
