pub mod ast;
mod collection;
mod directive;
mod error;
mod parser;
mod permissions;
mod schema;

pub use collection::{CollectionDescriptor, CollectionVariant};
pub use directive::{
    CollectionType, FirestoreDirective, FIRESTORE_DIRECTIVE, FIRESTORE_DIRECTIVE_SDL,
};
pub use error::{DirectiveProblem, Error, Result, UserError};
pub use parser::parse_document;
pub use permissions::{CollectionPermissions, Operation, Permission};
pub use schema::Schema;
