use crate::ast::{Directive, Value};
use std::fmt::Display;
use std::str::FromStr;

/// Name of the directive that marks a type as a database collection
pub const FIRESTORE_DIRECTIVE: &str = "firestore";

/// Definition of the `@firestore` directive, to be included in the schema
pub const FIRESTORE_DIRECTIVE_SDL: &str = r#"enum FirestoreCollectionType {
  INDEXED_BY_TENANT
  DOC_PER_TENANT
  DOC_PER_USER
}

directive @firestore(
  name: String!
  type: FirestoreCollectionType!
  readPermission: String
  writePermission: String
  allowDelete: Boolean = false
  allowUpdate: Boolean = false
  allowPublicRead: Boolean = false
) on OBJECT"#;

/// The access pattern of a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionType {
    /// Documents carry a `tenant` field naming the tenant that owns them
    IndexedByTenant,
    /// The document id is the tenant id
    DocPerTenant,
    /// The document id is the user id
    DocPerUser,
}

impl FromStr for CollectionType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INDEXED_BY_TENANT" => Ok(CollectionType::IndexedByTenant),
            "DOC_PER_TENANT" => Ok(CollectionType::DocPerTenant),
            "DOC_PER_USER" => Ok(CollectionType::DocPerUser),
            _ => Err(()),
        }
    }
}

impl Display for CollectionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectionType::IndexedByTenant => write!(f, "INDEXED_BY_TENANT"),
            CollectionType::DocPerTenant => write!(f, "DOC_PER_TENANT"),
            CollectionType::DocPerUser => write!(f, "DOC_PER_USER"),
        }
    }
}

/// Raw `@firestore` arguments, before validation. An argument given with the
/// wrong literal kind (e.g. `type: "DOC_PER_USER"` as a string) is treated as
/// absent.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FirestoreDirective {
    pub name: Option<String>,
    /// Enum value as written, validated when building the descriptor
    pub collection_type: Option<String>,
    pub read_permission: Option<String>,
    pub write_permission: Option<String>,
    pub allow_delete: bool,
    pub allow_update: bool,
    pub allow_public_read: bool,
}

impl FirestoreDirective {
    pub fn from_ast_directive(directive: &Directive) -> Self {
        let string = |name: &str| {
            directive
                .argument(name)
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        let boolean = |name: &str| {
            directive
                .argument(name)
                .and_then(Value::as_bool)
                .unwrap_or(false)
        };

        Self {
            name: string("name"),
            collection_type: directive
                .argument("type")
                .and_then(Value::as_enum)
                .map(str::to_string),
            read_permission: string("readPermission"),
            write_permission: string("writePermission"),
            allow_delete: boolean("allowDelete"),
            allow_update: boolean("allowUpdate"),
            allow_public_read: boolean("allowPublicRead"),
        }
    }
}
