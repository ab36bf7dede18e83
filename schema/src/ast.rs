//! The walk-able view of a GraphQL schema: named types in declaration order,
//! each with the directives applied to it. Field and argument definitions are
//! not kept, nothing downstream looks at them.

use crate::error::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub types: Vec<TypeDefinition>,
}

impl Document {
    /// Load a schema that was already parsed by another tool and serialized
    /// to JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build a document from parsed definitions. Extensions are folded into
    /// the type they extend, so `extend type User @firestore(...)` behaves the
    /// same as annotating `type User` directly.
    pub(crate) fn from_definitions(definitions: Vec<Definition>) -> Self {
        let mut types: Vec<TypeDefinition> = vec![];

        for definition in definitions {
            match definition {
                Definition::Type(def) => types.push(def),
                Definition::TypeExtension(ext) => {
                    match types.iter_mut().find(|t| t.name == ext.name) {
                        Some(base) => base.directives.extend(ext.directives),
                        None => types.push(ext),
                    }
                }
                Definition::Other => {}
            }
        }

        Self { types }
    }

    pub fn get(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.iter().find(|t| t.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDefinition {
    pub name: String,
    pub kind: TypeKind,
    #[serde(default)]
    pub directives: Vec<Directive>,
}

impl TypeDefinition {
    /// First directive with the given name, later repeats are ignored
    pub fn directive(&self, name: &str) -> Option<&Directive> {
        self.directives.iter().find(|d| d.name == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Directive {
    pub name: String,
    #[serde(default)]
    pub arguments: Vec<Argument>,
}

impl Directive {
    pub fn argument(&self, name: &str) -> Option<&Value> {
        self.arguments
            .iter()
            .find(|arg| arg.name == name)
            .map(|arg| &arg.value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    pub name: String,
    pub value: Value,
}

/// A constant GraphQL value. Object fields reuse [`Argument`] as they have the
/// same `name: value` shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Value {
    Int(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Null,
    Enum(String),
    List(Vec<Value>),
    Object(Vec<Argument>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&str> {
        match self {
            Value::Enum(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

/// Top-level definitions as they come out of the parser
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Definition {
    Type(TypeDefinition),
    TypeExtension(TypeDefinition),
    /// Schema and directive definitions, which carry no collections
    Other,
}
