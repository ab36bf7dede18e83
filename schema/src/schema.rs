use crate::{
    ast::Document,
    collection::CollectionDescriptor,
    directive::{FirestoreDirective, FIRESTORE_DIRECTIVE},
    error::Result,
    parser::parse_document,
};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Schema {
    document: Document,
}

impl Schema {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    /// Parse GraphQL SDL source
    pub fn from_sdl(sdl: &str) -> Result<Self> {
        Ok(Self::new(parse_document(sdl)?))
    }

    /// Load a schema that was parsed elsewhere and serialized as JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(Self::new(Document::from_json_str(json)?))
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// One descriptor per `@firestore` annotated type, in declaration order.
    /// Types without the directive are skipped. The first invalid directive
    /// aborts extraction.
    pub fn collections(&self) -> Result<Vec<CollectionDescriptor>> {
        self.document
            .types
            .iter()
            .filter_map(|t| {
                t.directive(FIRESTORE_DIRECTIVE)
                    .map(|d| (t.name.as_str(), FirestoreDirective::from_ast_directive(d)))
            })
            .map(|(type_name, directive)| CollectionDescriptor::from_directive(type_name, &directive))
            .collect()
    }
}
