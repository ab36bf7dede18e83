use crate::{rule::Rule, variant::collection_rules};
use schema::CollectionDescriptor;

pub const EXTRA_RULES_COMMENT: &str = "// Manually provided rules";
pub const GENERATED_RULES_COMMENT: &str = "// Rules generated from @firestore schema directives";

const HEADER: &str = "rules_version = '2';

service cloud.firestore {
  match /databases/{database}/documents {";

const FOOTER: &str = "  }
}
";

/// Indentation of the rules inside the documents match
const BODY_INDENT: &str = "    ";

/// Render the complete rules document. Hand written rules come first, then
/// the rules for each collection in schema order. Output only depends on the
/// input, so the artifact can be compared byte for byte.
pub fn compile(collections: &[CollectionDescriptor], extra_rules: &[Rule]) -> String {
    let generated = collections
        .iter()
        .flat_map(collection_rules)
        .collect::<Vec<_>>();

    let mut body = vec![EXTRA_RULES_COMMENT.to_string()];
    if !extra_rules.is_empty() {
        body.push(render_block(extra_rules));
    }
    body.push(String::new());
    body.push(GENERATED_RULES_COMMENT.to_string());
    if !generated.is_empty() {
        body.push(render_block(&generated));
    }

    let mut out = String::from(HEADER);
    out.push('\n');
    out.push_str(&indent(&body.join("\n"), BODY_INDENT));
    out.push('\n');
    out.push_str(FOOTER);
    out
}

fn render_block(rules: &[Rule]) -> String {
    rules
        .iter()
        .map(Rule::render)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn indent(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{prefix}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
