use serde::Deserialize;
use std::fmt::Display;

/// Right-hand side of an `allow` statement: a constant, or an expression in the
/// rules language that is emitted as written.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AllowValue {
    Bool(bool),
    Expr(String),
}

impl Default for AllowValue {
    fn default() -> Self {
        AllowValue::Bool(false)
    }
}

impl From<bool> for AllowValue {
    fn from(value: bool) -> Self {
        AllowValue::Bool(value)
    }
}

impl From<String> for AllowValue {
    fn from(expr: String) -> Self {
        AllowValue::Expr(expr)
    }
}

impl From<&str> for AllowValue {
    fn from(expr: &str) -> Self {
        AllowValue::Expr(expr.to_string())
    }
}

impl Display for AllowValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AllowValue::Bool(true) => write!(f, "true"),
            AllowValue::Bool(false) => write!(f, "false"),
            AllowValue::Expr(expr) => f.write_str(expr),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOperation {
    Create,
    Read,
    Update,
    Delete,
}

impl RuleOperation {
    /// Order in which `allow` statements are rendered
    pub const ALL: [RuleOperation; 4] = [
        RuleOperation::Create,
        RuleOperation::Read,
        RuleOperation::Update,
        RuleOperation::Delete,
    ];
}

impl Display for RuleOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleOperation::Create => write!(f, "create"),
            RuleOperation::Read => write!(f, "read"),
            RuleOperation::Update => write!(f, "update"),
            RuleOperation::Delete => write!(f, "delete"),
        }
    }
}

/// A single `match` block. Every operation starts out denied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    comment: String,
    match_path: String,
    extra: Option<String>,
    create: AllowValue,
    read: AllowValue,
    update: AllowValue,
    delete: AllowValue,
}

impl Rule {
    pub fn new(comment: &str, match_path: impl Into<String>) -> Self {
        Self {
            // a line break would end the comment early
            comment: comment
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .collect::<Vec<_>>()
                .join(" "),
            match_path: match_path.into(),
            extra: None,
            create: AllowValue::default(),
            read: AllowValue::default(),
            update: AllowValue::default(),
            delete: AllowValue::default(),
        }
    }

    /// Snippet placed at the top of the block, e.g. a helper function
    pub fn with_extra(mut self, extra: impl Into<String>) -> Self {
        self.extra = Some(extra.into());
        self
    }

    pub fn allow_create(mut self, value: impl Into<AllowValue>) -> Self {
        self.create = value.into();
        self
    }

    pub fn allow_read(mut self, value: impl Into<AllowValue>) -> Self {
        self.read = value.into();
        self
    }

    pub fn allow_update(mut self, value: impl Into<AllowValue>) -> Self {
        self.update = value.into();
        self
    }

    pub fn allow_delete(mut self, value: impl Into<AllowValue>) -> Self {
        self.delete = value.into();
        self
    }

    /// Same condition for create, update and delete
    pub fn allow_write(self, value: impl Into<AllowValue>) -> Self {
        let value = value.into();
        self.allow_create(value.clone())
            .allow_update(value.clone())
            .allow_delete(value)
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn match_path(&self) -> &str {
        &self.match_path
    }

    pub fn extra(&self) -> Option<&str> {
        self.extra.as_deref()
    }

    pub fn allow(&self, operation: RuleOperation) -> &AllowValue {
        match operation {
            RuleOperation::Create => &self.create,
            RuleOperation::Read => &self.read,
            RuleOperation::Update => &self.update,
            RuleOperation::Delete => &self.delete,
        }
    }

    pub fn render(&self) -> String {
        let mut lines = vec![];

        if !self.comment.is_empty() {
            lines.push(format!("// {}", self.comment));
        }
        lines.push(format!("match {} {{", self.match_path));

        if let Some(extra) = &self.extra {
            lines.extend(extra.lines().map(|line| format!("  {}", line.trim_end())));
        }

        for operation in RuleOperation::ALL {
            // "create:" is the longest label, pad the rest so the `if`s line up
            lines.push(format!(
                "  allow {:<7} if {};",
                format!("{operation}:"),
                self.allow(operation)
            ));
        }

        lines.push("}".to_string());

        lines
            .into_iter()
            .filter(|line| !line.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn render_denies_everything_by_default() {
        let rule = Rule::new("locked", "/locked/{document}");

        assert_eq!(
            rule.render(),
            "// locked
match /locked/{document} {
  allow create: if false;
  allow read:   if false;
  allow update: if false;
  allow delete: if false;
}"
        );
    }

    #[test]
    fn render_with_extra_and_expressions() {
        let rule = Rule::new("settings", "/settings/{document}")
            .with_extra("function isSignedIn() {\n  return request.auth != null;\n}\n\n")
            .allow_read(true)
            .allow_write("isSignedIn()");

        assert_eq!(
            rule.render(),
            "// settings
match /settings/{document} {
  function isSignedIn() {
    return request.auth != null;
  }
  allow create: if isSignedIn();
  allow read:   if true;
  allow update: if isSignedIn();
  allow delete: if isSignedIn();
}"
        );
    }

    #[test]
    fn comment_is_kept_on_one_line() {
        let rule = Rule::new("first line\n  second line\r\n", "/a/{b}");
        assert_eq!(rule.comment(), "first line second line");
        assert!(rule.render().starts_with("// first line second line\nmatch"));
    }

    #[test]
    fn empty_comment_is_dropped() {
        let rule = Rule::new("", "/a/{b}");
        assert!(rule.render().starts_with("match /a/{b} {"));
    }

    #[test]
    fn allow_value_display() {
        assert_eq!(AllowValue::from(true).to_string(), "true");
        assert_eq!(AllowValue::default().to_string(), "false");
        assert_eq!(AllowValue::from("a == b").to_string(), "a == b");
    }

    #[derive(Deserialize)]
    struct Values {
        constant: AllowValue,
        expr: AllowValue,
    }

    #[test]
    fn allow_value_deserialize() {
        let values: Values = toml::from_str(
            r#"
            constant = true
            expr = "request.auth != null"
            "#,
        )
        .unwrap();

        assert_eq!(values.constant, AllowValue::Bool(true));
        assert_eq!(values.expr, AllowValue::Expr("request.auth != null".into()));
    }
}
