use crate::error::UserError;
use std::fmt::Display;

/// An opaque capability name such as `child:write`, checked against the
/// permissions a user holds for a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Permission(String);

impl Permission {
    pub fn new(permission: impl Into<String>) -> Self {
        Self(permission.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Permission {
    fn from(permission: &str) -> Self {
        Self::new(permission)
    }
}

impl From<String> for Permission {
    fn from(permission: String) -> Self {
        Self(permission)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Write,
    Update,
    Delete,
}

impl Operation {
    /// Words that must not appear in this operation's permission. Finding one
    /// usually means a permission was copied from another operation.
    pub fn forbidden_words(&self) -> &'static [&'static str] {
        match self {
            Operation::Read => &["write", "update", "delete"],
            Operation::Write => &["read", "update", "delete"],
            Operation::Update => &["read", "delete"],
            Operation::Delete => &["read", "update"],
        }
    }

    /// Substring check against [`Operation::forbidden_words`]
    pub fn check(&self, permission: &Permission) -> Result<(), UserError> {
        match self
            .forbidden_words()
            .iter()
            .copied()
            .find(|word| permission.as_str().contains(word))
        {
            Some(forbidden) => Err(UserError::PermissionSanity {
                operation: *self,
                permission: permission.to_string(),
                forbidden,
            }),
            None => Ok(()),
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Read => write!(f, "read"),
            Operation::Write => write!(f, "write"),
            Operation::Update => write!(f, "update"),
            Operation::Delete => write!(f, "delete"),
        }
    }
}

/// Permissions for the four operations of a collection. `None` always means the
/// operation is forbidden.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionPermissions {
    read: Option<Permission>,
    write: Option<Permission>,
    update: Option<Permission>,
    delete: Option<Permission>,
}

impl CollectionPermissions {
    pub fn new(
        read: Option<Permission>,
        write: Option<Permission>,
        update: Option<Permission>,
        delete: Option<Permission>,
    ) -> Result<Self, UserError> {
        let permissions = Self::new_unchecked(read, write, update, delete);

        for operation in [
            Operation::Read,
            Operation::Write,
            Operation::Update,
            Operation::Delete,
        ] {
            if let Some(permission) = permissions.get(operation) {
                operation.check(permission)?;
            }
        }

        Ok(permissions)
    }

    /// For permissions that already went through [`CollectionPermissions::new`]
    pub(crate) fn new_unchecked(
        read: Option<Permission>,
        write: Option<Permission>,
        update: Option<Permission>,
        delete: Option<Permission>,
    ) -> Self {
        Self {
            read,
            write,
            update,
            delete,
        }
    }

    pub fn get(&self, operation: Operation) -> Option<&Permission> {
        match operation {
            Operation::Read => self.read.as_ref(),
            Operation::Write => self.write.as_ref(),
            Operation::Update => self.update.as_ref(),
            Operation::Delete => self.delete.as_ref(),
        }
    }

    pub fn read(&self) -> Option<&Permission> {
        self.read.as_ref()
    }

    pub fn write(&self) -> Option<&Permission> {
        self.write.as_ref()
    }

    pub fn update(&self) -> Option<&Permission> {
        self.update.as_ref()
    }

    pub fn delete(&self) -> Option<&Permission> {
        self.delete.as_ref()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use test_strategy::proptest;

    fn perm(p: &str) -> Option<Permission> {
        Some(Permission::from(p))
    }

    #[test]
    fn accepts_matching_permissions() {
        let permissions = CollectionPermissions::new(
            perm("child:read"),
            perm("child:write"),
            perm("child:write"),
            perm("child:write"),
        )
        .unwrap();

        assert_eq!(permissions.read().map(Permission::as_str), Some("child:read"));
        assert_eq!(permissions.delete().map(Permission::as_str), Some("child:write"));
    }

    #[test]
    fn none_is_never_checked() {
        assert_eq!(
            CollectionPermissions::new(None, None, None, None).unwrap(),
            CollectionPermissions::default()
        );
    }

    #[test]
    fn read_permission_reused_for_write() {
        let err = CollectionPermissions::new(None, perm("child:read"), None, None).unwrap_err();
        assert_eq!(
            err,
            UserError::PermissionSanity {
                operation: Operation::Write,
                permission: "child:read".to_string(),
                forbidden: "read",
            }
        );
    }

    #[test]
    fn write_permission_reused_for_read() {
        let err = CollectionPermissions::new(perm("child:write"), None, None, None).unwrap_err();
        assert!(matches!(
            err,
            UserError::PermissionSanity {
                operation: Operation::Read,
                forbidden: "write",
                ..
            }
        ));
    }

    #[test]
    fn update_and_delete_may_contain_write() {
        assert!(CollectionPermissions::new(None, None, perm("a:write"), perm("a:write")).is_ok());
    }

    #[test]
    fn delete_cannot_contain_update() {
        let err = CollectionPermissions::new(None, None, None, perm("a:update")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "delete permission \"a:update\" contains the word \"update\", it looks like a permission for another operation"
        );
    }

    // Substring heuristic: a word embedded in a longer token still trips the check
    #[test]
    fn substring_match_is_not_word_based() {
        assert!(Operation::Read
            .check(&Permission::from("child:read-updated-list"))
            .is_err());
        assert!(Operation::Update
            .check(&Permission::from("child:overwrite"))
            .is_ok());
    }

    fn operation(index: usize) -> Operation {
        [
            Operation::Read,
            Operation::Write,
            Operation::Update,
            Operation::Delete,
        ][index % 4]
    }

    #[proptest]
    fn forbidden_word_is_always_rejected(
        #[strategy(0usize..4)] op: usize,
        #[strategy(0usize..3)] word: usize,
        #[strategy("[a-z:\\-]{0,12}")] prefix: String,
        #[strategy("[a-z:\\-]{0,12}")] suffix: String,
    ) {
        let op = operation(op);
        let words = op.forbidden_words();
        let forbidden = words[word % words.len()];
        let permission = Permission::new(format!("{prefix}{forbidden}{suffix}"));

        assert!(matches!(
            op.check(&permission),
            Err(UserError::PermissionSanity { operation, .. }) if operation == op
        ));
    }

    #[proptest]
    fn construction_rejects_forbidden_word(
        #[strategy(0usize..4)] op: usize,
        #[strategy(0usize..3)] word: usize,
        #[strategy("[a-z:\\-]{0,12}")] prefix: String,
        #[strategy("[a-z:\\-]{0,12}")] suffix: String,
    ) {
        let op = operation(op);
        let words = op.forbidden_words();
        let forbidden = words[word % words.len()];
        let permission = perm(&format!("{prefix}{forbidden}{suffix}"));

        let (read, write, update, delete) = match op {
            Operation::Read => (permission, None, None, None),
            Operation::Write => (None, permission, None, None),
            Operation::Update => (None, None, permission, None),
            Operation::Delete => (None, None, None, permission),
        };

        assert!(matches!(
            CollectionPermissions::new(read, write, update, delete),
            Err(UserError::PermissionSanity { operation, .. }) if operation == op
        ));
    }

    #[proptest]
    fn clean_permission_is_accepted(
        #[strategy(0usize..4)] op: usize,
        #[strategy("[0-9:_]{1,16}")] permission: String,
    ) {
        assert!(operation(op).check(&Permission::new(permission)).is_ok());
    }
}
