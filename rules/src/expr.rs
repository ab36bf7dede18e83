//! Building blocks of Firestore rules expressions

use schema::Permission;

/// Defined inside every rule that checks tenant permissions. Looks up the
/// permissions the signed in user holds for `tenant`.
pub const HAS_PERMISSION_FN: &str = "function hasPermission(permission, tenant) {
  return permission in get(/databases/$(database)/documents/users/$(request.auth.uid)).data.permissions[tenant];
}";

/// Tenant of the document as stored
pub const EXISTING_TENANT: &str = "resource.data.tenant";

/// Tenant of the document as sent in a write
pub const INCOMING_TENANT: &str = "request.resource.data.tenant";

pub const DOES_NOT_EXIST: &str = "resource == null";

pub const IS_ADMIN: &str = "request.auth.token.isAdmin == true";

/// Quote a value as a rules-language string literal
pub fn string_literal(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

pub fn has_permission(permission: &Permission, tenant: &str) -> String {
    format!(
        "hasPermission({}, {tenant})",
        string_literal(permission.as_str())
    )
}

pub fn is_user(user_id: &str) -> String {
    format!("request.auth.uid == {user_id}")
}

pub fn or(left: &str, right: &str) -> String {
    format!("{left} || {right}")
}
