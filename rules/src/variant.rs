//! Rules for each collection access pattern

use crate::{
    expr::{self, DOES_NOT_EXIST, EXISTING_TENANT, HAS_PERMISSION_FN, INCOMING_TENANT, IS_ADMIN},
    rule::{AllowValue, Rule},
};
use schema::{CollectionDescriptor, CollectionPermissions, CollectionVariant, Permission};

/// Placeholder bound to the document id in generated match paths
const DOCUMENT: &str = "document";

pub fn collection_rules(collection: &CollectionDescriptor) -> Vec<Rule> {
    let name = collection.name();
    match collection.variant() {
        CollectionVariant::IndexedByTenant {
            permissions,
            allow_public_read,
        } => vec![indexed_by_tenant(name, permissions, *allow_public_read)],
        CollectionVariant::DocPerTenant { read, write } => vec![doc_per_tenant(name, read, write)],
        CollectionVariant::DocPerUser => doc_per_user(name),
    }
}

fn tenant_check(permission: Option<&Permission>, tenant: &str) -> AllowValue {
    match permission {
        Some(permission) => expr::has_permission(permission, tenant).into(),
        None => false.into(),
    }
}

/// Documents carry a `tenant` field. Create is checked against the incoming
/// document, everything else against the stored one.
fn indexed_by_tenant(
    name: &str,
    permissions: &CollectionPermissions,
    allow_public_read: bool,
) -> Rule {
    let read = if allow_public_read {
        AllowValue::Bool(true)
    } else {
        tenant_check(permissions.read(), EXISTING_TENANT)
    };

    Rule::new(
        &format!("{name}: documents belong to the tenant in their tenant field"),
        format!("/{name}/{{{DOCUMENT}}}"),
    )
    .with_extra(HAS_PERMISSION_FN)
    .allow_create(tenant_check(permissions.write(), INCOMING_TENANT))
    .allow_read(read)
    .allow_update(tenant_check(permissions.update(), EXISTING_TENANT))
    .allow_delete(tenant_check(permissions.delete(), EXISTING_TENANT))
}

/// The document id is the tenant id. Reading a document that does not exist
/// yet is allowed so clients can find out whether their tenant is set up.
fn doc_per_tenant(name: &str, read: &Permission, write: &Permission) -> Rule {
    Rule::new(
        &format!("{name}: one document per tenant, the document id is the tenant id"),
        format!("/{name}/{{{DOCUMENT}}}"),
    )
    .with_extra(HAS_PERMISSION_FN)
    .allow_read(expr::or(
        DOES_NOT_EXIST,
        &expr::has_permission(read, DOCUMENT),
    ))
    .allow_write(expr::has_permission(write, DOCUMENT))
}

/// The document id is the user id. Users may only read their own documents,
/// writes go through the backend. Admins may read and update any of them.
fn doc_per_user(name: &str) -> Vec<Rule> {
    vec![
        Rule::new(
            &format!("{name}: a user may read their own document"),
            format!("/{name}/{{{DOCUMENT}}}"),
        )
        .allow_read(expr::is_user(DOCUMENT)),
        Rule::new(
            &format!("{name}: a user may read the documents below their own"),
            format!("/{name}/{{user}}/{{{DOCUMENT}=**}}"),
        )
        .allow_read(expr::is_user("user")),
        Rule::new(
            &format!("{name}: administrators may read and update any user"),
            format!("/{name}/{{{DOCUMENT}=**}}"),
        )
        .allow_read(IS_ADMIN)
        .allow_update(IS_ADMIN),
    ]
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::rule::RuleOperation;
    use schema::{FirestoreDirective, Schema};
    use test_strategy::proptest;

    fn collection(directive: FirestoreDirective) -> CollectionDescriptor {
        CollectionDescriptor::from_directive("Test", &directive).unwrap()
    }

    fn indexed(read: Option<&str>, write: Option<&str>) -> FirestoreDirective {
        FirestoreDirective {
            name: Some("children".into()),
            collection_type: Some("INDEXED_BY_TENANT".into()),
            read_permission: read.map(String::from),
            write_permission: write.map(String::from),
            ..Default::default()
        }
    }

    fn allow(rule: &Rule, operation: RuleOperation) -> String {
        rule.allow(operation).to_string()
    }

    #[test]
    fn indexed_by_tenant_rule() {
        let rules = collection_rules(&collection(FirestoreDirective {
            allow_update: true,
            ..indexed(Some("child:read"), Some("child:write"))
        }));

        assert_eq!(rules.len(), 1);
        let rule = &rules[0];
        assert_eq!(rule.match_path(), "/children/{document}");
        assert_eq!(rule.extra(), Some(HAS_PERMISSION_FN));
        assert_eq!(
            allow(rule, RuleOperation::Create),
            "hasPermission('child:write', request.resource.data.tenant)"
        );
        assert_eq!(
            allow(rule, RuleOperation::Read),
            "hasPermission('child:read', resource.data.tenant)"
        );
        assert_eq!(
            allow(rule, RuleOperation::Update),
            "hasPermission('child:write', resource.data.tenant)"
        );
        assert_eq!(rule.allow(RuleOperation::Delete), &AllowValue::Bool(false));
    }

    #[test]
    fn indexed_by_tenant_without_permissions() {
        let rules = collection_rules(&collection(FirestoreDirective {
            allow_update: true,
            allow_delete: true,
            ..indexed(None, None)
        }));

        for operation in RuleOperation::ALL {
            assert_eq!(rules[0].allow(operation), &AllowValue::Bool(false));
        }
    }

    #[proptest]
    fn public_read_ignores_read_permission(
        #[strategy(proptest::option::of("[a-c]{1,8}:(list|get|view)"))] read: Option<String>,
    ) {
        let rules = collection_rules(&collection(FirestoreDirective {
            allow_public_read: true,
            ..indexed(read.as_deref(), Some("child:write"))
        }));

        assert_eq!(rules[0].allow(RuleOperation::Read), &AllowValue::Bool(true));
        assert!(rules[0].render().contains("allow read:   if true;"));
    }

    #[test]
    fn doc_per_tenant_rule() {
        let rules = collection_rules(&collection(FirestoreDirective {
            name: Some("age-groups".into()),
            collection_type: Some("DOC_PER_TENANT".into()),
            read_permission: Some("age-groups:read".into()),
            write_permission: Some("age-groups:write".into()),
            ..Default::default()
        }));

        assert_eq!(rules.len(), 1);
        let rule = &rules[0];
        assert_eq!(rule.match_path(), "/age-groups/{document}");
        assert_eq!(
            allow(rule, RuleOperation::Read),
            "resource == null || hasPermission('age-groups:read', document)"
        );
        for operation in [
            RuleOperation::Create,
            RuleOperation::Update,
            RuleOperation::Delete,
        ] {
            assert_eq!(
                allow(rule, operation),
                "hasPermission('age-groups:write', document)"
            );
        }
    }

    #[test]
    fn doc_per_user_rules() {
        let schema = Schema::from_sdl(r#"type User @firestore(name: "users", type: DOC_PER_USER) { id: ID! }"#)
            .unwrap();
        let rules = collection_rules(&schema.collections().unwrap()[0]);

        assert_eq!(
            rules.iter().map(Rule::match_path).collect::<Vec<_>>(),
            vec![
                "/users/{document}",
                "/users/{user}/{document=**}",
                "/users/{document=**}",
            ]
        );

        let (owner, admin) = (&rules[..2], &rules[2]);
        for rule in owner {
            assert_ne!(rule.allow(RuleOperation::Read), &AllowValue::Bool(false));
            for operation in [
                RuleOperation::Create,
                RuleOperation::Update,
                RuleOperation::Delete,
            ] {
                assert_eq!(rule.allow(operation), &AllowValue::Bool(false));
            }
        }
        assert_eq!(allow(&rules[0], RuleOperation::Read), "request.auth.uid == document");
        assert_eq!(allow(&rules[1], RuleOperation::Read), "request.auth.uid == user");

        assert_eq!(allow(admin, RuleOperation::Read), IS_ADMIN);
        assert_eq!(allow(admin, RuleOperation::Update), IS_ADMIN);
        assert_eq!(admin.allow(RuleOperation::Create), &AllowValue::Bool(false));
        assert_eq!(admin.allow(RuleOperation::Delete), &AllowValue::Bool(false));
        assert!(rules.iter().all(|r| r.extra().is_none()));
    }
}
