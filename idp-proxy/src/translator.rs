//! Userinfo claims translation.
//!
//! Attaches the caller's `groups` and derived `hierarchy_level` to the upstream
//! userinfo payload. Claims the proxy does not know about are carried through
//! untouched.

use crate::hierarchy::{resolve, HierarchyConfig, HierarchyLevel};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use utoipa::ToSchema;

/// One group membership as reported by the IDP.
///
/// Only `group_id` is interpreted; every other role attribute (`group_name`,
/// `role`, `role_class`, `permissions`, ...) is kept verbatim, nulls included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UpstreamRole {
    pub group_id: i64,
    /// All other role attributes
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub attributes: Map<String, Value>,
}

/// Userinfo payload returned by the IDP.
///
/// `roles` is the only claim the proxy reads. Everything else is opaque and
/// re-emitted exactly as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UpstreamUserinfo {
    pub roles: Vec<UpstreamRole>,
    /// Every other claim, passed through unchanged
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub claims: Map<String, Value>,
}

/// Userinfo payload handed back to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TranslatedUserinfo {
    #[serde(flatten)]
    pub userinfo: UpstreamUserinfo,
    /// Distinct group ids from `roles`, in first-seen order
    pub groups: Vec<i64>,
    pub hierarchy_level: HierarchyLevel,
}

impl UpstreamUserinfo {
    /// The `sub` claim, when the IDP sent it as a string
    pub fn subject(&self) -> Option<&str> {
        self.claims.get("sub").and_then(Value::as_str)
    }

    /// Distinct group ids of all roles, in the order they first appear
    pub fn group_ids(&self) -> Vec<i64> {
        let mut seen = HashSet::new();
        self.roles
            .iter()
            .map(|role| role.group_id)
            .filter(|id| seen.insert(*id))
            .collect()
    }
}

/// Derives `groups` and `hierarchy_level` for `userinfo`
pub fn translate(userinfo: UpstreamUserinfo, config: &HierarchyConfig) -> TranslatedUserinfo {
    let groups = userinfo.group_ids();
    let hierarchy_level = resolve(&groups.iter().copied().collect(), config);
    // The derived claims always win over anything the IDP sent under the same name
    let mut userinfo = userinfo;
    userinfo.claims.remove("groups");
    userinfo.claims.remove("hierarchy_level");
    TranslatedUserinfo {
        userinfo,
        groups,
        hierarchy_level,
    }
}

/// Errors when a payload cannot be translated
#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("userinfo payload has no roles claim")]
    MissingRoles,
    #[error("userinfo payload does not match the expected shape: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Translates a raw JSON payload.
///
/// Payloads that are not objects or lack a `roles` claim yield
/// [`TranslateError::MissingRoles`]; the caller returns those unchanged.
pub fn translate_value(
    payload: Value,
    config: &HierarchyConfig,
) -> Result<TranslatedUserinfo, TranslateError> {
    if !payload.as_object().is_some_and(|obj| obj.contains_key("roles")) {
        return Err(TranslateError::MissingRoles);
    }
    let userinfo: UpstreamUserinfo = serde_json::from_value(payload)?;
    Ok(translate(userinfo, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::GroupMapping;
    use serde_json::json;

    fn config(mappings: &[(i64, HierarchyLevel)]) -> HierarchyConfig {
        HierarchyConfig {
            groups: mappings
                .iter()
                .map(|(group_id, level)| GroupMapping {
                    group_id: *group_id,
                    roles: vec![],
                    level: *level,
                })
                .collect(),
        }
    }

    #[test]
    fn test_translate_attaches_groups_and_level() {
        let payload = json!({ "roles": [{ "group_id": 1 }, { "group_id": 2 }] });
        let config = config(&[(1, HierarchyLevel::Member), (2, HierarchyLevel::Admin)]);

        let translated = translate_value(payload, &config).unwrap();
        let output = serde_json::to_value(&translated).unwrap();
        assert_eq!(output["groups"], json!([1, 2]));
        assert_eq!(output["hierarchy_level"], json!("admin"));
        assert_eq!(output["roles"], json!([{ "group_id": 1 }, { "group_id": 2 }]));
    }

    #[test]
    fn test_translate_passes_unknown_claims_through() {
        let payload = json!({
            "sub": "4711",
            "email": "scout@example.org",
            "nickname": "Fuchs",
            "company_name": null,
            "prefers_digital_correspondence": true,
            "kantonalverband_id": 3,
            "primary_group_id": 1,
            "roles": [{
                "group_id": 1,
                "group_name": "Pfadi",
                "role": "Group::Abteilung::Leitung",
                "role_class": "Leitung",
                "role_name": "Abteilungsleitung",
                "permissions": ["layer_and_below_full"],
                "since": "2020-01-01"
            }]
        });
        let translated =
            translate_value(payload.clone(), &config(&[(1, HierarchyLevel::Leader)])).unwrap();
        assert_eq!(translated.userinfo.subject(), Some("4711"));

        let mut output = serde_json::to_value(&translated).unwrap();
        assert_eq!(output["hierarchy_level"], json!("leader"));
        assert_eq!(output["groups"], json!([1]));

        let obj = output.as_object_mut().unwrap();
        obj.remove("groups");
        obj.remove("hierarchy_level");
        assert_eq!(output, payload);
    }

    #[test]
    fn test_translate_deduplicates_groups() {
        let payload = json!({
            "roles": [
                { "group_id": 5, "role": "a" },
                { "group_id": 3, "role": "b" },
                { "group_id": 5, "role": "c" }
            ]
        });
        let translated = translate_value(payload, &config(&[])).unwrap();
        assert_eq!(translated.groups, vec![5, 3]);
        assert_eq!(translated.hierarchy_level, HierarchyLevel::None);
        assert_eq!(translated.userinfo.roles.len(), 3);
    }

    #[test]
    fn test_translate_empty_roles() {
        let translated = translate_value(
            json!({ "roles": [] }),
            &config(&[(1, HierarchyLevel::Admin)]),
        )
        .unwrap();
        assert!(translated.groups.is_empty());
        assert_eq!(translated.hierarchy_level, HierarchyLevel::None);
    }

    #[test]
    fn test_translate_keeps_null_claims() {
        let payload = json!({
            "email": null,
            "primary_group_id": null,
            "roles": [{ "group_id": 1, "group_name": null, "permissions": null }]
        });
        let translated = translate_value(payload, &config(&[(1, HierarchyLevel::Member)])).unwrap();
        let output = serde_json::to_value(&translated).unwrap();
        assert_eq!(
            output,
            json!({
                "email": null,
                "primary_group_id": null,
                "roles": [{ "group_id": 1, "group_name": null, "permissions": null }],
                "groups": [1],
                "hierarchy_level": "member"
            })
        );
    }

    #[test]
    fn test_translate_accepts_unexpected_claim_types() {
        let payload = json!({
            "sub": 4711,
            "email": ["a@example.org", "b@example.org"],
            "roles": [{ "group_id": 2, "role_name": 5 }]
        });
        let translated = translate_value(payload, &config(&[(2, HierarchyLevel::Admin)])).unwrap();
        assert_eq!(translated.userinfo.subject(), None);

        let output = serde_json::to_value(&translated).unwrap();
        assert_eq!(output["sub"], json!(4711));
        assert_eq!(output["email"], json!(["a@example.org", "b@example.org"]));
        assert_eq!(output["roles"], json!([{ "group_id": 2, "role_name": 5 }]));
        assert_eq!(output["hierarchy_level"], json!("admin"));
    }

    #[test]
    fn test_translate_overrides_upstream_derived_claims() {
        let payload = json!({
            "roles": [{ "group_id": 1 }],
            "hierarchy_level": "admin",
            "groups": [99]
        });
        let translated = translate_value(payload, &config(&[(1, HierarchyLevel::Member)])).unwrap();
        let output = serde_json::to_value(&translated).unwrap();
        assert_eq!(output["hierarchy_level"], json!("member"));
        assert_eq!(output["groups"], json!([1]));
    }

    #[test]
    fn test_translate_without_roles() {
        assert!(matches!(
            translate_value(json!({ "sub": "1" }), &config(&[])),
            Err(TranslateError::MissingRoles)
        ));
        assert!(matches!(
            translate_value(json!(["not", "an", "object"]), &config(&[])),
            Err(TranslateError::MissingRoles)
        ));
    }

    #[test]
    fn test_translate_malformed_roles() {
        assert!(matches!(
            translate_value(json!({ "roles": "admin" }), &config(&[])),
            Err(TranslateError::Malformed(_))
        ));
        assert!(matches!(
            translate_value(json!({ "roles": [{ "group_name": "no id" }] }), &config(&[])),
            Err(TranslateError::Malformed(_))
        ));
    }
}
