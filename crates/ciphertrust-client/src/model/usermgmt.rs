// User management model types: users, groups and password policies

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /v1/usermgmt/users`
#[derive(Clone, Debug, Default, Serialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_domain_user: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prevent_ui_login: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_change_required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_metadata: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_metadata: Option<Value>,
}

/// Body of `PATCH /v1/usermgmt/users/{id}`
#[derive(Clone, Debug, Default, Serialize)]
pub struct UpdateUserRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prevent_ui_login: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_change_required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_metadata: Option<Value>,
}

/// User as returned by the appliance
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub user_id: String,
    pub username: String,
    pub name: String,
    pub email: String,
    pub nickname: String,
    pub is_domain_user: bool,
    pub prevent_ui_login: bool,
    pub password_change_required: bool,
    pub user_metadata: Option<Value>,
    pub app_metadata: Option<Value>,
    pub created_at: String,
    pub updated_at: String,
    pub last_login: Option<String>,
    pub logins_count: i64,
}

/// Query of `GET /v1/usermgmt/users`
#[derive(Clone, Debug, Default, Serialize)]
pub struct UserQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

/// Body of `POST /v1/usermgmt/groups`
#[derive(Clone, Debug, Default, Serialize)]
pub struct CreateGroupRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_metadata: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_metadata: Option<Value>,
}

/// Body of `PATCH /v1/usermgmt/groups/{name}`
#[derive(Clone, Debug, Default, Serialize)]
pub struct UpdateGroupRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_metadata: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_metadata: Option<Value>,
}

/// Group as returned by the appliance
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Group {
    pub name: String,
    pub description: String,
    pub app_metadata: Option<Value>,
    pub user_metadata: Option<Value>,
    pub client_metadata: Option<Value>,
    pub created_at: String,
    pub updated_at: String,
}

/// Password policy, used both as request body and response
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordPolicy {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inclusive_min_upper_case: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inclusive_min_lower_case: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inclusive_min_digits: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inclusive_min_other: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inclusive_min_total_length: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inclusive_max_total_length: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_history_threshold: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_logins_lockout_thresholds: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_lifetime: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_change_min_days: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_user_skips_unset_fields() {
        let request = CreateUserRequest {
            username: "alice".to_string(),
            password: "pw".to_string(),
            email: Some("alice@example.com".to_string()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"username": "alice", "password": "pw", "email": "alice@example.com"})
        );
    }

    #[test]
    fn test_password_policy_round_trip_fields() {
        let policy: PasswordPolicy = serde_json::from_value(json!({
            "policy_name": "global",
            "inclusive_min_digits": 1,
            "failed_logins_lockout_thresholds": [0, 0, 1]
        }))
        .unwrap();
        assert_eq!(policy.policy_name.as_deref(), Some("global"));
        assert_eq!(policy.failed_logins_lockout_thresholds, Some(vec![0, 0, 1]));
        assert_eq!(policy.password_lifetime, None);
    }
}
