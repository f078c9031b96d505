//! `ciphertrust_cm_password_policy`: user password policies
//!
//! Create and update share one upsert: PATCH the named policy and create it
//! when the appliance answers 404. The built-in `global` policy is never
//! deleted.

use async_trait::async_trait;
use ciphertrust_client::CmClient;
use ciphertrust_client::model::PasswordPolicy;
use ciphertrust_plugin::{Attribute, AttributeType, ProviderError, Resource, ResultExt, Schema};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{NotFoundExt, ignore_not_found, require_id};

pub const GLOBAL_POLICY: &str = "global";

pub struct PasswordPolicyResource;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PasswordPolicyState {
    pub id: Option<String>,
    pub policy_name: Option<String>,
    pub inclusive_min_upper_case: Option<i64>,
    pub inclusive_min_lower_case: Option<i64>,
    pub inclusive_min_digits: Option<i64>,
    pub inclusive_min_other: Option<i64>,
    pub inclusive_min_total_length: Option<i64>,
    pub inclusive_max_total_length: Option<i64>,
    pub password_history_threshold: Option<i64>,
    pub failed_logins_lockout_thresholds: Option<Vec<i64>>,
    pub password_lifetime: Option<i64>,
    pub password_change_min_days: Option<i64>,
}

impl PasswordPolicyState {
    fn name(&self) -> &str {
        self.policy_name.as_deref().unwrap_or(GLOBAL_POLICY)
    }

    pub fn request(&self) -> PasswordPolicy {
        PasswordPolicy {
            policy_name: None,
            inclusive_min_upper_case: self.inclusive_min_upper_case,
            inclusive_min_lower_case: self.inclusive_min_lower_case,
            inclusive_min_digits: self.inclusive_min_digits,
            inclusive_min_other: self.inclusive_min_other,
            inclusive_min_total_length: self.inclusive_min_total_length,
            inclusive_max_total_length: self.inclusive_max_total_length,
            password_history_threshold: self.password_history_threshold,
            failed_logins_lockout_thresholds: self.failed_logins_lockout_thresholds.clone(),
            password_lifetime: self.password_lifetime,
            password_change_min_days: self.password_change_min_days,
        }
    }

    /// Every setting is optional and computed: what the appliance reports wins
    pub fn from_response(policy: PasswordPolicy, planned: &PasswordPolicyState) -> Self {
        let name = policy
            .policy_name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| planned.name().to_string());
        PasswordPolicyState {
            id: Some(name.clone()),
            policy_name: Some(name),
            inclusive_min_upper_case: policy
                .inclusive_min_upper_case
                .or(planned.inclusive_min_upper_case),
            inclusive_min_lower_case: policy
                .inclusive_min_lower_case
                .or(planned.inclusive_min_lower_case),
            inclusive_min_digits: policy.inclusive_min_digits.or(planned.inclusive_min_digits),
            inclusive_min_other: policy.inclusive_min_other.or(planned.inclusive_min_other),
            inclusive_min_total_length: policy
                .inclusive_min_total_length
                .or(planned.inclusive_min_total_length),
            inclusive_max_total_length: policy
                .inclusive_max_total_length
                .or(planned.inclusive_max_total_length),
            password_history_threshold: policy
                .password_history_threshold
                .or(planned.password_history_threshold),
            failed_logins_lockout_thresholds: policy
                .failed_logins_lockout_thresholds
                .or(planned.failed_logins_lockout_thresholds.clone()),
            password_lifetime: policy.password_lifetime.or(planned.password_lifetime),
            password_change_min_days: policy
                .password_change_min_days
                .or(planned.password_change_min_days),
        }
    }
}

async fn upsert(
    client: &CmClient,
    plan: PasswordPolicyState,
) -> Result<PasswordPolicyState, ProviderError> {
    let name = plan.name().to_string();
    let policy = client
        .upsert_password_policy(&name, &plan.request())
        .await
        .or_diagnostic("Error applying password policy")?;
    info!(name = %name, "Applied password policy");
    Ok(PasswordPolicyState::from_response(policy, &plan))
}

#[async_trait]
impl Resource for PasswordPolicyResource {
    type Data = CmClient;
    type State = PasswordPolicyState;

    fn type_name(&self) -> &'static str {
        "ciphertrust_cm_password_policy"
    }

    fn schema(&self) -> Schema {
        let setting = |name: &str| Attribute::number(name).optional().computed();
        Schema::new("Password policy for local users. Defaults to the global policy.")
            .attribute(Attribute::string("id").computed().use_state_for_unknown())
            .attribute(
                Attribute::string("policy_name")
                    .optional()
                    .computed()
                    .requires_replace()
                    .use_state_for_unknown(),
            )
            .attribute(setting("inclusive_min_upper_case"))
            .attribute(setting("inclusive_min_lower_case"))
            .attribute(setting("inclusive_min_digits"))
            .attribute(setting("inclusive_min_other"))
            .attribute(setting("inclusive_min_total_length"))
            .attribute(setting("inclusive_max_total_length"))
            .attribute(setting("password_history_threshold"))
            .attribute(
                Attribute::list("failed_logins_lockout_thresholds", AttributeType::Number)
                    .optional()
                    .computed()
                    .description("Lockout minutes after each consecutive failed login."),
            )
            .attribute(setting("password_lifetime").description("Days before a password expires."))
            .attribute(setting("password_change_min_days"))
    }

    async fn create(
        &self,
        client: &CmClient,
        plan: PasswordPolicyState,
    ) -> Result<PasswordPolicyState, ProviderError> {
        upsert(client, plan).await
    }

    async fn read(
        &self,
        client: &CmClient,
        state: PasswordPolicyState,
    ) -> Result<Option<PasswordPolicyState>, ProviderError> {
        let name = require_id(&state.id, "password policy")?;
        let policy = client
            .get_password_policy(name)
            .await
            .found()
            .or_diagnostic("Error reading password policy")?;
        Ok(policy.map(|policy| PasswordPolicyState::from_response(policy, &state)))
    }

    async fn update(
        &self,
        client: &CmClient,
        _prior: PasswordPolicyState,
        plan: PasswordPolicyState,
    ) -> Result<PasswordPolicyState, ProviderError> {
        upsert(client, plan).await
    }

    async fn delete(
        &self,
        client: &CmClient,
        state: PasswordPolicyState,
    ) -> Result<(), ProviderError> {
        let name = require_id(&state.id, "password policy")?;
        if name == GLOBAL_POLICY {
            warn!("The global password policy cannot be deleted, dropping from state only");
            return Ok(());
        }
        ignore_not_found(client.delete_password_policy(name).await)
            .or_diagnostic("Error deleting password policy")?;
        info!(name, "Deleted password policy");
        Ok(())
    }

    async fn import(
        &self,
        _client: &CmClient,
        id: &str,
    ) -> Result<PasswordPolicyState, ProviderError> {
        Ok(PasswordPolicyState {
            id: Some(id.to_string()),
            policy_name: Some(id.to_string()),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_omits_name_and_unset_settings() {
        let plan = PasswordPolicyState {
            policy_name: Some("strict".to_string()),
            inclusive_min_digits: Some(2),
            failed_logins_lockout_thresholds: Some(vec![0, 5, 30]),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(plan.request()).unwrap(),
            json!({"inclusive_min_digits": 2, "failed_logins_lockout_thresholds": [0, 5, 30]})
        );
    }

    #[test]
    fn test_name_defaults_to_global() {
        let state = PasswordPolicyState::from_response(
            PasswordPolicy::default(),
            &PasswordPolicyState::default(),
        );
        assert_eq!(state.id.as_deref(), Some(GLOBAL_POLICY));
        assert_eq!(state.policy_name.as_deref(), Some(GLOBAL_POLICY));
    }

    #[test]
    fn test_from_response_prefers_appliance_values() {
        let plan = PasswordPolicyState {
            policy_name: Some("strict".to_string()),
            inclusive_min_digits: Some(2),
            password_lifetime: Some(90),
            ..Default::default()
        };
        let policy: PasswordPolicy = serde_json::from_value(json!({
            "policy_name": "strict",
            "inclusive_min_digits": 2,
            "inclusive_min_upper_case": 1
        }))
        .unwrap();

        let state = PasswordPolicyState::from_response(policy, &plan);
        assert_eq!(state.inclusive_min_upper_case, Some(1));
        assert_eq!(state.inclusive_min_digits, Some(2));
        assert_eq!(state.password_lifetime, Some(90));
    }
}
