//! `ciphertrust_cm_trial_license`: activates the appliance's trial license

use async_trait::async_trait;
use ciphertrust_client::CmClient;
use ciphertrust_client::model::TrialLicense;
use ciphertrust_plugin::{Attribute, ProviderError, Resource, ResultExt, Schema};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{NotFoundExt, ignore_not_found, non_empty, require_id};

pub struct TrialLicenseResource;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrialLicenseState {
    pub id: Option<String>,
    pub trial_id: Option<String>,
    pub status: Option<String>,
    pub activated: Option<bool>,
    pub expiry: Option<String>,
    pub days_left: Option<i64>,
}

impl TrialLicenseState {
    pub fn from_response(trial: TrialLicense) -> Self {
        let id = non_empty(trial.id);
        TrialLicenseState {
            id: id.clone(),
            trial_id: id,
            status: non_empty(trial.status),
            activated: Some(trial.activated),
            expiry: non_empty(trial.expiry),
            days_left: Some(trial.days_left),
        }
    }
}

/// Trial to activate: the configured one, else the first the appliance offers
async fn select_trial(client: &CmClient, trial_id: Option<&str>) -> Result<String, ProviderError> {
    if let Some(id) = trial_id {
        return Ok(id.to_string());
    }
    let trials = client
        .list_trial_licenses()
        .await
        .or_diagnostic("Error listing trial licenses")?;
    trials
        .resources
        .into_iter()
        .map(|trial| trial.id)
        .find(|id| !id.is_empty())
        .ok_or_else(|| {
            ProviderError::new(
                "No trial license available",
                "The appliance does not offer a trial license to activate.",
            )
        })
}

#[async_trait]
impl Resource for TrialLicenseResource {
    type Data = CmClient;
    type State = TrialLicenseState;

    fn type_name(&self) -> &'static str {
        "ciphertrust_cm_trial_license"
    }

    fn schema(&self) -> Schema {
        Schema::new("Activated trial license. Destroying the resource deactivates the trial.")
            .attribute(Attribute::string("id").computed().use_state_for_unknown())
            .attribute(
                Attribute::string("trial_id")
                    .optional()
                    .computed()
                    .requires_replace()
                    .use_state_for_unknown()
                    .description("Trial to activate. Defaults to the first one offered."),
            )
            .attribute(Attribute::string("status").computed())
            .attribute(Attribute::bool("activated").computed())
            .attribute(Attribute::string("expiry").computed().use_state_for_unknown())
            .attribute(Attribute::number("days_left").computed())
    }

    async fn create(
        &self,
        client: &CmClient,
        plan: TrialLicenseState,
    ) -> Result<TrialLicenseState, ProviderError> {
        let id = select_trial(client, plan.trial_id.as_deref()).await?;
        let trial = client
            .activate_trial_license(&id)
            .await
            .or_diagnostic("Error activating trial license")?;
        info!(id = %id, expiry = %trial.expiry, "Activated trial license");

        let mut state = TrialLicenseState::from_response(trial);
        // the activation response may omit the id
        state.id.get_or_insert_with(|| id.clone());
        state.trial_id.get_or_insert(id);
        Ok(state)
    }

    async fn read(
        &self,
        client: &CmClient,
        state: TrialLicenseState,
    ) -> Result<Option<TrialLicenseState>, ProviderError> {
        let id = require_id(&state.id, "trial license")?;
        let trial = client
            .get_trial_license(id)
            .await
            .found()
            .or_diagnostic("Error reading trial license")?;
        // deactivated elsewhere: let terraform activate it again
        Ok(trial
            .filter(|trial| trial.activated)
            .map(TrialLicenseState::from_response))
    }

    async fn update(
        &self,
        _client: &CmClient,
        prior: TrialLicenseState,
        _plan: TrialLicenseState,
    ) -> Result<TrialLicenseState, ProviderError> {
        Ok(prior)
    }

    async fn delete(
        &self,
        client: &CmClient,
        state: TrialLicenseState,
    ) -> Result<(), ProviderError> {
        let id = require_id(&state.id, "trial license")?;
        ignore_not_found(client.deactivate_trial_license(id).await)
            .or_diagnostic("Error deactivating trial license")?;
        info!(id, "Deactivated trial license");
        Ok(())
    }
}
