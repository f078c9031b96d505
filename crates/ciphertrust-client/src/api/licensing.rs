// Licensing APIs

use crate::{
    CmClient,
    constants::api_path,
    error::Result,
    model::{AddLicenseRequest, License, Page, TrialLicense},
};

impl CmClient {
    pub async fn add_license(&self, request: &AddLicenseRequest) -> Result<License> {
        self.post_json(api_path::LICENSES, request).await
    }

    pub async fn get_license(&self, id: &str) -> Result<License> {
        self.get(&format!("{}/{}", api_path::LICENSES, id)).await
    }

    pub async fn list_trial_licenses(&self) -> Result<Page<TrialLicense>> {
        self.get(api_path::TRIALS).await
    }

    pub async fn get_trial_license(&self, id: &str) -> Result<TrialLicense> {
        self.get(&format!("{}/{}", api_path::TRIALS, id)).await
    }

    pub async fn activate_trial_license(&self, id: &str) -> Result<TrialLicense> {
        self.post_empty(&format!("{}/{}/activate", api_path::TRIALS, id))
            .await
    }

    /// The response body, if any, is discarded
    pub async fn deactivate_trial_license(&self, id: &str) -> Result<()> {
        self.post_empty::<serde_json::Value>(&format!("{}/{}/deactivate", api_path::TRIALS, id))
            .await
            .map(|_| ())
    }
}
