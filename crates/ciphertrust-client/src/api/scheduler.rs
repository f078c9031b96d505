// Scheduler job configuration APIs

use crate::{
    CmClient,
    constants::api_path,
    error::Result,
    model::{JobConfig, JobConfigRequest},
};

impl CmClient {
    pub async fn create_job_config(&self, request: &JobConfigRequest) -> Result<JobConfig> {
        self.post_json(api_path::JOB_CONFIGS, request).await
    }

    pub async fn get_job_config(&self, id: &str) -> Result<JobConfig> {
        self.get(&format!("{}/{}", api_path::JOB_CONFIGS, id)).await
    }

    pub async fn update_job_config(
        &self,
        id: &str,
        request: &JobConfigRequest,
    ) -> Result<JobConfig> {
        self.patch_json(&format!("{}/{}", api_path::JOB_CONFIGS, id), request)
            .await
    }

    pub async fn delete_job_config(&self, id: &str) -> Result<()> {
        self.delete(&format!("{}/{}", api_path::JOB_CONFIGS, id))
            .await
    }
}
