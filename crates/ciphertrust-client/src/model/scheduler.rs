// Scheduler job configuration model types
//
// `job_config_params` is operation specific; the typed param structs below
// are serialized into it on the way out and parsed from it on the way back.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Operation names accepted by `/v1/scheduler/job-configs`
pub mod operation {
    pub const DATABASE_BACKUP: &str = "database_backup";
    pub const KEY_ROTATION: &str = "key_rotation";
    pub const CCKM_SYNCHRONIZATION: &str = "cckm_synchronization";
    pub const CCKM_KEY_ROTATION: &str = "cckm_key_rotation";
    pub const CCKM_XKS_CREDENTIAL_ROTATION: &str = "cckm_xks_credential_rotation";

    pub const ALL: &[&str] = &[
        DATABASE_BACKUP,
        KEY_ROTATION,
        CCKM_SYNCHRONIZATION,
        CCKM_KEY_ROTATION,
        CCKM_XKS_CREDENTIAL_ROTATION,
    ];
}

/// Body of `POST /v1/scheduler/job-configs` and `PATCH /v1/scheduler/job-configs/{id}`
#[derive(Clone, Debug, Default, Serialize)]
pub struct JobConfigRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_on: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_config_params: Option<Value>,
}

/// Job configuration as returned by the appliance
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    pub id: String,
    pub uri: String,
    pub account: String,
    pub name: String,
    pub operation: String,
    pub run_at: String,
    pub run_on: String,
    pub description: String,
    pub disabled: bool,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub job_config_params: Option<Value>,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

/// Resource filter of a database backup
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BackupFilter {
    pub resource_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_query: Option<Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseBackupParams {
    #[serde(rename = "backupKey", skip_serializing_if = "Option::is_none")]
    pub backup_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub do_scp: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(rename = "tiedToHSM", skip_serializing_if = "Option::is_none")]
    pub tied_to_hsm: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retention_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<Vec<BackupFilter>>,
}

/// Rotation of keys held by the appliance itself
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyRotationParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_in: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CckmSynchronizationParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synchronize_all: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kms: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_vaults: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_rings: Option<Vec<String>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CckmKeyRotationParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_in: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aws_retain_alias: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CckmXksCredentialRotationParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_backup_params_wire_names() {
        let params = DatabaseBackupParams {
            backup_key: Some("bk1".to_string()),
            tied_to_hsm: Some(false),
            filters: Some(vec![BackupFilter {
                resource_type: "Keys".to_string(),
                resource_query: Some(json!({"name": "app"})),
            }]),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({
                "backupKey": "bk1",
                "tiedToHSM": false,
                "filters": [{"resourceType": "Keys", "resourceQuery": {"name": "app"}}]
            })
        );
    }

    #[test]
    fn test_job_config_response() {
        let job: JobConfig = serde_json::from_value(json!({
            "id": "j1",
            "name": "nightly",
            "operation": "database_backup",
            "run_at": "0 2 * * *",
            "run_on": "any",
            "job_config_params": {"scope": "system"},
            "createdAt": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(job.operation, operation::DATABASE_BACKUP);
        assert_eq!(job.job_config_params.unwrap()["scope"], "system");
        assert!(!job.disabled);
    }
}
