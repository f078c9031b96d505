//! `ciphertrust_cm_scheduler`: scheduled job configurations
//!
//! A job config carries one operation-specific params object. Terraform
//! exposes one nested attribute per operation; exactly the one matching
//! `operation` is sent as `job_config_params` and filled back from the
//! response.

use async_trait::async_trait;
use ciphertrust_client::CmClient;
use ciphertrust_client::model::{
    BackupFilter, CckmKeyRotationParams, CckmSynchronizationParams,
    CckmXksCredentialRotationParams, DatabaseBackupParams, JobConfig, JobConfigRequest,
    KeyRotationParams, operation,
};
use ciphertrust_plugin::{
    Attribute, AttributeType, Diagnostics, ProviderError, Resource, ResultExt, Schema, Value,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value as JsonValue;
use tracing::{debug, info};

use super::{
    NotFoundExt, computed_str, ignore_not_found, json_text, keep_planned, non_empty, parse_json,
    require_id,
};

pub const DEFAULT_RUN_ON: &str = "any";

const DATABASE_BACKUP_PARAMS: &str = "database_backup_params";
const KEY_ROTATION_PARAMS: &str = "key_rotation_params";
const CCKM_SYNCHRONIZATION_PARAMS: &str = "cckm_synchronization_params";
const CCKM_KEY_ROTATION_PARAMS: &str = "cckm_key_rotation_params";
const CCKM_XKS_CREDENTIAL_ROTATION_PARAMS: &str = "cckm_xks_credential_rotation_params";

/// Params attribute for each operation, and whether it may be omitted
const PARAMS_BY_OPERATION: &[(&str, &str, bool)] = &[
    (operation::DATABASE_BACKUP, DATABASE_BACKUP_PARAMS, false),
    (operation::KEY_ROTATION, KEY_ROTATION_PARAMS, false),
    (operation::CCKM_SYNCHRONIZATION, CCKM_SYNCHRONIZATION_PARAMS, false),
    (operation::CCKM_KEY_ROTATION, CCKM_KEY_ROTATION_PARAMS, false),
    (
        operation::CCKM_XKS_CREDENTIAL_ROTATION,
        CCKM_XKS_CREDENTIAL_ROTATION_PARAMS,
        true,
    ),
];

pub struct SchedulerResource;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackupFilterModel {
    pub resource_type: Option<String>,
    /// JSON-encoded query
    pub resource_query: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseBackupParamsModel {
    pub backup_key: Option<String>,
    pub connection: Option<String>,
    pub description: Option<String>,
    pub do_scp: Option<bool>,
    pub scope: Option<String>,
    pub tied_to_hsm: Option<bool>,
    pub retention_count: Option<i64>,
    pub filters: Option<Vec<BackupFilterModel>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyRotationParamsModel {
    pub query_filter: Option<String>,
    pub expire_in: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CckmSynchronizationParamsModel {
    pub cloud_name: Option<String>,
    pub synchronize_all: Option<bool>,
    pub kms: Option<Vec<String>>,
    pub key_vaults: Option<Vec<String>>,
    pub key_rings: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CckmKeyRotationParamsModel {
    pub cloud_name: Option<String>,
    pub expiration: Option<String>,
    pub expire_in: Option<String>,
    pub aws_retain_alias: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CckmXksCredentialRotationParamsModel {
    pub cloud_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchedulerState {
    pub id: Option<String>,
    pub name: Option<String>,
    pub operation: Option<String>,
    pub run_at: Option<String>,
    pub run_on: Option<String>,
    pub description: Option<String>,
    pub disabled: Option<bool>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub database_backup_params: Option<DatabaseBackupParamsModel>,
    pub key_rotation_params: Option<KeyRotationParamsModel>,
    pub cckm_synchronization_params: Option<CckmSynchronizationParamsModel>,
    pub cckm_key_rotation_params: Option<CckmKeyRotationParamsModel>,
    pub cckm_xks_credential_rotation_params: Option<CckmXksCredentialRotationParamsModel>,
    pub account: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// A Terraform params object and its wire counterpart
trait ParamsModel: Sized + Clone {
    type Wire: Serialize + DeserializeOwned;

    fn to_wire(&self) -> Result<Self::Wire, ProviderError>;

    fn from_wire(wire: Self::Wire) -> Self;

    /// Fields the response left out fall back to `planned`
    fn or_planned(self, planned: Self) -> Self;
}

impl ParamsModel for DatabaseBackupParamsModel {
    type Wire = DatabaseBackupParams;

    fn to_wire(&self) -> Result<DatabaseBackupParams, ProviderError> {
        let filters = self
            .filters
            .as_ref()
            .map(|filters| {
                filters
                    .iter()
                    .map(|f| {
                        Ok(BackupFilter {
                            resource_type: f.resource_type.clone().unwrap_or_default(),
                            resource_query: parse_json(
                                "resource_query",
                                f.resource_query.as_deref(),
                            )?,
                        })
                    })
                    .collect::<Result<Vec<_>, ProviderError>>()
            })
            .transpose()?;

        Ok(DatabaseBackupParams {
            backup_key: self.backup_key.clone(),
            connection: self.connection.clone(),
            description: self.description.clone(),
            do_scp: self.do_scp,
            scope: self.scope.clone(),
            tied_to_hsm: self.tied_to_hsm,
            retention_count: self.retention_count,
            filters,
        })
    }

    fn from_wire(wire: DatabaseBackupParams) -> Self {
        Self {
            backup_key: wire.backup_key,
            connection: wire.connection,
            description: wire.description,
            do_scp: wire.do_scp,
            scope: wire.scope,
            tied_to_hsm: wire.tied_to_hsm,
            retention_count: wire.retention_count,
            filters: wire.filters.map(|filters| {
                filters
                    .into_iter()
                    .map(|f| BackupFilterModel {
                        resource_type: non_empty(f.resource_type),
                        resource_query: json_text(f.resource_query.as_ref(), None),
                    })
                    .collect()
            }),
        }
    }

    fn or_planned(self, planned: Self) -> Self {
        let filters = match (self.filters, planned.filters) {
            (Some(response), Some(planned)) if response.len() == planned.len() => Some(
                response
                    .into_iter()
                    .zip(planned)
                    .map(|(r, p)| BackupFilterModel {
                        resource_type: keep_planned(r.resource_type, p.resource_type),
                        resource_query: p.resource_query.map(|text| {
                            let echoed = r
                                .resource_query
                                .and_then(|q| serde_json::from_str::<JsonValue>(&q).ok());
                            json_text(echoed.as_ref(), Some(text.clone())).unwrap_or(text)
                        }),
                    })
                    .collect(),
            ),
            (response, planned) => keep_planned(response, planned),
        };

        Self {
            backup_key: keep_planned(self.backup_key, planned.backup_key),
            connection: keep_planned(self.connection, planned.connection),
            description: keep_planned(self.description, planned.description),
            do_scp: keep_planned(self.do_scp, planned.do_scp),
            scope: keep_planned(self.scope, planned.scope),
            tied_to_hsm: keep_planned(self.tied_to_hsm, planned.tied_to_hsm),
            retention_count: keep_planned(self.retention_count, planned.retention_count),
            filters,
        }
    }
}

impl ParamsModel for KeyRotationParamsModel {
    type Wire = KeyRotationParams;

    fn to_wire(&self) -> Result<KeyRotationParams, ProviderError> {
        Ok(KeyRotationParams {
            query_filter: self.query_filter.clone(),
            expire_in: self.expire_in.clone(),
        })
    }

    fn from_wire(wire: KeyRotationParams) -> Self {
        Self {
            query_filter: wire.query_filter,
            expire_in: wire.expire_in,
        }
    }

    fn or_planned(self, planned: Self) -> Self {
        Self {
            query_filter: keep_planned(self.query_filter, planned.query_filter),
            expire_in: keep_planned(self.expire_in, planned.expire_in),
        }
    }
}

impl ParamsModel for CckmSynchronizationParamsModel {
    type Wire = CckmSynchronizationParams;

    fn to_wire(&self) -> Result<CckmSynchronizationParams, ProviderError> {
        Ok(CckmSynchronizationParams {
            cloud_name: self.cloud_name.clone(),
            synchronize_all: self.synchronize_all,
            kms: self.kms.clone(),
            key_vaults: self.key_vaults.clone(),
            key_rings: self.key_rings.clone(),
        })
    }

    fn from_wire(wire: CckmSynchronizationParams) -> Self {
        Self {
            cloud_name: wire.cloud_name,
            synchronize_all: wire.synchronize_all,
            kms: wire.kms,
            key_vaults: wire.key_vaults,
            key_rings: wire.key_rings,
        }
    }

    fn or_planned(self, planned: Self) -> Self {
        Self {
            cloud_name: keep_planned(self.cloud_name, planned.cloud_name),
            synchronize_all: keep_planned(self.synchronize_all, planned.synchronize_all),
            kms: keep_planned(self.kms, planned.kms),
            key_vaults: keep_planned(self.key_vaults, planned.key_vaults),
            key_rings: keep_planned(self.key_rings, planned.key_rings),
        }
    }
}

impl ParamsModel for CckmKeyRotationParamsModel {
    type Wire = CckmKeyRotationParams;

    fn to_wire(&self) -> Result<CckmKeyRotationParams, ProviderError> {
        Ok(CckmKeyRotationParams {
            cloud_name: self.cloud_name.clone(),
            expiration: self.expiration.clone(),
            expire_in: self.expire_in.clone(),
            aws_retain_alias: self.aws_retain_alias,
        })
    }

    fn from_wire(wire: CckmKeyRotationParams) -> Self {
        Self {
            cloud_name: wire.cloud_name,
            expiration: wire.expiration,
            expire_in: wire.expire_in,
            aws_retain_alias: wire.aws_retain_alias,
        }
    }

    fn or_planned(self, planned: Self) -> Self {
        Self {
            cloud_name: keep_planned(self.cloud_name, planned.cloud_name),
            expiration: keep_planned(self.expiration, planned.expiration),
            expire_in: keep_planned(self.expire_in, planned.expire_in),
            aws_retain_alias: keep_planned(self.aws_retain_alias, planned.aws_retain_alias),
        }
    }
}

impl ParamsModel for CckmXksCredentialRotationParamsModel {
    type Wire = CckmXksCredentialRotationParams;

    fn to_wire(&self) -> Result<CckmXksCredentialRotationParams, ProviderError> {
        Ok(CckmXksCredentialRotationParams {
            cloud_name: self.cloud_name.clone(),
        })
    }

    fn from_wire(wire: CckmXksCredentialRotationParams) -> Self {
        Self {
            cloud_name: wire.cloud_name,
        }
    }

    fn or_planned(self, planned: Self) -> Self {
        Self {
            cloud_name: keep_planned(self.cloud_name, planned.cloud_name),
        }
    }
}

fn params_payload<M: ParamsModel>(params: &Option<M>) -> Result<Option<JsonValue>, ProviderError> {
    params
        .as_ref()
        .map(|p| {
            let wire = p.to_wire()?;
            serde_json::to_value(&wire).or_diagnostic("Failed to encode job_config_params")
        })
        .transpose()
}

fn reconcile_params<M: ParamsModel>(
    response: Option<&JsonValue>,
    planned: &Option<M>,
    importing: bool,
) -> Option<M> {
    let echoed = response
        .filter(|v| v.is_object())
        .and_then(|v| serde_json::from_value::<M::Wire>(v.clone()).ok())
        .map(M::from_wire);

    if importing {
        return echoed;
    }
    planned.clone().map(|p| match echoed {
        Some(r) => r.or_planned(p),
        None => p,
    })
}

impl SchedulerState {
    /// Body of `job_config_params` for the configured operation
    pub fn job_config_params(&self) -> Result<Option<JsonValue>, ProviderError> {
        match self.operation.as_deref() {
            Some(operation::DATABASE_BACKUP) => params_payload(&self.database_backup_params),
            Some(operation::KEY_ROTATION) => params_payload(&self.key_rotation_params),
            Some(operation::CCKM_SYNCHRONIZATION) => {
                params_payload(&self.cckm_synchronization_params)
            }
            Some(operation::CCKM_KEY_ROTATION) => params_payload(&self.cckm_key_rotation_params),
            Some(operation::CCKM_XKS_CREDENTIAL_ROTATION) => {
                params_payload(&self.cckm_xks_credential_rotation_params)
            }
            _ => Ok(None),
        }
    }

    pub fn create_request(&self) -> Result<JobConfigRequest, ProviderError> {
        Ok(JobConfigRequest {
            name: self.name.clone(),
            operation: self.operation.clone(),
            run_at: self.run_at.clone(),
            run_on: Some(
                self.run_on
                    .clone()
                    .unwrap_or_else(|| DEFAULT_RUN_ON.to_string()),
            ),
            description: self.description.clone(),
            disabled: self.disabled,
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            job_config_params: self.job_config_params()?,
        })
    }

    /// Name and operation force replacement, so they are never patched.
    /// A date dropped from the configuration is sent empty to clear it.
    pub fn update_request(
        &self,
        prior: &SchedulerState,
    ) -> Result<JobConfigRequest, ProviderError> {
        let cleared = |planned: &Option<String>, before: &Option<String>| match (planned, before) {
            (None, Some(_)) => Some(String::new()),
            _ => planned.clone(),
        };
        Ok(JobConfigRequest {
            name: None,
            operation: None,
            start_date: cleared(&self.start_date, &prior.start_date),
            end_date: cleared(&self.end_date, &prior.end_date),
            ..self.create_request()?
        })
    }

    pub fn from_response(job: JobConfig, planned: &SchedulerState, importing: bool) -> Self {
        let mut state = SchedulerState {
            id: non_empty(job.id),
            name: computed_str(job.name, planned.name.clone()),
            operation: computed_str(job.operation, planned.operation.clone()),
            run_at: computed_str(job.run_at, planned.run_at.clone()),
            run_on: computed_str(job.run_on, planned.run_on.clone())
                .or_else(|| Some(DEFAULT_RUN_ON.to_string())),
            description: computed_str(job.description, planned.description.clone()),
            disabled: Some(job.disabled),
            // The appliance reformats timestamps; configured text is kept
            start_date: planned
                .start_date
                .clone()
                .or_else(|| job.start_date.and_then(non_empty)),
            end_date: planned
                .end_date
                .clone()
                .or_else(|| job.end_date.and_then(non_empty)),
            account: non_empty(job.account),
            created_at: non_empty(job.created_at),
            updated_at: non_empty(job.updated_at),
            ..Default::default()
        };

        let operation = state.operation.clone().unwrap_or_default();
        state.params_from_response(&operation, job.job_config_params.as_ref(), planned, importing);
        state
    }

    /// Fill the params object matching `operation` from the response
    ///
    /// Every other params object ends up null.
    pub fn params_from_response(
        &mut self,
        operation: &str,
        params: Option<&JsonValue>,
        planned: &SchedulerState,
        importing: bool,
    ) {
        self.database_backup_params = None;
        self.key_rotation_params = None;
        self.cckm_synchronization_params = None;
        self.cckm_key_rotation_params = None;
        self.cckm_xks_credential_rotation_params = None;

        match operation {
            operation::DATABASE_BACKUP => {
                self.database_backup_params =
                    reconcile_params(params, &planned.database_backup_params, importing)
            }
            operation::KEY_ROTATION => {
                self.key_rotation_params =
                    reconcile_params(params, &planned.key_rotation_params, importing)
            }
            operation::CCKM_SYNCHRONIZATION => {
                self.cckm_synchronization_params =
                    reconcile_params(params, &planned.cckm_synchronization_params, importing)
            }
            operation::CCKM_KEY_ROTATION => {
                self.cckm_key_rotation_params =
                    reconcile_params(params, &planned.cckm_key_rotation_params, importing)
            }
            operation::CCKM_XKS_CREDENTIAL_ROTATION => {
                self.cckm_xks_credential_rotation_params = reconcile_params(
                    params,
                    &planned.cckm_xks_credential_rotation_params,
                    importing,
                )
            }
            other => debug!(operation = other, "Unrecognized scheduler operation"),
        }
    }
}

/// Params objects must agree with `operation`
pub fn validate_operation_params(config: &Value, diags: &mut Diagnostics) {
    let Some(op) = config.get("operation").and_then(Value::as_str) else {
        return;
    };

    for (attr_operation, attr, optional) in PARAMS_BY_OPERATION {
        let value = config.get(attr).unwrap_or(&Value::Null);
        if *attr_operation == op {
            if value.is_null() && !optional {
                diags.attribute_error(
                    vec![attr.to_string()],
                    "Missing operation parameters",
                    format!("{attr} must be set when operation is {op}"),
                );
            }
        } else if !value.is_null() && !value.is_unknown() {
            diags.attribute_error(
                vec![attr.to_string()],
                "Conflicting operation parameters",
                format!("{attr} cannot be set when operation is {op}"),
            );
        }
    }
}

#[async_trait]
impl Resource for SchedulerResource {
    type Data = CmClient;
    type State = SchedulerState;

    fn type_name(&self) -> &'static str {
        "ciphertrust_cm_scheduler"
    }

    fn schema(&self) -> Schema {
        Schema::new("Scheduled job configuration.")
            .attribute(Attribute::string("id").computed().use_state_for_unknown())
            .attribute(
                Attribute::string("name")
                    .required()
                    .requires_replace()
                    .description("Unique name of the job configuration."),
            )
            .attribute(
                Attribute::string("operation")
                    .required()
                    .requires_replace()
                    .one_of(operation::ALL),
            )
            .attribute(
                Attribute::string("run_at")
                    .required()
                    .description("Cron expression, e.g. \"0 9 * * sat,sun\"."),
            )
            .attribute(
                Attribute::string("run_on")
                    .optional()
                    .computed()
                    .description("Node the job runs on. Defaults to \"any\"."),
            )
            .attribute(Attribute::string("description").optional().computed())
            .attribute(Attribute::bool("disabled").optional().computed())
            .attribute(
                Attribute::string("start_date")
                    .optional()
                    .computed()
                    .description("RFC 3339 time before which the job does not run."),
            )
            .attribute(
                Attribute::string("end_date")
                    .optional()
                    .computed()
                    .description("RFC 3339 time after which the job no longer runs."),
            )
            .attribute(
                Attribute::single_nested(
                    DATABASE_BACKUP_PARAMS,
                    vec![
                        Attribute::string("backup_key").optional(),
                        Attribute::string("connection")
                            .optional()
                            .description("Connection used to upload the backup over SCP."),
                        Attribute::string("description").optional(),
                        Attribute::bool("do_scp").optional(),
                        Attribute::string("scope").optional().one_of(&["system", "domain"]),
                        Attribute::bool("tied_to_hsm").optional(),
                        Attribute::number("retention_count").optional(),
                        Attribute::list_nested(
                            "filters",
                            vec![
                                Attribute::string("resource_type").required(),
                                Attribute::string("resource_query")
                                    .optional()
                                    .description("JSON-encoded resource query."),
                            ],
                        )
                        .optional(),
                    ],
                )
                .optional(),
            )
            .attribute(
                Attribute::single_nested(
                    KEY_ROTATION_PARAMS,
                    vec![
                        Attribute::string("query_filter").optional(),
                        Attribute::string("expire_in").optional(),
                    ],
                )
                .optional(),
            )
            .attribute(
                Attribute::single_nested(
                    CCKM_SYNCHRONIZATION_PARAMS,
                    vec![
                        Attribute::string("cloud_name").required(),
                        Attribute::bool("synchronize_all").optional(),
                        Attribute::list("kms", AttributeType::String).optional(),
                        Attribute::list("key_vaults", AttributeType::String).optional(),
                        Attribute::list("key_rings", AttributeType::String).optional(),
                    ],
                )
                .optional(),
            )
            .attribute(
                Attribute::single_nested(
                    CCKM_KEY_ROTATION_PARAMS,
                    vec![
                        Attribute::string("cloud_name").required(),
                        Attribute::string("expiration").optional(),
                        Attribute::string("expire_in").optional(),
                        Attribute::bool("aws_retain_alias").optional(),
                    ],
                )
                .optional(),
            )
            .attribute(
                Attribute::single_nested(
                    CCKM_XKS_CREDENTIAL_ROTATION_PARAMS,
                    vec![Attribute::string("cloud_name").optional()],
                )
                .optional(),
            )
            .attribute(Attribute::string("account").computed())
            .attribute(Attribute::string("created_at").computed())
            .attribute(Attribute::string("updated_at").computed())
    }

    fn validate(&self, config: &Value, diags: &mut Diagnostics) {
        validate_operation_params(config, diags);
    }

    async fn create(
        &self,
        client: &CmClient,
        plan: SchedulerState,
    ) -> Result<SchedulerState, ProviderError> {
        let request = plan.create_request()?;
        let job = client
            .create_job_config(&request)
            .await
            .or_diagnostic("Error creating scheduler job config")?;
        info!(id = %job.id, name = %job.name, operation = %job.operation, "Created job config");
        Ok(SchedulerState::from_response(job, &plan, false))
    }

    async fn read(
        &self,
        client: &CmClient,
        state: SchedulerState,
    ) -> Result<Option<SchedulerState>, ProviderError> {
        let id = require_id(&state.id, "job config")?;
        let importing = state.operation.is_none();
        let job = client
            .get_job_config(id)
            .await
            .found()
            .or_diagnostic("Error reading scheduler job config")?;
        Ok(job.map(|job| SchedulerState::from_response(job, &state, importing)))
    }

    async fn update(
        &self,
        client: &CmClient,
        prior: SchedulerState,
        plan: SchedulerState,
    ) -> Result<SchedulerState, ProviderError> {
        let id = require_id(&prior.id, "job config")?;
        let request = plan.update_request(&prior)?;
        let job = client
            .update_job_config(id, &request)
            .await
            .or_diagnostic("Error updating scheduler job config")?;
        Ok(SchedulerState::from_response(job, &plan, false))
    }

    async fn delete(&self, client: &CmClient, state: SchedulerState) -> Result<(), ProviderError> {
        let id = require_id(&state.id, "job config")?;
        ignore_not_found(client.delete_job_config(id).await)
            .or_diagnostic("Error deleting scheduler job config")?;
        info!(id, "Deleted job config");
        Ok(())
    }
}
