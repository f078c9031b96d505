//! `ciphertrust_cm_local_ca`: local certificate authorities
//!
//! Creating a local CA only produces a pending CSR; it becomes usable once
//! signed, see `ciphertrust_cm_self_sign_local_ca`. The subject is fixed at
//! creation and only the authentication flags can be patched afterwards.

use async_trait::async_trait;
use ciphertrust_client::CmClient;
use ciphertrust_client::model::{
    CreateLocalCaRequest, DistinguishedName, LocalCa, UpdateLocalCaRequest,
};
use ciphertrust_plugin::{Attribute, AttributeType, ProviderError, Resource, ResultExt, Schema};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{NotFoundExt, computed_str, ignore_not_found, non_empty, require_id};

pub struct LocalCaResource;

/// One subject name set; attribute names follow the X.509 short names
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NameModel {
    pub c: Option<String>,
    pub st: Option<String>,
    pub l: Option<String>,
    pub o: Option<String>,
    pub ou: Option<String>,
}

impl From<&NameModel> for DistinguishedName {
    fn from(name: &NameModel) -> Self {
        DistinguishedName {
            country: name.c.clone(),
            state: name.st.clone(),
            locality: name.l.clone(),
            organization: name.o.clone(),
            organizational_unit: name.ou.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalCaState {
    pub id: Option<String>,
    pub name: Option<String>,
    pub cn: Option<String>,
    pub algorithm: Option<String>,
    pub size: Option<i64>,
    pub dns_names: Option<Vec<String>>,
    pub ip_addresses: Option<Vec<String>>,
    pub email_addresses: Option<Vec<String>>,
    pub names: Option<Vec<NameModel>>,
    pub allow_client_authentication: Option<bool>,
    pub allow_user_authentication: Option<bool>,
    pub state: Option<String>,
    pub csr: Option<String>,
    pub cert: Option<String>,
    pub subject: Option<String>,
    pub issuer: Option<String>,
    pub serial_number: Option<String>,
    pub not_before: Option<String>,
    pub not_after: Option<String>,
    pub sha1_fingerprint: Option<String>,
    pub sha256_fingerprint: Option<String>,
    pub sha512_fingerprint: Option<String>,
    pub uri: Option<String>,
    pub account: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// `Enabled` / `Disabled` as reported under `purpose`
fn purpose_flag(value: Option<&str>) -> Option<bool> {
    match value? {
        v if v.eq_ignore_ascii_case("enabled") => Some(true),
        v if v.eq_ignore_ascii_case("disabled") => Some(false),
        _ => None,
    }
}

/// CN component of a subject such as `/C=US/O=Example/CN=ca.example.com`
fn common_name(subject: &str) -> Option<String> {
    subject
        .split(['/', ','])
        .filter_map(|part| part.trim().split_once('='))
        .find(|(key, _)| key.eq_ignore_ascii_case("cn"))
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

impl LocalCaState {
    pub fn create_request(&self) -> CreateLocalCaRequest {
        CreateLocalCaRequest {
            cn: self.cn.clone().unwrap_or_default(),
            name: self.name.clone(),
            algorithm: self.algorithm.clone(),
            size: self.size,
            dns_names: self.dns_names.clone().unwrap_or_default(),
            ip_addresses: self.ip_addresses.clone().unwrap_or_default(),
            email_addresses: self.email_addresses.clone().unwrap_or_default(),
            names: self
                .names
                .iter()
                .flatten()
                .map(DistinguishedName::from)
                .collect(),
        }
    }

    /// `None` when no flag is configured
    pub fn update_request(&self) -> Option<UpdateLocalCaRequest> {
        if self.allow_client_authentication.is_none() && self.allow_user_authentication.is_none() {
            return None;
        }
        Some(UpdateLocalCaRequest {
            allow_client_authentication: self.allow_client_authentication,
            allow_user_authentication: self.allow_user_authentication,
        })
    }

    pub fn from_response(ca: LocalCa, planned: &LocalCaState) -> Self {
        let purpose = ca.purpose.unwrap_or_default();
        LocalCaState {
            id: non_empty(ca.id),
            name: computed_str(ca.name, planned.name.clone()),
            cn: planned.cn.clone().or_else(|| common_name(&ca.subject)),
            algorithm: planned.algorithm.clone(),
            size: planned.size,
            dns_names: planned.dns_names.clone(),
            ip_addresses: planned.ip_addresses.clone(),
            email_addresses: planned.email_addresses.clone(),
            names: planned.names.clone(),
            allow_client_authentication: purpose_flag(purpose.client_authentication.as_deref())
                .or(planned.allow_client_authentication),
            allow_user_authentication: purpose_flag(purpose.user_authentication.as_deref())
                .or(planned.allow_user_authentication),
            state: non_empty(ca.state),
            csr: non_empty(ca.csr),
            cert: non_empty(ca.cert),
            subject: non_empty(ca.subject),
            issuer: non_empty(ca.issuer),
            serial_number: non_empty(ca.serial_number),
            not_before: non_empty(ca.not_before),
            not_after: non_empty(ca.not_after),
            sha1_fingerprint: non_empty(ca.sha1_fingerprint),
            sha256_fingerprint: non_empty(ca.sha256_fingerprint),
            sha512_fingerprint: non_empty(ca.sha512_fingerprint),
            uri: non_empty(ca.uri),
            account: non_empty(ca.account),
            created_at: non_empty(ca.created_at),
            updated_at: non_empty(ca.updated_at),
        }
    }
}

#[async_trait]
impl Resource for LocalCaResource {
    type Data = CmClient;
    type State = LocalCaState;

    fn type_name(&self) -> &'static str {
        "ciphertrust_cm_local_ca"
    }

    fn schema(&self) -> Schema {
        let names = vec![
            Attribute::string("c").optional().description("Country"),
            Attribute::string("st").optional().description("State or province"),
            Attribute::string("l").optional().description("Locality"),
            Attribute::string("o").optional().description("Organization"),
            Attribute::string("ou").optional().description("Organizational unit"),
        ];

        Schema::new("Local certificate authority.")
            .attribute(Attribute::string("id").computed().use_state_for_unknown())
            .attribute(
                Attribute::string("name")
                    .optional()
                    .computed()
                    .requires_replace()
                    .use_state_for_unknown(),
            )
            .attribute(
                Attribute::string("cn")
                    .required()
                    .requires_replace()
                    .description("Common name of the CA certificate."),
            )
            .attribute(
                Attribute::string("algorithm")
                    .optional()
                    .requires_replace()
                    .description("RSA or EC."),
            )
            .attribute(Attribute::number("size").optional().requires_replace())
            .attribute(
                Attribute::list("dns_names", AttributeType::String)
                    .optional()
                    .requires_replace(),
            )
            .attribute(
                Attribute::list("ip_addresses", AttributeType::String)
                    .optional()
                    .requires_replace(),
            )
            .attribute(
                Attribute::list("email_addresses", AttributeType::String)
                    .optional()
                    .requires_replace(),
            )
            .attribute(Attribute::list_nested("names", names).optional().requires_replace())
            .attribute(Attribute::bool("allow_client_authentication").optional().computed())
            .attribute(Attribute::bool("allow_user_authentication").optional().computed())
            .attribute(Attribute::string("state").computed())
            .attribute(Attribute::string("csr").computed())
            .attribute(Attribute::string("cert").computed())
            .attribute(Attribute::string("subject").computed())
            .attribute(Attribute::string("issuer").computed())
            .attribute(Attribute::string("serial_number").computed())
            .attribute(Attribute::string("not_before").computed())
            .attribute(Attribute::string("not_after").computed())
            .attribute(Attribute::string("sha1_fingerprint").computed())
            .attribute(Attribute::string("sha256_fingerprint").computed())
            .attribute(Attribute::string("sha512_fingerprint").computed())
            .attribute(Attribute::string("uri").computed().use_state_for_unknown())
            .attribute(Attribute::string("account").computed().use_state_for_unknown())
            .attribute(Attribute::string("created_at").computed().use_state_for_unknown())
            .attribute(Attribute::string("updated_at").computed())
    }

    async fn create(
        &self,
        client: &CmClient,
        plan: LocalCaState,
    ) -> Result<LocalCaState, ProviderError> {
        let mut ca = client
            .create_local_ca(&plan.create_request())
            .await
            .or_diagnostic("Error creating local CA")?;
        info!(id = %ca.id, cn = plan.cn.as_deref().unwrap_or_default(), "Created local CA");

        if let Some(request) = plan.update_request() {
            ca = client
                .update_local_ca(&ca.id, &request)
                .await
                .or_diagnostic("Error setting local CA authentication flags")?;
        }

        Ok(LocalCaState::from_response(ca, &plan))
    }

    async fn read(
        &self,
        client: &CmClient,
        state: LocalCaState,
    ) -> Result<Option<LocalCaState>, ProviderError> {
        let id = require_id(&state.id, "local CA")?;
        let ca = client
            .get_local_ca(id)
            .await
            .found()
            .or_diagnostic("Error reading local CA")?;
        Ok(ca.map(|ca| LocalCaState::from_response(ca, &state)))
    }

    async fn update(
        &self,
        client: &CmClient,
        prior: LocalCaState,
        plan: LocalCaState,
    ) -> Result<LocalCaState, ProviderError> {
        let id = require_id(&prior.id, "local CA")?;
        let ca = match plan.update_request() {
            Some(request) => client.update_local_ca(id, &request).await,
            None => client.get_local_ca(id).await,
        }
        .or_diagnostic("Error updating local CA")?;
        Ok(LocalCaState::from_response(ca, &plan))
    }

    async fn delete(&self, client: &CmClient, state: LocalCaState) -> Result<(), ProviderError> {
        let id = require_id(&state.id, "local CA")?;
        ignore_not_found(client.delete_local_ca(id).await)
            .or_diagnostic("Error deleting local CA")?;
        info!(id, "Deleted local CA");
        Ok(())
    }
}
