//! Resources and data sources driven through the plugin layer against a
//! mocked appliance

use ciphertrust_client::{ClientConfig, CmClient};
use ciphertrust_plugin::{DynamicDataSource, DynamicResource, ProviderService, Value};
use serde_json::json;
use terraform_provider_ciphertrust::CipherTrustProvider;
use terraform_provider_ciphertrust::data_sources::users_list::UsersListDataSource;
use terraform_provider_ciphertrust::resources::{
    cluster::ClusterResource, group::GroupResource, key::KeyResource,
    password_policy::PasswordPolicyResource, scheduler::SchedulerResource,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, method, path, query_param},
};

async fn mock_auth(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/tokens"))
        .and(body_partial_json(json!({"grant_type": "password", "username": "admin"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jwt": "jwt-1",
            "duration": 300,
            "token_type": "Bearer",
            "refresh_token": "refresh-1"
        })))
        .mount(server)
        .await;
}

fn client_for(server: &MockServer) -> CmClient {
    let config = ClientConfig::new(&server.uri())
        .with_auth("admin", "secret")
        .with_retries(2, 1);
    CmClient::new(config).unwrap()
}

// ============== Provider ==============

#[tokio::test]
async fn test_configure_authenticates() {
    let server = MockServer::start().await;
    mock_auth(&server).await;

    let config = Value::from_json(json!({
        "address": server.uri(),
        "username": "admin",
        "password": "secret"
    }));
    let client = CipherTrustProvider::new()
        .configure("1.9.0", &config)
        .await
        .unwrap();
    assert_eq!(client.config().username, "admin");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn test_configure_rejects_unknown_values() {
    let config = Value::Object(
        [
            ("address".to_string(), Value::Unknown),
            ("username".to_string(), Value::from("admin")),
        ]
        .into_iter()
        .collect(),
    );
    let err = CipherTrustProvider::new()
        .configure("1.9.0", &config)
        .await
        .unwrap_err();
    assert_eq!(err.summary, "Unknown provider configuration");
}

// ============== Resources ==============

#[tokio::test]
async fn test_scheduler_create_sends_operation_params() {
    let server = MockServer::start().await;
    mock_auth(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/scheduler/job-configs"))
        .and(body_partial_json(json!({
            "name": "weekly-rotation",
            "operation": "key_rotation",
            "run_on": "any",
            "job_config_params": {"query_filter": "state=Active"}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "job-1",
            "name": "weekly-rotation",
            "operation": "key_rotation",
            "run_at": "0 9 * * sat",
            "run_on": "any",
            "job_config_params": {"query_filter": "state=Active", "expire_in": "30d"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let plan = Value::from_json(json!({
        "name": "weekly-rotation",
        "operation": "key_rotation",
        "run_at": "0 9 * * sat",
        "key_rotation_params": {"query_filter": "state=Active", "expire_in": null}
    }));
    let state = SchedulerResource
        .create(&client_for(&server), &plan)
        .await
        .unwrap()
        .to_json();

    assert_eq!(state["id"], "job-1");
    assert_eq!(state["run_on"], "any");
    assert_eq!(
        state["key_rotation_params"],
        json!({"query_filter": "state=Active", "expire_in": null})
    );
    assert_eq!(state["database_backup_params"], json!(null));
}

#[tokio::test]
async fn test_scheduler_import_takes_echoed_params() {
    let server = MockServer::start().await;
    mock_auth(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/scheduler/job-configs/job-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "job-1",
            "name": "weekly-rotation",
            "operation": "key_rotation",
            "run_at": "0 9 * * sat",
            "run_on": "any",
            "job_config_params": {"query_filter": "state=Active", "expire_in": "30d"}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let seeded = SchedulerResource.import(&client, "job-1").await.unwrap();
    let state = SchedulerResource
        .read(&client, &seeded)
        .await
        .unwrap()
        .unwrap()
        .to_json();

    assert_eq!(state["operation"], "key_rotation");
    assert_eq!(state["key_rotation_params"]["expire_in"], "30d");
}

#[tokio::test]
async fn test_key_read_after_removal() {
    let server = MockServer::start().await;
    mock_auth(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/vault/keys2/k1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "code": 5,
            "codeDesc": "NCERRResourceNotFound"
        })))
        .mount(&server)
        .await;

    let state = Value::from_json(json!({"id": "k1", "name": "app-key"}));
    let read = KeyResource.read(&client_for(&server), &state).await.unwrap();
    assert_eq!(read, None);
}

#[tokio::test]
async fn test_password_policy_created_when_missing() {
    let server = MockServer::start().await;
    mock_auth(&server).await;

    Mock::given(method("PATCH"))
        .and(path("/api/v1/usermgmt/pwdpolicies/strict"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/usermgmt/pwdpolicies"))
        .and(body_partial_json(json!({
            "policy_name": "strict",
            "inclusive_min_digits": 2
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "policy_name": "strict",
            "inclusive_min_digits": 2,
            "inclusive_min_upper_case": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let plan = Value::from_json(json!({
        "policy_name": "strict",
        "inclusive_min_digits": 2
    }));
    let state = PasswordPolicyResource
        .create(&client_for(&server), &plan)
        .await
        .unwrap()
        .to_json();

    assert_eq!(state["id"], "strict");
    assert_eq!(state["inclusive_min_digits"], 2);
    assert_eq!(state["inclusive_min_upper_case"], 1);
}

#[tokio::test]
async fn test_group_create_adds_members() {
    let server = MockServer::start().await;
    mock_auth(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/usermgmt/groups"))
        .and(body_partial_json(json!({"name": "auditors"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "name": "auditors",
            "description": "read-only access"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/usermgmt/groups/auditors/users/local-u1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/usermgmt/users"))
        .and(query_param("groups", "auditors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 1,
            "resources": [{"user_id": "local-u1", "username": "alice"}]
        })))
        .mount(&server)
        .await;

    let plan = Value::from_json(json!({
        "name": "auditors",
        "description": "read-only access",
        "user_ids": ["local-u1"]
    }));
    let state = GroupResource
        .create(&client_for(&server), &plan)
        .await
        .unwrap()
        .to_json();

    assert_eq!(state["id"], "auditors");
    assert_eq!(state["user_ids"], json!(["local-u1"]));
}

#[tokio::test]
async fn test_cluster_join_spans_nodes() {
    let original = MockServer::start().await;
    let joining = MockServer::start().await;
    mock_auth(&original).await;
    mock_auth(&joining).await;

    let original_host = original.address().to_string();
    let joining_host = joining.address().to_string();

    Mock::given(method("POST"))
        .and(path("/api/v1/cluster/new"))
        .and(body_partial_json(json!({"localNodeHost": original_host})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&original)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/cluster/csr"))
        .and(body_partial_json(json!({"localNodeHost": joining_host})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"csr": "CSR-PEM"})))
        .expect(1)
        .mount(&joining)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/nodes"))
        .and(body_partial_json(json!({"csr": "CSR-PEM", "newNodeHost": joining_host})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cert": "CERT-PEM",
            "cachain": "CA-PEM",
            "mkek_blob": "MKEK"
        })))
        .expect(1)
        .mount(&original)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/cluster/join"))
        .and(body_partial_json(json!({
            "cert": "CERT-PEM",
            "mkek_blob": "MKEK",
            "memberNodeHost": original_host,
            "blocking": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&joining)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/nodes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 2,
            "resources": [
                {"id": "node-1", "host": original_host, "this_node": true},
                {"id": "node-2", "host": joining_host}
            ]
        })))
        .mount(&original)
        .await;

    let plan = Value::from_json(json!({
        "nodes": [
            {"host": original_host, "original": true},
            {"host": joining_host, "original": false}
        ]
    }));
    let state = ClusterResource
        .create(&client_for(&original), &plan)
        .await
        .unwrap()
        .to_json();

    assert_eq!(state["id"], original_host.as_str());
    assert_eq!(state["node_ids"][&original_host], "node-1");
    assert_eq!(state["node_ids"][&joining_host], "node-2");
    assert_eq!(state["nodes"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_cluster_update_replaces_dropped_node() {
    let original = MockServer::start().await;
    let kept = MockServer::start().await;
    let joining = MockServer::start().await;
    mock_auth(&original).await;
    mock_auth(&joining).await;

    let original_host = original.address().to_string();
    let kept_host = kept.address().to_string();
    let dropped_host = "10.0.0.3".to_string();
    let joining_host = joining.address().to_string();

    Mock::given(method("DELETE"))
        .and(path("/api/v1/nodes/node-3"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&original)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/cluster/csr"))
        .and(body_partial_json(json!({"localNodeHost": joining_host})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"csr": "CSR-PEM"})))
        .expect(1)
        .mount(&joining)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/nodes"))
        .and(body_partial_json(json!({"csr": "CSR-PEM", "newNodeHost": joining_host})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cert": "CERT-PEM",
            "cachain": "CA-PEM",
            "mkek_blob": "MKEK"
        })))
        .expect(1)
        .mount(&original)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/cluster/join"))
        .and(body_partial_json(json!({"memberNodeHost": original_host, "blocking": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&joining)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/nodes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 3,
            "resources": [
                {"id": "node-1", "host": original_host, "this_node": true},
                {"id": "node-2", "host": kept_host},
                {"id": "node-4", "host": joining_host}
            ]
        })))
        .mount(&original)
        .await;

    let prior = Value::from_json(json!({
        "id": original_host,
        "nodes": [
            {"host": original_host, "original": true},
            {"host": kept_host, "original": false},
            {"host": dropped_host, "original": false}
        ],
        "node_ids": {
            original_host.as_str(): "node-1",
            kept_host.as_str(): "node-2",
            dropped_host.as_str(): "node-3"
        }
    }));
    let plan = Value::from_json(json!({
        "id": original_host,
        "nodes": [
            {"host": original_host, "original": true},
            {"host": kept_host, "original": false},
            {"host": joining_host, "original": false}
        ]
    }));
    let state = ClusterResource
        .update(&client_for(&original), &prior, &plan)
        .await
        .unwrap()
        .to_json();

    assert_eq!(state["node_ids"][&joining_host], "node-4");
    assert_eq!(state["node_ids"].get(&dropped_host), None);
    assert_eq!(state["nodes"].as_array().unwrap().len(), 3);
    assert!(kept.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_cluster_update_rejects_new_original() {
    let server = MockServer::start().await;
    let prior = Value::from_json(json!({
        "id": "10.0.0.1",
        "nodes": [
            {"host": "10.0.0.1", "original": true},
            {"host": "10.0.0.2", "original": false}
        ]
    }));
    let plan = Value::from_json(json!({
        "nodes": [
            {"host": "10.0.0.1", "original": false},
            {"host": "10.0.0.2", "original": true}
        ]
    }));
    let err = ClusterResource
        .update(&client_for(&server), &prior, &plan)
        .await
        .unwrap_err();

    assert_eq!(err.summary, "Cannot change the original node");
    assert_eq!(err.attribute, Some(vec!["nodes".to_string()]));
    assert!(server.received_requests().await.unwrap().is_empty());
}

// ============== Data sources ==============

#[tokio::test]
async fn test_users_list_filters_by_group() {
    let server = MockServer::start().await;
    mock_auth(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/usermgmt/users"))
        .and(query_param("groups", "admin"))
        .and(query_param("limit", "1000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 2,
            "resources": [
                {"user_id": "local|1", "username": "admin"},
                {"user_id": "local|2", "username": "ops", "email": "ops@example.com"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = Value::from_json(json!({"group": "admin"}));
    let state = UsersListDataSource
        .read(&client_for(&server), &config)
        .await
        .unwrap()
        .to_json();

    let users = state["users"].as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[1]["email"], "ops@example.com");
    assert_eq!(users[0]["email"], json!(null));
    assert_eq!(state["group"], "admin");
}
