#![allow(dead_code)]

use std::time::Duration;

use dyn_solver::{ApiSettings, ChallengeRequest, DynSolver, MemorySecretStore};
use serde_json::{json, Value};
use wiremock::{
    matchers::{body_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

pub const NAMESPACE: &str = "cert-manager";
pub const ZONE: &str = "example.com.";
pub const FQDN: &str = "_acme-challenge.example.com.";
pub const RECORD_PATH: &str = "/REST/TXTRecord/example.com./_acme-challenge.example.com./";
pub const ZONE_PATH: &str = "/REST/Zone/example.com/";
pub const SESSION_PATH: &str = "/REST/Session";
pub const TOKEN: &str = "session-token";

pub fn provider_config() -> Value {
    json!({
        "username": "acme",
        "passwordSecretRef": { "name": "dyn-credentials", "key": "password" },
        "customerName": "example-corp",
        "zonename": "example.com",
    })
}

pub fn challenge(config: Option<Value>) -> ChallengeRequest {
    ChallengeRequest {
        uid: "6e8c4c5e".into(),
        r#type: "dns-01".into(),
        dns_name: "example.com".into(),
        key: "challenge-token".into(),
        resource_namespace: NAMESPACE.into(),
        resolved_fqdn: FQDN.into(),
        resolved_zone: ZONE.into(),
        config,
        ..Default::default()
    }
}

pub fn secrets() -> MemorySecretStore {
    MemorySecretStore::new().with_secret(NAMESPACE, "dyn-credentials", "password", "hunter2")
}

pub fn solver(server: &MockServer, store: MemorySecretStore, settle_delay: Duration) -> DynSolver {
    DynSolver::builder()
        .api(ApiSettings {
            url: format!("{}/REST", server.uri()),
            timeout: Duration::from_secs(5),
        })
        .settle_delay(settle_delay)
        .secret_store(store.into())
        .build()
}

pub fn success(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "status": "success",
        "job_id": 1,
        "msgs": [],
        "data": data,
    }))
}

pub fn failure(code: u16, info: &str) -> ResponseTemplate {
    ResponseTemplate::new(code).set_body_json(json!({
        "status": "failure",
        "job_id": 2,
        "msgs": [{ "INFO": info, "SOURCE": "BLL", "ERR_CD": "INVALID_DATA", "LVL": "ERROR" }],
        "data": {},
    }))
}

/// Accept logins for the test account, `times` times.
pub async fn mount_login(server: &MockServer, times: u64) {
    Mock::given(method("POST"))
        .and(path(SESSION_PATH))
        .and(body_json(json!({
            "user_name": "acme",
            "password": "hunter2",
            "customer_name": "example-corp",
        })))
        .respond_with(success(json!({ "token": TOKEN, "version": "3.7.0" })))
        .expect(times)
        .mount(server)
        .await;
}

pub async fn mount_commit(server: &MockServer, times: u64) {
    Mock::given(method("PUT"))
        .and(path(ZONE_PATH))
        .and(header("Auth-Token", TOKEN))
        .respond_with(success(json!({ "zone": "example.com", "serial": 2 })))
        .expect(times)
        .mount(server)
        .await;
}
