//! Challenge payloads exchanged with cert-manager (`acme.cert-manager.io/v1alpha1`).
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const API_VERSION: &str = "acme.cert-manager.io/v1alpha1";
pub const KIND: &str = "ChallengePayload";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum ChallengeAction {
    #[default]
    Present,
    CleanUp,
}

/// A request to present or clean up one DNS-01 challenge record.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChallengeRequest {
    pub uid: String,
    pub action: ChallengeAction,
    pub r#type: String,
    pub dns_name: String,
    pub key: String,
    pub resource_namespace: String,
    #[serde(rename = "resolvedFQDN")]
    pub resolved_fqdn: String,
    pub resolved_zone: String,
    pub allow_ambient_credentials: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ResultStatus {
    pub status: String,
    pub message: String,
    pub reason: String,
    pub code: u16,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ChallengeResponse {
    pub uid: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ResultStatus>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChallengePayload {
    pub api_version: String,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<ChallengeRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<ChallengeResponse>,
}

impl ChallengePayload {
    /// Build the reply to `request` from the outcome of solving it.
    pub fn reply<E: std::fmt::Display>(
        request: &ChallengeRequest,
        result: Result<(), E>,
    ) -> Self {
        let response = match result {
            Ok(()) => ChallengeResponse {
                uid: request.uid.clone(),
                success: true,
                status: None,
            },
            Err(err) => ChallengeResponse {
                uid: request.uid.clone(),
                success: false,
                status: Some(ResultStatus {
                    status: "Failure".into(),
                    message: err.to_string(),
                    reason: "InternalError".into(),
                    code: 500,
                }),
            },
        };
        Self {
            api_version: API_VERSION.into(),
            kind: KIND.into(),
            request: None,
            response: Some(response),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_cert_manager_request() {
        let payload: ChallengePayload = serde_json::from_value(json!({
            "apiVersion": API_VERSION,
            "kind": KIND,
            "request": {
                "uid": "1b9a",
                "action": "CleanUp",
                "type": "dns-01",
                "dnsName": "example.com",
                "key": "token",
                "resourceNamespace": "cert-manager",
                "resolvedFQDN": "_acme-challenge.example.com.",
                "resolvedZone": "example.com.",
                "allowAmbientCredentials": false,
                "config": { "username": "acme" }
            }
        }))
        .unwrap();
        let request = payload.request.unwrap();
        assert_eq!(request.action, ChallengeAction::CleanUp);
        assert_eq!(request.resolved_fqdn, "_acme-challenge.example.com.");
        assert_eq!(request.resolved_zone, "example.com.");
        assert_eq!(request.resource_namespace, "cert-manager");
        assert_eq!(request.config, Some(json!({ "username": "acme" })));
    }

    #[test]
    fn failed_reply_carries_message() {
        let request = ChallengeRequest {
            uid: "1b9a".into(),
            ..Default::default()
        };
        let reply = ChallengePayload::reply(&request, Err("no dyndns username provided"));
        let value = serde_json::to_value(&reply).unwrap();
        assert_eq!(value["kind"], KIND);
        assert_eq!(value["response"]["uid"], "1b9a");
        assert_eq!(value["response"]["success"], false);
        assert_eq!(
            value["response"]["status"]["message"],
            "no dyndns username provided"
        );
        assert!(value.get("request").is_none());
    }
}
