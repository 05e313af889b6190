use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Reference to one key of a secret in the challenge's namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SecretKeySelector {
    pub name: String,
    pub key: String,
}

/// Per-issuer solver configuration, decoded from the `config` field of a
/// challenge request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub username: String,
    #[serde(rename = "passwordSecretRef")]
    pub password_secret_ref: SecretKeySelector,
    #[serde(rename = "customerName")]
    pub customer_name: String,
    #[serde(rename = "zonename")]
    pub zone_name: String,
}

impl ProviderConfig {
    /// Check that every field needed to open a session is set.
    ///
    /// Fields are checked in a fixed order and the first missing one is
    /// reported.
    pub fn validate(&self) -> Result<()> {
        if self.username.is_empty() {
            return Err(Error::MissingField("username"));
        }
        if self.customer_name.is_empty() {
            return Err(Error::MissingField("customerName"));
        }
        if self.zone_name.is_empty() {
            return Err(Error::MissingField("zoneName"));
        }
        if self.password_secret_ref.name.is_empty() {
            return Err(Error::MissingField("password secret reference"));
        }
        Ok(())
    }
}

/// Decode the opaque solver config.
///
/// An absent (or `null`) config yields an empty `ProviderConfig`; it is up to
/// the caller to `validate` it before use.
pub fn load_config(raw: Option<&Value>) -> Result<ProviderConfig> {
    let Some(raw) = raw.filter(|raw| !raw.is_null()) else {
        return Ok(ProviderConfig::default());
    };
    ProviderConfig::deserialize(raw).map_err(Error::DecodeConfig)
}
