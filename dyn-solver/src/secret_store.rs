use std::collections::BTreeMap;

use enum_dispatch::enum_dispatch;
use k8s_openapi::api::core::v1::Secret;
use kube::{Api, Client};
use tracing::debug;

use crate::{
    config::SecretKeySelector,
    error::{Error, Result},
};

#[enum_dispatch]
#[allow(async_fn_in_trait)]
pub trait SecretApi {
    /// Fetch the data of the secret `name` in `namespace`.
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<BTreeMap<String, Vec<u8>>>;
}

/// Where provider credentials are read from.
#[derive(Clone)]
#[enum_dispatch(SecretApi)]
pub enum SecretStore {
    Kube(KubeSecretStore),
    Memory(MemorySecretStore),
}

/// Reads secrets through the Kubernetes API.
#[derive(Clone)]
pub struct KubeSecretStore {
    client: Client,
}

impl KubeSecretStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn try_from_config(config: kube::Config) -> Result<Self> {
        let client = Client::try_from(config).map_err(Error::KubeClient)?;
        Ok(Self::new(client))
    }
}

impl SecretApi for KubeSecretStore {
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<BTreeMap<String, Vec<u8>>> {
        debug!(namespace, name, "reading secret");
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        let secret = api.get(name).await.map_err(|err| Error::SecretLookup {
            namespace: namespace.to_string(),
            name: name.to_string(),
            source: Box::new(err),
        })?;
        Ok(secret
            .data
            .unwrap_or_default()
            .into_iter()
            .map(|(key, value)| (key, value.0))
            .collect())
    }
}

/// Secrets held in process memory, keyed by `(namespace, name)`.
#[derive(Clone, Default)]
pub struct MemorySecretStore {
    secrets: BTreeMap<(String, String), BTreeMap<String, Vec<u8>>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<Vec<u8>>,
    ) {
        self.secrets
            .entry((namespace.into(), name.into()))
            .or_default()
            .insert(key.into(), value.into());
    }

    pub fn with_secret(
        mut self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<Vec<u8>>,
    ) -> Self {
        self.insert(namespace, name, key, value);
        self
    }
}

impl SecretApi for MemorySecretStore {
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<BTreeMap<String, Vec<u8>>> {
        self.secrets
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| Error::SecretLookup {
                namespace: namespace.to_string(),
                name: name.to_string(),
                source: format!("secrets \"{name}\" not found").into(),
            })
    }
}

/// Read one key of a secret as a UTF-8 string.
pub(crate) async fn resolve_secret_key(
    store: &SecretStore,
    namespace: &str,
    selector: &SecretKeySelector,
) -> Result<String> {
    let mut data = store.get_secret(namespace, &selector.name).await?;
    let value = data
        .remove(&selector.key)
        .ok_or_else(|| Error::SecretKeyNotFound {
            key: selector.key.clone(),
            name: selector.name.clone(),
            namespace: namespace.to_string(),
        })?;
    String::from_utf8(value).map_err(|_| Error::SecretKeyNotUtf8 {
        key: selector.key.clone(),
        name: selector.name.clone(),
        namespace: namespace.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selector(name: &str, key: &str) -> SecretKeySelector {
        SecretKeySelector {
            name: name.into(),
            key: key.into(),
        }
    }

    fn store() -> SecretStore {
        MemorySecretStore::new()
            .with_secret("cert-manager", "dyn-credentials", "password", "hunter2")
            .into()
    }

    #[tokio::test]
    async fn resolves_existing_key() {
        let password = resolve_secret_key(
            &store(),
            "cert-manager",
            &selector("dyn-credentials", "password"),
        )
        .await
        .unwrap();
        assert_eq!(password, "hunter2");
    }

    #[tokio::test]
    async fn missing_key_names_secret_and_namespace() {
        let err = resolve_secret_key(
            &store(),
            "cert-manager",
            &selector("dyn-credentials", "api-key"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::SecretKeyNotFound { .. }));
        assert_eq!(
            err.to_string(),
            "key \"api-key\" not found in secret \"dyn-credentials/cert-manager\""
        );
    }

    #[tokio::test]
    async fn non_utf8_value_is_rejected() {
        let store: SecretStore = MemorySecretStore::new()
            .with_secret("cert-manager", "dyn-credentials", "password", vec![0x68, 0xff, 0x32])
            .into();
        let err = resolve_secret_key(
            &store,
            "cert-manager",
            &selector("dyn-credentials", "password"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::SecretKeyNotUtf8 { ref key, .. } if key == "password"));
        assert_eq!(
            err.to_string(),
            "key \"password\" in secret \"dyn-credentials/cert-manager\" is not valid UTF-8"
        );
    }

    #[tokio::test]
    async fn missing_secret_is_a_lookup_error() {
        let err = resolve_secret_key(&store(), "default", &selector("dyn-credentials", "password"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SecretLookup { .. }));
        assert!(err.to_string().contains("default/dyn-credentials"));
    }
}
