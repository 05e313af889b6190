use tracing::{error, info};

use crate::{
    config::ProviderConfig,
    dyn_client::{ApiSettings, DynClient},
    error::{Error, Result},
    secret_store::{resolve_secret_key, SecretStore},
};

/// Open an authenticated session for `cfg`.
///
/// The config is validated before anything else, so a bad config never
/// reaches the secret store or the provider. The password is only held for
/// the duration of the login call.
pub async fn open_session(
    store: &SecretStore,
    api: &ApiSettings,
    cfg: &ProviderConfig,
    namespace: &str,
) -> Result<DynClient> {
    match connect(store, api, cfg, namespace).await {
        Ok(client) => {
            info!(customer = %cfg.customer_name, "successfully created dyn session");
            Ok(client)
        }
        Err(err) => {
            error!(
                namespace = %namespace,
                secret = %cfg.password_secret_ref.name,
                zone = %cfg.zone_name,
                customer = %cfg.customer_name,
                username = %cfg.username,
                "error creating dyn client: {err}"
            );
            Err(err)
        }
    }
}

async fn connect(
    store: &SecretStore,
    api: &ApiSettings,
    cfg: &ProviderConfig,
    namespace: &str,
) -> Result<DynClient> {
    cfg.validate()?;
    let password = resolve_secret_key(store, namespace, &cfg.password_secret_ref).await?;
    let mut client = DynClient::new(api, &cfg.customer_name).map_err(Error::ClientSetup)?;
    client
        .login(&cfg.username, &password)
        .await
        .map_err(Error::Authentication)?;
    Ok(client)
}
