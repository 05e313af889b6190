use chrono::{DateTime, Local, SecondsFormat, TimeZone};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};

use crate::{
    config::ProviderConfig,
    dyn_client::{ApiSettings, Response},
    error::{Error, Result},
    secret_store::SecretStore,
    session::open_session,
};

const CLIENT_NAME: &str = "external-dns-client";
const CLIENT_VERSION: &str = "external-dns-client-version";
pub const UNKNOWN_HOST: &str = "unknown-host";

#[derive(Debug, Serialize)]
struct ZonePublishRequest<'a> {
    publish: bool,
    notes: &'a str,
}

/// The name of this host, or [`UNKNOWN_HOST`] when it cannot be read.
pub fn local_hostname() -> String {
    nix::unistd::gethostname()
        .ok()
        .and_then(|name| name.into_string().ok())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| UNKNOWN_HOST.to_string())
}

/// Provenance notes attached to a zone publish.
pub fn publish_notes<Tz: TimeZone>(now: &DateTime<Tz>, hostname: &str) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "Change by external-dns@{CLIENT_NAME}, DynAPI@{CLIENT_VERSION}, {} on {hostname}",
        now.to_rfc3339_opts(SecondsFormat::Secs, true),
    )
}

/// Publish all pending changes of the configured zone.
///
/// Opens its own session rather than reusing the one the record was changed
/// with.
pub async fn commit(
    store: &SecretStore,
    api: &ApiSettings,
    cfg: &ProviderConfig,
    namespace: &str,
) -> Result<Response<Value>> {
    let zone = &cfg.zone_name;
    info!(zone = %zone, "committing changes");
    let notes = publish_notes(&Local::now(), &local_hostname());
    let request = ZonePublishRequest {
        publish: true,
        notes: &notes,
    };
    let path = format!("Zone/{zone}/");

    let session = open_session(store, api, cfg, namespace).await?;
    match session.request(Method::PUT, &path, Some(&request)).await {
        Ok(response) => {
            info!(zone = %zone, status = %response.status, "committed zone: {:?}", response.data);
            Ok(response)
        }
        Err(err) => {
            error!(zone = %zone, ?request, "error committing changes to zone: {err}");
            Err(Error::Commit {
                zone: zone.clone(),
                source: err,
            })
        }
    }
}
