use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::{
    dyn_client::{ApiError, DynClient, Response},
    error::{Error, Result},
};

const RECORD_TYPE: &str = "TXT";
const RECORD_TTL: &str = "60";

#[derive(Serialize)]
struct RecordData<'a> {
    txtdata: &'a str,
}

#[derive(Serialize)]
struct RecordRequest<'a> {
    ttl: &'a str,
    rdata: RecordData<'a>,
}

/// The API path of the challenge record, e.g.
/// `TXTRecord/example.com./_acme-challenge.example.com./`.
pub fn record_path(zone: &str, fqdn: &str) -> String {
    format!("{RECORD_TYPE}Record/{zone}/{fqdn}/")
}

/// Create the TXT record `fqdn` in `zone` holding `key`.
pub async fn create_txt_record(
    session: &DynClient,
    zone: &str,
    fqdn: &str,
    key: &str,
) -> Result<Response<Value>> {
    let path = record_path(zone, fqdn);
    debug!(%path, "creating record");
    let record = RecordRequest {
        ttl: RECORD_TTL,
        rdata: RecordData { txtdata: key },
    };
    let result = session.request(Method::POST, &path, Some(&record)).await;
    report("create", &path, result)
}

/// Delete the TXT record `fqdn` in `zone`.
pub async fn delete_txt_record(
    session: &DynClient,
    zone: &str,
    fqdn: &str,
) -> Result<Response<Value>> {
    let path = record_path(zone, fqdn);
    debug!(%path, "deleting record");
    let result = session.request::<(), _>(Method::DELETE, &path, None).await;
    report("delete", &path, result)
}

fn report(
    action: &'static str,
    path: &str,
    result: Result<Response<Value>, ApiError>,
) -> Result<Response<Value>> {
    match result {
        Ok(response) => {
            info!(path, status = %response.status, "{action} record succeeded: {:?}", response.data);
            Ok(response)
        }
        Err(err) => {
            error!(path, "{action} record failed: {err}");
            Err(Error::Record {
                action,
                path: path.to_string(),
                source: err,
            })
        }
    }
}
