use std::time::Duration;

use enum_dispatch::enum_dispatch;
use tokio::{sync::watch, time::sleep};
use tracing::{debug, info};

use crate::{
    challenge::ChallengeRequest,
    config::load_config,
    dyn_client::ApiSettings,
    error::{Error, Result},
    record::{create_txt_record, delete_txt_record},
    secret_store::{KubeSecretStore, SecretStore},
    session::open_session,
    zone::commit,
};

/// Time given to the provider to propagate a published zone.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(1300);

/// A DNS-01 challenge solver served by the webhook.
#[enum_dispatch]
#[allow(async_fn_in_trait)]
pub trait Solver {
    /// The name issuers use to route challenges to this solver.
    fn name(&self) -> &str;

    /// Called once before any challenge is handled.
    async fn initialize(
        &mut self,
        kube_config: kube::Config,
        stop: watch::Receiver<bool>,
    ) -> Result<()>;

    /// Create the challenge record.
    async fn present(&self, challenge: &ChallengeRequest) -> Result<()>;

    /// Delete the challenge record.
    async fn clean_up(&self, challenge: &ChallengeRequest) -> Result<()>;
}

#[enum_dispatch(Solver)]
pub enum Dns01Solver {
    Dyn(DynSolver),
}

/// Solves challenges with TXT records on Dyn managed DNS.
///
/// The solver keeps no per-challenge state; the secret store is the only
/// thing shared between concurrent calls.
#[derive(Clone, bon::Builder)]
pub struct DynSolver {
    #[builder(default)]
    api: ApiSettings,
    #[builder(default = DEFAULT_SETTLE_DELAY)]
    settle_delay: Duration,
    secret_store: Option<SecretStore>,
}

impl Default for DynSolver {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl DynSolver {
    pub const NAME: &'static str = "dyndns";

    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    fn secret_store(&self) -> Result<&SecretStore> {
        self.secret_store.as_ref().ok_or(Error::NotInitialized)
    }

    async fn settle(&self) {
        debug!("sleeping for {:?}", self.settle_delay);
        sleep(self.settle_delay).await;
    }
}

impl Solver for DynSolver {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn initialize(
        &mut self,
        kube_config: kube::Config,
        _stop: watch::Receiver<bool>,
    ) -> Result<()> {
        let store = KubeSecretStore::try_from_config(kube_config)?;
        self.secret_store = Some(store.into());
        Ok(())
    }

    async fn present(&self, challenge: &ChallengeRequest) -> Result<()> {
        let cfg = load_config(challenge.config.as_ref())?;
        info!(
            dns_name = %challenge.dns_name,
            fqdn = %challenge.resolved_fqdn,
            "creating a new dyndns record"
        );
        let store = self.secret_store()?;
        let namespace = &challenge.resource_namespace;

        let session = open_session(store, &self.api, &cfg, namespace).await?;
        create_txt_record(
            &session,
            &challenge.resolved_zone,
            &challenge.resolved_fqdn,
            &challenge.key,
        )
        .await?;
        drop(session);

        commit(store, &self.api, &cfg, namespace).await?;
        self.settle().await;
        Ok(())
    }

    async fn clean_up(&self, challenge: &ChallengeRequest) -> Result<()> {
        let cfg = load_config(challenge.config.as_ref())?;
        info!(fqdn = %challenge.resolved_fqdn, "deleting a dyndns record");
        let store = self.secret_store()?;
        let namespace = &challenge.resource_namespace;

        let session = open_session(store, &self.api, &cfg, namespace).await?;
        delete_txt_record(&session, &challenge.resolved_zone, &challenge.resolved_fqdn).await?;
        drop(session);

        commit(store, &self.api, &cfg, namespace).await?;
        self.settle().await;
        Ok(())
    }
}
