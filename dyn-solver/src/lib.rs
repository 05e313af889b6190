//! An ACME DNS-01 challenge solver for Dyn managed DNS.
//!
//! cert-manager hands the solver a [`ChallengeRequest`]; the solver opens a
//! session with the Dyn API using a password read from a Kubernetes secret,
//! creates or deletes the `TXT` record for the challenge, publishes the zone
//! and waits a short settle delay before returning.
//!
//! ```rust,no_run
//! use dyn_solver::{ChallengeRequest, DynSolver, MemorySecretStore, Solver};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), dyn_solver::Error> {
//!     let store = MemorySecretStore::new().with_secret(
//!         "cert-manager",
//!         "dyn-credentials",
//!         "password",
//!         "secret",
//!     );
//!     let solver = DynSolver::builder().secret_store(store.into()).build();
//!
//!     let challenge = ChallengeRequest {
//!         key: "challenge-token".into(),
//!         resource_namespace: "cert-manager".into(),
//!         resolved_fqdn: "_acme-challenge.example.com.".into(),
//!         resolved_zone: "example.com.".into(),
//!         config: Some(json!({
//!             "username": "acme",
//!             "customerName": "example-corp",
//!             "zonename": "example.com",
//!             "passwordSecretRef": { "name": "dyn-credentials", "key": "password" }
//!         })),
//!         ..Default::default()
//!     };
//!     solver.present(&challenge).await?;
//!     solver.clean_up(&challenge).await?;
//!     Ok(())
//! }
//! ```
pub use challenge::{ChallengeAction, ChallengePayload, ChallengeRequest, ChallengeResponse};
pub use config::{load_config, ProviderConfig, SecretKeySelector};
pub use dyn_client::{ApiError, ApiSettings, DynClient, DYN_API_URL};
pub use error::{Error, Result};
pub use secret_store::{KubeSecretStore, MemorySecretStore, SecretApi, SecretStore};
pub use solver::{Dns01Solver, DynSolver, Solver, DEFAULT_SETTLE_DELAY};

pub mod challenge;
pub mod config;
pub mod dyn_client;
pub mod record;
pub mod secret_store;
pub mod session;
pub mod solver;
pub mod webhook;
pub mod zone;

mod error;
