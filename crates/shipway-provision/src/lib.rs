//! shipway-provision — resource-group provisioning for one stage.
//!
//! A stage is provisioned as an ordered list of resource-group steps
//! with declared dependencies:
//!
//! ```text
//! network → database → static-site → queue → secrets → app-service
//!         → queue-send-grant → workers → dns-route
//! ```
//!
//! The runner walks the list, checks each step's inputs are already
//! provisioned, calls the matching [`ResourceProvider`] method, and
//! accumulates outputs (identifiers, endpoints, secret refs) in a
//! [`ResourceRefs`] graph. Providers are opaque managed-service
//! backends; their failures abort the stage unmodified — rollback and
//! retry belong to the provisioning engine, not this layer.
//!
//! [`InMemoryProvider`] is a deterministic recording backend for tests
//! and dry runs.

pub mod env;
pub mod error;
pub mod plan;
pub mod provider;
pub mod refs;

pub use env::{app_env_map, merge};
pub use error::{ProvisionError, ProvisionResult};
pub use plan::{ResourceGroup, StageResources, run_steps, standard_steps};
pub use provider::{DatabaseSpec, InMemoryProvider, ResourceProvider, ServiceSpec};
pub use refs::{
    DatabaseRefs, NetworkRefs, QueueRefs, ResourceRefs, SecretBundle, ServiceRefs, StaticSiteRefs,
};
