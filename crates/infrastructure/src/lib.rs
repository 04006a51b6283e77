//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod synapse_admin_client;

pub use synapse_admin_client::{SynapseAdminClient, USER_AGENT};
