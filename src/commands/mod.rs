//! Command handlers
//!
//! Every multi-repository command first checks that it runs from the
//! super-repository root, handles the base repository on its own and then
//! fans out over the sub-repositories.

pub mod checkout;
pub mod clean;
pub mod fetch;
pub mod init;
pub mod pull;
pub mod remove_branch;
pub mod show_branch;
pub mod status;
pub mod version;

use std::sync::Arc;

use crate::core::{RunContext, Topology, TopologyError};
use crate::git::RepositoryHandle;

/// The root repository and its declared sub-repositories
pub(crate) struct Workspace {
    pub topology: Topology,
    pub base: Arc<RepositoryHandle>,
}

impl Workspace {
    /// Fails unless the working directory is the super-repository root
    pub async fn open(ctx: &RunContext) -> Result<Self, TopologyError> {
        let topology = ctx.topology();
        topology.require_base().await?;
        let base = topology.base_repository().await?;
        Ok(Self { topology, base })
    }

    pub async fn sub_repositories(&self) -> Result<Vec<Arc<RepositoryHandle>>, TopologyError> {
        self.topology.discover_sub_repositories().await
    }
}
