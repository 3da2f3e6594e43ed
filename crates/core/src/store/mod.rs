pub mod cluster;
pub mod edge;
pub mod fact;
mod graph;
pub mod memory;

pub use cluster::{ClusterDetail, NewCluster};
pub use edge::NewEdge;
pub use fact::NewFact;
pub use graph::{TraversalNode, TraversalResult};
pub use memory::NewMemory;

use sea_orm::DatabaseConnection;

/// Durable mapping of memories, facts, edges, cooccurrences, and clusters
/// (spec §4.3 / C1). All mutating operations are transactional; readers may
/// proceed concurrently since `DatabaseConnection` pools its own connections.
#[derive(Debug, Clone)]
pub struct Store {
  db: DatabaseConnection,
}

impl Store {
  #[must_use]
  pub const fn new(db: DatabaseConnection) -> Self {
    Self { db }
  }

  #[must_use]
  pub const fn connection(&self) -> &DatabaseConnection {
    &self.db
  }
}
