pub mod cluster;
pub mod fact;
pub mod fact_cooccurrence;
pub mod fact_edge;
pub mod memory;

pub use cluster::Entity as ClusterEntity;
pub use fact::Entity as FactEntity;
pub use fact_cooccurrence::Entity as FactCooccurrenceEntity;
pub use fact_edge::Entity as FactEdgeEntity;
pub use memory::Entity as MemoryEntity;
