//! Adapters behind the domain ports: storage, clock, schema compiler,
//! dependency graph and the input directory.

pub mod audit;
pub mod clock;
pub mod dependency_graph;
pub mod file_set;
pub mod in_memory;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
pub mod xsd;
