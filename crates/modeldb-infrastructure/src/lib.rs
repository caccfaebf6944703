//! Infrastructure layer for the ModelDB syncer.
//!
//! Concrete implementations of the interfaces declared in `modeldb-core`:
//! the framed TCP RPC client, an in-memory metadata store, and loading of
//! the syncer configuration file.

pub mod config_loader;
pub mod memory_store;
pub mod paths;
pub mod rpc;

pub use config_loader::ConfigLoader;
pub use memory_store::InMemoryMetadataStore;
pub use paths::SyncerPaths;
pub use rpc::FramedRpcClient;
