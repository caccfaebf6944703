//! RPC transport to the metadata store.

pub mod envelope;
mod framed;

pub use envelope::{RpcReply, RpcRequest};
pub use framed::FramedRpcClient;
