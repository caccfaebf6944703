//! Framed TCP client.
//!
//! Each request and reply is one frame: a 4-byte big-endian length
//! followed by a JSON envelope. One request is in flight at a time.
//!
//! Replies are matched to requests by seqid. A call dropped after its
//! request was sent leaves its reply queued; the next call discards it.
//! A call dropped while its request is only partly written corrupts the
//! stream, and the client must be reconnected.

use super::envelope::{RpcReply, RpcRequest, method};
use async_trait::async_trait;
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use modeldb_core::client::MetadataClient;
use modeldb_core::error::{ModelDbError, Result};
use modeldb_core::wire::*;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicI32, Ordering};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_util::codec::{Framed, LengthDelimitedCodec};

/// RPC client over a single framed TCP connection.
pub struct FramedRpcClient {
    address: String,
    transport: Mutex<Framed<TcpStream, LengthDelimitedCodec>>,
    next_seqid: AtomicI32,
}

impl FramedRpcClient {
    /// Opens the connection. Failure here is fatal for the session being
    /// built; there is no retry.
    pub async fn connect(host: &str, port: u16) -> Result<Self> {
        let address = format!("{host}:{port}");
        let stream = TcpStream::connect(&address).await.map_err(|e| {
            ModelDbError::connection(format!("failed to connect to {address}: {e}"))
        })?;
        stream.set_nodelay(true)?;

        tracing::info!("[FramedRpcClient] connected to {}", address);

        Ok(Self {
            address,
            transport: Mutex::new(Framed::new(stream, LengthDelimitedCodec::new())),
            next_seqid: AtomicI32::new(1),
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    async fn call<Req, Resp>(&self, method: &'static str, payload: &Req) -> Result<Resp>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let seqid = self.next_seqid.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest {
            method: method.to_string(),
            seqid,
            payload: serde_json::to_value(payload)?,
        };
        let bytes = Bytes::from(serde_json::to_vec(&request)?);

        let reply = {
            let mut transport = self.transport.lock().await;
            transport
                .send(bytes)
                .await
                .map_err(|e| ModelDbError::transmission(method, e))?;
            loop {
                let frame = transport
                    .next()
                    .await
                    .ok_or_else(|| ModelDbError::transmission(method, "connection closed by peer"))?
                    .map_err(|e| ModelDbError::transmission(method, e))?;
                let reply: RpcReply = serde_json::from_slice(&frame)?;
                if reply.seqid < seqid {
                    // Reply to an earlier call that was dropped before reading it.
                    tracing::debug!(
                        "[FramedRpcClient] discarding stale reply seqid {} while awaiting {}",
                        reply.seqid,
                        seqid
                    );
                    continue;
                }
                if reply.seqid != seqid {
                    return Err(ModelDbError::transmission(
                        method,
                        format!("reply seqid {} does not match request {}", reply.seqid, seqid),
                    ));
                }
                break reply;
            }
        };

        if let Some(error) = reply.error {
            return Err(ModelDbError::transmission(method, error));
        }
        let result = reply
            .result
            .ok_or_else(|| ModelDbError::transmission(method, "reply carried no result"))?;

        tracing::debug!("[FramedRpcClient] {} (seqid {}) ok", method, seqid);
        Ok(serde_json::from_value(result)?)
    }
}

#[async_trait]
impl MetadataClient for FramedRpcClient {
    async fn store_project_event(&self, event: ProjectEvent) -> Result<ProjectEventResponse> {
        self.call(method::STORE_PROJECT_EVENT, &event).await
    }

    async fn store_experiment_event(
        &self,
        event: ExperimentEvent,
    ) -> Result<ExperimentEventResponse> {
        self.call(method::STORE_EXPERIMENT_EVENT, &event).await
    }

    async fn store_experiment_run_event(
        &self,
        event: ExperimentRunEvent,
    ) -> Result<ExperimentRunEventResponse> {
        self.call(method::STORE_EXPERIMENT_RUN_EVENT, &event).await
    }

    async fn store_fit_event(&self, event: FitEvent) -> Result<FitEventResponse> {
        self.call(method::STORE_FIT_EVENT, &event).await
    }

    async fn store_transform_event(
        &self,
        event: TransformEvent,
    ) -> Result<TransformEventResponse> {
        self.call(method::STORE_TRANSFORM_EVENT, &event).await
    }

    async fn store_metric_event(&self, event: MetricEvent) -> Result<MetricEventResponse> {
        self.call(method::STORE_METRIC_EVENT, &event).await
    }

    async fn store_random_split_event(
        &self,
        event: RandomSplitEvent,
    ) -> Result<RandomSplitEventResponse> {
        self.call(method::STORE_RANDOM_SPLIT_EVENT, &event).await
    }

    async fn store_pipeline_event(&self, event: PipelineEvent) -> Result<PipelineEventResponse> {
        self.call(method::STORE_PIPELINE_EVENT, &event).await
    }

    async fn store_grid_search_cv_event(
        &self,
        event: GridSearchCrossValidationEvent,
    ) -> Result<GridSearchCrossValidationEventResponse> {
        self.call(method::STORE_GRID_SEARCH_CV_EVENT, &event).await
    }
}
