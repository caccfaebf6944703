use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use modeldb_core::client::MetadataClient;
use modeldb_core::wire::{Project, ProjectEvent, ProjectEventResponse, UNASSIGNED_ID};
use modeldb_infrastructure::FramedRpcClient;
use modeldb_infrastructure::rpc::{RpcReply, RpcRequest};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::codec::{Framed, LengthDelimitedCodec};

/// Serves one connection, answering each request with `answer`.
async fn serve<F>(answer: F) -> (u16, JoinHandle<Vec<RpcRequest>>)
where
    F: Fn(&RpcRequest) -> RpcReply + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut framed = Framed::new(stream, LengthDelimitedCodec::new());
        let mut seen = Vec::new();
        while let Some(Ok(frame)) = framed.next().await {
            let request: RpcRequest = serde_json::from_slice(&frame).unwrap();
            let reply = answer(&request);
            seen.push(request);
            let bytes = serde_json::to_vec(&reply).unwrap();
            framed.send(Bytes::from(bytes)).await.unwrap();
        }
        seen
    });
    (port, handle)
}

fn project_event(name: &str) -> ProjectEvent {
    ProjectEvent {
        project: Project {
            id: UNASSIGNED_ID,
            name: name.to_string(),
            author: "tester".to_string(),
            description: String::new(),
        },
    }
}

#[tokio::test]
async fn sends_framed_requests_and_decodes_replies() {
    let (port, server) = serve(|request| {
        let response = ProjectEventResponse {
            project_id: 42,
            event_id: request.seqid,
        };
        RpcReply::ok(request.seqid, serde_json::to_value(response).unwrap())
    })
    .await;

    let client = FramedRpcClient::connect("127.0.0.1", port).await.unwrap();
    let first = client.store_project_event(project_event("a")).await.unwrap();
    let second = client.store_project_event(project_event("b")).await.unwrap();
    drop(client);

    assert_eq!(first.project_id, 42);
    assert_ne!(first.event_id, second.event_id);

    let requests = server.await.unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].method, "storeProjectEvent");
    assert_eq!(requests[1].payload["project"]["name"], "b");
}

#[tokio::test]
async fn server_error_becomes_transmission_error() {
    let (port, _server) = serve(|request| RpcReply::err(request.seqid, "disk full")).await;

    let client = FramedRpcClient::connect("127.0.0.1", port).await.unwrap();
    let err = client
        .store_project_event(project_event("a"))
        .await
        .unwrap_err();

    assert!(err.is_transmission());
    assert!(err.to_string().contains("disk full"));
}

#[tokio::test]
async fn mismatched_seqid_is_rejected() {
    let (port, _server) = serve(|request| {
        RpcReply::ok(request.seqid + 100, serde_json::json!({"projectId": 1, "eventId": 1}))
    })
    .await;

    let client = FramedRpcClient::connect("127.0.0.1", port).await.unwrap();
    let err = client
        .store_project_event(project_event("a"))
        .await
        .unwrap_err();
    assert!(err.is_transmission());
}

#[tokio::test]
async fn reply_to_an_abandoned_call_is_skipped() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut framed = Framed::new(stream, LengthDelimitedCodec::new());
        while let Some(Ok(frame)) = framed.next().await {
            let request: RpcRequest = serde_json::from_slice(&frame).unwrap();
            if request.seqid == 1 {
                tokio::time::sleep(Duration::from_millis(200)).await;
            }
            let response = ProjectEventResponse {
                project_id: request.seqid,
                event_id: request.seqid,
            };
            let reply = RpcReply::ok(request.seqid, serde_json::to_value(response).unwrap());
            let bytes = serde_json::to_vec(&reply).unwrap();
            framed.send(Bytes::from(bytes)).await.unwrap();
        }
    });

    let client = FramedRpcClient::connect("127.0.0.1", port).await.unwrap();
    let abandoned = tokio::time::timeout(
        Duration::from_millis(20),
        client.store_project_event(project_event("slow")),
    )
    .await;
    assert!(abandoned.is_err());

    let next = client.store_project_event(project_event("b")).await.unwrap();
    assert_eq!(next.project_id, 2);

    drop(client);
    server.await.unwrap();
}

#[tokio::test]
async fn refused_connection_is_a_connection_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let err = match FramedRpcClient::connect("127.0.0.1", port).await {
        Ok(_) => panic!("connect should fail with no listener"),
        Err(err) => err,
    };
    assert!(err.is_connection());
}
