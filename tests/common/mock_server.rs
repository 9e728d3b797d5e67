//! In-process VQA server speaking the length-prefixed JSON protocol

use bytes::{BufMut, Bytes, BytesMut};
use futures::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_util::codec::Framed;

use vqa_client::codec::MessageCodec;
use vqa_client::transport::FrameCodec;
use vqa_client::types::{Endpoint, VqaRequest, VqaResponse};

/// How the server reacts to each request.
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Reply with a fixed candidate list.
    Answer(String),
    /// Reply with `"<question>, <image length>"`.
    Echo,
    /// Reply with a frame that is not JSON.
    Garbage,
    /// Announce a 100-byte frame, send 10 bytes, then hang up.
    PartialFrame,
    /// Answer one request, then close the connection.
    AnswerOnce(String),
}

/// Test fixture that manages a mock server
pub struct MockServerFixture {
    pub endpoint: Endpoint,
    connections: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<VqaRequest>>>,
    handle: JoinHandle<()>,
}

impl MockServerFixture {
    pub async fn start(behavior: Behavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock server");
        let port = listener.local_addr().expect("local addr").port();
        let connections = Arc::new(AtomicUsize::new(0));
        let requests = Arc::new(Mutex::new(Vec::new()));

        let handle = {
            let connections = connections.clone();
            let requests = requests.clone();
            tokio::spawn(async move {
                while let Ok((stream, _)) = listener.accept().await {
                    connections.fetch_add(1, Ordering::SeqCst);
                    tokio::spawn(serve(stream, behavior.clone(), requests.clone()));
                }
            })
        };

        Self {
            endpoint: Endpoint::new("127.0.0.1", port),
            connections,
            requests,
            handle,
        }
    }

    /// Number of TCP connections accepted so far.
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<VqaRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for MockServerFixture {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// An endpoint nobody listens on.
pub async fn unused_endpoint() -> Endpoint {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    Endpoint::new("127.0.0.1", port)
}

async fn serve(stream: TcpStream, behavior: Behavior, requests: Arc<Mutex<Vec<VqaRequest>>>) {
    let mut framed = Framed::new(stream, FrameCodec::new());
    while let Some(Ok(frame)) = framed.next().await {
        let request = match MessageCodec::decode_request(&frame) {
            Ok(request) => request,
            Err(_) => return,
        };
        requests.lock().unwrap().push(request.clone());

        let reply = match &behavior {
            Behavior::Answer(result) | Behavior::AnswerOnce(result) => {
                MessageCodec::encode_response(&VqaResponse::new(result.clone()))
            }
            Behavior::Echo => MessageCodec::encode_response(&VqaResponse::new(format!(
                "{}, {}",
                request.question,
                request.image.len()
            ))),
            Behavior::Garbage => Bytes::from_static(b"<html>502</html>"),
            Behavior::PartialFrame => {
                let mut raw = BytesMut::new();
                raw.put_u32(100);
                raw.put_slice(&[b'{'; 10]);
                let mut stream = framed.into_inner();
                let _ = stream.write_all(&raw).await;
                let _ = stream.shutdown().await;
                return;
            }
        };
        if framed.send(reply).await.is_err() {
            return;
        }
        if matches!(behavior, Behavior::AnswerOnce(_)) {
            return;
        }
    }
}
