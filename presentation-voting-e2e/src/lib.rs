//! Runs the voting server on an ephemeral port and talks to it over plain TCP.

use std::net::SocketAddr;

use bytes::Bytes;
use http_body_util::{BodyExt as _, Full};
use hyper::header::{AUTHORIZATION, CONTENT_TYPE, HOST};
use hyper::{Method, Request, StatusCode};
use hyper_util::rt::TokioIo;
use presentation_voting_backend::{serve, VotingState};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::warn;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

pub struct TestServer {
    address: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<std::result::Result<(), String>>,
}

impl TestServer {
    pub async fn start(state: VotingState) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let address = listener.local_addr()?;
        let (shutdown, stopped) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            serve(listener, state, async move {
                let _ = stopped.await;
            })
            .await
            .map_err(|err| err.to_string())
        });
        Ok(Self {
            address,
            shutdown: Some(shutdown),
            task,
        })
    }

    /// Sends one request on a fresh connection and decodes the JSON answer.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        bearer: Option<&str>,
        body: Option<&Value>,
    ) -> Result<(StatusCode, Value)> {
        let stream = TcpStream::connect(self.address).await?;
        let (mut sender, connection) =
            hyper::client::conn::http1::handshake(TokioIo::new(stream)).await?;
        tokio::spawn(async move {
            if let Err(err) = connection.await {
                warn!("client connection failed: {err}");
            }
        });

        let mut builder = Request::builder()
            .method(method)
            .uri(path)
            .header(HOST, self.address.to_string())
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = bearer {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = body.map_or_else(Bytes::new, |value| Bytes::from(value.to_string()));
        let response = sender.send_request(builder.body(Full::new(body))?).await?;

        let status = response.status();
        let bytes = response.into_body().collect().await?.to_bytes();
        Ok((status, serde_json::from_slice(&bytes)?))
    }

    pub async fn get(&self, path: &str) -> Result<(StatusCode, Value)> {
        self.request(Method::GET, path, None, None).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<(StatusCode, Value)> {
        self.request(Method::POST, path, None, Some(body)).await
    }

    pub async fn admin_get(&self, path: &str, password: &str) -> Result<(StatusCode, Value)> {
        self.request(Method::GET, path, Some(password), None).await
    }

    pub async fn admin_post(
        &self,
        path: &str,
        password: &str,
        body: &Value,
    ) -> Result<(StatusCode, Value)> {
        self.request(Method::POST, path, Some(password), Some(body))
            .await
    }

    /// Triggers a graceful shutdown and waits for the accept loop to return.
    pub async fn stop(mut self) -> Result<()> {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        self.task.await??;
        Ok(())
    }
}
