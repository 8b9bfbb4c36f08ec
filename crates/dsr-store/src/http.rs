use async_trait::async_trait;
use dsr_types::{DatastreamLocator, ObjectLocator};
use tracing::{debug, warn};

use crate::config::RepositoryConfig;
use crate::error::{StoreError, StoreResult};
use crate::traits::{HeadResponse, HeadSource, ObjectRemover};

/// Repository client speaking plain HTTP through a blocking `ureq` agent.
///
/// Requests run on tokio's blocking pool so the async capability traits can
/// be served without stalling the executor.
#[derive(Clone)]
pub struct HttpRepository {
    agent: ureq::Agent,
    config: RepositoryConfig,
}

impl HttpRepository {
    pub fn new(config: RepositoryConfig) -> StoreResult<Self> {
        config.validate()?;
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(config.connect_timeout())
            .timeout_read(config.request_timeout())
            .timeout_write(config.request_timeout())
            .user_agent(&config.user_agent)
            .build();
        Ok(Self { agent, config })
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    async fn run<T, F>(&self, uri: String, op: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(ureq::Agent, &str) -> StoreResult<T> + Send + 'static,
    {
        let agent = self.agent.clone();
        let label = uri.clone();
        tokio::task::spawn_blocking(move || op(agent, &uri))
            .await
            .map_err(|e| StoreError::unreachable(label, format!("request task failed: {e}")))?
    }
}

impl std::fmt::Debug for HttpRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRepository")
            .field("root", &self.config.root())
            .finish()
    }
}

fn content_length(resp: &ureq::Response) -> Option<u64> {
    resp.header("Content-Length")
        .and_then(|v| v.trim().parse::<u64>().ok())
}

fn transport_error(uri: &str, err: ureq::Transport) -> StoreError {
    warn!(uri, kind = ?err.kind(), "repository transport failure");
    StoreError::unreachable(uri, err)
}

fn blocking_head(agent: ureq::Agent, uri: &str) -> StoreResult<HeadResponse> {
    match agent.head(uri).call() {
        Ok(resp) => Ok(HeadResponse::new(resp.status(), content_length(&resp))),
        Err(ureq::Error::Status(code, resp)) => Ok(HeadResponse::new(code, content_length(&resp))),
        Err(ureq::Error::Transport(err)) => Err(transport_error(uri, err)),
    }
}

fn blocking_delete(agent: ureq::Agent, uri: &str) -> StoreResult<bool> {
    match agent.delete(uri).call() {
        Ok(_) => Ok(true),
        Err(ureq::Error::Status(404 | 410, _)) => Ok(false),
        Err(ureq::Error::Status(code, _)) => Err(StoreError::from_status(uri, code)),
        Err(ureq::Error::Transport(err)) => Err(transport_error(uri, err)),
    }
}

#[async_trait]
impl HeadSource for HttpRepository {
    async fn head(&self, locator: &DatastreamLocator) -> StoreResult<HeadResponse> {
        let uri = locator.uri();
        let resp = self.run(uri.clone(), blocking_head).await?;
        debug!(%uri, status = resp.status, content_length = ?resp.content_length, "HEAD");
        Ok(resp)
    }
}

#[async_trait]
impl ObjectRemover for HttpRepository {
    async fn delete(&self, locator: &ObjectLocator) -> StoreResult<bool> {
        let uri = locator.uri();
        let existed = self.run(uri.clone(), blocking_delete).await?;
        debug!(%uri, existed, "DELETE");
        Ok(existed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsr_types::DatastreamId;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;

    /// Serve one canned response on an ephemeral port and return its base URL.
    fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut line = String::new();
            while reader.read_line(&mut line).unwrap() > 0 {
                if line == "\r\n" {
                    break;
                }
                line.clear();
            }
            stream.write_all(response.as_bytes()).unwrap();
        });
        format!("http://{addr}")
    }

    fn repo(base_url: String) -> HttpRepository {
        HttpRepository::new(RepositoryConfig {
            base_url,
            request_timeout_ms: 2_000,
            connect_timeout_ms: 2_000,
            ..Default::default()
        })
        .unwrap()
    }

    fn locator(repo: &HttpRepository) -> DatastreamLocator {
        repo.config()
            .object_locator("1234")
            .unwrap()
            .datastream(DatastreamId::new("abcd").unwrap())
    }

    #[tokio::test]
    async fn head_reads_content_length() {
        let repo = repo(serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 9999\r\nConnection: close\r\n\r\n",
        ));
        let size = repo.head_size(&locator(&repo)).await.unwrap();
        assert_eq!(size, Some(9999));
    }

    #[tokio::test]
    async fn head_not_found_is_none() {
        let repo = repo(serve_once(
            "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        ));
        assert_eq!(repo.head_size(&locator(&repo)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn head_server_error_is_unreachable() {
        let repo = repo(serve_once(
            "HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        ));
        let err = repo.head_size(&locator(&repo)).await.unwrap_err();
        assert!(err.is_unreachable());
    }

    #[tokio::test]
    async fn head_forbidden_is_unexpected_status() {
        let repo = repo(serve_once(
            "HTTP/1.1 403 Forbidden\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        ));
        let err = repo.head_size(&locator(&repo)).await.unwrap_err();
        assert!(!err.is_unreachable());
        assert!(matches!(err, StoreError::UnexpectedStatus { status: 403, .. }));
    }

    #[tokio::test]
    async fn delete_unauthorized_is_unexpected_status() {
        let repo = repo(serve_once(
            "HTTP/1.1 401 Unauthorized\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        ));
        let obj = repo.config().object_locator("1234").unwrap();
        let err = repo.delete(&obj).await.unwrap_err();
        assert_eq!(err.unexpected_status(), Some(401));
    }

    #[tokio::test]
    async fn refused_connection_is_unreachable() {
        let addr = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
        let repo = repo(format!("http://{addr}"));
        let err = repo.head(&locator(&repo)).await.unwrap_err();
        assert!(err.is_unreachable(), "got {err}");
    }

    #[tokio::test]
    async fn delete_reports_existence() {
        let repo = repo(serve_once(
            "HTTP/1.1 204 No Content\r\nConnection: close\r\n\r\n",
        ));
        let obj = repo.config().object_locator("1234").unwrap();
        assert!(repo.delete(&obj).await.unwrap());

        let repo = self::repo(serve_once(
            "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        ));
        let obj = repo.config().object_locator("1234").unwrap();
        assert!(!repo.delete(&obj).await.unwrap());
    }

    #[test]
    fn invalid_config_rejected() {
        let err = HttpRepository::new(RepositoryConfig {
            base_url: "localhost".into(),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }
}
