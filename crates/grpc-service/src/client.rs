//! gRPC client connection with retries

use std::path::Path;
use std::time::Duration;
use tonic::transport::{Certificate, Channel, ClientTlsConfig, Endpoint, Identity};
use tracing::{debug, info, warn};

use crate::config::ConnectionInfo;
use crate::error::{BoxError, ClientError, ErrorChain};

/// Client side of a gRPC connection
///
/// States: unconnected, connected (after [`GrpcClient::connect`]) and closed
/// (after [`GrpcClient::close`], which returns it to unconnected).
#[derive(Debug, Default)]
pub struct GrpcClient {
    connection: Option<Channel>,
}

impl GrpcClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect using server-only TLS (or plaintext)
    ///
    /// With `use_tls`, the CA certificate is read from `cert_file` when set,
    /// otherwise the bundled web PKI roots are trusted.
    pub async fn connect(&mut self, info: &ConnectionInfo) -> Result<(), ClientError> {
        info!("GRPC client: Initialize connection to grpc server");
        debug!("GRPC client: Setup connection options");

        let tls = if info.use_tls {
            info!("GRPC client: Setup TLS connection");
            let config = ClientTlsConfig::new().domain_name(info.tls_domain());
            Some(match non_empty(&info.cert_file) {
                Some(cert_file) => {
                    config.ca_certificate(Certificate::from_pem(read_file(cert_file).await?))
                }
                None => config.with_webpki_roots(),
            })
        } else {
            None
        };

        self.dial(info, tls).await
    }

    /// Connect presenting a client certificate, verifying the server against
    /// the CA bundle in `ca_file`
    ///
    /// Unreadable or malformed credentials fail before any dial is attempted.
    pub async fn connect_mutual(&mut self, info: &ConnectionInfo) -> Result<(), ClientError> {
        info!("GRPC client: Initialize mutual TLS connection to grpc server");

        let tls = if info.use_tls {
            let cert = read_file(&info.cert_file).await?;
            let key = read_file(&info.key_file).await?;
            let ca = read_file(&info.ca_file).await?;
            Some(
                ClientTlsConfig::new()
                    .domain_name(info.tls_domain())
                    .identity(Identity::from_pem(cert, key))
                    .ca_certificate(Certificate::from_pem(ca)),
            )
        } else {
            None
        };

        self.dial(info, tls).await
    }

    /// Release the connection
    pub fn close(&mut self) -> Result<(), ClientError> {
        match self.connection.take() {
            Some(_channel) => {
                info!("GRPC client: Connection closed");
                Ok(())
            }
            None => Err(ClientError::NotInitialized),
        }
    }

    /// The live channel, if connected
    pub fn connection(&self) -> Option<&Channel> {
        self.connection.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    async fn dial(
        &mut self,
        info: &ConnectionInfo,
        tls: Option<ClientTlsConfig>,
    ) -> Result<(), ClientError> {
        let endpoint = build_endpoint(info, tls)?;
        let deadline = info.dial_timeout();
        let retry_after = info.retry_interval();
        let attempts = info.attempts();

        let mut attempt = 1;
        loop {
            match connect_once(&endpoint, deadline).await {
                Ok(channel) => {
                    info!("GRPC client: Connected to {}", endpoint.uri());
                    self.connection = Some(channel);
                    return Ok(());
                }
                Err(source) if attempt >= attempts => {
                    return Err(ClientError::ConnectionFailed { attempts, source });
                }
                Err(e) => {
                    tokio::time::sleep(retry_after).await;
                    warn!(
                        "GRPC client: Retrying after error: {}",
                        ErrorChain(&*e)
                    );
                    attempt += 1;
                }
            }
        }
    }
}

fn build_endpoint(
    info: &ConnectionInfo,
    tls: Option<ClientTlsConfig>,
) -> Result<Endpoint, ClientError> {
    let scheme = if tls.is_some() { "https" } else { "http" };
    let uri = format!("{scheme}://{}:{}", info.ip, info.port);

    let mut endpoint =
        Endpoint::from_shared(uri.clone()).map_err(|e| ClientError::InvalidEndpoint {
            endpoint: uri,
            source: e.into(),
        })?;

    if let Some(deadline) = info.dial_timeout() {
        endpoint = endpoint.connect_timeout(deadline);
    }
    if let Some(tls) = tls {
        endpoint = endpoint
            .tls_config(tls)
            .map_err(|e| ClientError::Credentials { source: e.into() })?;
    }

    Ok(endpoint)
}

/// Dial once, blocking up to `deadline`, or return a lazily connecting
/// channel when there is no deadline
async fn connect_once(endpoint: &Endpoint, deadline: Option<Duration>) -> Result<Channel, BoxError> {
    match deadline {
        Some(deadline) => match tokio::time::timeout(deadline, endpoint.connect()).await {
            Ok(result) => result.map_err(Into::into),
            Err(elapsed) => Err(elapsed.into()),
        },
        None => Ok(endpoint.connect_lazy()),
    }
}

async fn read_file(path: &str) -> Result<Vec<u8>, ClientError> {
    tokio::fs::read(Path::new(path))
        .await
        .map_err(|source| ClientError::Io {
            path: path.into(),
            source,
        })
}

fn non_empty(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}
