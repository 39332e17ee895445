//! Transport abstraction shared by the gRPC and gRPC-Web servers
//!
//! A transport owns a bound TCP listener and a set of routes. Its lifecycle
//! is `initialized -> running -> stopped`; a stopped transport drops its
//! routes and cannot be served again. The move to `running` happens
//! synchronously in [`Transport::start`], before the serve loop is polled.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::net::SocketAddr;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tonic::service::Routes;
use tonic::transport::server::TcpIncoming;
use tonic::transport::{Certificate, Identity, Server, ServerTlsConfig};
use tracing::{debug, info};

use crate::config::ServerOptions;
use crate::error::TransportError;
use crate::grpc_server::GrpcServer;
use crate::grpc_web_server::GrpcWebServer;

/// Server flavour, used in log lines and error messages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransportKind {
    #[default]
    Grpc,
    GrpcWeb,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::Grpc => f.write_str("GRPC"),
            TransportKind::GrpcWeb => f.write_str("GRPCWeb"),
        }
    }
}

/// Serve loop handed out by [`Transport::start`]
pub type ServeFuture = Pin<Box<dyn Future<Output = Result<(), TransportError>> + Send + 'static>>;

/// A server the [`crate::ServiceCoordinator`] can run and stop
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    fn kind(&self) -> TransportKind;

    /// Claim the listener and mark the server running
    ///
    /// The returned loop dispatches connections until [`Transport::stop`] is
    /// called, even if `stop` happens before the loop is first polled.
    fn start(&self) -> Result<ServeFuture, TransportError>;

    /// Dispatch connections until [`Transport::stop`] is called
    async fn serve(&self) -> Result<(), TransportError> {
        self.start()?.await
    }

    /// Halt the server and release its listener and routes
    fn stop(&self) -> Result<(), TransportError>;

    fn is_running(&self) -> bool;

    fn is_initialized(&self) -> bool;

    /// Address the listener is bound to, while initialized
    fn local_addr(&self) -> Option<SocketAddr>;
}

/// Create the transport described by `options`
///
/// A gRPC transport with a `ca_file` requires client certificates.
pub async fn create_transport(
    options: &ServerOptions,
    routes: Routes,
) -> Result<Arc<dyn Transport>, TransportError> {
    let transport: Arc<dyn Transport> = match options.kind {
        TransportKind::Grpc if options.use_tls && !options.ca_file.is_empty() => Arc::new(
            GrpcServer::create_mutual(
                true,
                &options.cert_file,
                &options.key_file,
                &options.ca_file,
                options.port,
                routes,
            )
            .await?,
        ),
        TransportKind::Grpc => Arc::new(
            GrpcServer::create(
                options.use_tls,
                &options.cert_file,
                &options.key_file,
                options.port,
                routes,
            )
            .await?,
        ),
        TransportKind::GrpcWeb => Arc::new(
            GrpcWebServer::create(
                options.use_tls,
                &options.cert_file,
                &options.key_file,
                options.port,
                routes,
            )
            .await?,
        ),
    };
    Ok(transport)
}

/// Everything a serve loop needs, taken out of [`ServerCore`] on serve
pub(crate) struct ServeParts {
    pub incoming: TcpIncoming,
    pub routes: Routes,
    pub shutdown: CancellationToken,
}

#[derive(Default)]
struct CoreState {
    listener: Option<TcpListener>,
    routes: Option<Routes>,
    tls: Option<ServerTlsConfig>,
    local_addr: Option<SocketAddr>,
    shutdown: Option<CancellationToken>,
    running: bool,
}

/// Lifecycle state shared by both server flavours
pub(crate) struct ServerCore {
    kind: TransportKind,
    state: Mutex<CoreState>,
}

impl ServerCore {
    /// Bind `0.0.0.0:port` and validate the TLS configuration, if any
    pub async fn bind(
        kind: TransportKind,
        port: u16,
        routes: Routes,
        tls: Option<ServerTlsConfig>,
    ) -> Result<Self, TransportError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| TransportError::Bind { kind, port, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| TransportError::Bind { kind, port, source })?;
        info!("{kind} server: Listening on {local_addr}");

        match &tls {
            Some(config) => {
                info!("{kind} server: Prepare server options (with TLS)");
                Server::builder()
                    .tls_config(config.clone())
                    .map_err(|e| TransportError::Credentials {
                        kind,
                        source: e.into(),
                    })?;
            }
            None => info!("{kind} server: Prepare server options (without TLS)"),
        }

        Ok(Self {
            kind,
            state: Mutex::new(CoreState {
                listener: Some(listener),
                routes: Some(routes),
                tls,
                local_addr: Some(local_addr),
                shutdown: None,
                running: false,
            }),
        })
    }

    /// Mark the server running and hand out what the serve loop needs
    pub fn begin_serve(&self) -> Result<ServeParts, TransportError> {
        let kind = self.kind;
        let mut state = self.state.lock();

        let routes = state
            .routes
            .clone()
            .ok_or(TransportError::NotInitialized { kind })?;
        if state.running {
            return Err(TransportError::AlreadyRunning { kind });
        }
        let listener = state
            .listener
            .take()
            .ok_or(TransportError::NotInitialized { kind })?;
        let incoming = TcpIncoming::from_listener(listener, true, None)
            .map_err(|source| TransportError::Serve { kind, source })?;

        let shutdown = CancellationToken::new();
        state.shutdown = Some(shutdown.clone());
        state.running = true;
        debug!("{kind} server: Serving");

        Ok(ServeParts {
            incoming,
            routes,
            shutdown,
        })
    }

    pub fn tls_config(&self) -> Option<ServerTlsConfig> {
        self.state.lock().tls.clone()
    }

    pub fn stop(&self) -> Result<(), TransportError> {
        let kind = self.kind;
        let mut state = self.state.lock();

        if state.routes.is_none() {
            return Err(TransportError::NotInitialized { kind });
        }
        if !state.running {
            return Err(TransportError::NotRunning { kind });
        }

        if let Some(shutdown) = state.shutdown.take() {
            shutdown.cancel();
        }
        *state = CoreState::default();
        info!("{kind} server: Stopped");

        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().running
    }

    pub fn is_initialized(&self) -> bool {
        self.state.lock().routes.is_some()
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.state.lock().local_addr
    }
}

impl fmt::Debug for ServerCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ServerCore")
            .field("kind", &self.kind)
            .field("local_addr", &state.local_addr)
            .field("tls", &state.tls.is_some())
            .field("running", &state.running)
            .finish()
    }
}

/// Server identity from PEM encoded certificate and key files
pub(crate) async fn load_identity(
    kind: TransportKind,
    cert_file: &Path,
    key_file: &Path,
) -> Result<Identity, TransportError> {
    let cert = read_pem(kind, cert_file).await?;
    let key = read_pem(kind, key_file).await?;
    Ok(Identity::from_pem(cert, key))
}

/// CA bundle used to verify client certificates
pub(crate) async fn load_client_ca(
    kind: TransportKind,
    ca_file: &Path,
) -> Result<Certificate, TransportError> {
    Ok(Certificate::from_pem(read_pem(kind, ca_file).await?))
}

async fn read_pem(kind: TransportKind, path: &Path) -> Result<Vec<u8>, TransportError> {
    tokio::fs::read(path)
        .await
        .map_err(|source| TransportError::Io {
            kind,
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_kind_display() {
        assert_eq!(TransportKind::Grpc.to_string(), "GRPC");
        assert_eq!(TransportKind::GrpcWeb.to_string(), "GRPCWeb");
    }

    #[tokio::test]
    async fn test_core_lifecycle() {
        let core = ServerCore::bind(TransportKind::Grpc, 0, Routes::default(), None)
            .await
            .unwrap();
        assert!(core.is_initialized());
        assert!(!core.is_running());
        assert!(core.local_addr().is_some());

        assert!(matches!(
            core.stop(),
            Err(TransportError::NotRunning { .. })
        ));

        let parts = core.begin_serve().unwrap();
        assert!(core.is_running());
        assert!(matches!(
            core.begin_serve(),
            Err(TransportError::AlreadyRunning { .. })
        ));

        core.stop().unwrap();
        assert!(parts.shutdown.is_cancelled());
        assert!(!core.is_running());
        assert!(!core.is_initialized());

        assert!(matches!(
            core.stop(),
            Err(TransportError::NotInitialized { .. })
        ));
        assert!(matches!(
            core.begin_serve(),
            Err(TransportError::NotInitialized { .. })
        ));
    }

    #[tokio::test]
    async fn test_create_transport_from_options() {
        let options = ServerOptions {
            kind: TransportKind::GrpcWeb,
            port: 0,
            ..ServerOptions::default()
        };
        let transport = create_transport(&options, Routes::default()).await.unwrap();
        assert_eq!(transport.kind(), TransportKind::GrpcWeb);
        assert!(transport.is_initialized());
        assert_ne!(transport.local_addr().unwrap().port(), 0);
    }

    #[tokio::test]
    async fn test_bind_port_in_use() {
        let first = ServerCore::bind(TransportKind::Grpc, 0, Routes::default(), None)
            .await
            .unwrap();
        let port = first.local_addr().unwrap().port();

        let err = ServerCore::bind(TransportKind::Grpc, port, Routes::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Bind { .. }));
    }

    #[tokio::test]
    async fn test_missing_certificate_file() {
        let err = load_identity(
            TransportKind::Grpc,
            Path::new("/nonexistent/server.pem"),
            Path::new("/nonexistent/server.key"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, TransportError::Io { .. }));
    }
}
