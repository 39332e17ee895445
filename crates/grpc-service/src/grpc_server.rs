//! Plain gRPC server over HTTP/2

use async_trait::async_trait;
use std::net::SocketAddr;
use std::path::Path;
use tonic::service::Routes;
use tonic::transport::{Server, ServerTlsConfig};
use tracing::info;

use crate::error::TransportError;
use crate::transport::{
    load_client_ca, load_identity, ServeFuture, ServeParts, ServerCore, Transport, TransportKind,
};

const KIND: TransportKind = TransportKind::Grpc;

/// gRPC server bound to a TCP port, optionally with (mutual) TLS
#[derive(Debug)]
pub struct GrpcServer {
    core: ServerCore,
}

impl GrpcServer {
    /// Bind `port` (0 picks a free port) and prepare `routes` for serving
    ///
    /// With `use_tls` the certificate and key are loaded from PEM files.
    pub async fn create(
        use_tls: bool,
        cert_file: impl AsRef<Path>,
        key_file: impl AsRef<Path>,
        port: u16,
        routes: Routes,
    ) -> Result<Self, TransportError> {
        let tls = if use_tls {
            let identity = load_identity(KIND, cert_file.as_ref(), key_file.as_ref()).await?;
            Some(ServerTlsConfig::new().identity(identity))
        } else {
            None
        };

        info!("{KIND} server: Creating new RPC server");
        Ok(Self {
            core: ServerCore::bind(KIND, port, routes, tls).await?,
        })
    }

    /// Like [`GrpcServer::create`], additionally requiring client
    /// certificates signed by the CA in `ca_file`
    pub async fn create_mutual(
        use_tls: bool,
        cert_file: impl AsRef<Path>,
        key_file: impl AsRef<Path>,
        ca_file: impl AsRef<Path>,
        port: u16,
        routes: Routes,
    ) -> Result<Self, TransportError> {
        let tls = if use_tls {
            let identity = load_identity(KIND, cert_file.as_ref(), key_file.as_ref()).await?;
            let client_ca = load_client_ca(KIND, ca_file.as_ref()).await?;
            Some(
                ServerTlsConfig::new()
                    .identity(identity)
                    .client_ca_root(client_ca),
            )
        } else {
            None
        };

        Ok(Self {
            core: ServerCore::bind(KIND, port, routes, tls).await?,
        })
    }
}

#[async_trait]
impl Transport for GrpcServer {
    fn kind(&self) -> TransportKind {
        KIND
    }

    fn start(&self) -> Result<ServeFuture, TransportError> {
        let mut builder = Server::builder();
        if let Some(tls) = self.core.tls_config() {
            builder = builder
                .tls_config(tls)
                .map_err(|e| TransportError::Credentials {
                    kind: KIND,
                    source: e.into(),
                })?;
        }

        let ServeParts {
            incoming,
            routes,
            shutdown,
        } = self.core.begin_serve()?;
        let router = builder.add_routes(routes);

        Ok(Box::pin(async move {
            router
                .serve_with_incoming_shutdown(incoming, shutdown.cancelled_owned())
                .await
                .map_err(|e| TransportError::Serve {
                    kind: KIND,
                    source: e.into(),
                })
        }))
    }

    fn stop(&self) -> Result<(), TransportError> {
        self.core.stop()
    }

    fn is_running(&self) -> bool {
        self.core.is_running()
    }

    fn is_initialized(&self) -> bool {
        self.core.is_initialized()
    }

    fn local_addr(&self) -> Option<SocketAddr> {
        self.core.local_addr()
    }
}
