//! gRPC-Web bridge server
//!
//! Accepts HTTP/1.1 and HTTP/2, translates gRPC-Web requests for the wrapped
//! routes, answers CORS preflight requests itself and logs every request.

use async_trait::async_trait;
use http::header::{self, HeaderName};
use http::Method;
use std::net::SocketAddr;
use std::path::Path;
use tonic::service::Routes;
use tonic::transport::{Server, ServerTlsConfig};
use tonic_web::GrpcWebLayer;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{info, Level};

use crate::error::TransportError;
use crate::transport::{
    load_identity, ServeFuture, ServeParts, ServerCore, Transport, TransportKind,
};

const KIND: TransportKind = TransportKind::GrpcWeb;

/// Methods allowed for cross-origin requests
pub const CORS_ALLOWED_METHODS: [Method; 5] = [
    Method::POST,
    Method::GET,
    Method::OPTIONS,
    Method::PUT,
    Method::DELETE,
];

/// Request headers allowed for cross-origin requests
pub const CORS_ALLOWED_HEADERS: [HeaderName; 7] = [
    header::ACCEPT,
    header::CONTENT_TYPE,
    header::CONTENT_LENGTH,
    header::ACCEPT_ENCODING,
    HeaderName::from_static("x-csrf-token"),
    header::AUTHORIZATION,
    HeaderName::from_static("x-grpc-web"),
];

/// gRPC-Web server bound to a TCP port
#[derive(Debug)]
pub struct GrpcWebServer {
    core: ServerCore,
}

impl GrpcWebServer {
    /// Bind `port` (0 picks a free port) and prepare `routes` for serving
    pub async fn create(
        use_tls: bool,
        cert_file: impl AsRef<Path>,
        key_file: impl AsRef<Path>,
        port: u16,
        routes: Routes,
    ) -> Result<Self, TransportError> {
        let tls = if use_tls {
            let identity = load_identity(KIND, cert_file.as_ref(), key_file.as_ref()).await?;
            info!("{KIND} server: Preparing server (with TLS)");
            Some(ServerTlsConfig::new().identity(identity))
        } else {
            info!("{KIND} server: Preparing server (without TLS)");
            None
        };

        Ok(Self {
            core: ServerCore::bind(KIND, port, routes, tls).await?,
        })
    }
}

/// CORS policy mirroring the request origin
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(CORS_ALLOWED_METHODS)
        .allow_headers(CORS_ALLOWED_HEADERS)
        .expose_headers([
            HeaderName::from_static("grpc-status"),
            HeaderName::from_static("grpc-message"),
        ])
}

fn request_log_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO))
}

#[async_trait]
impl Transport for GrpcWebServer {
    fn kind(&self) -> TransportKind {
        KIND
    }

    fn start(&self) -> Result<ServeFuture, TransportError> {
        let mut builder = Server::builder().accept_http1(true);
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
        let router = builder
            .layer(request_log_layer())
            .layer(cors_layer())
            .layer(GrpcWebLayer::new())
            .add_routes(routes);

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
