//! # gRPC Service
//!
//! Lifecycle wrappers around tonic servers and clients.
//!
//! ## Key Features
//! - [`GrpcServer`] and [`GrpcWebServer`] transports with a shared
//!   `create -> serve -> stop` contract, plain or (mutual) TLS
//! - [`GrpcClient`] with optional dial deadline and fixed-interval retries
//! - [`ServiceCoordinator`] tying a transport, a [`service_logger::ServerLogger`]
//!   and a [`StopSignal`] together
//! - [`ServiceConfig`] loaded through `common::config::loader`

pub mod client;
pub mod config;
pub mod error;
pub mod grpc_server;
pub mod grpc_web_server;
pub mod service;
pub mod stop_signal;
pub mod transport;

pub use client::GrpcClient;
pub use config::{ConnectionInfo, ServerOptions, ServiceConfig};
pub use error::{ClientError, ServiceError, TransportError};
pub use grpc_server::GrpcServer;
pub use grpc_web_server::GrpcWebServer;
pub use service::ServiceCoordinator;
pub use stop_signal::{StopReason, StopSignal};
pub use transport::{create_transport, ServeFuture, Transport, TransportKind};
