//! Integration tests for the service coordinator

use async_trait::async_trait;
use grpc_service::{
    GrpcServer, GrpcWebServer, ServeFuture, ServiceCoordinator, ServiceError, StopSignal,
    Transport, TransportError, TransportKind,
};
use service_logger::{LogLevel, LoggerConfig, ServerLogger};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use test_support::assert_that;
use tokio::net::TcpStream;
use tonic::service::Routes;

/// gRPC server whose serve loop only starts after a pause
#[derive(Debug)]
struct SlowStartTransport {
    inner: GrpcServer,
    pause: Duration,
}

#[async_trait]
impl Transport for SlowStartTransport {
    fn kind(&self) -> TransportKind {
        self.inner.kind()
    }

    fn start(&self) -> Result<ServeFuture, TransportError> {
        let serving = self.inner.start()?;
        let pause = self.pause;
        Ok(Box::pin(async move {
            tokio::time::sleep(pause).await;
            serving.await
        }))
    }

    fn stop(&self) -> Result<(), TransportError> {
        self.inner.stop()
    }

    fn is_running(&self) -> bool {
        self.inner.is_running()
    }

    fn is_initialized(&self) -> bool {
        self.inner.is_initialized()
    }

    fn local_addr(&self) -> Option<SocketAddr> {
        self.inner.local_addr()
    }
}

/// Wait until nothing accepts connections on `port` any more
async fn wait_until_released(port: u16) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while TcpStream::connect(("127.0.0.1", port)).await.is_ok() {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("listener should be released");
}

async fn grpc_transport() -> Arc<dyn Transport> {
    Arc::new(
        GrpcServer::create(false, "", "", 0, Routes::default())
            .await
            .unwrap(),
    )
}

async fn grpc_web_transport() -> Arc<dyn Transport> {
    Arc::new(
        GrpcWebServer::create(false, "", "", 0, Routes::default())
            .await
            .unwrap(),
    )
}

fn logger() -> Arc<ServerLogger> {
    Arc::new(ServerLogger::new(LoggerConfig::new("Test Server", LogLevel::Debug)).unwrap())
}

async fn wait_until_running(transport: &dyn Transport) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !transport.is_running() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("transport should start serving");
}

#[tokio::test]
async fn test_setup_serve_stop() {
    let transport = grpc_transport().await;
    let logger = logger();
    let service = ServiceCoordinator::grpc();

    service
        .setup(
            "Test Server",
            Some(transport.clone()),
            Some(logger.clone()),
            Some(StopSignal::new()),
        )
        .await
        .unwrap();
    assert!(service.is_initialized());
    assert!(logger.is_running());

    let serving = {
        let service = service.clone();
        tokio::spawn(async move { service.serve().await })
    };
    wait_until_running(transport.as_ref()).await;
    assert!(service.is_running());

    service.stop().await.unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), serving)
        .await
        .expect("serve should return after stop")
        .unwrap();
    assert!(result.is_ok());

    assert!(!service.is_initialized());
    assert!(!service.is_running());
    assert!(!transport.is_running());
    assert!(!transport.is_initialized());
    assert!(!logger.is_running());
}

#[tokio::test]
async fn test_setup_then_stop() {
    let transport = grpc_web_transport().await;
    let logger = logger();
    let service = ServiceCoordinator::grpc_web();

    service
        .setup(
            "Test Server",
            Some(transport.clone()),
            Some(logger.clone()),
            Some(StopSignal::new()),
        )
        .await
        .unwrap();

    service.stop().await.unwrap();
    assert!(!service.is_initialized());
    assert!(!logger.is_running());
    // never served, so the transport keeps its listener
    assert!(transport.is_initialized());

    let err = service.stop().await.unwrap_err();
    assert!(matches!(err, ServiceError::NotInitialized));
}

#[tokio::test]
async fn test_serve_before_setup() {
    let service = ServiceCoordinator::grpc();
    let err = service.serve().await.unwrap_err();
    assert_that(&err.to_string(), "Service not initialized", &["streq"]);
}

#[tokio::test]
async fn test_concurrent_serve_runs_once() {
    let transport = grpc_transport().await;
    let service = ServiceCoordinator::grpc();
    service
        .setup(
            "Test Server",
            Some(transport.clone()),
            Some(logger()),
            Some(StopSignal::new()),
        )
        .await
        .unwrap();

    let first = {
        let service = service.clone();
        tokio::spawn(async move { service.serve().await })
    };
    let second = {
        let service = service.clone();
        tokio::spawn(async move { service.serve().await })
    };
    wait_until_running(transport.as_ref()).await;

    service.stop().await.unwrap();

    let results = [
        tokio::time::timeout(Duration::from_secs(5), first)
            .await
            .unwrap()
            .unwrap(),
        tokio::time::timeout(Duration::from_secs(5), second)
            .await
            .unwrap()
            .unwrap(),
    ];
    let already_running = results
        .iter()
        .filter(|result| matches!(result, Err(ServiceError::AlreadyRunning)))
        .count();
    let served = results.iter().filter(|result| result.is_ok()).count();
    assert_eq!(already_running, 1);
    assert_eq!(served, 1);
}

#[tokio::test]
async fn test_setup_validation_order() {
    let service = ServiceCoordinator::grpc_web();

    let err = service
        .setup("", None, None, None)
        .await
        .unwrap_err();
    assert_that(&err.to_string(), "Empty server name", &["streq"]);

    let err = service
        .setup("Test Server", None, None, None)
        .await
        .unwrap_err();
    assert_that(&err.to_string(), "Stop channel not initialized", &["streq"]);

    let err = service
        .setup("Test Server", None, None, Some(StopSignal::new()))
        .await
        .unwrap_err();
    assert_that(&err.to_string(), "GRPCWeb server not initialized", &["streq"]);

    let err = service
        .setup(
            "Test Server",
            Some(grpc_web_transport().await),
            None,
            Some(StopSignal::new()),
        )
        .await
        .unwrap_err();
    assert_that(&err.to_string(), "Server logger not initialized", &["streq"]);

    assert!(!service.is_initialized());
}

#[tokio::test]
async fn test_setup_fails_when_logger_cannot_start() {
    let temp_dir = TempDir::new().unwrap();
    let blocker = temp_dir.path().join("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();

    let config =
        LoggerConfig::new("Test Server", LogLevel::Info).with_file(blocker.join("logs"), "server.log");
    let logger = Arc::new(ServerLogger::new(config).unwrap());

    let service = ServiceCoordinator::grpc();
    let err = service
        .setup(
            "Test Server",
            Some(grpc_transport().await),
            Some(logger),
            Some(StopSignal::new()),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::LoggerStart(_)));
    assert_that(&err.to_string(), "Server logger failed on start:", &["contains"]);
    assert!(!service.is_initialized());
}

#[tokio::test]
async fn test_closed_signal_stops_service() {
    let transport = grpc_transport().await;
    let stop_signal = StopSignal::new();
    let service = ServiceCoordinator::grpc();
    service
        .setup(
            "Test Server",
            Some(transport.clone()),
            Some(logger()),
            Some(stop_signal.clone()),
        )
        .await
        .unwrap();

    let serving = {
        let service = service.clone();
        tokio::spawn(async move { service.serve().await })
    };
    wait_until_running(transport.as_ref()).await;

    stop_signal.close();

    let result = tokio::time::timeout(Duration::from_secs(5), serving)
        .await
        .expect("serve should return once the signal closes")
        .unwrap();
    assert!(result.is_ok());
    assert!(!service.is_initialized());
    assert!(!transport.is_running());
}

#[tokio::test]
async fn test_stop_before_serve_loop_starts() {
    let inner = GrpcServer::create(false, "", "", 0, Routes::default())
        .await
        .unwrap();
    let port = inner.local_addr().unwrap().port();
    let transport: Arc<dyn Transport> = Arc::new(SlowStartTransport {
        inner,
        pause: Duration::from_millis(50),
    });

    let service = ServiceCoordinator::grpc();
    service
        .setup(
            "Test Server",
            Some(transport.clone()),
            Some(logger()),
            Some(StopSignal::new()),
        )
        .await
        .unwrap();

    let serving = {
        let service = service.clone();
        tokio::spawn(async move { service.serve().await })
    };
    tokio::time::timeout(Duration::from_secs(5), async {
        while !service.is_running() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .unwrap();
    assert!(transport.is_running());

    service.stop().await.unwrap();
    let result = tokio::time::timeout(Duration::from_secs(5), serving)
        .await
        .expect("serve should return after stop")
        .unwrap();
    assert!(result.is_ok());

    assert!(!transport.is_running());
    assert!(!transport.is_initialized());
    wait_until_released(port).await;
}

#[tokio::test]
async fn test_stop_signal_fired_elsewhere_shuts_down() {
    let transport = grpc_transport().await;
    let port = transport.local_addr().unwrap().port();
    let logger = logger();
    let stop_signal = StopSignal::new();
    let service = ServiceCoordinator::grpc();
    service
        .setup(
            "Test Server",
            Some(transport.clone()),
            Some(logger.clone()),
            Some(stop_signal.clone()),
        )
        .await
        .unwrap();

    let serving = {
        let service = service.clone();
        tokio::spawn(async move { service.serve().await })
    };
    wait_until_running(transport.as_ref()).await;

    assert!(stop_signal.stop());

    let result = tokio::time::timeout(Duration::from_secs(5), serving)
        .await
        .expect("serve should return once the signal fires")
        .unwrap();
    assert!(result.is_ok());
    assert!(!service.is_initialized());
    assert!(!transport.is_running());
    assert!(!logger.is_running());
    wait_until_released(port).await;
}

#[tokio::test]
async fn test_setup_rejects_grpc_web_transport_for_grpc() {
    let service = ServiceCoordinator::grpc();
    let err = service
        .setup(
            "Test Server",
            Some(grpc_web_transport().await),
            Some(logger()),
            Some(StopSignal::new()),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::TransportMismatch {
            expected: TransportKind::Grpc,
            found: TransportKind::GrpcWeb,
        }
    ));
    assert!(!service.is_initialized());
}
