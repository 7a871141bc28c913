use crate::{
    config::{Config, UploadConfig},
    routes::api_routes,
    store::{DetectionStore, FrameStore},
    telemetry::Metrics,
};
use axum::{extract::DefaultBodyLimit, Router};
use axum_otel_metrics::HttpMetricsLayerBuilder;
use std::{io, net::SocketAddr, sync::Arc};
use tokio::{net::TcpListener, sync::broadcast::Receiver, task::JoinHandle};
use tower_http::trace::TraceLayer;

/// Application context handed to every handler. Built once per server.
#[derive(Clone)]
pub struct SharedState {
    pub frames: Arc<FrameStore>,
    pub detections: Arc<DetectionStore>,
    pub upload: UploadConfig,
    pub metrics: Arc<Metrics>,
}

pub struct HttpServer {
    router: Router,
    listener: TcpListener,
}

impl HttpServer {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let addr = config.server.get_address();

        let metrics = Arc::new(Metrics::new()?);
        let metrics_layer = HttpMetricsLayerBuilder::new().build();

        let frames = Arc::new(FrameStore::new(config.storage.frame_path.clone()));
        tracing::info!(frame_path = %frames.path().await.display(), "Frame store ready");

        let app_state = SharedState {
            frames,
            detections: Arc::new(DetectionStore::new()),
            upload: config.upload.clone(),
            metrics,
        };

        let router = Router::new()
            .merge(api_routes())
            .with_state(app_state)
            .layer(DefaultBodyLimit::max(config.upload.max_body_bytes))
            .layer(TraceLayer::new_for_http())
            .layer(metrics_layer);

        let listener = TcpListener::bind(addr).await?;

        Ok(Self { router, listener })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub async fn run(
        self,
        shutdown_rx: Receiver<()>,
    ) -> anyhow::Result<JoinHandle<anyhow::Result<()>>> {
        tracing::info!("Starting relay on {}", self.listener.local_addr()?);

        let listener = self.listener;
        let router = self.router;
        let server_handle = tokio::spawn({
            let mut shutdown_rx = shutdown_rx;
            async move {
                axum::serve(listener, router)
                    .with_graceful_shutdown(async move {
                        shutdown_rx.recv().await.ok();
                    })
                    .await?;
                tracing::info!("Relay stopped");
                Ok(())
            }
        });

        Ok(server_handle)
    }
}
