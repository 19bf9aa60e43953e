use std::{future::Future, net::IpAddr, sync::Arc};

use axum::Router;
use mailform_core_dispatch_contracts::DispatchService;
use tokio::net::TcpListener;
use tokio_util::task::TaskTracker;
use tracing::info;

mod errors;
mod middlewares;
mod models;
mod routes;

#[derive(Debug)]
pub struct RestServer<Dispatch> {
    dispatch: Arc<Dispatch>,
    tasks: TaskTracker,
}

impl<Dispatch> RestServer<Dispatch>
where
    Dispatch: DispatchService,
{
    pub fn new(dispatch: Dispatch) -> Self {
        Self {
            dispatch: dispatch.into(),
            tasks: TaskTracker::new(),
        }
    }

    /// Serve until `shutdown` resolves, then wait for provider calls that are
    /// still in flight.
    pub async fn serve(
        self,
        host: IpAddr,
        port: u16,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let router = self.router();
        let listener = TcpListener::bind((host, port)).await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;

        self.tasks.close();
        if !self.tasks.is_empty() {
            info!(
                pending = self.tasks.len(),
                "Waiting for in-flight provider calls to finish"
            );
        }
        self.tasks.wait().await;

        Ok(())
    }

    pub fn router(&self) -> Router<()> {
        let router = Router::new()
            .merge(routes::health::router(Arc::clone(&self.dispatch)))
            .merge(routes::send_email::router(
                Arc::clone(&self.dispatch),
                self.tasks.clone(),
            ));
        middlewares::add(router)
    }
}
