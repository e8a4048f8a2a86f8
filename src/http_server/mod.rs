pub mod handlers;
mod response;
mod routers;

pub use self::{
    response::{ResponseStatus, StainlessResponse},
    routers::{configure_router, AppRouter, Router},
};

use crate::{metrics::Metrics, settings::Settings};
use actix_web::{middleware::Condition, App, HttpServer};
use futures::future;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let socket_addr = settings.server.addr;
    let metrics_settings = settings.metrics.clone();

    tracing::info!(addr = %socket_addr, "stainless service is starting");
    let app_router = Arc::new(AppRouter::new(settings));
    let metrics = Metrics::new(&metrics_settings.route)?;

    let server_future = {
        let middleware = metrics.middleware().clone();
        let metrics_enabled = metrics_settings.enabled;
        HttpServer::new(move || {
            App::new()
                .wrap(Condition::new(metrics_enabled, middleware.clone()))
                .wrap(TracingLogger::default())
                .configure(configure_router(&*app_router))
        })
        .bind(socket_addr)?
        .run()
    };

    let mut futures = vec![tokio::spawn(server_future)];
    if metrics_settings.enabled {
        tracing::info!(addr = %metrics_settings.addr, "metrics server is starting");
        futures.push(tokio::spawn(metrics.run_server(metrics_settings.addr)?));
    }

    for result in future::try_join_all(futures).await? {
        result?;
    }
    Ok(())
}
