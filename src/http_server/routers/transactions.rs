use super::Router;
use crate::http_server::handlers::transactions;
use actix_web::web;

/// Transaction building is stateless, so the router holds nothing.
pub struct TransactionsRouter;

impl Router for TransactionsRouter {
    fn register_routes(&self, service_config: &mut web::ServiceConfig) {
        service_config
            .route("/deploy", web::post().to(transactions::deploy))
            .route("/call", web::post().to(transactions::call))
            .route("/finalize", web::post().to(transactions::finalize));
    }
}
