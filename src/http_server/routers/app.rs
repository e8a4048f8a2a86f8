use super::{configure_router, Router, StainlessRouter, TransactionsRouter};
use crate::{http_server::handlers::status, settings::Settings};
use actix_web::web;

pub struct AppRouter {
    stainless: StainlessRouter,
    transactions: TransactionsRouter,
}

impl AppRouter {
    pub fn new(settings: Settings) -> Self {
        Self {
            stainless: StainlessRouter::new(settings.verifier, settings.compiler, &settings.tools),
            transactions: TransactionsRouter,
        }
    }
}

impl Router for AppRouter {
    fn register_routes(&self, service_config: &mut web::ServiceConfig) {
        service_config
            .route("/health", web::get().to(status::status))
            .service(
                web::scope("/api/v1")
                    .service(web::scope("/stainless").configure(configure_router(&self.stainless)))
                    .service(
                        web::scope("/transactions")
                            .configure(configure_router(&self.transactions)),
                    ),
            );
    }
}
