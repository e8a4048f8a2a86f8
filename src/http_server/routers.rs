mod app;
mod stainless;
mod transactions;

pub use self::app::AppRouter;

use self::{stainless::StainlessRouter, transactions::TransactionsRouter};
use actix_web::web;

pub trait Router {
    fn register_routes(&self, service_config: &mut web::ServiceConfig);
}

pub fn configure_router(router: &impl Router) -> impl FnOnce(&mut web::ServiceConfig) + '_ {
    |service_config| router.register_routes(service_config)
}
