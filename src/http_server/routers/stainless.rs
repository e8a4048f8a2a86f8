use super::Router;
use crate::{
    http_server::handlers::stainless,
    settings::{CompilerSettings, ToolsSettings, VerifierSettings},
    stainless::StainlessClient,
};
use actix_web::web;

pub struct StainlessRouter {
    client: web::Data<StainlessClient>,
}

impl StainlessRouter {
    pub fn new(
        verifier: VerifierSettings,
        compiler: CompilerSettings,
        tools: &ToolsSettings,
    ) -> Self {
        Self {
            client: web::Data::new(StainlessClient::new(verifier, compiler, tools)),
        }
    }
}

impl Router for StainlessRouter {
    fn register_routes(&self, service_config: &mut web::ServiceConfig) {
        service_config
            .app_data(self.client.clone())
            .route("/verify", web::post().to(stainless::verify))
            .route("/bytecode", web::post().to(stainless::bytecode));
    }
}
