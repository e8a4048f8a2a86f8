pub mod artifacts;
mod consts;
mod http_server;
pub mod metrics;
mod settings;
pub mod stainless;
pub mod staging;
pub mod tool;
mod tracer;
pub mod transaction;

#[cfg(test)]
mod tests;

pub use self::{
    http_server::{
        configure_router,
        handlers::{stainless as stainless_handlers, transactions as transaction_handlers},
        run, AppRouter, ResponseStatus, Router, StainlessResponse,
    },
    settings::{
        CompilerSettings, MetricsSettings, ServerSettings, Settings, ToolsSettings,
        TracingFormat, TracingSettings, VerifierSettings,
    },
    stainless::StainlessClient,
    tracer::init_logs,
};
pub use ethers_core::types::Bytes as DisplayBytes;
