use crate::{
    artifacts,
    http_server::response::StainlessResponse,
    metrics, staging,
    stainless::{self, BytecodeResult, StainlessClient, VerificationResult},
    tool,
};
use actix_web::{error, web, web::Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::instrument;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourcesRequest {
    pub sources: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct VerifyResult {
    pub console: String,
    /// The verifier's report, kept as text if it is not JSON.
    pub report: Option<Value>,
}

impl From<VerificationResult> for VerifyResult {
    fn from(value: VerificationResult) -> Self {
        let report = value.report.map(|report| {
            serde_json::from_str(&report).unwrap_or(Value::String(report))
        });
        Self {
            console: value.console,
            report,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Artifact {
    pub abi: String,
    pub bin: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct BytecodeGenResult {
    pub contracts: BTreeMap<String, Artifact>,
}

impl From<BytecodeResult> for BytecodeGenResult {
    fn from(value: BytecodeResult) -> Self {
        let contracts = value
            .into_iter()
            .map(|(file, artifact)| {
                (
                    file,
                    Artifact {
                        abi: artifact.abi,
                        bin: artifact.bin,
                    },
                )
            })
            .collect();
        Self { contracts }
    }
}

#[instrument(skip(client, params), level = "debug")]
pub async fn verify(
    client: web::Data<StainlessClient>,
    params: Json<SourcesRequest>,
) -> Result<Json<StainlessResponse<VerifyResult>>, actix_web::Error> {
    let result = client.verify(&params.into_inner().sources).await;
    respond("verify", result.map(VerifyResult::from))
}

#[instrument(skip(client, params), level = "debug")]
pub async fn bytecode(
    client: web::Data<StainlessClient>,
    params: Json<SourcesRequest>,
) -> Result<Json<StainlessResponse<BytecodeGenResult>>, actix_web::Error> {
    let result = client.generate_bytecode(&params.into_inner().sources).await;
    respond("bytecode", result.map(BytecodeGenResult::from))
}

fn respond<T>(
    endpoint: &str,
    result: Result<T, stainless::Error>,
) -> Result<Json<StainlessResponse<T>>, actix_web::Error> {
    metrics::count_request(endpoint, result.is_ok());
    let err = match result {
        Ok(result) => return Ok(Json(StainlessResponse::ok(result))),
        Err(err) => err,
    };

    match err {
        stainless::Error::NoReport { .. }
        | stainless::Error::EmptyReport { .. }
        | stainless::Error::CompilationFailed { .. }
        | stainless::Error::Artifact(artifacts::Error::ArtifactMatchError { .. })
        | stainless::Error::Tool(tool::Error::Timeout { .. })
        | stainless::Error::Tool(tool::Error::ExecutionFailed { .. }) => {
            Ok(Json(StainlessResponse::err(err)))
        }
        stainless::Error::Staging(staging::Error::InvalidFileName(_)) => {
            Err(error::ErrorBadRequest(err))
        }
        stainless::Error::Staging(staging::Error::IOFailure(_))
        | stainless::Error::Tool(tool::Error::Spawn { .. })
        | stainless::Error::Artifact(artifacts::Error::Io(_))
        | stainless::Error::Io(_)
        | stainless::Error::Acquire(_) => {
            tracing::error!(endpoint, err = %err, "internal error");
            Err(error::ErrorInternalServerError(err))
        }
    }
}
