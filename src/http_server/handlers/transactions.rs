use crate::{
    metrics,
    transaction::{self, BuiltTransaction, TransferParams},
    DisplayBytes,
};
use actix_web::{error, web::Json};
use ethers_core::types::{Address, H256, U256};
use serde::{Deserialize, Serialize};
use tracing::instrument;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeployRequest {
    pub gas_limit: u64,
    pub gas_price: u64,
    pub amount: u64,
    pub bytecode: DisplayBytes,
    pub abi: String,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CallRequest {
    pub gas_limit: u64,
    pub gas_price: u64,
    pub amount: u64,
    pub contract_address: Address,
    pub nonce: u64,
    pub abi: String,
    pub method: String,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FinalizeRequest {
    pub transaction: DisplayBytes,
    pub signature: DisplayBytes,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct TransactionResponse {
    pub transaction: DisplayBytes,
    pub transaction_hash: H256,
}

impl From<BuiltTransaction> for TransactionResponse {
    fn from(value: BuiltTransaction) -> Self {
        Self {
            transaction: value.transaction,
            transaction_hash: value.signing_hash,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct FinalizeResponse {
    pub transaction: DisplayBytes,
}

fn transfer_params(gas_limit: u64, gas_price: u64, amount: u64) -> TransferParams {
    TransferParams {
        gas_limit,
        gas_price: U256::from(gas_price),
        amount: U256::from(amount),
    }
}

fn respond<T, R>(
    endpoint: &str,
    result: Result<T, transaction::Error>,
) -> Result<Json<R>, actix_web::Error>
where
    R: From<T>,
{
    metrics::count_request(endpoint, result.is_ok());
    // every transaction error is caused by the request content
    result
        .map(|value| Json(R::from(value)))
        .map_err(error::ErrorBadRequest)
}

#[instrument(skip(params), level = "debug")]
pub async fn deploy(
    params: Json<DeployRequest>,
) -> Result<Json<TransactionResponse>, actix_web::Error> {
    let request = params.into_inner();
    let result = transaction::build_creation(
        transfer_params(request.gas_limit, request.gas_price, request.amount),
        &request.bytecode,
        &request.abi,
        &request.args,
    );
    respond("deploy", result)
}

#[instrument(skip(params), level = "debug")]
pub async fn call(
    params: Json<CallRequest>,
) -> Result<Json<TransactionResponse>, actix_web::Error> {
    let request = params.into_inner();
    let result = transaction::build_call(
        transfer_params(request.gas_limit, request.gas_price, request.amount),
        request.contract_address,
        request.nonce,
        &request.abi,
        &request.method,
        &request.args,
    );
    respond("call", result)
}

#[instrument(skip(params), level = "debug")]
pub async fn finalize(
    params: Json<FinalizeRequest>,
) -> Result<Json<FinalizeResponse>, actix_web::Error> {
    let request = params.into_inner();
    let result = transaction::finalize(&request.transaction, &request.signature)
        .map(|transaction| FinalizeResponse { transaction });
    respond("finalize", result)
}
