use super::{
    arguments::{decode_arguments, tokenize, Argument},
    types::{HomesteadSigner, UnsignedTransaction},
    Error,
};
use ethabi::{Contract, Param, Token};
use ethers_core::types::{Address, Bytes, H256, U256};

/// Gas and value fields shared by every built transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferParams {
    pub gas_limit: u64,
    pub gas_price: U256,
    pub amount: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltTransaction {
    /// Canonical serialization of the unsigned transaction.
    pub transaction: Bytes,
    pub signing_hash: H256,
}

/// Builds a contract deployment: `bytecode` followed by the packed constructor arguments.
pub fn build_creation(
    params: TransferParams,
    bytecode: &[u8],
    abi: &str,
    args: &[String],
) -> Result<BuiltTransaction, Error> {
    let contract = parse_abi(abi)?;
    let args = decode_arguments(args)?;

    let data = match &contract.constructor {
        Some(constructor) => {
            let tokens = tokenize_all(&constructor.inputs, &args)?;
            constructor
                .encode_input(bytecode.to_vec(), &tokens)
                .map_err(|err| Error::AbiPack(format!("constructor: {err}")))?
        }
        None if args.is_empty() => bytecode.to_vec(),
        None => {
            return Err(Error::AbiPack(format!(
                "contract has no constructor, but {} arguments were given",
                args.len()
            )))
        }
    };

    // Nonce of a fresh deployment; the account layer assigns the real one.
    let transaction = assemble(params, None, 0, data);
    Ok(seal(&transaction))
}

/// Builds a call of `method` on the contract deployed at `contract_address`.
pub fn build_call(
    params: TransferParams,
    contract_address: Address,
    nonce: u64,
    abi: &str,
    method: &str,
    args: &[String],
) -> Result<BuiltTransaction, Error> {
    let contract = parse_abi(abi)?;
    let args = decode_arguments(args)?;

    let functions = contract
        .functions_by_name(method)
        .map_err(|_| Error::AbiPack(format!("method `{method}` is not present in abi")))?;

    // Overloads are tried in declaration order.
    let mut mismatches = vec![];
    let mut data = None;
    for function in functions {
        match tokenize_all(&function.inputs, &args) {
            Ok(tokens) => {
                let encoded = function
                    .encode_input(&tokens)
                    .map_err(|err| Error::AbiPack(format!("{method}: {err}")))?;
                data = Some(encoded);
                break;
            }
            Err(Error::AbiPack(reason)) => mismatches.push(reason),
            Err(err) => return Err(err),
        }
    }
    let data = data.ok_or_else(|| {
        Error::AbiPack(format!(
            "no overload of `{method}` accepts the arguments: {}",
            mismatches.join("; ")
        ))
    })?;

    let transaction = assemble(params, Some(contract_address), nonce, data);
    Ok(seal(&transaction))
}

fn parse_abi(abi: &str) -> Result<Contract, Error> {
    Contract::load(abi.as_bytes()).map_err(|err| Error::AbiParse(err.to_string()))
}

fn tokenize_all(inputs: &[Param], args: &[Argument]) -> Result<Vec<Token>, Error> {
    if inputs.len() != args.len() {
        return Err(Error::AbiPack(format!(
            "expected {} arguments, got {}",
            inputs.len(),
            args.len()
        )));
    }
    inputs
        .iter()
        .zip(args)
        .map(|(input, arg)| {
            tokenize(&input.kind, arg)
                .map_err(|reason| Error::AbiPack(format!("argument `{}`: {reason}", input.name)))
        })
        .collect()
}

fn assemble(
    params: TransferParams,
    to: Option<Address>,
    nonce: u64,
    data: Vec<u8>,
) -> UnsignedTransaction {
    UnsignedTransaction {
        nonce,
        gas_price: params.gas_price,
        gas_limit: params.gas_limit,
        to,
        value: params.amount,
        data: data.into(),
    }
}

/// Hash and serialization are computed from the same, no longer mutable, value.
fn seal(transaction: &UnsignedTransaction) -> BuiltTransaction {
    BuiltTransaction {
        transaction: transaction.serialize().into(),
        signing_hash: HomesteadSigner.signing_hash(transaction),
    }
}
