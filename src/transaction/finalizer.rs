use super::{
    types::{HomesteadSigner, SignedTransaction},
    Error,
};
use ethers_core::types::Bytes;

/// Attaches `signature` to a serialized transaction and serializes the result.
///
/// The input may already carry a signature, which is replaced, so finalizing
/// twice with the same signature gives identical output.
pub fn finalize(serialized: &[u8], signature: &[u8]) -> Result<Bytes, Error> {
    let transaction = SignedTransaction::deserialize(serialized)?.transaction;
    let signed = HomesteadSigner.sign(transaction, signature)?;
    Ok(signed.serialize().into())
}
