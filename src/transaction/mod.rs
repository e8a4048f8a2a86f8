//! Building unsigned transactions from ABI-described calls and
//! attaching externally produced signatures to them.
//!
//! Nothing here holds key material or talks to the network: every
//! operation is a pure function of its inputs.

mod arguments;
mod builder;
mod finalizer;
mod types;

pub use arguments::{decode_arguments, tokenize, Argument};
pub use builder::{build_call, build_creation, BuiltTransaction, TransferParams};
pub use finalizer::finalize;
pub use types::{
    HomesteadSigner, Signature, SignedTransaction, UnsignedTransaction, SIGNATURE_LENGTH,
};

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("cannot decode argument #{index} ({raw:?}): {reason}")]
    ArgumentDecode {
        index: usize,
        raw: String,
        reason: String,
    },
    #[error("invalid abi: {0}")]
    AbiParse(String),
    #[error("cannot pack arguments: {0}")]
    AbiPack(String),
    #[error("invalid serialized transaction: {0}")]
    TransactionDeserialize(String),
    #[error("signature must be {SIGNATURE_LENGTH} bytes long, got {0}")]
    InvalidSignatureLength(usize),
    #[error("invalid signature recovery id: {0}")]
    InvalidRecoveryId(u8),
}
