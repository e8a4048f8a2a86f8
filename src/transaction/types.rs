use super::Error;
use ethers_core::{
    types::{Address, Bytes, H256, U256, U64},
    utils::{keccak256, rlp::RlpStream},
};
use serde::{Deserialize, Serialize};

pub const SIGNATURE_LENGTH: usize = 65;

/// Offset added to the recovery id to obtain `v`.
const RECOVERY_ID_OFFSET: u8 = 27;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction {
    pub nonce: u64,
    pub gas_price: U256,
    pub gas_limit: u64,
    /// `None` creates a contract.
    pub to: Option<Address>,
    pub value: U256,
    pub data: Bytes,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Signature {
    pub v: u64,
    pub r: U256,
    pub s: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub transaction: UnsignedTransaction,
    pub signature: Signature,
}

/// Pre-EIP-155 signing scheme: the signing hash does not commit to a chain id.
#[derive(Debug, Clone, Copy, Default)]
pub struct HomesteadSigner;

impl HomesteadSigner {
    pub fn signing_hash(&self, transaction: &UnsignedTransaction) -> H256 {
        let mut stream = RlpStream::new_list(6);
        transaction.rlp_append_fields(&mut stream);
        H256::from(keccak256(stream.out()))
    }

    /// Splits a `r || s || recovery id` signature into its values.
    pub fn signature_values(&self, signature: &[u8]) -> Result<Signature, Error> {
        if signature.len() != SIGNATURE_LENGTH {
            return Err(Error::InvalidSignatureLength(signature.len()));
        }
        let v = match signature[64] {
            id @ (0 | 1) => id + RECOVERY_ID_OFFSET,
            id @ (27 | 28) => id,
            id => return Err(Error::InvalidRecoveryId(id)),
        };
        Ok(Signature {
            v: v as u64,
            r: U256::from_big_endian(&signature[0..32]),
            s: U256::from_big_endian(&signature[32..64]),
        })
    }

    pub fn sign(
        &self,
        transaction: UnsignedTransaction,
        signature: &[u8],
    ) -> Result<SignedTransaction, Error> {
        let signature = self.signature_values(signature)?;
        Ok(SignedTransaction {
            transaction,
            signature,
        })
    }
}

impl UnsignedTransaction {
    fn rlp_append_fields(&self, stream: &mut RlpStream) {
        stream.append(&self.nonce);
        stream.append(&self.gas_price);
        stream.append(&self.gas_limit);
        match &self.to {
            Some(to) => stream.append(to),
            None => stream.append_empty_data(),
        };
        stream.append(&self.value);
        stream.append(&self.data.to_vec());
    }

    /// Canonical serialization, carrying an all-zero signature.
    pub fn serialize(&self) -> Vec<u8> {
        WireTransaction::new(self, &Signature::default()).to_bytes()
    }

    pub fn deserialize(serialized: &[u8]) -> Result<Self, Error> {
        SignedTransaction::deserialize(serialized).map(|signed| signed.transaction)
    }
}

impl SignedTransaction {
    /// Hash identifying the transaction, committing to the signature too.
    pub fn hash(&self) -> H256 {
        let mut stream = RlpStream::new_list(9);
        self.transaction.rlp_append_fields(&mut stream);
        stream.append(&self.signature.v);
        stream.append(&self.signature.r);
        stream.append(&self.signature.s);
        H256::from(keccak256(stream.out()))
    }

    pub fn serialize(&self) -> Vec<u8> {
        WireTransaction::new(&self.transaction, &self.signature).to_bytes()
    }

    /// Parses a canonical serialization, signed or not. The embedded hash
    /// must match the fields.
    pub fn deserialize(serialized: &[u8]) -> Result<Self, Error> {
        let wire: WireTransaction = serde_json::from_slice(serialized)
            .map_err(|err| Error::TransactionDeserialize(err.to_string()))?;
        let claimed_hash = wire.hash;
        let transaction = Self::from(wire);

        let actual_hash = transaction.hash();
        if actual_hash != claimed_hash {
            return Err(Error::TransactionDeserialize(format!(
                "hash mismatch: serialized {claimed_hash:#x}, computed {actual_hash:#x}"
            )));
        }
        Ok(transaction)
    }
}

/// Field names and order of the serialized form.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct WireTransaction {
    nonce: U64,
    gas_price: U256,
    gas: U64,
    to: Option<Address>,
    value: U256,
    input: Bytes,
    v: U64,
    r: U256,
    s: U256,
    hash: H256,
}

impl WireTransaction {
    fn new(transaction: &UnsignedTransaction, signature: &Signature) -> Self {
        let signed = SignedTransaction {
            transaction: transaction.clone(),
            signature: *signature,
        };
        Self {
            nonce: transaction.nonce.into(),
            gas_price: transaction.gas_price,
            gas: transaction.gas_limit.into(),
            to: transaction.to,
            value: transaction.value,
            input: transaction.data.clone(),
            v: signature.v.into(),
            r: signature.r,
            s: signature.s,
            hash: signed.hash(),
        }
    }

    fn to_bytes(&self) -> Vec<u8> {
        // Only strings and hex quantities, which always serialize.
        serde_json::to_vec(self).expect("wire transaction always serializes")
    }
}

impl From<WireTransaction> for SignedTransaction {
    fn from(wire: WireTransaction) -> Self {
        Self {
            transaction: UnsignedTransaction {
                nonce: wire.nonce.as_u64(),
                gas_price: wire.gas_price,
                gas_limit: wire.gas.as_u64(),
                to: wire.to,
                value: wire.value,
                data: wire.input,
            },
            signature: Signature {
                v: wire.v.as_u64(),
                r: wire.r,
                s: wire.s,
            },
        }
    }
}
