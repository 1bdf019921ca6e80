//! cb58: base58 with a 4-byte SHA-256 checksum suffix.
//!
//! The checksum is the last four bytes of `SHA-256(payload)`.

use sha2::{Digest, Sha256};

use crate::{Error, Result};

const CHECKSUM_LEN: usize = 4;

fn checksum(payload: &[u8]) -> [u8; CHECKSUM_LEN] {
    let digest = Sha256::digest(payload);
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&digest[digest.len() - CHECKSUM_LEN..]);
    out
}

/// Encode bytes as cb58
pub fn encode(payload: &[u8]) -> String {
    let mut data = Vec::with_capacity(payload.len() + CHECKSUM_LEN);
    data.extend_from_slice(payload);
    data.extend_from_slice(&checksum(payload));
    bs58::encode(data)
        .with_alphabet(bs58::Alphabet::BITCOIN)
        .into_string()
}

/// Decode a cb58 string, verifying the checksum
pub fn decode(s: &str) -> Result<Vec<u8>> {
    let data = bs58::decode(s)
        .with_alphabet(bs58::Alphabet::BITCOIN)
        .into_vec()
        .map_err(|e| Error::InvalidEncoding(format!("invalid base58: {e}")))?;

    if data.len() < CHECKSUM_LEN {
        return Err(Error::InvalidEncoding(
            "cb58 data too short for checksum".to_string(),
        ));
    }

    let (payload, check) = data.split_at(data.len() - CHECKSUM_LEN);
    if check != checksum(payload) {
        return Err(Error::InvalidChecksum(format!("cb58 checksum mismatch for {s}")));
    }
    Ok(payload.to_vec())
}
