//! Signatures and the credentials that carry them.

use std::fmt;

use crate::codec::{Reader, Wire, Writer};
use crate::{Error, Result};

/// SECP256K1 credential type ID
pub const SECP_CREDENTIAL_ID: u32 = 9;

/// Length of a recoverable signature (`r | s | v`)
pub const SIGNATURE_LEN: usize = 65;

/// A 65-byte recoverable secp256k1 signature.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature(pub [u8; SIGNATURE_LEN]);

impl Signature {
    /// Parse from exactly 65 bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; SIGNATURE_LEN] = bytes.try_into().map_err(|_| {
            Error::TransactionSigning(format!("signature must be 65 bytes, got {}", bytes.len()))
        })?;
        Ok(Self(arr))
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LEN] {
        &self.0
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", hex::encode(self.0))
    }
}

impl Wire for Signature {
    fn write(&self, w: &mut Writer) {
        w.put_bytes(&self.0);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self(r.read_array()?))
    }
}

/// Signatures for one input (or one authorization), in signer-slot order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Credential {
    /// Signatures, one per registered signer slot
    pub signatures: Vec<Signature>,
}

impl Credential {
    /// Credential with the given signatures
    pub fn new(signatures: Vec<Signature>) -> Self {
        Self { signatures }
    }

    /// Append a signature
    pub fn add_signature(&mut self, sig: Signature) {
        self.signatures.push(sig);
    }

    /// Number of signatures
    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    /// Whether there are no signatures
    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}

impl Wire for Credential {
    fn write(&self, w: &mut Writer) {
        w.put_u32(SECP_CREDENTIAL_ID);
        w.put_len(self.signatures.len());
        for s in &self.signatures {
            s.write(w);
        }
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        let type_id = r.read_u32()?;
        if type_id != SECP_CREDENTIAL_ID {
            return Err(Error::UnrecognizedType {
                kind: "credential",
                type_id,
            });
        }
        let n = r.read_len(SIGNATURE_LEN)?;
        let mut signatures = Vec::with_capacity(n);
        for _ in 0..n {
            signatures.push(Signature::read(r)?);
        }
        Ok(Self { signatures })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_layout() {
        let cred = Credential::new(vec![Signature([1u8; 65]), Signature([2u8; 65])]);
        let bytes = cred.to_bytes();
        assert_eq!(&bytes[..4], &SECP_CREDENTIAL_ID.to_be_bytes());
        assert_eq!(&bytes[4..8], &2u32.to_be_bytes());
        assert_eq!(bytes.len(), 8 + 130);
        assert_eq!(Credential::from_bytes(&bytes).unwrap(), cred);
    }

    #[test]
    fn test_wrong_credential_type() {
        let mut w = Writer::new();
        w.put_u32(7);
        w.put_u32(0);
        assert!(matches!(
            Credential::from_bytes(&w.into_bytes()),
            Err(Error::UnrecognizedType { kind: "credential", type_id: 7 })
        ));
    }

    #[test]
    fn test_signature_length() {
        assert!(Signature::from_slice(&[0u8; 64]).is_err());
    }
}
