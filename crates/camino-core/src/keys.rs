//! secp256k1 key material and signers
//!
//! Keys sign the SHA-256 digest of a transaction's unsigned bytes with
//! recoverable ECDSA. The 65-byte signature is `r | s | recovery id`, which
//! lets a verifier recover the public key and compare its address against
//! the spent output's owners.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use camino_params::ChainAlias;
use rand::RngCore;
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};

use crate::address::Address;
use crate::codec::cb58;
use crate::credential::Signature;
use crate::{Error, Result};

/// Prefix of rendered private keys
pub const PRIVATE_KEY_PREFIX: &str = "PrivateKey-";

/// A secp256k1 key pair.
#[derive(Clone)]
pub struct KeyPair {
    secret: SecretKey,
    public: PublicKey,
}

impl KeyPair {
    /// Generate a fresh random key
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        loop {
            let mut bytes = [0u8; 32];
            rng.fill_bytes(&mut bytes);
            // Out-of-range scalars are astronomically rare; draw again.
            if let Ok(kp) = Self::from_secret_bytes(&bytes) {
                return kp;
            }
        }
    }

    /// Key pair from a 32-byte secret
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self> {
        let secret = SecretKey::from_slice(bytes)
            .map_err(|e| Error::InvalidKey(format!("invalid secret key: {e}")))?;
        let public = PublicKey::from_secret_key(&Secp256k1::signing_only(), &secret);
        Ok(Self { secret, public })
    }

    /// Parse `PrivateKey-<cb58>`
    pub fn from_private_key_string(s: &str) -> Result<Self> {
        let body = s.strip_prefix(PRIVATE_KEY_PREFIX).ok_or_else(|| {
            Error::InvalidKey(format!("private key must start with {PRIVATE_KEY_PREFIX}"))
        })?;
        Self::from_secret_bytes(&cb58::decode(body)?)
    }

    /// Render as `PrivateKey-<cb58>`
    pub fn to_private_key_string(&self) -> String {
        format!("{}{}", PRIVATE_KEY_PREFIX, cb58::encode(&self.secret.secret_bytes()))
    }

    /// Public key
    pub fn public_key(&self) -> PublicKey {
        self.public
    }

    /// Address of the public key
    pub fn address(&self) -> Address {
        Address::from_public_key(&self.public)
    }

    /// Rendered address for a chain
    pub fn address_string(&self, chain: ChainAlias, hrp: &str) -> Result<String> {
        self.address().to_bech32(chain, hrp)
    }

    /// Sign a 32-byte digest
    pub fn sign(&self, digest: &[u8; 32]) -> Result<Signature> {
        let msg = Message::from_slice(digest)
            .map_err(|e| Error::TransactionSigning(format!("invalid digest: {e}")))?;
        let sig = Secp256k1::signing_only().sign_ecdsa_recoverable(&msg, &self.secret);
        let (recid, compact) = sig.serialize_compact();
        let mut out = [0u8; 65];
        out[..64].copy_from_slice(&compact);
        out[64] = recid.to_i32() as u8;
        Ok(Signature(out))
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

/// Recover the public key that produced `sig` over `digest`
pub fn recover(digest: &[u8; 32], sig: &Signature) -> Result<PublicKey> {
    let msg = Message::from_slice(digest)
        .map_err(|e| Error::TransactionSigning(format!("invalid digest: {e}")))?;
    let recid = RecoveryId::from_i32(i32::from(sig.0[64]))
        .map_err(|e| Error::TransactionSigning(format!("invalid recovery id: {e}")))?;
    let rsig = RecoverableSignature::from_compact(&sig.0[..64], recid)
        .map_err(|e| Error::TransactionSigning(format!("invalid signature: {e}")))?;
    Secp256k1::verification_only()
        .recover_ecdsa(&msg, &rsig)
        .map_err(|e| Error::TransactionSigning(format!("signature recovery failed: {e}")))
}

/// Whether `sig` over `digest` was made by the key behind `address`
pub fn verify(digest: &[u8; 32], sig: &Signature, address: &Address) -> bool {
    recover(digest, sig).is_ok_and(|pk| Address::from_public_key(&pk) == *address)
}

/// Key-material provider used while signing.
pub trait Signer {
    /// Sign `digest` as `address`
    fn sign(&self, digest: &[u8; 32], address: &Address) -> Result<Signature>;

    /// Public key behind `address`
    fn public_key(&self, address: &Address) -> Result<PublicKey>;

    /// Every address this signer can produce signatures for
    fn addresses(&self) -> Vec<Address>;

    /// Whether this signer can sign as `address`
    fn has_key(&self, address: &Address) -> bool {
        self.addresses().contains(address)
    }
}

/// Asynchronous key-material provider (hardware wallets, remote signers).
#[async_trait]
pub trait AsyncSigner: Send + Sync {
    /// Sign `digest` as `address`
    async fn sign_async(&self, digest: [u8; 32], address: Address) -> Result<Signature>;

    /// Every address this signer can produce signatures for
    fn signing_addresses(&self) -> Vec<Address>;
}

#[async_trait]
impl<T: Signer + Send + Sync> AsyncSigner for T {
    async fn sign_async(&self, digest: [u8; 32], address: Address) -> Result<Signature> {
        self.sign(&digest, &address)
    }

    fn signing_addresses(&self) -> Vec<Address> {
        self.addresses()
    }
}

/// In-memory key chain, optionally holding signatures supplied by other
/// multisig participants.
#[derive(Debug, Clone, Default)]
pub struct KeyChain {
    keys: HashMap<Address, KeyPair>,
    presigned: HashMap<Address, Signature>,
}

impl KeyChain {
    /// Empty key chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key, returning its address
    pub fn add_key(&mut self, key: KeyPair) -> Address {
        let address = key.address();
        self.keys.insert(address, key);
        address
    }

    /// Import a `PrivateKey-<cb58>` string
    pub fn import_key(&mut self, s: &str) -> Result<Address> {
        Ok(self.add_key(KeyPair::from_private_key_string(s)?))
    }

    /// Generate and add a fresh key
    pub fn make_key(&mut self) -> Address {
        self.add_key(KeyPair::generate())
    }

    /// Look up a key
    pub fn get(&self, address: &Address) -> Option<&KeyPair> {
        self.keys.get(address)
    }

    /// Remove a key
    pub fn remove_key(&mut self, address: &Address) -> Option<KeyPair> {
        self.keys.remove(address)
    }

    /// Export a key as `PrivateKey-<cb58>`
    pub fn export_key(&self, address: &Address) -> Result<String> {
        self.keys
            .get(address)
            .map(KeyPair::to_private_key_string)
            .ok_or_else(|| Error::MissingKey(format!("no key for {address}")))
    }

    /// Supply a signature made elsewhere for the transaction being signed
    pub fn add_signature(&mut self, address: Address, sig: Signature) {
        self.presigned.insert(address, sig);
    }

    /// Drop all supplied signatures
    pub fn clear_signatures(&mut self) {
        self.presigned.clear();
    }
}

impl Signer for KeyChain {
    fn sign(&self, digest: &[u8; 32], address: &Address) -> Result<Signature> {
        if let Some(sig) = self.presigned.get(address) {
            return Ok(*sig);
        }
        self.keys
            .get(address)
            .ok_or_else(|| Error::MissingKey(format!("no key or signature for {address}")))?
            .sign(digest)
    }

    fn public_key(&self, address: &Address) -> Result<PublicKey> {
        self.keys
            .get(address)
            .map(KeyPair::public_key)
            .ok_or_else(|| Error::MissingKey(format!("no key for {address}")))
    }

    fn addresses(&self) -> Vec<Address> {
        let mut out: Vec<Address> = self
            .keys
            .keys()
            .chain(self.presigned.keys())
            .copied()
            .collect();
        out.sort();
        out.dedup();
        out
    }

    fn has_key(&self, address: &Address) -> bool {
        self.keys.contains_key(address) || self.presigned.contains_key(address)
    }
}
