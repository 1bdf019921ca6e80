//! Signed transactions
//!
//! Signing runs in two phases. [`signing_plan`] is pure: it fills each
//! signer slot's address from the owner set it indexes and expands aliases
//! into the concrete addresses that must sign, in credential order. The
//! plan is then executed against a synchronous [`Signer`] or an
//! [`AsyncSigner`], one digest signature per planned address.

use camino_params::ChainAlias;

use crate::address::Address;
use crate::codec::{cb58, Reader, Wire, Writer};
use crate::credential::Credential;
use crate::ids::Id;
use crate::input::SigIdx;
use crate::keys::{self, AsyncSigner, Signer};
use crate::multisig::MultisigAliasSet;
use crate::owners::OutputOwners;
use crate::registry::Registry;
use crate::tx::UnsignedTx;
use crate::{Error, Result};

/// `unsigned | credential_count | credentials`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tx {
    /// Signed payload
    pub unsigned: UnsignedTx,
    /// One credential per signer slot group
    pub credentials: Vec<Credential>,
}

impl Tx {
    /// Pair a payload with its credentials
    pub fn new(unsigned: UnsignedTx, credentials: Vec<Credential>) -> Self {
        Self {
            unsigned,
            credentials,
        }
    }

    /// Canonical signed bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut w = Writer::new();
        self.unsigned.write(&mut w)?;
        w.put_len(self.credentials.len());
        for c in &self.credentials {
            c.write(&mut w);
        }
        Ok(w.into_bytes())
    }

    /// Decode a signed transaction issued on `chain`
    pub fn from_bytes(chain: ChainAlias, b: &[u8]) -> Result<Self> {
        let reg = Registry::for_chain(chain);
        let mut r = Reader::new(b);
        let unsigned = UnsignedTx::read(&reg, &mut r)?;
        let n = r.read_len(8)?;
        let mut credentials = Vec::with_capacity(n);
        for _ in 0..n {
            credentials.push(Credential::read(&mut r)?);
        }
        r.finish()?;
        Ok(Self {
            unsigned,
            credentials,
        })
    }

    /// Transaction ID: SHA-256 of the signed bytes
    pub fn id(&self) -> Result<Id> {
        Ok(Id::hash_of(&self.to_bytes()?))
    }

    /// Signed bytes as cb58
    pub fn to_cb58(&self) -> Result<String> {
        Ok(cb58::encode(&self.to_bytes()?))
    }

    /// Parse cb58 signed bytes
    pub fn from_cb58(chain: ChainAlias, s: &str) -> Result<Self> {
        Self::from_bytes(chain, &cb58::decode(s)?)
    }

    /// Signed bytes as `0x`-prefixed hex
    pub fn to_hex(&self) -> Result<String> {
        Ok(format!("0x{}", hex::encode(self.to_bytes()?)))
    }

    /// Parse hex signed bytes, with or without `0x`
    pub fn from_hex(chain: ChainAlias, s: &str) -> Result<Self> {
        let body = s.strip_prefix("0x").unwrap_or(s);
        let bytes =
            hex::decode(body).map_err(|e| Error::InvalidEncoding(format!("invalid hex: {e}")))?;
        Self::from_bytes(chain, &bytes)
    }

    /// Check every credential against the owners of its slot group.
    ///
    /// `owners` is aligned with [`UnsignedTx::sig_groups`]. Each signature
    /// must recover to the address the resolution walk expects at its
    /// position, with only the recovered addresses allowed to count.
    pub fn verify(&self, owners: &[OutputOwners], aliases: &MultisigAliasSet) -> Result<()> {
        let groups = self.unsigned.sig_groups();
        if groups.len() != self.credentials.len() || groups.len() != owners.len() {
            return Err(Error::InvalidTransaction(format!(
                "{} signer groups, {} credentials, {} owner sets",
                groups.len(),
                self.credentials.len(),
                owners.len()
            )));
        }
        let digest = self.unsigned.digest()?;

        for (i, ((group, cred), owner)) in groups.iter().zip(&self.credentials).zip(owners).enumerate() {
            let recovered = cred
                .signatures
                .iter()
                .map(|sig| keys::recover(&digest, sig).map(|pk| Address::from_public_key(&pk)))
                .collect::<Result<Vec<_>>>()?;

            let root = root_slots(group, owner)?;
            let mut scoped = aliases.clone();
            scoped.restrict_to(recovered.iter().copied());
            let expected: Vec<Address> = scoped
                .resolve(&root, false)?
                .into_iter()
                .map(|s| s.source)
                .collect();

            if expected != recovered {
                return Err(Error::TransactionSigning(format!(
                    "credential {i} has {} signatures, expected signers {:?}",
                    recovered.len(),
                    expected
                )));
            }
        }
        Ok(())
    }
}

/// Slots with their addresses taken from the owner set they index
fn root_slots(group: &[SigIdx], owner: &OutputOwners) -> Result<Vec<SigIdx>> {
    group
        .iter()
        .map(|slot| {
            owner
                .addresses()
                .get(slot.address_index as usize)
                .map(|a| SigIdx::new(slot.address_index, *a))
                .ok_or_else(|| {
                    Error::InvalidTransaction(format!(
                        "signer index {} out of range for {} owners",
                        slot.address_index,
                        owner.addresses().len()
                    ))
                })
        })
        .collect()
}

/// Concrete addresses that must sign, one list per credential.
///
/// Aliases are resolved with only `signers` allowed to count.
pub fn signing_plan(
    unsigned: &UnsignedTx,
    owners: &[OutputOwners],
    aliases: &MultisigAliasSet,
    signers: &[Address],
) -> Result<Vec<Vec<Address>>> {
    let groups = unsigned.sig_groups();
    if groups.len() != owners.len() {
        return Err(Error::TransactionSigning(format!(
            "{} signer groups but {} owner sets",
            groups.len(),
            owners.len()
        )));
    }
    let mut scoped = aliases.clone();
    scoped.restrict_to(signers.iter().copied());

    groups
        .iter()
        .zip(owners)
        .map(|(group, owner)| {
            let root = root_slots(group, owner)?;
            Ok(scoped
                .resolve(&root, false)?
                .into_iter()
                .map(|s| s.source)
                .collect())
        })
        .collect()
}

/// Sign with a synchronous key provider
pub fn sign<S: Signer + ?Sized>(
    unsigned: UnsignedTx,
    owners: &[OutputOwners],
    aliases: &MultisigAliasSet,
    signer: &S,
) -> Result<Tx> {
    let plan = signing_plan(&unsigned, owners, aliases, &signer.addresses())?;
    let digest = unsigned.digest()?;
    let mut credentials = Vec::with_capacity(plan.len());
    for addresses in plan {
        let mut cred = Credential::default();
        for address in addresses {
            cred.add_signature(signer.sign(&digest, &address)?);
        }
        credentials.push(cred);
    }
    tracing::info!(
        "Signed {} transaction with {} credentials",
        unsigned.kind(),
        credentials.len()
    );
    Ok(Tx::new(unsigned, credentials))
}

/// Sign with an asynchronous key provider, awaiting one signature at a time
pub async fn sign_async<S: AsyncSigner + ?Sized>(
    unsigned: UnsignedTx,
    owners: &[OutputOwners],
    aliases: &MultisigAliasSet,
    signer: &S,
) -> Result<Tx> {
    let plan = signing_plan(&unsigned, owners, aliases, &signer.signing_addresses())?;
    let digest = unsigned.digest()?;
    let mut credentials = Vec::with_capacity(plan.len());
    for addresses in plan {
        let mut cred = Credential::default();
        for address in addresses {
            cred.add_signature(signer.sign_async(digest, address).await?);
        }
        credentials.push(cred);
    }
    tracing::info!(
        "Signed {} transaction with {} credentials",
        unsigned.kind(),
        credentials.len()
    );
    Ok(Tx::new(unsigned, credentials))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Input, TransferableInput};
    use crate::keys::KeyChain;
    use crate::memo::Memo;
    use crate::output::{Output, TransferableOutput};
    use crate::tx::{BaseTx, TxBody};

    fn spend(owner: &OutputOwners, signers: &[Address]) -> UnsignedTx {
        let asset = Id::hash_of(b"CAM");
        let mut input = Input::transfer(100);
        for a in owner.get_spenders(signers, u64::MAX) {
            if let Some(i) = owner.address_index(&a) {
                input.add_signature_idx(i, a);
            }
        }
        UnsignedTx::new(
            ChainAlias::X,
            TxBody::Base(BaseTx::new(
                1002,
                Id::hash_of(b"X"),
                vec![TransferableOutput::new(
                    asset,
                    Output::transfer(90, OutputOwners::single(Address::test_address(9))),
                )],
                vec![TransferableInput::new(Id::hash_of(b"u"), 0, asset, input)],
                Memo::Empty,
            )),
        )
    }

    #[test]
    fn test_sign_verify_decode() {
        let mut kc = KeyChain::new();
        let a = kc.make_key();
        let b = kc.make_key();
        let owner = OutputOwners::new(&[a, b], 0, 2).unwrap();
        let unsigned = spend(&owner, &[a, b]);

        let aliases = MultisigAliasSet::new();
        let tx = sign(unsigned, &[owner.clone()], &aliases, &kc).unwrap();
        assert_eq!(tx.credentials.len(), 1);
        assert_eq!(tx.credentials[0].len(), 2);
        tx.verify(&[owner.clone()], &aliases).unwrap();

        let bytes = tx.to_bytes().unwrap();
        let decoded = Tx::from_bytes(ChainAlias::X, &bytes).unwrap();
        assert_eq!(decoded.to_bytes().unwrap(), bytes);
        assert_eq!(decoded.id().unwrap(), tx.id().unwrap());
        decoded.verify(&[owner], &aliases).unwrap();

        let cb = tx.to_cb58().unwrap();
        assert_eq!(Tx::from_cb58(ChainAlias::X, &cb).unwrap().id().unwrap(), tx.id().unwrap());
        let hx = tx.to_hex().unwrap();
        assert_eq!(Tx::from_hex(ChainAlias::X, &hx).unwrap().to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_verify_rejects_wrong_signer() {
        let mut kc = KeyChain::new();
        let a = kc.make_key();
        let owner = OutputOwners::single(a);
        let unsigned = spend(&owner, &[a]);
        let aliases = MultisigAliasSet::new();
        let mut tx = sign(unsigned, &[owner.clone()], &aliases, &kc).unwrap();

        let mut other = KeyChain::new();
        other.make_key();
        let digest = tx.unsigned.digest().unwrap();
        let forged = other.sign(&digest, &other.addresses()[0]).unwrap();
        tx.credentials[0] = Credential::new(vec![forged]);
        assert!(tx.verify(&[owner], &aliases).is_err());
    }

    #[test]
    fn test_missing_key_fails_plan() {
        let mut kc = KeyChain::new();
        let a = kc.make_key();
        let b = Address::test_address(50);
        let owner = OutputOwners::new(&[a, b], 0, 2).unwrap();
        let unsigned = spend(&owner, &[a, b]);
        let err = sign(unsigned, &[owner], &MultisigAliasSet::new(), &kc).unwrap_err();
        assert!(matches!(err, Error::NotEnoughSignatures(_)));
    }

    #[test]
    fn test_alias_expands_credential() {
        let mut kc = KeyChain::new();
        let a = kc.make_key();
        let b = kc.make_key();
        let m = Address::test_address(77);
        let owner = OutputOwners::single(m);
        let mut aliases = MultisigAliasSet::new();
        aliases.add_alias(m, OutputOwners::new(&[a, b], 0, 2).unwrap());

        let unsigned = spend(&owner, &[m]);
        let tx = sign(unsigned, &[owner.clone()], &aliases, &kc).unwrap();
        assert_eq!(tx.credentials[0].len(), 2);
        tx.verify(&[owner], &aliases).unwrap();
    }

    #[tokio::test]
    async fn test_sign_async_matches_sync() {
        let mut kc = KeyChain::new();
        let a = kc.make_key();
        let owner = OutputOwners::single(a);
        let aliases = MultisigAliasSet::new();
        let sync = sign(spend(&owner, &[a]), &[owner.clone()], &aliases, &kc).unwrap();
        let asynchronous = sign_async(spend(&owner, &[a]), &[owner.clone()], &aliases, &kc)
            .await
            .unwrap();
        // RFC 6979 nonces make signatures deterministic.
        assert_eq!(sync.to_bytes().unwrap(), asynchronous.to_bytes().unwrap());
    }
}
