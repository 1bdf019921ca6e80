//! Node client seam
//!
//! Fetching UTXOs and submitting transactions is left to the embedding
//! application; builders only need the UTXO set and signed bytes.

use async_trait::async_trait;
use camino_params::ChainAlias;

use crate::address::Address;
use crate::ids::Id;
use crate::tx::Tx;
use crate::utxo::UtxoSet;
use crate::{Error, Result};

/// Access to a Camino node.
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// UTXOs owned by `addresses`. With `source_chain` set, the atomic UTXOs
    /// exported from that chain to this one.
    async fn get_utxos(&self, addresses: &[Address], source_chain: Option<ChainAlias>) -> Result<UtxoSet>;

    /// Submit signed transaction bytes, returning the ID the node assigned
    async fn issue_tx(&self, bytes: Vec<u8>) -> Result<Id>;
}

/// Serialize and submit `tx`, checking the node agrees on its ID.
pub async fn issue_tx<C: NodeClient + ?Sized>(client: &C, tx: &Tx) -> Result<Id> {
    let bytes = tx.to_bytes()?;
    let expected = Id::hash_of(&bytes);
    let len = bytes.len();
    let id = client.issue_tx(bytes).await?;
    if id != expected {
        return Err(Error::BroadcastFailed(format!(
            "node returned ID {id}, expected {expected}"
        )));
    }
    tracing::info!("Issued {} transaction {} ({} bytes)", tx.unsigned.kind(), id, len);
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::SpendOptions;
    use crate::ids::Id;
    use crate::keys::KeyChain;
    use crate::multisig::MultisigAliasSet;
    use crate::output::Output;
    use crate::owners::OutputOwners;
    use crate::utxo::Utxo;
    use crate::TxBuilder;
    use camino_params::ConsensusParams;
    use std::sync::Mutex;

    struct MockNode {
        utxos: UtxoSet,
        issued: Mutex<Vec<Vec<u8>>>,
        tamper: bool,
    }

    #[async_trait]
    impl NodeClient for MockNode {
        async fn get_utxos(&self, addresses: &[Address], source_chain: Option<ChainAlias>) -> Result<UtxoSet> {
            if source_chain.is_some() {
                return Ok(UtxoSet::new());
            }
            Ok(UtxoSet::from_utxos(self.utxos.owned_by(addresses).cloned()))
        }

        async fn issue_tx(&self, bytes: Vec<u8>) -> Result<Id> {
            let mut id = Id::hash_of(&bytes);
            if self.tamper {
                id = Id::hash_of(id.as_bytes());
            }
            self.issued
                .lock()
                .map_err(|_| Error::Network("mock poisoned".to_string()))?
                .push(bytes);
            Ok(id)
        }
    }

    async fn signed_tx(node: &MockNode, kc: &KeyChain, sender: Address) -> Tx {
        let cam = Id::hash_of(b"CAM");
        let b = TxBuilder::new(ConsensusParams::local(), ChainAlias::X, Id::hash_of(b"X"), cam).with_tx_fee(100);
        let utxos = node.get_utxos(&[sender], None).await.unwrap();
        let opts = SpendOptions::new(&[sender], &[sender], 1);
        b.build_base_tx(&utxos, &opts, cam, 500, &[Address::test_address(9)], 1, 0)
            .unwrap()
            .sign_async(kc, &MultisigAliasSet::new())
            .await
            .unwrap()
    }

    fn node(sender: Address, tamper: bool) -> MockNode {
        let utxo = Utxo::new(
            Id::hash_of(b"funding"),
            0,
            Id::hash_of(b"CAM"),
            Output::transfer(10_000, OutputOwners::single(sender)),
        );
        MockNode {
            utxos: UtxoSet::from_utxos([utxo]),
            issued: Mutex::new(Vec::new()),
            tamper,
        }
    }

    #[tokio::test]
    async fn test_issue_tx() {
        let mut kc = KeyChain::new();
        let sender = kc.make_key();
        let node = node(sender, false);
        let tx = signed_tx(&node, &kc, sender).await;

        let id = issue_tx(&node, &tx).await.unwrap();
        assert_eq!(id, tx.id().unwrap());
        let issued = node.issued.lock().unwrap();
        assert_eq!(issued.len(), 1);
        assert_eq!(issued[0], tx.to_bytes().unwrap());
    }

    #[tokio::test]
    async fn test_issue_tx_id_mismatch() {
        let mut kc = KeyChain::new();
        let sender = kc.make_key();
        let node = node(sender, true);
        let tx = signed_tx(&node, &kc, sender).await;
        assert!(matches!(
            issue_tx(&node, &tx).await,
            Err(Error::BroadcastFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_no_atomic_utxos() {
        let node = node(Address::test_address(1), false);
        let atomic = node
            .get_utxos(&[Address::test_address(1)], Some(ChainAlias::P))
            .await
            .unwrap();
        assert!(atomic.is_empty());
    }
}
