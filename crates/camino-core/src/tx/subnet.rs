//! Subnet management transactions and the authorization record shared by
//! every kind that needs signatures beyond input ownership.

use crate::codec::{Reader, Wire, Writer};
use crate::ids::Id;
use crate::input::SigIdx;
use crate::output::SECP_OWNER_OUTPUT_ID;
use crate::owners::OutputOwners;
use crate::registry::Registry;
use crate::tx::base::BaseTx;
use crate::{Error, Result};

/// Subnet / owner authorization type ID
pub const SUBNET_AUTH_ID: u32 = 10;

/// Signer slots proving control of an owner set that is not an input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubnetAuth {
    /// Signer slots, indexing the authorizing owner set
    pub sig_idxs: Vec<SigIdx>,
}

impl SubnetAuth {
    /// Auth with the given slots
    pub fn new(sig_idxs: Vec<SigIdx>) -> Self {
        Self { sig_idxs }
    }

    /// Register a signer slot
    pub fn add_signature_idx(&mut self, address_index: u32, source: crate::address::Address) {
        self.sig_idxs.push(SigIdx::new(address_index, source));
    }
}

impl Wire for SubnetAuth {
    fn write(&self, w: &mut Writer) {
        w.put_u32(SUBNET_AUTH_ID);
        SigIdx::write_list(&self.sig_idxs, w);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        let type_id = r.read_u32()?;
        if type_id != SUBNET_AUTH_ID {
            return Err(Error::UnrecognizedType {
                kind: "auth",
                type_id,
            });
        }
        Ok(Self {
            sig_idxs: SigIdx::read_list(r)?,
        })
    }
}

/// Write an owner set tagged as a SECP owner output
pub(crate) fn write_owner(owners: &OutputOwners, w: &mut Writer) {
    w.put_u32(SECP_OWNER_OUTPUT_ID);
    owners.write(w);
}

pub(crate) fn read_owner(r: &mut Reader<'_>) -> Result<OutputOwners> {
    let type_id = r.read_u32()?;
    if type_id != SECP_OWNER_OUTPUT_ID {
        return Err(Error::UnrecognizedType {
            kind: "owner",
            type_id,
        });
    }
    OutputOwners::read(r)
}

/// Create a subnet controlled by `owner`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSubnetTx {
    /// Fee-paying base
    pub base: BaseTx,
    /// Subnet control keys
    pub owner: OutputOwners,
}

impl CreateSubnetTx {
    pub(crate) fn write(&self, w: &mut Writer) {
        self.base.write(w);
        write_owner(&self.owner, w);
    }

    pub(crate) fn read(reg: &Registry, r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            base: BaseTx::read(reg, r)?,
            owner: read_owner(r)?,
        })
    }
}

/// Create a blockchain on a subnet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateChainTx {
    /// Fee-paying base
    pub base: BaseTx,
    /// Subnet the chain belongs to
    pub subnet_id: Id,
    /// Human-readable chain name
    pub chain_name: String,
    /// VM the chain runs
    pub vm_id: Id,
    /// Feature extensions
    pub fx_ids: Vec<Id>,
    /// Genesis state
    pub genesis_data: Vec<u8>,
    /// Proof of subnet control
    pub subnet_auth: SubnetAuth,
}

impl CreateChainTx {
    pub(crate) fn write(&self, w: &mut Writer) -> Result<()> {
        self.base.write(w);
        self.subnet_id.write(w);
        w.put_str(&self.chain_name)?;
        self.vm_id.write(w);
        w.put_len(self.fx_ids.len());
        for fx in &self.fx_ids {
            fx.write(w);
        }
        w.put_blob(&self.genesis_data);
        self.subnet_auth.write(w);
        Ok(())
    }

    pub(crate) fn read(reg: &Registry, r: &mut Reader<'_>) -> Result<Self> {
        let base = BaseTx::read(reg, r)?;
        let subnet_id = Id::read(r)?;
        let chain_name = r.read_str()?;
        let vm_id = Id::read(r)?;
        let n = r.read_len(32)?;
        let mut fx_ids = Vec::with_capacity(n);
        for _ in 0..n {
            fx_ids.push(Id::read(r)?);
        }
        let genesis_data = r.read_blob()?;
        let subnet_auth = SubnetAuth::read(r)?;
        Ok(Self {
            base,
            subnet_id,
            chain_name,
            vm_id,
            fx_ids,
            genesis_data,
            subnet_auth,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Address;

    #[test]
    fn test_subnet_auth_layout() {
        let mut auth = SubnetAuth::default();
        auth.add_signature_idx(0, Address::test_address(1));
        auth.add_signature_idx(2, Address::test_address(3));
        let bytes = auth.to_bytes();
        assert_eq!(
            bytes,
            vec![0, 0, 0, 10, 0, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 2]
        );
        let back = SubnetAuth::from_bytes(&bytes).unwrap();
        assert_eq!(back.sig_idxs.len(), 2);
        assert_eq!(back.sig_idxs[1].address_index, 2);
    }

    #[test]
    fn test_owner_tag_checked() {
        let mut w = Writer::new();
        w.put_u32(7);
        OutputOwners::single(Address::test_address(1)).write(&mut w);
        let bytes = w.into_bytes();
        assert!(matches!(
            read_owner(&mut Reader::new(&bytes)),
            Err(Error::UnrecognizedType { kind: "owner", type_id: 7 })
        ));
    }
}
