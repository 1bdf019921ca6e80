//! Multisig alias resolution
//!
//! An alias is an address that stands for an owner policy rather than a key.
//! Policies may name other aliases, so signing an input owned by an alias
//! means walking the alias graph down to concrete keys, checking every
//! threshold on the way back up.
//!
//! The walk is an iterative depth-first traversal over an explicit stack so
//! the signature budget bounds both signer count and depth, and a cycle in the
//! alias graph is reported rather than followed.

use std::collections::{HashMap, HashSet};

use crate::address::Address;
use crate::input::SigIdx;
use crate::owners::OutputOwners;
use crate::{Error, Result};

/// Upper bound on concrete signatures and on alias nesting depth
pub const MAX_SIGNATURES: usize = 256;

/// Alias policies plus the set of addresses that can actually sign.
#[derive(Debug, Clone, Default)]
pub struct MultisigAliasSet {
    aliases: HashMap<Address, OutputOwners>,
    restrict_to: Option<HashSet<Address>>,
}

struct Frame {
    alias: Option<Address>,
    addresses: Vec<Address>,
    // Wire indices of root slots; alias members use their list position.
    root_indices: Option<Vec<u32>>,
    threshold: u32,
    next: usize,
    verified: u32,
}

impl Frame {
    fn root(slots: &[SigIdx]) -> Self {
        Self {
            alias: None,
            addresses: slots.iter().map(|s| s.source).collect(),
            root_indices: Some(slots.iter().map(|s| s.address_index).collect()),
            threshold: slots.len() as u32,
            next: 0,
            verified: 0,
        }
    }

    fn alias(alias: Address, policy: &OutputOwners) -> Self {
        Self {
            alias: Some(alias),
            addresses: policy.addresses().to_vec(),
            root_indices: None,
            threshold: policy.threshold,
            next: 0,
            verified: 0,
        }
    }

    fn index_of(&self, position: usize) -> u32 {
        match &self.root_indices {
            Some(indices) => indices[position],
            None => position as u32,
        }
    }

    fn describe(&self) -> String {
        match &self.alias {
            Some(a) => format!("alias {a}"),
            None => "transaction signers".to_string(),
        }
    }
}

impl MultisigAliasSet {
    /// Empty set with no signer restriction
    pub fn new() -> Self {
        Self::default()
    }

    /// Set from alias policies and an optional signer restriction
    pub fn from_aliases(
        aliases: impl IntoIterator<Item = (Address, OutputOwners)>,
        restrict_to: Option<HashSet<Address>>,
    ) -> Self {
        Self {
            aliases: aliases.into_iter().collect(),
            restrict_to,
        }
    }

    /// Add or replace an alias policy
    pub fn add_alias(&mut self, alias: Address, policy: OutputOwners) {
        self.aliases.insert(alias, policy);
    }

    /// Only count concrete signers in `addresses`
    pub fn restrict_to(&mut self, addresses: impl IntoIterator<Item = Address>) {
        self.restrict_to = Some(addresses.into_iter().collect());
    }

    /// Whether `address` is an alias
    pub fn is_alias(&self, address: &Address) -> bool {
        self.aliases.contains_key(address)
    }

    /// Policy of an alias
    pub fn policy(&self, alias: &Address) -> Option<&OutputOwners> {
        self.aliases.get(alias)
    }

    fn allows(&self, address: &Address) -> bool {
        self.restrict_to
            .as_ref()
            .map_or(true, |set| set.contains(address))
    }

    /// Expand the signer slots of one input into concrete signer slots.
    ///
    /// Every root slot must be satisfied: a concrete address counts if it is
    /// allowed to sign, an alias counts once its own threshold is met.
    /// Returns concrete slots in encounter order. With `dry_run` the walk
    /// and its checks still run, but `root` is returned unchanged.
    pub fn resolve(&self, root: &[SigIdx], dry_run: bool) -> Result<Vec<SigIdx>> {
        let mut resolved = Vec::new();
        let mut on_path: HashSet<Address> = HashSet::new();
        let mut signatures = 0usize;
        let mut stack = vec![Frame::root(root)];

        loop {
            let depth = stack.len();
            let Some(frame) = stack.last_mut() else {
                break;
            };

            let mut descend = None;
            while frame.next < frame.addresses.len() && frame.verified < frame.threshold {
                let position = frame.next;
                frame.next += 1;
                let address = frame.addresses[position];

                if let Some(policy) = self.aliases.get(&address) {
                    if policy.threshold == 0 {
                        tracing::debug!("Skipping placeholder alias {}", address);
                        continue;
                    }
                    if on_path.contains(&address) {
                        return Err(Error::CyclicAlias(format!(
                            "alias {address} is reachable from itself"
                        )));
                    }
                    descend = Some((address, policy));
                    break;
                }

                if self.allows(&address) {
                    signatures += 1;
                    if signatures > MAX_SIGNATURES {
                        return Err(Error::TooManySignatures(format!(
                            "more than {MAX_SIGNATURES} signatures resolving {}",
                            frame.describe()
                        )));
                    }
                    frame.verified += 1;
                    resolved.push(SigIdx::new(frame.index_of(position), address));
                }
            }

            if let Some((alias, policy)) = descend {
                if depth >= MAX_SIGNATURES {
                    return Err(Error::TooManySignatures(format!(
                        "alias nesting deeper than {MAX_SIGNATURES} at {alias}"
                    )));
                }
                tracing::debug!(
                    "Descending into alias {} ({}-of-{})",
                    alias,
                    policy.threshold,
                    policy.addresses().len()
                );
                on_path.insert(alias);
                stack.push(Frame::alias(alias, policy));
                continue;
            }

            if frame.verified < frame.threshold {
                return Err(Error::NotEnoughSignatures(format!(
                    "{} needs {} signatures, found {}",
                    frame.describe(),
                    frame.threshold,
                    frame.verified
                )));
            }

            if let Some(done) = stack.pop() {
                if let Some(alias) = done.alias {
                    on_path.remove(&alias);
                }
            }
            // A satisfied alias is one signer of its parent.
            if let Some(parent) = stack.last_mut() {
                parent.verified += 1;
            }
        }

        if dry_run {
            return Ok(root.to_vec());
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u8) -> Address {
        Address::test_address(n)
    }

    fn slots(owners: &OutputOwners, signers: &[Address]) -> Vec<SigIdx> {
        owners
            .get_spenders(signers, u64::MAX)
            .into_iter()
            .filter_map(|a| owners.address_index(&a).map(|i| SigIdx::new(i, a)))
            .collect()
    }

    #[test]
    fn test_concrete_signers_keep_root_indices() {
        let owners = OutputOwners::new(&[addr(1), addr(2), addr(3)], 0, 2).unwrap();
        let root = slots(&owners, &[addr(1), addr(3)]);
        let mut set = MultisigAliasSet::new();
        set.restrict_to([addr(1), addr(3)]);

        let resolved = set.resolve(&root, false).unwrap();
        assert_eq!(resolved, vec![SigIdx::new(0, addr(1)), SigIdx::new(2, addr(3))]);
    }

    #[test]
    fn test_alias_members_use_policy_positions() {
        let m = addr(10);
        let policy = OutputOwners::new(&[addr(1), addr(2), addr(3)], 0, 2).unwrap();
        let set = MultisigAliasSet::from_aliases([(m, policy)], Some([addr(2), addr(3)].into()));

        let resolved = set.resolve(&[SigIdx::new(0, m)], false).unwrap();
        assert_eq!(resolved, vec![SigIdx::new(1, addr(2)), SigIdx::new(2, addr(3))]);
    }

    #[test]
    fn test_threshold_zero_alias_skipped() {
        let placeholder = addr(9);
        let set = MultisigAliasSet::from_aliases(
            [(placeholder, OutputOwners::new(&[], 0, 0).unwrap())],
            None,
        );
        // The placeholder is skipped, so the root cannot reach its threshold.
        let err = set.resolve(&[SigIdx::new(0, placeholder)], false).unwrap_err();
        assert!(matches!(err, Error::NotEnoughSignatures(_)));
    }

    #[test]
    fn test_self_cycle() {
        let m = addr(5);
        let set = MultisigAliasSet::from_aliases(
            [(m, OutputOwners::new(&[m, addr(1)], 0, 2).unwrap())],
            None,
        );
        assert!(matches!(
            set.resolve(&[SigIdx::new(0, m)], false),
            Err(Error::CyclicAlias(_))
        ));
    }

    #[test]
    fn test_shared_alias_is_not_a_cycle() {
        // M1 and M2 both contain M3: a diamond, not a cycle.
        let (m1, m2, m3) = (addr(11), addr(12), addr(13));
        let set = MultisigAliasSet::from_aliases(
            [
                (m1, OutputOwners::new(&[m3], 0, 1).unwrap()),
                (m2, OutputOwners::new(&[m3], 0, 1).unwrap()),
                (m3, OutputOwners::new(&[addr(1)], 0, 1).unwrap()),
            ],
            None,
        );
        let resolved = set
            .resolve(&[SigIdx::new(0, m1), SigIdx::new(1, m2)], false)
            .unwrap();
        assert_eq!(resolved.len(), 2);
        assert!(resolved.iter().all(|s| s.source == addr(1)));
    }

    fn wide(i: u16) -> Address {
        let mut raw = [0xeeu8; 20];
        raw[..2].copy_from_slice(&i.to_be_bytes());
        Address::new(raw)
    }

    #[test]
    fn test_wide_policy_counts_only_signers() {
        let m = Address::new([0xff; 20]);
        let members: Vec<Address> = (0..300).map(wide).collect();
        let mut set = MultisigAliasSet::new();
        set.add_alias(m, OutputOwners::new(&members, 0, 2).unwrap());
        set.restrict_to([members[298], members[299]]);

        let resolved = set.resolve(&[SigIdx::new(0, m)], false).unwrap();
        assert_eq!(
            resolved,
            vec![SigIdx::new(298, members[298]), SigIdx::new(299, members[299])]
        );
    }

    #[test]
    fn test_budget_exceeded() {
        let (m1, m2) = (Address::new([0xf1; 20]), Address::new([0xf2; 20]));
        let first: Vec<Address> = (0..200).map(wide).collect();
        let second: Vec<Address> = (200..300).map(wide).collect();
        let mut set = MultisigAliasSet::new();
        set.add_alias(m1, OutputOwners::new(&first, 0, 200).unwrap());
        set.add_alias(m2, OutputOwners::new(&second, 0, 100).unwrap());

        let err = set
            .resolve(&[SigIdx::new(0, m1), SigIdx::new(1, m2)], false)
            .unwrap_err();
        assert!(matches!(err, Error::TooManySignatures(_)));
    }

    #[test]
    fn test_nesting_depth_exceeded() {
        // wide(0) -> wide(1) -> ... -> wide(299) -> addr(1)
        let mut set = MultisigAliasSet::new();
        for i in 0..300u16 {
            let next = if i == 299 { addr(1) } else { wide(i + 1) };
            set.add_alias(wide(i), OutputOwners::new(&[next], 0, 1).unwrap());
        }
        let err = set.resolve(&[SigIdx::new(0, wide(0))], false).unwrap_err();
        assert!(matches!(err, Error::TooManySignatures(_)));

        // A short chain resolves to the single concrete key.
        let resolved = set.resolve(&[SigIdx::new(0, wide(290))], false).unwrap();
        assert_eq!(resolved, vec![SigIdx::new(0, addr(1))]);
    }

    #[test]
    fn test_dry_run_returns_root() {
        let m = addr(10);
        let policy = OutputOwners::new(&[addr(1), addr(2)], 0, 1).unwrap();
        let set = MultisigAliasSet::from_aliases([(m, policy)], None);
        let root = vec![SigIdx::new(0, m)];
        assert_eq!(set.resolve(&root, true).unwrap(), root);
        assert_eq!(set.resolve(&root, false).unwrap(), vec![SigIdx::new(0, addr(1))]);
    }
}
