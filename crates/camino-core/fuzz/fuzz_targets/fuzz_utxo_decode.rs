//! Fuzz test for UTXO decoding

#![no_main]

use camino_core::{ChainAlias, Registry, Utxo};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    for chain in [ChainAlias::X, ChainAlias::P] {
        let reg = Registry::for_chain(chain);
        if let Ok(utxo) = Utxo::from_bytes(&reg, data) {
            assert_eq!(utxo.to_bytes(), data);
        }
    }
});
