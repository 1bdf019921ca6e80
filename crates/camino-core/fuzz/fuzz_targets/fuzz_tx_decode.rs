//! Fuzz test for signed transaction decoding
//!
//! Decoding arbitrary bytes must fail cleanly, and anything that decodes must
//! re-encode to the same bytes.

#![no_main]

use camino_core::{ChainAlias, Tx, UnsignedTx};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    for chain in [ChainAlias::X, ChainAlias::P] {
        if let Ok(tx) = Tx::from_bytes(chain, data) {
            assert_eq!(tx.to_bytes().expect("re-encode decoded tx"), data);
        }
        let _ = UnsignedTx::from_bytes(chain, data);
    }
});
