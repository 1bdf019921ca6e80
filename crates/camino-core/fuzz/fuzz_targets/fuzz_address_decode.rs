//! Fuzz test for address decoding
//!
//! Ensures bech32 and cb58 parsers handle malformed input gracefully

#![no_main]

use camino_core::codec::cb58;
use camino_core::{Address, ChainAlias, Id, NodeId};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Should never panic, only return Err for invalid input
        if let Ok((chain, hrp, address)) = Address::parse_bech32(s) {
            let rendered = address.to_bech32(chain, &hrp).expect("re-render parsed address");
            assert_eq!(Address::parse_for(&rendered, chain, &hrp).ok(), Some(address));
        }
        let _ = Address::parse_for(s, ChainAlias::X, "camino");
        let _ = s.parse::<Id>();
        let _ = s.parse::<NodeId>();
        let _ = cb58::decode(s);
    }
});
