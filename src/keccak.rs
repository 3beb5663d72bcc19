// Copyright 2020 Parity Technologies
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Keccak-256, the legacy (pre-NIST) variant used throughout Ethereum.

use tiny_keccak::{Hasher, Keccak};

/// Hashes the concatenation of `parts` with Keccak-256.
pub fn keccak256(parts: &[&[u8]]) -> [u8; 32] {
	let mut hasher = Keccak::v256();
	for part in parts {
		hasher.update(part);
	}
	let mut out = [0u8; 32];
	hasher.finalize(&mut out);
	out
}

/// `keccak256(&[0x80])`, the root hash of the empty trie.
pub const EMPTY_ROOT_HASH: [u8; 32] = [
	0x56, 0xe8, 0x1f, 0x17, 0x1b, 0xcc, 0x55, 0xa6, 0xff, 0x83, 0x45, 0xe6, 0x92, 0xc0, 0xf8, 0x6e, 0x5b, 0x48, 0xe0,
	0x1b, 0x99, 0x6c, 0xad, 0xc0, 0x01, 0x62, 0x2f, 0xb5, 0xe3, 0x63, 0xb4, 0x21,
];
