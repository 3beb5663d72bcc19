// Copyright 2015-2018 Parity Technologies (UK) Ltd.
// This file is part of Parity.

// Parity is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// Parity is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with Parity.  If not, see <http://www.gnu.org/licenses/>.

//! Key codec: byte-to-nibble expansion, common-prefix, and hex-prefix (HP)
//! encoding of a nibble sequence with its leaf/extension terminator flag.

use std::iter::once;

/// Expands a byte key into nibbles, high nibble first.
pub(crate) fn bytes_to_nibbles(key: &[u8]) -> Vec<u8> {
	let mut out = Vec::with_capacity(key.len() * 2);
	for &b in key {
		out.push(b >> 4);
		out.push(b & 0x0F);
	}
	out
}

/// The length of the longest common prefix of `a` and `b`.
pub(crate) fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
	a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}

/// Hex-prefix encoding: packs `nibbles` into bytes with a two-bit header
/// nibble carrying the terminator (leaf) flag and the odd/even-length flag.
pub(crate) fn hex_prefix_encode(nibbles: &[u8], leaf: bool) -> Vec<u8> {
	let inlen = nibbles.len();
	let oddness_factor = inlen % 2;

	let first_byte = {
		let mut bits = ((inlen as u8 & 1) + (2 * leaf as u8)) << 4;
		if oddness_factor == 1 {
			bits += nibbles[0];
		}
		bits
	};
	once(first_byte)
		.chain(nibbles[oddness_factor..].chunks(2).map(|ch| ch[0] << 4 | ch[1]))
		.collect()
}

/// Inverse of [`hex_prefix_encode`]. Test-support only (§4.3 of
/// `SPEC_FULL.md`): the crate never needs to decode a node it did not just
/// build, but the codec round-trip law in §8 needs a decoder to check
/// against.
#[cfg(test)]
pub(crate) fn hex_prefix_decode(bytes: &[u8]) -> (Vec<u8>, bool) {
	let first = bytes[0];
	let leaf = first & 0x20 != 0;
	let odd = first & 0x10 != 0;
	let mut nibbles = Vec::new();
	if odd {
		nibbles.push(first & 0x0F);
	}
	for &b in &bytes[1..] {
		nibbles.push(b >> 4);
		nibbles.push(b & 0x0F);
	}
	(nibbles, leaf)
}
