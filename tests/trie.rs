// Copyright 2020 Parity Technologies
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Whole-trie behavioral tests: the seed scenarios of §8 of `SPEC_FULL.md`,
//! insert/delete stress sequences in the style of
//! `patricia-trie/src/triedbmut.rs`'s own test module, and property-based
//! laws (order independence, delete-to-empty, canonical form) checked with
//! `quickcheck` rather than hand-rolled loops.
//!
//! The S1–S6 scenarios assert the full 32-byte root hash, not just
//! membership: §4.1–§4.7's prose fully determines the RLP/hex-prefix/node
//! encode-hash/insert/delete algorithm, so each scenario's hash is
//! reproducible from the spec text alone, and the published 4-byte prefixes
//! (§8's table) confirm the key/value set below is the one each scenario
//! intends.

use std::collections::BTreeMap;

use hex_literal::hex;
use merkle_patricia_trie::{Trie, TrieError};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

fn empty_root_hash() -> [u8; 32] {
	Trie::new().hash()
}

fn build(entries: &[(Vec<u8>, Vec<u8>)]) -> Trie {
	let mut t = Trie::new();
	for (k, v) in entries {
		t.put(k, v.clone()).unwrap();
	}
	t
}

// --- §8 seed scenarios -------------------------------------------------------

#[test]
fn scenario_s1_two_divergent_top_level_keys() {
	let t = build(&[(hex!("001234").to_vec(), hex!("012345").to_vec()), (hex!("A01234").to_vec(), hex!("A12345").to_vec())]);
	assert_eq!(t.get(&hex!("001234")), Ok(hex!("012345").to_vec()));
	assert_eq!(t.get(&hex!("A01234")), Ok(hex!("A12345").to_vec()));
	assert_eq!(t.hash(), hex!("e017269441b77697a32f0062dc3f7aaaa907016c642a8e82ae28c17259b23ec7"));
}

#[test]
fn scenario_s2_keys_sharing_a_byte_prefix() {
	let t = build(&[(hex!("001234").to_vec(), hex!("012345").to_vec()), (hex!("002345").to_vec(), hex!("010101").to_vec())]);
	assert_eq!(t.get(&hex!("001234")), Ok(hex!("012345").to_vec()));
	assert_eq!(t.get(&hex!("002345")), Ok(hex!("010101").to_vec()));
	assert_eq!(t.hash(), hex!("4830ba5a8c00ae34eb70e89030a4918428ea11ba4988c3a84af430eeaab1cafc"));
}

#[test]
fn scenario_s3_three_keys_mixing_both_splits() {
	let t = build(&[
		(hex!("001234").to_vec(), hex!("012345").to_vec()),
		(hex!("A01234").to_vec(), hex!("A12345").to_vec()),
		(hex!("003456").to_vec(), hex!("020304").to_vec()),
	]);
	assert_eq!(t.get(&hex!("003456")), Ok(hex!("020304").to_vec()));
	assert_eq!(t.hash(), hex!("307c7f43ab1812a678574526f25fb1a611f0b38ea50c597d3a44776b8e7e6013"));
}

#[test]
fn scenario_s4_four_keys_including_a_proper_prefix() {
	// Keys 1,3,4,5: key1=001234 (S1/S2/S3's first put), key3=002345 (S2's
	// second put), key5=003456 (S3's additional put), plus the new key4=00,
	// a proper prefix of key1. A01234 (S1's second put, "key2") is not a
	// member of this scenario's key set.
	let t = build(&[
		(hex!("001234").to_vec(), hex!("012345").to_vec()),
		(hex!("002345").to_vec(), hex!("010101").to_vec()),
		(hex!("003456").to_vec(), hex!("020304").to_vec()),
		(hex!("00").to_vec(), hex!("11223344").to_vec()),
	]);
	assert_eq!(t.get(&hex!("00")), Ok(hex!("11223344").to_vec()));
	assert_eq!(t.get(&hex!("001234")), Ok(hex!("012345").to_vec()));
	assert_eq!(t.hash(), hex!("dcda5e0335a0cd7f0f78e08f6653e765270df1c981af89f3c200b54379fe2e1a"));
}

#[test]
fn scenario_s5_put_then_delete_of_the_only_key_is_empty() {
	let mut t = Trie::new();
	t.put(&hex!("001234"), hex!("012345").to_vec()).unwrap();
	t.delete(&hex!("001234")).unwrap();
	assert_eq!(t.hash(), empty_root_hash());
	assert_eq!(t.hash(), hex!("56e81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421"));
}

#[test]
fn scenario_s6_five_puts_three_deletes_leaves_the_survivors_intact() {
	// Same five keys as S4 plus key2=A01234. Deleting key2 and key4=00 (plus
	// a third, repeat delete of key2 to confirm it now reports not-found)
	// leaves exactly {key1,key3,key5} = {001234, 002345, 003456} standing,
	// per §8's "reaching {key1,key3,key4} only".
	let key1 = hex!("001234").to_vec();
	let key2 = hex!("A01234").to_vec();
	let key3 = hex!("002345").to_vec();
	let key4 = hex!("00").to_vec();
	let key5 = hex!("003456").to_vec();

	let mut t = Trie::new();
	for (k, v) in [
		(&key1, hex!("012345").to_vec()),
		(&key2, hex!("A12345").to_vec()),
		(&key3, hex!("010101").to_vec()),
		(&key4, hex!("11223344").to_vec()),
		(&key5, hex!("020304").to_vec()),
	] {
		t.put(k, v).unwrap();
	}
	t.delete(&key2).unwrap();
	t.delete(&key4).unwrap();

	// A third delete of an already-removed key must report not found.
	assert_eq!(t.delete(&key2), Err(TrieError::NotFound));

	assert_eq!(t.get(&key1), Ok(vec![0x01, 0x23, 0x45]));
	assert_eq!(t.get(&key3), Ok(vec![0x01, 0x01, 0x01]));
	assert_eq!(t.get(&key5), Ok(vec![0x02, 0x03, 0x04]));
	assert_eq!(t.get(&key2), Err(TrieError::NotFound));
	assert_eq!(t.get(&key4), Err(TrieError::NotFound));
	assert_eq!(t.hash(), hex!("b8ea2774140e9f82d0f36c2d43985c14bbb054aa228c3b625421974be1b9760e"));
}

// --- stress sequences, in the style of triedbmut.rs's own test module -------

#[test]
fn three_keys_differing_only_in_their_top_nibble() {
	let t = build(&[(vec![0x01, 0x23], vec![0x01, 0x23]), (vec![0xf1, 0x23], vec![0xf1, 0x23]), (vec![0x81, 0x23], vec![0x81, 0x23])]);
	assert_eq!(t.get(&[0x01, 0x23]), Ok(vec![0x01, 0x23]));
	assert_eq!(t.get(&[0xf1, 0x23]), Ok(vec![0xf1, 0x23]));
	assert_eq!(t.get(&[0x81, 0x23]), Ok(vec![0x81, 0x23]));
	assert_eq!(t.get(&[0x82, 0x23]), Err(TrieError::NotFound));
}

#[test]
fn a_key_and_its_own_prefix_coexist() {
	let t = build(&[(vec![0x01, 0x23], vec![0x01, 0x23]), (vec![], vec![0x00])]);
	assert_eq!(t.get(&[]), Ok(vec![0x00]));
	assert_eq!(t.get(&[0x01, 0x23]), Ok(vec![0x01, 0x23]));
}

#[test]
fn branching_three_ways_on_a_shared_byte_prefix() {
	let t = build(&[(vec![0x01, 0x23, 0x45], vec![0x01]), (vec![0x01, 0xf3, 0x45], vec![0x02]), (vec![0x01, 0xf3, 0xf5], vec![0x03])]);
	assert_eq!(t.get(&[0x01, 0x23, 0x45]), Ok(vec![0x01]));
	assert_eq!(t.get(&[0x01, 0xf3, 0x45]), Ok(vec![0x02]));
	assert_eq!(t.get(&[0x01, 0xf3, 0xf5]), Ok(vec![0x03]));
}

#[test]
fn removing_a_shared_prefix_leaf_preserves_its_longer_siblings() {
	let big_value = vec![0xAB; 40];
	let mut t1 = Trie::new();
	t1.put(&[0x01, 0x23], big_value.clone()).unwrap();
	t1.put(&[0x01, 0x34], big_value.clone()).unwrap();

	let mut t2 = Trie::new();
	t2.put(&[0x01], big_value.clone()).unwrap();
	t2.put(&[0x01, 0x23], big_value.clone()).unwrap();
	t2.put(&[0x01, 0x34], big_value.clone()).unwrap();
	t2.delete(&[0x01]).unwrap();

	assert_eq!(t1.hash(), t2.hash());
}

#[test]
fn values_crossing_the_inline_hashed_threshold() {
	for len in [31usize, 32, 33] {
		let mut t = Trie::new();
		let value = vec![0x07; len];
		t.put(b"threshold-key", value.clone()).unwrap();
		t.put(b"threshold-key-sibling", vec![0x01]).unwrap();
		assert_eq!(t.get(b"threshold-key"), Ok(value));
	}
}

// --- property-based laws -----------------------------------------------------

fn unique_entries(raw: Vec<(u8, u8)>) -> Vec<(Vec<u8>, Vec<u8>)> {
	let mut map = BTreeMap::new();
	for (k, v) in raw {
		map.insert(vec![k], vec![v]);
	}
	map.into_iter().collect()
}

quickcheck::quickcheck! {
	fn prop_root_hash_is_order_independent(raw: Vec<(u8, u8)>, seed: u64) -> bool {
		let entries = unique_entries(raw);
		let forward = build(&entries);

		let mut shuffled = entries;
		let mut rng = StdRng::seed_from_u64(seed);
		shuffled.shuffle(&mut rng);
		let reordered = build(&shuffled);

		forward.hash() == reordered.hash()
	}

	fn prop_deleting_every_key_reaches_the_empty_hash(raw: Vec<(u8, u8)>) -> bool {
		let entries = unique_entries(raw);
		let mut t = build(&entries);
		for (k, _) in &entries {
			if t.delete(k).is_err() {
				return false;
			}
		}
		t.hash() == empty_root_hash()
	}

	fn prop_put_then_delete_returns_to_the_starting_hash(raw: Vec<(u8, u8)>, extra_key: u8, extra_value: u8) -> bool {
		let entries = unique_entries(raw);
		let extra = vec![extra_key];
		if entries.iter().any(|(k, _)| *k == extra) {
			return true; // extra_key already bound: Put/Delete would change the binding, not round-trip it.
		}

		let mut t = build(&entries);
		let expected = t.hash();
		t.put(&extra, vec![extra_value]).unwrap();
		t.delete(&extra).unwrap();
		t.hash() == expected
	}

	fn prop_overwrite_preserves_other_keys(raw: Vec<(u8, u8)>, target_key: u8, new_value: u8) -> bool {
		let entries = unique_entries(raw);
		let target = vec![target_key];
		let mut t = build(&entries);
		t.put(&target, vec![new_value]).unwrap();

		if t.get(&target) != Ok(vec![new_value]) {
			return false;
		}
		entries.iter().filter(|(k, _)| *k != target).all(|(k, v)| t.get(k) == Ok(v.clone()))
	}

	fn prop_hash_is_stable_without_mutation(raw: Vec<(u8, u8)>) -> bool {
		let entries = unique_entries(raw);
		let t = build(&entries);
		t.hash() == t.hash()
	}
}
