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

//! The trie engine: insert, lookup, delete, and the façade that ties the
//! node algebra to a public, mutable key-value map.

use std::cell::Cell;

use log::{debug, trace};

use crate::error::{Result, TrieError};
use crate::keccak::EMPTY_ROOT_HASH;
use crate::nibble::{bytes_to_nibbles, common_prefix_len};
use crate::node::{empty_children, Branch, Extension, Leaf, Node};

/// An in-memory, Ethereum-compatible Merkle-Patricia trie.
///
/// `Trie` owns its node graph exclusively; there is no sharing across trie
/// instances (see the Lifecycle paragraph of §3 of `SPEC_FULL.md`).
#[derive(Debug)]
pub struct Trie {
	root: Option<Box<Node>>,
	generation: u64,
	hash_cache: Cell<Option<[u8; 32]>>,
}

impl Default for Trie {
	fn default() -> Self {
		Self::new()
	}
}

impl Trie {
	/// An empty trie.
	pub fn new() -> Self {
		Trie { root: None, generation: 0, hash_cache: Cell::new(None) }
	}

	/// Binds `key` to `value`, overwriting any existing binding.
	///
	/// Storing an empty `value` is accepted and is distinct from deleting
	/// the key — a later `Get` returns the stored empty byte string (see
	/// §9-full's resolution of the open question on empty values).
	pub fn put(&mut self, key: &[u8], value: Vec<u8>) -> Result<()> {
		trace!("put: key of {} byte(s), value of {} byte(s)", key.len(), value.len());
		self.hash_cache.set(None);
		let nk = bytes_to_nibbles(key);
		let generation = self.generation;
		self.root = Some(match self.root.take() {
			None => Box::new(Node::Leaf(Leaf { suffix: nk, value, generation })),
			Some(node) => insert_into(node, &nk, value, generation),
		});
		Ok(())
	}

	/// Looks up `key`, returning [`TrieError::NotFound`] if it is unbound.
	pub fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
		let nk = bytes_to_nibbles(key);
		let root = self.root.as_deref().ok_or(TrieError::NotFound)?;
		lookup(root, &nk).map(<[u8]>::to_vec).ok_or(TrieError::NotFound)
	}

	/// Removes `key`'s binding, returning [`TrieError::NotFound`] if it was
	/// already absent. On *not found*, the trie is left byte-for-byte
	/// unchanged — structurally and in its cached hash.
	pub fn delete(&mut self, key: &[u8]) -> Result<()> {
		trace!("delete: key of {} byte(s)", key.len());
		let nk = bytes_to_nibbles(key);
		let root = self.root.take().ok_or(TrieError::NotFound)?;
		match delete_node(root, &nk) {
			Ok(replacement) => {
				self.hash_cache.set(None);
				self.root = replacement;
				Ok(())
			}
			Err(restored) => {
				self.root = Some(restored);
				Err(TrieError::NotFound)
			}
		}
	}

	/// The trie's root hash, 32 bytes, memoized until the next mutation.
	pub fn hash(&self) -> [u8; 32] {
		if let Some(cached) = self.hash_cache.get() {
			trace!("hash: cache hit");
			return cached;
		}
		trace!("hash: cache miss, recomputing");
		let computed = match &self.root {
			None => EMPTY_ROOT_HASH,
			Some(node) => {
				let digest = node.hash(true);
				let mut out = [0u8; 32];
				out.copy_from_slice(&digest);
				out
			}
		};
		self.hash_cache.set(Some(computed));
		computed
	}

	/// The canonical RLP encoding of the root node, or the empty-string
	/// placeholder `[0x80]` for the empty trie.
	pub fn encode(&self) -> Vec<u8> {
		match &self.root {
			Some(node) => node.encode(),
			None => vec![0x80],
		}
	}

	/// A developer-facing, non-contractual rendering of the node tree.
	pub fn to_pretty_string(&self) -> String {
		let mut out = String::new();
		match &self.root {
			Some(node) => node.render(&mut out, 0),
			None => out.push_str("<empty trie>\n"),
		}
		out
	}

}

impl Clone for Trie {
	/// A deep clone of the node graph; the clone's nodes carry a generation
	/// counter bumped relative to the source (see §9-full's resolution of
	/// the `Clone` open question — this is the idiomatic realization of the
	/// reference's "shallow copy that aliases the root", which an owning,
	/// `&self`-taking `Clone` impl cannot express without shared mutable
	/// ownership that the exclusive-ownership model of §3 rules out).
	fn clone(&self) -> Self {
		debug!("clone: generation {} -> {}", self.generation, self.generation + 1);
		Trie { root: self.root.clone(), generation: self.generation + 1, hash_cache: Cell::new(self.hash_cache.get()) }
	}
}

impl std::fmt::Display for Trie {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.to_pretty_string())
	}
}

// --- lookup (§4.5) ---------------------------------------------------------

fn lookup<'a>(node: &'a Node, nk: &[u8]) -> Option<&'a [u8]> {
	match node {
		Node::Branch(b) => {
			if nk.is_empty() {
				b.value.as_deref()
			} else {
				let child = b.children[nk[0] as usize].as_deref()?;
				lookup(child, &nk[1..])
			}
		}
		Node::Extension(e) => {
			if nk.len() >= e.sub_key.len() && nk[..e.sub_key.len()] == e.sub_key[..] {
				lookup_branch(&e.child, &nk[e.sub_key.len()..])
			} else {
				None
			}
		}
		Node::Leaf(l) => if nk == l.suffix.as_slice() { Some(&l.value) } else { None },
	}
}

fn lookup_branch<'a>(branch: &'a Branch, nk: &[u8]) -> Option<&'a [u8]> {
	if nk.is_empty() {
		branch.value.as_deref()
	} else {
		let child = branch.children[nk[0] as usize].as_deref()?;
		lookup(child, &nk[1..])
	}
}

// --- insert (§4.6) ----------------------------------------------------------

fn insert_into_branch(mut branch: Box<Branch>, nk: &[u8], value: Vec<u8>, generation: u64) -> Box<Branch> {
	if nk.is_empty() {
		branch.value = Some(value);
	} else {
		let slot = nk[0] as usize;
		let new_child = match branch.children[slot].take() {
			None => Box::new(Node::Leaf(Leaf { suffix: nk[1..].to_vec(), value, generation })),
			Some(child) => insert_into(child, &nk[1..], value, generation),
		};
		branch.children[slot] = Some(new_child);
	}
	branch
}

fn insert_into(node: Box<Node>, nk: &[u8], value: Vec<u8>, generation: u64) -> Box<Node> {
	match *node {
		Node::Branch(b) => Box::new(Node::Branch(*insert_into_branch(Box::new(b), nk, value, generation))),
		Node::Extension(ext) => {
			let cpl = common_prefix_len(nk, &ext.sub_key);
			if cpl == ext.sub_key.len() {
				// The key extends the whole subKey: descend into the child.
				let new_child = insert_into_branch(ext.child, &nk[cpl..], value, generation);
				Box::new(Node::Extension(Extension { sub_key: ext.sub_key, child: new_child, generation: ext.generation }))
			} else {
				debug!("insert: splitting extension of {} nibble(s) at offset {}", ext.sub_key.len(), cpl);
				let prefix = ext.sub_key[..cpl].to_vec();
				let old_slot = ext.sub_key[cpl] as usize;
				let mut branch = Branch { children: empty_children(), value: None, generation };
				if ext.sub_key.len() == cpl + 1 {
					branch.children[old_slot] = Some(Box::new(Node::Branch(*ext.child)));
				} else {
					let shortened = ext.sub_key[cpl + 1..].to_vec();
					branch.children[old_slot] =
						Some(Box::new(Node::Extension(Extension { sub_key: shortened, child: ext.child, generation: ext.generation })));
				}
				finish_split(cpl, nk, value, generation, prefix, branch)
			}
		}
		Node::Leaf(leaf) => {
			if nk == leaf.suffix.as_slice() {
				Box::new(Node::Leaf(Leaf { suffix: leaf.suffix, value, generation }))
			} else {
				let cpl = common_prefix_len(nk, &leaf.suffix);
				debug!("insert: splitting leaf of {} nibble(s) at offset {}", leaf.suffix.len(), cpl);
				let mut branch = Branch { children: empty_children(), value: None, generation };
				let old_rest = &leaf.suffix[cpl..];
				if old_rest.is_empty() {
					branch.value = Some(leaf.value);
				} else {
					let old_slot = old_rest[0] as usize;
					branch.children[old_slot] = Some(Box::new(Node::Leaf(Leaf {
						suffix: old_rest[1..].to_vec(),
						value: leaf.value,
						generation: leaf.generation,
					})));
				}
				let prefix = nk[..cpl].to_vec();
				finish_split(cpl, nk, value, generation, prefix, branch)
			}
		}
	}
}

/// Shared tail of both split paths in §4.6: place the new leaf (or the
/// branch's own value, if the new key ends exactly at the split point),
/// then wrap in an Extension unless the shared prefix is empty (elided
/// per the tie-break rule of §4.6).
fn finish_split(cpl: usize, nk: &[u8], value: Vec<u8>, generation: u64, prefix: Vec<u8>, mut branch: Branch) -> Box<Node> {
	if nk.len() == cpl {
		branch.value = Some(value);
	} else {
		let new_slot = nk[cpl] as usize;
		branch.children[new_slot] = Some(Box::new(Node::Leaf(Leaf { suffix: nk[cpl + 1..].to_vec(), value, generation })));
	}
	if prefix.is_empty() {
		Box::new(Node::Branch(branch))
	} else {
		Box::new(Node::Extension(Extension { sub_key: prefix, child: Box::new(branch), generation }))
	}
}

// --- delete (§4.7) -----------------------------------------------------------

/// Deletes `nk` from `branch`'s subtree. `Ok(None)` cannot occur for a
/// top-level branch *value* removal alone (a branch never collapses to
/// nothing so long as the invariants of §3 held beforehand); it does occur
/// when deletion empties the branch down to a single value-only Leaf via the
/// collapse check below feeding back up through an Extension or the root.
fn delete_branch(mut branch: Box<Branch>, nk: &[u8]) -> std::result::Result<Option<Box<Node>>, Box<Branch>> {
	if nk.is_empty() {
		if branch.value.is_none() {
			return Err(branch);
		}
		branch.value = None;
	} else {
		let slot = nk[0] as usize;
		match branch.children[slot].take() {
			None => return Err(branch),
			Some(child) => match delete_node(child, &nk[1..]) {
				Ok(replacement) => branch.children[slot] = replacement,
				Err(restored) => {
					branch.children[slot] = Some(restored);
					return Err(branch);
				}
			},
		}
	}

	let live: Vec<usize> = (0..16).filter(|&i| branch.children[i].is_some()).collect();
	let generation = branch.generation;
	if branch.value.is_some() && live.is_empty() {
		debug!("delete: branch collapsed to a value-only Leaf");
		return Ok(Some(Box::new(Node::Leaf(Leaf { suffix: Vec::new(), value: branch.value.take().unwrap(), generation }))));
	}
	if branch.value.is_none() && live.len() == 1 {
		let slot = live[0];
		let child = branch.children[slot].take().unwrap();
		debug!("delete: branch collapsed into its sole remaining child at slot {slot:x}");
		let collapsed = match *child {
			Node::Branch(b) => Node::Extension(Extension { sub_key: vec![slot as u8], child: Box::new(b), generation }),
			Node::Extension(mut e) => {
				let mut new_sub = vec![slot as u8];
				new_sub.extend_from_slice(&e.sub_key);
				e.sub_key = new_sub;
				Node::Extension(e)
			}
			Node::Leaf(mut l) => {
				let mut new_suffix = vec![slot as u8];
				new_suffix.extend_from_slice(&l.suffix);
				l.suffix = new_suffix;
				Node::Leaf(l)
			}
		};
		return Ok(Some(Box::new(collapsed)));
	}
	Ok(Some(Box::new(Node::Branch(*branch))))
}

fn delete_node(node: Box<Node>, nk: &[u8]) -> std::result::Result<Option<Box<Node>>, Box<Node>> {
	match *node {
		Node::Leaf(leaf) => {
			if leaf.suffix == nk {
				Ok(None)
			} else {
				Err(Box::new(Node::Leaf(leaf)))
			}
		}
		Node::Extension(ext) => {
			if nk.len() < ext.sub_key.len() || nk[..ext.sub_key.len()] != ext.sub_key[..] {
				return Err(Box::new(Node::Extension(ext)));
			}
			let Extension { sub_key, child, generation } = ext;
			let rest = &nk[sub_key.len()..];
			match delete_branch(child, rest) {
				Ok(Some(replacement)) => {
					let fused = match *replacement {
						Node::Extension(e2) => {
							let mut merged = sub_key;
							merged.extend_from_slice(&e2.sub_key);
							Node::Extension(Extension { sub_key: merged, child: e2.child, generation })
						}
						Node::Leaf(l2) => {
							let mut merged = sub_key;
							merged.extend_from_slice(&l2.suffix);
							Node::Leaf(Leaf { suffix: merged, value: l2.value, generation })
						}
						Node::Branch(b2) => Node::Extension(Extension { sub_key, child: Box::new(b2), generation }),
					};
					Ok(Some(Box::new(fused)))
				}
				Ok(None) => unreachable!("an Extension's child is a Branch, which never collapses to null"),
				Err(restored_child) => Err(Box::new(Node::Extension(Extension { sub_key, child: restored_child, generation }))),
			}
		}
		Node::Branch(b) => match delete_branch(Box::new(b), nk) {
			Ok(replacement) => Ok(replacement),
			Err(restored) => Err(Box::new(Node::Branch(*restored))),
		},
	}
}
