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

//! The three-variant node algebra: Leaf, Extension, Branch, and their
//! `encode`/`hash` contracts.
//!
//! An `Extension`'s child is typed as `Box<Branch>` rather than `Box<Node>`:
//! the structural invariant that an extension never points at another
//! extension or a leaf (it would have been folded) is then enforced by the
//! compiler instead of by a runtime check.

use std::fmt::Write as _;

use crate::keccak::keccak256;
use crate::nibble::hex_prefix_encode;
use crate::rlp::{encode_bytes, wrap_encoded_list};

/// Fixed-size child-slot array of a [`Branch`], indexed by nibble.
pub(crate) type Children = Box<[Option<Box<Node>>; 16]>;

pub(crate) fn empty_children() -> Children {
	Box::new([None, None, None, None, None, None, None, None, None, None, None, None, None, None, None, None])
}

/// A terminal node: the remaining suffix nibbles of a key and its value.
#[derive(Debug, Clone)]
pub(crate) struct Leaf {
	pub(crate) suffix: Vec<u8>,
	pub(crate) value: Vec<u8>,
	pub(crate) generation: u64,
}

/// A compact shared-prefix node; always points at a [`Branch`].
#[derive(Debug, Clone)]
pub(crate) struct Extension {
	pub(crate) sub_key: Vec<u8>,
	pub(crate) child: Box<Branch>,
	pub(crate) generation: u64,
}

/// A 16-way fan-out node, optionally carrying a value for a key that ends
/// exactly at this depth.
#[derive(Debug, Clone)]
pub(crate) struct Branch {
	pub(crate) children: Children,
	pub(crate) value: Option<Vec<u8>>,
	pub(crate) generation: u64,
}

/// A trie node: exactly one of the three variants of §3 of `SPEC_FULL.md`.
#[derive(Debug, Clone)]
pub(crate) enum Node {
	Leaf(Leaf),
	Extension(Extension),
	Branch(Branch),
}

impl Leaf {
	fn encode(&self) -> Vec<u8> {
		let header = hex_prefix_encode(&self.suffix, true);
		let mut header_enc = Vec::new();
		encode_bytes(&mut header_enc, &header);
		let mut value_enc = Vec::new();
		encode_bytes(&mut value_enc, &self.value);
		let mut buf = Vec::new();
		wrap_encoded_list(&mut buf, &[&header_enc, &value_enc]);
		buf
	}
}

impl Extension {
	fn encode(&self) -> Vec<u8> {
		self.encode_with(Branch::encode)
	}

	fn encode_for_hash(&self) -> Vec<u8> {
		self.encode_with(|b| b.hash(false))
	}

	fn encode_with(&self, child_ref: impl FnOnce(&Branch) -> Vec<u8>) -> Vec<u8> {
		let header = hex_prefix_encode(&self.sub_key, false);
		let mut header_enc = Vec::new();
		encode_bytes(&mut header_enc, &header);
		let child_enc = child_ref(&self.child);
		let mut buf = Vec::new();
		wrap_encoded_list(&mut buf, &[&header_enc, &child_enc]);
		buf
	}
}

impl Branch {
	/// The 17-item RLP tuple: 16 child slots followed by the branch value.
	/// `child_ref` controls whether children are embedded via their full
	/// `encode()` or their size-dependent `hash(false)` reference — the
	/// only difference between `encode()` and the buffer `hash()` hashes.
	fn encode_with(&self, child_ref: impl Fn(&Node) -> Vec<u8>) -> Vec<u8> {
		let mut pieces: Vec<Vec<u8>> = Vec::with_capacity(17);
		for slot in self.children.iter() {
			match slot {
				Some(child) => pieces.push(child_ref(child)),
				None => pieces.push(vec![0x80]),
			}
		}
		match &self.value {
			Some(v) => {
				let mut enc = Vec::new();
				encode_bytes(&mut enc, v);
				pieces.push(enc);
			}
			None => pieces.push(vec![0x80]),
		}
		let refs: Vec<&[u8]> = pieces.iter().map(Vec::as_slice).collect();
		let mut buf = Vec::new();
		wrap_encoded_list(&mut buf, &refs);
		buf
	}

	fn encode(&self) -> Vec<u8> {
		self.encode_with(Node::encode)
	}

	fn encode_for_hash(&self) -> Vec<u8> {
		self.encode_with(|n| n.hash(false))
	}

	/// The canonical child reference for this branch: §4.4's `hash(isRoot)`.
	pub(crate) fn hash(&self, is_root: bool) -> Vec<u8> {
		hash_from_encoding(self.encode_for_hash(), is_root)
	}
}

fn hash_from_encoding(buf: Vec<u8>, is_root: bool) -> Vec<u8> {
	if is_root {
		keccak256(&[&buf]).to_vec()
	} else if buf.len() < 32 {
		buf
	} else {
		let mut out = Vec::new();
		encode_bytes(&mut out, &keccak256(&[&buf]));
		out
	}
}

impl Node {
	/// The canonical RLP encoding of this node, always nesting full child
	/// encodings regardless of size. Used for the façade's `Encode()` and,
	/// recursively, by every node's own `encode()`.
	pub(crate) fn encode(&self) -> Vec<u8> {
		match self {
			Node::Leaf(l) => l.encode(),
			Node::Extension(e) => e.encode(),
			Node::Branch(b) => b.encode(),
		}
	}

	/// The canonical child reference: §4.4's `hash(isRoot)`. Every
	/// descendant substitutes its own `hash(false)` in place of `encode()`.
	pub(crate) fn hash(&self, is_root: bool) -> Vec<u8> {
		let buf = match self {
			// A leaf has no children: its hashed encoding is its plain encoding.
			Node::Leaf(l) => l.encode(),
			Node::Extension(e) => e.encode_for_hash(),
			Node::Branch(b) => b.encode_for_hash(),
		};
		hash_from_encoding(buf, is_root)
	}

	pub(crate) fn generation(&self) -> u64 {
		match self {
			Node::Leaf(l) => l.generation,
			Node::Extension(e) => e.generation,
			Node::Branch(b) => b.generation,
		}
	}

	/// Developer-facing rendering; layout is not part of the contract.
	pub(crate) fn render(&self, out: &mut String, depth: usize) {
		let pad = "  ".repeat(depth);
		match self {
			Node::Leaf(l) => {
				let _ = writeln!(out, "{pad}Leaf {{ suffix: {:?}, value: 0x{} }}", l.suffix, hex(&l.value));
			}
			Node::Extension(e) => {
				let _ = writeln!(out, "{pad}Extension {{ sub_key: {:?} }}", e.sub_key);
				e.child.render(out, depth + 1);
			}
			Node::Branch(b) => b.render(out, depth),
		}
	}
}

impl Branch {
	fn render(&self, out: &mut String, depth: usize) {
		let pad = "  ".repeat(depth);
		let value_desc = match &self.value {
			Some(v) => format!("Some(0x{})", hex(v)),
			None => "None".to_string(),
		};
		let _ = writeln!(out, "{pad}Branch {{ value: {value_desc} }}");
		for (nibble, slot) in self.children.iter().enumerate() {
			if let Some(child) = slot {
				let _ = writeln!(out, "{pad}  [{nibble:x}]:");
				child.render(out, depth + 2);
			}
		}
	}
}

fn hex(bytes: &[u8]) -> String {
	bytes.iter().map(|b| format!("{b:02x}")).collect()
}
