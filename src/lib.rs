// Copyright 2020 Parity Technologies
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! An in-memory Merkle-Patricia trie, bit-for-bit compatible with Ethereum's
//! "modified Merkle-Patricia trie" construction: the same hex-prefix key
//! encoding, the same RLP node encodings, and the same inline-vs-hashed
//! child-reference rule.
//!
//! ```
//! use merkle_patricia_trie::Trie;
//!
//! let mut trie = Trie::new();
//! trie.put(b"dog", b"puppy".to_vec()).unwrap();
//! trie.put(b"doge", b"coin".to_vec()).unwrap();
//! assert_eq!(trie.get(b"dog").unwrap(), b"puppy");
//!
//! trie.delete(b"doge").unwrap();
//! assert!(trie.get(b"doge").is_err());
//! ```

mod error;
mod keccak;
mod nibble;
mod node;
mod rlp;
mod trie;

pub use error::{Result, TrieError};
pub use trie::Trie;
