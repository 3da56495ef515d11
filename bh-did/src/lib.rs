// Copyright (C) 2020-2025  The Blockhouse Technology Limited (TBTL).
//
// This program is free software: you can redistribute it and/or modify it
// under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or (at your
// option) any later version.
//
// This program is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public
// License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! This crate creates the [ION][1] long-form DIDs of the wallet.
//!
//! [1]: https://identity.foundation/sidetree/spec/
//!
//! # Details
//!
//! An [`Identifier`] is created per pair of subject id and relying party, and
//! is named by the [`compute_alias`] of that pair. The [`IdentifierCreator`]
//! generates three independent `secp256k1` keys for it:
//!
//! - the signing key, published in the DID document;
//! - the update key, committed to for the next update;
//! - the recovery key, committed to for recovery.
//!
//! The [`IdentifierFormatter`] turns their public JWKs into a long-form DID.
//! The encoding is canonical: the DID is a [`Multihash`] of sorted-key,
//! compact JSON, so the same keys always yield the same DID.
//!
//! The [`NonceComputer`] produces request nonces bound to a DID.
//!
//! # Examples
//!
//! ## Create an identifier
//!
//! ```
//! use std::sync::Arc;
//!
//! use bh_crypto::{InMemorySecretStore, WalletConfiguration};
//! use bh_did::{IdentifierCreator, ION_PREFIX};
//!
//! let configuration = WalletConfiguration::builder(Arc::new(InMemorySecretStore::new())).build();
//! let creator = IdentifierCreator::from_configuration(&configuration);
//!
//! let identifier = creator.create("master", "https://verifier.example.com").unwrap();
//!
//! assert!(identifier.long_form_did().starts_with(ION_PREFIX));
//! assert!(identifier.signing_key().unwrap().key_id().starts_with("sign_"));
//! identifier.validate_keys().unwrap();
//! ```

mod alias;
mod creator;
mod error;
mod formatter;
mod identifier;
mod key_container;
mod multihash;
mod nonce;

pub use alias::*;
pub use creator::*;
pub use error::*;
pub use formatter::*;
pub use identifier::*;
pub use key_container::*;
pub use multihash::*;
pub use nonce::*;
