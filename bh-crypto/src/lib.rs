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

//! This crate provides the secret handling and signature primitives of the
//! wallet.
//!
//! # Details
//!
//! Secret key material never leaves a [`Secret`] by value. A [`StoredSecret`]
//! is a handle to an item of a [`SecretStore`], an [`EphemeralSecret`] lives
//! only in memory. Both lend their bytes to a closure and wipe every copy
//! afterwards.
//!
//! The [`KeyManagement`] creates, loads, deletes and migrates keys between
//! access groups of a [`SecretStore`].
//!
//! The [`CryptoOperations`] registry dispatches `sign`, `verify` and
//! `get_public_key` calls by curve name to the capabilities registered for
//! that curve. The built-in [`openssl`] backed curves are `secp256k1` (every
//! capability), `P-256` and `Ed25519` (verification only).
//!
//! The [`WalletConfiguration`] ties the store, the [`Logger`] and the registry
//! together.
//!
//! # Examples
//!
//! ## Generate a key and sign with it
//!
//! ```
//! use std::sync::Arc;
//!
//! use bh_crypto::{InMemorySecretStore, WalletConfiguration, SECP256K1};
//!
//! let configuration = WalletConfiguration::builder(Arc::new(InMemorySecretStore::new()))
//!     .access_group("com.example.wallet")
//!     .build();
//!
//! let key = configuration.key_management().generate_key().unwrap();
//! let ops = configuration.crypto_operations();
//!
//! let signature = ops.sign(b"message", &key, SECP256K1).unwrap();
//! let public_key = ops.get_public_key(&key, SECP256K1).unwrap();
//!
//! assert!(ops.verify(&signature, b"message", &public_key).unwrap());
//! ```

pub mod openssl_impl;

mod algorithm;
mod configuration;
mod error;
mod hashing;
mod key_management;
mod logging;
mod public_key;
mod secret;
mod secret_store;

pub use algorithm::*;
pub use configuration::*;
pub use error::*;
pub use hashing::*;
pub use key_management::*;
pub use logging::*;
pub use public_key::*;
pub use secret::*;
pub use secret_store::*;
