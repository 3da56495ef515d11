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

use bh_crypto::KeyManagement;

use crate::{error::Result, KeyContainer};

/// A DID together with the keys controlling it.
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    long_form_did: String,
    did_document_keys: Vec<KeyContainer>,
    update_key: KeyContainer,
    recovery_key: KeyContainer,
    alias: String,
}

impl Identifier {
    /// Assembles an identifier from its parts.
    pub fn new(
        long_form_did: String,
        did_document_keys: Vec<KeyContainer>,
        update_key: KeyContainer,
        recovery_key: KeyContainer,
        alias: String,
    ) -> Self {
        Self {
            long_form_did,
            did_document_keys,
            update_key,
            recovery_key,
            alias,
        }
    }

    /// The long-form DID.
    pub fn long_form_did(&self) -> &str {
        &self.long_form_did
    }

    /// The keys published in the DID document.
    pub fn did_document_keys(&self) -> &[KeyContainer] {
        &self.did_document_keys
    }

    /// The first published key, used to sign tokens.
    pub fn signing_key(&self) -> Option<&KeyContainer> {
        self.did_document_keys.first()
    }

    /// The key committed to for the next update.
    pub fn update_key(&self) -> &KeyContainer {
        &self.update_key
    }

    /// The key committed to for recovery.
    pub fn recovery_key(&self) -> &KeyContainer {
        &self.recovery_key
    }

    /// The alias the identifier was created under.
    pub fn alias(&self) -> &str {
        &self.alias
    }

    fn keys_mut(&mut self) -> impl Iterator<Item = &mut KeyContainer> {
        self.did_document_keys
            .iter_mut()
            .chain([&mut self.update_key, &mut self.recovery_key])
    }

    /// Checks that every key of the identifier is present in the store.
    pub fn validate_keys(&self) -> Result<()> {
        self.did_document_keys
            .iter()
            .chain([&self.update_key, &self.recovery_key])
            .try_for_each(KeyContainer::is_valid_key)
    }

    /// Moves every key from the access group `from` into the access group of
    /// `key_management`.
    pub fn migrate_keys(&mut self, key_management: &KeyManagement, from: Option<&str>) -> Result<()> {
        self.keys_mut()
            .try_for_each(|key| key.migrate_key(key_management, from))
    }
}
