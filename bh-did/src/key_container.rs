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

use bh_crypto::{KeyManagement, Secret as _, StoredSecret};
use bherror::traits::{ErrorContext as _, PropagateError as _};
use uuid::Uuid;

use crate::error::{IdentifierError, Result};

/// Signing algorithm of every identifier key.
pub const KEY_ALGORITHM: &str = "ES256K";

/// A key of an identifier: a handle to the stored secret together with the
/// key id it is published under.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyContainer {
    key_reference: StoredSecret,
    key_id: String,
}

impl KeyContainer {
    /// Labels `key_reference` with `key_id`.
    pub fn new(key_reference: StoredSecret, key_id: impl Into<String>) -> Self {
        Self {
            key_reference,
            key_id: key_id.into(),
        }
    }

    /// The stored secret.
    pub fn key_reference(&self) -> &StoredSecret {
        &self.key_reference
    }

    /// The id of the key in the DID document.
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Always [`KEY_ALGORITHM`].
    pub fn algorithm(&self) -> &'static str {
        KEY_ALGORITHM
    }

    /// Identifier of the stored secret.
    pub fn id(&self) -> Uuid {
        self.key_reference.id()
    }

    /// Checks that the secret is still present in the store.
    pub fn is_valid_key(&self) -> Result<()> {
        self.key_reference
            .is_valid_key()
            .with_err(|| IdentifierError::KeyManagement)
            .ctx(|| format!("key {} is not readable", self.key_id))
    }

    /// Moves the secret from the access group `from` into the access group of
    /// `key_management`.
    pub fn migrate_key(&mut self, key_management: &KeyManagement, from: Option<&str>) -> Result<()> {
        self.key_reference = key_management
            .migrate_key(&self.key_reference, from)
            .with_err(|| IdentifierError::KeyManagement)
            .ctx(|| format!("migrating key {}", self.key_id))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bh_crypto::{InMemorySecretStore, Logger, SecretStore};

    use super::*;

    #[test]
    fn container_exposes_secret_id() {
        let store: Arc<dyn SecretStore> = Arc::new(InMemorySecretStore::new());
        let key_management = KeyManagement::new(store, None, Arc::new(Logger::silent()));
        let secret = key_management.generate_key().unwrap();

        let container = KeyContainer::new(secret.clone(), "sign_abc");

        assert_eq!(container.id(), secret.id());
        assert_eq!(container.key_id(), "sign_abc");
        assert_eq!(container.algorithm(), "ES256K");
        container.is_valid_key().unwrap();
    }

    #[test]
    fn deleted_key_is_invalid() {
        let store: Arc<dyn SecretStore> = Arc::new(InMemorySecretStore::new());
        let key_management = KeyManagement::new(store, None, Arc::new(Logger::silent()));
        let container = KeyContainer::new(key_management.generate_key().unwrap(), "sign_abc");

        key_management.delete_key(&container.id()).unwrap();

        let err = container.is_valid_key().unwrap_err();
        assert_eq!(err.error, IdentifierError::KeyManagement);
    }
}
