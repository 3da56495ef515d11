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

use std::sync::Arc;

use bherror::{
    traits::{ErrorContext, ForeignError},
    Error,
};
use rand::{rngs::OsRng, RngCore};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::{
    error::{Result, SecretStoreError},
    logging::Logger,
    secret::{Secret, StoredSecret},
    secret_store::{normalize_access_group, SecretBytes, SecretStore},
};

/// Type code of a stored secret made of 32 random bytes.
pub const RANDOM_32_BYTES_TYPE_CODE: &str = "r32B";

/// Size in bytes of the keys created by [`KeyManagement::generate_key`].
pub const GENERATED_KEY_SIZE: usize = 32;

/// Returns the type code for a raw key of `len` bytes, e.g. `r32B`.
pub fn item_type_code_for_len(len: usize) -> Result<String, SecretStoreError> {
    let code = format!("r{:02}B", len);
    if code.len() != crate::secret_store::ITEM_TYPE_CODE_LENGTH {
        return Err(Error::root(SecretStoreError::InvalidType(code)));
    }

    Ok(code)
}

/// Creates, loads, deletes and migrates keys held in a [`SecretStore`].
///
/// All the keys managed by an instance live in the same access group.
pub struct KeyManagement {
    store: Arc<dyn SecretStore>,
    access_group: Option<String>,
    logger: Arc<Logger>,
}

impl KeyManagement {
    /// Creates a key manager over `store`, placing keys into `access_group`.
    ///
    /// An empty access group is the same as `None`.
    pub fn new(store: Arc<dyn SecretStore>, access_group: Option<&str>, logger: Arc<Logger>) -> Self {
        Self {
            store,
            access_group: normalize_access_group(access_group).map(str::to_owned),
            logger,
        }
    }

    /// Access group the keys are placed into.
    pub fn access_group(&self) -> Option<&str> {
        self.access_group.as_deref()
    }

    /// Generates a new random 32-byte key and persists it.
    pub fn generate_key(&self) -> Result<StoredSecret, SecretStoreError> {
        let mut value = Zeroizing::new(vec![0; GENERATED_KEY_SIZE]);
        OsRng.try_fill_bytes(&mut value).foreign_err(|| {
            SecretStoreError::SaveToStore(0, "unable to generate random bytes".to_owned())
        })?;

        let id = Uuid::new_v4();
        self.store
            .save_secret(&id, RANDOM_32_BYTES_TYPE_CODE, self.access_group(), value)
            .ctx(|| format!("saving generated key {id}"))?;

        self.logger.debug(format!("generated key {id}"));
        Ok(self.handle(id, RANDOM_32_BYTES_TYPE_CODE))
    }

    /// Returns the generated key with the given `id`.
    ///
    /// Fails with [`SecretStoreError::ItemNotFound`] if it does not exist.
    pub fn get_key(&self, id: &Uuid) -> Result<StoredSecret, SecretStoreError> {
        let secret = self.handle(*id, RANDOM_32_BYTES_TYPE_CODE);
        secret.is_valid_key().ctx(|| format!("loading key {id}"))?;
        Ok(secret)
    }

    /// Deletes the generated key with the given `id`.
    ///
    /// Deleting a key which does not exist succeeds.
    pub fn delete_key(&self, id: &Uuid) -> Result<(), SecretStoreError> {
        match self.get_key(id) {
            Ok(secret) => self.delete(&secret),
            Err(error) if error.error == SecretStoreError::ItemNotFound => {
                self.logger.debug(format!("key {id} already absent"));
                Ok(())
            }
            Err(error) => Err(error),
        }
    }

    /// Persists externally produced key bytes under the given `id`.
    ///
    /// The item is tagged with a type code derived from the key length.
    pub fn save_key(&self, value: SecretBytes, id: Uuid) -> Result<StoredSecret, SecretStoreError> {
        let code = item_type_code_for_len(value.len())?;

        self.store
            .save_secret(&id, &code, self.access_group(), value)
            .ctx(|| format!("saving key {id}"))?;

        Ok(self.handle(id, &code))
    }

    /// Moves `secret` from the access group `from` into the access group of
    /// this key manager.
    ///
    /// The key is written to the new location before it is deleted from the
    /// old one, so a failed save leaves the original untouched.
    pub fn migrate_key(
        &self,
        secret: &StoredSecret,
        from: Option<&str>,
    ) -> Result<StoredSecret, SecretStoreError> {
        let from = normalize_access_group(from);
        let id = secret.id();
        let code = secret.item_type_code();

        if from == self.access_group() {
            return Ok(self.handle(id, code));
        }

        let value = self
            .store
            .get_secret(&id, code, from)
            .ctx(|| format!("reading key {id} before migration"))?;

        self.store
            .save_secret(&id, code, self.access_group(), value)
            .ctx(|| format!("saving migrated key {id}"))?;

        self.store
            .delete_secret(&id, code, from)
            .ctx(|| format!("deleting key {id} after migration"))?;

        self.logger.info(format!(
            "migrated key {id} from {:?} to {:?}",
            from,
            self.access_group()
        ));
        Ok(self.handle(id, code))
    }

    fn delete(&self, secret: &StoredSecret) -> Result<(), SecretStoreError> {
        secret.store().delete_secret(
            &secret.id(),
            secret.item_type_code(),
            secret.access_group(),
        )
    }

    fn handle(&self, id: Uuid, code: &str) -> StoredSecret {
        StoredSecret::new(id, code, self.access_group(), self.store.clone())
    }
}
