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

use std::{collections::HashMap, sync::RwLock};

use bherror::Error;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::error::{Result, SecretStoreError, LOCK_POISONED_STATUS};

/// Raw secret bytes, wiped from memory when dropped.
pub type SecretBytes = Zeroizing<Vec<u8>>;

/// Length of the item type code every stored secret is tagged with.
pub const ITEM_TYPE_CODE_LENGTH: usize = 4;

/// A storage boundary for raw secrets, usually backed by a platform secure
/// element.
///
/// Items are addressed by the triple `(id, item_type, access_group)`. An
/// access group of `None` means the default partition of the store.
pub trait SecretStore: Send + Sync {
    /// Reads the secret stored under the given address.
    ///
    /// Fails with [`SecretStoreError::ItemNotFound`] if there is no such item.
    fn get_secret(
        &self,
        id: &Uuid,
        item_type: &str,
        access_group: Option<&str>,
    ) -> Result<SecretBytes, SecretStoreError>;

    /// Saves the secret under the given address.
    ///
    /// The `value` is consumed, so the caller's copy is wiped once it has been
    /// handed over to the store.
    fn save_secret(
        &self,
        id: &Uuid,
        item_type: &str,
        access_group: Option<&str>,
        value: SecretBytes,
    ) -> Result<(), SecretStoreError>;

    /// Deletes the secret stored under the given address.
    ///
    /// Deleting an item which does not exist succeeds.
    fn delete_secret(
        &self,
        id: &Uuid,
        item_type: &str,
        access_group: Option<&str>,
    ) -> Result<(), SecretStoreError>;
}

/// Maps an empty access group to `None`.
pub fn normalize_access_group(access_group: Option<&str>) -> Option<&str> {
    access_group.filter(|group| !group.is_empty())
}

/// Checks that the item type code has exactly [`ITEM_TYPE_CODE_LENGTH`]
/// characters.
pub fn check_item_type(item_type: &str) -> Result<(), SecretStoreError> {
    if item_type.chars().count() != ITEM_TYPE_CODE_LENGTH {
        return Err(Error::root(SecretStoreError::InvalidType(
            item_type.to_owned(),
        )));
    }

    Ok(())
}

type ItemAddress = (Uuid, String, Option<String>);

fn address(id: &Uuid, item_type: &str, access_group: Option<&str>) -> ItemAddress {
    (
        *id,
        item_type.to_owned(),
        normalize_access_group(access_group).map(str::to_owned),
    )
}

fn poisoned(error: fn(i32, String) -> SecretStoreError) -> Error<SecretStoreError> {
    Error::root(error(
        LOCK_POISONED_STATUS,
        "secret store lock poisoned".to_owned(),
    ))
}

/// [`SecretStore`] keeping the secrets in process memory.
///
/// Values are wiped when they are overwritten, deleted, or when the store is
/// dropped.
#[derive(Default)]
pub struct InMemorySecretStore {
    items: RwLock<HashMap<ItemAddress, SecretBytes>>,
}

impl InMemorySecretStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SecretStore for InMemorySecretStore {
    fn get_secret(
        &self,
        id: &Uuid,
        item_type: &str,
        access_group: Option<&str>,
    ) -> Result<SecretBytes, SecretStoreError> {
        let items = self
            .items
            .read()
            .map_err(|_| poisoned(SecretStoreError::ReadFromStore))?;

        items
            .get(&address(id, item_type, access_group))
            .cloned()
            .ok_or_else(|| Error::root(SecretStoreError::ItemNotFound))
    }

    fn save_secret(
        &self,
        id: &Uuid,
        item_type: &str,
        access_group: Option<&str>,
        value: SecretBytes,
    ) -> Result<(), SecretStoreError> {
        check_item_type(item_type)?;

        let mut items = self
            .items
            .write()
            .map_err(|_| poisoned(SecretStoreError::SaveToStore))?;

        items.insert(address(id, item_type, access_group), value);
        Ok(())
    }

    fn delete_secret(
        &self,
        id: &Uuid,
        item_type: &str,
        access_group: Option<&str>,
    ) -> Result<(), SecretStoreError> {
        let mut items = self
            .items
            .write()
            .map_err(|_| poisoned(SecretStoreError::DeleteFromStore))?;

        items.remove(&address(id, item_type, access_group));
        Ok(())
    }
}
