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

//! Curve backends implemented with `openssl`.

use std::cmp::Ordering;

use bherror::{
    traits::{ErrorContext, ForeignError},
    Error,
};
use openssl::{
    bn::{BigNum, BigNumContext, BigNumRef},
    ec::{EcGroup, EcKey, EcPoint, PointConversionForm},
    ecdsa::EcdsaSig,
    nid::Nid,
    pkey::{Id, PKey, Private, Public},
    sha::sha256,
    sign::Verifier,
};

use crate::{
    algorithm::{PublicKeyDerivation, Signing, Verifying},
    error::{CryptoError, Result},
    public_key::{self, PublicKey, COORDINATE_LEN},
    secret::{Secret, SecretExt},
};

/// Length of an `r ‖ s` ECDSA signature or an Ed25519 signature.
pub const SIGNATURE_LEN: usize = 64;

/// ECDSA over `secp256k1` with SHA-256.
///
/// The secret is the raw 32-byte private scalar. Signatures are the
/// fixed-size `r ‖ s` concatenation with a low `s`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Secp256k1;

/// ECDSA over `P-256` with SHA-256, verification only.
#[derive(Debug, Default, Clone, Copy)]
pub struct P256;

/// EdDSA over `Ed25519`, verification only.
#[derive(Debug, Default, Clone, Copy)]
pub struct Ed25519;

fn group(nid: Nid) -> Result<EcGroup, CryptoError> {
    EcGroup::from_curve_name(nid).foreign_err(|| CryptoError::CryptoBackend)
}

fn bn_ctx() -> Result<BigNumContext, CryptoError> {
    BigNumContext::new().foreign_err(|| CryptoError::CryptoBackend)
}

fn order(group: &EcGroup, ctx: &mut BigNumContext) -> Result<BigNum, CryptoError> {
    let mut order = BigNum::new().foreign_err(|| CryptoError::CryptoBackend)?;
    group
        .order(&mut order, ctx)
        .foreign_err(|| CryptoError::CryptoBackend)?;
    Ok(order)
}

/// Builds the `secp256k1` key pair of the raw private scalar.
fn secp256k1_private_key(scalar: &[u8]) -> Result<EcKey<Private>, CryptoError> {
    if scalar.len() != COORDINATE_LEN {
        return Err(Error::root(CryptoError::InvalidSecret))
            .ctx(|| format!("secret has {} bytes", scalar.len()));
    }

    let group = group(Nid::SECP256K1)?;
    let mut ctx = bn_ctx()?;
    let scalar = BigNum::from_slice(scalar).foreign_err(|| CryptoError::InvalidSecret)?;

    let order = order(&group, &mut ctx)?;
    if scalar.num_bits() == 0 || scalar.ucmp(&order) != Ordering::Less {
        return Err(Error::root(CryptoError::InvalidSecret))
            .ctx(|| "scalar is outside of the curve order range");
    }

    let mut point = EcPoint::new(&group).foreign_err(|| CryptoError::CryptoBackend)?;
    point
        .mul_generator(&group, &scalar, &ctx)
        .foreign_err(|| CryptoError::CryptoBackend)?;

    EcKey::from_private_components(&group, &scalar, &point)
        .foreign_err(|| CryptoError::InvalidSecret)
}

fn ecdsa_signature_to_bytes(signature: &EcdsaSig) -> Result<Vec<u8>, CryptoError> {
    let mut bytes = signature
        .r()
        .to_vec_padded(COORDINATE_LEN as i32)
        .foreign_err(|| CryptoError::CryptoBackend)?;
    bytes.extend(
        signature
            .s()
            .to_vec_padded(COORDINATE_LEN as i32)
            .foreign_err(|| CryptoError::CryptoBackend)?,
    );
    Ok(bytes)
}

fn ecdsa_signature_from_bytes(signature: &[u8]) -> Result<EcdsaSig, CryptoError> {
    if signature.len() != SIGNATURE_LEN {
        return Err(Error::root(CryptoError::MalformedSignature))
            .ctx(|| format!("signature has {} bytes", signature.len()));
    }

    let (r, s) = signature.split_at(COORDINATE_LEN);
    let r = BigNum::from_slice(r).foreign_err(|| CryptoError::MalformedSignature)?;
    let s = BigNum::from_slice(s).foreign_err(|| CryptoError::MalformedSignature)?;
    EcdsaSig::from_private_components(r, s).foreign_err(|| CryptoError::MalformedSignature)
}

/// Replaces `s` with `n - s` when it lies in the upper half of the order.
fn normalize_low_s(
    signature: EcdsaSig,
    order: &BigNumRef,
) -> Result<EcdsaSig, CryptoError> {
    let mut half_order = BigNum::new().foreign_err(|| CryptoError::CryptoBackend)?;
    half_order
        .rshift1(order)
        .foreign_err(|| CryptoError::CryptoBackend)?;

    if signature.s().ucmp(&half_order) != Ordering::Greater {
        return Ok(signature);
    }

    let mut low_s = BigNum::new().foreign_err(|| CryptoError::CryptoBackend)?;
    low_s
        .checked_sub(order, signature.s())
        .foreign_err(|| CryptoError::CryptoBackend)?;
    let r = signature
        .r()
        .to_owned()
        .foreign_err(|| CryptoError::CryptoBackend)?;

    EcdsaSig::from_private_components(r, low_s).foreign_err(|| CryptoError::CryptoBackend)
}

fn verify_ecdsa(
    key: &EcKey<Public>,
    signature: &[u8],
    message: &[u8],
) -> Result<bool, CryptoError> {
    let signature = ecdsa_signature_from_bytes(signature)?;
    signature
        .verify(&sha256(message), key)
        .foreign_err(|| CryptoError::CryptoBackend)
}

impl Signing for Secp256k1 {
    fn sign(&self, message: &[u8], secret: &dyn Secret) -> Result<Vec<u8>, CryptoError> {
        secret.with_unprotected_bytes(|scalar| {
            let key = secp256k1_private_key(scalar)?;
            let signature = EcdsaSig::sign(&sha256(message), &key)
                .foreign_err(|| CryptoError::CryptoBackend)?;

            let mut ctx = bn_ctx()?;
            let order = order(&group(Nid::SECP256K1)?, &mut ctx)?;
            ecdsa_signature_to_bytes(&normalize_low_s(signature, &order)?)
        })
    }
}

impl Verifying for Secp256k1 {
    fn is_valid_signature(
        &self,
        signature: &[u8],
        message: &[u8],
        public_key: &PublicKey,
    ) -> Result<bool, CryptoError> {
        let group = group(Nid::SECP256K1)?;
        let mut ctx = bn_ctx()?;

        let point = EcPoint::from_bytes(&group, public_key.uncompressed_value(), &mut ctx)
            .foreign_err(|| {
                CryptoError::InvalidPublicKey("not a secp256k1 point".to_owned())
            })?;
        let key = EcKey::from_public_key(&group, &point)
            .foreign_err(|| CryptoError::InvalidPublicKey("not a secp256k1 key".to_owned()))?;

        verify_ecdsa(&key, signature, message)
    }
}

impl PublicKeyDerivation for Secp256k1 {
    fn public_key(&self, secret: &dyn Secret) -> Result<PublicKey, CryptoError> {
        secret.with_unprotected_bytes(|scalar| {
            let key = secp256k1_private_key(scalar)?;
            let mut ctx = bn_ctx()?;

            let uncompressed = key
                .public_key()
                .to_bytes(key.group(), PointConversionForm::UNCOMPRESSED, &mut ctx)
                .foreign_err(|| CryptoError::CryptoBackend)?;

            Ok(PublicKey::from_uncompressed(public_key::SECP256K1, uncompressed))
        })
    }
}

impl Verifying for P256 {
    fn is_valid_signature(
        &self,
        signature: &[u8],
        message: &[u8],
        public_key: &PublicKey,
    ) -> Result<bool, CryptoError> {
        let group = group(Nid::X9_62_PRIME256V1)?;
        let (x, y) = public_key.coordinates()?;
        let invalid = || CryptoError::InvalidPublicKey("not a P-256 key".to_owned());

        let x = BigNum::from_slice(x).foreign_err(invalid)?;
        let y = BigNum::from_slice(y).foreign_err(invalid)?;
        let key = EcKey::from_public_key_affine_coordinates(&group, &x, &y).foreign_err(invalid)?;

        verify_ecdsa(&key, signature, message)
    }
}

impl Verifying for Ed25519 {
    fn is_valid_signature(
        &self,
        signature: &[u8],
        message: &[u8],
        public_key: &PublicKey,
    ) -> Result<bool, CryptoError> {
        if signature.len() != SIGNATURE_LEN {
            return Err(Error::root(CryptoError::MalformedSignature))
                .ctx(|| format!("signature has {} bytes", signature.len()));
        }

        let key = PKey::public_key_from_raw_bytes(public_key.uncompressed_value(), Id::ED25519)
            .foreign_err(|| CryptoError::InvalidPublicKey("not an Ed25519 key".to_owned()))?;

        let mut verifier =
            Verifier::new_without_digest(&key).foreign_err(|| CryptoError::CryptoBackend)?;
        verifier
            .verify_oneshot(signature, message)
            .foreign_err(|| CryptoError::CryptoBackend)
    }
}
