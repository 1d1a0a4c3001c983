// SPDX-FileCopyrightText: 2026 Relink Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Provisioning Key Agreement
//!
//! ECDH followed by HKDF expansion into one encryption key and one MAC key.
//! The derivation is a pure function over its inputs; a [`DerivedKeys`] value
//! is used for at most one encrypt/decrypt pair and never cached.

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroize;

use super::keys::{PrivateKey, PublicKey};
use crate::error::ProvisionError;

/// Fixed HKDF context string for the provisioning derivation.
const PROVISIONING_INFO: &[u8] = b"TextSecure Provisioning Message";

/// Keys derived for one provisioning envelope.
pub struct DerivedKeys {
    enc_key: [u8; 32],
    mac_key: [u8; 32],
}

impl Drop for DerivedKeys {
    fn drop(&mut self) {
        self.enc_key.zeroize();
        self.mac_key.zeroize();
    }
}

impl std::fmt::Debug for DerivedKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKeys")
            .field("enc_key", &"[REDACTED]")
            .field("mac_key", &"[REDACTED]")
            .finish()
    }
}

impl DerivedKeys {
    /// AES-256 encryption key.
    pub fn enc_key(&self) -> &[u8; 32] {
        &self.enc_key
    }

    /// HMAC-SHA256 key.
    pub fn mac_key(&self) -> &[u8; 32] {
        &self.mac_key
    }
}

/// Derives the provisioning cipher keys from an ECDH agreement.
///
/// Computes the X25519 shared secret, expands it to 64 bytes via
/// HKDF-SHA256 with the fixed context string, and splits the output into
/// the encryption key (first half) and MAC key (second half).
pub fn derive_provisioning_keys(
    our_private: &PrivateKey,
    their_public: &PublicKey,
) -> Result<DerivedKeys, ProvisionError> {
    let mut shared = our_private.agree(their_public)?;

    let hkdf = Hkdf::<Sha256>::new(None, &shared);
    let mut okm = [0u8; 64];
    let Ok(()) = hkdf.expand(PROVISIONING_INFO, &mut okm) else {
        unreachable!("64 bytes is a valid HKDF-SHA256 output length");
    };
    shared.zeroize();

    let mut enc_key = [0u8; 32];
    let mut mac_key = [0u8; 32];
    enc_key.copy_from_slice(&okm[..32]);
    mac_key.copy_from_slice(&okm[32..]);
    okm.zeroize();

    Ok(DerivedKeys { enc_key, mac_key })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::KeyPair;

    #[test]
    fn test_derivation_is_symmetric() {
        // Ephemeral-against-identity in both directions must agree,
        // since the cipher derives from either side of the same ECDH.
        let ephemeral = KeyPair::generate();
        let identity = KeyPair::generate();

        let sender = derive_provisioning_keys(&ephemeral.private, &identity.public).unwrap();
        let receiver = derive_provisioning_keys(&identity.private, &ephemeral.public).unwrap();

        assert_eq!(sender.enc_key(), receiver.enc_key());
        assert_eq!(sender.mac_key(), receiver.mac_key());
    }

    #[test]
    fn test_enc_and_mac_keys_differ() {
        let a = KeyPair::generate();
        let b = KeyPair::generate();

        let keys = derive_provisioning_keys(&a.private, &b.public).unwrap();
        assert_ne!(keys.enc_key(), keys.mac_key());
    }

    #[test]
    fn test_different_peers_derive_different_keys() {
        let ours = KeyPair::generate();
        let peer_a = KeyPair::generate();
        let peer_b = KeyPair::generate();

        let ka = derive_provisioning_keys(&ours.private, &peer_a.public).unwrap();
        let kb = derive_provisioning_keys(&ours.private, &peer_b.public).unwrap();

        assert_ne!(ka.enc_key(), kb.enc_key());
    }

    #[test]
    fn test_debug_redacted() {
        let a = KeyPair::generate();
        let b = KeyPair::generate();
        let keys = derive_provisioning_keys(&a.private, &b.public).unwrap();

        assert!(format!("{keys:?}").contains("REDACTED"));
    }
}
