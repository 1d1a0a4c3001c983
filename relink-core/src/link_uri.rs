// SPDX-FileCopyrightText: 2026 Relink Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Linking URI
//!
//! The scannable link shown to the primary device: the session's linking
//! identifier plus the new device's temporary identity public key, encoded
//! as a URI the primary device's scanner understands.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use uuid::Uuid;

use crate::crypto::keys::PublicKey;
use crate::error::ProvisionError;

/// URI prefix for linking codes.
const URI_PREFIX: &str = "relink://provision?";

/// A scannable linking code.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkingUri {
    uuid: Uuid,
    public_key: PublicKey,
}

impl LinkingUri {
    /// Builds a linking URI from the session identifier and the temporary
    /// identity public key.
    pub fn new(uuid: Uuid, public_key: PublicKey) -> Self {
        LinkingUri { uuid, public_key }
    }

    /// Returns the linking identifier.
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// Returns the temporary identity public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Encodes the URI string embedded in the scannable code.
    pub fn to_uri_string(&self) -> String {
        format!(
            "{URI_PREFIX}uuid={}&pub_key={}",
            self.uuid,
            URL_SAFE_NO_PAD.encode(self.public_key.serialize())
        )
    }

    /// Parses a scanned URI string.
    pub fn from_uri_string(uri: &str) -> Result<Self, ProvisionError> {
        let query = uri
            .strip_prefix(URI_PREFIX)
            .ok_or(ProvisionError::DecodeError)?;

        let mut uuid = None;
        let mut public_key = None;
        for pair in query.split('&') {
            let (key, value) = pair.split_once('=').ok_or(ProvisionError::DecodeError)?;
            match key {
                "uuid" => {
                    let parsed = Uuid::parse_str(value).map_err(|_| ProvisionError::DecodeError)?;
                    uuid = Some(parsed);
                }
                "pub_key" => {
                    let bytes = URL_SAFE_NO_PAD
                        .decode(value)
                        .map_err(|_| ProvisionError::DecodeError)?;
                    let parsed = PublicKey::from_bytes(&bytes)
                        .map_err(|_| ProvisionError::DecodeError)?;
                    public_key = Some(parsed);
                }
                // Unknown parameters are ignored for forward compatibility.
                _ => {}
            }
        }

        match (uuid, public_key) {
            (Some(uuid), Some(public_key)) => Ok(LinkingUri { uuid, public_key }),
            _ => Err(ProvisionError::DecodeError),
        }
    }

    /// Generates a QR code image as a string representation.
    pub fn to_qr_image_string(&self) -> String {
        use qrcode::QrCode;

        let data = self.to_uri_string();
        let code = QrCode::new(&data).expect("QR generation should not fail");

        code.render()
            .light_color(' ')
            .dark_color('█')
            .quiet_zone(false)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::KeyPair;

    #[test]
    fn test_uri_roundtrip() {
        let pair = KeyPair::generate();
        let uri = LinkingUri::new(Uuid::new_v4(), pair.public);

        let restored = LinkingUri::from_uri_string(&uri.to_uri_string()).unwrap();
        assert_eq!(restored, uri);
    }

    #[test]
    fn test_uri_rejects_wrong_scheme() {
        let result = LinkingUri::from_uri_string("https://example.com/?uuid=x&pub_key=y");
        assert!(matches!(result, Err(ProvisionError::DecodeError)));
    }

    #[test]
    fn test_uri_rejects_missing_key() {
        let uri = format!("{URI_PREFIX}uuid={}", Uuid::new_v4());
        assert!(matches!(
            LinkingUri::from_uri_string(&uri),
            Err(ProvisionError::DecodeError)
        ));
    }

    #[test]
    fn test_uri_rejects_bad_key_bytes() {
        let uri = format!(
            "{URI_PREFIX}uuid={}&pub_key={}",
            Uuid::new_v4(),
            URL_SAFE_NO_PAD.encode([0u8; 5])
        );
        assert!(matches!(
            LinkingUri::from_uri_string(&uri),
            Err(ProvisionError::DecodeError)
        ));
    }

    #[test]
    fn test_uri_rejects_wrong_key_type_byte() {
        let pair = KeyPair::generate();
        let mut wire = pair.public.serialize();
        wire[0] = 0x04;

        let uri = format!(
            "{URI_PREFIX}uuid={}&pub_key={}",
            Uuid::new_v4(),
            URL_SAFE_NO_PAD.encode(wire)
        );
        assert!(matches!(
            LinkingUri::from_uri_string(&uri),
            Err(ProvisionError::DecodeError)
        ));
    }

    #[test]
    fn test_uri_ignores_unknown_params() {
        let pair = KeyPair::generate();
        let original = LinkingUri::new(Uuid::new_v4(), pair.public);
        let uri = format!("{}&capabilities=ni", original.to_uri_string());

        let restored = LinkingUri::from_uri_string(&uri).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn test_qr_image_string() {
        let pair = KeyPair::generate();
        let uri = LinkingUri::new(Uuid::new_v4(), pair.public);

        let image = uri.to_qr_image_string();
        assert!(!image.is_empty());
        assert!(image.contains('█') || image.contains(' '));
    }
}
