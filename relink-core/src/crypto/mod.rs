// SPDX-FileCopyrightText: 2026 Relink Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

pub mod agreement;
pub mod device_name;
pub mod keys;
pub mod provisioning_cipher;

pub use agreement::{derive_provisioning_keys, DerivedKeys};
pub use device_name::{DeviceNameCodec, DeviceNameRecord};
pub use keys::{KeyPair, PrivateKey, PublicKey, PUBLIC_KEY_SERIALIZED_LEN};
pub use provisioning_cipher::{ProvisionEnvelope, ProvisionVersion, ProvisioningCipher};
