//! Certificate store. Reads the AWS IoT mutual-TLS material from NVS.
//!
//! ## NVS layout (`certs` namespace)
//!
//! | Key            | Content                                 |
//! |----------------|-----------------------------------------|
//! | `ca_cert`      | PEM-encoded Amazon root CA              |
//! | `device_cert`  | PEM-encoded device certificate          |
//! | `private_key`  | PEM-encoded device private key          |
//!
//! Every blob is kept NUL-terminated so mbedTLS can parse it in place.

use log::{info, warn};

/// Maximum certificate size (PEM format, includes headers).
const MAX_CERT_SIZE: usize = 2048;

/// Maximum private key size.
const MAX_KEY_SIZE: usize = 2048;

/// NVS namespace holding the TLS material.
pub const CERT_NAMESPACE: &str = "certs";

pub const KEY_CA_CERT: &str = "ca_cert";
pub const KEY_DEVICE_CERT: &str = "device_cert";
pub const KEY_PRIVATE_KEY: &str = "private_key";

/// Container for loaded certificate material.
pub struct CertBundle {
    /// Root CA the broker chains to.
    pub ca_cert: heapless::Vec<u8, MAX_CERT_SIZE>,
    /// Device certificate registered with the thing.
    pub device_cert: heapless::Vec<u8, MAX_CERT_SIZE>,
    /// Device private key.
    pub private_key: heapless::Vec<u8, MAX_KEY_SIZE>,
}

impl CertBundle {
    pub const fn empty() -> Self {
        Self {
            ca_cert: heapless::Vec::new(),
            device_cert: heapless::Vec::new(),
            private_key: heapless::Vec::new(),
        }
    }

    /// Build a bundle from PEM text, appending the terminating NUL.
    pub fn from_pem(ca_cert: &[u8], device_cert: &[u8], private_key: &[u8]) -> Result<Self, CertStoreError> {
        let mut bundle = Self::empty();
        nul_terminated(&mut bundle.ca_cert, ca_cert)?;
        nul_terminated(&mut bundle.device_cert, device_cert)?;
        nul_terminated(&mut bundle.private_key, private_key)?;
        Ok(bundle)
    }

    /// All three blobs present and NUL-terminated.
    pub fn is_complete(&self) -> bool {
        [&self.ca_cert[..], &self.device_cert[..], &self.private_key[..]]
            .iter()
            .all(|blob| blob.len() > 1 && blob.last() == Some(&0))
    }
}

fn nul_terminated<const N: usize>(
    dst: &mut heapless::Vec<u8, N>,
    pem: &[u8],
) -> Result<(), CertStoreError> {
    dst.clear();
    let body = pem.strip_suffix(&[0]).unwrap_or(pem);
    dst.extend_from_slice(body).map_err(|_| CertStoreError::TooLarge)?;
    dst.push(0).map_err(|_| CertStoreError::TooLarge)
}

/// Certificate store adapter.
pub struct CertStore {
    #[cfg(target_os = "espidf")]
    partition: esp_idf_svc::nvs::EspDefaultNvsPartition,
}

impl CertStore {
    #[cfg(target_os = "espidf")]
    pub fn new(partition: esp_idf_svc::nvs::EspDefaultNvsPartition) -> Self {
        Self { partition }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Self {
        Self {}
    }

    /// Load the certificate bundle from the platform store.
    ///
    /// Returns `None` if any of the three blobs is missing.
    pub fn load_bundle(&self) -> Option<CertBundle> {
        let bundle = self.platform_load()?;

        if !bundle.is_complete() {
            warn!("CertStore: incomplete certificate bundle");
            return None;
        }

        info!(
            "CertStore: loaded certificate bundle (ca={}B, cert={}B, key={}B)",
            bundle.ca_cert.len(),
            bundle.device_cert.len(),
            bundle.private_key.len(),
        );

        Some(bundle)
    }

    // ── Platform-specific loading ────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_load(&self) -> Option<CertBundle> {
        use esp_idf_svc::nvs::{EspNvs, NvsDefault};

        let nvs = EspNvs::<NvsDefault>::new(self.partition.clone(), CERT_NAMESPACE, false)
            .map_err(|e| warn!("CertStore: namespace '{}' unavailable ({:?})", CERT_NAMESPACE, e))
            .ok()?;

        let mut buf = [0u8; MAX_CERT_SIZE];
        let mut read = |key: &str| -> Option<heapless::Vec<u8, MAX_CERT_SIZE>> {
            match nvs.get_blob(key, &mut buf) {
                Ok(Some(blob)) => heapless::Vec::from_slice(blob).ok(),
                _ => {
                    warn!("CertStore: '{}' missing", key);
                    None
                }
            }
        };

        let ca = read(KEY_CA_CERT)?;
        let cert = read(KEY_DEVICE_CERT)?;
        let key = read(KEY_PRIVATE_KEY)?;
        CertBundle::from_pem(&ca, &cert, &key).ok()
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_load(&self) -> Option<CertBundle> {
        info!("CertStore(sim): no certificate material in simulation");
        None
    }
}

/// Errors from the certificate store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertStoreError {
    TooLarge,
}

impl core::fmt::Display for CertStoreError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::TooLarge => write!(f, "certificate exceeds store capacity"),
        }
    }
}

// ── Tests ────────────────────────────────────────────────────
