// src/certs.rs

//! Contract with the certificate-authority collaborator.
//!
//! The provisioning script is expected to leave a PEM-encoded CA certificate
//! at a well-known path; HTTPS clients trust the environment through it. We
//! only check that it is there and looks like a certificate.

use std::fs;
use std::io;
use std::path::Path;

use tracing::{info, warn};

use crate::types::Hostname;

const PEM_CERT_HEADER: &str = "-----BEGIN CERTIFICATE-----";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaCertStatus {
    Present,
    Missing,
    /// The file exists but holds no PEM certificate block.
    NotPem,
}

pub fn inspect_ca_cert(path: &Path) -> io::Result<CaCertStatus> {
    match fs::read(path) {
        Ok(bytes) => {
            let text = String::from_utf8_lossy(&bytes);
            if text.contains(PEM_CERT_HEADER) {
                Ok(CaCertStatus::Present)
            } else {
                Ok(CaCertStatus::NotPem)
            }
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(CaCertStatus::Missing),
        Err(e) => Err(e),
    }
}

/// Log the state of the CA certificate. Never fails the run.
pub fn report_ca_cert(path: &Path, hostname: &Hostname) {
    match inspect_ca_cert(path) {
        Ok(CaCertStatus::Present) => info!(
            path = %path.display(),
            %hostname,
            "CA certificate ready; trust it to reach https://{hostname}"
        ),
        Ok(CaCertStatus::Missing) => warn!(
            path = %path.display(),
            %hostname,
            "no CA certificate found; HTTPS clients will not trust {hostname}"
        ),
        Ok(CaCertStatus::NotPem) => warn!(
            path = %path.display(),
            "CA certificate file does not contain a PEM certificate"
        ),
        Err(e) => warn!(
            path = %path.display(),
            error = %e,
            "could not read CA certificate"
        ),
    }
}
