//! Package identity (cache / dedup key)

use super::descriptor::PackageDescriptor;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;

/// Key a host uses to deduplicate package builds.
///
/// Two identities are equal exactly when their reference and retained
/// settings/options are equal; `package_id` is a digest over those.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PackageIdentity {
    pub reference: String,
    pub package_id: String,
    pub settings: BTreeMap<String, String>,
    pub options: BTreeMap<String, String>,
}

impl PackageIdentity {
    /// Identity from the descriptor and whatever settings/options the recipe
    /// chose to keep.
    pub fn new(
        descriptor: &PackageDescriptor,
        settings: BTreeMap<String, String>,
        options: BTreeMap<String, String>,
    ) -> Self {
        let reference = descriptor.reference();
        let package_id = hex::encode(Sha256::digest(
            canonical_info(&reference, &settings, &options).as_bytes(),
        ));
        Self {
            reference,
            package_id,
            settings,
            options,
        }
    }

    /// True when no setting or option takes part in the identity.
    pub fn is_header_only(&self) -> bool {
        self.settings.is_empty() && self.options.is_empty()
    }
}

impl fmt::Display for PackageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reference)
    }
}

/// Sorted, line-oriented rendering that the digest is computed over.
fn canonical_info(
    reference: &str,
    settings: &BTreeMap<String, String>,
    options: &BTreeMap<String, String>,
) -> String {
    let mut out = format!("[reference]\n{}\n[settings]\n", reference);
    for (k, v) in settings {
        out.push_str(&format!("{}={}\n", k, v));
    }
    out.push_str("[options]\n");
    for (k, v) in options {
        out.push_str(&format!("{}={}\n", k, v));
    }
    out
}
