use std::fmt::{self, Display};

use md5::{Digest, Md5};
use serde::Serialize;

use crate::path;

/// Brace delimited, upper case identifier like `{53BF76E3-BA6C-3672-1B60-28EA5DA1EAFA}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Guid(String);

impl Guid {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Guid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Derives a stable identifier from the path and the name specified.
///
/// The path is normalized into Windows form first so the same input yields
/// the same identifier on every host. The identifier is built from the first
/// 128 bits of MD5 digest. It only has to be unique and stable, it's not a
/// security boundary.
#[must_use]
pub fn generate(path: &str, name: &str) -> Guid {
    let mut hasher = Md5::new();
    hasher.update(path::normalize(path).as_bytes());
    hasher.update(name.as_bytes());
    let digest = hex::encode_upper(hasher.finalize());

    Guid(format!(
        "{{{}-{}-{}-{}-{}}}",
        &digest[0..8],
        &digest[8..12],
        &digest[12..16],
        &digest[16..20],
        &digest[20..32]
    ))
}
