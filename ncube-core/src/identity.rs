use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

/// The coordinates of a deployed cube application (spec glossary: tenant,
/// app, version, status, branch), used to scope [`super::CubeRegistry`] and
/// [`super::ResourceFetcher`] lookups.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ApplicationId {
    /// The tenant (multi-tenancy partition) owning the application.
    pub tenant: String,
    /// The application name.
    pub app: String,
    /// The application version, e.g. `"1.0.0"`.
    pub version: String,
    /// The release status, e.g. `"RELEASE"` or `"SNAPSHOT"`.
    pub status: String,
    /// The branch name, e.g. `"HEAD"`.
    pub branch: String,
}

impl ApplicationId {
    /// Creates a new application id from its five components.
    pub fn new(
        tenant: impl Into<String>,
        app: impl Into<String>,
        version: impl Into<String>,
        status: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        Self {
            tenant: tenant.into(),
            app: app.into(),
            version: version.into(),
            status: status.into(),
            branch: branch.into(),
        }
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}/{}",
            self.tenant, self.app, self.version, self.status, self.branch
        )
    }
}

/// A SHA-1 content digest (spec §4.7 "Identity & Delta", §6 compile-artifact
/// cache key): 20 bytes, formatted as lowercase hex.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sha1Digest([u8; 20]);

impl Sha1Digest {
    /// Hashes `bytes` with SHA-1 and wraps the digest.
    pub fn of(bytes: &[u8]) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(bytes);
        Self(hasher.finalize().into())
    }

    /// Wraps a raw, already-computed digest.
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// The raw 20-byte digest.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Debug for Sha1Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sha1Digest({self})")
    }
}

impl fmt::Display for Sha1Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// An incremental SHA-1 builder, for hashing a cube's identity fragment by
/// fragment (name, axis definitions, cell table, meta-properties) without
/// concatenating everything into one buffer first (spec §4.7).
#[derive(Default)]
pub struct Sha1Builder(Sha1);

impl Sha1Builder {
    /// Starts a new, empty digest builder.
    pub fn new() -> Self {
        Self(Sha1::new())
    }

    /// Feeds another fragment into the digest. Callers are responsible for
    /// separating fragments (e.g. with a delimiter byte) so that `("ab",
    /// "c")` doesn't hash the same as `("a", "bc")`.
    pub fn update(&mut self, bytes: impl AsRef<[u8]>) -> &mut Self {
        self.0.update(bytes.as_ref());
        self
    }

    /// Finalizes the digest.
    pub fn finish(self) -> Sha1Digest {
        Sha1Digest(self.0.finalize().into())
    }
}
