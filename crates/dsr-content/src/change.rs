//! Deciding whether staged content differs from what is persisted.

use crate::content::ContentHandle;

/// Content-equality predicate supplied by the owner of a datastream.
///
/// The resolver only consumes the answer; it never diffs content itself.
pub trait ChangeDetector<C>: Send + Sync {
    /// `true` if `staged` differs from the persisted content.
    fn is_changed(&self, staged: &C) -> bool;
}

impl<C, F> ChangeDetector<C> for F
where
    F: Fn(&C) -> bool + Send + Sync,
{
    fn is_changed(&self, staged: &C) -> bool {
        self(staged)
    }
}

/// Treats any staged content as changed.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysChanged;

impl<C> ChangeDetector<C> for AlwaysChanged {
    fn is_changed(&self, _staged: &C) -> bool {
        true
    }
}

/// Compares in-memory staged content against a BLAKE3 digest of the last
/// persisted content.
///
/// Files and streams are always considered changed since hashing them would
/// consume the handle. With no known persisted digest, everything is
/// changed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DigestChangeDetector {
    persisted: Option<blake3::Hash>,
}

impl DigestChangeDetector {
    /// A detector that knows nothing about persisted content.
    pub fn unknown() -> Self {
        Self::default()
    }

    /// A detector seeded with the persisted bytes.
    pub fn for_content(persisted: &[u8]) -> Self {
        Self {
            persisted: Some(blake3::hash(persisted)),
        }
    }

    /// Record new persisted bytes, e.g. after a save or a load.
    pub fn set_persisted(&mut self, persisted: &[u8]) {
        self.persisted = Some(blake3::hash(persisted));
    }

    /// Forget the persisted digest.
    pub fn clear(&mut self) {
        self.persisted = None;
    }

    /// Hex digest of the persisted content, if known.
    pub fn persisted_hex(&self) -> Option<String> {
        self.persisted.map(|h| hex::encode(h.as_bytes()))
    }
}

impl ChangeDetector<ContentHandle> for DigestChangeDetector {
    fn is_changed(&self, staged: &ContentHandle) -> bool {
        match (self.persisted, staged.as_bytes()) {
            (Some(persisted), Some(bytes)) => blake3::hash(bytes) != persisted,
            _ => true,
        }
    }
}
