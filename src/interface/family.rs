//! Interface families and revision parsing.
//!
//! The target runtime hands out its interfaces by name. Every name has the form
//! `"<Family>_<digits>"`, e.g. `"IVRCompositor_027"`, where the numeric suffix identifies a
//! historical layout of the family's dispatch table. This module classifies such names
//! without any side effects.
//!
//! # Examples
//!
//! ```rust
//! use vrshim::interface::{InterfaceFamily, InterfaceVersion};
//!
//! let version = InterfaceVersion::parse("IVRCompositor_009").unwrap();
//! assert_eq!(version.family, InterfaceFamily::Compositor);
//! assert_eq!(version.revision, 9);
//!
//! assert_eq!(InterfaceFamily::Compositor.parse_revision("IVRCompositor_9a"), None);
//! assert!(InterfaceVersion::parse("IVRChaperone_003").is_none());
//! ```

use std::fmt;

use strum::{Display, EnumCount, EnumIter, IntoEnumIterator, IntoStaticStr};

/// A named group of related calls exposed by the target runtime.
///
/// Families are versioned independently from each other. The `Display` output and
/// [`prefix`](Self::prefix) are the exact, case-sensitive name prefix the runtime uses.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    EnumCount,
    Display,
    IntoStaticStr,
)]
pub enum InterfaceFamily {
    /// `IVRClientCore`, the runtime's root object. Owns the object-level interface factory
    /// and the cleanup call that ends a load cycle.
    #[strum(serialize = "IVRClientCore")]
    ClientCore,
    /// `IVRCompositor`, owner of the frame submission call.
    #[strum(serialize = "IVRCompositor")]
    Compositor,
    /// `IVRSystem`, owner of the render target sizing query.
    #[strum(serialize = "IVRSystem")]
    System,
}

impl InterfaceFamily {
    /// Returns the interface-name prefix of this family.
    #[must_use]
    pub fn prefix(self) -> &'static str {
        self.into()
    }

    /// Extracts the revision from `name` if it belongs to this family.
    ///
    /// The name must be exactly the family prefix, an underscore and a non-empty run of ASCII
    /// decimal digits that fits into a `u32`. Anything else, including trailing characters
    /// after the digits, is not a match.
    ///
    /// # Arguments
    ///
    /// * `name` - The interface name requested from the runtime
    ///
    /// # Returns
    ///
    /// `Some(revision)` on a match, `None` otherwise.
    #[must_use]
    pub fn parse_revision(self, name: &str) -> Option<u32> {
        let digits = name.strip_prefix(self.prefix())?.strip_prefix('_')?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        digits.parse().ok()
    }
}

/// A classified interface name: which family it belongs to and which revision it requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InterfaceVersion {
    /// The family the name belongs to.
    pub family: InterfaceFamily,
    /// The numeric revision suffix.
    pub revision: u32,
}

impl InterfaceVersion {
    /// Creates a new interface version.
    #[must_use]
    pub fn new(family: InterfaceFamily, revision: u32) -> Self {
        Self { family, revision }
    }

    /// Classifies an interface name against every known family.
    ///
    /// Families are tried in declaration order; family prefixes never overlap once the
    /// separating underscore is taken into account, so at most one family can match.
    ///
    /// # Arguments
    ///
    /// * `name` - The interface name requested from the runtime
    ///
    /// # Returns
    ///
    /// The family and revision, or `None` if the name belongs to no tracked family or is
    /// malformed.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        InterfaceFamily::iter().find_map(|family| {
            family
                .parse_revision(name)
                .map(|revision| Self::new(family, revision))
        })
    }
}

impl fmt::Display for InterfaceVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{:03}", self.family, self.revision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixes() {
        assert_eq!(InterfaceFamily::ClientCore.prefix(), "IVRClientCore");
        assert_eq!(InterfaceFamily::Compositor.prefix(), "IVRCompositor");
        assert_eq!(InterfaceFamily::System.prefix(), "IVRSystem");
        assert_eq!(InterfaceFamily::COUNT, 3);
    }

    #[test]
    fn test_parse_revision_leading_zeros() {
        assert_eq!(
            InterfaceFamily::Compositor.parse_revision("IVRCompositor_009"),
            Some(9)
        );
        assert_eq!(
            InterfaceFamily::System.parse_revision("IVRSystem_022"),
            Some(22)
        );
        assert_eq!(
            InterfaceFamily::ClientCore.parse_revision("IVRClientCore_0"),
            Some(0)
        );
    }

    #[test]
    fn test_parse_revision_rejects_malformed() {
        let family = InterfaceFamily::Compositor;
        assert_eq!(family.parse_revision("IVRCompositor_9a"), None);
        assert_eq!(family.parse_revision("IVRCompositor_"), None);
        assert_eq!(family.parse_revision("IVRCompositor009"), None);
        assert_eq!(family.parse_revision("IVRCompositor_+9"), None);
        assert_eq!(family.parse_revision("IVRCompositor_-1"), None);
        assert_eq!(family.parse_revision("IVRCompositor_ 9"), None);
        assert_eq!(family.parse_revision("ivrcompositor_009"), None);
        assert_eq!(family.parse_revision("XIVRCompositor_009"), None);
        assert_eq!(family.parse_revision("IVRCompositor_99999999999"), None);
    }

    #[test]
    fn test_parse_revision_is_family_specific() {
        assert_eq!(
            InterfaceFamily::System.parse_revision("IVRSystemEx_003"),
            None
        );
        assert_eq!(
            InterfaceFamily::System.parse_revision("IVRCompositor_003"),
            None
        );
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            InterfaceVersion::parse("IVRClientCore_003"),
            Some(InterfaceVersion::new(InterfaceFamily::ClientCore, 3))
        );
        assert_eq!(
            InterfaceVersion::parse("IVRCompositor_027"),
            Some(InterfaceVersion::new(InterfaceFamily::Compositor, 27))
        );
        assert_eq!(InterfaceVersion::parse("IVRChaperone_003"), None);
        assert_eq!(InterfaceVersion::parse("FnTable:IVRSystem_022"), None);
        assert_eq!(InterfaceVersion::parse(""), None);
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        let version = InterfaceVersion::new(InterfaceFamily::Compositor, 9);
        assert_eq!(version.to_string(), "IVRCompositor_009");
        assert_eq!(InterfaceVersion::parse(&version.to_string()), Some(version));
    }
}
