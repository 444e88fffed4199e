//! Revision to dispatch-slot policy.
//!
//! The target runtime has reshuffled its dispatch tables several times. This module records,
//! as plain data, which slot each intercepted call occupies in which revision, and which
//! replacement (argument shape) must be installed there.
//!
//! # Built-in Layouts
//!
//! | Call | Revisions | Slot | Replacement |
//! |------|-----------|------|-------------|
//! | `IVRClientCore::GetGenericInterface` | ≤ 3 | 3 | [`InterceptId::GetGenericInterface`] |
//! | `IVRClientCore::Cleanup` | ≤ 3 | 1 | [`InterceptId::Cleanup`] |
//! | `IVRCompositor::Submit` | ≥ 12 | 5 | [`InterceptId::SubmitCurrent`] |
//! | `IVRCompositor::Submit` | 9..=11 | 4 | [`InterceptId::SubmitCurrent`] |
//! | `IVRCompositor::Submit` | 8 | 6 | [`InterceptId::SubmitTyped`] |
//! | `IVRCompositor::Submit` | 7 | 6 | [`InterceptId::SubmitLegacy`] |
//! | `IVRSystem::GetRecommendedRenderTargetSize` | ≥ 9 | 0 | [`InterceptId::RecommendedRenderTargetSize`] |
//! | `IVRSystem::GetRecommendedRenderTargetSize` | ≤ 8 | 1 | [`InterceptId::RecommendedRenderTargetSize`] |
//!
//! Rules of a call are evaluated in order and the first match wins. A revision covered by no
//! rule is unsupported: the table never guesses a neighbouring layout.

use crate::{
    interface::{InterfaceFamily, InterfaceVersion},
    runtime::InterceptId,
    Error, Result,
};

/// The set of revisions a [`SlotRule`] applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevisionRange {
    /// Exactly this revision.
    Exactly(u32),
    /// This revision and every later one.
    AtLeast(u32),
    /// This revision and every earlier one.
    AtMost(u32),
    /// Every revision in the inclusive range.
    Between(u32, u32),
}

impl RevisionRange {
    /// Returns `true` if `revision` lies in this range.
    #[must_use]
    pub fn contains(self, revision: u32) -> bool {
        match self {
            RevisionRange::Exactly(r) => revision == r,
            RevisionRange::AtLeast(low) => revision >= low,
            RevisionRange::AtMost(high) => revision <= high,
            RevisionRange::Between(low, high) => (low..=high).contains(&revision),
        }
    }
}

/// One historical layout of one call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotRule {
    /// Revisions sharing this layout.
    pub revisions: RevisionRange,
    /// Dispatch table slot of the call in these revisions.
    pub slot: usize,
    /// Replacement matching the call's argument shape in these revisions.
    pub intercept: InterceptId,
}

impl SlotRule {
    /// Creates a new rule.
    #[must_use]
    pub const fn new(revisions: RevisionRange, slot: usize, intercept: InterceptId) -> Self {
        Self {
            revisions,
            slot,
            intercept,
        }
    }
}

/// All known layouts of one intercepted call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallPolicy {
    /// The family owning the call.
    pub family: InterfaceFamily,
    /// Call-site label, `Interface::Method`.
    pub label: String,
    /// Layouts, evaluated in order.
    pub rules: Vec<SlotRule>,
}

impl CallPolicy {
    /// Creates a call policy.
    #[must_use]
    pub fn new(family: InterfaceFamily, label: impl Into<String>, rules: Vec<SlotRule>) -> Self {
        Self {
            family,
            label: label.into(),
            rules,
        }
    }

    /// Returns the first rule covering `revision`.
    #[must_use]
    pub fn rule_for(&self, revision: u32) -> Option<&SlotRule> {
        self.rules.iter().find(|rule| rule.revisions.contains(revision))
    }
}

/// A resolved call site: where to install which replacement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallSite {
    /// Call-site label, `Interface::Method`.
    pub label: String,
    /// Dispatch table slot.
    pub slot: usize,
    /// Replacement to install.
    pub intercept: InterceptId,
}

/// The revision to slot policy for every intercepted call.
///
/// # Examples
///
/// ```rust
/// use vrshim::interface::{InterfaceFamily, InterfaceVersion, SlotTable};
/// use vrshim::InterceptId;
///
/// let table = SlotTable::builtin();
/// let sites = table
///     .resolve(InterfaceVersion::new(InterfaceFamily::Compositor, 27))
///     .unwrap();
/// assert_eq!(sites[0].slot, 5);
/// assert_eq!(sites[0].intercept, InterceptId::SubmitCurrent);
///
/// assert!(table
///     .resolve(InterfaceVersion::new(InterfaceFamily::Compositor, 6))
///     .is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotTable {
    policies: Vec<CallPolicy>,
}

impl SlotTable {
    /// Creates a table without any policy.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            policies: Vec::new(),
        }
    }

    /// Creates the table describing every runtime layout known to this crate.
    #[must_use]
    pub fn builtin() -> Self {
        use InterceptId::{
            Cleanup, GetGenericInterface, RecommendedRenderTargetSize, SubmitCurrent,
            SubmitLegacy, SubmitTyped,
        };
        use RevisionRange::{AtLeast, AtMost, Between, Exactly};

        Self::empty()
            .with_policy(CallPolicy::new(
                InterfaceFamily::ClientCore,
                "IVRClientCore::GetGenericInterface",
                vec![SlotRule::new(AtMost(3), 3, GetGenericInterface)],
            ))
            .with_policy(CallPolicy::new(
                InterfaceFamily::ClientCore,
                "IVRClientCore::Cleanup",
                vec![SlotRule::new(AtMost(3), 1, Cleanup)],
            ))
            .with_policy(CallPolicy::new(
                InterfaceFamily::Compositor,
                "IVRCompositor::Submit",
                vec![
                    SlotRule::new(AtLeast(12), 5, SubmitCurrent),
                    SlotRule::new(Between(9, 11), 4, SubmitCurrent),
                    SlotRule::new(Exactly(8), 6, SubmitTyped),
                    SlotRule::new(Exactly(7), 6, SubmitLegacy),
                ],
            ))
            .with_policy(CallPolicy::new(
                InterfaceFamily::System,
                "IVRSystem::GetRecommendedRenderTargetSize",
                vec![
                    SlotRule::new(AtLeast(9), 0, RecommendedRenderTargetSize),
                    SlotRule::new(AtMost(8), 1, RecommendedRenderTargetSize),
                ],
            ))
    }

    /// Adds a call policy, replacing any policy with the same family and label.
    #[must_use]
    pub fn with_policy(mut self, policy: CallPolicy) -> Self {
        self.policies
            .retain(|p| !(p.family == policy.family && p.label == policy.label));
        self.policies.push(policy);
        self
    }

    /// Adds a layout to an existing call, ahead of its current rules.
    ///
    /// Prepending lets a newly described revision take precedence over an open-ended rule
    /// such as [`RevisionRange::AtLeast`]. If the call has no policy yet, one is created.
    #[must_use]
    pub fn with_rule(
        mut self,
        family: InterfaceFamily,
        label: impl Into<String>,
        rule: SlotRule,
    ) -> Self {
        let label = label.into();
        match self
            .policies
            .iter_mut()
            .find(|p| p.family == family && p.label == label)
        {
            Some(policy) => policy.rules.insert(0, rule),
            None => self.policies.push(CallPolicy::new(family, label, vec![rule])),
        }
        self
    }

    /// Returns all policies, in insertion order.
    #[must_use]
    pub fn policies(&self) -> &[CallPolicy] {
        &self.policies
    }

    /// Resolves every call of a family for one revision.
    ///
    /// A family is only supported as a whole: if any of its calls has no rule for the
    /// revision, nothing is returned for the family.
    ///
    /// # Arguments
    ///
    /// * `version` - The family and revision to resolve
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedRevision`] if a call of the family has no rule covering
    /// the revision.
    pub fn resolve(&self, version: InterfaceVersion) -> Result<Vec<CallSite>> {
        self.policies
            .iter()
            .filter(|policy| policy.family == version.family)
            .map(|policy| {
                policy
                    .rule_for(version.revision)
                    .map(|rule| CallSite {
                        label: policy.label.clone(),
                        slot: rule.slot,
                        intercept: rule.intercept,
                    })
                    .ok_or(Error::UnsupportedRevision {
                        family: version.family,
                        revision: version.revision,
                    })
            })
            .collect()
    }

    /// Returns `true` if every call of the family has a rule for the revision.
    #[must_use]
    pub fn supports(&self, version: InterfaceVersion) -> bool {
        self.resolve(version).is_ok()
    }
}

impl Default for SlotTable {
    fn default() -> Self {
        Self::builtin()
    }
}
