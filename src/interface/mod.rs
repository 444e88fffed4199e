//! Interface names, revisions and dispatch-slot layouts of the target runtime.
//!
//! Everything in this module is pure: classifying an interface name and looking up where a
//! call lives in a given revision have no side effects, which keeps them testable apart from
//! the installation machinery in [`crate::shim`].
//!
//! # Key Types
//!
//! - [`InterfaceFamily`] - The tracked interface families
//! - [`InterfaceVersion`] - A classified `"<Family>_<revision>"` name
//! - [`SlotTable`] - Revision to dispatch-slot policy for every intercepted call

mod family;
mod slots;

pub use family::{InterfaceFamily, InterfaceVersion};
pub use slots::{CallPolicy, CallSite, RevisionRange, SlotRule, SlotTable};
