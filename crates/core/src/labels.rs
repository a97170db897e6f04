//! The `loom:*` label vocabulary that doubles as Loom's wire protocol
//! between the daemon and the platform (spec §6 "Label protocol").

/// A curated proposal, architect-authored and not yet promoted.
pub const ARCHITECT: &str = "loom:architect";
/// A proposal surfaced by the hermit triage pass.
pub const HERMIT: &str = "loom:hermit";
/// A proposal that has passed curation and is awaiting promotion.
pub const CURATED: &str = "loom:curated";
/// An issue ready for a shepherd to pick up.
pub const ISSUE: &str = "loom:issue";
/// An issue currently owned by a shepherd.
pub const BUILDING: &str = "loom:building";
/// A PR is open and awaiting judge/champion review.
pub const PR: &str = "loom:pr";
/// The judge has requested changes on the open PR.
pub const CHANGES_REQUESTED: &str = "loom:changes-requested";
/// Escalated: requires human intervention before work resumes.
pub const BLOCKED: &str = "loom:blocked";

/// Labels `promote_proposals` is willing to remove when promoting a
/// proposal to `loom:issue`, per `daemon_v2/actions/proposals.py`.
pub const PROMOTABLE: &[&str] = &[ARCHITECT, HERMIT, CURATED];
