//! Permissions and the approval lifecycle of roster records.

mod approval;
mod permissions;

pub use approval::{
    MutationPlan, RejectionPlan, SubmitPlan, plan_approval, plan_proposal, plan_rejection,
    plan_submit, resolve_proposal_state,
};
pub use permissions::{check_approval_permission, check_edit_permission, check_submit_permission};
