//! Git plumbing for delivering projects.
//!
//! - Resolving revisions and creating local branches
//! - Managing the push remote of a checkout
//! - Non-forcing pushes with injected credentials

mod checkout;
mod credentials;

pub use checkout::LocalCheckout;
pub use credentials::credential_callbacks;
