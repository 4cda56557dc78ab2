//! Name transformations applied on the way to the push target.

mod branch;
mod repo;

pub use branch::BranchTransformer;
pub use repo::RepoTransformer;
