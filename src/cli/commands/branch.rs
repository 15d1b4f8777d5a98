//! branch command - Create, read, delete, or import a branch

use anyhow::Result;

use super::{print_state, Context};
use crate::cli::args::BranchAction;
use crate::resource::BranchConfig;

/// Run a branch lifecycle step and print the resulting state.
pub async fn branch(ctx: &Context, action: BranchAction) -> Result<()> {
    let branches = ctx.branches()?;

    match action {
        BranchAction::Create {
            repository_id,
            name,
            reference,
            source_sha,
        } => {
            let mut config = BranchConfig::new(repository_id, name);
            config.reference = reference;
            config.source_sha = source_sha;
            let state = branches.create(&config).await?;
            print_state(Some(&state))
        }
        BranchAction::Read { id } => {
            let state = branches.read(&id).await?;
            print_state(state.as_ref())
        }
        BranchAction::Delete { id } => {
            branches.delete(&id).await?;
            print_state::<()>(None)
        }
        BranchAction::Import { id } => {
            let state = branches.import(&id).await?;
            print_state(Some(&state))
        }
    }
}
