use crate::core::{
    command_init::{CommandContext, GlobalOptions},
    error::Result,
    print_info, print_success,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteAction {
    Add,
    Remove,
}

pub fn execute_favorite(
    options: &GlobalOptions,
    action: FavoriteAction,
    resolution: &str,
) -> Result<()> {
    let mut context = CommandContext::initialize(options)?;
    let mut node = context.node();

    match action {
        FavoriteAction::Add => {
            if node.add_favorite(resolution)? {
                print_success(&format!("Added {resolution} to favorites"));
            } else {
                print_info(&format!("{resolution} is already a favorite"));
            }
        }
        FavoriteAction::Remove => {
            if node.remove_favorite(resolution)? {
                print_success(&format!("Removed {resolution} from favorites"));
            } else {
                print_info(&format!("{resolution} is not a favorite"));
            }
        }
    }

    Ok(())
}
