//! Library commands: browse public libraries, list/create/delete characters.

use dramatis::{CharacterDraft, SessionController, identity::CharacterId};

use crate::{
    cli::{CharactersArgs, CreateArgs, DeleteArgs},
    output,
};

pub async fn libraries(controller: &SessionController) -> dramatis::Result<()> {
    let entries = controller.list_public_libraries().await;
    output::print_directory(&entries);
    Ok(())
}

pub async fn characters(
    controller: &SessionController,
    args: &CharactersArgs,
) -> dramatis::Result<()> {
    match &args.owner {
        // The collection is printed by the event renderer when the load
        // lands.
        Some(owner) => {
            controller
                .select_view_target(owner.as_str().into(), None)
                .await
        }
        None => {
            if controller.session().is_none() {
                println!("Not signed in. Pass --owner <id> to browse a public library.");
                return Ok(());
            }
            // Session restoration already loaded the own collection.
            Ok(())
        }
    }
}

pub async fn create(controller: &SessionController, args: &CreateArgs) -> dramatis::Result<()> {
    let mut draft = CharacterDraft::new(&args.name);
    if let Some(image) = &args.image {
        draft = draft.with_image(image);
    }
    let character = controller.create_character(draft).await?;
    println!("created {}", character.id);
    Ok(())
}

pub async fn delete(controller: &SessionController, args: &DeleteArgs) -> dramatis::Result<()> {
    controller
        .delete_character(&CharacterId::new(&args.id))
        .await
}
