//! Account commands: register, login, logout, whoami.

use dramatis::SessionController;

use crate::cli::{LoginArgs, RegisterArgs};

pub async fn register(
    controller: &SessionController,
    args: &RegisterArgs,
) -> dramatis::Result<()> {
    let session = controller
        .register(&args.username, &args.email, &args.password)
        .await?;
    println!("Signed in as {}", session.label());
    Ok(())
}

pub async fn login(controller: &SessionController, args: &LoginArgs) -> dramatis::Result<()> {
    let session = controller.login(&args.email, &args.password).await?;
    println!("Signed in as {}", session.label());
    Ok(())
}

pub async fn logout(controller: &SessionController) -> dramatis::Result<()> {
    controller.logout().await
}

pub async fn whoami(controller: &SessionController) -> dramatis::Result<()> {
    match controller.session() {
        Some(session) => {
            println!("{} <{}>", session.label(), session.email);
            println!("account id: {}", session.user_id);
        }
        None => println!("Not signed in."),
    }
    Ok(())
}
