use clap::Parser;
use drive_template::{
    google_drive::{CredentialManager, CredentialStore, GoogleAuthorizer},
    settings::{Cli, Settings},
    workflow,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let settings = Settings::load(Cli::parse()).await?;
    log::debug!("{settings:?}");

    let authorizer = GoogleAuthorizer::new(&settings.secrets, settings.scopes.clone());
    let manager = CredentialManager::new(
        CredentialStore::new(&settings.token),
        authorizer,
        settings.scopes.clone(),
    );
    let drive = manager.acquire_session().await?;

    let msg = workflow::create_doc_template(
        &drive,
        &settings.file,
        &settings.folder,
        settings.move_to_folder,
    )
    .await?;

    println!("{msg}");
    Ok(())
}
