//! Find a file by name, copy it, and file the copy into a new folder.
//!
//! There is no compensation when a later step fails: a copy made before a
//! failed folder creation or move stays where the API put it.

use crate::{
    google_drive::{join_ids, DriveApi, DriveFile},
    Error,
};

/// Returns the first file named exactly `name`, in listing order.
///
/// Several files may share a name; the first one the API lists wins.
pub fn first_match<'a>(files: &'a [DriveFile], name: &str) -> Option<&'a DriveFile> {
    files.iter().find(|f| f.name == name)
}

pub async fn find_file_id<D: DriveApi>(drive: &D, name: &str) -> anyhow::Result<String> {
    let files = drive.list_files().await?;
    log::debug!("Listed {} files", files.len());

    first_match(&files, name)
        .map(|f| f.id.clone())
        .ok_or_else(|| Error::NotFound(name.to_owned()).into())
}

/// The comma separated parents to pass as `removeParents`.
pub fn previous_parents(file: &DriveFile) -> String {
    join_ids(file.parents())
}

pub async fn duplicate_and_move<D: DriveApi>(
    drive: &D,
    file_id: &str,
    folder_name: &str,
) -> anyhow::Result<String> {
    let copy = drive.copy(file_id).await?;
    log::info!("Copied {} to {}", file_id, copy.id);

    let folder = drive.create_folder(folder_name).await?;
    log::info!("Created folder {:?} ({})", folder_name, folder.id);

    let moved = drive
        .update_parents(&copy.id, &folder.id, &previous_parents(&copy))
        .await?;
    log::info!("Moved {} into {}", moved.id, folder.id);

    Ok(confirmation(&moved.id))
}

/// Runs the whole workflow. With `move_to_folder` unset only the copy is made.
pub async fn create_doc_template<D: DriveApi>(
    drive: &D,
    file_name: &str,
    folder_name: &str,
    move_to_folder: bool,
) -> anyhow::Result<String> {
    let file_id = find_file_id(drive, file_name).await?;
    log::info!("Found {:?} ({})", file_name, file_id);

    if move_to_folder {
        return duplicate_and_move(drive, &file_id, folder_name).await;
    }

    let copy = drive.copy(&file_id).await?;
    log::info!("Copied {} to {}", file_id, copy.id);

    Ok(confirmation(&copy.id))
}

fn confirmation(id: &str) -> String {
    format!("You have a new copy with id: {id} created")
}
