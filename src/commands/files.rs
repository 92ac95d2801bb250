use super::{Context, remote};
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use filestation_client::api::{UploadFile, Versioning};
use filestation_client::path;
use filestation_controller::{Bulk, Item};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

pub async fn folders(ctx: &Context, dir: &str) -> Result<()> {
    let dir = remote(dir)?;
    for folder in ctx.api.list_folders(&dir).await.map_err(ErrorKind::client)? {
        println!("{folder}/");
    }
    Ok(())
}

pub async fn mkdir(ctx: &Context, dir: &str, name: &str) -> Result<()> {
    let mut bulk = bulk(ctx, remote(dir)?, Vec::new());
    let created = bulk.create_folder(name).await.map_err(ErrorKind::controller)?;
    println!("Created {created}");
    Ok(())
}

pub async fn delete(ctx: &Context, dir: &str, names: Vec<String>, yes: bool) -> Result<()> {
    let dir = remote(dir)?;
    let items = names
        .iter()
        .map(|name| path::join(&dir, name).map_err(ErrorKind::client))
        .collect::<Result<Vec<_>>>()?;
    let mut bulk = bulk(ctx, dir, items);
    bulk.selection_mut().set_all(true);
    let confirmation = bulk.request_delete().map_err(ErrorKind::controller)?;
    print!("{confirmation}");
    if !yes && !confirm("Proceed?")? {
        println!("Nothing deleted.");
        return Ok(());
    }
    bulk.confirm_delete(confirmation).await.map_err(ErrorKind::controller)?;
    println!("Deleted.");
    Ok(())
}

pub async fn rename(ctx: &Context, path: &str, new_name: &str) -> Result<()> {
    let path = remote(path)?;
    let dir = path::parent(&path).to_string();
    let mut bulk = bulk(ctx, dir, vec![path]);
    bulk.selection_mut().set_all(true);
    let renamed = bulk.rename(new_name).await.map_err(ErrorKind::controller)?;
    println!("Renamed to {renamed}");
    Ok(())
}

/// Drives the move picker the way a user would: go to the destination's
/// parent and click the destination.
pub async fn move_to(ctx: &Context, paths: Vec<String>, destination: &str) -> Result<()> {
    let destination = remote(destination)?;
    let Some(name) = path::file_name(&destination) else {
        exn::bail!(ErrorKind::Argument("the root folder can't be picked as a destination".to_string()));
    };
    let items = paths.iter().map(|p| remote(p)).collect::<Result<Vec<_>>>()?;
    let mut bulk = bulk(ctx, "/".to_string(), items);
    bulk.selection_mut().set_all(true);
    let mut picker = bulk.start_move().await.map_err(ErrorKind::controller)?;
    picker.navigate(path::parent(&destination)).await.map_err(ErrorKind::controller)?;
    picker.click(name).map_err(ErrorKind::controller)?;
    let moved_to = bulk.confirm_move(&picker).await.map_err(ErrorKind::controller)?;
    println!("Moved {} item(s) to {moved_to}", picker.items().len());
    Ok(())
}

pub async fn download(ctx: &Context, paths: Vec<String>, output: &Path) -> Result<()> {
    let items = paths.iter().map(|p| remote(p)).collect::<Result<Vec<_>>>()?;
    let mut bulk = bulk(ctx, "/".to_string(), items);
    bulk.selection_mut().set_all(true);
    let archive = bulk.download().await.map_err(ErrorKind::controller)?;
    tokio::fs::write(output, &archive)
        .await
        .or_raise(|| ErrorKind::Io(format!("could not write {}", output.display())))?;
    println!("Wrote {} bytes to {}", archive.len(), output.display());
    Ok(())
}

pub async fn upload(
    ctx: &Context,
    dir: &str,
    files: Vec<PathBuf>,
    version: Option<String>,
    versions: Vec<String>,
) -> Result<()> {
    let versioning = match (version, versions.is_empty()) {
        (Some(version), _) => Versioning::Same(version),
        (None, false) => Versioning::PerFile(versions),
        (None, true) => Versioning::Same(String::new()),
    };
    let mut uploads = Vec::with_capacity(files.len());
    for file in &files {
        uploads.push(read_upload(file).await?);
    }
    let mut bulk = bulk(ctx, remote(dir)?, Vec::new());
    bulk.upload(versioning, uploads).await.map_err(ErrorKind::controller)?;
    println!("Uploaded {} file(s) to {}", files.len(), bulk.dir());
    Ok(())
}

async fn read_upload(file: &Path) -> Result<UploadFile> {
    let Some(name) = file.file_name().and_then(|n| n.to_str()) else {
        exn::bail!(ErrorKind::Argument(format!("not a file name: {}", file.display())));
    };
    let data = tokio::fs::read(file)
        .await
        .or_raise(|| ErrorKind::Io(format!("could not read {}", file.display())))?;
    Ok(UploadFile {
        name: name.to_string(),
        data,
    })
}

/// The command line doesn't know which paths are folders, so everything is
/// listed as a file.
fn bulk(ctx: &Context, dir: String, items: Vec<String>) -> Bulk {
    Bulk::new(ctx.api.clone(), ctx.config.ui.download_policy, dir, items.into_iter().map(Item::file))
}

fn confirm(question: &str) -> Result<bool> {
    print!("{question} [y/N] ");
    std::io::stdout().flush().or_raise(|| ErrorKind::Io("stdout".to_string()))?;
    let mut answer = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .or_raise(|| ErrorKind::Io("stdin".to_string()))?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
