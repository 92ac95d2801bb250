use super::{Context, remote};
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::path::Path;

pub async fn save(ctx: &Context, dir: &str, file: &Path) -> Result<()> {
    let dir = remote(dir)?;
    let content = read(file).await?;
    ctx.api.save_readme(&dir, &content).await.map_err(ErrorKind::client)?;
    println!("README saved for {dir}");
    Ok(())
}

pub async fn preview(ctx: &Context, file: &Path) -> Result<()> {
    let content = read(file).await?;
    let html = ctx.api.preview_markdown(&content).await.map_err(ErrorKind::client)?;
    println!("{html}");
    Ok(())
}

async fn read(file: &Path) -> Result<String> {
    tokio::fs::read_to_string(file)
        .await
        .or_raise(|| ErrorKind::Io(format!("could not read {}", file.display())))
}
