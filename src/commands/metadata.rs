use super::{Context, remote};
use crate::error::{ErrorKind, Result};
use filestation_controller::{Notice, SaveOutcome, row_statuses};
use filestation_integrity::Verdict;
use futures::StreamExt;
use std::pin::pin;

pub async fn status(ctx: &Context, paths: Vec<String>) -> Result<()> {
    let paths = paths.iter().map(|p| remote(p)).collect::<Result<Vec<_>>>()?;
    let mut reports = pin!(row_statuses(&*ctx.api, &ctx.policy, paths));
    let mut failed = 0usize;
    while let Some(report) = reports.next().await {
        match report.status {
            Ok(status) => println!("{} {:<10} {}", status.symbol(), status, report.path),
            Err(err) => {
                failed += 1;
                eprintln!("! {:<10} {}: {}", "error", report.path, Notice::from(&err));
            },
        }
    }
    if failed > 0 {
        exn::bail!(ErrorKind::Notice(Notice::Error(format!("{failed} status request(s) failed"))));
    }
    Ok(())
}

pub async fn show(ctx: &Context, path: &str, html: bool) -> Result<()> {
    let path = remote(path)?;
    let mut drawer = ctx.drawer();
    let session = drawer.open(&path).await.map_err(ErrorKind::controller)?;
    let rendered = match html {
        true => ctx.views.summary_html(session.summary()),
        false => ctx.views.summary_text(session.summary()),
    }
    .map_err(ErrorKind::controller)?;
    print!("{rendered}");
    Ok(())
}

/// Rehash on the server and compare. Fails when any algorithm mismatches, so
/// scripts can rely on the exit code.
pub async fn verify(ctx: &Context, path: &str) -> Result<()> {
    let path = remote(path)?;
    let mut drawer = ctx.drawer();
    drawer.open(&path).await.map_err(ErrorKind::controller)?;
    let session = drawer.refresh().await.map_err(ErrorKind::controller)?;
    print!("{}", ctx.views.summary_text(session.summary()).map_err(ErrorKind::controller)?);
    let mismatched: Vec<String> = session
        .verdicts()
        .iter()
        .filter(|(_, verdict)| **verdict == Verdict::Mismatch)
        .map(|(algorithm, _)| algorithm.to_string())
        .collect();
    if !mismatched.is_empty() {
        exn::bail!(ErrorKind::Mismatch(format!("{path} ({})", mismatched.join(", "))));
    }
    Ok(())
}

pub async fn edit(ctx: &Context, path: &str, assignments: Vec<(String, String)>) -> Result<()> {
    let path = remote(path)?;
    let mut drawer = ctx.drawer();
    drawer.open(&path).await.map_err(ErrorKind::controller)?;
    drawer.enter_edit().await.map_err(ErrorKind::controller)?;
    for (key, value) in &assignments {
        drawer.set(key, value).map_err(ErrorKind::controller)?;
    }
    let notice = match drawer.save().await.map_err(ErrorKind::controller)? {
        SaveOutcome::NoChanges => Notice::info("No changes."),
        SaveOutcome::Saved(fields) => Notice::info(format!("Saved {}.", fields.join(", "))),
    };
    println!("{notice}");
    Ok(())
}
