//! One function per subcommand, all running against a shared [`Context`].

mod files;
mod metadata;
mod readme;
mod session;

use crate::cli::{Command, Readme};
use crate::error::{ErrorKind, Result};
use filestation_client::path;
use filestation_client::{ApiHandle, HashWorker};
use filestation_config::Config;
use filestation_controller::{Drawer, Views};
use filestation_integrity::IntegrityPolicy;

/// Everything a command needs: the server, the resolved settings and the
/// compiled views.
pub struct Context {
    pub api: ApiHandle,
    pub config: Config,
    pub policy: IntegrityPolicy,
    pub views: Views,
    worker: Option<HashWorker>,
}
impl Context {
    /// Starts the hash worker when the config asks for one, so this must run
    /// inside a tokio runtime.
    pub fn new(api: ApiHandle, config: Config) -> Result<Self> {
        let worker = config.ui.hash_worker.then(|| HashWorker::spawn(api.clone()));
        Ok(Self {
            policy: config.integrity.policy(),
            views: Views::new().map_err(ErrorKind::controller)?,
            api,
            config,
            worker,
        })
    }

    pub fn drawer(&self) -> Drawer {
        let drawer = Drawer::new(self.api.clone(), self.policy.clone());
        match &self.worker {
            Some(worker) => drawer.with_worker(worker.clone()),
            None => drawer,
        }
    }
}

/// A remote path as typed on the command line, normalized.
fn remote(path: &str) -> Result<String> {
    path::normalize(path).map_err(ErrorKind::client)
}

pub async fn run(ctx: &Context, command: Command) -> Result<()> {
    match command {
        Command::Login => session::login(ctx).await,
        Command::Logout => session::logout(ctx).await,
        Command::Whoami => session::whoami(ctx).await,
        Command::Status { paths } => metadata::status(ctx, paths).await,
        Command::Show { path, html } => metadata::show(ctx, &path, html).await,
        Command::Verify { path } => metadata::verify(ctx, &path).await,
        Command::Edit { path, set } => metadata::edit(ctx, &path, set).await,
        Command::Folders { path } => files::folders(ctx, &path).await,
        Command::Mkdir { dir, name } => files::mkdir(ctx, &dir, &name).await,
        Command::Delete { dir, names, yes } => files::delete(ctx, &dir, names, yes).await,
        Command::Rename { path, new_name } => files::rename(ctx, &path, &new_name).await,
        Command::Move { paths, to } => files::move_to(ctx, paths, &to).await,
        Command::Download { paths, output } => files::download(ctx, paths, &output).await,
        Command::Upload {
            dir,
            files,
            version,
            versions,
        } => files::upload(ctx, &dir, files, version, versions).await,
        Command::Readme(Readme::Save { dir, file }) => readme::save(ctx, &dir, &file).await,
        Command::Readme(Readme::Preview { file }) => readme::preview(ctx, &file).await,
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use filestation_client::MockApi;
    use std::sync::Arc;

    pub fn context(mock: &Arc<MockApi>) -> Context {
        let mut config = Config::default();
        config.ui.hash_worker = false;
        Context::new(mock.clone(), config).unwrap()
    }
}
