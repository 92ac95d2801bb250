//! HTTP implementation of the server API.

use super::{Api, Upload, Versioning};
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use exn::ResultExt;
use filestation_integrity::{ComputedHashes, FileMetadataRecord, UpdatePayload};
use reqwest::multipart::{Form, Part};
use reqwest::redirect::Policy;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use tracing::instrument;

#[derive(Deserialize)]
struct SessionBody {
    username: String,
}

#[derive(Deserialize)]
struct FoldersBody {
    // The server encodes an empty listing as `null`.
    folders: Option<Vec<String>>,
}

/// Talks to a running server over HTTP.
///
/// Holds its own cookie store, so a successful [`login`](Api::login) carries
/// the session cookie into every later request made through the same value.
/// Redirects are never followed.
#[derive(Clone)]
pub struct HttpApi {
    client: Client,
    base: Url,
    base_str: String,
}
impl HttpApi {
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base = Url::parse(base_url).or_raise(|| ErrorKind::InvalidUrl(base_url.to_string()))?;
        if base.cannot_be_a_base() {
            exn::bail!(ErrorKind::InvalidUrl(base_url.to_string()));
        }
        // `Url::join` replaces the last segment unless the base ends in a slash.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let client = Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .or_raise(|| ErrorKind::Network("could not build HTTP client".to_string()))?;
        Ok(Self {
            client,
            base_str: base.to_string(),
            base,
        })
    }

    fn endpoint(&self, name: &str) -> Result<Url> {
        self.base.join(name).or_raise(|| ErrorKind::InvalidUrl(name.to_string()))
    }

    async fn send(&self, endpoint: &str, request: RequestBuilder) -> Result<Response> {
        tracing::debug!(endpoint, "Sending request");
        let response = request.send().await.or_raise(|| ErrorKind::Network(endpoint.to_string()))?;
        tracing::debug!(endpoint, status = response.status().as_u16(), "Received response");
        Ok(response)
    }

    /// Send and classify: 2xx/3xx pass, 401 is a login prompt, anything else
    /// is a rejection carrying the body text exactly as sent.
    async fn send_checked(&self, endpoint: &str, request: RequestBuilder) -> Result<Response> {
        let response = self.send(endpoint, request).await?;
        let status = response.status();
        if status.is_success() || status.is_redirection() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED {
            exn::bail!(ErrorKind::Unauthorized);
        }
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(endpoint, status = status.as_u16(), "Server rejected request");
        exn::bail!(ErrorKind::ServerRejected {
            status: status.as_u16(),
            body,
        })
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = self.endpoint(endpoint)?;
        let response = self.send_checked(endpoint, self.client.get(url).query(query)).await?;
        response.json::<T>().await.or_raise(|| ErrorKind::InvalidResponse(endpoint.to_string()))
    }

    async fn post_form(&self, endpoint: &str, form: &[(&str, &str)]) -> Result<Response> {
        let url = self.endpoint(endpoint)?;
        self.send_checked(endpoint, self.client.post(url).form(form)).await
    }

    fn upload_form(upload: &Upload) -> Result<Form> {
        let mut form = Form::new().text("currentPath", upload.dir.clone());
        form = match &upload.versioning {
            Versioning::Same(version) => form.text("sameVersion", "true").text("fileVersion", version.clone()),
            Versioning::PerFile(versions) => {
                let mut form = form.text("sameVersion", "false");
                for (file, version) in upload.files.iter().zip(versions) {
                    form = form.text("fileNames", file.name.clone()).text("fileVersions", version.clone());
                }
                form
            },
        };
        for file in &upload.files {
            let part = Part::bytes(file.data.clone())
                .file_name(file.name.clone())
                .mime_str("application/octet-stream")
                .or_raise(|| ErrorKind::InvalidRequest(file.name.clone()))?;
            form = form.part("uploadFiles", part);
        }
        Ok(form)
    }
}

#[async_trait]
impl Api for HttpApi {
    fn base_url(&self) -> &str {
        &self.base_str
    }

    #[instrument(skip_all)]
    async fn check_session(&self) -> Result<Option<String>> {
        let url = self.endpoint("check-session")?;
        let response = self.send("check-session", self.client.get(url)).await?;
        match response.status() {
            status if status.is_success() => {
                let body: SessionBody =
                    response.json().await.or_raise(|| ErrorKind::InvalidResponse("check-session".to_string()))?;
                Ok(Some(body.username))
            },
            StatusCode::UNAUTHORIZED => Ok(None),
            status => {
                let body = response.text().await.unwrap_or_default();
                exn::bail!(ErrorKind::ServerRejected {
                    status: status.as_u16(),
                    body,
                })
            },
        }
    }

    #[instrument(skip_all, fields(username = %username))]
    async fn login(&self, username: &str, password: &str) -> Result<()> {
        let url = self.endpoint("login")?;
        let request = self.client.post(url).form(&[("username", username), ("password", password)]);
        let response = self.send("login", request).await?;
        let status = response.status();
        if status.is_success() || status.is_redirection() {
            tracing::info!("Logged in");
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        match status {
            StatusCode::UNAUTHORIZED => exn::bail!(ErrorKind::LoginRejected(body)),
            _ => exn::bail!(ErrorKind::ServerRejected {
                status: status.as_u16(),
                body,
            }),
        }
    }

    #[instrument(skip_all)]
    async fn logout(&self) -> Result<()> {
        let url = self.endpoint("logout")?;
        self.send_checked("logout", self.client.get(url)).await?;
        Ok(())
    }

    #[instrument(skip_all, fields(path = %path))]
    async fn file_metadata(&self, path: &str) -> Result<FileMetadataRecord> {
        self.get_json("file-metadata", &[("path", path)]).await
    }

    #[instrument(skip_all, fields(path = %path))]
    async fn recalculate_hashes(&self, path: &str) -> Result<ComputedHashes> {
        self.get_json("recalculate-hashes", &[("path", path)]).await
    }

    #[instrument(skip_all, fields(path = %payload.file_path()))]
    async fn save_metadata(&self, payload: &UpdatePayload) -> Result<()> {
        let url = self.endpoint("save-metadata")?;
        self.send_checked("save-metadata", self.client.post(url).json(payload)).await?;
        Ok(())
    }

    #[instrument(skip_all, fields(path = %path))]
    async fn list_folders(&self, path: &str) -> Result<Vec<String>> {
        let body: FoldersBody = self.get_json("list-folders", &[("path", path)]).await?;
        Ok(body.folders.unwrap_or_default())
    }

    #[instrument(skip_all, fields(dir = %upload.dir, files = upload.files.len()))]
    async fn upload(&self, upload: &Upload) -> Result<()> {
        upload.validate()?;
        let url = self.endpoint("upload")?;
        let form = Self::upload_form(upload)?;
        self.send_checked("upload", self.client.post(url).multipart(form)).await?;
        Ok(())
    }

    #[instrument(skip_all, fields(dir = %dir, items = items.len()))]
    async fn delete(&self, dir: &str, items: &[String]) -> Result<()> {
        if items.is_empty() {
            exn::bail!(ErrorKind::InvalidRequest("nothing selected for deletion".to_string()));
        }
        let mut form: Vec<(&str, &str)> = items.iter().map(|item| ("items", item.as_str())).collect();
        form.push(("currentPath", dir));
        self.post_form("delete", &form).await?;
        Ok(())
    }

    #[instrument(skip_all, fields(path = %path, new_name = %new_name))]
    async fn rename(&self, path: &str, new_name: &str) -> Result<()> {
        self.post_form("rename", &[("oldPath", path), ("newName", new_name)]).await?;
        Ok(())
    }

    #[instrument(skip_all, fields(destination = %destination, items = items.len()))]
    async fn move_items(&self, items: &[String], destination: &str) -> Result<()> {
        // The server expects the item list as a JSON array inside a form field.
        let item_paths =
            serde_json::to_string(items).or_raise(|| ErrorKind::InvalidRequest("unencodable item paths".to_string()))?;
        self.post_form("move", &[("itemPaths", item_paths.as_str()), ("destinationPath", destination)]).await?;
        Ok(())
    }

    #[instrument(skip_all, fields(items = items.len()))]
    async fn download(&self, items: &[String]) -> Result<Vec<u8>> {
        if items.is_empty() {
            exn::bail!(ErrorKind::InvalidRequest("nothing selected for download".to_string()));
        }
        let form: Vec<(&str, &str)> = items.iter().map(|item| ("items", item.as_str())).collect();
        let response = self.post_form("download", &form).await?;
        let bytes = response.bytes().await.or_raise(|| ErrorKind::Network("download".to_string()))?;
        Ok(bytes.to_vec())
    }

    #[instrument(skip_all, fields(dir = %dir, name = %name))]
    async fn create_folder(&self, dir: &str, name: &str) -> Result<()> {
        self.post_form("create-folder", &[("currentPath", dir), ("folderName", name)]).await?;
        Ok(())
    }

    #[instrument(skip_all, fields(dir = %dir))]
    async fn save_readme(&self, dir: &str, content: &str) -> Result<()> {
        self.post_form("save-readme", &[("path", dir), ("content", content)]).await?;
        Ok(())
    }

    #[instrument(skip_all)]
    async fn preview_markdown(&self, content: &str) -> Result<String> {
        let response = self.post_form("preview-markdown", &[("content", content)]).await?;
        response.text().await.or_raise(|| ErrorKind::Network("preview-markdown".to_string()))
    }
}
