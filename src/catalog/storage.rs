use std::time::Duration;

use reqwest::blocking::Client;
use serde::Serialize;

use crate::config::StorageSettings;
use crate::error::StorageError;

use super::model::StorageObject;

/// The hosted object storage the library lives in.
///
/// Objects are assumed publicly readable: URLs are built, never signed.
pub trait ObjectStorage: Send + Sync {
    /// List objects directly under `prefix` (one page only).
    fn list(
        &self,
        prefix: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<StorageObject>, StorageError>;

    /// Public URL of an object.
    fn public_url(&self, path: &str) -> String;

    /// Create or overwrite an object.
    fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), StorageError>;
}

#[derive(Serialize)]
struct ListRequest<'a> {
    prefix: &'a str,
    limit: usize,
    offset: usize,
    #[serde(rename = "sortBy")]
    sort_by: SortBy,
}

#[derive(Serialize)]
struct SortBy {
    column: &'static str,
    order: &'static str,
}

/// Supabase Storage over its REST API.
pub struct SupabaseStorage {
    endpoint: String,
    api_key: String,
    bucket: String,
    client: Client,
}

impl SupabaseStorage {
    pub fn new(settings: &StorageSettings, timeout: Duration) -> Result<Self, StorageError> {
        let endpoint = settings.endpoint.trim().trim_end_matches('/').to_string();
        if endpoint.is_empty() {
            return Err(StorageError::Unconfigured);
        }

        let client = Client::builder()
            .user_agent(concat!("prepcast/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            endpoint,
            api_key: settings.api_key.clone(),
            bucket: settings.bucket.clone(),
            client,
        })
    }

    fn object_url(&self, kind: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/{kind}{}/{}",
            self.endpoint,
            urlencoding::encode(&self.bucket),
            encode_path(path)
        )
    }

    fn authorized(
        &self,
        req: reqwest::blocking::RequestBuilder,
    ) -> reqwest::blocking::RequestBuilder {
        if self.api_key.is_empty() {
            req
        } else {
            req.header("apikey", &self.api_key).bearer_auth(&self.api_key)
        }
    }
}

impl ObjectStorage for SupabaseStorage {
    fn list(
        &self,
        prefix: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<StorageObject>, StorageError> {
        let url = format!(
            "{}/storage/v1/object/list/{}",
            self.endpoint,
            urlencoding::encode(&self.bucket)
        );
        let body = ListRequest {
            prefix,
            limit,
            offset,
            sort_by: SortBy {
                column: "name",
                order: "asc",
            },
        };

        let response = self.authorized(self.client.post(&url)).json(&body).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::Status {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }

        Ok(response.json::<Vec<StorageObject>>()?)
    }

    fn public_url(&self, path: &str) -> String {
        self.object_url("public/", path)
    }

    fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), StorageError> {
        let url = self.object_url("", path);
        let response = self
            .authorized(self.client.post(&url))
            .header("content-type", content_type)
            .header("x-upsert", "true")
            .header("cache-control", "max-age=3600")
            .body(bytes)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::Status {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }
        Ok(())
    }
}

/// Percent-encode each path segment, keeping the `/` separators.
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|seg| urlencoding::encode(seg).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
