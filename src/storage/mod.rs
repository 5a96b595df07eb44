//! Object storage operations for resume uploads

use reqwest::{multipart, Client};
use serde::Deserialize;

use crate::error::Error;

/// Client for the backend's object storage
#[derive(Clone)]
pub struct StorageClient {
    /// The base URL for the backend
    url: String,

    /// The anonymous API key
    key: String,

    /// HTTP client used for requests
    client: Client,
}

/// Client for a specific storage bucket
pub struct BucketClient<'a> {
    /// Reference to the storage client
    storage: &'a StorageClient,

    /// The bucket ID
    bucket_id: String,
}

/// Stored object descriptor returned by an upload
#[derive(Debug, Clone, Deserialize)]
pub struct StoredObject {
    /// Bucket-qualified object key
    #[serde(rename = "Key")]
    pub key: String,
}

impl StorageClient {
    /// Create a new StorageClient
    pub(crate) fn new(url: &str, key: &str, client: Client) -> Self {
        Self {
            url: url.to_string(),
            key: key.to_string(),
            client,
        }
    }

    fn storage_url(&self, path: &str) -> String {
        format!("{}/storage/v1{}", self.url, path)
    }

    /// Get a client for a specific bucket
    pub fn from(&self, bucket_id: &str) -> BucketClient {
        BucketClient {
            storage: self,
            bucket_id: bucket_id.to_string(),
        }
    }
}

impl<'a> BucketClient<'a> {
    /// Upload a blob to the bucket under the given key
    pub async fn upload(
        &self,
        path: &str,
        file_name: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<StoredObject, Error> {
        let url = self
            .storage
            .storage_url(&format!("/object/{}/{}", self.bucket_id, path));

        let part = multipart::Part::bytes(data)
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .map_err(|e| Error::upload(format!("Invalid content type: {}", e)))?;
        let form = multipart::Form::new().part("file", part);

        // Every failure in the storage call surfaces as an upload error,
        // transport included, so the form can be resubmitted as-is.
        let response = self
            .storage
            .client
            .post(&url)
            .header("apikey", &self.storage.key)
            .header("x-upsert", "false")
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::upload(format!("Upload request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::upload(format!(
                "Upload failed with status {}: {}",
                status, text
            )));
        }

        let object = response
            .json::<StoredObject>()
            .await
            .map_err(|e| Error::upload(format!("Unexpected upload response: {}", e)))?;
        Ok(object)
    }

    /// Get the public URL for an object
    pub fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.storage.url, self.bucket_id, path
        )
    }
}
