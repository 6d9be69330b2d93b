//! Submission transport seam and its `reqwest` implementation.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part as ReqwestPart};
use tokio::fs as TokioFs;
use tracing::{debug, info};

use crate::controller::multipart::{MultipartBody, Part};
use crate::error::{FormError, FormResult};
use crate::fs::file_record::FileSource;

/// POSTs a multipart body and returns the parsed response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(&self, url: &str, body: MultipartBody) -> FormResult<serde_json::Value>;
}

#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn build_form(body: MultipartBody) -> FormResult<Form> {
        let mut form: Form = Form::new();

        for part in body {
            form = match part {
                Part::Text { name, value } => form.text(name, value),
                Part::File {
                    name,
                    filename,
                    content_type,
                    source,
                } => {
                    let data: Vec<u8> = match source {
                        FileSource::Memory(bytes) => bytes.to_vec(),
                        FileSource::Path(path) => TokioFs::read(path.clone())
                            .await
                            .map_err(|source| FormError::FileRead { path, source })?,
                        // remote records never produce file parts
                        FileSource::Remote => continue,
                    };

                    let file_part: ReqwestPart = ReqwestPart::bytes(data)
                        .file_name(filename.to_string())
                        .mime_str(content_type)?;

                    form.part(name, file_part)
                }
            };
        }

        Ok(form)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post(&self, url: &str, body: MultipartBody) -> FormResult<serde_json::Value> {
        debug!(url, parts = body.len(), "building multipart form");

        let form: Form = Self::build_form(body).await?;
        let response = self.client.post(url).multipart(form).send().await?;
        let status = response.status();

        info!(url, status = status.as_u16(), "form submitted");

        if !status.is_success() {
            let body: String = response.text().await.unwrap_or_default();
            return Err(FormError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(serde_json::Value::Null);
        }

        Ok(serde_json::from_slice(&bytes)?)
    }
}
