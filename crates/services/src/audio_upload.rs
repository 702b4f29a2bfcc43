use std::env;

use log::debug;
use reqwest::Client;
use reqwest::multipart::{Form, Part};

use crate::error::AudioUploadError;

pub const UPLOAD_PATH: &str = "/upload-audio";
pub const FIELD_NAME: &str = "audio";
pub const FILE_NAME: &str = "recording.wav";
pub const MIME_TYPE: &str = "audio/wav";

#[derive(Clone, Debug)]
pub struct AudioUploadConfig {
    pub base_url: String,
}

impl AudioUploadConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let base_url = env::var("EASY_PAGES_UPLOAD_URL").ok()?;
        if base_url.trim().is_empty() {
            return None;
        }
        Some(Self { base_url })
    }

    /// Use `base_url` when given and non-blank, else `EASY_PAGES_UPLOAD_URL`.
    #[must_use]
    pub fn resolve(base_url: Option<String>) -> Option<Self> {
        base_url
            .filter(|url| !url.trim().is_empty())
            .map(|base_url| Self { base_url })
            .or_else(Self::from_env)
    }

    /// Full URL recordings are posted to.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{}{UPLOAD_PATH}", self.base_url.trim().trim_end_matches('/'))
    }
}

/// Posts finished recordings to the practice server.
///
/// One `multipart/form-data` request per recording. The response is not
/// inspected and failed uploads are not retried.
#[derive(Clone)]
pub struct AudioUploadClient {
    client: Client,
    config: Option<AudioUploadConfig>,
}

impl AudioUploadClient {
    #[must_use]
    pub fn new(config: Option<AudioUploadConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Send one WAV recording.
    ///
    /// # Errors
    ///
    /// Returns `AudioUploadError::Disabled` without a base URL, or the
    /// transport error if the request could not be sent.
    pub async fn upload(&self, wav: Vec<u8>) -> Result<(), AudioUploadError> {
        let config = self.config.as_ref().ok_or(AudioUploadError::Disabled)?;

        let part = Part::bytes(wav).file_name(FILE_NAME).mime_str(MIME_TYPE)?;
        let form = Form::new().part(FIELD_NAME, part);

        let response = self
            .client
            .post(config.endpoint())
            .multipart(form)
            .send()
            .await?;
        debug!("recording uploaded, server answered {}", response.status());
        Ok(())
    }
}
