use std::{ops::Deref, sync::LazyLock};

use anyhow::Context;
use mailform_utils::mailform_version;

pub static USER_AGENT: LazyLock<String> =
    LazyLock::new(|| format!("mailform (Version {})", mailform_version()));

#[derive(Debug, Clone)]
pub struct HttpClient(reqwest::Client);

impl HttpClient {
    pub fn new() -> anyhow::Result<Self> {
        reqwest::Client::builder()
            .user_agent(&*USER_AGENT)
            .build()
            .map(Self)
            .context("Failed to build http client")
    }
}

impl Deref for HttpClient {
    type Target = reqwest::Client;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
