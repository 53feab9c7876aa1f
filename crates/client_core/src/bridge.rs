//! Seam between the viewer and the analysis engine.
//!
//! The engine owns file I/O and the variation model; the viewer only ever
//! talks to it through [`EngineBridge`]. File dialogs are part of the bridge
//! surface so a headless driver can substitute fixed paths.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use lwv_shared::{
    domain::PrimitiveId,
    protocol::{
        GenerateRequest, LoadEdbResponse, NetsPayload, PathRequest, Settings, StatsRequest,
        WireStats,
    },
};
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;
use url::Url;

#[async_trait]
pub trait EngineBridge: Send + Sync {
    /// `None` when the user cancels.
    async fn open_file_dialog(&self) -> Result<Option<PathBuf>>;
    async fn save_file_dialog(&self) -> Result<Option<PathBuf>>;
    async fn load_edb(&self, path: &Path) -> Result<LoadEdbResponse>;
    async fn save_edb(&self, path: &Path) -> Result<bool>;
    async fn get_nets(&self) -> Result<NetsPayload>;
    async fn generate_variation(&self, settings: &Settings) -> Result<bool>;
    /// `None` when the engine has no samples for `id`.
    async fn get_primitive_stats(&self, id: &PrimitiveId) -> Result<Option<WireStats>>;
}

pub struct MissingEngineBridge;

#[async_trait]
impl EngineBridge for MissingEngineBridge {
    async fn open_file_dialog(&self) -> Result<Option<PathBuf>> {
        Err(anyhow!("engine bridge unavailable: cannot open a design"))
    }

    async fn save_file_dialog(&self) -> Result<Option<PathBuf>> {
        Err(anyhow!("engine bridge unavailable: cannot save a design"))
    }

    async fn load_edb(&self, path: &Path) -> Result<LoadEdbResponse> {
        Err(anyhow!(
            "engine bridge unavailable: cannot load {}",
            path.display()
        ))
    }

    async fn save_edb(&self, path: &Path) -> Result<bool> {
        Err(anyhow!(
            "engine bridge unavailable: cannot save {}",
            path.display()
        ))
    }

    async fn get_nets(&self) -> Result<NetsPayload> {
        Err(anyhow!("engine bridge unavailable: no nets"))
    }

    async fn generate_variation(&self, _settings: &Settings) -> Result<bool> {
        Err(anyhow!("engine bridge unavailable: cannot generate variation"))
    }

    async fn get_primitive_stats(&self, id: &PrimitiveId) -> Result<Option<WireStats>> {
        Err(anyhow!("engine bridge unavailable: no stats for primitive {id}"))
    }
}

/// Source of file paths for open/save.
#[async_trait]
pub trait PathPrompt: Send + Sync {
    async fn pick_open(&self) -> Option<PathBuf>;
    async fn pick_save(&self) -> Option<PathBuf>;
}

/// Prompt that answers with preconfigured paths, for scripted runs.
#[derive(Debug, Clone, Default)]
pub struct FixedPaths {
    pub open: Option<PathBuf>,
    pub save: Option<PathBuf>,
}

#[async_trait]
impl PathPrompt for FixedPaths {
    async fn pick_open(&self) -> Option<PathBuf> {
        self.open.clone()
    }

    async fn pick_save(&self) -> Option<PathBuf> {
        self.save.clone()
    }
}

/// Engine reached over HTTP: every call is `POST {base}/api/{call}` with a
/// JSON body, answered with the call's JSON result.
pub struct HttpBridge<P> {
    http: Client,
    base: Url,
    prompt: P,
}

impl<P: PathPrompt> HttpBridge<P> {
    pub fn new(engine_url: &str, prompt: P) -> Result<Self> {
        let mut base =
            Url::parse(engine_url).with_context(|| format!("invalid engine url {engine_url}"))?;
        if base.cannot_be_a_base() {
            return Err(anyhow!("engine url {engine_url} cannot be used as a base"));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            http: Client::new(),
            base,
            prompt,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, call: &str) -> Result<Url> {
        self.base
            .join(&format!("api/{call}"))
            .with_context(|| format!("cannot build url for {call}"))
    }

    async fn call<B, R>(&self, call: &str, body: &B) -> Result<R>
    where
        B: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.endpoint(call)?;
        debug!(%url, "engine: {call}");
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("engine call {call} failed"))?
            .error_for_status()
            .with_context(|| format!("engine call {call} rejected"))?;
        response
            .json()
            .await
            .with_context(|| format!("engine call {call} returned an unreadable body"))
    }
}

fn path_request(path: &Path) -> PathRequest {
    PathRequest {
        path: path.to_string_lossy().into_owned(),
    }
}

#[async_trait]
impl<P: PathPrompt> EngineBridge for HttpBridge<P> {
    async fn open_file_dialog(&self) -> Result<Option<PathBuf>> {
        Ok(self.prompt.pick_open().await)
    }

    async fn save_file_dialog(&self) -> Result<Option<PathBuf>> {
        Ok(self.prompt.pick_save().await)
    }

    async fn load_edb(&self, path: &Path) -> Result<LoadEdbResponse> {
        self.call("load_edb", &path_request(path)).await
    }

    async fn save_edb(&self, path: &Path) -> Result<bool> {
        self.call("save_edb", &path_request(path)).await
    }

    async fn get_nets(&self) -> Result<NetsPayload> {
        self.call("get_nets", &serde_json::json!({})).await
    }

    async fn generate_variation(&self, settings: &Settings) -> Result<bool> {
        self.call(
            "generate_variation",
            &GenerateRequest {
                settings: *settings,
            },
        )
        .await
    }

    async fn get_primitive_stats(&self, id: &PrimitiveId) -> Result<Option<WireStats>> {
        self.call("get_primitive_stats", &StatsRequest { id: id.clone() })
            .await
    }
}

#[cfg(test)]
#[path = "tests/bridge_tests.rs"]
mod tests;
