//! Host capabilities the result view needs: clipboard, sharing, saving files.

use crate::services::export::SharePayload;
use anyhow::{bail, Result};
use async_trait::async_trait;

#[cfg(not(target_arch = "wasm32"))]
use crate::core::io::Storage;
#[cfg(not(target_arch = "wasm32"))]
use std::sync::Arc;

#[cfg(target_arch = "wasm32")]
pub trait PlatformBounds {}
#[cfg(target_arch = "wasm32")]
impl<T> PlatformBounds for T {}

#[cfg(not(target_arch = "wasm32"))]
pub trait PlatformBounds: Send + Sync {}
#[cfg(not(target_arch = "wasm32"))]
impl<T: Send + Sync> PlatformBounds for T {}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait Platform: PlatformBounds {
    async fn copy_text(&self, text: &str) -> Result<()>;

    fn can_share(&self) -> bool {
        false
    }

    async fn share(&self, _payload: &SharePayload) -> Result<()> {
        bail!("Sharing is not supported on this platform")
    }

    /// Saves a text file and returns where it went.
    async fn save_text_file(&self, filename: &str, content: &str) -> Result<String>;

    /// The address a share refers back to.
    fn page_url(&self) -> String {
        String::new()
    }
}

// --- Terminal ---

/// Terminal host: "copying" prints the text for the user to select, files go
/// to the output folder.
#[cfg(not(target_arch = "wasm32"))]
pub struct TerminalPlatform {
    storage: Arc<dyn Storage>,
    output_folder: String,
}

#[cfg(not(target_arch = "wasm32"))]
impl TerminalPlatform {
    pub fn new(storage: Arc<dyn Storage>, output_folder: impl Into<String>) -> Self {
        Self {
            storage,
            output_folder: output_folder.into(),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[async_trait]
impl Platform for TerminalPlatform {
    async fn copy_text(&self, text: &str) -> Result<()> {
        println!("----- copy below -----");
        println!("{}", text);
        println!("----- copy above -----");
        Ok(())
    }

    /// Never overwrites: a taken name gets a ` (n)` suffix.
    async fn save_text_file(&self, filename: &str, content: &str) -> Result<String> {
        let folder = std::path::Path::new(&self.output_folder);
        let mut path = folder.join(filename).to_string_lossy().to_string();
        let mut copy = 0;
        while self.storage.exists(&path).await? {
            copy += 1;
            path = folder
                .join(numbered_filename(filename, copy))
                .to_string_lossy()
                .to_string();
        }
        self.storage.write(&path, content.as_bytes()).await?;
        Ok(path)
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn numbered_filename(filename: &str, copy: usize) -> String {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{} ({}).{}", stem, copy, ext),
        _ => format!("{} ({})", filename, copy),
    }
}

// --- Browser ---

#[cfg(target_arch = "wasm32")]
pub use browser::BrowserPlatform;

#[cfg(target_arch = "wasm32")]
mod browser {
    use super::*;
    use anyhow::anyhow;
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;

    fn js_err(e: JsValue) -> anyhow::Error {
        anyhow!("{:?}", e)
    }

    #[derive(Default)]
    pub struct BrowserPlatform;

    impl BrowserPlatform {
        pub fn new() -> Self {
            Self
        }

        fn window() -> Result<web_sys::Window> {
            web_sys::window().ok_or_else(|| anyhow!("No window available"))
        }
    }

    #[async_trait(?Send)]
    impl Platform for BrowserPlatform {
        async fn copy_text(&self, text: &str) -> Result<()> {
            let clipboard = Self::window()?.navigator().clipboard();
            JsFuture::from(clipboard.write_text(text))
                .await
                .map_err(js_err)?;
            Ok(())
        }

        fn can_share(&self) -> bool {
            Self::window()
                .ok()
                .map(|w| {
                    js_sys::Reflect::has(&w.navigator(), &JsValue::from_str("share"))
                        .unwrap_or(false)
                })
                .unwrap_or(false)
        }

        async fn share(&self, payload: &SharePayload) -> Result<()> {
            let data = web_sys::ShareData::new();
            data.set_title(&payload.title);
            data.set_text(&payload.text);
            data.set_url(&payload.url);
            let promise = Self::window()?.navigator().share_with_data(&data);
            JsFuture::from(promise).await.map_err(js_err)?;
            Ok(())
        }

        async fn save_text_file(&self, filename: &str, content: &str) -> Result<String> {
            let window = Self::window()?;
            let document = window.document().ok_or_else(|| anyhow!("No document"))?;

            let parts = js_sys::Array::of1(&JsValue::from_str(content));
            let options = web_sys::BlobPropertyBag::new();
            options.set_type("text/plain");
            let blob = web_sys::Blob::new_with_str_sequence_and_options(&parts, &options)
                .map_err(js_err)?;
            let url = web_sys::Url::create_object_url_with_blob(&blob).map_err(js_err)?;

            let link = document
                .create_element("a")
                .map_err(js_err)?
                .dyn_into::<web_sys::HtmlAnchorElement>()
                .map_err(|_| anyhow!("Failed to create download link"))?;
            link.set_href(&url);
            link.set_download(filename);
            link.click();
            web_sys::Url::revoke_object_url(&url).map_err(js_err)?;
            Ok(filename.to_string())
        }

        fn page_url(&self) -> String {
            Self::window()
                .ok()
                .and_then(|w| w.location().href().ok())
                .unwrap_or_default()
        }
    }
}
