use icefield_core::AssetFetcher;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

/// Fetches assets with `window.fetch`, relative to the page.
pub struct FetchAssets {
    window: web::Window,
}

impl FetchAssets {
    pub fn new(window: web::Window) -> Self {
        Self { window }
    }

    async fn fetch_bytes(&self, url: &str) -> anyhow::Result<Vec<u8>> {
        let started = instant::Instant::now();
        let opts = web::RequestInit::new();
        opts.set_method("GET");
        let request = web::Request::new_with_str_and_init(url, &opts)
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        let response: web::Response = JsFuture::from(self.window.fetch_with_request(&request))
            .await
            .map_err(|e| anyhow::anyhow!("{:?}", e))?
            .dyn_into()
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        if !response.ok() {
            anyhow::bail!("HTTP {} {}", response.status(), response.status_text());
        }
        let buffer = JsFuture::from(
            response
                .array_buffer()
                .map_err(|e| anyhow::anyhow!("{:?}", e))?,
        )
        .await
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
        log::info!(
            "[assets] {} ({} bytes) in {:.0} ms",
            url,
            bytes.len(),
            started.elapsed().as_secs_f64() * 1000.0
        );
        Ok(bytes)
    }
}

impl AssetFetcher for FetchAssets {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, String> {
        self.fetch_bytes(url).await.map_err(|e| e.to_string())
    }
}
