/// Hands a finished file's URL to something that can fetch it
pub trait FileOpener: Send + Sync {
    fn open(&self, url: &str) -> std::io::Result<()>;
}

/// Opens the URL in the system's default browser
pub struct BrowserOpener;

impl FileOpener for BrowserOpener {
    fn open(&self, url: &str) -> std::io::Result<()> {
        tracing::info!("opening {}", url);
        open::that(url)
    }
}
