use std::sync::Arc;

mod desktop;

/// Hands external links (resources, note attachments) to the OS browser
/// instead of navigating the app's webview away.
pub trait UiLinkOpener: Send + Sync {
    fn open_url(&self, url: &str);
}

pub type LinkOpenerRef = Arc<dyn UiLinkOpener>;

pub use desktop::DesktopLinkOpener;
