//! Clipboard and browser launcher.

use anyhow::Result;

use crate::io::process::Tool;

pub trait Desktop {
    fn copy_to_clipboard(&self, text: &str) -> Result<()>;
    fn open_url(&self, url: &str) -> Result<()>;
}

impl<T: Desktop + ?Sized> Desktop for &T {
    fn copy_to_clipboard(&self, text: &str) -> Result<()> {
        (**self).copy_to_clipboard(text)
    }
    fn open_url(&self, url: &str) -> Result<()> {
        (**self).open_url(url)
    }
}

/// Desktop integration through configured helper commands.
#[derive(Debug, Clone)]
pub struct SystemDesktop {
    clipboard: Tool,
    browser: Tool,
}

impl SystemDesktop {
    pub fn new(clipboard: Tool, browser: Tool) -> Self {
        Self { clipboard, browser }
    }
}

impl Desktop for SystemDesktop {
    fn copy_to_clipboard(&self, text: &str) -> Result<()> {
        self.clipboard.pipe_in(&[], text.as_bytes())
    }

    fn open_url(&self, url: &str) -> Result<()> {
        self.browser.spawn_detached(&[url])
    }
}

/// Platform clipboard command used when the config names none.
pub fn default_clipboard_command() -> Vec<String> {
    if cfg!(target_os = "macos") {
        vec!["pbcopy".to_string()]
    } else {
        vec![
            "xclip".to_string(),
            "-selection".to_string(),
            "clipboard".to_string(),
        ]
    }
}

/// Platform browser launcher used when the config names none.
pub fn default_browser_command() -> Vec<String> {
    if cfg!(target_os = "macos") {
        vec!["open".to_string()]
    } else {
        vec!["xdg-open".to_string()]
    }
}
