use dayflow_core::navigation::Navigator;
use tracing::info;

/// Navigator that reports navigations on stderr
#[derive(Debug, Default)]
pub struct TerminalNavigator;

impl TerminalNavigator {
    pub fn new() -> Self {
        Self
    }
}

impl Navigator for TerminalNavigator {
    fn push(&self, path: &str) {
        info!(path, "navigate");
        eprintln!("-> {}", path);
    }

    fn replace(&self, path: &str) {
        info!(path, "navigate (replace)");
        eprintln!("-> {} (replacing history)", path);
    }

    fn hard_redirect(&self, path: &str) {
        info!(path, "hard redirect");
        eprintln!("-> {} (reload)", path);
    }
}
