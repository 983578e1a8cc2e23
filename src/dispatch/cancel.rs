use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Cooperative cancellation flag shared by every pipe instance.
///
/// Workers poll it between seeds and between candidates and stop early.
/// Results inserted before the flag was raised are kept.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Raise the flag from a detached timer thread after `timeout`.
    pub fn cancel_after(&self, timeout: Duration) -> JoinHandle<()> {
        let token = self.clone();
        thread::spawn(move || {
            thread::sleep(timeout);
            if !token.is_cancelled() {
                log::warn!("search timed out after {:?}, stopping workers", timeout);
            }
            token.cancel();
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let token = CancellationToken::new();
        let other = token.clone();
        assert!(!other.is_cancelled());
        token.cancel();
        assert!(other.is_cancelled());
    }

    #[test]
    fn test_cancel_after_timer() {
        let token = CancellationToken::new();
        token.cancel_after(Duration::from_millis(5)).join().unwrap();
        assert!(token.is_cancelled());
    }
}
