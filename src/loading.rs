//! Loading screen messages and the terminal spinner that cycles them.

use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Messages rotated while an evaluate request is pending.
pub const LOADING_MESSAGES: [&str; 5] = [
    "Ingesting CSV stream...",
    "Detecting PII & Anonymizing...",
    "Consulting GenAI Agent...",
    "Calculating Dimensions...",
    "Generating Business Insights...",
];

/// Time each message stays on screen.
pub const MESSAGE_INTERVAL: Duration = Duration::from_millis(800);

/// Message for the given tick, wrapping around.
pub fn message_at(tick: usize) -> &'static str {
    LOADING_MESSAGES[tick % LOADING_MESSAGES.len()]
}

/// Background spinner writing to stderr until stopped.
pub struct Spinner {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Spinner {
    pub fn start() -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let handle = thread::spawn(move || {
            let mut tick = 0;
            while flag.load(Ordering::Relaxed) {
                eprint!("\r\x1b[2K  {}", message_at(tick));
                let _ = io::stderr().flush();
                tick += 1;
                let deadline = Instant::now() + MESSAGE_INTERVAL;
                while flag.load(Ordering::Relaxed) {
                    let left = deadline.saturating_duration_since(Instant::now());
                    if left.is_zero() {
                        break;
                    }
                    thread::park_timeout(left);
                }
            }
            eprint!("\r\x1b[2K");
            let _ = io::stderr().flush();
        });
        Self {
            running,
            handle: Some(handle),
        }
    }

    pub fn stop(mut self) {
        self.halt();
    }

    fn halt(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            handle.thread().unpark();
            let _ = handle.join();
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.halt();
    }
}
