use std::time::Duration;

/// The engine's only suspension point: the wait after each presented frame.
pub trait Pacer {
    fn wait(&mut self, delay: Duration);
}

/// Blocks the calling thread for the full delay.
#[derive(Debug, Default)]
pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn wait(&mut self, delay: Duration) {
        std::thread::sleep(delay);
    }
}
