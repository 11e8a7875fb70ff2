pub mod cancel;
pub mod pacer;

pub use cancel::CancelToken;
pub use pacer::{Pacer, ThreadPacer};
