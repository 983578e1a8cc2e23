pub mod cancel;
pub mod dispatcher;

pub use cancel::CancellationToken;
pub use dispatcher::{Command, Dispatcher};
