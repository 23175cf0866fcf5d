pub mod cmd;
pub mod conf;
mod fleet;
pub use fleet::*;
pub mod global;
pub use global::*;
mod monitor;
pub use monitor::*;
mod notify;
pub use notify::*;
mod probe;
pub use probe::*;
mod report;
pub use report::*;
