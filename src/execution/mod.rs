mod dispatcher;
pub mod partition;
mod pool;
mod sequential;

pub use dispatcher::Dispatcher;
pub use pool::PoolDispatcher;
pub use sequential::SequentialDispatcher;
