mod projection;
mod rprop;

pub use projection::{pseudo_gradient, sign};
pub use rprop::Rprop;
