mod logistic;

pub use logistic::{LogisticSource, SparseSample};
