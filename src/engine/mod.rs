pub mod fit;
pub mod measure;
pub mod runtime;
pub mod snapshot;
