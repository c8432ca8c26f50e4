pub mod resolve;
pub mod source;

pub use resolve::resolve_conflicts;
pub use source::HttpChainSource;
