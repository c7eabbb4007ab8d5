pub mod chunker;
pub mod retriever;
pub mod store;
