mod common;
mod eviction;
mod recovery;
