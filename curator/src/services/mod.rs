pub mod news_feed;
pub mod social;
pub mod state_store;
pub mod translator;

#[cfg(test)]
pub mod tests;

pub use news_feed::*;
pub use social::*;
pub use state_store::*;
pub use translator::*;
