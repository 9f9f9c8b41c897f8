//! External service integrations.

pub mod graph_client {
    pub use crate::graph_client::*;
}
