pub mod banner;
pub mod bid;
pub mod error;
pub mod lot;
pub mod settlement;
pub mod user;

use serde::{Deserialize, Serialize};

/// Plain acknowledgement for mutations that return no payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
