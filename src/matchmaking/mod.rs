//! ELO-tolerant matchmaking.
//!
//! - `types`: match requests, queued players, and formed matches.
//! - `queue`: the FIFO-with-rating-order queue matches are drawn from.
//! - `matchmaker`: the pairing algorithm plus wait-time metrics.

pub mod matchmaker;
pub mod queue;
pub mod types;

pub use matchmaker::Matchmaker;
pub use queue::MatchQueue;
pub use types::{Match, MatchRequest, QueuedPlayer};
