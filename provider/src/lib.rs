//! Client side of the Quatro backend.
//!
//! The reel sequencer only needs one call, [`DrawProvider::play_ticket`]; the
//! rest of [`HttpClient`] covers ticket registration and the prize catalogue
//! used by the ticket entry flow.

use core::future::Future;

use quatro_abi::{DrawOutcome, TicketId};

pub mod client;
pub mod error;
pub mod token;


pub use client::HttpClient;
pub use error::{ProviderError, ProviderResult};
pub use token::{StaticToken, TokenSource};

/// Remote authority for draw results.
///
/// Implementations must return only validated outcomes: a response whose
/// digits fall outside 1..=9 or that lacks a field is an error, never a
/// partially filled `DrawOutcome`.
pub trait DrawProvider: Send + Sync + 'static {
    fn play_ticket(
        &self,
        ticket: TicketId,
    ) -> impl Future<Output = ProviderResult<DrawOutcome>> + Send;
}
