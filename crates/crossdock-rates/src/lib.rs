//! # crossdock-rates — Zone & Rate Resolution
//!
//! The read side of shipment billing:
//!
//! - [`zone`] — the zone directory: named country groupings with the
//!   country-uniqueness invariant enforced at write time (a country
//!   belongs to at most one active zone).
//! - [`rate`] — the shipping rate book: effective-dated rate rows keyed by
//!   (warehouse, zone, service level) with write-time overlap rejection.
//! - [`quote`] — the pure quote computation composing the two.
//!
//! All invariants are enforced at the write boundary; the read path treats
//! a violated invariant as fatal data corruption rather than guessing.

pub mod quote;
pub mod rate;
pub mod zone;

pub use quote::{QuoteError, QuoteRequest, RateQuote, RateQuoter};
pub use rate::{NewShippingRate, RateBook, RateError, ShippingRate};
pub use zone::{NewZone, Zone, ZoneDirectory, ZoneError};
