//! # crossdock-cli — CLI Tool for Crossdock
//!
//! Provides the `crossdock` command-line interface for operators working
//! with rate cards and storage scenarios offline, without a running API.
//!
//! ## Subcommands
//!
//! - `crossdock ratecard validate` — Load a rate card file and check it
//!   against every publishing rule (zone uniqueness, overlapping
//!   effective periods, negative amounts).
//! - `crossdock quote` — Compute a one-off shipping quote against a rate
//!   card file.
//! - `crossdock accrue` — Replay a warehouse scenario file and print the
//!   storage charges it would produce.
//!
//! ```bash
//! crossdock ratecard validate cards/us-east.yaml
//! crossdock quote --ratecard cards/us-east.yaml --destination AE \
//!     --weight-kg 2 --length-cm 50 --width-cm 40 --height-cm 30
//! crossdock accrue scenarios/long-stay.yaml --through 2026-04-01
//! ```

pub mod accrue;
pub mod quote;
pub mod ratecard;
