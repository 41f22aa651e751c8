//! # Quote Subcommand
//!
//! Computes a one-off shipping quote against a rate card file, applying
//! the same volumetric-weight and minimum-charge rules as the API.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::Args;
use crossdock_core::weight::{chargeable_weight, volumetric_weight};
use crossdock_core::{CountryCode, PackageDimensions, ServiceLevel, WeightKg};
use crossdock_rates::{QuoteRequest, RateQuoter};
use rust_decimal::Decimal;

use crate::ratecard;

/// Arguments for the `crossdock quote` subcommand.
#[derive(Args, Debug)]
pub struct QuoteArgs {
    /// Rate card file to quote against.
    #[arg(long)]
    pub ratecard: PathBuf,

    /// Destination country (ISO 3166-1 alpha-2).
    #[arg(long)]
    pub destination: String,

    /// Service level: economy, standard, or express.
    #[arg(long, default_value = "standard")]
    pub service_level: String,

    /// Scale weight in kilograms.
    #[arg(long)]
    pub weight_kg: Decimal,

    /// Length in centimeters. Dimensions require all three measurements.
    #[arg(long)]
    pub length_cm: Option<Decimal>,

    /// Width in centimeters.
    #[arg(long)]
    pub width_cm: Option<Decimal>,

    /// Height in centimeters.
    #[arg(long)]
    pub height_cm: Option<Decimal>,

    /// Reference date for rate selection; defaults to today.
    #[arg(long)]
    pub as_of: Option<NaiveDate>,
}

/// Execute the quote subcommand.
pub fn run_quote(args: &QuoteArgs) -> Result<u8> {
    let card = ratecard::load(&args.ratecard)?;
    let loaded = ratecard::build(&card).context("rate card failed validation")?;

    let destination = CountryCode::new(&args.destination)?;
    let service_level = ServiceLevel::parse(&args.service_level)?;
    let actual = WeightKg::new(args.weight_kg)?;
    let dims = parse_dimensions(args)?;
    let volumetric = volumetric_weight(dims.as_ref());
    let chargeable = chargeable_weight(actual, dims.as_ref());
    let as_of = args.as_of.unwrap_or_else(|| chrono::Utc::now().date_naive());

    let quoter = RateQuoter::new(loaded.zones.clone(), loaded.rates.clone());
    let quote = quoter.quote(&QuoteRequest {
        warehouse_id: loaded.warehouse_id,
        destination,
        service_level,
        chargeable_weight: chargeable,
        as_of,
    })?;

    let mut value = serde_json::to_value(&quote)?;
    if let Some(obj) = value.as_object_mut() {
        obj.insert(
            "actual_weight_kg".to_string(),
            serde_json::to_value(actual)?,
        );
        obj.insert(
            "volumetric_weight_kg".to_string(),
            serde_json::to_value(volumetric)?,
        );
    }
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(0)
}

fn parse_dimensions(args: &QuoteArgs) -> Result<Option<PackageDimensions>> {
    match (args.length_cm, args.width_cm, args.height_cm) {
        (None, None, None) => Ok(None),
        (Some(l), Some(w), Some(h)) => Ok(Some(PackageDimensions::new(l, w, h)?)),
        _ => bail!("--length-cm, --width-cm, and --height-cm must be given together"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: QuoteArgs,
    }

    fn parse(argv: &[&str]) -> QuoteArgs {
        Harness::try_parse_from(argv).unwrap().args
    }

    #[test]
    fn partial_dimensions_are_rejected() {
        let args = parse(&[
            "quote",
            "--ratecard",
            "card.yaml",
            "--destination",
            "US",
            "--weight-kg",
            "2",
            "--length-cm",
            "50",
        ]);
        assert!(parse_dimensions(&args).is_err());
    }

    #[test]
    fn full_dimensions_parse() {
        let args = parse(&[
            "quote",
            "--ratecard",
            "card.yaml",
            "--destination",
            "US",
            "--weight-kg",
            "2",
            "--length-cm",
            "50",
            "--width-cm",
            "40",
            "--height-cm",
            "30",
        ]);
        let dims = parse_dimensions(&args).unwrap().unwrap();
        assert_eq!(
            dims.volumetric_weight().as_decimal(),
            rust_decimal_macros::dec!(12)
        );
    }
}
