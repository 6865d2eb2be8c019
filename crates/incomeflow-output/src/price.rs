//! Price line frames and valuation band traces.

use crate::palette::{BLUE, PRICE_LOOKAHEAD_DAYS, band_color};
use chrono::{Duration, NaiveDate};
use incomeflow_data::prices::PriceSeries;
use incomeflow_valuation::ValuationBands;
use serde::{Deserialize, Serialize};

/// Price line shown alongside one Sankey frame.
///
/// `x` always spans the whole series so the axis stays put while `y` grows
/// from frame to frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceFrame {
    /// Frame name, matching the Sankey frame
    pub name: String,
    /// Every date of the series
    pub x: Vec<NaiveDate>,
    /// Closes up to the frame's date plus the lookahead
    pub y: Vec<Option<f64>>,
    /// Line color
    pub color: String,
}

/// One valuation band drawn under the price line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandTrace {
    /// Label such as `23x`
    pub name: String,
    /// P/E multiple
    pub multiple: f64,
    /// Dates
    pub x: Vec<NaiveDate>,
    /// Band values
    pub y: Vec<f64>,
    /// Fill color
    pub color: String,
    /// Fill down to the previous band; the first band is unfilled
    pub fill_to_previous: bool,
}

/// Text placed on the price chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Text
    pub text: String,
    /// Date coordinate
    pub x: NaiveDate,
    /// Value coordinate
    pub y: f64,
}

/// One price frame per Sankey frame.
///
/// `frames` pairs each frame name with its date; `None` marks the `Today`
/// frame, which shows the full series.
pub fn price_frames(prices: &PriceSeries, frames: &[(String, Option<NaiveDate>)]) -> Vec<PriceFrame> {
    let x: Vec<NaiveDate> = prices.points().iter().map(|p| p.date).collect();
    frames
        .iter()
        .map(|(name, date)| {
            let shown = match date {
                Some(d) => prices.up_to(*d + Duration::days(PRICE_LOOKAHEAD_DAYS)),
                None => prices.points(),
            };
            PriceFrame {
                name: name.clone(),
                x: x.clone(),
                y: shown.iter().map(|p| p.close).collect(),
                color: BLUE.to_string(),
            }
        })
        .collect()
}

/// Band traces and their labels.
pub fn band_traces(bands: &ValuationBands) -> (Vec<BandTrace>, Vec<Annotation>) {
    let traces: Vec<BandTrace> = bands
        .bands
        .iter()
        .enumerate()
        .map(|(i, band)| BandTrace {
            name: band.label(),
            multiple: band.multiple,
            x: bands.dates.clone(),
            y: band.values.clone(),
            color: band_color(i).to_string(),
            fill_to_previous: i > 0,
        })
        .collect();

    let annotations = bands
        .bands
        .iter()
        .filter_map(|band| {
            let (x, y) = bands.last_point(band)?;
            Some(Annotation {
                text: band.label(),
                x,
                y,
            })
        })
        .collect();

    (traces, annotations)
}
