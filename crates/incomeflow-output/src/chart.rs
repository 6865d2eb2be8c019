//! Serializable chart specification.
//!
//! A [`ChartSpec`] holds everything a front end needs to draw the animated
//! income chart: the Sankey waterfall, the optional price panel with its
//! valuation bands, one animation frame per quarter and the slider/playback
//! timeline. It carries no rendering logic of its own.

use crate::palette::{FONT_COLOR, FONT_FAMILY, FONT_SIZE, FRAME_DURATION_MS, TRANSPARENT};
use crate::price::{Annotation, BandTrace, PriceFrame, band_traces, price_frames};
use crate::sankey::{SankeyFrame, TODAY_FRAME, sankey_frames};
use chrono::NaiveDate;
use incomeflow_data::QuarterlyIncome;
use incomeflow_data::prices::PriceSeries;
use incomeflow_valuation::ValuationBands;
use serde::{Deserialize, Serialize};

/// Alert text shown when no source covers a symbol.
pub const NOT_SUPPORTED_ALERT: &str = "Not Supported";

/// Text style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Font {
    /// Color
    pub color: String,
    /// Font stack
    pub family: String,
    /// Size in points
    pub size: u32,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            color: FONT_COLOR.to_string(),
            family: FONT_FAMILY.to_string(),
            size: FONT_SIZE,
        }
    }
}

/// Page-level styling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    /// Text style
    pub font: Font,
    /// Background behind the whole chart
    pub paper_background: String,
    /// Background behind the price plot
    pub plot_background: String,
    /// Whether a legend is drawn
    pub show_legend: bool,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            font: Font::default(),
            paper_background: TRANSPARENT.to_string(),
            plot_background: TRANSPARENT.to_string(),
            show_legend: false,
        }
    }
}

/// Slider position that jumps to a frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliderStep {
    /// Text under the slider tick
    pub label: String,
    /// Name of the frame shown
    pub frame: String,
}

/// Playback button action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackAction {
    /// Play from the current frame
    Play,
    /// Stop on the current frame
    Pause,
}

/// Playback button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackButton {
    /// Button text
    pub label: String,
    /// What the button does
    pub action: PlaybackAction,
}

/// Slider and playback controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    /// One step per frame, in frame order
    pub steps: Vec<SliderStep>,
    /// Time each frame is shown while playing
    pub frame_duration_ms: u64,
    /// Transition between frames
    pub transition_duration_ms: u64,
    /// Play and pause buttons
    pub buttons: Vec<PlaybackButton>,
}

impl Timeline {
    /// Timeline stepping through the named frames.
    pub fn for_frames<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            steps: names
                .into_iter()
                .map(|name| SliderStep {
                    label: name.to_string(),
                    frame: name.to_string(),
                })
                .collect(),
            frame_duration_ms: FRAME_DURATION_MS,
            transition_duration_ms: 0,
            buttons: vec![
                PlaybackButton {
                    label: "⏵".to_string(),
                    action: PlaybackAction::Play,
                },
                PlaybackButton {
                    label: "⏸".to_string(),
                    action: PlaybackAction::Pause,
                },
            ],
        }
    }
}

/// One animation frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartFrame {
    /// Frame name
    pub name: String,
    /// Waterfall for this frame
    pub sankey: SankeyFrame,
    /// Price line for this frame, when a price panel is drawn
    pub price: Option<PriceFrame>,
}

/// Prices and bands for the lower panel.
#[derive(Debug, Clone, Copy)]
pub struct PricePanel<'a> {
    /// Daily closes
    pub prices: &'a PriceSeries,
    /// Valuation bands, possibly empty
    pub bands: &'a ValuationBands,
}

/// Complete chart for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    /// Symbol charted, empty for the blank chart
    pub symbol: String,
    /// Waterfall shown before playback starts (the `Today` frame)
    pub sankey: Option<SankeyFrame>,
    /// Price line shown before playback starts
    pub price: Option<PriceFrame>,
    /// Valuation bands, lowest multiple first
    pub bands: Vec<BandTrace>,
    /// Band labels
    pub annotations: Vec<Annotation>,
    /// Animation frames, oldest quarter first, `Today` last
    pub frames: Vec<ChartFrame>,
    /// Slider and playback controls
    pub timeline: Timeline,
    /// Styling
    pub layout: Layout,
}

impl ChartSpec {
    /// Blank chart with no data.
    pub fn empty() -> Self {
        Self {
            symbol: String::new(),
            sankey: None,
            price: None,
            bands: Vec::new(),
            annotations: Vec::new(),
            frames: Vec::new(),
            timeline: Timeline::for_frames(std::iter::empty()),
            layout: Layout::default(),
        }
    }

    /// Build the chart for the last `quarters` of `incomes`.
    pub fn build(
        symbol: impl Into<String>,
        incomes: &[QuarterlyIncome],
        quarters: usize,
        panel: Option<PricePanel<'_>>,
    ) -> Self {
        let sankey = sankey_frames(incomes, quarters);
        if sankey.is_empty() {
            return Self {
                symbol: symbol.into(),
                ..Self::empty()
            };
        }

        // Same names and order as the Sankey frames; `Today` has no cutoff.
        let shown = &incomes[incomes.len().saturating_sub(quarters)..];
        let frame_dates: Vec<(String, Option<NaiveDate>)> = shown
            .iter()
            .map(|q| (q.label(), Some(q.date)))
            .chain(std::iter::once((TODAY_FRAME.to_string(), None)))
            .collect();

        let prices: Vec<Option<PriceFrame>> = match panel {
            Some(p) => price_frames(p.prices, &frame_dates)
                .into_iter()
                .map(Some)
                .collect(),
            None => vec![None; sankey.len()],
        };
        let (bands, annotations) = panel.map(|p| band_traces(p.bands)).unwrap_or_default();

        let timeline = Timeline::for_frames(sankey.iter().map(|f| f.name.as_str()));
        let initial_sankey = sankey.last().cloned();
        let initial_price = prices.last().cloned().flatten();

        let frames = sankey
            .into_iter()
            .zip(prices)
            .map(|(sankey, price)| ChartFrame {
                name: sankey.name.clone(),
                sankey,
                price,
            })
            .collect();

        Self {
            symbol: symbol.into(),
            sankey: initial_sankey,
            price: initial_price,
            bands,
            annotations,
            frames,
            timeline,
            layout: Layout::default(),
        }
    }

    /// Returns true if the chart has no data.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl Default for ChartSpec {
    fn default() -> Self {
        Self::empty()
    }
}

/// Blank chart returned with an alert when no source covers a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorState {
    /// Blank chart
    pub chart: ChartSpec,
    /// Whether the alert is displayed
    pub alert: bool,
    /// Alert text
    pub message: String,
    /// Why the chart could not be built
    pub reason: String,
}

impl ErrorState {
    /// "Not Supported" state with the given reason.
    pub fn not_supported(reason: impl Into<String>) -> Self {
        Self {
            chart: ChartSpec::empty(),
            alert: true,
            message: NOT_SUPPORTED_ALERT.to_string(),
            reason: reason.into(),
        }
    }
}
