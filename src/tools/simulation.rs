//! Campaign simulation engine.
//!
//! Turns a budget, a channel list and a promotion type into headline metrics,
//! a 12-week sales forecast and per-channel performance scores. Every number
//! in one result is derived from the same input and the same random draws, so
//! ROI, sales, CPA and the forecast agree with each other.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::random::{RandomSource, RngSource};
use super::{Tool, ToolError, ToolResult};

const BASE_ROI: f64 = 1.2;
const FORECAST_PERIODS: usize = 12;
const ACQUISITION_COST: (f64, f64) = (80.0, 130.0);

/// Canonical channels with the low end of their score range; each score adds
/// up to 20 points of jitter.
const CANONICAL_CHANNELS: [(&str, f64); 5] = [
    ("Google Ads", 80.0),
    ("Facebook", 75.0),
    ("Instagram", 70.0),
    ("Email", 78.0),
    ("Organic", 60.0),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationInput {
    #[serde(default)]
    pub campaign_name: String,
    pub budget: f64,
    pub channels: Vec<String>,
    pub promotion_type: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub metrics: Vec<Metric>,
    pub sales_forecast: Vec<ForecastPoint>,
    pub channel_performance: Vec<ChannelScore>,
    pub ai_recommendations: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Metric {
    pub title: String,
    pub value: String,
    /// Cosmetic "vs. last simulation" delta, e.g. `+4.2%`.
    pub change: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ForecastPoint {
    pub name: String,
    pub sales: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChannelScore {
    pub name: String,
    pub performance: u32,
}

/// Core figures behind the headline metrics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Projection {
    pub final_roi: f64,
    pub projected_sales: f64,
    pub new_customers: u64,
    pub cpa: f64,
}

pub(crate) fn project(input: &SimulationInput, rng: &mut impl RandomSource) -> Projection {
    let has = |id: &str| input.channels.iter().any(|c| c == id);
    let channel_multiplier = input.channels.len() as f64 * 0.1
        + if has("google") { 0.15 } else { 0.0 }
        + if has("email") { 0.1 } else { 0.0 };
    let promo_multiplier = if input.promotion_type == "percentage_off" {
        1.1
    } else {
        1.0
    };
    let final_roi = (BASE_ROI + channel_multiplier) * promo_multiplier;
    let projected_sales = input.budget * (1.0 + final_roi);

    let acquisition_cost = rng.uniform(ACQUISITION_COST.0, ACQUISITION_COST.1);
    let new_customers = (projected_sales / acquisition_cost).floor().max(0.0) as u64;
    let cpa = if new_customers > 0 {
        input.budget / new_customers as f64
    } else {
        0.0
    };

    Projection {
        final_roi,
        projected_sales,
        new_customers,
        cpa,
    }
}

/// Run one simulation. All randomness comes from `rng`.
pub fn simulate(input: &SimulationInput, rng: &mut impl RandomSource) -> SimulationResult {
    let p = project(input, rng);
    let roi_pct = to_fixed(p.final_roi * 100.0, 0);

    let metrics = vec![
        metric("Estimated ROI", format!("{roi_pct}%"), '+', 10.0, rng),
        metric(
            "Projected Sales",
            format!("${}", format_number(p.projected_sales, 0)),
            '+',
            15.0,
            rng,
        ),
        metric("Target CPA", format!("${}", to_fixed(p.cpa, 2)), '-', 5.0, rng),
        metric(
            "Est. New Customers",
            format_number(p.new_customers as f64, 0),
            '+',
            12.0,
            rng,
        ),
    ];

    let per_period = p.projected_sales / FORECAST_PERIODS as f64;
    let last = (FORECAST_PERIODS - 1) as f64;
    let sales_forecast = (0..FORECAST_PERIODS)
        .map(|i| {
            let ramp = 1.0 + (i as f64 / last - 0.5) * 0.8;
            let jitter = rng.uniform(0.9, 1.1);
            ForecastPoint {
                name: format!("Week {}", i + 1),
                sales: (per_period * ramp * jitter).floor().max(0.0) as u64,
            }
        })
        .collect();

    // Draw every canonical score before filtering so the number of draws does
    // not depend on the requested channels.
    let scored: Vec<ChannelScore> = CANONICAL_CHANNELS
        .iter()
        .map(|(name, base)| ChannelScore {
            name: name.to_string(),
            performance: (base + rng.uniform(0.0, 20.0)).floor() as u32,
        })
        .collect();
    let requested: Vec<String> = input.channels.iter().map(|c| c.to_lowercase()).collect();
    let channel_performance = scored
        .into_iter()
        .filter(|score| {
            let label = score.name.to_lowercase();
            requested.iter().any(|id| label.contains(id.as_str()))
        })
        .collect();

    SimulationResult {
        metrics,
        sales_forecast,
        channel_performance,
        ai_recommendations: recommendation(input, &roi_pct),
    }
}

fn metric(
    title: &str,
    value: String,
    sign: char,
    max_change: f64,
    rng: &mut impl RandomSource,
) -> Metric {
    Metric {
        title: title.to_string(),
        value,
        change: format!("{sign}{}%", to_fixed(rng.uniform(0.0, max_change), 1)),
    }
}

fn recommendation(input: &SimulationInput, roi_pct: &str) -> String {
    let focus = if input.channels.is_empty() {
        "no specific channels".to_string()
    } else {
        input.channels.join(", ")
    };
    format!(
        "With a budget of ${} and focusing on {}, the simulation projects a strong ROI of {}%. \
         The '{}' promotion is effective. Suggestion: Allocate more budget towards top-performing \
         channels like Google Ads to potentially boost sales by another 5-10%.",
        format_number(input.budget, 3),
        focus,
        roi_pct,
        input.promotion_type.replacen('_', " ", 1),
    )
}

/// Fixed-point text with `.5` ties rounded away from zero (`214.5` -> `215`).
pub(crate) fn to_fixed(value: f64, digits: usize) -> String {
    let scale = 10f64.powi(digits as i32);
    format!("{:.*}", digits, (value * scale).round() / scale)
}

/// Group the integer part with commas and keep at most `max_fraction`
/// fraction digits, dropping trailing zeros: `1234.5` -> `1,234.5`.
pub(crate) fn format_number(value: f64, max_fraction: usize) -> String {
    let fixed = to_fixed(value.abs(), max_fraction);
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, f.trim_end_matches('0')),
        None => (fixed.as_str(), ""),
    };

    let digits = int_part.as_bytes();
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, d) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*d as char);
    }

    let negative = value < 0.0 && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0');
    let sign = if negative { "-" } else { "" };
    if frac_part.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac_part}")
    }
}

/// `get_campaign_simulation` tool. Uses the thread RNG unless seeded.
pub struct SimulationTool {
    seeded: Option<Mutex<StdRng>>,
}

impl SimulationTool {
    pub fn new() -> Self {
        Self { seeded: None }
    }

    /// Reproducible runs: the same seed yields the same sequence of results.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seeded: Some(Mutex::new(StdRng::seed_from_u64(seed))),
        }
    }

    pub fn run(&self, input: &SimulationInput) -> SimulationResult {
        match &self.seeded {
            Some(rng) => {
                let mut guard = rng.lock();
                simulate(input, &mut RngSource(&mut *guard))
            }
            None => simulate(input, &mut RngSource(rand::rng())),
        }
    }
}

impl Default for SimulationTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for SimulationTool {
    fn name(&self) -> &str {
        "get_campaign_simulation"
    }
    fn description(&self) -> &str {
        "Simulates an e-commerce marketing campaign and returns projected performance metrics."
    }
    fn parameters(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "campaignName": { "type": "string", "description": "The name of the campaign." },
                "budget": { "type": "number", "description": "The total budget for the campaign in USD." },
                "channels": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "A list of marketing channels to be used."
                },
                "promotionType": { "type": "string", "description": "The type of promotion being offered." }
            },
            "required": ["campaignName", "budget", "channels", "promotionType"]
        })
    }

    async fn execute(&self, args: &HashMap<String, Value>) -> Result<ToolResult, ToolError> {
        let value = Value::Object(args.clone().into_iter().collect());
        let input: SimulationInput = serde_json::from_value(value).map_err(|e| {
            ToolError::InvalidArguments(format!("invalid simulation arguments: {e}"))
        })?;
        tracing::debug!(
            campaign = %input.campaign_name,
            budget = input.budget,
            channels = input.channels.len(),
            "running campaign simulation"
        );
        Ok(ToolResult::Simulation(self.run(&input)))
    }
}
