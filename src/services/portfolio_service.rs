use std::collections::HashMap;

use crate::models::{SimulatedHolding, SimulationRequest, SimulationResponse};

/// Any single holding above this weight flips the concentration flag.
pub const CONCENTRATION_LIMIT: f64 = 30.0;

/// Reference prices for the demo tickers. Unknown symbols get a random
/// price so the simulation still works for any input.
fn snapshot_price(symbol: &str) -> f64 {
    match symbol {
        "AAPL" => 180.50,
        "MSFT" => 415.20,
        "TSLA" => 248.30,
        "GOOGL" => 142.80,
        "NVDA" => 875.20,
        "AMZN" => 155.30,
        "META" => 485.60,
        "NFLX" => 605.40,
        _ => 100.0 + rand::random::<f64>() * 200.0,
    }
}

/// Pure allocation math. Weights default to an equal split and are taken
/// as-is otherwise; they are independent sliders in the UI and deliberately
/// do NOT have to sum to 100.
pub fn build_simulation(request: &SimulationRequest) -> SimulationResponse {
    let symbols: Vec<String> = request
        .symbols
        .iter()
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect();

    if symbols.is_empty() {
        return SimulationResponse {
            holdings: Vec::new(),
            total_value: 0.0,
            total_weight: 0.0,
            concentrated: false,
        };
    }

    let weights: HashMap<String, f64> = request
        .weights
        .clone()
        .unwrap_or_default()
        .into_iter()
        .map(|(symbol, weight)| (symbol.trim().to_uppercase(), weight))
        .collect();
    let equal_split = 100.0 / symbols.len() as f64;

    let holdings: Vec<SimulatedHolding> = symbols
        .iter()
        .map(|symbol| {
            let weight = weights.get(symbol).copied().unwrap_or(equal_split);
            let price = snapshot_price(symbol);
            let value = request.total_investment * weight / 100.0;
            let shares = value / price;

            SimulatedHolding {
                symbol: symbol.clone(),
                name: symbol.clone(),
                price,
                weight,
                shares,
                value,
            }
        })
        .collect();

    let total_value = holdings.iter().map(|h| h.value).sum();
    let total_weight = holdings.iter().map(|h| h.weight).sum();
    let concentrated = holdings.iter().any(|h| h.weight > CONCENTRATION_LIMIT);

    SimulationResponse { holdings, total_value, total_weight, concentrated }
}
