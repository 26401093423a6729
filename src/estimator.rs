// 📈 Estimator - Mock price prediction from a fixed multiplier table
//
// No forecasting happens here. Each method maps to a multiplier applied to
// the catalog's base price:
//   Linear Regression → 1.05
//   Decision Tree     → 1.10
//   everything else   → 1.00 (named-but-unimplemented and unknown methods alike)

use crate::catalog::Catalog;
use crate::error::{PredictionError, Result};
use crate::matcher::Matcher;
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// Currency symbol used in human-readable reports
pub const CURRENCY_SYMBOL: &str = "R";

const TREND_DOWN: f64 = 0.95;
const TREND_UP: f64 = 1.05;

/// Nearest binary float to `value`.
fn to_float(value: Decimal) -> f64 {
    value.to_string().parse().unwrap_or(f64::NAN)
}

/// Round a binary float to cents from its exact binary value, ties to even.
///
/// Displayed prices are computed in f64, so 6.5 × 1.05 (stored just above
/// 6.825) shows as 6.83 while 12.5 × 1.05 (exactly 13.125) shows as 13.12.
/// `exact` is used when the float is not finite.
fn round_cents(value: f64, exact: Decimal) -> Decimal {
    Decimal::from_f64_retain(value)
        .unwrap_or(exact)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}

// ============================================================================
// METHOD
// ============================================================================

/// Prediction method offered in the UI dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Method {
    LinearRegression,
    DecisionTree,
    RandomForest,
    Svr,
    XgBoost,
    Prophet,

    /// Any name outside the list above; gets the identity multiplier
    Unrecognized(String),
}

impl Method {
    /// The named methods, in dropdown order.
    pub const ALL: [Method; 6] = [
        Method::LinearRegression,
        Method::DecisionTree,
        Method::RandomForest,
        Method::Svr,
        Method::XgBoost,
        Method::Prophet,
    ];

    /// Parse a display name. Exact match only; anything else is `Unrecognized`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Linear Regression" => Method::LinearRegression,
            "Decision Tree" => Method::DecisionTree,
            "Random Forest" => Method::RandomForest,
            "SVR" => Method::Svr,
            "XGBoost" => Method::XgBoost,
            "Prophet" => Method::Prophet,
            other => Method::Unrecognized(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::LinearRegression => "Linear Regression",
            Method::DecisionTree => "Decision Tree",
            Method::RandomForest => "Random Forest",
            Method::Svr => "SVR",
            Method::XgBoost => "XGBoost",
            Method::Prophet => "Prophet",
            Method::Unrecognized(name) => name,
        }
    }

    pub fn multiplier(&self) -> Decimal {
        match self {
            Method::LinearRegression => dec!(1.05),
            Method::DecisionTree => dec!(1.10),
            Method::RandomForest
            | Method::Svr
            | Method::XgBoost
            | Method::Prophet
            | Method::Unrecognized(_) => Decimal::ONE,
        }
    }

    /// True when the method actually moves the price.
    pub fn is_adjusting(&self) -> bool {
        self.multiplier() != Decimal::ONE
    }
}

impl FromStr for Method {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Method::from_name(s))
    }
}

impl From<&str> for Method {
    fn from(name: &str) -> Self {
        Method::from_name(name)
    }
}

impl From<String> for Method {
    fn from(name: String) -> Self {
        Method::from_name(&name)
    }
}

impl From<Method> for String {
    fn from(method: Method) -> Self {
        method.as_str().to_string()
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// TREND
// ============================================================================

/// Three synthetic points around the adjusted price: ×0.95, ×1, ×1.05.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    pub previous: Decimal,
    pub current: Decimal,
    pub next: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendPoint {
    pub label: &'static str,
    pub value: Decimal,
}

impl Trend {
    pub fn around(current: Decimal) -> Self {
        Trend {
            previous: current * dec!(0.95),
            current,
            next: current * dec!(1.05),
        }
    }

    /// Each point rounded to 2 dp, ties to even.
    pub fn rounded(&self) -> Trend {
        let cents = |v: Decimal| v.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
        Trend {
            previous: cents(self.previous),
            current: cents(self.current),
            next: cents(self.next),
        }
    }

    /// Labelled points in chart order.
    pub fn points(&self) -> [TrendPoint; 3] {
        [
            TrendPoint { label: "Yesterday", value: self.previous },
            TrendPoint { label: "Today", value: self.current },
            TrendPoint { label: "Tomorrow", value: self.next },
        ]
    }
}

// ============================================================================
// ESTIMATION RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimationResult {
    /// Resolved catalog name
    pub name: String,

    /// Catalog price before adjustment
    pub base_value: Decimal,

    /// base_value × multiplier, full precision
    pub adjusted_value: Decimal,

    /// Copied from the catalog entry
    pub reference_date: NaiveDate,

    pub method: Method,
    pub multiplier: Decimal,
}

impl EstimationResult {
    /// Adjusted value as the f64 product the chart and label are drawn from.
    pub fn float_value(&self) -> f64 {
        to_float(self.base_value) * to_float(self.multiplier)
    }

    /// Adjusted value rounded to 2 dp for display.
    pub fn display_value(&self) -> Decimal {
        round_cents(self.float_value(), self.adjusted_value)
    }

    /// Exact trend around the adjusted value.
    pub fn trend(&self) -> Trend {
        Trend::around(self.adjusted_value)
    }

    /// Trend as displayed: f64 arithmetic, each point rounded to 2 dp.
    pub fn display_trend(&self) -> Trend {
        let current = self.float_value();
        let exact = self.trend().rounded();

        Trend {
            previous: round_cents(current * TREND_DOWN, exact.previous),
            current: round_cents(current, exact.current),
            next: round_cents(current * TREND_UP, exact.next),
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{} via {}: {}{:.2} (expected {})",
            self.name,
            self.method,
            CURRENCY_SYMBOL,
            self.display_value(),
            self.reference_date
        )
    }
}

// ============================================================================
// ESTIMATOR
// ============================================================================

/// Pure function over a borrowed catalog and the fixed multiplier table.
pub struct Estimator<'a> {
    catalog: &'a Catalog,
    matcher: Matcher,
}

impl<'a> Estimator<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Estimator {
            catalog,
            matcher: Matcher::new(),
        }
    }

    /// Use a custom matcher for [`Estimator::predict`].
    pub fn with_matcher(catalog: &'a Catalog, matcher: Matcher) -> Self {
        Estimator { catalog, matcher }
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    /// Estimate by method display name. Unknown names use multiplier 1.0.
    ///
    /// ```
    /// use veggie_price::{Catalog, Estimator};
    /// use rust_decimal_macros::dec;
    ///
    /// let catalog = Catalog::builtin();
    /// let estimator = Estimator::new(&catalog);
    ///
    /// let result = estimator.estimate("Linear Regression", "Tomato").unwrap();
    /// assert_eq!(result.adjusted_value, dec!(13.125));
    /// ```
    pub fn estimate(&self, method: &str, name: &str) -> Result<EstimationResult> {
        self.estimate_with(&Method::from_name(method), name)
    }

    /// Estimate for an already-parsed method. Fails with `NotFound` for an absent name.
    pub fn estimate_with(&self, method: &Method, name: &str) -> Result<EstimationResult> {
        let entry = self.catalog.get(name)?;

        if let Method::Unrecognized(raw) = method {
            warn!(method = %raw, "unrecognized method, using identity multiplier");
        }

        let multiplier = method.multiplier();
        let adjusted_value = entry.base_value * multiplier;

        debug!(
            name = %entry.name,
            method = %method,
            base = %entry.base_value,
            %multiplier,
            adjusted = %adjusted_value,
            "estimated"
        );

        Ok(EstimationResult {
            name: entry.name.clone(),
            base_value: entry.base_value,
            adjusted_value,
            reference_date: entry.reference_date,
            method: method.clone(),
            multiplier,
        })
    }

    /// One result per named method, in dropdown order.
    pub fn estimate_all_methods(&self, name: &str) -> Result<Vec<EstimationResult>> {
        Method::ALL
            .iter()
            .map(|method| self.estimate_with(method, name))
            .collect()
    }

    /// Fuzzy-match `query` against the catalog names, then estimate.
    pub fn predict(&self, query: &str, method: &str) -> std::result::Result<EstimationResult, PredictionError> {
        let names = self.catalog.all_names();

        let name = self
            .matcher
            .find(query, &names)
            .ok_or_else(|| PredictionError::NoMatch {
                query: query.to_string(),
            })?;

        Ok(self.estimate(method, name)?)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogEntry;
    use crate::error::CatalogError;

    #[test]
    fn test_linear_regression_tomato() {
        let catalog = Catalog::builtin();
        let result = Estimator::new(&catalog).estimate("Linear Regression", "Tomato").unwrap();

        assert_eq!(result.name, "Tomato");
        assert_eq!(result.adjusted_value, dec!(13.125));
        assert_eq!(result.multiplier, dec!(1.05));
        assert_eq!(result.method, Method::LinearRegression);
        assert_eq!(result.reference_date, NaiveDate::from_ymd_opt(2025, 4, 8).unwrap());
    }

    #[test]
    fn test_decision_tree_onion() {
        let catalog = Catalog::builtin();
        let result = Estimator::new(&catalog).estimate("Decision Tree", "Onion").unwrap();

        assert_eq!(result.adjusted_value, dec!(9.9));
    }

    #[test]
    fn test_prophet_is_identity() {
        let catalog = Catalog::builtin();
        let result = Estimator::new(&catalog).estimate("Prophet", "Carrot").unwrap();

        assert_eq!(result.adjusted_value, dec!(10.2));
        assert_eq!(result.multiplier, Decimal::ONE);
    }

    #[test]
    fn test_unimplemented_and_unknown_methods_are_identity() {
        let catalog = Catalog::builtin();
        let estimator = Estimator::new(&catalog);

        for method in ["Random Forest", "SVR", "XGBoost", "Prophet", "ARIMA", ""] {
            let result = estimator.estimate(method, "Garlic").unwrap();
            assert_eq!(result.adjusted_value, dec!(15.0), "method {:?}", method);
        }

        let result = estimator.estimate("ARIMA", "Garlic").unwrap();
        assert_eq!(result.method, Method::Unrecognized("ARIMA".to_string()));
    }

    #[test]
    fn test_method_names_are_exact() {
        assert_eq!(Method::from_name("linear regression"), Method::Unrecognized("linear regression".to_string()));
        assert_eq!(Method::from_name("SVR"), Method::Svr);
        assert!(!Method::from_name("svr").is_adjusting());
    }

    #[test]
    fn test_absent_name_is_not_found() {
        let catalog = Catalog::builtin();
        let err = Estimator::new(&catalog).estimate("Linear Regression", "Kale").unwrap_err();

        assert_eq!(err, CatalogError::not_found("Kale"));
    }

    #[test]
    fn test_method_table() {
        let methods = Method::ALL;
        let adjusting: Vec<&str> = methods
            .iter()
            .filter(|m| m.is_adjusting())
            .map(|m| m.as_str())
            .collect();

        assert_eq!(adjusting, vec!["Linear Regression", "Decision Tree"]);

        for method in methods.iter() {
            assert_eq!(&Method::from_name(method.as_str()), method);
        }
    }

    #[test]
    fn test_method_serializes_as_display_name() {
        let json = serde_json::to_string(&Method::XgBoost).unwrap();
        assert_eq!(json, "\"XGBoost\"");

        let parsed: Method = serde_json::from_str("\"Decision Tree\"").unwrap();
        assert_eq!(parsed, Method::DecisionTree);
    }

    #[test]
    fn test_display_value_rounding() {
        let catalog = Catalog::builtin();
        let estimator = Estimator::new(&catalog);

        // 13.125 is an exact midpoint; rounds to even
        let tomato = estimator.estimate("Linear Regression", "Tomato").unwrap();
        assert_eq!(tomato.display_value(), dec!(13.12));

        // 14.3 * 1.10 = 15.73
        let broccoli = estimator.estimate("Decision Tree", "Broccoli").unwrap();
        assert_eq!(broccoli.display_value(), dec!(15.73));

        // 6.5 * 1.05 is exactly 6.825 but lands just above it in f64
        let chilli = estimator.estimate("Linear Regression", "Green Chilli").unwrap();
        assert_eq!(chilli.adjusted_value, dec!(6.825));
        assert_eq!(chilli.display_value(), dec!(6.83));
        assert_eq!(
            chilli.summary(),
            "Green Chilli via Linear Regression: R6.83 (expected 2025-04-08)"
        );
    }

    #[test]
    fn test_display_trend_rounds_each_point() {
        let catalog = Catalog::builtin();
        let estimator = Estimator::new(&catalog);

        let broccoli = estimator.estimate("Prophet", "Broccoli").unwrap();
        assert_eq!(broccoli.trend().next, dec!(15.015));
        assert_eq!(broccoli.display_trend().next, dec!(15.02));

        let chilli = estimator.estimate("Linear Regression", "Green Chilli").unwrap();
        assert_eq!(chilli.trend().next, dec!(7.16625));
        assert_eq!(chilli.display_trend().next, dec!(7.17));

        // 7.125 and 7.875 are exact in f64, so ties go to even
        let potato = estimator.estimate("Prophet", "Potato").unwrap().display_trend();
        assert_eq!(potato.previous, dec!(7.12));
        assert_eq!(potato.current, dec!(7.50));
        assert_eq!(potato.next, dec!(7.88));
    }

    #[test]
    fn test_trend_rounded() {
        let trend = Trend::around(dec!(7.16625)).rounded();

        assert_eq!(trend.previous, dec!(6.81));
        assert_eq!(trend.current, dec!(7.17));
        assert_eq!(trend.next, dec!(7.52));
    }

    #[test]
    fn test_trend_points() {
        let catalog = Catalog::builtin();
        let result = Estimator::new(&catalog).estimate("Prophet", "Potato").unwrap();

        let trend = result.trend();
        assert_eq!(trend.previous, dec!(7.125));
        assert_eq!(trend.current, dec!(7.5));
        assert_eq!(trend.next, dec!(7.875));

        let labels: Vec<&str> = trend.points().iter().map(|p| p.label).collect();
        assert_eq!(labels, vec!["Yesterday", "Today", "Tomorrow"]);
    }

    #[test]
    fn test_summary() {
        let catalog = Catalog::builtin();
        let estimator = Estimator::new(&catalog);

        let tomato = estimator.estimate("Linear Regression", "Tomato").unwrap();
        assert_eq!(tomato.summary(), "Tomato via Linear Regression: R13.12 (expected 2025-04-08)");

        let onion = estimator.estimate("Decision Tree", "Onion").unwrap();
        assert_eq!(onion.summary(), "Onion via Decision Tree: R9.90 (expected 2025-04-08)");
    }

    #[test]
    fn test_estimate_all_methods() {
        let catalog = Catalog::builtin();
        let results = Estimator::new(&catalog).estimate_all_methods("Tomato").unwrap();

        assert_eq!(results.len(), 6);
        assert_eq!(results[0].adjusted_value, dec!(13.125));
        assert_eq!(results[1].adjusted_value, dec!(13.75));
        assert!(results[2..].iter().all(|r| r.adjusted_value == dec!(12.5)));

        assert!(Estimator::new(&catalog).estimate_all_methods("Kale").is_err());
    }

    #[test]
    fn test_predict_fuzzy_then_estimate() {
        let catalog = Catalog::builtin();
        let estimator = Estimator::new(&catalog);

        let result = estimator.predict("tomatoe", "Linear Regression").unwrap();
        assert_eq!(result.name, "Tomato");
        assert_eq!(result.adjusted_value, dec!(13.125));

        let err = estimator.predict("kale", "Linear Regression").unwrap_err();
        assert_eq!(err, PredictionError::NoMatch { query: "kale".to_string() });
    }

    #[test]
    fn test_custom_catalog() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let catalog = Catalog::from_entries(vec![CatalogEntry::new("Okra", dec!(4.00), date)]).unwrap();
        let result = Estimator::new(&catalog).estimate("Decision Tree", "Okra").unwrap();

        assert_eq!(result.adjusted_value, dec!(4.4));
        assert_eq!(result.reference_date, date);
    }

    #[test]
    fn test_shared_across_threads() {
        let catalog = Catalog::builtin();

        std::thread::scope(|s| {
            let handles: Vec<_> = ["Tomato", "Onion", "Carrot"]
                .into_iter()
                .map(|name| {
                    let catalog = &catalog;
                    s.spawn(move || Estimator::new(catalog).estimate("Prophet", name).unwrap())
                })
                .collect();

            for handle in handles {
                let result = handle.join().unwrap();
                assert_eq!(result.adjusted_value, catalog.get(&result.name).unwrap().base_value);
            }
        });
    }
}
