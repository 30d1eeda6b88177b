//! FX conversion service (C7, spec §4.7). The rate source is an external
//! collaborator (spec §1 "mock external backends... not part of the core"),
//! modeled as a trait port the same way the teacher isolates its arrivals
//! feed behind a trait rather than hard-wiring a concrete generator.

use thiserror::Error;

use crate::models::fx::FxRate;

/// Port to an external FX-rate feed. Implementations may be a fixture, a
/// live API client, or — in tests — a fixed-rate stub.
pub trait FxRateProvider {
    fn fetch(&self, from: &str, to: &str, now: i64) -> Option<FxRate>;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FxError {
    #[error("no rate available for {from}/{to}")]
    Unavailable { from: String, to: String },
    #[error("rate for {from}/{to} is stale")]
    Stale { from: String, to: String },
}

/// Caches the last fetched rate per currency pair and enforces the 60s
/// freshness window (invariant 204) before anyone can use it.
#[derive(Debug, Default)]
pub struct FxCache {
    rates: std::collections::HashMap<(String, String), FxRate>,
}

impl FxCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pull a fresh rate from `provider` if the cached one is stale or
    /// missing, then return the effective (spread-applied) rate.
    pub fn convert(
        &mut self,
        provider: &dyn FxRateProvider,
        from: &str,
        to: &str,
        amount_cents: i64,
        now: i64,
    ) -> Result<i64, FxError> {
        let key = (from.to_string(), to.to_string());
        let needs_refresh = match self.rates.get(&key) {
            Some(rate) => !rate.is_fresh_at(now),
            None => true,
        };
        if needs_refresh {
            if let Some(fresh) = provider.fetch(from, to, now) {
                self.rates.insert(key.clone(), fresh);
            }
        }
        let rate = self.rates.get(&key).ok_or_else(|| FxError::Unavailable {
            from: from.to_string(),
            to: to.to_string(),
        })?;
        if !rate.is_fresh_at(now) {
            return Err(FxError::Stale { from: from.to_string(), to: to.to_string() });
        }
        Ok((amount_cents as f64 * rate.effective_rate()).round() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedProvider(f64);
    impl FxRateProvider for FixedProvider {
        fn fetch(&self, from: &str, to: &str, now: i64) -> Option<FxRate> {
            Some(FxRate::new(from, to, self.0, now))
        }
    }

    struct NoProvider;
    impl FxRateProvider for NoProvider {
        fn fetch(&self, _from: &str, _to: &str, _now: i64) -> Option<FxRate> {
            None
        }
    }

    #[test]
    fn converts_using_effective_rate() {
        let mut cache = FxCache::new();
        let provider = FixedProvider(1.1);
        let out = cache.convert(&provider, "USD", "EUR", 100_000_00, 0).unwrap();
        assert_eq!(out, (100_000_00.0_f64 * 1.1 * 1.005).round() as i64);
    }

    #[test]
    fn refreshes_stale_rate_on_demand() {
        let mut cache = FxCache::new();
        let provider = FixedProvider(1.0);
        cache.convert(&provider, "USD", "EUR", 100_00, 0).unwrap();
        let result = cache.convert(&provider, "USD", "EUR", 100_00, 61);
        assert!(result.is_ok());
    }

    #[test]
    fn unavailable_pair_without_provider_data_errors() {
        let mut cache = FxCache::new();
        let result = cache.convert(&NoProvider, "USD", "JPY", 1_00, 0);
        assert_eq!(result, Err(FxError::Unavailable { from: "USD".to_string(), to: "JPY".to_string() }));
    }
}
