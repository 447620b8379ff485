//! Simulation configuration
//!
//! All parameters are compile-time constants surfaced as `Default` impls;
//! there are no runtime flags.

use crate::agents::{
    LiquidityConsumerConfig, MarketMakerConfig, MeanReversionConfig, MomentumConfig, NoiseConfig,
};
use agora_exchange::EngineConfig;
use std::path::PathBuf;

/// Agent counts per strategy.
#[derive(Debug, Clone)]
pub struct Population {
    pub noise: u32,
    pub market_makers: u32,
    pub liquidity_consumers: u32,
    pub momentum: u32,
    pub mean_reversion: u32,
}

impl Default for Population {
    fn default() -> Self {
        Self {
            noise: 40,
            market_makers: 5,
            liquidity_consumers: 5,
            momentum: 20,
            mean_reversion: 20,
        }
    }
}

impl Population {
    pub fn total(&self) -> u32 {
        self.noise
            + self.market_makers
            + self.liquidity_consumers
            + self.momentum
            + self.mean_reversion
    }
}

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Independent runs per invocation
    pub runs: u32,
    /// Timesteps per run
    pub timesteps: u64,
    /// Root of every per-run and per-agent random stream
    pub master_seed: u64,
    /// Starting cash per agent
    pub initial_cash: f64,
    pub output_dir: PathBuf,
    pub engine: EngineConfig,
    pub population: Population,
    pub noise: NoiseConfig,
    pub market_maker: MarketMakerConfig,
    pub liquidity_consumer: LiquidityConsumerConfig,
    pub momentum: MomentumConfig,
    pub mean_reversion: MeanReversionConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            runs: 10,
            timesteps: 300_000,
            master_seed: 42,
            initial_cash: 20_000.0,
            output_dir: PathBuf::from("output"),
            engine: EngineConfig::default(),
            population: Population::default(),
            noise: NoiseConfig::default(),
            market_maker: MarketMakerConfig::default(),
            liquidity_consumer: LiquidityConsumerConfig::default(),
            momentum: MomentumConfig::default(),
            mean_reversion: MeanReversionConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_population() {
        let population = Population::default();
        assert_eq!(population.total(), 90);
    }

    #[test]
    fn test_default_run_shape() {
        let config = SimulationConfig::default();
        assert_eq!(config.runs, 10);
        assert_eq!(config.timesteps, 300_000);
    }
}
