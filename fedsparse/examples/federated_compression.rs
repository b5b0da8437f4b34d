//! Example: Compressing Client Updates in a Federated Round
//!
//! Demonstrates one round of client-side compression with:
//! - Budget derivation from the raw bit width of a layer
//! - Top-k / rand-k / sparse-ternary sparsification
//! - Adaptive sparse k-means with min-max scaling
//! - Bandwidth accounting per client
//!
//! Run: RUST_LOG=fedsparse=debug cargo run --example federated_compression -p fedsparse

use fedsparse::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const NUM_CLIENTS: usize = 4;
const LAYER_SIZES: [usize; 8] = [32, 32, 256, 8, 512, 16, 2048, 62];

fn main() -> fedsparse::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fedsparse=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("📡 Federated Update Compression Example");
    println!("=======================================\n");

    let strategies = vec![
        CompressionStrategy::Baseline,
        CompressionStrategy::TopK { space_savings: 0.9 },
        CompressionStrategy::RandK { space_savings: 0.9, seed: Some(7) },
        CompressionStrategy::SparseTernary { space_savings: 0.9 },
        CompressionStrategy::SparseKMeans { budget_fraction: 0.6, scale: true },
    ];

    for strategy in strategies {
        println!("🔧 Strategy: {}", strategy.name());
        let config = CompressionConfig::new(strategy).with_layers(vec![6]);
        let mut compressor = UpdateCompressor::new(config)?;

        for client in 0..NUM_CLIENTS {
            let mut update = simulate_local_update(client as u64);
            let report = compressor.compress(&mut update)?;

            let layer = &report.layers[0];
            println!(
                "   client {}: {:>5} → {:>5} non-zeros, {:>6} → {:>6} bytes, mse {:.2e}{}",
                client,
                report.before_nonzeros,
                report.after_nonzeros,
                report.before_bytes,
                report.after_bytes,
                layer.mse,
                layer
                    .bit_depth
                    .map(|b| format!(", {} bits", b))
                    .unwrap_or_default(),
            );
            if !report.over_budget_layers().is_empty() {
                println!("      ⚠️ over budget: {:?}", report.over_budget_layers());
            }
        }
        println!();
    }

    // Direct engine use on a single vector
    println!("🔬 Direct sparse k-means on one layer");
    let update = simulate_local_update(99);
    let (scaler, scaled) = MinMaxScaler::fit_transform(&update[6])?;
    let budget = budget_for(&update[6], 0.1);
    let result = sparse_kmeans(&scaled, budget, &KMeansConfig::default())?;
    let restored = scaler.inverse_transform(&result.compressed);
    println!("   budget: {} bytes", budget);
    println!("   objectives per bit-depth: {:?}", result.objectives);
    println!("   selected bit-depth: {}", result.bit_depth);
    println!("   centroids: {:?}", result.centroids);
    println!("   restored mse: {:.3e}", mse(&update[6], &restored)?);

    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Stand-in for local training: a model update shaped like a small CNN
fn simulate_local_update(seed: u64) -> Vec<Vec<f32>> {
    let mut rng = StdRng::seed_from_u64(seed);
    LAYER_SIZES
        .iter()
        .map(|&n| {
            (0..n)
                .map(|_| {
                    // Mostly small updates with a few large ones
                    let v: f32 = rng.gen_range(-0.01..0.01);
                    if rng.gen_bool(0.05) { v * 50.0 } else { v }
                })
                .collect()
        })
        .collect()
}
