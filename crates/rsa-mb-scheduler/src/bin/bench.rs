//! rsa-mb-bench: Run the batching pipeline on the software backend
//!
//! Usage:
//!   rsa-mb-bench --requests 1024 --verify
//!   rsa-mb-bench --key key.json --private-key-variant type2 --json
//!   rsa-mb-bench --config batch.json --key key.json
//!   RUST_LOG=rsa_mb_scheduler=debug rsa-mb-bench --requests 20 --metrics

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use num_bigint::{BigUint, RandBigInt};
use rsa_mb_core::{BatchConfig, KeyConfig, PrivateKeyVariant};
use rsa_mb_scheduler::{Pipeline, PipelineReport, StageReport};
use rsa_mb_soft::SoftwareBackend;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum VariantArg {
    Type1,
    Type2,
}

impl From<VariantArg> for PrivateKeyVariant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Type1 => PrivateKeyVariant::Type1,
            VariantArg::Type2 => PrivateKeyVariant::Type2,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "rsa-mb-bench")]
#[command(about = "Encrypt and decrypt random messages in lane-width batches")]
struct Args {
    /// Number of requests to generate
    #[arg(short = 'n', long, default_value = "64")]
    requests: usize,

    /// Key file (JSON, hex-encoded components); defaults to the built-in 1024-bit key
    #[arg(long)]
    key: Option<PathBuf>,

    /// Batch configuration file (JSON); flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Private key representation used for decryption [default: type1]
    #[arg(long, value_enum)]
    private_key_variant: Option<VariantArg>,

    /// Cross-check every result against num-bigint
    #[arg(long)]
    verify: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Print Prometheus metrics after the run
    #[arg(long)]
    metrics: bool,
}

fn print_stage(report: &StageReport) {
    println!(
        "  {:<8} batches={:<5} live={:<6} padding={:<4} excluded={:<4} {:>10.1} ms  {:>10.0} ops/s",
        report.stage,
        report.batches,
        report.live_lanes,
        report.padding_lanes,
        report.excluded,
        report.elapsed.as_secs_f64() * 1000.0,
        report.throughput(),
    );
}

fn print_summary(report: &PipelineReport) {
    println!("backend: {}, requests: {}", report.backend, report.requests);
    print_stage(&report.encrypt);
    print_stage(&report.decrypt);
    if let Some(verify) = &report.verify {
        if verify.is_clean() {
            println!("  verify   {} requests ok", verify.checked);
        } else {
            println!(
                "  verify   {} of {} requests MISMATCHED: {:?}",
                verify.mismatches.len(),
                verify.checked,
                verify.mismatches
            );
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("rsa_mb_scheduler=info".parse()?),
        )
        .init();

    let args = Args::parse();

    let recorder = if args.metrics {
        Some(
            metrics_exporter_prometheus::PrometheusBuilder::new()
                .install_recorder()
                .context("Failed to install Prometheus recorder")?,
        )
    } else {
        None
    };

    let key = match &args.key {
        Some(path) => KeyConfig::load(path)
            .with_context(|| format!("Failed to load key from {}", path.display()))?,
        None => KeyConfig::reference_1024(),
    };
    let modulus = key.modulus()?;

    let mut config = match &args.config {
        Some(path) => BatchConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => BatchConfig::default(),
    };
    if args.verify {
        config = config.with_verify(true);
    }
    if let Some(variant) = args.private_key_variant {
        config = config.with_private_key_variant(variant.into());
    }
    let variant = config.private_key_variant;

    let backend = SoftwareBackend::new();
    let pipeline = Pipeline::new(&backend, config)?;

    let mut rng = rand::thread_rng();
    let plaintexts: Vec<BigUint> = (0..args.requests)
        .map(|_| rng.gen_biguint_below(&modulus))
        .collect();

    tracing::info!(
        requests = args.requests,
        bits_n = modulus.bits(),
        variant = %variant,
        "Generated plaintexts"
    );

    let mut requests = pipeline.requests_from_key(&key, 0, plaintexts)?;
    let report = pipeline.run(&mut requests)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }

    if let Some(handle) = recorder {
        print!("{}", handle.render());
    }

    if let Some(verify) = &report.verify {
        anyhow::ensure!(
            verify.is_clean(),
            "{} results disagree with the oracle",
            verify.mismatches.len()
        );
    }

    Ok(())
}
