//! Full BB84 walkthrough: distribute a key over a noisy channel, then drive
//! the AES-GCM wrapper with it.
//!
//! Stage-level tracing is available via RUST_LOG=debug.

use bb84_qkd_sim::prelude::*;
use rand::rngs::OsRng;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = ProtocolConfig {
        num_qubits: 2000,
        channel_noise_probability: 0.01,
        ..ProtocolConfig::default()
    };

    println!("Running BB84 over {} qubits...", config.num_qubits);
    let outcome = run(&config)?;
    let stats = &outcome.stats;
    println!(
        "sifted {} bits, sampled {}, QBER {:.3}",
        stats.sifted_bits, stats.sampled_bits, outcome.qber
    );
    println!(
        "cascade corrected {} bits while leaking {} parity bits",
        stats.cascade_corrections, stats.leaked_bits
    );
    println!(
        "final key: {} bits ({:.1}% of qubits sent)",
        stats.final_bits,
        stats.efficiency()
    );

    let key = derive_key(outcome.final_key())?;
    let sealed = encrypt(&key, b"Hello, quantum world!", &mut OsRng)?;
    let opened = decrypt(&key, &sealed)?;
    assert_eq!(opened, b"Hello, quantum world!");
    println!("AES-GCM round trip with the distributed key succeeded");
    Ok(())
}
