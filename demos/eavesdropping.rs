//! Side-by-side comparison of a clean channel and a fully tapped one,
//! showing the QBER separation that makes the attack detectable.

use bb84_qkd_sim::prelude::*;

fn main() {
    let clean = ProtocolConfig {
        num_qubits: 1000,
        channel_noise_probability: 0.01,
        random_seed: Some(7),
        ..ProtocolConfig::default()
    };

    match run(&clean) {
        Ok(outcome) => println!(
            "clean channel:  QBER {:.3}, final key {} bits",
            outcome.qber,
            outcome.final_key().len()
        ),
        Err(err) => println!("clean channel failed unexpectedly: {err}"),
    }

    let tapped = ProtocolConfig {
        eve_present: true,
        eve_intercept_probability: 1.0,
        ..clean
    };

    match run(&tapped) {
        Ok(_) => println!("tapped channel: eavesdropper slipped through!"),
        Err(ProtocolError::EavesdroppingDetected { qber, threshold }) => println!(
            "tapped channel: QBER {qber:.3} above threshold {threshold:.3}, run aborted"
        ),
        Err(err) => println!("tapped channel: aborted with {err}"),
    }
}
