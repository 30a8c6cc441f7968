use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use circuit::{
    apply_inverse_layer, apply_layer,
    dense::{apply_layer_dense, layer_unitary},
    generate_unitaries, SynthesisConfig,
};
use quantum::{
    operators::{aklt_theta, spin_dot},
    states::{bell_pairs, ghz, interpolated_bulk, random_mps, spin1_bulk},
    Hamiltonian, Mpo, TermSum,
};
use rng::ONDRng;
use tn::{linalg::unitarity_deviation, mps::MPS, truncation::Truncation};

/// Synthesize the circuit preparing one MPS and validate it.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Target state
    #[arg(long, value_enum, default_value_t = State::Aklt)]
    state: State,

    /// Number of sites
    #[arg(long, default_value_t = 8)]
    n: usize,

    /// Bond dimension of the random state
    #[arg(long, default_value_t = 2)]
    bond: usize,

    /// Interpolation parameter for --state interpolated
    #[arg(long, default_value_t = 1.0)]
    s: f64,

    /// Bond budget for compressing replayed states
    #[arg(long, default_value_t = 64)]
    max_bond: usize,

    /// SVD cutoff for compressing replayed states, relative to the largest
    /// singular value
    #[arg(long, default_value_t = 1e-12)]
    cutoff: f64,

    /// Angle θ of the spin-1 chain cos θ (S·S) + sin θ (S·S)² used for
    /// --state aklt (default: the AKLT point, tan θ = 1/3)
    #[arg(long)]
    theta: Option<f64>,

    /// Accepted deviation of a gate from unitarity
    #[arg(long, default_value_t = 1e-10)]
    unitarity_tol: f64,

    /// Relative rank threshold for null spaces (default max(rows, cols)·ε)
    #[arg(long)]
    null_rcond: Option<f64>,

    /// Largest chain checked against the dense path (0 disables)
    #[arg(long, default_value_t = 8)]
    dense_max: usize,

    /// RNG seed (full reproducibility)
    #[arg(long, default_value = "default-seed")]
    seed: String,

    /// Log filter, overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum State {
    /// |0…0⟩
    Product,
    /// Disjoint qubit Bell pairs
    Bell,
    Ghz,
    /// Random qubit MPS with bond --bond
    Random,
    /// Spin-1 AKLT chain
    Aklt,
    /// AKLT interpolation family at --s
    Interpolated,
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();
}

fn build_state(args: &Args) -> Result<MPS> {
    if args.n == 0 {
        bail!("n must be > 0");
    }
    let psi = match args.state {
        State::Product => MPS::new_zero(args.n),
        State::Bell => {
            if args.n % 2 != 0 {
                bail!("bell state needs an even number of sites (got {})", args.n);
            }
            bell_pairs(args.n / 2)
        }
        State::Ghz => {
            if args.n < 2 {
                bail!("GHZ state needs at least two sites");
            }
            ghz(args.n)
        }
        State::Random => {
            let mut rng = ONDRng::new(args.seed.as_bytes());
            random_mps(args.n, 2, args.bond, &mut rng)
        }
        State::Aklt => spin1_bulk().chain(args.n),
        State::Interpolated => interpolated_bulk(args.s).chain(args.n),
    };
    Ok(psi)
}

/// Hamiltonian reported for the prepared state: the bilinear-biquadratic
/// chain for spin-1 AKLT, the snapshot's parent Hamiltonian for the
/// interpolation family, the nearest-neighbour S·S chain otherwise.
fn hamiltonian(args: &Args, d: usize) -> (&'static str, TermSum) {
    match args.state {
        State::Aklt => (
            "bilinear-biquadratic",
            TermSum::aklt(args.n, args.theta.unwrap_or_else(aklt_theta)),
        ),
        State::Interpolated => ("parent", TermSum::parent(args.n, &interpolated_bulk(args.s))),
        _ => ("heisenberg", TermSum::nearest_neighbour(args.n, d, |_| spin_dot(d))),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let trunc = Truncation {
        max_bond: args.max_bond,
        cutoff: args.cutoff,
    };
    let config = SynthesisConfig {
        unitarity_tol: args.unitarity_tol,
        null_rcond: args.null_rcond,
        ..SynthesisConfig::default()
    };

    let psi = build_state(&args)?;
    let d = psi.sites[0].dp;
    info!(
        state = ?args.state,
        n = psi.len(),
        d,
        max_bond = psi.max_bond(),
        "built target state"
    );

    let layer = generate_unitaries(&psi, &config).context("circuit synthesis failed")?;
    let stats = layer.stats();
    let worst = layer.check_unitarity(args.unitarity_tol)?;
    println!(
        "segments={} gates={} two_site={} depth={} max|UU^+-I|={:.3e}",
        stats.segments, stats.gates, stats.two_site_gates, stats.depth, worst
    );

    let zero = MPS::basis_state(&vec![0; psi.len()], d);
    let prepared = apply_layer(&layer, &zero, trunc)?;
    let forward = prepared.normalized_overlap(&psi);
    println!("forward  |<psi|U|0>|   = {:.12}", forward);

    let undone = apply_inverse_layer(&layer, &psi)?;
    let inverse = undone.normalized_overlap(&zero);
    println!("inverse  |<0|U^+|psi>| = {:.12}", inverse);

    if psi.len() <= args.dense_max {
        let dense = apply_layer_dense(&layer, &zero.to_dense())?;
        let sequential = prepared.to_dense();
        let diff = dense
            .iter()
            .zip(&sequential)
            .map(|(a, b)| (a - b).norm())
            .fold(0.0, f64::max);
        println!("dense vs sequential max diff = {:.3e}", diff);

        match layer_unitary(&layer) {
            Ok(u) => {
                let (row, col) = unitarity_deviation(&u);
                println!("layer unitary deviation = {:.3e} / {:.3e}", row, col);
            }
            Err(err) => info!(%err, "skipping full layer unitary"),
        }
    }

    if psi.len() >= 2 {
        let (name, terms) = hamiltonian(&args, d);
        let mpo = Mpo::from_terms(&terms);
        info!(hamiltonian = name, mpo_bond = mpo.max_bond(), "built Hamiltonian");
        let e_terms = Hamiltonian::Terms(terms).expectation(&prepared);
        let e_mpo = Hamiltonian::Mpo(mpo).expectation(&prepared);
        println!("{} energy (terms) = {:.10}", name, e_terms);
        println!("{} energy (MPO)   = {:.10}", name, e_mpo);
    }

    const FIDELITY_TOL: f64 = 1e-8;
    if (1.0 - forward).abs() > FIDELITY_TOL || (1.0 - inverse).abs() > FIDELITY_TOL {
        bail!(
            "round trip failed: forward={:.3e} inverse={:.3e}",
            1.0 - forward,
            1.0 - inverse
        );
    }
    Ok(())
}
