mod shell;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use secded::ecc::format::{parse_word, render_codeword, to_bit_string, to_hex};
use secded::{DataWidth, Decoded, ErrorKind, HammingCodec};

#[derive(Parser)]
#[command(
    name = "secded",
    about = "Encode, damage and repair words with an extended Hamming (SEC-DED) code"
)]
struct Cli {
    /// Data word width in bits: 8, 16 or 32
    #[arg(short, long, default_value = "16", global = true)]
    width: DataWidth,
    /// Log codec diagnostics (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a data word (binary, or hex with 0x)
    Encode { data: String },
    /// Check a codeword and correct a single error
    Decode { codeword: String },
    /// Flip one bit of a codeword
    Inject { codeword: String, position: usize },
    /// Show which positions hold data, parity and global parity
    Layout,
    /// Walk through encode, inject and correct
    Demo {
        #[arg(long, default_value = "0x1A")]
        data: String,
        #[arg(long, default_value_t = 3)]
        position: usize,
    },
    /// Check every single and double fault of one data word
    Sweep { data: String },
    /// Check random words with random faults
    Fuzz {
        #[arg(long, default_value_t = 10_000)]
        trials: usize,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Interactive session with simulated memory
    Shell,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let codec = HammingCodec::with_width(cli.width);
    info!(
        "{} codec: {} parity bits, {} total bits",
        cli.width,
        codec.parity_bits(),
        codec.total_bits()
    );

    match cli.command {
        Commands::Encode { data } => encode(&codec, &data)?,
        Commands::Decode { codeword } => {
            let codeword = parse_codeword(&codec, &codeword)?;
            print_decoded(&codec, &codec.detect_and_correct(codeword));
        }
        Commands::Inject { codeword, position } => {
            let codeword = parse_codeword(&codec, &codeword)?;
            let damaged = codec.inject_error(codeword, position)?;
            println!("codeword  {}", to_hex(damaged));
            println!("{}", render_codeword(&codec, damaged, Some(position)));
        }
        Commands::Layout => print_layout(&codec),
        Commands::Demo { data, position } => demo(&codec, &data, position)?,
        Commands::Sweep { data } => sweep(&codec, &data)?,
        Commands::Fuzz { trials, seed } => fuzz(&codec, trials, seed)?,
        Commands::Shell => shell::run(cli.width)?,
    }

    Ok(())
}

fn parse_data(codec: &HammingCodec, text: &str) -> Result<u64> {
    let data = parse_word(text)?;
    if data & !codec.data_mask() != 0 {
        bail!(
            "data {} does not fit in {} bits",
            to_hex(data),
            codec.data_bits()
        );
    }
    Ok(data)
}

fn parse_codeword(codec: &HammingCodec, text: &str) -> Result<u64> {
    let codeword = parse_word(text)?;
    if codeword & !codec.codeword_mask() != 0 {
        bail!(
            "codeword {} is wider than {} bits",
            to_hex(codeword),
            codec.total_bits()
        );
    }
    Ok(codeword)
}

fn encode(codec: &HammingCodec, text: &str) -> Result<()> {
    let data = parse_data(codec, text)?;
    let encoded = codec.encode(data)?;
    println!("data      {} ({})", to_hex(data), to_bit_string(data, codec.data_bits()));
    println!("codeword  {} ({} bits)", to_hex(encoded), codec.total_bits());
    println!("{}", render_codeword(codec, encoded, None));
    Ok(())
}

fn print_decoded(codec: &HammingCodec, decoded: &Decoded) {
    match decoded.kind {
        ErrorKind::None => println!("diagnosis  no error"),
        ErrorKind::Single { position } => {
            println!("diagnosis  single error at bit {}, corrected", position)
        }
        ErrorKind::Double => println!("diagnosis  double error, not correctable"),
    }
    println!(
        "syndrome   {} ({})",
        decoded.syndrome,
        to_bit_string(decoded.syndrome as u64, codec.parity_bits())
    );
    println!(
        "parity     {}",
        if decoded.overall_parity_odd { "odd" } else { "even" }
    );
    println!("corrected  {}", to_hex(decoded.corrected));
    match decoded.kind {
        ErrorKind::Double => println!("data       {} (unreliable)", to_hex(decoded.data)),
        _ => println!("data       {}", to_hex(decoded.data)),
    }
    println!(
        "{}",
        render_codeword(codec, decoded.corrected, decoded.error_position())
    );
}

fn print_layout(codec: &HammingCodec) {
    let layout = codec.data_and_parity_positions();
    println!(
        "{} data bits, {} parity bits, {} total bits",
        codec.data_bits(),
        codec.parity_bits(),
        codec.total_bits()
    );
    println!("data positions    {:?}", layout.data_positions);
    println!("parity positions  {:?}", layout.parity_positions);
    println!("global parity     {}", layout.global_parity_position);
    for group in 0..codec.parity_bits() {
        println!("  P{} covers {:?}", group, codec.parity_group(group));
    }
}

fn demo(codec: &HammingCodec, text: &str, position: usize) -> Result<()> {
    let data = parse_data(codec, text)?;

    println!("1. encode {}", to_hex(data));
    let encoded = codec.encode(data)?;
    println!("{}\n", render_codeword(codec, encoded, None));

    println!("2. check the clean codeword");
    print_decoded(codec, &codec.detect_and_correct(encoded));
    println!();

    println!("3. flip bit {}", position);
    let damaged = codec.inject_error(encoded, position)?;
    println!("{}\n", render_codeword(codec, damaged, Some(position)));

    println!("4. check the damaged codeword");
    let decoded = codec.detect_and_correct(damaged);
    print_decoded(codec, &decoded);

    if decoded.corrected != encoded || decoded.data != data {
        bail!("codec failed to restore {}", to_hex(data));
    }
    Ok(())
}

/// Whether `decoded` is the right diagnosis for `encoded` (carrying `data`)
/// after flipping the bits in `faults`.
fn diagnosis_matches(decoded: &Decoded, data: u64, encoded: u64, faults: &[usize]) -> bool {
    match faults {
        [] => decoded.kind == ErrorKind::None && decoded.data == data,
        [position] => {
            decoded.kind == (ErrorKind::Single { position: *position })
                && decoded.corrected == encoded
                && decoded.data == data
        }
        _ => decoded.kind == ErrorKind::Double,
    }
}

fn sweep(codec: &HammingCodec, text: &str) -> Result<()> {
    let data = parse_data(codec, text)?;
    let encoded = codec.encode(data)?;
    let total_bits = codec.total_bits();

    let mut corrected = 0;
    for position in 0..total_bits {
        let decoded = codec.detect_and_correct(codec.inject_error(encoded, position)?);
        if diagnosis_matches(&decoded, data, encoded, &[position]) {
            corrected += 1;
        } else {
            println!("single fault at {} misdiagnosed as {}", position, decoded.kind);
        }
    }

    let mut detected = 0;
    let mut pairs = 0;
    for first in 0..total_bits {
        for second in (first + 1)..total_bits {
            pairs += 1;
            let damaged = codec.inject_error(codec.inject_error(encoded, first)?, second)?;
            let decoded = codec.detect_and_correct(damaged);
            if diagnosis_matches(&decoded, data, encoded, &[first, second]) {
                detected += 1;
            } else {
                println!("double fault at {}, {} not detected", first, second);
            }
        }
    }

    println!("data {} -> codeword {}", to_hex(data), to_hex(encoded));
    println!("single faults corrected: {}/{}", corrected, total_bits);
    println!("double faults detected:  {}/{}", detected, pairs);

    if corrected != total_bits || detected != pairs {
        bail!("sweep found misdiagnosed faults");
    }
    Ok(())
}

fn fuzz(codec: &HammingCodec, trials: usize, seed: Option<u64>) -> Result<()> {
    let seed = seed.unwrap_or_else(|| rand::thread_rng().gen());
    println!("seed {}", seed);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    // Trials by number of injected faults: 0, 1, 2
    let mut tally = [0usize; 3];
    let mut failures = 0usize;

    for trial in 0..trials {
        let data = rng.gen::<u64>() & codec.data_mask();
        let encoded = codec.encode(data)?;
        let faults = rng.gen_range(0..=2);
        let positions = sample(&mut rng, codec.total_bits(), faults).into_vec();

        let damaged = positions.iter().try_fold(encoded, |word, &position| {
            codec
                .inject_error(word, position)
                .with_context(|| format!("trial {}", trial))
        })?;
        let decoded = codec.detect_and_correct(damaged);

        tally[faults] += 1;
        if !diagnosis_matches(&decoded, data, encoded, &positions) {
            failures += 1;
            println!(
                "trial {}: data {} faults {:?} diagnosed as {}",
                trial,
                to_hex(data),
                positions,
                decoded.kind
            );
        }
    }

    println!(
        "{} trials: {} clean, {} single, {} double, {} failures",
        trials, tally[0], tally[1], tally[2], failures
    );
    if failures > 0 {
        bail!("{} trials misdiagnosed", failures);
    }
    Ok(())
}
