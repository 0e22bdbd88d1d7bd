//! Command-line entry point.
//!
//! Argument parsing is deliberately minimal: each subcommand has a fixed
//! or small variable arity, and nothing here needs flags, so a derive-based
//! parser would add a dependency for no real benefit. See the crate docs
//! for the sharing model each subcommand drives.

use std::process::ExitCode;

use cosign::errors::*;

const USAGE: &str = "\
Usage:
  cosign genkey N basename          split a fresh key into N unanimous shares
  cosign threshold basename         deal a fresh 2-of-3 threshold key
  cosign threshold basename K0 K1   re-split a threshold key from shard files K0, K1
  cosign sign keyfile                sign stdin with a key shard, writing the partial to stdout
  cosign merge pubkey sig...         recombine partial signatures into one signature
  cosign help                        show this message
";

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    match run(&args[1..]) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("cosign: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<()> {
    let command = args.get(0).map(String::as_str).unwrap_or("help");

    match command {
        "help" | "-h" | "--help" => {
            print!("{}", USAGE);
            Ok(())
        }
        "genkey" => {
            let n: usize = args
                .get(1)
                .ok_or_else(|| err_msg("genkey requires a share count"))?
                .parse()
                .context("share count must be an integer")?;
            let basename = args.get(2).ok_or_else(|| err_msg("genkey requires a basename"))?;
            cosign::dealer::genkey(n, basename)
        }
        "threshold" => {
            let basename = args
                .get(1)
                .ok_or_else(|| err_msg("threshold requires a basename"))?;
            match (args.get(2), args.get(3)) {
                (None, None) => cosign::threshold::deal(basename),
                (Some(k0), Some(k1)) => cosign::threshold::resplit(basename, k0, k1),
                _ => bail!("threshold requires either no shard files or exactly two (K0 K1)"),
            }
        }
        "sign" => {
            let keyfile = args.get(1).ok_or_else(|| err_msg("sign requires a keyfile"))?;
            cosign::signer::run(keyfile)
        }
        "merge" => {
            let pubkey = args.get(1).ok_or_else(|| err_msg("merge requires a public key"))?;
            let sig_files = &args[2..];
            if sig_files.is_empty() {
                bail!("merge requires at least one partial signature");
            }
            cosign::merger::run(pubkey, sig_files)
        }
        other => {
            bail!("unknown command '{}'\n\n{}", other, USAGE);
        }
    }
}
