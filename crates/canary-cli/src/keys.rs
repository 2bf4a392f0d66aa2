//! # Key Subcommand and Key Files
//!
//! `canary keygen` writes an Ed25519 keypair as hex text:
//! `<prefix>.key` (32-byte seed, mode 0600 on unix) and `<prefix>.pub`.
//! The other commands load those files through [`load_signer`] and
//! [`load_verifier`].

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Args;
use zeroize::Zeroizing;

use canary_crypto::{Ed25519KeyPair, Ed25519Signer, Ed25519Verifier};

use crate::exit::{ExitContext, ExitStatus, Failure};

/// Arguments for `canary keygen`.
#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Output directory for the keypair files.
    #[arg(long, short, default_value = ".")]
    pub output: PathBuf,
    /// Prefix for the key filenames.
    #[arg(long, default_value = "canary")]
    pub prefix: String,
}

pub fn run_keygen(args: &KeygenArgs) -> Result<(), Failure> {
    cmd_keygen(&args.output, &args.prefix)
}

/// Generate a new Ed25519 keypair and write it to files.
fn cmd_keygen(output_dir: &Path, prefix: &str) -> Result<(), Failure> {
    std::fs::create_dir_all(output_dir).or_exit(ExitStatus::FileWrite, || {
        format!(
            "failed to create output directory: {}",
            output_dir.display()
        )
    })?;

    let key = Ed25519KeyPair::generate();
    let pub_hex = key.public_key().to_hex();

    let key_path = output_dir.join(format!("{prefix}.key"));
    let pub_path = output_dir.join(format!("{prefix}.pub"));

    write_private(&key_path, key.secret_hex().as_bytes()).or_exit(ExitStatus::FileWrite, || {
        format!("failed to write private key: {}", key_path.display())
    })?;
    std::fs::write(&pub_path, &pub_hex).or_exit(ExitStatus::FileWrite, || {
        format!("failed to write public key: {}", pub_path.display())
    })?;

    println!("OK: generated Ed25519 keypair");
    println!("  Private key: {}", key_path.display());
    println!("  Public key:  {}", pub_path.display());
    println!("  Public key (hex): {pub_hex}");
    Ok(())
}

fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)?.write_all(contents)
}

/// Load a hex private key file.
pub fn load_signer(path: &Path) -> Result<Ed25519Signer, Failure> {
    let text = Zeroizing::new(std::fs::read_to_string(path).or_exit(ExitStatus::FileRead, || {
        format!("failed to read private key: {}", path.display())
    })?);
    let key = Ed25519KeyPair::from_hex(&text).or_exit(ExitStatus::InvalidKey, || {
        format!("invalid private key: {}", path.display())
    })?;
    Ok(Ed25519Signer::new(key))
}

/// Load a hex public key file.
pub fn load_verifier(path: &Path) -> Result<Ed25519Verifier, Failure> {
    let text = std::fs::read_to_string(path).or_exit(ExitStatus::FileRead, || {
        format!("failed to read public key: {}", path.display())
    })?;
    Ed25519Verifier::from_hex(&text).or_exit(ExitStatus::InvalidKey, || {
        format!("invalid public key: {}", path.display())
    })
}
