//! # Remote Subcommands
//!
//! - `canary push`: submit a proof to a server.
//! - `canary pull`: fetch the server's latest proof, optionally verifying it.
//! - `canary status`: print the server's status report.
//! - `canary key`: fetch the server's public key and save it.
//!
//! Addresses without a scheme get `https://`; `--proxy` routes through a
//! SOCKS5 proxy such as Tor (`127.0.0.1:9050`).

use std::path::{Path, PathBuf};

use clap::Args;

use canary_core::Timestamp;
use canary_crypto::Ed25519Verifier;

use crate::exit::{ExitContext, ExitStatus, Failure};
use crate::keys::load_verifier;
use crate::local::{print_canary, read_proof};
use crate::workflow;

/// Server location shared by every remote command.
#[derive(Args, Debug, Clone)]
pub struct RemoteArgs {
    /// Server address, e.g. `canary.example.org` or `http://localhost:8080/canary`.
    #[arg(long)]
    pub address: String,
    /// SOCKS5 proxy, e.g. `127.0.0.1:9050`.
    #[arg(long)]
    pub proxy: Option<String>,
}

/// Arguments for `canary push`.
#[derive(Args, Debug)]
pub struct PushArgs {
    #[command(flatten)]
    pub remote: RemoteArgs,
    /// Proof to submit.
    #[arg(long)]
    pub proof: PathBuf,
}

/// Arguments for `canary pull`.
#[derive(Args, Debug)]
pub struct PullArgs {
    #[command(flatten)]
    pub remote: RemoteArgs,
    /// Where to write the fetched proof.
    #[arg(long)]
    pub proof: PathBuf,
    /// Verify the fetched proof with this public key before saving it.
    #[arg(long)]
    pub public_key: Option<PathBuf>,
}

/// Arguments for `canary status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub remote: RemoteArgs,
}

/// Arguments for `canary key`.
#[derive(Args, Debug)]
pub struct KeyArgs {
    #[command(flatten)]
    pub remote: RemoteArgs,
    /// Where to write the public key.
    #[arg(long, short)]
    pub output: PathBuf,
}

pub async fn run_push(args: &PushArgs) -> Result<(), Failure> {
    let proof = read_proof(&args.proof)?;
    let client = workflow::connect(&args.remote.address, args.remote.proxy.as_deref())?;
    workflow::push(&client, &proof).await?;
    println!("OK: proof accepted by {}", client.base_url());
    Ok(())
}

pub async fn run_pull(args: &PullArgs) -> Result<(), Failure> {
    cmd_pull(
        &args.remote,
        &args.proof,
        args.public_key.as_deref(),
        Timestamp::now(),
    )
    .await
}

async fn cmd_pull(
    remote: &RemoteArgs,
    output: &Path,
    public_key: Option<&Path>,
    now: Timestamp,
) -> Result<(), Failure> {
    let verifier = public_key.map(load_verifier).transpose()?;
    let client = workflow::connect(&remote.address, remote.proxy.as_deref())?;

    let Some(proof) = workflow::pull(&client).await? else {
        println!("No canary available");
        return Ok(());
    };

    if let Some(verifier) = &verifier {
        let (canary, description) = workflow::verify(&proof, verifier, now)
            .map_err(|e| Failure::new(ExitStatus::InvalidRemoteCanary, e))?;
        println!("OK: remote proof is valid");
        print_canary(&canary, &description);
    }

    std::fs::write(output, &proof).or_exit(ExitStatus::FileWrite, || {
        format!("failed to write proof: {}", output.display())
    })?;
    println!("Saved to: {}", output.display());
    Ok(())
}

pub async fn run_status(args: &StatusArgs) -> Result<(), Failure> {
    let client = workflow::connect(&args.remote.address, args.remote.proxy.as_deref())?;
    let status = workflow::status(&client).await?;

    println!("Version:   {}", status.version);
    println!("Key:       {}", status.key);
    println!("Enabled:   {}", status.enabled);
    if let Some(deadline) = status.deadline {
        println!("Deadline:  {deadline}");
    }
    if let Some(is_final) = status.is_final {
        println!("Final:     {is_final}");
    }
    println!("Triggered: {}", status.triggered);
    Ok(())
}

pub async fn run_key(args: &KeyArgs) -> Result<(), Failure> {
    let client = workflow::connect(&args.remote.address, args.remote.proxy.as_deref())?;
    let text = workflow::key(&client).await?;
    let verifier = Ed25519Verifier::from_hex(&text)
        .or_exit(ExitStatus::InvalidKey, || "server returned an invalid public key")?;

    let hex = verifier.public_key().to_hex();
    std::fs::write(&args.output, &hex).or_exit(ExitStatus::FileWrite, || {
        format!("failed to write public key: {}", args.output.display())
    })?;
    println!("OK: saved server key to {}", args.output.display());
    println!("  Public key (hex): {hex}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use canary_crypto::{Ed25519KeyPair, Ed25519Signer};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::manifest::Manifest;

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    fn remote(server: &MockServer) -> RemoteArgs {
        RemoteArgs {
            address: server.uri(),
            proxy: None,
        }
    }

    fn sealed(now: Timestamp) -> (String, Ed25519Signer) {
        let signer = Ed25519Signer::new(Ed25519KeyPair::from_seed(&[7u8; 32]));
        let manifest = Manifest {
            author: "canary.example.org".into(),
            delta: 3600,
            promises: vec![],
            description: String::new(),
            news: vec![],
            is_final: false,
        };
        let proof = workflow::create(&manifest, &signer, None, now).unwrap();
        (proof, signer)
    }

    #[tokio::test]
    async fn pull_verifies_and_saves() {
        let now = ts("2026-01-15T12:00:00Z");
        let (proof, signer) = sealed(now);
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest"))
            .respond_with(ResponseTemplate::new(200).set_body_string(proof.clone()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let key = dir.path().join("canary.pub");
        std::fs::write(&key, signer.public_key().to_hex()).unwrap();
        let out = dir.path().join("latest.sig");

        cmd_pull(&remote(&server), &out, Some(&key), now).await.unwrap();
        assert_eq!(std::fs::read_to_string(&out).unwrap(), proof);
    }

    #[tokio::test]
    async fn pull_rejects_expired_remote_proof_without_saving() {
        let (proof, signer) = sealed(ts("2026-01-15T12:00:00Z"));
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest"))
            .respond_with(ResponseTemplate::new(200).set_body_string(proof))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let key = dir.path().join("canary.pub");
        std::fs::write(&key, signer.public_key().to_hex()).unwrap();
        let out = dir.path().join("latest.sig");

        let failure = cmd_pull(&remote(&server), &out, Some(&key), ts("2026-02-01T00:00:00Z"))
            .await
            .unwrap_err();
        assert_eq!(failure.status, ExitStatus::InvalidRemoteCanary);
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn pull_with_no_canary_writes_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("latest.sig");
        cmd_pull(&remote(&server), &out, None, ts("2026-01-15T12:00:00Z"))
            .await
            .unwrap();
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn key_is_validated_and_saved() {
        let (_, signer) = sealed(ts("2026-01-15T12:00:00Z"));
        let hex = signer.public_key().to_hex();
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/key"))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!("{hex}\n")))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("server.pub");
        run_key(&KeyArgs {
            remote: remote(&server),
            output: output.clone(),
        })
        .await
        .unwrap();

        assert_eq!(std::fs::read_to_string(&output).unwrap(), hex);
        assert!(load_verifier(&output).is_ok());
    }

    #[tokio::test]
    async fn garbage_key_is_invalid_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/key"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not a key"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("server.pub");
        let failure = run_key(&KeyArgs {
            remote: remote(&server),
            output: output.clone(),
        })
        .await
        .unwrap_err();
        assert_eq!(failure.status, ExitStatus::InvalidKey);
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn rejected_push_is_unexpected_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/submit"))
            .respond_with(ResponseTemplate::new(409).set_body_string("stale"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let proof = dir.path().join("p.sig");
        std::fs::write(&proof, "proof text").unwrap();

        let failure = run_push(&PushArgs {
            remote: remote(&server),
            proof,
        })
        .await
        .unwrap_err();
        assert_eq!(failure.status, ExitStatus::UnexpectedStatus);
        assert!(failure.to_string().contains("stale"), "{failure}");
    }
}
