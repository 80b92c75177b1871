//! sealstream CLI - seal and open chat-attachment streams on disk.
//!
//! This tool provides a command-line interface over the streaming
//! sign-then-seal construction in `sealstream-crypto`: generating one-time
//! test key material, sealing a file into the wire format, and opening one
//! back into plaintext.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand_core::OsRng;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use sealstream_common::Error;
use sealstream_crypto::{
    Opener, Sealer, SigningPublicKey, SigningSecretKey, StreamNonce, SymmetricKey,
};

/// Buffer size the CLI reads input files in. Unrelated to the protocol's
/// fixed `CHUNK_PLAINTEXT` — the streaming state machines handle packetizing
/// internally regardless of how the caller chunks its writes.
const READ_BUF_SIZE: usize = 64 * 1024;

#[derive(Parser)]
#[command(name = "sealstream")]
#[command(about = "Streaming sign-then-seal construction for chat attachments")]
#[command(version)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one-time key material for local testing.
    Keygen {
        /// Directory to write sym.key, signing.key, signing.pub, stream.nonce into.
        #[arg(short, long)]
        out_dir: PathBuf,
    },

    /// Seal a file.
    Seal {
        /// Plaintext input file.
        #[arg(long = "in")]
        input: PathBuf,

        /// Sealed output file.
        #[arg(long = "out")]
        output: PathBuf,

        /// Hex file containing the 32-byte symmetric key.
        #[arg(long)]
        sym_key: PathBuf,

        /// Hex file containing the 64-byte Ed25519 signing secret key.
        #[arg(long)]
        signing_key: PathBuf,

        /// Hex file containing the 16-byte stream nonce.
        #[arg(long)]
        stream_nonce: PathBuf,
    },

    /// Open a previously sealed file.
    Open {
        /// Sealed input file.
        #[arg(long = "in")]
        input: PathBuf,

        /// Plaintext output file.
        #[arg(long = "out")]
        output: PathBuf,

        /// Hex file containing the 32-byte symmetric key.
        #[arg(long)]
        sym_key: PathBuf,

        /// Hex file containing the 32-byte Ed25519 signing public key.
        #[arg(long)]
        signing_pub: PathBuf,

        /// Hex file containing the 16-byte stream nonce.
        #[arg(long)]
        stream_nonce: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Keygen { out_dir } => cmd_keygen(&out_dir),
        Commands::Seal {
            input,
            output,
            sym_key,
            signing_key,
            stream_nonce,
        } => cmd_seal(&input, &output, &sym_key, &signing_key, &stream_nonce),
        Commands::Open {
            input,
            output,
            sym_key,
            signing_pub,
            stream_nonce,
        } => cmd_open(&input, &output, &sym_key, &signing_pub, &stream_nonce),
    }
}

fn cmd_keygen(out_dir: &Path) -> Result<()> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let sym_key = SymmetricKey::generate(&mut OsRng);
    let (sign_sk, sign_pk) = SigningSecretKey::generate(&mut OsRng);
    let mut stream_nonce_bytes = [0u8; 16];
    rand_core::RngCore::fill_bytes(&mut OsRng, &mut stream_nonce_bytes);

    write_hex_file(&out_dir.join("sym.key"), sym_key.as_bytes())?;
    write_hex_file(&out_dir.join("signing.key"), sign_sk.as_bytes())?;
    write_hex_file(&out_dir.join("signing.pub"), sign_pk.as_bytes())?;
    write_hex_file(&out_dir.join("stream.nonce"), &stream_nonce_bytes)?;

    info!(dir = %out_dir.display(), "wrote one-time key material");
    Ok(())
}

fn cmd_seal(
    input: &Path,
    output: &Path,
    sym_key_path: &Path,
    signing_key_path: &Path,
    stream_nonce_path: &Path,
) -> Result<()> {
    let sym_key = SymmetricKey::from_bytes(read_hex_array(sym_key_path)?);
    let sign_sk = SigningSecretKey::from_bytes(read_hex_array(signing_key_path)?);
    let stream_nonce = StreamNonce::from_bytes(read_hex_array(stream_nonce_path)?);

    let result = (|| -> Result<()> {
        let mut input_file =
            File::open(input).with_context(|| format!("opening {}", input.display()))?;
        let mut output_file =
            File::create(output).with_context(|| format!("creating {}", output.display()))?;

        let mut sealer = Sealer::new(sym_key, sign_sk, stream_nonce);
        let mut buf = vec![0u8; READ_BUF_SIZE];
        loop {
            let n = input_file.read(&mut buf)?;
            if n == 0 {
                break;
            }
            output_file.write_all(&sealer.write(&buf[..n]))?;
        }
        output_file.write_all(&sealer.finish())?;
        Ok(())
    })();

    if result.is_err() {
        let _ = fs::remove_file(output);
    }
    result?;

    info!(out = %output.display(), "sealed stream written");
    Ok(())
}

fn cmd_open(
    input: &Path,
    output: &Path,
    sym_key_path: &Path,
    signing_pub_path: &Path,
    stream_nonce_path: &Path,
) -> Result<()> {
    let sym_key = SymmetricKey::from_bytes(read_hex_array(sym_key_path)?);
    let sign_pk = SigningPublicKey::from_bytes(read_hex_array(signing_pub_path)?);
    let stream_nonce = StreamNonce::from_bytes(read_hex_array(stream_nonce_path)?);

    let result = (|| -> Result<()> {
        let mut input_file =
            File::open(input).with_context(|| format!("opening {}", input.display()))?;
        let mut output_file =
            File::create(output).with_context(|| format!("creating {}", output.display()))?;

        let mut opener = Opener::new(sym_key, sign_pk, stream_nonce);
        let mut buf = vec![0u8; READ_BUF_SIZE];
        loop {
            let n = input_file.read(&mut buf)?;
            if n == 0 {
                break;
            }
            let plaintext = opener
                .write(&buf[..n])
                .map_err(|e| anyhow::anyhow!("{e}"))?;
            output_file.write_all(&plaintext)?;
        }
        let plaintext = opener.finish().map_err(|e| anyhow::anyhow!("{e}"))?;
        output_file.write_all(&plaintext)?;
        Ok(())
    })();

    // The stream is not authentic until `finish` succeeds: any error means
    // whatever plaintext was written so far must not be trusted, so it is
    // not left on disk.
    if result.is_err() {
        let _ = fs::remove_file(output);
    }
    result?;

    info!(out = %output.display(), "opened stream written");
    Ok(())
}

fn write_hex_file(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, hex::encode(bytes)).with_context(|| format!("writing {}", path.display()))
}

/// Reads and decodes a key/nonce hex file, surfacing any failure — missing
/// file, bad hex, wrong length — as `sealstream_common::Error::InvalidKeyMaterial`.
/// `?` converts it into `anyhow::Error` at the call site like any other error
/// in `main`'s chain.
fn read_hex_array<const N: usize>(path: &Path) -> std::result::Result<[u8; N], Error> {
    let contents = fs::read_to_string(path)
        .map_err(|e| Error::InvalidKeyMaterial(format!("reading {}: {e}", path.display())))?;
    let bytes = hex::decode(contents.trim())
        .map_err(|e| Error::InvalidKeyMaterial(format!("decoding hex in {}: {e}", path.display())))?;
    if bytes.len() != N {
        return Err(Error::InvalidKeyMaterial(format!(
            "{}: expected {} bytes, found {}",
            path.display(),
            N,
            bytes.len()
        )));
    }
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes);
    Ok(out)
}
