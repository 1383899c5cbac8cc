// Licensed under the Apache-2.0 license

use anyhow::{bail, Context, Result};
use boot_flash::RamFlash;
use boot_image::{ImageHeader, ImageVersion, TlvTag};
use boot_imager::{
    generate_signing_key, load_public_key, load_signing_key, public_key_bytes, public_key_hash,
    save_public_key, save_signing_key, ImageBuilder,
};
use boot_verify::{BootKey, ImageValidator, TlvReader};
use clap::{Parser, Subcommand};
use clap_num::maybe_hex;
use std::path::PathBuf;
use zerocopy::FromBytes;

#[derive(Parser)]
#[command(about = "Build, inspect and verify signed boot images")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a P-384 signing key pair
    Keygen {
        /// Output file for the private key
        #[arg(long, value_name = "FILE")]
        private: PathBuf,

        /// Output file for the SEC1 public key
        #[arg(long, value_name = "FILE")]
        public: PathBuf,
    },
    /// Build a signed image from a raw body
    Create {
        /// Raw image body (the code to be booted)
        #[arg(long, value_name = "FILE")]
        body: PathBuf,

        /// Private key(s) to sign with
        #[arg(long = "key", value_name = "FILE", num_args = 1.., required = true)]
        keys: Vec<PathBuf>,

        /// Image version as <major>.<minor>.<revision>
        #[arg(long, default_value = "0.0.0")]
        version: String,

        /// Load address for an image executed from RAM
        #[arg(long, value_parser = maybe_hex::<u32>)]
        load_addr: Option<u32>,

        /// File whose content seeds the digest (dependent images)
        #[arg(long, value_name = "FILE")]
        seed: Option<PathBuf>,

        /// Output image file
        #[arg(long, value_name = "FILE")]
        output: PathBuf,
    },
    /// Parse and display an image's header and trailer
    Show {
        /// Path to the image file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Run the boot-time validation against an image file
    Verify {
        /// Path to the image file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Trusted public key(s)
        #[arg(long = "key", value_name = "FILE", num_args = 1.., required = true)]
        keys: Vec<PathBuf>,

        /// File whose content seeds the digest (dependent images)
        #[arg(long, value_name = "FILE")]
        seed: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .env()
        .init()?;

    let cli = Cli::parse();
    match cli.command {
        Commands::Keygen { private, public } => keygen(&private, &public),
        Commands::Create {
            body,
            keys,
            version,
            load_addr,
            seed,
            output,
        } => create(&body, &keys, &version, load_addr, seed.as_deref(), &output),
        Commands::Show { file } => show(&file),
        Commands::Verify { file, keys, seed } => verify(&file, &keys, seed.as_deref()),
    }
}

fn keygen(private: &std::path::Path, public: &std::path::Path) -> Result<()> {
    let key = generate_signing_key();
    save_signing_key(private, &key)?;
    save_public_key(public, key.verifying_key())?;
    log::info!("Private key: {}", private.display());
    log::info!("Public key:  {}", public.display());
    log::info!(
        "Key hash:    {}",
        hex::encode(public_key_hash(key.verifying_key()))
    );
    Ok(())
}

fn parse_version(version: &str) -> Result<ImageVersion> {
    let parts: Vec<&str> = version.split('.').collect();
    let [major, minor, revision] = parts.as_slice() else {
        bail!("version must be <major>.<minor>.<revision>, got {version}");
    };
    Ok(ImageVersion::new(
        major.parse().context("bad major version")?,
        minor.parse().context("bad minor version")?,
        revision.parse().context("bad revision")?,
    ))
}

fn create(
    body: &std::path::Path,
    keys: &[PathBuf],
    version: &str,
    load_addr: Option<u32>,
    seed: Option<&std::path::Path>,
    output: &std::path::Path,
) -> Result<()> {
    let body = std::fs::read(body).with_context(|| format!("reading {}", body.display()))?;

    let mut builder = ImageBuilder::new(body).version(parse_version(version)?);
    if let Some(addr) = load_addr {
        builder = builder.load_addr(addr);
    }
    if let Some(seed) = seed {
        let seed = std::fs::read(seed).with_context(|| format!("reading {}", seed.display()))?;
        builder = builder.seed(seed);
    }
    for path in keys {
        let key = load_signing_key(path)?;
        log::info!(
            "Signing with {} (key hash {})",
            path.display(),
            hex::encode(public_key_hash(key.verifying_key()))
        );
        builder = builder.sign_with(&key);
    }

    let image = builder.build()?;
    std::fs::write(output, &image).with_context(|| format!("writing {}", output.display()))?;
    log::info!("Image written to {} ({} bytes)", output.display(), image.len());
    Ok(())
}

fn show(file: &std::path::Path) -> Result<()> {
    let data = std::fs::read(file).with_context(|| format!("reading {}", file.display()))?;
    let (header, _) = ImageHeader::read_from_prefix(data.as_slice())
        .map_err(|_| anyhow::anyhow!("file too short for an image header"))?;

    println!("=== Image Header ===");
    println!("  Magic:        0x{:08X}", header.magic);
    println!("  Header size:  {} bytes", header.hdr_size);
    println!("  Body size:    {} bytes", header.img_size);
    println!("  Flags:        0x{:08X}", header.flags);
    println!("  Version:      {}", header.version);
    if header.is_ram_load() {
        println!("  Load address: 0x{:08X}", header.load_addr);
    }
    println!();

    let trailer_start = header
        .hashed_len()
        .context("header sizes overflow the address space")?;
    let flash = RamFlash::new(&data);
    let reader = TlvReader::open(&flash, trailer_start)
        .map_err(|err| anyhow::anyhow!("trailer rejected: {err:?}"))?;

    println!("=== Trailer Records ===");
    let mut buf = [0u8; 256];
    for record in reader {
        let record = record.map_err(|err| anyhow::anyhow!("trailer walk failed: {err:?}"))?;
        let name = match record.tag {
            TlvTag::SHA256 => "SHA256",
            TlvTag::KEYHASH => "KEYHASH",
            TlvTag::ECDSA_P384 => "ECDSA_P384",
            _ => "UNKNOWN",
        };
        print!(
            "  [0x{:04X}] {:<10} {:3} bytes",
            record.tag.0, name, record.len
        );
        if (record.len as usize) <= buf.len() {
            let payload = record
                .read_payload(&flash, &mut buf)
                .map_err(|err| anyhow::anyhow!("payload read failed: {err:?}"))?;
            print!("  {}", hex::encode(payload));
        }
        println!();
    }
    Ok(())
}

fn verify(file: &std::path::Path, keys: &[PathBuf], seed: Option<&std::path::Path>) -> Result<()> {
    let data = std::fs::read(file).with_context(|| format!("reading {}", file.display()))?;
    let (header, _) = ImageHeader::read_from_prefix(data.as_slice())
        .map_err(|_| anyhow::anyhow!("file too short for an image header"))?;

    let seed = match seed {
        Some(path) => {
            Some(std::fs::read(path).with_context(|| format!("reading {}", path.display()))?)
        }
        None => None,
    };

    let key_bytes: Vec<Vec<u8>> = keys
        .iter()
        .map(|path| load_public_key(path).map(|key| public_key_bytes(&key)))
        .collect::<Result<_>>()?;
    let table: Vec<BootKey> = key_bytes.iter().map(|key| BootKey { key }).collect();

    let validator = ImageValidator::new(&table);
    match validator.validate_ram_image(&header, &data, seed.as_deref()) {
        Ok(digest) => {
            log::info!("Image accepted, digest {}", hex::encode(digest));
            Ok(())
        }
        Err(err) => bail!("image rejected: {err:?}"),
    }
}
