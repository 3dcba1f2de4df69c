//! Keystore CLI commands
//!
//! Key generation for development setups, and the startup key loading shared
//! by every command that needs the keypair.

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::Subcommand;

use crate::config::{paths::LedgerPaths, settings::Settings, KeystoreType};
use crate::crypto::keys::{self, RsaKeyProvider, DEFAULT_GENERATED_KEY_BITS};
use crate::error::{LedgerError, LedgerResult};

/// Keystore subcommands
#[derive(Subcommand)]
pub enum KeystoreCommands {
    /// Generate a new RSA key as a PKCS#8 PEM file and use it
    Generate {
        /// Key size in bits
        #[arg(short, long, default_value_t = DEFAULT_GENERATED_KEY_BITS)]
        bits: usize,
        /// Output file (defaults to private_key.pem in the base directory)
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Overwrite an existing key file
        #[arg(long)]
        force: bool,
    },
    /// Load the configured keystore and report on it
    Check,
}

/// Handle a keystore command
pub fn handle_keystore_command(
    paths: &LedgerPaths,
    settings: &mut Settings,
    cmd: KeystoreCommands,
) -> LedgerResult<()> {
    match cmd {
        KeystoreCommands::Generate { bits, out, force } => {
            // Relative settings paths resolve against the base dir, not the cwd
            let path = match out {
                Some(path) if path.is_relative() => std::env::current_dir()?.join(path),
                Some(path) => path,
                None => paths.default_pem_key(),
            };
            if path.exists() && !force {
                return Err(LedgerError::Validation(format!(
                    "Key file already exists: {} (use --force to overwrite)",
                    path.display()
                )));
            }

            settings.keystore.validate()?;

            println!("Generating {}-bit RSA key...", bits);
            let private_key = keys::generate(bits, settings.keystore.min_key_size)?;
            keys::write_pem(&private_key, &path)?;

            settings.keystore.keystore_type = KeystoreType::Pem;
            settings.keystore.path = Some(path.clone());
            settings.save(paths)?;

            println!("Key written to {}", path.display());
            println!("Settings now use the PEM keystore.");
            println!();
            println!("Envelopes made with a previous key can no longer be decrypted.");
        }
        KeystoreCommands::Check => {
            let provider = load_key_provider(paths, settings)?;
            println!("Keystore OK");
            println!(
                "  Path: {}",
                settings.keystore.resolved_path(paths).display()
            );
            println!("  Type: {}", settings.keystore.keystore_type);
            println!("  Key size: {} bits", provider.key_size_bits());
            println!("  Minimum: {} bits", settings.keystore.min_key_size);
        }
    }

    Ok(())
}

/// Load the configured keypair
///
/// For PKCS12 with no stored or environment password, prompts on the
/// terminal when there is one.
pub fn load_key_provider(paths: &LedgerPaths, settings: &Settings) -> LedgerResult<RsaKeyProvider> {
    let mut keystore = settings.keystore.clone();

    if keystore.keystore_type == KeystoreType::Pkcs12
        && keystore.password().is_blank()
        && std::io::stdin().is_terminal()
    {
        let entered = rpassword::prompt_password("Keystore password: ")
            .map_err(|e| LedgerError::Keystore(format!("Failed to read password: {}", e)))?;
        keystore.password = Some(entered);
    }

    RsaKeyProvider::load(&keystore.resolved_path(paths), &keystore)
}
