use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use envelope_ledger::cli::{
    handle_field_command, handle_keystore_command, handle_ledger_command, handle_transfer_command,
    LedgerContext,
};
use envelope_ledger::config::{paths::LedgerPaths, settings::Settings};
use envelope_ledger::error::LedgerError;
use envelope_ledger::services::TransferService;

#[derive(Parser)]
#[command(
    name = "envelope-ledger",
    author = "Kaylee Beyene",
    version,
    about = "Envelope encryption for transfer commands and an encrypted ledger",
    long_about = "envelope-ledger seals sensitive fields with AES-256-GCM under a fresh key, \
                  wraps that key with RSA-OAEP, and uses the resulting envelopes to carry \
                  transfer commands and to store ledger accounts at rest."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory and settings
    Init,

    /// Show current configuration and paths
    Config,

    /// Keystore management commands
    #[command(subcommand)]
    Keystore(envelope_ledger::cli::KeystoreCommands),

    /// Encrypt or decrypt a single field
    #[command(subcommand)]
    Field(envelope_ledger::cli::FieldCommands),

    /// Encrypted transfer commands
    #[command(subcommand)]
    Transfer(envelope_ledger::cli::TransferCommands),

    /// Ledger audit views
    #[command(subcommand)]
    Ledger(envelope_ledger::cli::LedgerCommands),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", public_message(&err));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    // Initialize paths and settings
    let paths = LedgerPaths::new()?;
    let mut settings = Settings::load_or_create(&paths)?;

    envelope_ledger::logging::init(&settings.logging);

    match cli.command {
        Some(Commands::Init) => {
            println!("Initializing envelope-ledger at: {}", paths.base_dir().display());
            paths.ensure_directories()?;
            settings.save(&paths)?;
            println!("Initialization complete!");
            println!();

            let keystore = settings.keystore.resolved_path(&paths);
            if keystore.exists() {
                println!("Using {} keystore at {}", settings.keystore.keystore_type, keystore.display());
            } else {
                println!("No keystore found at {}", keystore.display());
                println!("Place a PKCS12 keystore there, or run 'envelope-ledger keystore generate'.");
            }
        }
        Some(Commands::Config) => {
            println!("envelope-ledger Configuration");
            println!("=============================");
            println!("Base directory: {}", paths.base_dir().display());
            println!("Settings file:  {}", paths.settings_file().display());
            println!("Ledger file:    {}", paths.ledger_file().display());
            println!();
            println!("Keystore:");
            println!("  Path:         {}", settings.keystore.resolved_path(&paths).display());
            println!("  Type:         {}", settings.keystore.keystore_type);
            println!("  Alias:        {}", settings.keystore.alias);
            println!(
                "  Password:     {}",
                if settings.keystore.password().is_blank() { "(not set)" } else { "****" }
            );
            println!("  Min key size: {} bits", settings.keystore.min_key_size);
            println!();
            println!("Logging:");
            println!("  Level:        {}", settings.logging.level);
            println!("  JSON:         {}", settings.logging.json);
        }
        Some(Commands::Keystore(cmd)) => {
            handle_keystore_command(&paths, &mut settings, cmd)?;
        }
        Some(Commands::Field(cmd)) => {
            let context = LedgerContext::open(&paths, &settings)?;
            handle_field_command(&context.cipher, cmd)?;
        }
        Some(Commands::Transfer(cmd)) => {
            let context = LedgerContext::open(&paths, &settings)?;
            let service = TransferService::new(&context.cipher, &context.storage);
            handle_transfer_command(&service, cmd)?;
        }
        Some(Commands::Ledger(cmd)) => {
            let context = LedgerContext::open(&paths, &settings)?;
            handle_ledger_command(&context.storage, cmd)?;
        }
        None => {
            println!("envelope-ledger - envelope encryption for transfers and ledger data");
            println!();
            println!("Run 'envelope-ledger --help' for usage information.");
        }
    }

    Ok(())
}

/// Caller-facing text; crypto failures never say which step failed
fn public_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<LedgerError>() {
        Some(ledger_err) => ledger_err.public_message(),
        None => err.to_string(),
    }
}
