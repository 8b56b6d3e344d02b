use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use vault::{Argon2Profile, Record, SecretBuffer, VaultFile};

#[derive(Parser)]
#[command(name = "vault", version, about = "Encrypted credential vault")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Create a new, empty vault file
    Init {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        password: String,
        /// Use the slower "moderate" Argon2id profile instead of "interactive"
        #[arg(long)]
        moderate: bool,
    },

    /// Unlock the vault and list every record in it
    Unlock {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        password: String,
    },

    /// Add a new record
    Add {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        password: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        secret: String,
    },

    /// Replace the record at an index
    Update {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        password: String,
        #[arg(long)]
        index: usize,
        #[arg(long)]
        name: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        secret: String,
    },

    /// Remove the record at an index
    Remove {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        password: String,
        #[arg(long)]
        index: usize,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.cmd {
        Cmd::Init {
            path,
            password,
            moderate,
        } => {
            let profile = if moderate {
                Argon2Profile::Moderate
            } else {
                Argon2Profile::Interactive
            };
            VaultFile::create_new_with_profile(&path, &password, profile)
                .with_context(|| format!("creating vault at {}", path.display()))?;
            println!("created vault: {}", path.display());
        }

        Cmd::Unlock { path, password } => {
            let session = VaultFile::load(&path, &password)
                .with_context(|| format!("unlocking vault at {}", path.display()))?;
            for (index, record) in session.entries().iter().enumerate() {
                println!(
                    "{index}: {} ({})",
                    String::from_utf8_lossy(record.name.as_bytes()),
                    String::from_utf8_lossy(record.username.as_bytes()),
                );
            }
        }

        Cmd::Add {
            path,
            password,
            name,
            username,
            secret,
        } => {
            let mut session = VaultFile::load(&path, &password)
                .with_context(|| format!("unlocking vault at {}", path.display()))?;
            session
                .add(Record::new(
                    SecretBuffer::from_str(&name),
                    SecretBuffer::from_str(&username),
                    SecretBuffer::from_str(&secret),
                ))
                .context("adding record")?;
            session.save().context("saving vault")?;
            println!("added {name}");
        }

        Cmd::Update {
            path,
            password,
            index,
            name,
            username,
            secret,
        } => {
            let mut session = VaultFile::load(&path, &password)
                .with_context(|| format!("unlocking vault at {}", path.display()))?;
            session
                .update(
                    index,
                    Record::new(
                        SecretBuffer::from_str(&name),
                        SecretBuffer::from_str(&username),
                        SecretBuffer::from_str(&secret),
                    ),
                )
                .with_context(|| format!("updating record {index}"))?;
            session.save().context("saving vault")?;
            println!("updated {index}");
        }

        Cmd::Remove {
            path,
            password,
            index,
        } => {
            let mut session = VaultFile::load(&path, &password)
                .with_context(|| format!("unlocking vault at {}", path.display()))?;
            session
                .remove(index)
                .with_context(|| format!("removing record {index}"))?;
            session.save().context("saving vault")?;
            println!("removed {index}");
        }
    }

    Ok(())
}
