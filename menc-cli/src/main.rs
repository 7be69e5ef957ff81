use std::fs;
use std::io::Read;
use std::path::Path;
use std::process::exit;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use menc_codec::{decrypt, encrypt, load_model};
use rand::rngs::OsRng;

use crate::opts::{Command, Opts};

mod opts;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let opts = Opts::parse();
    let Some(command) = opts.command else {
        let _ = Opts::command().print_long_help();
        exit(1);
    };

    if let Err(error) = run(command) {
        eprintln!("menc: {error:#}");
        exit(1);
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Encrypt { config, key, file } => encrypt_command(&config, key, file.as_deref()),
        Command::Decrypt { config, key, file } => decrypt_command(&config, key, file.as_deref()),
        Command::Train { config, data } => train_command(&config, data.as_deref()),
        Command::Sample { config, size } => sample_command(&config, size),
    }
}

fn encrypt_command(config: &Path, key: Option<String>, file: Option<&Path>) -> Result<()> {
    let key = match key {
        Some(key) => key,
        None => {
            let first = rpassword::prompt_password("Encryption Key: ")?;
            let second = rpassword::prompt_password("Confirm Encryption Key: ")?;
            if first != second {
                eprintln!("Keys didn't match. Exiting.");
                exit(2);
            }
            first
        }
    };

    let model = load_model(config)
        .with_context(|| format!("loading model from {}", config.display()))?;

    // Input tends to end in a newline, and a trailing newline would be a
    // tell in the decoy output of a wrong-key decryption.
    let plaintext = read_input(file)?;
    let plaintext = model.transform(plaintext.trim_end())?;

    let ciphertext = encrypt(&model, &key, &plaintext, &mut OsRng)?;
    print!("{}", base64::encode(&ciphertext));
    Ok(())
}

fn decrypt_command(config: &Path, key: Option<String>, file: Option<&Path>) -> Result<()> {
    let key = match key {
        Some(key) => key,
        None => rpassword::prompt_password("Decryption Key: ")?,
    };

    let model = load_model(config)
        .with_context(|| format!("loading model from {}", config.display()))?;

    let encoded = read_input(file)?;
    let ciphertext = base64::decode(encoded.trim()).context("ciphertext is not valid base64")?;

    let plaintext = decrypt(&model, &key, &ciphertext)?;
    print!("{plaintext}");
    Ok(())
}

fn train_command(config: &Path, data: Option<&Path>) -> Result<()> {
    let mut model = load_model(config)
        .with_context(|| format!("loading model from {}", config.display()))?;

    let data = read_input(data)?;
    model.train(&data)?;
    model.save()?;

    println!("Sampling model:");
    println!("{}", model.sample(50, None, &mut OsRng)?);
    Ok(())
}

fn sample_command(config: &Path, size: usize) -> Result<()> {
    let model = load_model(config)
        .with_context(|| format!("loading model from {}", config.display()))?;

    println!("{}", model.sample(size, None, &mut OsRng)?);
    Ok(())
}

/// Reads the given file, or stdin when the path is missing or `-`.
fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path.as_os_str() != "-" => {
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
        }
        _ => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("reading stdin")?;
            Ok(buffer)
        }
    }
}
