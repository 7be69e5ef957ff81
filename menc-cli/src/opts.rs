use clap::{Parser, Subcommand};
use std::path::PathBuf;

const ABOUT: &str = "A command-line model-based encryption tool";
const LONG_ABOUT: &str = "\
menc encodes plaintext through a character-level language model into a stream of \
32-bit weights, encrypts the stream with AES-256 in CFB mode, and reverses both \
steps on decryption. Decrypting with a wrong key produces plausible model-generated \
text instead of an error.

Example Usage:

  - Encrypt from stdin:
    $ echo 'Hello World!' | menc encrypt -c models/words/config.json

  - Encrypt a file, key provided as arg:
    $ menc encrypt -c models/words/config.json -k foo -f filename

  - Round-trip (encrypt and then decrypt):
    $ echo 'HELLO' | menc encrypt -c config.json -k foo | menc decrypt -c config.json -k foo

  - Train a model from a data file:
    $ menc train -c models/words/config.json -d models/words/data.txt

  - Generate a random sequence of length 100:
    $ menc sample -c models/words/config.json -s 100";

#[derive(Parser, Debug)]
#[command(name = "menc", version, about = ABOUT, long_about = LONG_ABOUT)]
pub struct Opts {
    /// Which operation to perform.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Encrypt a plaintext.
    Encrypt {
        /// Path to the model config.
        #[clap(short, long, value_name = "CONFIG_PATH")]
        config: PathBuf,

        /// The string to use as the encryption key. If omitted, a password
        /// prompt will securely ask for one. Note: providing a key on the
        /// command-line may store the key in your shell history.
        #[clap(short, long)]
        key: Option<String>,

        /// File to encrypt. Reads stdin if not provided.
        #[clap(short, long)]
        file: Option<PathBuf>,
    },

    /// Decrypt a ciphertext.
    Decrypt {
        /// Path to the model config.
        #[clap(short, long, value_name = "CONFIG_PATH")]
        config: PathBuf,

        /// The string to use as the decryption key. If omitted, a password
        /// prompt will securely ask for one.
        #[clap(short, long)]
        key: Option<String>,

        /// File to decrypt. Reads stdin if not provided.
        #[clap(short, long)]
        file: Option<PathBuf>,
    },

    /// Train a model on a given set of data.
    Train {
        /// Path to the model config.
        #[clap(short, long, value_name = "CONFIG_PATH")]
        config: PathBuf,

        /// Path to data to train on. Reads stdin if not provided.
        #[clap(short, long)]
        data: Option<PathBuf>,
    },

    /// Sample the model by generating a random sequence from it.
    Sample {
        /// Path to the model config.
        #[clap(short, long, value_name = "CONFIG_PATH")]
        config: PathBuf,

        /// Length of the sequence to generate.
        #[clap(short, long)]
        size: usize,
    },
}
