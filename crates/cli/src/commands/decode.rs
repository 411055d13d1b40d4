/// Module for the `decode` subcommand, which prints EVM bytecode as an instruction listing.
///
/// Each line shows the program counter, the mnemonic and the push operand if any. Unknown
/// bytes print as `UNKNOWN_0x??`; a truncated trailing push is flagged on stderr.
use async_trait::async_trait;
use clap::Args;
use std::error::Error;

/// Arguments for the `decode` subcommand.
#[derive(Args)]
pub struct DecodeArgs {
    /// Input bytecode as a hex string (0x...) or file path prefixed with @
    input: String,

    /// Read an @file as binary bytecode instead of hex text
    #[arg(long)]
    raw: bool,

    /// Print byte length and keccak-256 before the listing
    #[arg(long)]
    info: bool,
}

#[async_trait]
impl super::Command for DecodeArgs {
    async fn execute(self) -> Result<(), Box<dyn Error>> {
        let (instructions, info, _) = super::read_input(&self.input, self.raw)?;

        if self.info {
            println!("; {} bytes", info.byte_length);
            println!("; keccak256 0x{}", hex::encode(info.keccak_hash));
        }
        for instr in &instructions {
            println!("{instr}");
        }
        if let Some(last) = instructions.last().filter(|i| i.is_truncated()) {
            tracing::warn!(
                "{} at pc {} is truncated by the end of the bytecode",
                last.mnemonic(),
                last.pc
            );
        }
        Ok(())
    }
}

