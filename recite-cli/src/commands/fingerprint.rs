//! `recite fingerprint` — print row fingerprints for spot-checking a
//! history column.

use anyhow::Result;
use clap::Args;

/// Arguments for `recite fingerprint`.
#[derive(Args, Debug)]
pub struct FingerprintArgs {
    /// Row texts to fingerprint.
    #[arg(required = true)]
    pub texts: Vec<String>,
}

impl FingerprintArgs {
    pub fn run(self) -> Result<()> {
        for text in &self.texts {
            println!("{}\t{text}", recite_sync::fingerprint(text));
        }
        Ok(())
    }
}
