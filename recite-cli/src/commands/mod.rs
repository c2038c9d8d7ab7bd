pub mod fingerprint;
pub mod run;
