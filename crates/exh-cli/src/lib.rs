//! # exh-cli: Exhortos Exchange Command-Line Tools
//!
//! Offline helpers for a sending court system:
//!
//! - `digest`: compute the SHA-1/SHA-256 of local files and print the
//!   `archivos` manifest entries to declare with a package
//! - `validate`: run a payload through the same validation pipeline the
//!   service applies and, given a catalog, resolve its references
//!
//! Argument parsing lives in `main.rs`. Handlers return the process exit
//! code and delegate the rules to `exh-exchange`.

pub mod digest;
pub mod validate;
