//! Core data model for command-line interfaces inferred from help text.
//!
//! This crate defines the [`Command`] tree that the companion parser crate
//! produces and that wrapper generators (CWL, WDL, and friends) consume:
//!
//! - [`Command`] — one invocation level, with its flags, positionals, and
//!   owned subcommands.
//! - [`Flag`] / [`Positional`] — the two kinds of [`CliArgument`].
//! - [`FlagArg`] — the *shape* of a flag's values (none, one, repeated,
//!   progressively optional, or an enumerated choice).
//! - [`CliType`] — the *semantic* type of a value, inferred heuristically
//!   by [`infer_type`].
//!
//! Everything serializes with serde. The model stores no parent
//! back-pointers; the owned subcommand tree is the single source of
//! structure, so YAML/JSON round-trips always terminate.
//!
//! # Example
//!
//! ```
//! use cli_model_core::{CliArgument, CliType, Flag, FlagArg};
//!
//! let flag = Flag::new(
//!     vec!["-o".into(), "--output".into()],
//!     "output file to write",
//!     FlagArg::Simple { name: "FILE".into() },
//! );
//! assert_eq!(flag.full_name(), "--output");
//! assert_eq!(flag.get_type(), CliType::File { output: true });
//! ```

mod infer;
mod model;
mod types;

pub use infer::infer_type;
pub use model::{CliArgument, Command, Flag, FlagArg, FlagSynonym, Positional};
pub use types::{homogeneous, CliType, TypeError, TypeKind};
