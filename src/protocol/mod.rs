//! ONTAP 7-mode command protocol
//!
//! Building command lines, judging their text output, and extracting
//! identifiers from it:
//! - command: exact command-line templates
//! - verify: success predicates over (stdout, stderr)
//! - parse: grammars for show-style output
//! - naming: LUN path conventions

pub mod command;
pub mod naming;
pub mod parse;
pub mod verify;

pub use command::ArrayCommand;
pub use naming::{LunPath, LunPathResolver};
pub use parse::{parse_lun_id, parse_node_name, LunId, ParseError};
pub use verify::{ensure_succeeded, SuccessPredicate};
