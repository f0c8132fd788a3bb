pub mod console;
pub mod recorder;

/// Heavy rule above each detail block in the end-of-run listing.
pub const SEPARATOR_HEAVY: &str =
    "======================================================================";
/// Light rule between a detail block's heading and its body.
pub const SEPARATOR_LIGHT: &str =
    "----------------------------------------------------------------------";
