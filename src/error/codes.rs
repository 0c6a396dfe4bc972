/// Error code registry for Trellis
///
/// Error codes are organized by category:
/// - 1000-1999: Configuration errors
/// - 2000-2999: Definition errors
/// - 4000-4999: Execution errors
/// - 5000-5999: Evaluation errors
/// - 7000-7999: Validation errors
/// - 9000-9999: Other errors
pub struct ErrorCode;

impl ErrorCode {
    // Configuration errors (1000-1999)
    pub const CONFIG_GENERIC: u16 = 1000;
    pub const CONFIG_INVALID_VAR: u16 = 1001;

    // Definition errors (2000-2999)
    pub const DEFINITION_GENERIC: u16 = 2000;
    pub const DEFINITION_NOT_FOUND: u16 = 2001;
    pub const DEFINITION_INVALID_YAML: u16 = 2002;
    pub const DEFINITION_INVALID_NODE: u16 = 2003;

    // Execution errors (4000-4999)
    pub const EXEC_GENERIC: u16 = 4000;
    pub const EXEC_SPAWN_FAILED: u16 = 4001;
    pub const EXEC_NON_ZERO_EXIT: u16 = 4002;
    pub const EXEC_OUTPUT_INVALID: u16 = 4003;

    // Evaluation errors (5000-5999)
    pub const EVAL_GENERIC: u16 = 5000;
    pub const EVAL_RETRIES_EXHAUSTED: u16 = 5001;
    pub const EVAL_CANCELLED: u16 = 5002;
    pub const EVAL_QUIT: u16 = 5003;
    pub const EVAL_TASK_PANICKED: u16 = 5004;
    pub const EVAL_FAILED: u16 = 5005;

    // Validation errors (7000-7999)
    pub const VALIDATION_GENERIC: u16 = 7000;
    pub const VALIDATION_UNRESOLVED: u16 = 7001;

    // Other errors (9000-9999)
    pub const OTHER_GENERIC: u16 = 9000;
    pub const OTHER_INTERRUPTED: u16 = 9001;
}

/// Short human description for an error code
pub fn describe_error_code(code: u16) -> &'static str {
    match code {
        1000 => "Generic configuration error",
        1001 => "Invalid variable assignment",

        2000 => "Generic definition error",
        2001 => "Definition file not found",
        2002 => "Invalid YAML in definition",
        2003 => "Invalid node in definition",

        4000 => "Generic execution error",
        4001 => "Failed to spawn subprocess",
        4002 => "Command exited with non-zero status",
        4003 => "Command output did not match expectations",

        5000 => "Generic evaluation error",
        5001 => "Retries exhausted",
        5002 => "Evaluation cancelled",
        5003 => "Evaluation quit from debugger",
        5004 => "Background task panicked",
        5005 => "Evaluation failed",

        7000 => "Generic validation error",
        7001 => "Unresolved variables",

        9000 => "Generic error",
        9001 => "Interrupted",

        _ => "Unknown error code",
    }
}
