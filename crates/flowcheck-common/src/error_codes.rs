pub const WORKSPACE_CREATION: i32 = -32101;
pub const WORKSPACE_REMOVAL: i32 = -32102;

pub const MISSING_WORKING_DIRECTORY: i32 = -32103;
pub const LAUNCH_FAILED: i32 = -32104;
pub const TOOL_NOT_FOUND: i32 = -32105;

pub const ASSERTION_FAILED: i32 = -32106;

pub const TEMPLATE_NOT_FOUND: i32 = -32107;
pub const TEMPLATE_COPY: i32 = -32108;

pub const SCENARIO_NOT_FOUND: i32 = -32109;

pub const GENERIC_ERROR: i32 = -32000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    NotFound,
    InvalidInput,
    CannotCreate,
    External,
    Internal,
    Assertion,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::NotFound => "not_found",
            ErrorCategory::InvalidInput => "invalid_input",
            ErrorCategory::CannotCreate => "cannot_create",
            ErrorCategory::External => "external",
            ErrorCategory::Internal => "internal",
            ErrorCategory::Assertion => "assertion",
        }
    }

    /// UNIX sysexits.h-compliant exit code for this category.
    ///
    /// Assertion failures use plain `1`: they are test outcomes, not
    /// environment problems.
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorCategory::InvalidInput => 64, // EX_USAGE
            ErrorCategory::NotFound => 69,     // EX_UNAVAILABLE
            ErrorCategory::CannotCreate => 73, // EX_CANTCREAT
            ErrorCategory::External => 74,     // EX_IOERR
            ErrorCategory::Internal => 74,     // EX_IOERR
            ErrorCategory::Assertion => 1,
        }
    }
}

impl std::str::FromStr for ErrorCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_found" => Ok(ErrorCategory::NotFound),
            "invalid_input" => Ok(ErrorCategory::InvalidInput),
            "cannot_create" => Ok(ErrorCategory::CannotCreate),
            "external" => Ok(ErrorCategory::External),
            "internal" => Ok(ErrorCategory::Internal),
            "assertion" => Ok(ErrorCategory::Assertion),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub fn category_for_code(code: i32) -> ErrorCategory {
    match code {
        TOOL_NOT_FOUND | TEMPLATE_NOT_FOUND | SCENARIO_NOT_FOUND => ErrorCategory::NotFound,
        MISSING_WORKING_DIRECTORY => ErrorCategory::InvalidInput,
        WORKSPACE_CREATION | TEMPLATE_COPY => ErrorCategory::CannotCreate,
        LAUNCH_FAILED | WORKSPACE_REMOVAL => ErrorCategory::External,
        ASSERTION_FAILED => ErrorCategory::Assertion,
        _ => ErrorCategory::Internal,
    }
}
