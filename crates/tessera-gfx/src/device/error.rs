use std::fmt;

/// Raw error code reported by the device's `get_error` query.
///
/// The native error space is open-ended; codes without a known name render
/// as `Unknown`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ErrorCode(pub u32);

impl ErrorCode {
    pub const NO_ERROR: Self = Self(0);
    pub const INVALID_ENUM: Self = Self(0x0500);
    pub const INVALID_VALUE: Self = Self(0x0501);
    pub const INVALID_OPERATION: Self = Self(0x0502);
    pub const STACK_OVERFLOW: Self = Self(0x0503);
    pub const STACK_UNDERFLOW: Self = Self(0x0504);
    pub const OUT_OF_MEMORY: Self = Self(0x0505);
    pub const INVALID_FRAMEBUFFER_OPERATION: Self = Self(0x0506);
    pub const TABLE_TOO_LARGE: Self = Self(0x8031);

    #[inline]
    pub const fn is_error(self) -> bool {
        self.0 != Self::NO_ERROR.0
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::NO_ERROR => "NoError",
            Self::INVALID_ENUM => "InvalidEnum",
            Self::INVALID_VALUE => "InvalidValue",
            Self::INVALID_OPERATION => "InvalidOperation",
            Self::STACK_OVERFLOW => "StackOverflow",
            Self::STACK_UNDERFLOW => "StackUnderflow",
            Self::OUT_OF_MEMORY => "OutOfMemory",
            Self::INVALID_FRAMEBUFFER_OPERATION => "InvalidFramebufferOperation",
            Self::TABLE_TOO_LARGE => "TableTooLarge",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
