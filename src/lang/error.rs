use crate::mach::Address;

pub type LineNumber = Option<usize>;

#[derive(Clone, PartialEq)]
pub struct Error {
    code: ErrorCode,
    line_number: LineNumber,
    address: Option<Address>,
    message: String,
}

#[doc(hidden)]
#[macro_export]
macro_rules! error {
    ($err:ident) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
    };
    ($err:ident, @$addr:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err).at_address($addr)
    };
    ($err:ident, $line:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err).in_line_number($line)
    };
    ($err:ident; $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err).message($msg)
    };
    ($err:ident, @$addr:expr; $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
            .at_address($addr)
            .message($msg)
    };
    ($err:ident, $line:expr; $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
            .in_line_number($line)
            .message($msg)
    };
}

impl Error {
    pub fn new(code: ErrorCode) -> Error {
        Error {
            code,
            line_number: None,
            address: None,
            message: String::new(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn line_number(&self) -> LineNumber {
        self.line_number
    }

    pub fn address(&self) -> Option<Address> {
        self.address
    }

    pub fn in_line_number(self, line: LineNumber) -> Error {
        Error {
            line_number: line,
            ..self
        }
    }

    pub fn at_address(self, addr: Address) -> Error {
        Error {
            address: Some(addr),
            ..self
        }
    }

    pub fn message<S: Into<String>>(self, message: S) -> Error {
        debug_assert!(self.message.is_empty());
        Error {
            message: message.into(),
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    AddressError = 1,
    StackUnderflow = 2,
    StackOverflow = 3,
    UndefinedWord = 4,
    IllegalOpcode = 5,
    BadLabelAddress = 6,
    SyntaxError = 7,
    Overflow = 8,
    OutOfMemory = 9,
    ImageMismatch = 10,
    FileNotFound = 11,
    InternalError = 51,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        use ErrorCode::*;
        match self {
            AddressError => "ADDRESS ERROR",
            StackUnderflow => "STACK UNDERFLOW",
            StackOverflow => "STACK OVERFLOW",
            UndefinedWord => "UNDEFINED WORD",
            IllegalOpcode => "ILLEGAL OPCODE",
            BadLabelAddress => "BAD LABEL ADDRESS",
            SyntaxError => "SYNTAX ERROR",
            Overflow => "OVERFLOW",
            OutOfMemory => "OUT OF MEMORY",
            ImageMismatch => "IMAGE MISMATCH",
            FileNotFound => "FILE NOT FOUND",
            InternalError => "INTERNAL ERROR",
        }
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error {{ {} }}", self.to_string())
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut location = String::new();
        if let Some(line_number) = self.line_number {
            location.push_str(&format!(" {}", line_number));
        }
        if let Some(addr) = self.address {
            location.push_str(&format!(" @{:04X}", addr));
        }
        write!(f, "{}", self.code.as_str())?;
        if !location.is_empty() {
            write!(f, " IN{}", location)?;
        }
        if !self.message.is_empty() {
            write!(f, "; {}", self.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_plain() {
        assert_eq!(error!(StackUnderflow).to_string(), "STACK UNDERFLOW");
    }

    #[test]
    fn test_display_line_and_message() {
        let e = error!(UndefinedWord; "FOO").in_line_number(Some(3));
        assert_eq!(e.to_string(), "UNDEFINED WORD IN 3; FOO");
        assert_eq!(e.line_number(), Some(3));
    }

    #[test]
    fn test_display_address() {
        let e = error!(AddressError, @0x0101; "CELL");
        assert_eq!(e.to_string(), "ADDRESS ERROR IN @0101; CELL");
        assert_eq!(e.code(), ErrorCode::AddressError);
    }
}
