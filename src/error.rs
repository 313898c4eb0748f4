use crate::core::Value;

#[derive(thiserror::Error, Debug)]
pub enum JSError {
    #[error("Parse error: {message}")]
    ParseError { message: String },

    #[error("Syntax error: {message}")]
    SyntaxError { message: String },

    #[error("Thrown value: {value:?}")]
    Throw { value: Value },
}

#[macro_export]
macro_rules! raise_parse_error {
    ($($arg:tt)*) => {
        $crate::JSError::ParseError { message: format!($($arg)*) }
    };
}

#[macro_export]
macro_rules! raise_syntax_error {
    ($($arg:tt)*) => {
        $crate::JSError::SyntaxError { message: format!($($arg)*) }
    };
}

impl From<JSError> for std::io::Error {
    fn from(err: JSError) -> std::io::Error {
        std::io::Error::other(err.to_string())
    }
}
