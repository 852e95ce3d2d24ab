//! JSON-lines batch surface: one request object per input line, one response
//! object per output line.

pub mod dispatcher;
pub mod request;
pub mod response;
