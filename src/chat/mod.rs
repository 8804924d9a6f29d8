mod responder;
mod sentiment;
mod transcript;

pub use responder::*;
pub use sentiment::*;
pub use transcript::*;
