pub mod session;
pub mod student;

pub use session::*;
pub use student::*;
