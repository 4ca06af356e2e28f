pub mod options;
pub mod settings;
pub mod validator;

pub use options::*;
pub use settings::*;
pub use validator::*;
