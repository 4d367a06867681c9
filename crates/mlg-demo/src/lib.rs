pub mod config;
pub mod error;
pub mod scenarios;

pub use config::DemoConfig;
pub use error::{DemoError, Result};

pub mod prelude {
    pub use crate::config::DemoConfig;
    pub use crate::error::{DemoError, Result};
    pub use crate::scenarios;
}
