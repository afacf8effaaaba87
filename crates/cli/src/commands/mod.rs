mod config;
mod modify;

pub use config::ConfigArgs;
pub use config::handle_config;
pub use modify::ModifyArgs;
pub use modify::handle_modify;
