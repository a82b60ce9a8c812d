//! CLI command implementations.

pub mod extract;
pub mod run;
pub mod session;
pub mod show;

pub use extract::ExtractCommand;
pub use run::RunCommand;
pub use show::ShowCommand;
