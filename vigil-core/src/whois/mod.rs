pub mod classify;
mod directory;
mod transport;

pub use classify::Classifier;
pub use directory::RegistryDirectory;
pub use transport::WhoisTransport;
