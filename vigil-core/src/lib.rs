pub mod checker;
pub mod domain;
pub mod error;
pub mod notify;
pub mod runner;
pub mod status;
pub mod whois;

pub use error::{Result, TransportError, VigilError};

pub use domain::normalize_domain;

pub use checker::{CheckOutcome, DomainChecker};
pub use notify::{LogNotifier, Notifier, WebhookNotifier};
pub use runner::{CheckRunner, DomainReport, WatchedDomain};
pub use status::{detect_change, AlertEvent, DomainStatus};
pub use whois::{Classifier, RegistryDirectory, WhoisTransport};
