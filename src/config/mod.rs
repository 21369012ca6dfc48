//! Configuration module

mod site;

pub use site::CardSettings;
pub use site::SiteConfig;
