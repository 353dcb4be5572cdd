// Adapters layer: concrete clients for external systems.

pub mod github;

pub use github::GitHubClient;
