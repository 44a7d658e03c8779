// Providers layer - Business rules
//
// Providers hold the rules coordinators apply: who may do what, which
// uploads are acceptable, how ticket fields are validated, how passwords
// are hashed. None of them own a transaction.

pub mod access_policy;
pub mod attachment_policy;
pub mod credential_provider;
pub mod ticket_rules;

pub use credential_provider::CredentialProvider;
