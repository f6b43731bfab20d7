//! Identity store adapters implementing the
//! [`IdentityStore`](reentry_application::ports::identity_store::IdentityStore) port.

mod file_store;

pub use file_store::FileIdentityStore;
