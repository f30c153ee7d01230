//! Object storage clients

mod aws;
mod ephemeral;
mod traits;

#[cfg(test)]
mod tests;

pub use aws::{AwsClientFactory, AwsStorageClient};
pub use ephemeral::{EphemeralClientFactory, EphemeralStorage, DEFAULT_PAGE_SIZE};
pub use traits::{
    ClientFactory, Credentials, ObjectContent, ObjectListing, ObjectSummary, StorageClient,
    StorageError,
};
