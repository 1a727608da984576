//! Lookup trait for resolving upstream package versions

#[cfg(test)]
use mockall::automock;

use crate::error::FetchError;
use crate::package::Version;

/// Trait for looking up the upstream version of a package
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait RemoteLookup: Send + Sync {
    /// Looks up the latest upstream version of a package
    ///
    /// # Returns
    /// * `Ok(Some(version))` - The package is known upstream
    /// * `Ok(None)` - The service does not know the package
    /// * `Err(FetchError)` - If the lookup itself failed
    async fn lookup(&self, package_name: &str) -> Result<Option<Version>, FetchError>;
}
