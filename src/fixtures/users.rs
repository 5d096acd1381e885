//! User Fixtures

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::access::UserIdentity;

/// Wrapper for users in YAML, keyed by handle
#[derive(Debug, Deserialize)]
pub struct UsersFixture {
    /// Users by handle
    pub users: FxHashMap<String, UserIdentity>,
}
