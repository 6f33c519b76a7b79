// SPDX-License-Identifier: PMPL-1.0-or-later

//! Principal namespacing
//!
//! MulVAL treats equal principal atoms as one identity, so `user_0` on two
//! hosts would let a compromise of one account unlock the other. Every
//! account except the superuser is suffixed with its host name.

/// MulVAL's interaction rules name this principal literally.
pub const SUPERUSER: &str = "root";

/// Map a host-local username to its global principal name.
pub fn namespace_principal(username: &str, host_name: &str) -> String {
    if username == SUPERUSER {
        SUPERUSER.to_string()
    } else {
        format!("{}_{}", username, host_name)
    }
}
