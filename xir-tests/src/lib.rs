//! Workspace test crate: interpreter kernel semantics and guest
//! signal-context marshalling, exercised through the public APIs.

#[cfg(test)]
mod linux_user;
