// Copyright (c) The tracker-notifier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat notifiers that the failure summary of a run is posted to.

mod slack;
mod webex;

pub use slack::*;
pub use webex::*;

use crate::errors::ChatError;

/// A chat destination for the failure summary.
pub trait ChatNotifier {
    /// A short name for the notifier, such as `slack`.
    fn name(&self) -> &str;

    /// Describes where messages go, for example `slack channel e2e-alerts`.
    fn destination(&self) -> String;

    /// Checks that the credentials work and that the destination exists.
    fn verify(&self) -> Result<(), ChatError>;

    /// Posts `text` to the destination.
    fn send(&self, text: &str) -> Result<(), ChatError>;
}
