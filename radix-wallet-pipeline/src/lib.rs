// SPDX-License-Identifier: Apache-2.0

//! Async transaction pipeline driving a Radix transaction intent through
//! build, user confirmation, device signing, finalization, submission, and
//! status tracking.
//!
//! The pipeline owns nothing but its own event and completion channels: it
//! borrows a [`radix_node_api::NodeApi`] for node calls and a [`Wallet`] for
//! signing, and never reaches into either's internals.

mod confirmation;
mod error;
mod events;
mod pipeline;
mod poll;
mod wallet;

pub use confirmation::{confirmation_channel, Confirmation, ConfirmationReceiver, ConfirmationSender, UserConfirmation};
pub use error::{BootstrapError, ErrorKind, PipelineError};
pub use events::{EventLog, EventSubscription, Phase, TrackingEvent};
pub use pipeline::{spawn, PipelineOptions, TransactionTracking};
pub use poll::{IntervalTrigger, PollTrigger};
pub use wallet::{Account, SignatureMaterial, Wallet};
