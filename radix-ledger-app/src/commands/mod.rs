// SPDX-License-Identifier: Apache-2.0

//! Command implementations for the Radix application.

pub mod get_app_name;
pub mod get_public_key;
pub mod key_exchange;
pub mod sign_hash;
pub mod sign_tx;

pub use get_app_name::*;
pub use get_public_key::*;
pub use key_exchange::*;
pub use sign_hash::*;
pub use sign_tx::*;
