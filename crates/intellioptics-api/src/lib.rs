// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod client;
pub mod engineio;
mod push;

pub use client::{Client, USER_AGENT};
pub use push::{
    PushOptions, Subscription, UPDATE_EVENT, UPDATE_REQUEST_EVENT, websocket_url,
};
