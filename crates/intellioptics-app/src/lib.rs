// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod error;
pub mod filter;
pub mod ids;
pub mod model;
pub mod payload;
pub mod state;

pub use error::*;
pub use filter::*;
pub use ids::*;
pub use model::*;
pub use payload::*;
pub use state::*;
