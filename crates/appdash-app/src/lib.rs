// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod columns;
pub mod dataset;
pub mod flags;
pub mod forms;
pub mod ids;
pub mod inventory;
pub mod model;
pub mod notify;
pub mod state;
pub mod wizard;

pub use columns::*;
pub use dataset::*;
pub use flags::*;
pub use forms::*;
pub use ids::*;
pub use inventory::*;
pub use model::*;
pub use notify::*;
pub use state::*;
pub use wizard::*;
