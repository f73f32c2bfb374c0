// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod cell;
pub mod column;
pub mod filter;
pub mod list;
pub mod page;
pub mod selection;
pub mod sort;
pub mod source;
pub mod store;
pub mod view;

pub use cell::*;
pub use column::*;
pub use filter::*;
pub use page::*;
pub use selection::*;
pub use sort::*;
pub use source::*;
pub use store::*;
pub use view::*;
