#![allow(async_fn_in_trait)]

pub mod coordinates;
pub mod delivery;
pub mod demand;
pub mod location;
pub mod route;
pub mod store;
pub mod time_window;
pub mod vehicle;

mod newtype_index;

#[cfg(any(test, feature = "test-support"))]
pub mod memory_store;
