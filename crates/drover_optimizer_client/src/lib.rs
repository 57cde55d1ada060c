#![allow(async_fn_in_trait)]

pub mod cuopt_api;
pub mod payload;
pub mod payload_builder;
pub mod translate;
