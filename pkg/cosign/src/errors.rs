//! Crate-wide error handling.
//!
//! A familiar `common::errors::*` convention (`err_msg`, a single boxed
//! `Error`/`Result` pair imported with a glob) is reproduced here on top
//! of `anyhow`, since the nightly-only `#![feature(trait_alias)]` error
//! crate it echoes isn't reproducible outside its own monorepo build.

pub use anyhow::{anyhow as err_msg, bail, Context, Error, Result};
