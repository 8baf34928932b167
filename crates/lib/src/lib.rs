//! kiln-lib: build-driver logic for the ember native library.
//!
//! This crate holds the policy half of the build: everything that decides
//! *what* to do before the opaque native toolchain is invoked:
//! - `config`: one immutable [`config::BuildConfig`] resolved per invocation
//! - `submodule`: vendored checkout verification with one-shot recovery
//! - `mirror`: idempotent mirroring of generated sources into the packaged
//!   codegen tree
//! - `native`: typed seams around the CMake build and package staging
//! - `orchestrate`: the sequential build flow tying the above together

pub mod config;
pub mod consts;
pub mod envbool;
pub mod mirror;
pub mod native;
pub mod orchestrate;
pub mod submodule;
pub mod version;
