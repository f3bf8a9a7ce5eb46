//! Core library for the storefront-etl command line application.
//!
//! The library consolidates a primary product catalog and a patch source into
//! one validated record set. Input and output adapters live under
//! [`storefront::etl::io`], record shapes inside [`storefront::etl::model`],
//! the cleaning and merge logic in [`storefront::etl::consolidate`], and the
//! run orchestration under [`storefront::etl::pipeline`].

pub mod storefront;

pub use storefront::etl::{
    EtlError, Result, config, consolidate, error, io, model, normalize, pipeline,
};
