//! Stubgen Core Library
//!
//! This library provides the core functionality for generating service
//! controller skeletons and client stubs in multiple target languages
//! from a language-neutral interface description.

pub mod backend;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod generate;
pub mod ir;
pub mod utils;
pub mod writer;

pub use crate::{
    backend::{AttributeFilter, BackendKind, CaseConvention, Formatter},
    config::Config,
    error::{Error, Result},
    generate::{generate, generate_all, GeneratedFile},
    ir::Idl,
};
