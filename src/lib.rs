//! A minimal growable array with pluggable allocation and growth policies.

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

#[doc = include_str!("../README.md")]
#[cfg(doctest)]
struct _ReadmeDoctests;

#[cfg(test)]
#[macro_use]
extern crate std;

#[cfg(feature = "alloc")]
extern crate alloc as alloc_crate;

pub mod alloc;

pub mod array;

pub mod capacity;

pub(crate) mod error;

pub mod prelude;

pub use self::{
    array::DynArray,
    error::{StorageError, UpdateError},
};
