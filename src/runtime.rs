//! The object model: heap, types, attribute lookup, calls, operators,
//! exceptions, iteration and the builtin composite types.
pub(crate) mod bool;
pub(crate) mod callable;
pub(crate) mod class;
pub(crate) mod collector;
pub(crate) mod config;
pub(crate) mod console;
pub(crate) mod context;
pub(crate) mod dict;
pub(crate) mod error;
pub(crate) mod exception;
pub(crate) mod execution;
pub(crate) mod int;
pub(crate) mod intrinsic;
pub(crate) mod iteration;
pub(crate) mod list;
pub(crate) mod method;
pub(crate) mod none;
pub(crate) mod object;
pub(crate) mod operator;
pub(crate) mod range;
pub(crate) mod string;
pub(crate) mod tuple;
pub(crate) mod value;
