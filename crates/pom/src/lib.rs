//! # vman-pom
//!
//! Maven POM support for vman.
//!
//! Reads `pom.xml` files into [`vman_core::Descriptor`]s and writes them back
//! onto their original text, replacing only the version values that changed.

mod codec;
mod model_path;
mod reader;
mod writer;

pub use codec::PomCodec;
pub use reader::read_pom;
pub use writer::write_pom;
