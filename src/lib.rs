//! roledoc: audience-aware documentation in source comments.
//!
//! Documentation entries carry a thematic role, a list of addressees and a
//! text per addressee. This crate writes them into doc comments and reads
//! them back, in two formats:
//!
//! - **compact**: one tag per entry (`@param p [OBJECT] the input`), a
//!   single audience, continuation and sub tags for further entries
//! - **rich**: every entry as an embedded table, any number of audiences

pub mod codec;
pub mod comment;
pub mod error;
pub mod escape;
pub mod model;
pub mod parser;
pub mod path;
pub mod registry;
pub mod render;
pub mod taglet;

pub use codec::{create_codec, Codec, CompactCodec, Format, RichCodec};
pub use comment::{find_grid_name, Comment, Segment};
pub use error::{ParsingError, UnknownFormat};
pub use model::{
    Addressee, Artifact, Documentation, Interface, Operation, Parameter, SignatureElement,
    ThematicRole,
};
pub use parser::attach::{attach, collect};
pub use parser::Decoded;
pub use registry::{Catalog, Registry};
pub use render::{generate_artifact, generate_interface, generate_operation};
