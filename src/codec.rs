//! Codec — trait-based format dispatch.

use crate::comment::Comment;
use crate::error::{ParsingError, UnknownFormat};
use crate::model::{Addressee, Documentation, Operation};
use crate::parser::compact::{CompactDecoder, PartialDecode};
use crate::parser::rich::RichDecoder;
use crate::parser::Decoded;
use crate::path::Delimiters;
use crate::registry::Registry;
use crate::render::compact::CompactEncoder;
use crate::render::rich::RichEncoder;
use crate::render::{Call, Encoder};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Compact,
    Rich,
}

impl FromStr for Format {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "compact" | "simple" => Ok(Format::Compact),
            "rich" | "html" => Ok(Format::Rich),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Format::Compact => "compact",
            Format::Rich => "rich",
        })
    }
}

/// Encodes documentation into comments and decodes it back.
pub trait Codec {
    fn format(&self) -> Format;

    /// A fresh encoder for one comment.
    fn encoder(&self) -> Box<dyn Encoder>;

    fn decode(&self, comment: &Comment, operation: Option<&Operation>) -> Result<Decoded, ParsingError>;

    fn delimiters(&self) -> Delimiters {
        Delimiters::default()
    }
}

#[derive(Debug, Clone)]
pub struct CompactCodec {
    primary: Addressee,
    delimiters: Delimiters,
    decoder: CompactDecoder,
}

impl CompactCodec {
    pub fn new(registry: &dyn Registry) -> Self {
        let addressees = registry.addressees();
        CompactCodec {
            primary: registry.primary_addressee(),
            delimiters: Delimiters::default(),
            decoder: CompactDecoder::new(registry.roles(), &addressees),
        }
    }

    pub fn with_delimiters(mut self, delimiters: Delimiters) -> Self {
        self.delimiters = delimiters;
        self
    }

    /// Entries decoded before a failure are handed back with the error.
    pub fn decode_partial(
        &self,
        comment: &Comment,
        operation: Option<&Operation>,
    ) -> Result<Decoded, PartialDecode> {
        self.decoder.decode_partial(comment, operation)
    }
}

impl Codec for CompactCodec {
    fn format(&self) -> Format {
        Format::Compact
    }

    fn encoder(&self) -> Box<dyn Encoder> {
        Box::new(CompactEncoder::new(self.primary.clone()).with_delimiters(self.delimiters))
    }

    fn decode(&self, comment: &Comment, operation: Option<&Operation>) -> Result<Decoded, ParsingError> {
        self.decoder.decode(comment, operation)
    }

    fn delimiters(&self) -> Delimiters {
        self.delimiters
    }
}

#[derive(Debug, Clone)]
pub struct RichCodec {
    decoder: RichDecoder,
}

impl RichCodec {
    pub fn new(registry: &dyn Registry) -> Self {
        RichCodec {
            decoder: RichDecoder::new(registry.roles(), registry.addressees()),
        }
    }
}

impl Codec for RichCodec {
    fn format(&self) -> Format {
        Format::Rich
    }

    fn encoder(&self) -> Box<dyn Encoder> {
        Box::new(RichEncoder::new())
    }

    fn decode(&self, comment: &Comment, _operation: Option<&Operation>) -> Result<Decoded, ParsingError> {
        self.decoder.decode(comment)
    }
}

pub fn codec_for(format: Format, registry: &dyn Registry) -> Box<dyn Codec> {
    match format {
        Format::Compact => Box::new(CompactCodec::new(registry)),
        Format::Rich => Box::new(RichCodec::new(registry)),
    }
}

/// Create a codec for the given format name.
pub fn create_codec(format: &str, registry: &dyn Registry) -> Result<Box<dyn Codec>, UnknownFormat> {
    Ok(codec_for(format.parse()?, registry))
}

// -- Single-call helpers ------------------------------------------------------

/// Encode one call in the compact format.
pub fn encode_compact(call: &Call<'_>, registry: &dyn Registry) -> Result<Comment, ParsingError> {
    let mut encoder = CompactEncoder::new(registry.primary_addressee());
    encoder.append(call)?;
    Ok(encoder.finish())
}

/// Encode one call in the rich format.
pub fn encode_rich(call: &Call<'_>) -> Result<Comment, ParsingError> {
    let mut encoder = RichEncoder::new();
    encoder.append(call)?;
    Ok(encoder.finish())
}

pub fn decode_compact(
    comment: &Comment,
    registry: &dyn Registry,
    operation: Option<&Operation>,
) -> Result<Vec<Documentation>, ParsingError> {
    Ok(CompactCodec::new(registry)
        .decode(comment, operation)?
        .documentations)
}

pub fn decode_rich(comment: &Comment, registry: &dyn Registry) -> Result<Vec<Documentation>, ParsingError> {
    Ok(RichCodec::new(registry).decode(comment, None)?.documentations)
}
