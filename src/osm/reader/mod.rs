// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::fs::File;
use std::io::{self, BufRead};
use std::path::Path;

use builder::GraphBuilder;
use poi::PoiCollector;

use super::{Error, Profile};
use crate::{Bounds, Graph, Position};

mod builder;
mod model;
mod poi;
mod xml;

pub use poi::TagFilter;

/// Format of the input OSM file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileFormat {
    /// Unknown format - guess the format based on the first bytes of the content
    #[default]
    Unknown,

    /// Force uncompressed [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    Xml,

    /// Force [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    /// with [gzip](https://en.wikipedia.org/wiki/Gzip) compression
    XmlGz,

    /// Force [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    /// with [bzip2](https://en.wikipedia.org/wiki/Bzip2) compression
    XmlBz2,
}

impl FileFormat {
    /// Guesses the format from the magic bytes at the start of the content.
    /// Anything which is neither gzip nor bzip2 is assumed to be plain XML.
    pub fn detect(prefix: &[u8]) -> Self {
        if prefix.starts_with(&[0x1f, 0x8b]) {
            Self::XmlGz
        } else if prefix.starts_with(b"BZh") {
            Self::XmlBz2
        } else {
            Self::Xml
        }
    }
}

/// Additional controls for interpreting OSM data as a street network [Graph].
#[derive(Debug, Clone, Copy)]
pub struct Options<'a> {
    /// Which OSM ways make up the network.
    pub profile: &'a Profile<'a>,

    /// Format of the input data.
    pub file_format: FileFormat,

    /// Only load nodes within the provided bounding box.
    pub bbox: Option<Bounds>,
}

/// Controls for extracting points of interest from OSM data,
/// see [points_of_interest_from_file].
#[derive(Debug, Clone, Copy)]
pub struct PoiOptions<'a> {
    /// Features matching any of the filters are returned.
    pub filters: &'a [TagFilter],

    /// Format of the input data.
    pub file_format: FileFormat,

    /// Only return points of interest within the provided bounding box.
    pub bbox: Option<Bounds>,
}

/// Consumer of [OSM features](model::Feature), fed by one of the readers.
trait FeatureSink {
    fn add_feature(&mut self, f: model::Feature);

    /// Called once all features have been read.
    fn finish(&mut self);
}

fn consume<S, E, I>(sink: &mut S, features: I) -> Result<(), Error>
where
    S: FeatureSink,
    I: IntoIterator<Item = Result<model::Feature, E>>,
    Error: From<E>,
{
    for f in features {
        sink.add_feature(f?);
    }
    sink.finish();
    Ok(())
}

fn read_io<S: FeatureSink, R: io::Read>(
    sink: &mut S,
    file_format: FileFormat,
    reader: R,
) -> Result<(), Error> {
    let mut reader = io::BufReader::new(reader);
    let file_format = match file_format {
        FileFormat::Unknown => FileFormat::detect(reader.fill_buf()?),
        f => f,
    };
    log::debug!("reading OSM data as {:?}", file_format);

    match file_format {
        FileFormat::Unknown | FileFormat::Xml => consume(sink, xml::Reader::from_io(reader)),

        FileFormat::XmlGz => {
            let d = flate2::read::MultiGzDecoder::new(reader);
            consume(sink, xml::Reader::from_io(io::BufReader::new(d)))
        }

        FileFormat::XmlBz2 => {
            let d = bzip2::read::MultiBzDecoder::new(reader);
            consume(sink, xml::Reader::from_io(io::BufReader::new(d)))
        }
    }
}

fn read_buffer<S: FeatureSink>(sink: &mut S, file_format: FileFormat, data: &[u8]) -> Result<(), Error> {
    let file_format = match file_format {
        FileFormat::Unknown => FileFormat::detect(data),
        f => f,
    };

    if file_format == FileFormat::Xml {
        // Fast path is available for in-memory XML data
        consume(sink, xml::Reader::from_buffer(data))
    } else {
        read_io(sink, file_format, io::Cursor::new(data))
    }
}

/// Parse OSM features from a reader into a [Graph] as per the provided [Options].
///
/// The provided stream will be automatically wrapped in a buffered reader.
pub fn add_features_from_io<'a, R: io::Read>(
    g: &'a mut Graph,
    options: &'a Options<'a>,
    reader: R,
) -> Result<(), Error> {
    read_io(&mut GraphBuilder::new(g, options), options.file_format, reader)
}

/// Parse OSM features from a file at the provided path into a [Graph] as per the provided [Options].
pub fn add_features_from_file<'a, P: AsRef<Path>>(
    g: &'a mut Graph,
    options: &'a Options<'a>,
    path: P,
) -> Result<(), Error> {
    let path = path.as_ref();
    log::info!("loading {} network from {}", options.profile.name, path.display());
    let f = File::open(path)?;
    add_features_from_io(g, options, f)
}

/// Parse OSM features from an in-memory buffer into a [Graph] as per the provided [Options].
pub fn add_features_from_buffer<'a>(
    g: &'a mut Graph,
    options: &'a Options<'a>,
    data: &[u8],
) -> Result<(), Error> {
    read_buffer(&mut GraphBuilder::new(g, options), options.file_format, data)
}

/// Extracts positions of nodes and ways matching any of the [PoiOptions::filters]
/// from a reader. Ways are represented by the centroid of their nodes.
///
/// Points of interest are returned in the order of their appearance in the data.
pub fn points_of_interest_from_io<R: io::Read>(
    options: &PoiOptions<'_>,
    reader: R,
) -> Result<Vec<Position>, Error> {
    let mut collector = PoiCollector::new(options);
    read_io(&mut collector, options.file_format, reader)?;
    Ok(collector.into_points())
}

/// Extracts points of interest from a file at the provided path,
/// see [points_of_interest_from_io].
pub fn points_of_interest_from_file<P: AsRef<Path>>(
    options: &PoiOptions<'_>,
    path: P,
) -> Result<Vec<Position>, Error> {
    let path = path.as_ref();
    log::info!("loading points of interest from {}", path.display());
    let f = File::open(path)?;
    points_of_interest_from_io(options, f)
}

/// Extracts points of interest from an in-memory buffer,
/// see [points_of_interest_from_io].
pub fn points_of_interest_from_buffer(
    options: &PoiOptions<'_>,
    data: &[u8],
) -> Result<Vec<Position>, Error> {
    let mut collector = PoiCollector::new(options);
    read_buffer(&mut collector, options.file_format, data)?;
    Ok(collector.into_points())
}
