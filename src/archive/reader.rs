//! Streaming archive reader
//!
//! Opens a gzip-compressed archive and yields `ArchiveRecord`s in archive
//! order. The gzip header is checked up front so that an empty or
//! uncompressed file is rejected before any work is scheduled.

use crate::archive::record::ArchiveRecord;
use crate::error::{ArchiveError, ArchiveResult};
use flate2::bufread::MultiGzDecoder;
use serde_json::de::IoRead;
use serde_json::{Deserializer, StreamDeserializer};
use std::fs::File;
use std::io::{self, BufReader, Chain, Cursor, ErrorKind, Read};
use std::path::Path;
use tracing::debug;

/// First two bytes of every gzip member
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Source with the already consumed magic bytes put back in front
type Rewound<R> = Chain<Cursor<[u8; 2]>, R>;

type RecordStream<R> =
    StreamDeserializer<'static, IoRead<MultiGzDecoder<BufReader<Rewound<R>>>>, ArchiveRecord>;

/// Lazy, single-pass reader over archive records
///
/// Iteration yields `Ok(record)` until end of input. The first decode
/// failure is yielded as `Err` and ends the sequence.
pub struct ArchiveReader<R: Read> {
    /// Decoder positioned at the next record
    records: RecordStream<R>,

    /// Records pulled from the stream so far (including a failed one)
    index: u64,

    /// Set once a record failed to decode
    failed: bool,
}

impl ArchiveReader<File> {
    /// Open an archive file
    pub fn open(path: impl AsRef<Path>) -> ArchiveResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ArchiveError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), "Opened archive");
        Self::from_reader(file)
    }
}

impl<R: Read> ArchiveReader<R> {
    /// Wrap any byte source positioned at the start of a gzip stream
    pub fn from_reader(mut reader: R) -> ArchiveResult<Self> {
        let mut magic = [0u8; 2];
        let filled = read_up_to(&mut reader, &mut magic).map_err(|e| ArchiveError::Decompress {
            reason: e.to_string(),
        })?;
        if filled == 0 {
            return Err(ArchiveError::Decompress {
                reason: "archive is empty".into(),
            });
        }
        if filled < GZIP_MAGIC.len() || magic != GZIP_MAGIC {
            return Err(ArchiveError::Decompress {
                reason: "not a gzip stream".into(),
            });
        }

        let reader = BufReader::new(Cursor::new(magic).chain(reader));
        let records = Deserializer::from_reader(MultiGzDecoder::new(reader)).into_iter();

        Ok(Self {
            records,
            index: 0,
            failed: false,
        })
    }

    /// Number of records pulled from the stream so far
    pub fn records_read(&self) -> u64 {
        self.index
    }
}

/// Fill `buf` from `reader`, stopping early only at end of input
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

impl<R: Read> Iterator for ArchiveReader<R> {
    type Item = ArchiveResult<ArchiveRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let next = self.records.next()?;
        self.index += 1;

        match next {
            Ok(record) => Some(Ok(record)),
            Err(source) => {
                self.failed = true;
                Some(Err(ArchiveError::Decode {
                    record: self.index,
                    source,
                }))
            }
        }
    }
}
