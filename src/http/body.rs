//! Response body module
//!
//! Every response shares one boxed body type so buffered messages and
//! streamed file contents can be returned from the same handler. File bodies
//! own their handle; dropping the body (completion, error, or client
//! disconnect) closes the file.

use futures::{stream, TryStreamExt};
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full, StreamBody};
use hyper::body::{Bytes, Frame};
use std::collections::VecDeque;
use std::io::{self, SeekFrom};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

/// Read size for streamed file bodies
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Body type used by every response
pub type ResponseBody = UnsyncBoxBody<Bytes, io::Error>;

/// Empty body (HEAD, 304, 204)
pub fn empty() -> ResponseBody {
    Empty::<Bytes>::new().map_err(|never| match never {}).boxed_unsync()
}

/// Fully buffered body
pub fn full(data: impl Into<Bytes>) -> ResponseBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Stream `length` bytes of `file` starting at `start`
pub async fn file_range(mut file: File, start: u64, length: u64) -> io::Result<ResponseBody> {
    if start > 0 {
        file.seek(SeekFrom::Start(start)).await?;
    }
    let reader = ReaderStream::with_capacity(file.take(length), CHUNK_SIZE);
    Ok(StreamBody::new(reader.map_ok(Frame::data)).boxed_unsync())
}

/// One piece of a `multipart/byteranges` body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal bytes (boundaries and part headers)
    Bytes(Bytes),
    /// A span of the file
    File { start: u64, length: u64 },
}

/// Stream a sequence of literal and file segments from a single handle
///
/// File spans are read in `CHUNK_SIZE` pieces, seeking before each read so
/// the segments may appear in any order.
pub fn multipart(file: File, segments: Vec<Segment>) -> ResponseBody {
    let state = (file, VecDeque::from(segments));
    let frames = stream::try_unfold(state, |(file, segments)| next_frame(file, segments));
    StreamBody::new(frames).boxed_unsync()
}

type MultipartState = (File, VecDeque<Segment>);

async fn next_frame(
    mut file: File,
    mut segments: VecDeque<Segment>,
) -> io::Result<Option<(Frame<Bytes>, MultipartState)>> {
    loop {
        match segments.pop_front() {
            None => return Ok(None),
            Some(Segment::Bytes(bytes)) => return Ok(Some((Frame::data(bytes), (file, segments)))),
            Some(Segment::File { length: 0, .. }) => {}
            Some(Segment::File { start, length }) => {
                let chunk = length.min(CHUNK_SIZE as u64);
                let mut buf = vec![0; usize::try_from(chunk).unwrap_or(CHUNK_SIZE)];
                file.seek(SeekFrom::Start(start)).await?;
                file.read_exact(&mut buf).await?;
                if length > chunk {
                    segments.push_front(Segment::File {
                        start: start + chunk,
                        length: length - chunk,
                    });
                }
                return Ok(Some((Frame::data(Bytes::from(buf)), (file, segments))));
            }
        }
    }
}
