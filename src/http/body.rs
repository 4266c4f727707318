//! Response body types
//!
//! Every response carries a [`ResponseBody`]: a boxed byte body whose
//! errors are I/O errors from the file being streamed.

use futures_util::TryStreamExt;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full, StreamBody};
use hyper::body::{Bytes, Frame};
use std::io;
use tokio_util::io::ReaderStream;

use super::gzip::GzipBody;

/// Read size when streaming files
const CHUNK_SIZE: usize = 64 * 1024;

pub type ResponseBody = UnsyncBoxBody<Bytes, io::Error>;

/// In-memory body
pub fn full(data: impl Into<Bytes>) -> ResponseBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}

pub fn empty() -> ResponseBody {
    Empty::<Bytes>::new()
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Stream an open file. The handle is owned by the body and closed when
/// the body is dropped: after the last chunk, on a read error, or when
/// the client goes away mid-stream.
pub fn file(file: tokio::fs::File) -> ResponseBody {
    StreamBody::new(ReaderStream::with_capacity(file, CHUNK_SIZE).map_ok(Frame::data))
        .boxed_unsync()
}

/// Gzip-compress another body on the fly
pub fn gzip(body: ResponseBody) -> ResponseBody {
    GzipBody::new(body).boxed_unsync()
}
