//! Streaming gzip compression
//!
//! Wraps any byte body and compresses it frame by frame, so large files
//! never have to be buffered to be compressed.

use flate2::write::GzEncoder;
use flate2::Compression;
use hyper::body::{Body, Bytes, Frame};
use std::io::{self, Write};
use std::pin::Pin;
use std::task::{ready, Context, Poll};

/// Body adapter producing a gzip stream of `inner`'s data frames
pub struct GzipBody<B> {
    inner: B,
    /// `None` once the gzip trailer has been emitted or the inner body failed
    encoder: Option<GzEncoder<Vec<u8>>>,
}

impl<B> GzipBody<B> {
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            encoder: Some(GzEncoder::new(Vec::new(), Compression::default())),
        }
    }
}

impl<B> Body for GzipBody<B>
where
    B: Body<Data = Bytes, Error = io::Error> + Unpin,
{
    type Data = Bytes;
    type Error = io::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        loop {
            let Some(encoder) = this.encoder.as_mut() else {
                return Poll::Ready(None);
            };

            match ready!(Pin::new(&mut this.inner).poll_frame(cx)) {
                Some(Ok(frame)) => {
                    // Trailers are not forwarded
                    let Ok(data) = frame.into_data() else {
                        continue;
                    };
                    encoder.write_all(&data)?;
                    let compressed = std::mem::take(encoder.get_mut());
                    if !compressed.is_empty() {
                        return Poll::Ready(Some(Ok(Frame::data(Bytes::from(compressed)))));
                    }
                }
                Some(Err(e)) => {
                    this.encoder = None;
                    return Poll::Ready(Some(Err(e)));
                }
                None => {
                    let Some(encoder) = this.encoder.take() else {
                        return Poll::Ready(None);
                    };
                    let tail = encoder.finish()?;
                    return Poll::Ready(Some(Ok(Frame::data(Bytes::from(tail)))));
                }
            }
        }
    }

    fn is_end_stream(&self) -> bool {
        self.encoder.is_none()
    }
}
