//! HTTP/1.1 response decoding
//!
//! Reads a status line, header block and body from any [`Receive`] source.
//! Body framing is chosen from the headers: `Transfer-Encoding: chunked`
//! takes precedence over `Content-Length`; without either the body runs
//! until the peer closes the connection.

use std::time::Duration;

use http::header::{CONTENT_LENGTH, TRANSFER_ENCODING};
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use tracing::{debug, trace};

use just_weather_core::{Error, Result};

use crate::{HttpResponse, Receive};

const READ_CHUNK: usize = 8 * 1024;
const MAX_CHUNK_SIZE_LINE: usize = 1024;

/// Bounds applied while decoding one response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Timeout for every individual receive
    pub timeout: Duration,
    /// Ceiling on the total number of bytes read from the source
    pub max_response_size: usize,
    /// Ceiling on the size of the status line plus header block
    pub max_header_bytes: usize,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            max_response_size: 8 * 1024 * 1024,
            max_header_bytes: 64 * 1024,
        }
    }
}

/// How the body length is determined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Framing {
    /// Status forbids a body (204, 304)
    Empty,
    Chunked,
    Length(usize),
    UntilClose,
}

/// Read and decode one complete response from `source`
pub fn read_response<R>(source: &mut R, limits: &DecodeLimits) -> Result<HttpResponse>
where
    R: Receive + ?Sized,
{
    let mut reader = ResponseReader::new(source, limits);

    let status_line = reader
        .read_line(limits.max_header_bytes)?
        .ok_or_else(|| Error::protocol("connection closed before a status line was received"))?;
    let code = parse_status_line(&status_line)?;
    let budget = limits.max_header_bytes.saturating_sub(status_line.len());
    let headers = read_headers(&mut reader, budget)?;

    if !(200..=599).contains(&code) {
        return Err(Error::protocol(format!(
            "status code {code} is outside 200..=599"
        )));
    }
    let status = StatusCode::from_u16(code)
        .map_err(|e| Error::protocol(format!("invalid status code {code}: {e}")))?;

    let framing = framing_for(status, &headers)?;
    debug!(status = code, ?framing, "decoding response body");

    let body = match framing {
        Framing::Empty => Vec::new(),
        Framing::Length(len) => {
            if len > limits.max_response_size {
                return Err(Error::protocol(format!(
                    "Content-Length {len} exceeds limit of {} bytes",
                    limits.max_response_size
                )));
            }
            let mut body = Vec::with_capacity(len);
            reader.read_exact_into(len, &mut body)?;
            body
        }
        Framing::Chunked => decode_chunked(&mut reader, limits)?,
        Framing::UntilClose => reader.read_to_end()?,
    };

    Ok(HttpResponse::new(status, headers, body))
}

/// Parse `HTTP/1.x <3-digit code> [reason]` and return the code
///
/// The reason phrase is ignored and may carry obs-text.
fn parse_status_line(line: &[u8]) -> Result<u16> {
    let malformed = || {
        Error::protocol(format!(
            "malformed status line {:?}",
            String::from_utf8_lossy(line)
        ))
    };

    let mut parts = line.splitn(3, |&b| b == b' ');
    let version = parts.next().ok_or_else(malformed)?;
    if !version.starts_with(b"HTTP/1.") {
        return Err(malformed());
    }
    let code = parts.next().ok_or_else(malformed)?;
    match code {
        &[a, b, c] if code.iter().all(u8::is_ascii_digit) => {
            Ok(u16::from(a - b'0') * 100 + u16::from(b - b'0') * 10 + u16::from(c - b'0'))
        }
        _ => Err(malformed()),
    }
}

/// View a line that must be plain ASCII (chunk size lines)
fn ascii_line<'b>(line: &'b [u8], what: &str) -> Result<&'b str> {
    let non_ascii = || Error::protocol(format!("{what} contains non-ASCII bytes"));
    if !line.is_ascii() {
        return Err(non_ascii());
    }
    std::str::from_utf8(line).map_err(|_| non_ascii())
}

/// Header names must be tokens; values may carry obs-text (0x80..=0xFF)
fn read_headers<R>(reader: &mut ResponseReader<'_, R>, budget: usize) -> Result<HeaderMap>
where
    R: Receive + ?Sized,
{
    let mut headers = HeaderMap::new();
    let mut used = 0usize;

    loop {
        let line = reader
            .read_line(budget.saturating_sub(used))?
            .ok_or_else(|| Error::protocol("connection closed before the end of the headers"))?;
        used += line.len() + 2;
        if used > budget {
            return Err(Error::protocol("response headers exceed size limit"));
        }
        if line.is_empty() {
            return Ok(headers);
        }
        if matches!(line.first(), Some(b' ' | b'\t')) {
            return Err(Error::protocol("obsolete header line folding is not supported"));
        }

        let colon = line.iter().position(|&b| b == b':').ok_or_else(|| {
            Error::protocol(format!(
                "malformed header line {:?}",
                String::from_utf8_lossy(&line)
            ))
        })?;
        let (name, value) = (&line[..colon], &line[colon + 1..]);
        let name = HeaderName::from_bytes(name).map_err(|_| {
            Error::protocol(format!(
                "invalid header name {:?}",
                String::from_utf8_lossy(name)
            ))
        })?;
        let value = HeaderValue::from_bytes(value.trim_ascii())
            .map_err(|_| Error::protocol(format!("invalid value for header {name}")))?;
        trace!(header = %name, "parsed header");
        headers.append(name, value);
    }
}

fn framing_for(status: StatusCode, headers: &HeaderMap) -> Result<Framing> {
    if status == StatusCode::NO_CONTENT || status == StatusCode::NOT_MODIFIED {
        return Ok(Framing::Empty);
    }

    let mut codings = Vec::new();
    for value in headers.get_all(TRANSFER_ENCODING) {
        let value = value
            .to_str()
            .map_err(|_| Error::protocol("non-ASCII Transfer-Encoding"))?;
        codings.extend(
            value
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_ascii_lowercase),
        );
    }
    if !codings.is_empty() {
        return Ok(match codings.last().map(String::as_str) {
            Some("chunked") => Framing::Chunked,
            _ => Framing::UntilClose,
        });
    }

    let mut length = None;
    for value in headers.get_all(CONTENT_LENGTH) {
        let parsed = value
            .to_str()
            .ok()
            .map(str::trim)
            .filter(|v| !v.is_empty() && v.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|v| v.parse::<usize>().ok())
            .ok_or_else(|| Error::protocol("invalid Content-Length"))?;
        match length {
            Some(existing) if existing != parsed => {
                return Err(Error::protocol("conflicting Content-Length values"));
            }
            _ => length = Some(parsed),
        }
    }

    Ok(length.map_or(Framing::UntilClose, Framing::Length))
}

fn decode_chunked<R>(reader: &mut ResponseReader<'_, R>, limits: &DecodeLimits) -> Result<Vec<u8>>
where
    R: Receive + ?Sized,
{
    let mut body = Vec::new();

    loop {
        let line = reader
            .read_line(MAX_CHUNK_SIZE_LINE)?
            .ok_or_else(|| Error::io("connection closed before the terminating chunk"))?;
        let size = parse_chunk_size(ascii_line(&line, "chunk size line")?)?;
        trace!(size, "chunk");
        if size == 0 {
            break;
        }
        if body.len().saturating_add(size) > limits.max_response_size {
            return Err(Error::protocol(format!(
                "chunked body exceeds limit of {} bytes",
                limits.max_response_size
            )));
        }

        reader.read_exact_into(size, &mut body)?;

        match reader.read_line(MAX_CHUNK_SIZE_LINE)? {
            Some(terminator) if terminator.is_empty() => {}
            Some(_) => return Err(Error::protocol("chunk data is not followed by CRLF")),
            None => return Err(Error::io("connection closed inside a chunk")),
        }
    }

    // Trailer fields are read and dropped; a peer that closes right after
    // the last chunk is accepted.
    while let Some(trailer) = reader.read_line(limits.max_header_bytes)? {
        if trailer.is_empty() {
            break;
        }
        trace!(bytes = trailer.len(), "discarding trailer");
    }

    Ok(body)
}

fn parse_chunk_size(line: &str) -> Result<usize> {
    let digits = line.split(';').next().unwrap_or_default().trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::protocol(format!("malformed chunk size line {line:?}")));
    }
    usize::from_str_radix(digits, 16)
        .map_err(|_| Error::protocol(format!("chunk size {digits:?} is too large")))
}

/// Buffered reader over a [`Receive`] source
struct ResponseReader<'a, R: Receive + ?Sized> {
    source: &'a mut R,
    limits: &'a DecodeLimits,
    buf: Vec<u8>,
    pos: usize,
    total_read: usize,
    eof: bool,
}

impl<'a, R: Receive + ?Sized> ResponseReader<'a, R> {
    fn new(source: &'a mut R, limits: &'a DecodeLimits) -> Self {
        Self {
            source,
            limits,
            buf: Vec::with_capacity(READ_CHUNK),
            pos: 0,
            total_read: 0,
            eof: false,
        }
    }

    fn buffered(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Pull one more read from the source. Returns `false` at end of stream.
    fn fill(&mut self) -> Result<bool> {
        if self.eof {
            return Ok(false);
        }
        if self.pos > 0 && self.pos * 2 >= self.buf.len() {
            self.buf.drain(..self.pos);
            self.pos = 0;
        }

        let mut chunk = [0u8; READ_CHUNK];
        let n = self.source.receive(&mut chunk, self.limits.timeout)?;
        if n == 0 {
            self.eof = true;
            return Ok(false);
        }

        self.total_read += n;
        if self.total_read > self.limits.max_response_size {
            return Err(Error::protocol(format!(
                "response exceeds limit of {} bytes",
                self.limits.max_response_size
            )));
        }
        self.buf.extend_from_slice(&chunk[..n]);
        Ok(true)
    }

    /// Next line without its `\r\n` (a bare `\n` is tolerated)
    ///
    /// `Ok(None)` when the stream ended cleanly before any byte of a line.
    fn read_line(&mut self, limit: usize) -> Result<Option<Vec<u8>>> {
        let mut scanned = 0;
        loop {
            if let Some(offset) = self.buf[self.pos + scanned..]
                .iter()
                .position(|&b| b == b'\n')
            {
                let end = self.pos + scanned + offset;
                let raw = &self.buf[self.pos..end];
                let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
                if raw.len() > limit {
                    return Err(Error::protocol(format!("line exceeds {limit} bytes")));
                }
                let line = raw.to_vec();
                self.pos = end + 1;
                return Ok(Some(line));
            }

            scanned = self.buffered();
            if scanned > limit + 1 {
                return Err(Error::protocol(format!("line exceeds {limit} bytes")));
            }
            if !self.fill()? {
                return if scanned == 0 {
                    Ok(None)
                } else {
                    Err(Error::protocol("connection closed in the middle of a line"))
                };
            }
        }
    }

    /// Append exactly `len` bytes to `out`
    fn read_exact_into(&mut self, len: usize, out: &mut Vec<u8>) -> Result<()> {
        while self.buffered() < len {
            if !self.fill()? {
                return Err(Error::io(format!(
                    "connection closed after {} of {len} body bytes",
                    self.buffered()
                )));
            }
        }
        out.extend_from_slice(&self.buf[self.pos..self.pos + len]);
        self.pos += len;
        Ok(())
    }

    /// Everything until the peer closes
    fn read_to_end(&mut self) -> Result<Vec<u8>> {
        while self.fill()? {}
        let rest = self.buf[self.pos..].to_vec();
        self.pos = self.buf.len();
        Ok(rest)
    }
}
