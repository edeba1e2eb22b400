// MinIO Rust Library for Amazon S3 Compatible Cloud Storage
// Copyright 2025 MinIO, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Decoder for the `SelectObjectContent` event stream.
//!
//! Every message is framed as
//!
//! ```text
//! [total length: u32][headers length: u32][prelude crc: u32][headers][payload][message crc: u32]
//! ```
//!
//! with all integers big endian. Headers are `[name length: u8][name][type: u8 = 7][value length: u16][value]`.

use crate::s3::error::Error;
use crate::s3::utils::{crc32, get_text, uint32};
use async_stream::try_stream;
use bytes::{Buf, Bytes, BytesMut};
use futures_util::{Stream, StreamExt};
use log::debug;
use std::collections::HashMap;
use xmltree::Element;

const PRELUDE_LENGTH: usize = 8;
const PRELUDE_CRC_LENGTH: usize = 4;
const MESSAGE_CRC_LENGTH: usize = 4;
const MIN_MESSAGE_LENGTH: usize = PRELUDE_LENGTH + PRELUDE_CRC_LENGTH + MESSAGE_CRC_LENGTH;
const HEADER_VALUE_TYPE_STRING: u8 = 7;

/// A single framed message of the event stream
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    pub headers: HashMap<String, String>,
    pub payload: Bytes,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Bytes scanned, processed and returned so far
pub struct SelectProgress {
    pub bytes_scanned: u64,
    pub bytes_processed: u64,
    pub bytes_returned: u64,
}

impl SelectProgress {
    fn parse(payload: &[u8]) -> Result<SelectProgress, Error> {
        let root = Element::parse(payload)?;
        Ok(SelectProgress {
            bytes_scanned: get_text(&root, "BytesScanned")?.parse::<u64>()?,
            bytes_processed: get_text(&root, "BytesProcessed")?.parse::<u64>()?,
            bytes_returned: get_text(&root, "BytesReturned")?.parse::<u64>()?,
        })
    }
}

/// Decoded event of the stream
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Records(Bytes),
    Progress(SelectProgress),
    Stats(SelectProgress),
    Cont,
    End,
}

impl Event {
    /// Interprets a message; `error` messages become [`Error::SelectError`].
    pub fn from_message(message: Message) -> Result<Event, Error> {
        let header = |name: &str| message.headers.get(name).cloned().unwrap_or_default();

        if header(":message-type") == "error" {
            return Err(Error::SelectError(
                header(":error-code"),
                header(":error-message"),
            ));
        }

        match header(":event-type").as_str() {
            "Records" => Ok(Event::Records(message.payload)),
            "Progress" => Ok(Event::Progress(SelectProgress::parse(&message.payload)?)),
            "Stats" => Ok(Event::Stats(SelectProgress::parse(&message.payload)?)),
            "Cont" => Ok(Event::Cont),
            "End" => Ok(Event::End),
            v => Err(Error::UnknownEventType(v.to_string())),
        }
    }
}

/// Incremental message decoder; bytes are pushed as they arrive from the network.
#[derive(Debug, Default)]
pub struct MessageDecoder {
    buf: BytesMut,
}

impl MessageDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Returns true if no partial message is buffered.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Returns the next complete message, or `None` if more bytes are needed.
    pub fn next_message(&mut self) -> Result<Option<Message>, Error> {
        if self.buf.len() < PRELUDE_LENGTH + PRELUDE_CRC_LENGTH {
            return Ok(None);
        }

        let prelude = &self.buf[..PRELUDE_LENGTH];
        let expected = uint32(&self.buf[PRELUDE_LENGTH..])?;
        let got = crc32(prelude);
        if got != expected {
            return Err(Error::CrcMismatch(String::from("prelude"), expected, got));
        }

        let total_length = uint32(prelude)? as usize;
        let header_length = uint32(&prelude[4..])? as usize;
        if total_length < MIN_MESSAGE_LENGTH || header_length > total_length - MIN_MESSAGE_LENGTH {
            return Err(Error::InvalidMessage(format!(
                "total length {total_length}, headers length {header_length}"
            )));
        }

        if self.buf.len() < total_length {
            return Ok(None);
        }

        let mut message = self.buf.split_to(total_length).freeze();
        let crc_offset = total_length - MESSAGE_CRC_LENGTH;
        let expected = uint32(&message[crc_offset..])?;
        let got = crc32(&message[..crc_offset]);
        if got != expected {
            return Err(Error::CrcMismatch(String::from("message"), expected, got));
        }

        message.advance(PRELUDE_LENGTH + PRELUDE_CRC_LENGTH);
        message.truncate(message.len() - MESSAGE_CRC_LENGTH);
        let headers = decode_headers(&message[..header_length])?;
        message.advance(header_length);

        Ok(Some(Message {
            headers,
            payload: message,
        }))
    }
}

fn take<'a>(data: &'a [u8], offset: &mut usize, length: usize) -> Result<&'a [u8], Error> {
    let slice = data
        .get(*offset..*offset + length)
        .ok_or(Error::InsufficientData(length as u64, (data.len() - *offset) as u64))?;
    *offset += length;
    Ok(slice)
}

fn decode_headers(data: &[u8]) -> Result<HashMap<String, String>, Error> {
    let mut headers = HashMap::new();
    let mut offset = 0_usize;
    while offset < data.len() {
        let length = take(data, &mut offset, 1)?[0] as usize;
        if length == 0 {
            break;
        }
        let name = String::from_utf8(take(data, &mut offset, length)?.to_vec())?;

        let value_type = take(data, &mut offset, 1)?[0];
        if value_type != HEADER_VALUE_TYPE_STRING {
            return Err(Error::InvalidHeaderValueType(value_type));
        }

        let len = take(data, &mut offset, 2)?;
        let length = u16::from_be_bytes([len[0], len[1]]) as usize;
        let value = String::from_utf8(take(data, &mut offset, length)?.to_vec())?;

        headers.insert(name, value);
    }

    Ok(headers)
}

/// Turns a raw response body into the concatenated payloads of its `Records` events.
///
/// Ends successfully only after the `End` event; a body that stops before it is an error.
pub fn records_stream<S, E>(body: S) -> impl Stream<Item = Result<Bytes, Error>> + Send
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Into<Error> + Send + 'static,
{
    try_stream! {
        let mut decoder = MessageDecoder::new();
        let mut body = Box::pin(body);
        let mut ended = false;

        'read: while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(Into::<Error>::into)?;
            decoder.push(&chunk);

            while let Some(message) = decoder.next_message()? {
                match Event::from_message(message)? {
                    Event::Records(payload) => {
                        if !payload.is_empty() {
                            yield payload;
                        }
                    }
                    Event::Progress(p) => debug!("select progress: {p:?}"),
                    Event::Stats(s) => debug!("select stats: {s:?}"),
                    Event::Cont => {}
                    Event::End => {
                        ended = true;
                        break 'read;
                    }
                }
            }
        }

        if !ended {
            Err(Error::MissingEndEvent)?;
        }
    }
}

#[cfg(test)]
pub(crate) fn encode_message(headers: &[(&str, &str)], payload: &[u8]) -> Vec<u8> {
    let mut header_bytes = Vec::new();
    for (name, value) in headers {
        header_bytes.push(name.len() as u8);
        header_bytes.extend_from_slice(name.as_bytes());
        header_bytes.push(HEADER_VALUE_TYPE_STRING);
        header_bytes.extend_from_slice(&(value.len() as u16).to_be_bytes());
        header_bytes.extend_from_slice(value.as_bytes());
    }

    let total = MIN_MESSAGE_LENGTH + header_bytes.len() + payload.len();
    let mut data = Vec::with_capacity(total);
    data.extend_from_slice(&(total as u32).to_be_bytes());
    data.extend_from_slice(&(header_bytes.len() as u32).to_be_bytes());
    data.extend_from_slice(&crc32(&data).to_be_bytes());
    data.extend_from_slice(&header_bytes);
    data.extend_from_slice(payload);
    data.extend_from_slice(&crc32(&data).to_be_bytes());
    data
}
