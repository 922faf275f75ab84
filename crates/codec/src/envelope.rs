// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! RFC2822 envelope encode/decode (spec §4.A, §6.2).

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use mailfs_core::{FileMetadata, FilePath};
use serde_json::Value;

use crate::crypto::Crypto;
use crate::error::CodecError;
use crate::reflow::{compact, reflow};

const LINE_LEN: usize = 78;
const METADATA_PAD_MODULUS: usize = 148;
const PAYLOAD_PAD_MODULUS: usize = 2048;

/// Addressing and crypto configuration for encoding one object.
pub struct EncodeConfig<'a> {
    pub subject: &'a str,
    pub email_to: &'a str,
    pub email_from: &'a str,
    /// `Some` selects encrypted mode; `None` selects clear mode.
    pub crypto: Option<&'a Crypto>,
}

/// Encode one stored object as an RFC2822 byte string.
pub fn encode_object(
    path: &FilePath,
    payload: &[u8],
    mut metadata: FileMetadata,
    cfg: &EncodeConfig<'_>,
) -> Result<Vec<u8>, CodecError> {
    metadata.canonicalize(path.as_str(), payload.len());

    let (xmailfile_field, body_field, subject, filename, transfer_encoding) =
        if let Some(crypto) = cfg.crypto {
            pad_metadata_for_encryption(&mut metadata);
            let json = serde_json::to_string(&metadata.into_value())?;
            let token = crypto.encrypt(json.as_bytes());

            let padded_payload = pad_payload(payload);
            let payload_token = crypto.encrypt(&padded_payload);

            (
                format!("!{token}"),
                format!("!{payload_token}"),
                cfg.subject.to_string(),
                "mailfile.enc".to_string(),
                "7bit",
            )
        } else {
            let json = serde_json::to_string(&metadata.into_value())?;
            (
                STANDARD.encode(json.as_bytes()),
                STANDARD.encode(payload),
                format!("{}: {}", cfg.subject, path),
                path.basename().to_string(),
                "base64",
            )
        };

    // Clear mode has nothing to wrap (base64 has no embedded whitespace),
    // so the header is preserved as one indented line; encrypted mode wraps
    // the opaque token at 78 columns like the body always does.
    let header_value = reflow(&xmailfile_field, " ", LINE_LEN, cfg.crypto.is_none());
    let body_value = reflow(&body_field, "", LINE_LEN, false);

    let lines = [
        format!("To: {}", cfg.email_to),
        format!("From: {}", cfg.email_from),
        format!("Subject: {subject}"),
        "X-Keep-On-Server: manual-delete, not-email".to_string(),
        "X-Mailfile:".to_string(),
        header_value,
        "Content-Type: application/x-mailfile".to_string(),
        format!("Content-Transfer-Encoding: {transfer_encoding}"),
        format!("Content-Disposition: attachment; filename=\"{filename}\""),
        String::new(),
        body_value,
    ];
    Ok(lines.join("\r\n").into_bytes())
}

/// Decode just the `X-Mailfile` header, for the sync engine's reverse-scan
/// peek. `raw` may be truncated (a byte-range fetch) as long as it still
/// contains the full header.
pub fn decode_headers(raw: &[u8], crypto: Option<&Crypto>) -> Result<FileMetadata, CodecError> {
    let text = String::from_utf8_lossy(raw);
    let headers = parse_headers(&text);
    decode_metadata(&headers, crypto)
}

/// Decode a complete stored object: metadata plus the trimmed payload.
pub fn decode_object(
    raw: &[u8],
    crypto: Option<&Crypto>,
) -> Result<(FileMetadata, Vec<u8>), CodecError> {
    let text = String::from_utf8_lossy(raw);
    let (header_text, body_text) = split_message(&text)?;

    let headers = parse_headers(header_text);
    let metadata = decode_metadata(&headers, crypto)?;

    let mut payload = decode_field(&compact(body_text), crypto)?;
    if let Some(len) = metadata.bytes_len() {
        payload.truncate(len.min(payload.len()));
    }

    Ok((metadata, payload))
}

fn decode_metadata(
    headers: &[(String, String)],
    crypto: Option<&Crypto>,
) -> Result<FileMetadata, CodecError> {
    let (_, raw_value) = headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("X-Mailfile"))
        .ok_or(CodecError::MissingHeader("X-Mailfile"))?;

    let json_bytes = decode_field(&compact(raw_value), crypto)?;
    let value: Value = serde_json::from_slice(&json_bytes)?;
    Ok(FileMetadata::from_value(value))
}

fn decode_field(compacted: &str, crypto: Option<&Crypto>) -> Result<Vec<u8>, CodecError> {
    if let Some(token) = compacted.strip_prefix('!') {
        let crypto = crypto.ok_or(CodecError::EncryptedWithoutKey)?;
        crypto.decrypt(token)
    } else {
        Ok(STANDARD.decode(compacted)?)
    }
}

/// Split `text` at the first blank line into `(headers, body)`.
fn split_message(text: &str) -> Result<(&str, &str), CodecError> {
    let idx = text.find("\r\n\r\n").ok_or(CodecError::Malformed)?;
    Ok((&text[..idx], &text[idx + 4..]))
}

/// Unfold RFC2822 header continuation lines into `(name, value)` pairs.
fn parse_headers(text: &str) -> Vec<(String, String)> {
    let mut headers = Vec::new();
    let mut current: Option<(String, String)> = None;

    for line in text.split("\r\n") {
        if line.is_empty() {
            break;
        }
        if line.starts_with(' ') || line.starts_with('\t') {
            if let Some((_, value)) = current.as_mut() {
                value.push_str("\r\n");
                value.push_str(line);
            }
            continue;
        }
        if let Some(header) = current.take() {
            headers.push(header);
        }
        if let Some(idx) = line.find(':') {
            current = Some((line[..idx].to_string(), line[idx + 1..].to_string()));
        }
    }
    if let Some(header) = current.take() {
        headers.push(header);
    }
    headers
}

/// Pad serialized metadata so its JSON length is a multiple of 148, per
/// spec §4.A. The placeholder `_` key is inserted first so the computed
/// overhead already accounts for its presence in the object.
fn pad_metadata_for_encryption(metadata: &mut FileMetadata) {
    metadata.as_map_mut().insert("_".to_string(), Value::from(""));
    let base_len = serde_json::to_string(metadata.as_map()).map(|s| s.len()).unwrap_or(0);
    let remainder = base_len % METADATA_PAD_MODULUS;
    let pad_len = if remainder == 0 { 0 } else { METADATA_PAD_MODULUS - remainder };
    metadata
        .as_map_mut()
        .insert("_".to_string(), Value::from("_".repeat(pad_len)));
}

/// Right-pad `payload` with ASCII spaces so its length is a multiple of
/// 2048, per spec §4.A. The true length is recorded in `metadata.bytes`
/// and used to trim this padding back off on decode.
fn pad_payload(payload: &[u8]) -> Vec<u8> {
    let remainder = payload.len() % PAYLOAD_PAD_MODULUS;
    let pad_len = if remainder == 0 { 0 } else { PAYLOAD_PAD_MODULUS - remainder };
    let mut padded = Vec::with_capacity(payload.len() + pad_len);
    padded.extend_from_slice(payload);
    padded.extend(std::iter::repeat(b' ').take(pad_len));
    padded
}

#[cfg(test)]
#[path = "envelope_tests.rs"]
mod tests;
