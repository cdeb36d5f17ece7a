use std::fs;
use std::path::Path;

use encoding_rs::Encoding;

use crate::error::{ResubError, Result};
use crate::report::Reporter;

/// How file content is decoded before rules run. Writing always uses the
/// explicitly configured write encoding, never the detected read encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadEncoding {
    Explicit(String),
    AutoDetect,
    TryAll,
}

impl ReadEncoding {
    pub fn parse(label: &str) -> Result<Self> {
        let trimmed = label.trim();
        match trimmed {
            "auto-detect" => Ok(ReadEncoding::AutoDetect),
            "try-all" => Ok(ReadEncoding::TryAll),
            other if is_known_label(other) => {
                Ok(ReadEncoding::Explicit(other.to_ascii_lowercase()))
            }
            other => Err(ResubError::UnknownEncoding(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EncodingConfig {
    pub read: ReadEncoding,
    pub write: String,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        EncodingConfig {
            read: ReadEncoding::TryAll,
            write: "utf-8".to_string(),
        }
    }
}

#[derive(Debug)]
pub struct DecodedFile {
    pub text: String,
    /// The label that decoded the file, e.g. "gbk" or "utf-8-sig".
    pub encoding: String,
}

/// Candidates for try-all, in priority order. The single-byte entries near
/// the middle decode any byte sequence, so they act as a catch-all and the
/// tail of the list is rarely reached.
const TRY_ALL_CANDIDATES: &[&str] = &[
    "utf-8",
    "utf-8-sig",
    "gbk",
    "gb2312",
    "latin-1",
    "ascii",
    "iso-8859-1",
    "iso-8859-2",
    "iso-8859-3",
    "iso-8859-4",
    "iso-8859-5",
    "iso-8859-6",
    "iso-8859-7",
    "iso-8859-8",
    "iso-8859-9",
    "iso-8859-10",
    "iso-8859-11",
    "iso-8859-13",
    "iso-8859-14",
    "iso-8859-15",
    "iso-8859-16",
    "windows-1250",
    "windows-1251",
    "windows-1252",
    "windows-1253",
    "windows-1254",
    "windows-1255",
    "windows-1256",
    "windows-1257",
    "windows-1258",
];

/// Labels handled outside encoding_rs: strict variants the WHATWG tables do
/// not expose (true Latin-1, 7-bit ASCII) or encodings it does not carry
/// (UTF-16 write, UTF-32).
const SPECIAL_LABELS: &[&str] = &[
    "utf-8",
    "utf-8-sig",
    "latin-1",
    "ascii",
    "utf-16-le",
    "utf-16-be",
    "utf-32-le",
    "utf-32-be",
];

pub fn is_known_label(label: &str) -> bool {
    SPECIAL_LABELS.contains(&label) || Encoding::for_label(label.as_bytes()).is_some()
}

pub fn validate_write_label(label: &str) -> Result<()> {
    if is_known_label(label) {
        Ok(())
    } else {
        Err(ResubError::UnknownEncoding(label.to_string()))
    }
}

pub fn resolve_and_read(
    path: &Path,
    read: &ReadEncoding,
    reporter: &dyn Reporter,
) -> Result<DecodedFile> {
    let bytes = fs::read(path).map_err(|err| ResubError::file_read(path, err))?;

    match read {
        ReadEncoding::Explicit(label) => {
            let text = decode(path, &bytes, label)?;
            Ok(DecodedFile {
                text,
                encoding: label.clone(),
            })
        }
        ReadEncoding::AutoDetect => {
            let label = detect_bom(&bytes).unwrap_or("utf-8");
            reporter.log(&format!("detected encoding {label} for {}", path.display()));
            let text = decode(path, &bytes, label)?;
            Ok(DecodedFile {
                text,
                encoding: label.to_string(),
            })
        }
        ReadEncoding::TryAll => {
            for label in TRY_ALL_CANDIDATES {
                if let Ok(text) = decode(path, &bytes, label) {
                    reporter.log(&format!("decoded {} as {label}", path.display()));
                    return Ok(DecodedFile {
                        text,
                        encoding: (*label).to_string(),
                    });
                }
            }
            Err(ResubError::NoEncodingMatched {
                path: path.display().to_string(),
            })
        }
    }
}

/// BOM sniff over the leading bytes. First match wins: utf-16-le is checked
/// before utf-32-le, so an FF FE 00 00 prefix reports utf-16-le.
pub fn detect_bom(bytes: &[u8]) -> Option<&'static str> {
    const BOMS: &[(&[u8], &str)] = &[
        (&[0xEF, 0xBB, 0xBF], "utf-8-sig"),
        (&[0xFF, 0xFE], "utf-16-le"),
        (&[0xFE, 0xFF], "utf-16-be"),
        (&[0xFF, 0xFE, 0x00, 0x00], "utf-32-le"),
        (&[0x00, 0x00, 0xFE, 0xFF], "utf-32-be"),
    ];

    BOMS.iter()
        .find(|(bom, _)| bytes.starts_with(bom))
        .map(|(_, label)| *label)
}

/// Strict decode: any malformed input is an error, no replacement characters.
pub fn decode(path: &Path, bytes: &[u8], label: &str) -> Result<String> {
    let fail = || ResubError::Decode {
        path: path.display().to_string(),
        encoding: label.to_string(),
    };

    match label {
        "utf-8" => std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| fail()),
        "utf-8-sig" => {
            let body = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF][..]).unwrap_or(bytes);
            std::str::from_utf8(body)
                .map(str::to_owned)
                .map_err(|_| fail())
        }
        "latin-1" | "iso-8859-1" => Ok(bytes.iter().map(|&b| b as char).collect()),
        "ascii" => {
            if bytes.is_ascii() {
                Ok(bytes.iter().map(|&b| b as char).collect())
            } else {
                Err(fail())
            }
        }
        "utf-16-le" => decode_utf16(bytes, true).ok_or_else(fail),
        "utf-16-be" => decode_utf16(bytes, false).ok_or_else(fail),
        "utf-32-le" => decode_utf32(bytes, true).ok_or_else(fail),
        "utf-32-be" => decode_utf32(bytes, false).ok_or_else(fail),
        _ => {
            let encoding = Encoding::for_label(label.as_bytes())
                .ok_or_else(|| ResubError::UnknownEncoding(label.to_string()))?;
            let (cow, had_errors) = encoding.decode_without_bom_handling(bytes);
            if had_errors { Err(fail()) } else { Ok(cow.into_owned()) }
        }
    }
}

/// Encodes for write-back. Strict: unmappable characters are an error rather
/// than being replaced.
pub fn encode(text: &str, label: &str) -> Result<Vec<u8>> {
    let unencodable = || ResubError::Unencodable {
        encoding: label.to_string(),
    };

    match label {
        "utf-8" => Ok(text.as_bytes().to_vec()),
        "utf-8-sig" => {
            let mut out = vec![0xEF, 0xBB, 0xBF];
            out.extend_from_slice(text.as_bytes());
            Ok(out)
        }
        "latin-1" | "iso-8859-1" => text
            .chars()
            .map(|c| u8::try_from(u32::from(c)).map_err(|_| unencodable()))
            .collect(),
        "ascii" => {
            if text.is_ascii() {
                Ok(text.as_bytes().to_vec())
            } else {
                Err(unencodable())
            }
        }
        "utf-16-le" => Ok(text
            .encode_utf16()
            .flat_map(|unit| unit.to_le_bytes())
            .collect()),
        "utf-16-be" => Ok(text
            .encode_utf16()
            .flat_map(|unit| unit.to_be_bytes())
            .collect()),
        "utf-32-le" => Ok(text
            .chars()
            .flat_map(|c| u32::from(c).to_le_bytes())
            .collect()),
        "utf-32-be" => Ok(text
            .chars()
            .flat_map(|c| u32::from(c).to_be_bytes())
            .collect()),
        _ => {
            let encoding = Encoding::for_label(label.as_bytes())
                .ok_or_else(|| ResubError::UnknownEncoding(label.to_string()))?;
            let (cow, _, had_unmappable) = encoding.encode(text);
            if had_unmappable {
                Err(unencodable())
            } else {
                Ok(cow.into_owned())
            }
        }
    }
}

fn decode_utf16(bytes: &[u8], little_endian: bool) -> Option<String> {
    if bytes.len() % 2 != 0 {
        return None;
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| {
            let pair = [pair[0], pair[1]];
            if little_endian {
                u16::from_le_bytes(pair)
            } else {
                u16::from_be_bytes(pair)
            }
        })
        .collect();
    String::from_utf16(&units).ok()
}

fn decode_utf32(bytes: &[u8], little_endian: bool) -> Option<String> {
    if bytes.len() % 4 != 0 {
        return None;
    }
    bytes
        .chunks_exact(4)
        .map(|quad| {
            let quad = [quad[0], quad[1], quad[2], quad[3]];
            let unit = if little_endian {
                u32::from_le_bytes(quad)
            } else {
                u32::from_be_bytes(quad)
            };
            char::from_u32(unit)
        })
        .collect()
}
