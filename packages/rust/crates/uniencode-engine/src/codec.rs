//! Strict codecs over `encoding_rs`.
//!
//! Decoding never substitutes U+FFFD and encoding never emits HTML numeric
//! character references: either the conversion is exact or it fails.
//!
//! WHATWG resolves several legacy labels to a larger Windows code page
//! (`iso-8859-1` to windows-1252, `gb2312` to GBK, ...). Those labels get a
//! narrowed [`Mode`] so that a file is never written in the superset under the
//! narrower name.

use std::borrow::Cow;
use std::fmt;

use encoding_rs::{
    EUC_KR, Encoding, GBK, UTF_8, UTF_16BE, UTF_16LE, WINDOWS_874, WINDOWS_1252, WINDOWS_1254,
};

use crate::error::EngineError;

/// Names the detector may report for plain ASCII.
const ASCII_NAMES: [&str; 3] = ["ascii", "us-ascii", "ansi_x3.4-1968"];

/// Whether `name` is one of the ASCII labels.
#[must_use]
pub fn is_ascii_name(name: &str) -> bool {
    ASCII_NAMES.iter().any(|n| n.eq_ignore_ascii_case(name.trim()))
}

/// Subset of the underlying `encoding_rs` codec that is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// The WHATWG codec as is.
    Full,
    /// 7-bit only.
    Ascii,
    /// Bytes are code points U+0000..=U+00FF.
    Latin1,
    /// ISO-8859 parts whose Windows superset fills 0x80..=0x9F; those bytes
    /// stay C1 controls.
    IsoC1,
    /// Double-byte EUC: lead in `0xA1..=lead_max`, trail in `0xA1..=0xFE`.
    Euc { lead_max: u8 },
}

/// A resolved character encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Codec {
    encoding: &'static Encoding,
    mode: Mode,
    name: &'static str,
    /// Documents in this encoding start with a byte order mark.
    bom: bool,
}

impl Codec {
    const fn full(encoding: &'static Encoding) -> Self {
        Self {
            encoding,
            mode: Mode::Full,
            name: "",
            bom: false,
        }
    }

    /// Resolve a label (WHATWG labels plus the detector's own spellings).
    ///
    /// Returns `None` for unknown labels and for the `replacement` encoding.
    #[must_use]
    pub fn for_label(label: &str) -> Option<Self> {
        let lowered = label.trim().to_ascii_lowercase();
        if is_ascii_name(&lowered) {
            return Some(Self {
                mode: Mode::Ascii,
                name: "us-ascii",
                ..Self::full(WINDOWS_1252)
            });
        }

        let (canonical, bom) = match lowered.as_str() {
            "utf-8-sig" | "utf8-sig" => ("utf-8", true),
            "utf-16" | "utf16" => ("utf-16le", true),
            "utf8" => ("utf-8", false),
            "maccyrillic" | "mac-cyrillic" => ("x-mac-cyrillic", false),
            "cp932" | "ms932" | "windows-31j" => ("shift_jis", false),
            "cp949" | "ms949" | "uhc" => ("windows-949", false),
            "cp936" | "ms936" => ("gbk", false),
            "cp874" => ("windows-874", false),
            other => (other, false),
        };
        let encoding = Encoding::for_label_no_replacement(canonical.as_bytes())?;

        let codec = match narrowed(&lowered, encoding) {
            Some((mode, name)) => Self {
                mode,
                name,
                ..Self::full(encoding)
            },
            None => Self {
                bom,
                name: match (bom, encoding == UTF_8) {
                    (true, true) => "UTF-8-SIG",
                    (true, false) => "UTF-16",
                    _ if encoding == EUC_KR => "windows-949",
                    _ => encoding.name(),
                },
                ..Self::full(encoding)
            },
        };
        Some(codec)
    }

    /// Canonical name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Byte order mark that opens a document in this encoding, empty for
    /// encodings written without one.
    #[must_use]
    pub fn bom(&self) -> &'static [u8] {
        if !self.bom {
            b""
        } else if self.encoding == UTF_8 {
            b"\xEF\xBB\xBF"
        } else if self.encoding == UTF_16LE {
            b"\xFF\xFE"
        } else {
            b"\xFE\xFF"
        }
    }

    /// Whether `bytes` open with a byte order mark of this encoding.
    #[must_use]
    pub fn has_bom(&self, bytes: &[u8]) -> bool {
        self.split_bom(bytes).is_some()
    }

    /// Decode `bytes`, or `None` if any sequence is malformed.
    ///
    /// A byte order mark is kept as U+FEFF rather than stripped.
    #[must_use]
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Option<Cow<'a, str>> {
        match self.mode {
            Mode::Full => self
                .encoding
                .decode_without_bom_handling_and_without_replacement(bytes),
            Mode::Ascii => bytes
                .is_ascii()
                .then(|| std::str::from_utf8(bytes).ok().map(Cow::Borrowed))
                .flatten(),
            Mode::Latin1 => Some(decode_latin1(bytes)),
            Mode::IsoC1 => decode_keeping_c1(self.encoding, bytes),
            Mode::Euc { lead_max } => {
                if is_narrow_euc(bytes, lead_max) {
                    self.encoding
                        .decode_without_bom_handling_and_without_replacement(bytes)
                } else {
                    None
                }
            }
        }
    }

    /// Decode a whole file: a leading byte order mark of this encoding is
    /// dropped, a UTF-16 mark also picks the byte order.
    #[must_use]
    pub fn decode_document<'a>(&self, bytes: &'a [u8]) -> Option<Cow<'a, str>> {
        match self.split_bom(bytes) {
            Some((encoding, rest)) => {
                encoding.decode_without_bom_handling_and_without_replacement(rest)
            }
            None => self.decode(bytes),
        }
    }

    /// Encode `text`, or `None` if some character is unrepresentable.
    #[must_use]
    pub fn encode<'a>(&self, text: &'a str) -> Option<Cow<'a, [u8]>> {
        match self.mode {
            Mode::Ascii => text.is_ascii().then_some(Cow::Borrowed(text.as_bytes())),
            Mode::Latin1 => encode_latin1(text),
            Mode::IsoC1 => encode_keeping_c1(self.encoding, text),
            Mode::Full | Mode::Euc { .. } => {
                // encoding_rs only decodes UTF-16; its encoder would emit UTF-8.
                if self.encoding == UTF_16LE {
                    return Some(Cow::Owned(
                        text.encode_utf16().flat_map(u16::to_le_bytes).collect(),
                    ));
                }
                if self.encoding == UTF_16BE {
                    return Some(Cow::Owned(
                        text.encode_utf16().flat_map(u16::to_be_bytes).collect(),
                    ));
                }

                let (bytes, _, had_unmappable) = self.encoding.encode(text);
                if had_unmappable {
                    return None;
                }
                match self.mode {
                    Mode::Euc { lead_max } if !is_narrow_euc(&bytes, lead_max) => None,
                    _ => Some(bytes),
                }
            }
        }
    }

    fn split_bom<'a>(&self, bytes: &'a [u8]) -> Option<(&'static Encoding, &'a [u8])> {
        if self.mode != Mode::Full {
            return None;
        }
        let (found, len) = Encoding::for_bom(bytes)?;
        let utf16 = |e: &'static Encoding| e == UTF_16LE || e == UTF_16BE;
        let same = found == self.encoding || (self.bom && utf16(found) && utf16(self.encoding));
        if same {
            bytes.get(len..).map(|rest| (found, rest))
        } else {
            None
        }
    }
}

/// Narrowed mode for legacy labels that WHATWG widens to a superset.
fn narrowed(label: &str, encoding: &'static Encoding) -> Option<(Mode, &'static str)> {
    if encoding == WINDOWS_1252 && !matches!(label, "windows-1252" | "cp1252" | "x-cp1252") {
        Some((Mode::Latin1, "ISO-8859-1"))
    } else if encoding == WINDOWS_1254 && !matches!(label, "windows-1254" | "cp1254" | "x-cp1254")
    {
        Some((Mode::IsoC1, "ISO-8859-9"))
    } else if encoding == WINDOWS_874 && !matches!(label, "windows-874" | "dos-874" | "cp874") {
        Some((Mode::IsoC1, "ISO-8859-11"))
    } else if encoding == GBK
        && !matches!(label, "gbk" | "x-gbk" | "cp936" | "ms936" | "windows-936")
    {
        Some((Mode::Euc { lead_max: 0xF7 }, "GB2312"))
    } else if encoding == EUC_KR
        && !matches!(label, "windows-949" | "cp949" | "ms949" | "uhc")
    {
        Some((Mode::Euc { lead_max: 0xFE }, "EUC-KR"))
    } else {
        None
    }
}

fn is_c1(byte: u8) -> bool {
    (0x80..=0x9F).contains(&byte)
}

fn decode_latin1(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) if bytes.is_ascii() => Cow::Borrowed(text),
        _ => Cow::Owned(bytes.iter().copied().map(char::from).collect()),
    }
}

fn encode_latin1(text: &str) -> Option<Cow<'_, [u8]>> {
    if text.is_ascii() {
        return Some(Cow::Borrowed(text.as_bytes()));
    }
    text.chars()
        .map(|c| u8::try_from(c).ok())
        .collect::<Option<Vec<u8>>>()
        .map(Cow::Owned)
}

fn decode_keeping_c1<'a>(encoding: &'static Encoding, bytes: &'a [u8]) -> Option<Cow<'a, str>> {
    if !bytes.iter().copied().any(is_c1) {
        return encoding.decode_without_bom_handling_and_without_replacement(bytes);
    }

    let mut text = String::with_capacity(bytes.len());
    for run in bytes.split_inclusive(|&b| is_c1(b)) {
        let (head, control) = match run.split_last() {
            Some((&last, head)) if is_c1(last) => (head, Some(last)),
            _ => (run, None),
        };
        text.push_str(&encoding.decode_without_bom_handling_and_without_replacement(head)?);
        if let Some(byte) = control {
            text.push(char::from(byte));
        }
    }
    Some(Cow::Owned(text))
}

fn encode_keeping_c1<'a>(encoding: &'static Encoding, text: &'a str) -> Option<Cow<'a, [u8]>> {
    if text.is_ascii() {
        return Some(Cow::Borrowed(text.as_bytes()));
    }

    let mut out = Vec::with_capacity(text.len());
    let mut buf = [0u8; 4];
    for c in text.chars() {
        match u8::try_from(c) {
            Ok(byte) if byte < 0x80 || is_c1(byte) => out.push(byte),
            _ => {
                let (bytes, _, had_unmappable) = encoding.encode(c.encode_utf8(&mut buf));
                // Superset-only characters land in 0x80..=0x9F.
                if had_unmappable || bytes.iter().copied().any(is_c1) {
                    return None;
                }
                out.extend_from_slice(&bytes);
            }
        }
    }
    Some(Cow::Owned(out))
}

/// Whether every non-ASCII byte belongs to a well-formed narrow EUC pair.
fn is_narrow_euc(bytes: &[u8], lead_max: u8) -> bool {
    let mut iter = bytes.iter().copied();
    while let Some(byte) = iter.next() {
        if byte < 0x80 {
            continue;
        }
        if !(0xA1..=lead_max).contains(&byte) {
            return false;
        }
        match iter.next() {
            Some(trail) if (0xA1..=0xFE).contains(&trail) => {}
            _ => return false,
        }
    }
    true
}

/// Encoding every file is converted to, fixed for one invocation.
///
/// Only constructible from a label that resolves, so an engine never sees an
/// invalid target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetEncoding {
    label: String,
    codec: Codec,
}

impl TargetEncoding {
    /// Validate a user-supplied target label.
    ///
    /// # Errors
    /// Returns `EngineError::UnknownCodecName` when the label names no codec.
    pub fn from_label(label: &str) -> Result<Self, EngineError> {
        Codec::for_label(label)
            .map(|codec| Self {
                label: label.trim().to_ascii_lowercase(),
                codec,
            })
            .ok_or_else(|| EngineError::UnknownCodecName(label.to_string()))
    }

    /// Label as requested (lower-cased).
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Resolved codec.
    #[must_use]
    pub fn codec(&self) -> Codec {
        self.codec
    }

    /// Whether a detected encoding name already is this target.
    ///
    /// Compares names case-insensitively, then resolved codecs, so that
    /// aliases such as `utf8` / `UTF-8` or `latin1` / `iso-8859-1` agree.
    #[must_use]
    pub fn matches(&self, encoding: &str) -> bool {
        encoding.trim().eq_ignore_ascii_case(&self.label)
            || Codec::for_label(encoding).is_some_and(|codec| codec == self.codec)
    }
}

impl Default for TargetEncoding {
    fn default() -> Self {
        Self {
            label: "utf-8".to_string(),
            codec: Codec {
                name: "UTF-8",
                ..Codec::full(UTF_8)
            },
        }
    }
}

impl fmt::Display for TargetEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_resolve() {
        assert_eq!(Codec::for_label("UTF-8").unwrap().name(), "UTF-8");
        assert_eq!(Codec::for_label("utf8-sig").unwrap().name(), "UTF-8-SIG");
        assert_eq!(Codec::for_label("iso-8859-7").unwrap().name(), "ISO-8859-7");
        assert_eq!(Codec::for_label("MacCyrillic").unwrap().name(), "x-mac-cyrillic");
        assert_eq!(Codec::for_label("ascii").unwrap().name(), "us-ascii");
        assert!(Codec::for_label("replacement").is_none());
        assert!(Codec::for_label("no-such-codec").is_none());
    }

    #[test]
    fn test_legacy_labels_are_not_widened() {
        assert_eq!(Codec::for_label("latin1").unwrap().name(), "ISO-8859-1");
        assert_eq!(Codec::for_label("iso-8859-9").unwrap().name(), "ISO-8859-9");
        assert_eq!(Codec::for_label("tis-620").unwrap().name(), "ISO-8859-11");
        assert_eq!(Codec::for_label("gb2312").unwrap().name(), "GB2312");
        assert_eq!(Codec::for_label("euc-kr").unwrap().name(), "EUC-KR");
        assert_eq!(Codec::for_label("cp949").unwrap().name(), "windows-949");
        assert_eq!(Codec::for_label("windows-1252").unwrap().name(), "windows-1252");
        assert_ne!(Codec::for_label("iso-8859-1"), Codec::for_label("windows-1252"));
        assert_ne!(Codec::for_label("gb2312"), Codec::for_label("gbk"));
    }

    #[test]
    fn test_strict_decode() {
        let greek = Codec::for_label("iso-8859-7").unwrap();
        assert_eq!(greek.decode(&[0xe1, 0xf5, 0xf4, 0xdc]).unwrap(), "αυτά");

        let utf8 = Codec::for_label("utf-8").unwrap();
        assert!(utf8.decode(&[0xe1, 0xf5, 0xf4, 0xdc]).is_none());
    }

    #[test]
    fn test_strict_encode() {
        let greek = Codec::for_label("iso-8859-7").unwrap();
        assert_eq!(greek.encode("αυτά").unwrap().as_ref(), &[0xe1, 0xf5, 0xf4, 0xdc]);
        assert!(greek.encode("日本").is_none());

        let ascii = Codec::for_label("us-ascii").unwrap();
        assert!(ascii.encode("café").is_none());
        assert_eq!(ascii.encode("cafe").unwrap().as_ref(), b"cafe");
    }

    #[test]
    fn test_latin1_is_not_windows_1252() {
        let latin1 = Codec::for_label("iso-8859-1").unwrap();
        assert_eq!(latin1.encode("café").unwrap().as_ref(), b"caf\xe9");
        assert!(latin1.encode("5€").is_none());
        assert!(latin1.encode("“quoted”").is_none());
        assert_eq!(latin1.decode(&[0x80, 0x93, 0xe9]).unwrap(), "\u{80}\u{93}é");

        let cp1252 = Codec::for_label("windows-1252").unwrap();
        assert_eq!(cp1252.encode("5€").unwrap().as_ref(), b"5\x80");
    }

    #[test]
    fn test_iso_parts_keep_c1_range() {
        let turkish = Codec::for_label("iso-8859-9").unwrap();
        assert_eq!(turkish.encode("ğş").unwrap().as_ref(), &[0xf0, 0xfe]);
        assert!(turkish.encode("€").is_none());
        assert_eq!(turkish.decode(&[0x80, 0xf0]).unwrap(), "\u{80}ğ");
        assert_eq!(turkish.encode("\u{80}").unwrap().as_ref(), &[0x80]);

        let thai = Codec::for_label("iso-8859-11").unwrap();
        assert!(thai.encode("…").is_none());
        assert_eq!(thai.encode("ก").unwrap().as_ref(), &[0xa1]);
    }

    #[test]
    fn test_euc_targets_reject_extension_characters() {
        let gb2312 = Codec::for_label("gb2312").unwrap();
        assert_eq!(gb2312.encode("中文").unwrap().as_ref(), &[0xd6, 0xd0, 0xce, 0xc4]);
        // U+4E02 is only in the GBK extension.
        assert!(gb2312.encode("丂").is_none());
        assert!(Codec::for_label("gbk").unwrap().encode("丂").is_some());
        assert!(gb2312.decode(&[0x81, 0x40]).is_none());

        let euc_kr = Codec::for_label("euc-kr").unwrap();
        assert_eq!(euc_kr.encode("한").unwrap().as_ref(), &[0xc7, 0xd1]);
        // U+AC02 is only in the UHC extension.
        assert!(euc_kr.encode("갂").is_none());
        assert!(Codec::for_label("cp949").unwrap().encode("갂").is_some());
    }

    #[test]
    fn test_utf16_encode() {
        let le = Codec::for_label("utf-16le").unwrap();
        assert_eq!(le.encode("A").unwrap().as_ref(), &[0x41, 0x00]);
        let be = Codec::for_label("utf-16be").unwrap();
        assert_eq!(be.encode("A").unwrap().as_ref(), &[0x00, 0x41]);
    }

    #[test]
    fn test_document_decode_drops_matching_bom() {
        let utf8 = Codec::for_label("utf-8").unwrap();
        assert!(utf8.has_bom(b"\xEF\xBB\xBFhi"));
        assert_eq!(utf8.decode_document(b"\xEF\xBB\xBFhi").unwrap(), "hi");
        assert_eq!(utf8.decode(b"\xEF\xBB\xBFhi").unwrap(), "\u{feff}hi");

        let le = Codec::for_label("utf-16le").unwrap();
        assert_eq!(le.decode_document(&[0xff, 0xfe, 0x41, 0x00]).unwrap(), "A");
        assert!(!le.has_bom(&[0xfe, 0xff, 0x00, 0x41]));

        let any16 = Codec::for_label("utf-16").unwrap();
        assert_eq!(any16.decode_document(&[0xfe, 0xff, 0x00, 0x41]).unwrap(), "A");
        assert_eq!(any16.bom(), b"\xFF\xFE");
        assert_eq!(Codec::for_label("utf-8-sig").unwrap().bom(), b"\xEF\xBB\xBF");
        assert!(utf8.bom().is_empty());
    }

    #[test]
    fn test_target_matches_aliases() {
        let target = TargetEncoding::from_label("UTF-8").unwrap();
        assert_eq!(target.label(), "utf-8");
        assert!(target.matches("utf-8"));
        assert!(target.matches("utf8"));
        assert!(!target.matches("utf-8-sig"));
        assert!(!target.matches("iso-8859-7"));

        let latin1 = TargetEncoding::from_label("iso-8859-1").unwrap();
        assert!(latin1.matches("latin1"));
        assert!(!latin1.matches("windows-1252"));
    }

    #[test]
    fn test_unknown_target_rejected() {
        let err = TargetEncoding::from_label("klingon").unwrap_err();
        assert!(matches!(err, EngineError::UnknownCodecName(ref name) if name == "klingon"));
        assert_eq!(err.to_string(), "unknown encoding: klingon");
    }
}
