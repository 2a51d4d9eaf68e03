//
// Copyright (c) 2023 ZettaScale Technology
//
// This program and the accompanying materials are made available under the
// terms of the Eclipse Public License 2.0 which is available at
// http://www.eclipse.org/legal/epl-2.0, or the Apache License, Version 2.0
// which is available at https://www.apache.org/licenses/LICENSE-2.0.
//
// SPDX-License-Identifier: EPL-2.0 OR Apache-2.0
//
// Contributors:
//   ZettaScale Zenoh Team, <zenoh@zettascale.tech>
//
use std::borrow::Cow;
use std::convert::TryFrom;
use std::fmt;

use crate::result::KResult;

/// The encoding of a [`Value`](crate::Value) payload.
///
/// An encoding is a MIME-like `prefix` plus an optional free-form `suffix`.
/// Its string form is `prefix` alone or `prefix+suffix`; since the prefix may
/// itself contain `+`, parsing splits on the last one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Encoding {
    prefix: Cow<'static, str>,
    suffix: Cow<'static, str>,
}

impl Encoding {
    pub const SERIALIZED: Encoding = Encoding::from_static("keybus/serialized");
    pub const APPLICATION_OCTET_STREAM: Encoding =
        Encoding::from_static("application/octet-stream");
    pub const TEXT_PLAIN: Encoding = Encoding::from_static("text/plain");
    pub const APPLICATION_JSON: Encoding = Encoding::from_static("application/json");
    pub const APPLICATION_XML: Encoding = Encoding::from_static("application/xml");
    pub const APPLICATION_YAML: Encoding = Encoding::from_static("application/yaml");
    pub const APPLICATION_TOML: Encoding = Encoding::from_static("application/toml");
    pub const APPLICATION_PROTOBUF: Encoding = Encoding::from_static("application/protobuf");
    pub const APPLICATION_MSGPACK: Encoding = Encoding::from_static("application/msgpack");
    pub const APPLICATION_JSON5: Encoding = Encoding::from_static("application/json5");
    pub const TEXT_JSON: Encoding = Encoding::from_static("text/json");
    pub const TEXT_XML: Encoding = Encoding::from_static("text/xml");
    pub const TEXT_HTML: Encoding = Encoding::from_static("text/html");
    pub const TEXT_CSS: Encoding = Encoding::from_static("text/css");
    pub const TEXT_JAVASCRIPT: Encoding = Encoding::from_static("text/javascript");
    pub const IMAGE_JPEG: Encoding = Encoding::from_static("image/jpeg");
    pub const IMAGE_PNG: Encoding = Encoding::from_static("image/png");
    pub const IMAGE_GIF: Encoding = Encoding::from_static("image/gif");
    pub const VIDEO_MP4: Encoding = Encoding::from_static("video/mp4");
    pub const VIDEO_WEBM: Encoding = Encoding::from_static("video/webm");
    pub const AUDIO_MP3: Encoding = Encoding::from_static("audio/mp3");
    pub const AUDIO_WAV: Encoding = Encoding::from_static("audio/wav");
    pub const MULTIPART_MIXED: Encoding = Encoding::from_static("multipart/mixed");
    pub const MULTIPART_FORM_DATA: Encoding = Encoding::from_static("multipart/form-data");

    /// All the preset encodings.
    pub const PRESETS: &'static [Encoding] = &[
        Encoding::SERIALIZED,
        Encoding::APPLICATION_OCTET_STREAM,
        Encoding::TEXT_PLAIN,
        Encoding::APPLICATION_JSON,
        Encoding::APPLICATION_XML,
        Encoding::APPLICATION_YAML,
        Encoding::APPLICATION_TOML,
        Encoding::APPLICATION_PROTOBUF,
        Encoding::APPLICATION_MSGPACK,
        Encoding::APPLICATION_JSON5,
        Encoding::TEXT_JSON,
        Encoding::TEXT_XML,
        Encoding::TEXT_HTML,
        Encoding::TEXT_CSS,
        Encoding::TEXT_JAVASCRIPT,
        Encoding::IMAGE_JPEG,
        Encoding::IMAGE_PNG,
        Encoding::IMAGE_GIF,
        Encoding::VIDEO_MP4,
        Encoding::VIDEO_WEBM,
        Encoding::AUDIO_MP3,
        Encoding::AUDIO_WAV,
        Encoding::MULTIPART_MIXED,
        Encoding::MULTIPART_FORM_DATA,
    ];

    /// Builds an encoding with the given prefix and no suffix.
    pub fn new<P: Into<Cow<'static, str>>>(prefix: P) -> Self {
        Encoding {
            prefix: prefix.into(),
            suffix: Cow::Borrowed(""),
        }
    }

    pub const fn from_static(prefix: &'static str) -> Self {
        Encoding {
            prefix: Cow::Borrowed(prefix),
            suffix: Cow::Borrowed(""),
        }
    }

    /// Returns a copy of `self` with the given suffix.
    pub fn with_suffix<S: Into<Cow<'static, str>>>(&self, suffix: S) -> Self {
        Encoding {
            prefix: self.prefix.clone(),
            suffix: suffix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Returns `true` if `self` and `other` have the same prefix, whatever
    /// their suffixes.
    pub fn matches(&self, other: &Encoding) -> bool {
        self.prefix == other.prefix
    }

    pub fn is_text(&self) -> bool {
        self.prefix.starts_with("text")
    }

    pub fn is_json(&self) -> bool {
        matches!(
            self.prefix.as_ref(),
            "application/json" | "text/json" | "application/json5"
        )
    }

    pub fn is_binary(&self) -> bool {
        matches!(
            self.prefix.as_ref(),
            "application/octet-stream" | "application/protobuf" | "application/msgpack"
        )
    }

    /// Serializes the encoding to its string form as bytes. Fails on an empty
    /// prefix: there is no string form to round-trip it through.
    pub fn to_bytes(&self) -> KResult<Vec<u8>> {
        if self.prefix.is_empty() {
            bail!("Unable to serialize an encoding with an empty prefix");
        }
        Ok(self.to_string().into_bytes())
    }

    /// Deserializes an encoding from its string form.
    pub fn from_bytes(data: &[u8]) -> KResult<Encoding> {
        if data.is_empty() {
            bail!("Unable to deserialize an encoding from empty bytes");
        }
        let s = std::str::from_utf8(data)
            .map_err(|e| kerror!(e => "Unable to deserialize an encoding: invalid UTF-8"))?;
        Ok(Self::split(s))
    }

    fn split(s: &str) -> Encoding {
        match s.rfind('+') {
            Some(i) => Encoding {
                prefix: Cow::Owned(s[..i].to_owned()),
                suffix: Cow::Owned(s[(i + 1)..].to_owned()),
            },
            None => Encoding {
                prefix: Cow::Owned(s.to_owned()),
                suffix: Cow::Borrowed(""),
            },
        }
    }
}

impl Default for Encoding {
    fn default() -> Self {
        Encoding::APPLICATION_OCTET_STREAM
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.suffix.is_empty() {
            write!(f, "{}", self.prefix)
        } else {
            write!(f, "{}+{}", self.prefix, self.suffix)
        }
    }
}

impl TryFrom<&str> for Encoding {
    type Error = crate::Error;
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        if value.is_empty() {
            bail!("Unable to parse an encoding from an empty string");
        }
        Ok(Self::split(value))
    }
}

impl TryFrom<String> for Encoding {
    type Error = crate::Error;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::TryFrom;

    #[test]
    fn encoding_string_form() {
        assert_eq!(Encoding::TEXT_PLAIN.to_string(), "text/plain");
        let utf8 = Encoding::TEXT_PLAIN.with_suffix("utf-8");
        assert_eq!(utf8.to_string(), "text/plain+utf-8");

        assert_eq!(Encoding::try_from("text/plain").unwrap(), Encoding::TEXT_PLAIN);
        let parsed = Encoding::try_from("text/plain+utf-8").unwrap();
        assert_eq!(parsed.prefix(), "text/plain");
        assert_eq!(parsed.suffix(), "utf-8");
        // The split happens on the last `+`.
        let odd = Encoding::try_from("a+b+c").unwrap();
        assert_eq!(odd.prefix(), "a+b");
        assert_eq!(odd.suffix(), "c");
        assert!(Encoding::try_from("").is_err());
    }

    #[test]
    fn encoding_presets() {
        assert_eq!(Encoding::PRESETS.len(), 24);
        for preset in Encoding::PRESETS {
            assert!(!preset.prefix().is_empty());
            assert!(preset.suffix().is_empty());
            // Every preset round-trips through its string form.
            assert_eq!(&Encoding::try_from(preset.to_string()).unwrap(), preset);
        }
    }

    #[test]
    fn encoding_bytes() {
        let utf8 = Encoding::TEXT_PLAIN.with_suffix("utf-8");
        let bytes = utf8.to_bytes().unwrap();
        assert_eq!(Encoding::from_bytes(&bytes).unwrap(), utf8);
        assert!(Encoding::new("").to_bytes().is_err());
        assert!(Encoding::from_bytes(b"").is_err());
        assert!(Encoding::from_bytes(&[0xff, 0xfe]).is_err());
    }

    #[test]
    fn encoding_classes() {
        assert!(Encoding::TEXT_PLAIN.matches(&Encoding::TEXT_PLAIN.with_suffix("utf-8")));
        assert!(!Encoding::TEXT_PLAIN.matches(&Encoding::TEXT_JSON));
        assert!(Encoding::TEXT_HTML.is_text());
        assert!(!Encoding::APPLICATION_JSON.is_text());
        assert!(Encoding::APPLICATION_JSON.is_json());
        assert!(Encoding::TEXT_JSON.is_json());
        assert!(Encoding::APPLICATION_JSON5.is_json());
        assert!(!Encoding::TEXT_PLAIN.is_json());
        assert!(Encoding::APPLICATION_OCTET_STREAM.is_binary());
        assert!(Encoding::APPLICATION_MSGPACK.is_binary());
        assert!(!Encoding::TEXT_PLAIN.is_binary());
        assert_eq!(Encoding::default(), Encoding::APPLICATION_OCTET_STREAM);
    }
}
