use std::{
    fmt::{self, Display, Formatter, Write},
    ops::{Deref, DerefMut},
};

use tracing::{debug, warn};

use crate::{
    codec,
    element::{Element, Value},
    schema::{self, HeaderKind},
    track::{self, MediaTrack, TrackKind},
    Error, FourCC, Result,
};

#[derive(Debug, Clone, PartialEq)]
struct Field {
    name: String,
    offset: usize,
    element: Element,
}

/// An ISO BMFF box: an ordered, name-keyed sequence of elements with
/// computed offsets and a total byte length.
#[derive(Debug, Clone, PartialEq)]
pub struct Mp4Box {
    kind: FourCC,
    fields: Vec<Field>,
    byte_length: usize,
}

impl Mp4Box {
    pub fn new(kind: impl Into<FourCC>) -> Result<Self> {
        Self::with_config(kind, &[])
    }

    /// Constructs a box of the given type, merging `config` over the
    /// schema defaults (caller wins).
    pub fn with_config(kind: impl Into<FourCC>, config: &[(&str, Value)]) -> Result<Self> {
        let kind = kind.into();
        let spec = schema::lookup(kind.as_bytes()).ok_or(Error::UnknownBoxType(kind))?;
        let mut r#box = Self {
            kind,
            fields: Vec::new(),
            byte_length: 0,
        };

        let merged = |name: &str| -> Option<Value> {
            config
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, value)| value.clone())
                .or_else(|| {
                    spec.config
                        .iter()
                        .find(|(n, _)| *n == name)
                        .map(|&(_, value)| Value::Int(value))
                })
        };

        match spec.header {
            HeaderKind::None => {}
            HeaderKind::Basic | HeaderKind::Full => {
                r#box.push("size", Element::UInt32(0), merged("size"))?;
                r#box.push("type", Element::CharArray(kind.to_string()), merged("type"))?;
                if spec.header == HeaderKind::Full {
                    r#box.push("version", Element::UInt8(0), merged("version"))?;
                    r#box.push("flags", Element::UInt24(0), merged("flags"))?;
                }
            }
        }
        for &(name, template) in spec.body {
            r#box.push(name, template.instantiate(), merged(name))?;
        }
        Ok(r#box)
    }

    fn push(&mut self, name: &str, mut element: Element, value: Option<Value>) -> Result<()> {
        if let Some(value) = value {
            element.set_value(name, value)?;
        }
        self.add(name, element)
    }

    pub fn kind(&self) -> FourCC {
        self.kind
    }

    pub fn byte_length(&self) -> usize {
        self.byte_length
    }

    /// Appends a new field after all existing fields, at an offset equal
    /// to the current byte length.
    pub fn add(&mut self, name: &str, element: Element) -> Result<()> {
        if self.fields.iter().any(|field| field.name == name) {
            return Err(Error::DuplicateField(name.to_owned()));
        }
        let offset = self.byte_length;
        self.byte_length += element.byte_length();
        self.fields.push(Field {
            name: name.to_owned(),
            offset,
            element,
        });
        Ok(())
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let field = self
            .fields
            .iter_mut()
            .find(|field| field.name == name)
            .ok_or_else(|| Error::UnknownField(name.to_owned()))?;
        let length_before = field.element.byte_length();
        field.element.set_value(name, value.into())?;
        if field.element.byte_length() != length_before {
            self.relayout();
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Value> {
        self.field(name)?.element.value()
    }

    pub fn offset(&self, name: &str) -> Result<usize> {
        Ok(self.field(name)?.offset)
    }

    fn field(&self, name: &str) -> Result<&Field> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .ok_or_else(|| Error::UnknownField(name.to_owned()))
    }

    // A length-changing assignment shifts every later field.
    fn relayout(&mut self) {
        let mut total = 0;
        for field in &mut self.fields {
            field.offset = total;
            total += field.element.byte_length();
        }
        self.byte_length = total;
    }

    /// Serializes into a freshly allocated buffer of exactly
    /// `byte_length` bytes.
    pub fn buffer(&mut self) -> Result<Vec<u8>> {
        let mut buf = vec![0; self.byte_length];
        self.copy(&mut buf, 0)?;
        Ok(buf)
    }

    /// Writes every element at its offset, patching the `size` field to
    /// the current byte length first.
    pub fn copy(&mut self, buf: &mut [u8], offset: usize) -> Result<()> {
        if self.fields.iter().any(|field| field.name == "size") {
            let size = self.byte_length as u64;
            self.set("size", size)?;
        }
        for field in &mut self.fields {
            let at = offset + field.offset;
            match &mut field.element {
                Element::Child(child) => child.copy(buf, at)?,
                element => element.write(buf, at)?,
            }
        }
        Ok(())
    }

    /// Refreshes every readable field from the buffer. Byte lengths are
    /// schema-determined and never change here.
    pub fn load(&mut self, buf: &[u8], offset: usize) -> Result<()> {
        for field in &mut self.fields {
            if matches!(field.element, Element::ByteArray(_)) {
                continue; // write-only payloads are never refreshed
            }
            field.element.read(buf, offset + field.offset)?;
        }
        self.warn_on_version_mismatch();
        Ok(())
    }

    // The parser only understands the single FullBox version declared in
    // the schema; other versions are passed through untouched.
    fn warn_on_version_mismatch(&self) {
        let Some(spec) = schema::lookup(self.kind.as_bytes()) else {
            return;
        };
        if spec.header != HeaderKind::Full {
            return;
        }
        let expected = spec
            .config
            .iter()
            .find(|(name, _)| *name == "version")
            .map_or(0, |&(_, value)| value);
        if let Ok(Value::Int(version)) = self.get("version") {
            if version != expected {
                warn!(
                    box_type = %self.kind,
                    expected,
                    actual = version,
                    "unsupported FullBox version, fields read with the declared layout"
                );
            }
        }
    }

    /// Child boxes of a container, in append order.
    pub fn children(&self) -> impl Iterator<Item = &Mp4Box> {
        self.fields.iter().filter_map(|field| match &field.element {
            Element::Child(child) => Some(child),
            _ => None,
        })
    }

    fn format_into(&self, out: &mut String, indent: usize) {
        let _ = writeln!(
            out,
            "{:indent$}[{}] ({})",
            "",
            self.kind,
            self.byte_length,
            indent = indent
        );
        for field in &self.fields {
            match &field.element {
                Element::Child(child) => child.format_into(out, indent + 2),
                element => {
                    let _ = writeln!(
                        out,
                        "{:indent$}{} = {} ({})",
                        "",
                        field.name,
                        render(element),
                        element.byte_length(),
                        indent = indent + 2
                    );
                }
            }
        }
    }
}

// Diagnostic only; never fails, inconsistencies render as "<?>".
fn render(element: &Element) -> String {
    match element.value() {
        Ok(Value::Int(value)) => value.to_string(),
        Ok(Value::Str(chars)) => chars.replace('\0', "\\0"),
        Ok(Value::Ints(values)) => format!("{values:?}"),
        Ok(Value::Bytes(bytes)) => format!("<{} bytes>", bytes.len()),
        Ok(Value::Sets(sets)) => format!("<{} parameter sets>", sets.len()),
        Err(_) => "<?>".to_owned(),
    }
}

impl Display for Mp4Box {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.format_into(&mut out, 0);
        f.write_str(&out)
    }
}

/// A box whose body is a sequence of child boxes, appended under the
/// synthetic names `box_0`, `box_1`, ...
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    inner: Mp4Box,
    children: usize,
}

impl Container {
    pub fn new(kind: impl Into<FourCC>) -> Result<Self> {
        Self::with_config(kind, &[])
    }

    pub fn with_config(kind: impl Into<FourCC>, config: &[(&str, Value)]) -> Result<Self> {
        Ok(Self {
            inner: Mp4Box::with_config(kind, config)?,
            children: 0,
        })
    }

    pub fn with_children(
        kind: impl Into<FourCC>,
        children: Vec<Mp4Box>,
    ) -> Result<Self> {
        let mut container = Self::new(kind)?;
        for child in children {
            container.append(child)?;
        }
        Ok(container)
    }

    pub fn append(&mut self, child: impl Into<Mp4Box>) -> Result<&mut Self> {
        let name = format!("box_{}", self.children);
        self.inner.add(&name, Element::Child(child.into()))?;
        self.children += 1;
        Ok(self)
    }

    /// Walks a byte sequence of boxes, appending each to this container
    /// and recursing into known container types. Encountered codec
    /// configuration yields the media tracks of the stream.
    pub fn parse(&mut self, mut input: &[u8]) -> Result<Vec<MediaTrack>> {
        let mut tracks = Vec::new();
        while !input.is_empty() {
            let size = codec::read_u32(input, 0)?;
            let raw = codec::read_bytes(input, 4, 4)?;
            let kind = FourCC([raw[0], raw[1], raw[2], raw[3]]);

            let advance = match schema::lookup(kind.as_bytes()) {
                // The synthetic headerless root never appears on the
                // wire; recursing into a zero-length header would stop
                // the input from shrinking.
                Some(spec) if spec.container && spec.header != HeaderKind::None => {
                    let mut child = Container::new(kind)?;
                    let header_end = child.byte_length();
                    let minimum = header_end.max(match spec.header {
                        HeaderKind::Full => 12,
                        _ => 8,
                    });
                    let body = bounded(input, size, minimum)?;
                    child.load(&body[..header_end], 0)?;
                    tracks.extend(child.parse(&body[header_end..])?);
                    self.append(child)?;
                    body.len()
                }
                Some(spec) => {
                    let minimum = match spec.header {
                        HeaderKind::Full => 12,
                        _ => 8,
                    };
                    let body = bounded(input, size, minimum)?;
                    let mut child = Mp4Box::new(kind)?;
                    child.load(body, 0)?;
                    if let Some(t) = discover(&child) {
                        debug!(box_type = %kind, kind = %t.kind, codec = %t.codec, "discovered media track");
                        tracks.push(t);
                    }
                    self.append(child)?;
                    body.len()
                }
                None => {
                    let body = bounded(input, size, 8)?;
                    let mut child = Mp4Box::new(FourCC(*b"...."))?;
                    child.load(body, 0)?;
                    // Preserve the box in-tree under its real type name.
                    child.kind = kind;
                    debug!(box_type = %kind, size, "kept unrecognized box opaque");
                    self.append(child)?;
                    body.len()
                }
            };
            input = &input[advance..];
        }
        Ok(tracks)
    }
}

/// The sub-slice a box of the given wire size occupies, after checking
/// it against the minimum header and the remaining input.
fn bounded(input: &[u8], size: u32, minimum: usize) -> Result<&[u8]> {
    let length = size as usize;
    if length < minimum {
        return Err(Error::MalformedSize { size, minimum });
    }
    if length > input.len() {
        return Err(Error::InsufficientBytes {
            offset: 0,
            needed: length,
            len: input.len(),
        });
    }
    Ok(&input[..length])
}

fn discover(child: &Mp4Box) -> Option<MediaTrack> {
    match child.kind().as_bytes() {
        b"avcC" => {
            let profile = child.get("AVCProfileIndication").ok()?.as_int()?;
            let compatibility = child.get("profile_compatibility").ok()?.as_int()?;
            let level = child.get("AVCLevelIndication").ok()?.as_int()?;
            Some(MediaTrack {
                kind: TrackKind::Video,
                codec: track::avc_codec(profile as u8, compatibility as u8, level as u8),
            })
        }
        b"esds" => {
            let config = child.get("audioConfigBytes").ok()?;
            let first = config.as_ints()?.first().copied()?;
            Some(MediaTrack {
                kind: TrackKind::Audio,
                codec: track::aac_codec((first as u8) >> 3),
            })
        }
        _ => None,
    }
}

impl Deref for Container {
    type Target = Mp4Box;

    fn deref(&self) -> &Mp4Box {
        &self.inner
    }
}

impl DerefMut for Container {
    fn deref_mut(&mut self) -> &mut Mp4Box {
        &mut self.inner
    }
}

impl From<Container> for Mp4Box {
    fn from(container: Container) -> Mp4Box {
        container.inner
    }
}

impl Display for Container {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.inner, f)
    }
}
