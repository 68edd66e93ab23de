use bstringify::bstringify;
use fixed_macro::types::{U16F16, U8F8};

use crate::element::Element;

/// Header synthesized in front of a box body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderKind {
    /// No header at all; only the synthetic `file` root uses this.
    None,
    /// u32 `size` + 4 char `type`.
    Basic,
    /// Basic header + u8 `version` + u24 `flags`.
    Full,
}

/// Default body field: the element kind and its default value in one.
#[derive(Debug, Clone, Copy)]
pub enum Template {
    Empty(usize),
    Chars(&'static str),
    U8(u8),
    U16(u16),
    U24(u32),
    U32(u32),
    U64(u64),
    U8List(&'static [u8]),
    U16List(&'static [u16]),
    U32List(&'static [u32]),
    ParameterSets(u8),
}

impl Template {
    pub fn instantiate(self) -> Element {
        match self {
            Template::Empty(length) => Element::Empty(length),
            Template::Chars(chars) => Element::CharArray(chars.to_owned()),
            Template::U8(value) => Element::UInt8(value),
            Template::U16(value) => Element::UInt16(value),
            Template::U24(value) => Element::UInt24(value),
            Template::U32(value) => Element::UInt32(value),
            Template::U64(value) => Element::UInt64(value),
            Template::U8List(values) => Element::UInt8Array(values.to_owned()),
            Template::U16List(values) => Element::UInt16Array(values.to_owned()),
            Template::U32List(values) => Element::UInt32Array(values.to_owned()),
            Template::ParameterSets(mask) => Element::ParameterSetArray {
                mask,
                sets: Vec::new(),
            },
        }
    }
}

/// Static description of one recognized box type.
#[derive(Debug)]
pub struct BoxSpec {
    pub header: HeaderKind,
    pub container: bool,
    /// The box type this one nests under, for reference.
    pub parent: &'static str,
    /// Header overrides applied over the synthesized defaults.
    pub config: &'static [(&'static str, u64)],
    pub body: &'static [(&'static str, Template)],
}

static UNITY_MATRIX: [u32; 9] = [
    0x0001_0000,
    0,
    0,
    0,
    0x0001_0000,
    0,
    0,
    0,
    0x4000_0000,
];

static FILE: BoxSpec = BoxSpec {
    header: HeaderKind::None,
    container: true,
    parent: "",
    config: &[],
    body: &[],
};

// 4.3
static FTYP: BoxSpec = BoxSpec {
    header: HeaderKind::Basic,
    container: false,
    parent: "file",
    config: &[],
    body: &[
        ("major_brand", Template::Chars("isom")),
        ("minor_version", Template::U32(0)),
        ("compatible_brands", Template::Chars("mp41")),
    ],
};

// 8.1
static MOOV: BoxSpec = BoxSpec {
    header: HeaderKind::Basic,
    container: true,
    parent: "file",
    config: &[],
    body: &[],
};

// 8.3
static MVHD: BoxSpec = BoxSpec {
    header: HeaderKind::Full,
    container: false,
    parent: "moov",
    config: &[],
    body: &[
        ("creation_time", Template::U32(0)),
        ("modification_time", Template::U32(0)),
        ("timescale", Template::U32(1000)),
        ("duration", Template::U32(0xFFFF_FFFF)),
        ("rate", Template::U32(U16F16!(1).to_bits())),
        ("volume", Template::U16(U8F8!(1).to_bits())),
        ("reserved", Template::Empty(10)),
        ("matrix", Template::U32List(&UNITY_MATRIX)),
        ("pre_defined", Template::Empty(24)),
        ("next_track_ID", Template::U32(0xFFFF_FFFF)),
    ],
};

// 8.4
static TRAK: BoxSpec = BoxSpec {
    header: HeaderKind::Basic,
    container: true,
    parent: "moov",
    config: &[],
    body: &[],
};

// 8.5
static TKHD: BoxSpec = BoxSpec {
    header: HeaderKind::Full,
    container: false,
    parent: "trak",
    config: &[("flags", 0x000003)],
    body: &[
        ("creation_time", Template::U32(0)),
        ("modification_time", Template::U32(0)),
        ("track_ID", Template::U32(1)),
        ("reserved", Template::Empty(4)),
        ("duration", Template::U32(0)),
        ("reserved2", Template::Empty(8)),
        ("layer", Template::U16(0)),
        ("alternate_group", Template::U16(0)),
        ("volume", Template::U16(0)),
        ("reserved3", Template::Empty(2)),
        ("matrix", Template::U32List(&UNITY_MATRIX)),
        ("width", Template::U32(0)),
        ("height", Template::U32(0)),
    ],
};

// 8.7
static MDIA: BoxSpec = BoxSpec {
    header: HeaderKind::Basic,
    container: true,
    parent: "trak",
    config: &[],
    body: &[],
};

// 8.8
static MDHD: BoxSpec = BoxSpec {
    header: HeaderKind::Full,
    container: false,
    parent: "mdia",
    config: &[],
    body: &[
        ("creation_time", Template::U32(0)),
        ("modification_time", Template::U32(0)),
        ("timescale", Template::U32(1000)),
        ("duration", Template::U32(0xFFFF_FFFF)),
        ("language", Template::U16(0x55C4)), // und
        ("pre_defined", Template::U16(0)),
    ],
};

// 8.9
static HDLR: BoxSpec = BoxSpec {
    header: HeaderKind::Full,
    container: false,
    parent: "mdia",
    config: &[],
    body: &[
        ("pre_defined", Template::U32(0)),
        ("handler_type", Template::Chars("vide")),
        ("reserved", Template::Empty(12)),
        ("name", Template::Chars("VideoHandler\0")),
    ],
};

// 8.10
static MINF: BoxSpec = BoxSpec {
    header: HeaderKind::Basic,
    container: true,
    parent: "mdia",
    config: &[],
    body: &[],
};

// 8.11.2
static VMHD: BoxSpec = BoxSpec {
    header: HeaderKind::Full,
    container: false,
    parent: "minf",
    config: &[("flags", 0x000001)],
    body: &[
        ("graphicsmode", Template::U16(0)),
        ("opcolor", Template::U16List(&[0, 0, 0])),
    ],
};

// 8.11.3
static SMHD: BoxSpec = BoxSpec {
    header: HeaderKind::Full,
    container: false,
    parent: "minf",
    config: &[],
    body: &[
        ("balance", Template::U16(0)),
        ("reserved", Template::Empty(2)),
    ],
};

// 8.12
static DINF: BoxSpec = BoxSpec {
    header: HeaderKind::Basic,
    container: true,
    parent: "minf",
    config: &[],
    body: &[],
};

// 8.13
static DREF: BoxSpec = BoxSpec {
    header: HeaderKind::Full,
    container: true,
    parent: "dinf",
    config: &[],
    body: &[("entry_count", Template::U32(1))],
};

static URL: BoxSpec = BoxSpec {
    header: HeaderKind::Full,
    container: false,
    parent: "dref",
    config: &[("flags", 0x000001)],
    body: &[],
};

// 8.14
static STBL: BoxSpec = BoxSpec {
    header: HeaderKind::Basic,
    container: true,
    parent: "minf",
    config: &[],
    body: &[],
};

// 8.16
static STSD: BoxSpec = BoxSpec {
    header: HeaderKind::Full,
    container: true,
    parent: "stbl",
    config: &[],
    body: &[("entry_count", Template::U32(1))],
};

// 8.15.2
static STTS: BoxSpec = BoxSpec {
    header: HeaderKind::Full,
    container: false,
    parent: "stbl",
    config: &[],
    body: &[("entry_count", Template::U32(0))],
};

// 8.18
static STSC: BoxSpec = BoxSpec {
    header: HeaderKind::Full,
    container: false,
    parent: "stbl",
    config: &[],
    body: &[("entry_count", Template::U32(0))],
};

// 8.17.2
static STSZ: BoxSpec = BoxSpec {
    header: HeaderKind::Full,
    container: false,
    parent: "stbl",
    config: &[],
    body: &[
        ("sample_size", Template::U32(0)),
        ("sample_count", Template::U32(0)),
    ],
};

// 8.19
static STCO: BoxSpec = BoxSpec {
    header: HeaderKind::Full,
    container: false,
    parent: "stbl",
    config: &[],
    body: &[("entry_count", Template::U32(0))],
};

// 8.20
static STSS: BoxSpec = BoxSpec {
    header: HeaderKind::Full,
    container: false,
    parent: "stbl",
    config: &[],
    body: &[("entry_count", Template::U32(0))],
};

////////////////////////////////////////////////////////////////////////////////////////////////////
// ISO/IEC 14496-15 5.3.4
////////////////////////////////////////////////////////////////////////////////////////////////////

static AVC1: BoxSpec = BoxSpec {
    header: HeaderKind::Basic,
    container: true,
    parent: "stsd",
    config: &[],
    body: &[
        ("reserved", Template::Empty(6)),
        ("data_reference_index", Template::U16(1)),
        ("pre_defined", Template::U16(0)),
        ("reserved2", Template::Empty(2)),
        ("pre_defined2", Template::U32List(&[0, 0, 0])),
        ("width", Template::U16(1920)),
        ("height", Template::U16(1080)),
        ("horizresolution", Template::U32(U16F16!(72).to_bits())),
        ("vertresolution", Template::U32(U16F16!(72).to_bits())),
        ("reserved3", Template::Empty(4)),
        ("frame_count", Template::U16(1)),
        ("compressorname", Template::Empty(32)),
        ("depth", Template::U16(0x0018)),
        ("pre_defined3", Template::U16(0xFFFF)),
    ],
};

static AVCC: BoxSpec = BoxSpec {
    header: HeaderKind::Basic,
    container: false,
    parent: "avc1",
    config: &[],
    body: &[
        ("configurationVersion", Template::U8(1)),
        ("AVCProfileIndication", Template::U8(0x4D)),
        ("profile_compatibility", Template::U8(0)),
        ("AVCLevelIndication", Template::U8(0x29)),
        ("lengthSizeMinusOne", Template::U8(0xFF)),
        ("sequenceParameterSets", Template::ParameterSets(0xE0)),
        ("pictureParameterSets", Template::ParameterSets(0x00)),
    ],
};

////////////////////////////////////////////////////////////////////////////////////////////////////
// ISO/IEC 14496-14 5.6
////////////////////////////////////////////////////////////////////////////////////////////////////

static MP4A: BoxSpec = BoxSpec {
    header: HeaderKind::Basic,
    container: true,
    parent: "stsd",
    config: &[],
    body: &[
        ("reserved", Template::Empty(6)),
        ("data_reference_index", Template::U16(1)),
        ("reserved2", Template::Empty(8)),
        ("channelcount", Template::U16(2)),
        ("samplesize", Template::U16(16)),
        ("pre_defined", Template::U16(0)),
        ("reserved3", Template::Empty(2)),
        ("samplerate", Template::U32(U16F16!(48000).to_bits())),
    ],
};

// ES_Descriptor, DecoderConfigDescriptor, DecoderSpecificInfoShort and
// SLConfigDescriptor flattened into one fixed layout (ISO/IEC 14496-1).
static ESDS: BoxSpec = BoxSpec {
    header: HeaderKind::Full,
    container: false,
    parent: "mp4a",
    config: &[],
    body: &[
        ("ES_DescrTag", Template::U8(3)),
        ("ES_DescrLength", Template::U8(25)),
        ("ES_ID", Template::U16(1)),
        ("streamDependenceFlags", Template::U8(0)),
        ("DecoderConfigDescrTag", Template::U8(4)),
        ("DecoderConfigDescrLength", Template::U8(15)),
        ("objectTypeIndication", Template::U8(0x40)),
        ("streamType_upStream_reserved", Template::U8(0x15)),
        ("bufferSizeDB", Template::U24(0)),
        ("maxBitRate", Template::U32(0)),
        ("avgBitRate", Template::U32(0)),
        ("DecSpecificInfoShortTag", Template::U8(5)),
        ("DecSpecificInfoShortLength", Template::U8(2)),
        ("audioConfigBytes", Template::U8List(&[0x00, 0x00])),
        ("SLConfigDescrTag", Template::U8(6)),
        ("SLConfigDescrLength", Template::U8(1)),
        ("SLConfigValue", Template::U8(2)),
    ],
};

////////////////////////////////////////////////////////////////////////////////////////////////////
// ISO/IEC 14496-12:2005 8.29-8.36 (movie fragments)
////////////////////////////////////////////////////////////////////////////////////////////////////

static MVEX: BoxSpec = BoxSpec {
    header: HeaderKind::Basic,
    container: true,
    parent: "moov",
    config: &[],
    body: &[],
};

static MEHD: BoxSpec = BoxSpec {
    header: HeaderKind::Full,
    container: false,
    parent: "mvex",
    config: &[],
    body: &[("fragment_duration", Template::U32(0))],
};

static TREX: BoxSpec = BoxSpec {
    header: HeaderKind::Full,
    container: false,
    parent: "mvex",
    config: &[],
    body: &[
        ("track_ID", Template::U32(1)),
        ("default_sample_description_index", Template::U32(1)),
        ("default_sample_duration", Template::U32(0)),
        ("default_sample_size", Template::U32(0)),
        ("default_sample_flags", Template::U32(0)),
    ],
};

static MOOF: BoxSpec = BoxSpec {
    header: HeaderKind::Basic,
    container: true,
    parent: "file",
    config: &[],
    body: &[],
};

static MFHD: BoxSpec = BoxSpec {
    header: HeaderKind::Full,
    container: false,
    parent: "moof",
    config: &[],
    body: &[("sequence_number", Template::U32(0))],
};

static TRAF: BoxSpec = BoxSpec {
    header: HeaderKind::Basic,
    container: true,
    parent: "moof",
    config: &[],
    body: &[],
};

static TFHD: BoxSpec = BoxSpec {
    header: HeaderKind::Full,
    container: false,
    parent: "traf",
    config: &[("flags", 0x000020)],
    body: &[
        ("track_ID", Template::U32(1)),
        ("default_sample_flags", Template::U32(0)),
    ],
};

static TFDT: BoxSpec = BoxSpec {
    header: HeaderKind::Full,
    container: false,
    parent: "traf",
    config: &[("version", 1)],
    body: &[("baseMediaDecodeTime", Template::U64(0))],
};

static TRUN: BoxSpec = BoxSpec {
    header: HeaderKind::Full,
    container: false,
    parent: "traf",
    config: &[("flags", 0x000305)],
    body: &[
        ("sample_count", Template::U32(1)),
        ("data_offset", Template::U32(0)),
        ("first_sample_flags", Template::U32(0)),
        ("sample_duration", Template::U32(0)),
        ("sample_size", Template::U32(0)),
    ],
};

// 8.2
static MDAT: BoxSpec = BoxSpec {
    header: HeaderKind::Basic,
    container: false,
    parent: "file",
    config: &[],
    body: &[],
};

// 8.25
static EDTS: BoxSpec = BoxSpec {
    header: HeaderKind::Basic,
    container: true,
    parent: "trak",
    config: &[],
    body: &[],
};

// 8.26
static ELST: BoxSpec = BoxSpec {
    header: HeaderKind::Full,
    container: false,
    parent: "edts",
    config: &[],
    body: &[
        ("entry_count", Template::U32(1)),
        ("segment_duration", Template::U32(0)),
        ("media_time", Template::U32(0xFFFF_FFFF)),
        ("media_rate_integer", Template::U16(1)),
        ("media_rate_fraction", Template::U16(0)),
    ],
};

/// Opaque stand-in constructed while parsing unrecognized types.
static FALLBACK: BoxSpec = BoxSpec {
    header: HeaderKind::Basic,
    container: false,
    parent: "",
    config: &[],
    body: &[],
};

macro_rules! registry {
    ($($name:ident => $spec:ident),* $(,)?) => {
        /// Every registered box type, `url ` and the `....` sentinel included.
        pub fn kinds() -> &'static [[u8; 4]] {
            const KINDS: &[[u8; 4]] = &[$(*bstringify!($name),)* *b"url ", *b"...."];
            KINDS
        }

        pub fn lookup(kind: &[u8; 4]) -> Option<&'static BoxSpec> {
            match kind {
                $(bstringify!($name) => Some(&$spec),)*
                b"url " => Some(&URL),
                b"...." => Some(&FALLBACK),
                _ => None,
            }
        }
    };
}

registry! {
    file => FILE,
    ftyp => FTYP,
    moov => MOOV,
    mvhd => MVHD,
    trak => TRAK,
    tkhd => TKHD,
    mdia => MDIA,
    mdhd => MDHD,
    hdlr => HDLR,
    minf => MINF,
    vmhd => VMHD,
    smhd => SMHD,
    dinf => DINF,
    dref => DREF,
    stbl => STBL,
    stsd => STSD,
    stts => STTS,
    stsc => STSC,
    stsz => STSZ,
    stco => STCO,
    stss => STSS,
    avc1 => AVC1,
    avcC => AVCC,
    mp4a => MP4A,
    esds => ESDS,
    mvex => MVEX,
    mehd => MEHD,
    trex => TREX,
    moof => MOOF,
    mfhd => MFHD,
    traf => TRAF,
    tfhd => TFHD,
    tfdt => TFDT,
    trun => TRUN,
    mdat => MDAT,
    edts => EDTS,
    elst => ELST,
}
