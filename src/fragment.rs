use derivative::Derivative;
use fixed::types::U16F16;
use fixed_macro::types::U8F8;

use crate::{
    boxes::{Container, Mp4Box},
    element::{Element, Value},
    Error, Result,
};

/// Codec parameters of one H.264 video track, as delivered by the
/// elementary stream.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct VideoParameters {
    pub width: u16,
    pub height: u16,
    /// Media timescale in ticks per second.
    pub timescale: u32,
    #[derivative(Debug = "ignore")]
    pub sps: Vec<Vec<u8>>,
    #[derivative(Debug = "ignore")]
    pub pps: Vec<Vec<u8>>,
}

impl VideoParameters {
    // Profile, compatibility and level live in bytes 1..4 of the SPS NAL
    // unit, directly behind the NAL header.
    fn profile_level(&self) -> (u8, u8, u8) {
        match self.sps.first() {
            Some(sps) if sps.len() >= 4 => (sps[1], sps[2], sps[3]),
            _ => (0x4D, 0x00, 0x29),
        }
    }
}

/// Codec parameters of one AAC audio track.
#[derive(Debug, Clone)]
pub struct AudioParameters {
    pub channels: u16,
    pub sample_rate: u32,
    /// The raw AudioSpecificConfig bytes.
    pub config: Vec<u8>,
}

/// Builds the `ftyp`/`moov` initialization segment declaring up to one
/// video and one audio track.
#[derive(Debug, Clone, Default)]
pub struct InitSegment {
    pub video: Option<VideoParameters>,
    pub audio: Option<AudioParameters>,
}

impl InitSegment {
    pub fn build(&self) -> Result<Vec<u8>> {
        let track_total = self.video.is_some() as u32 + self.audio.is_some() as u32;
        let mvhd = Mp4Box::with_config(
            b"mvhd",
            &[("next_track_ID", Value::from(track_total + 1))],
        )?;

        let mut moov = Container::new(b"moov")?;
        moov.append(mvhd)?;
        let mut mvex = Container::new(b"mvex")?;
        let mut track_id = 0;
        if let Some(video) = &self.video {
            track_id += 1;
            moov.append(video_trak(video, track_id)?)?;
            mvex.append(Mp4Box::with_config(
                b"trex",
                &[("track_ID", track_id.into())],
            )?)?;
        }
        if let Some(audio) = &self.audio {
            track_id += 1;
            moov.append(audio_trak(audio, track_id)?)?;
            mvex.append(Mp4Box::with_config(
                b"trex",
                &[("track_ID", track_id.into())],
            )?)?;
        }
        moov.append(mvex)?;

        let mut file = Container::new(b"file")?;
        file.append(Mp4Box::new(b"ftyp")?)?;
        file.append(moov)?;
        file.buffer()
    }
}

/// Builds one `moof`/`mdat` pair carrying a single sample for the given
/// track.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct MediaSegment {
    pub sequence_number: u32,
    pub track_id: u32,
    pub base_media_decode_time: u64,
    pub sample_duration: u32,
    #[derivative(Debug = "ignore")]
    pub payload: Vec<u8>,
}

impl MediaSegment {
    pub fn build(&self) -> Result<Vec<u8>> {
        let mfhd = Mp4Box::with_config(
            b"mfhd",
            &[("sequence_number", self.sequence_number.into())],
        )?;
        let tfhd = Mp4Box::with_config(b"tfhd", &[("track_ID", self.track_id.into())])?;
        let tfdt = Mp4Box::with_config(
            b"tfdt",
            &[("baseMediaDecodeTime", self.base_media_decode_time.into())],
        )?;
        let mut trun = Mp4Box::with_config(
            b"trun",
            &[
                ("sample_duration", self.sample_duration.into()),
                ("sample_size", (self.payload.len() as u32).into()),
            ],
        )?;

        // moof = 8 + mfhd + (8 + tfhd + tfdt + trun); the sample data
        // starts behind the 8 byte mdat header.
        let moof_length = 8
            + mfhd.byte_length()
            + 8
            + tfhd.byte_length()
            + tfdt.byte_length()
            + trun.byte_length();
        trun.set("data_offset", (moof_length + 8) as u64)?;

        let mut traf = Container::new(b"traf")?;
        traf.append(tfhd)?;
        traf.append(tfdt)?;
        traf.append(trun)?;
        let mut moof = Container::new(b"moof")?;
        moof.append(mfhd)?;
        moof.append(traf)?;

        let mut mdat = Mp4Box::new(b"mdat")?;
        mdat.add("data", Element::ByteArray(self.payload.clone()))?;

        let mut file = Container::new(b"file")?;
        file.append(moof)?;
        file.append(mdat)?;
        file.buffer()
    }
}

fn video_trak(parameters: &VideoParameters, track_id: u32) -> Result<Container> {
    let (profile, compatibility, level) = parameters.profile_level();
    let avcc = Mp4Box::with_config(
        b"avcC",
        &[
            ("AVCProfileIndication", profile.into()),
            ("profile_compatibility", compatibility.into()),
            ("AVCLevelIndication", level.into()),
            ("sequenceParameterSets", Value::Sets(parameters.sps.clone())),
            ("pictureParameterSets", Value::Sets(parameters.pps.clone())),
        ],
    )?;
    let mut avc1 = Container::with_config(
        b"avc1",
        &[
            ("width", parameters.width.into()),
            ("height", parameters.height.into()),
        ],
    )?;
    avc1.append(avcc)?;

    let mut stsd = Container::new(b"stsd")?;
    stsd.append(avc1)?;

    let mut minf = Container::new(b"minf")?;
    minf.append(Mp4Box::new(b"vmhd")?)?;
    minf.append(data_information()?)?;
    minf.append(sample_table(stsd)?)?;

    let mut mdia = Container::new(b"mdia")?;
    mdia.append(Mp4Box::with_config(
        b"mdhd",
        &[("timescale", parameters.timescale.into())],
    )?)?;
    mdia.append(Mp4Box::new(b"hdlr")?)?;
    mdia.append(minf)?;

    let tkhd = Mp4Box::with_config(
        b"tkhd",
        &[
            ("track_ID", track_id.into()),
            (
                "width",
                U16F16::from_num(parameters.width).to_bits().into(),
            ),
            (
                "height",
                U16F16::from_num(parameters.height).to_bits().into(),
            ),
        ],
    )?;

    let mut trak = Container::new(b"trak")?;
    trak.append(tkhd)?;
    trak.append(mdia)?;
    Ok(trak)
}

fn audio_trak(parameters: &AudioParameters, track_id: u32) -> Result<Container> {
    let samplerate = U16F16::checked_from_num(parameters.sample_rate).ok_or(
        Error::ValueOutOfRange {
            value: parameters.sample_rate as u64,
            width: 2,
        },
    )?;
    let config_length = parameters.config.len() as u64;
    let esds = Mp4Box::with_config(
        b"esds",
        &[
            ("ES_DescrLength", (23 + config_length).into()),
            ("DecoderConfigDescrLength", (15 + config_length).into()),
            ("DecSpecificInfoShortLength", config_length.into()),
            ("audioConfigBytes", Value::Bytes(parameters.config.clone())),
        ],
    )?;
    let mut mp4a = Container::with_config(
        b"mp4a",
        &[
            ("channelcount", parameters.channels.into()),
            ("samplerate", samplerate.to_bits().into()),
        ],
    )?;
    mp4a.append(esds)?;

    let mut stsd = Container::new(b"stsd")?;
    stsd.append(mp4a)?;

    let mut minf = Container::new(b"minf")?;
    minf.append(Mp4Box::new(b"smhd")?)?;
    minf.append(data_information()?)?;
    minf.append(sample_table(stsd)?)?;

    let mut mdia = Container::new(b"mdia")?;
    mdia.append(Mp4Box::with_config(
        b"mdhd",
        &[("timescale", parameters.sample_rate.into())],
    )?)?;
    mdia.append(Mp4Box::with_config(
        b"hdlr",
        &[
            ("handler_type", "soun".into()),
            ("name", "SoundHandler\0".into()),
        ],
    )?)?;
    mdia.append(minf)?;

    let tkhd = Mp4Box::with_config(
        b"tkhd",
        &[
            ("track_ID", track_id.into()),
            ("volume", U8F8!(1).to_bits().into()),
        ],
    )?;

    let mut trak = Container::new(b"trak")?;
    trak.append(tkhd)?;
    trak.append(mdia)?;
    Ok(trak)
}

fn sample_table(stsd: Container) -> Result<Container> {
    let mut stbl = Container::new(b"stbl")?;
    stbl.append(stsd)?;
    stbl.append(Mp4Box::new(b"stts")?)?;
    stbl.append(Mp4Box::new(b"stsc")?)?;
    stbl.append(Mp4Box::new(b"stsz")?)?;
    stbl.append(Mp4Box::new(b"stco")?)?;
    Ok(stbl)
}

fn data_information() -> Result<Container> {
    let mut dref = Container::new(b"dref")?;
    dref.append(Mp4Box::new(b"url ")?)?;
    let mut dinf = Container::new(b"dinf")?;
    dinf.append(dref)?;
    Ok(dinf)
}
