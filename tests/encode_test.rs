use fmp4box::{
    AudioParameters, Container, Element, InitSegment, MediaSegment, Mp4Box, Result, TrackKind,
    Value, VideoParameters,
};

const SPS: [u8; 20] = [
    0x67, 0x4D, 0x00, 0x29, 0xE2, 0x90, 0x0F, 0x00, 0x44, 0xFC, 0xB8, 0x0B, 0x70, 0x10, 0x10,
    0x1A, 0x41, 0xE2, 0x44, 0x54,
];
const PPS: [u8; 4] = [0x68, 0xEE, 0x3C, 0x80];

#[test]
fn ftyp_serializes_to_the_reference_bytes() -> Result<()> {
    let mut ftyp = Mp4Box::new(b"ftyp")?;
    assert_eq!(ftyp.byte_length(), 20);
    assert_eq!(
        ftyp.buffer()?,
        [
            0x00, 0x00, 0x00, 0x14, 0x66, 0x74, 0x79, 0x70, 0x69, 0x73, 0x6F, 0x6D, 0x00, 0x00,
            0x00, 0x00, 0x6D, 0x70, 0x34, 0x31,
        ]
    );
    Ok(())
}

#[test]
fn empty_moov_is_a_bare_header() -> Result<()> {
    let mut moov = Container::new(b"moov")?;
    assert_eq!(moov.byte_length(), 8);
    assert_eq!(moov.buffer()?, [0x00, 0x00, 0x00, 0x08, 0x6D, 0x6F, 0x6F, 0x76]);
    Ok(())
}

#[test]
fn tfhd_defaults() -> Result<()> {
    let mut tfhd = Mp4Box::new(b"tfhd")?;
    assert_eq!(tfhd.byte_length(), 20);

    let buf = tfhd.buffer()?;
    assert_eq!(&buf[8..12], [0x00, 0x00, 0x00, 0x20]); // version 0, flags 0x000020
    assert_eq!(&buf[12..16], [0x00, 0x00, 0x00, 0x01]); // track_ID
    assert_eq!(&buf[16..20], [0x00, 0x00, 0x00, 0x00]); // default_sample_flags
    Ok(())
}

#[test]
fn tfdt_carries_a_version_one_u64_decode_time() -> Result<()> {
    let mut tfdt = Mp4Box::new(b"tfdt")?;
    assert_eq!(tfdt.byte_length(), 20);

    tfdt.set("baseMediaDecodeTime", 0x1_0000_0000u64)?;
    assert_eq!(
        tfdt.get("baseMediaDecodeTime")?,
        Value::Int(4_294_967_296)
    );

    let buf = tfdt.buffer()?;
    assert_eq!(buf[8], 0x01);
    assert_eq!(&buf[12..20], [0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00]);
    Ok(())
}

#[test]
fn avcc_frames_its_parameter_sets() -> Result<()> {
    let mut avcc = Mp4Box::with_config(
        b"avcC",
        &[
            ("sequenceParameterSets", Value::Sets(vec![SPS.to_vec()])),
            ("pictureParameterSets", Value::Sets(vec![PPS.to_vec()])),
        ],
    )?;
    assert_eq!(avcc.byte_length(), 8 + 5 + (1 + 2 + 20) + (1 + 2 + 4));

    let buf = avcc.buffer()?;
    assert_eq!(buf[13], 0xE1); // mask 0xE0 | one SPS
    assert_eq!(&buf[14..16], [0x00, 0x14]);
    assert_eq!(&buf[16..36], SPS);
    assert_eq!(buf[36], 0x01);
    assert_eq!(&buf[37..39], [0x00, 0x04]);
    assert_eq!(&buf[39..43], PPS);
    Ok(())
}

#[test]
fn container_length_is_header_plus_children() -> Result<()> {
    let mvhd = Mp4Box::new(b"mvhd")?;
    assert_eq!(mvhd.byte_length(), 108);

    let mut moov = Container::new(b"moov")?;
    moov.append(mvhd)?;
    moov.append(Container::new(b"mvex")?)?;
    assert_eq!(moov.byte_length(), 8 + 108 + 8);

    let buf = moov.buffer()?;
    assert_eq!(&buf[0..4], (8u32 + 108 + 8).to_be_bytes());
    assert_eq!(&buf[8..12], 108u32.to_be_bytes());
    Ok(())
}

#[test]
fn every_registered_type_serializes_to_its_declared_length() -> Result<()> {
    for kind in fmp4box::schema::kinds() {
        let mut r#box = Mp4Box::new(kind)?;
        let length = r#box.byte_length();
        let buf = r#box.buffer()?;
        assert_eq!(buf.len(), length, "{kind:?}");
        if kind != b"file" {
            assert_eq!(&buf[0..4], (length as u32).to_be_bytes(), "{kind:?}");
            assert_eq!(&buf[4..8], kind, "{kind:?}");
        }
    }
    Ok(())
}

#[test]
fn mdat_payload_is_appended_verbatim() -> Result<()> {
    let payload = vec![0xAB; 17];
    let mut mdat = Mp4Box::new(b"mdat")?;
    mdat.add("data", Element::ByteArray(payload.clone()))?;
    assert_eq!(mdat.byte_length(), 8 + 17);

    let buf = mdat.buffer()?;
    assert_eq!(&buf[0..4], 25u32.to_be_bytes());
    assert_eq!(&buf[8..], payload);
    Ok(())
}

#[test]
fn media_segment_points_data_offset_at_the_mdat_payload() -> Result<()> {
    let payload = vec![0x42; 64];
    let segment = MediaSegment {
        sequence_number: 7,
        track_id: 1,
        base_media_decode_time: 0x1_0000_0000,
        sample_duration: 3600,
        payload: payload.clone(),
    };
    let buf = segment.build()?;

    let moof_size = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;
    assert_eq!(&buf[4..8], b"moof");
    assert_eq!(&buf[moof_size + 4..moof_size + 8], b"mdat");
    assert_eq!(buf.len(), moof_size + 8 + payload.len());

    // moof(8) mfhd(16) traf(8) tfhd(20) tfdt(20) trun(12 + 20)
    assert_eq!(moof_size, 104);
    let data_offset = u32::from_be_bytes([buf[88], buf[89], buf[90], buf[91]]) as usize;
    assert_eq!(data_offset, moof_size + 8);
    assert_eq!(&buf[data_offset..], payload);
    Ok(())
}

#[test]
fn init_segment_round_trips_through_the_parser() -> Result<()> {
    let init = InitSegment {
        video: Some(VideoParameters {
            width: 1280,
            height: 720,
            timescale: 90000,
            sps: vec![SPS.to_vec()],
            pps: vec![PPS.to_vec()],
        }),
        audio: Some(AudioParameters {
            channels: 2,
            sample_rate: 48000,
            config: vec![0x11, 0x90],
        }),
    };
    let buf = init.build()?;
    assert_eq!(&buf[4..8], b"ftyp");

    let mut root = Container::new(b"file")?;
    let tracks = root.parse(&buf)?;
    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].kind, TrackKind::Video);
    assert_eq!(tracks[0].codec, "avc1.4d0029");
    assert_eq!(tracks[1].kind, TrackKind::Audio);
    assert_eq!(tracks[1].codec, "mp4a.40.2");
    Ok(())
}
