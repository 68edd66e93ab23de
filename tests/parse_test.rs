use fmp4box::{Container, Error, Mp4Box, Result, TrackKind, Value};

/// A minimal `moov` holding one `avcC` and one `esds`, nested the way
/// the parser encounters them inside sample descriptions.
fn moov_with_codec_config() -> Result<Container> {
    let avcc = Mp4Box::with_config(
        b"avcC",
        &[
            ("AVCProfileIndication", 0x4Du8.into()),
            ("profile_compatibility", 0x00u8.into()),
            ("AVCLevelIndication", 0x29u8.into()),
        ],
    )?;
    let mut avc1 = Container::new(b"avc1")?;
    avc1.append(avcc)?;

    let esds = Mp4Box::with_config(
        b"esds",
        &[("audioConfigBytes", Value::Bytes(vec![0x11, 0x90]))],
    )?;
    let mut mp4a = Container::new(b"mp4a")?;
    mp4a.append(esds)?;

    let mut stsd = Container::with_config(b"stsd", &[("entry_count", 2u32.into())])?;
    stsd.append(avc1)?;
    stsd.append(mp4a)?;

    let mut moov = Container::new(b"moov")?;
    moov.append(stsd)?;
    Ok(moov)
}

#[test]
fn parse_discovers_tracks_in_order() -> Result<()> {
    let buf = moov_with_codec_config()?.buffer()?;

    let mut root = Container::new(b"file")?;
    let tracks = root.parse(&buf)?;

    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].kind, TrackKind::Video);
    assert_eq!(tracks[0].codec, "avc1.4d0029");
    assert_eq!(tracks[1].kind, TrackKind::Audio);
    assert_eq!(tracks[1].codec, "mp4a.40.2");
    Ok(())
}

#[test]
fn parse_rebuilds_the_child_sequence() -> Result<()> {
    let mut moov = Container::new(b"moov")?;
    moov.append(Mp4Box::new(b"mvhd")?)?;
    moov.append(Container::new(b"trak")?)?;
    moov.append(Container::new(b"mvex")?)?;
    let buf = moov.buffer()?;

    let mut reparsed = Container::new(b"moov")?;
    reparsed.parse(&buf[8..])?;

    let expected: Vec<_> = moov.children().map(|c| (c.kind(), c.byte_length())).collect();
    let actual: Vec<_> = reparsed
        .children()
        .map(|c| (c.kind(), c.byte_length()))
        .collect();
    assert_eq!(actual, expected);
    Ok(())
}

#[test]
fn parsed_scalars_match_the_serialized_box() -> Result<()> {
    let mut tfhd = Mp4Box::with_config(
        b"tfhd",
        &[
            ("track_ID", 5u32.into()),
            ("default_sample_flags", 0x0101_0000u32.into()),
        ],
    )?;
    let buf = tfhd.buffer()?;

    let mut reloaded = Mp4Box::new(b"tfhd")?;
    reloaded.load(&buf, 0)?;
    for field in ["size", "type", "version", "flags", "track_ID", "default_sample_flags"] {
        assert_eq!(reloaded.get(field)?, tfhd.get(field)?, "{field}");
    }
    Ok(())
}

#[test]
fn unknown_boxes_are_kept_opaque_under_their_real_type() -> Result<()> {
    let mut buf = vec![0x00, 0x00, 0x00, 0x10];
    buf.extend_from_slice(b"wxyz");
    buf.extend_from_slice(&[0xDE; 8]);
    buf.extend_from_slice(&Mp4Box::new(b"ftyp")?.buffer()?);

    let mut root = Container::new(b"file")?;
    let tracks = root.parse(&buf)?;
    assert!(tracks.is_empty());

    let children: Vec<_> = root.children().collect();
    assert_eq!(children.len(), 2);
    assert_eq!(children[0].kind().as_bytes(), b"wxyz");
    assert_eq!(children[0].get("type")?, Value::Str("wxyz".to_owned()));
    assert_eq!(children[1].kind().as_bytes(), b"ftyp");
    Ok(())
}

#[test]
fn undersized_boxes_are_rejected() -> Result<()> {
    let mut buf = vec![0x00, 0x00, 0x00, 0x04];
    buf.extend_from_slice(b"free");

    let mut root = Container::new(b"file")?;
    assert!(matches!(
        root.parse(&buf),
        Err(Error::MalformedSize { size: 4, .. })
    ));
    Ok(())
}

#[test]
fn boxes_longer_than_the_input_are_rejected() -> Result<()> {
    let mut buf = vec![0x00, 0x00, 0x01, 0x00];
    buf.extend_from_slice(b"mdat");

    let mut root = Container::new(b"file")?;
    assert!(matches!(
        root.parse(&buf),
        Err(Error::InsufficientBytes { needed: 256, .. })
    ));
    Ok(())
}

#[test]
fn truncated_headers_are_rejected() -> Result<()> {
    let mut root = Container::new(b"file")?;
    assert!(matches!(
        root.parse(&[0x00, 0x00]),
        Err(Error::InsufficientBytes { .. })
    ));
    Ok(())
}

#[test]
fn field_access_errors() -> Result<()> {
    let mut tfhd = Mp4Box::new(b"tfhd")?;
    assert!(matches!(
        tfhd.get("sample_count"),
        Err(Error::UnknownField(_))
    ));
    assert!(matches!(
        tfhd.set("track_ID", "one"),
        Err(Error::IncompatibleValue { .. })
    ));
    assert!(matches!(
        tfhd.add("flags", fmp4box::Element::UInt32(0)),
        Err(Error::DuplicateField(_))
    ));
    assert!(matches!(
        Mp4Box::new(b"zzzz"),
        Err(Error::UnknownBoxType(_))
    ));

    let mut avcc = Mp4Box::new(b"avcC")?;
    assert!(matches!(
        avcc.set("AVCProfileIndication", 256u32),
        Err(Error::ValueOutOfRange { value: 256, width: 1 })
    ));
    Ok(())
}

#[test]
fn offsets_follow_insertion_order() -> Result<()> {
    let tfhd = Mp4Box::new(b"tfhd")?;
    assert_eq!(tfhd.offset("size")?, 0);
    assert_eq!(tfhd.offset("type")?, 4);
    assert_eq!(tfhd.offset("version")?, 8);
    assert_eq!(tfhd.offset("flags")?, 9);
    assert_eq!(tfhd.offset("track_ID")?, 12);
    assert_eq!(tfhd.offset("default_sample_flags")?, 16);
    Ok(())
}
