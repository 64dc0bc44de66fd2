use seabattle::{read_frame, write_frame, Coord, ErrorCode, Event, GameId, PlayerId, Request};

#[tokio::test]
async fn test_frame_roundtrip() {
    let request = Request::Attack {
        game: GameId(3),
        target: Coord::new(4, 9),
        player: PlayerId(2),
    };
    let mut buf = Vec::new();
    write_frame(&mut buf, &request).await.unwrap();

    let mut reader: &[u8] = &buf;
    let decoded: Request = read_frame(&mut reader).await.unwrap();
    assert_eq!(decoded, request);
    assert!(reader.is_empty(), "frame should consume the whole buffer");
}

#[tokio::test]
async fn test_zero_length_frame_rejected() {
    let mut reader: &[u8] = &[0, 0, 0, 0];
    let err = read_frame::<_, Event>(&mut reader).await.unwrap_err();
    assert!(err.to_string().contains("invalid frame length"));
}

#[tokio::test]
async fn test_oversized_length_prefix_rejected() {
    let mut reader: &[u8] = &[0xFF, 0xFF, 0xFF, 0xFF];
    let err = read_frame::<_, Event>(&mut reader).await.unwrap_err();
    assert!(err.to_string().contains("invalid frame length"));
}

#[tokio::test]
async fn test_truncated_payload_rejected() {
    let mut frame = 100u32.to_be_bytes().to_vec();
    frame.extend_from_slice(&[0u8; 10]);
    let mut reader: &[u8] = &frame;
    assert!(read_frame::<_, Event>(&mut reader).await.is_err());
}

#[tokio::test]
async fn test_garbage_payload_rejected() {
    let garbage = [0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF];
    let mut frame = (garbage.len() as u32).to_be_bytes().to_vec();
    frame.extend_from_slice(&garbage);
    let mut reader: &[u8] = &frame;
    assert!(read_frame::<_, Request>(&mut reader).await.is_err());
}

#[tokio::test]
async fn test_oversized_outgoing_frame_rejected() {
    let bloated = Event::Rejected {
        code: ErrorCode::Validation,
        message: "x".repeat(70 * 1024),
    };
    let mut buf = Vec::new();
    let err = write_frame(&mut buf, &bloated).await.unwrap_err();
    assert!(err.to_string().contains("exceeds limit"));
}
