//! Serve the bridge's outbound stream to one TCP consumer
//!
//! Run with: cargo run --example tcp_bridge [BIND_ADDR]
//!
//! The demo waits for a single consumer, then feeds a synthetic meeting into
//! the bridge: one participant with a camera, a few seconds of frames and
//! audio, a caption, and a stall that triggers filler frames.
//!
//! TCP has no message boundaries, so every envelope is written with a
//! 4-byte little-endian length prefix. The consumer may send envelopes back
//! the same way; they are decoded and logged by the bridge.
//!
//! Try it with:
//!   nc localhost 7420 | xxd | head

use std::io::Write;
use std::net::SocketAddr;
use std::time::Duration;

use bytes::Bytes;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use meet_bridge::media::{RawAudio, VideoFrame};
use meet_bridge::schema::{meeting, Record, RecordEncoder, SchemaRegistry};
use meet_bridge::{Bridge, BridgeConfig, BridgeEvent};

const WIDTH: u32 = 320;
const HEIGHT: u32 = 180;

fn participant(device_id: &str, name: &str) -> Record {
    Record::new()
        .with("deviceId", device_id)
        .with("fullName", name)
        .with("displayName", name)
        .with("status", 1u32)
}

fn sync_response(encoder: &RecordEncoder<'_>) -> meet_bridge::Result<Bytes> {
    let response = Record::new().with(
        "userInfoListWrapperWrapper",
        Record::new().with(
            "userInfoListWrapper",
            Record::new().with(
                "userInfoList",
                vec![participant("dev-alice", "Alice"), participant("dev-bot", "Recorder")],
            ),
        ),
    );
    encoder.encode(meeting::USER_INFO_LIST_RESPONSE, &response)
}

fn camera_routing(encoder: &RecordEncoder<'_>, disabled: bool) -> meet_bridge::Result<Bytes> {
    let output = Record::new()
        .with("deviceOutputType", 2u32)
        .with("streamId", "stream-alice")
        .with("deviceId", "dev-alice")
        .with("deviceOutputStatus", Record::new().with("disabled", u32::from(disabled)));
    let event = Record::new().with(
        "body",
        Record::new().with(
            "userInfoListWrapperAndChatWrapperWrapper",
            Record::new().with(
                "deviceInfoWrapper",
                Record::new().with("deviceOutputInfoList", vec![output]),
            ),
        ),
    );
    let raw = encoder.encode(meeting::COLLECTION_EVENT, &event)?;

    // the collections datachannel carries zlib-compressed payloads
    let mut zlib = ZlibEncoder::new(Vec::new(), Compression::default());
    zlib.write_all(&raw)?;
    Ok(Bytes::from(zlib.finish()?))
}

fn caption(encoder: &RecordEncoder<'_>, version: i64, text: &str) -> meet_bridge::Result<Bytes> {
    let wrapper = Record::new().with(
        "caption",
        Record::new()
            .with("deviceId", "dev-alice")
            .with("captionId", 1i64)
            .with("version", version)
            .with("text", text)
            .with("languageId", 1i64),
    );
    encoder.encode(meeting::CAPTION_WRAPPER, &wrapper)
}

/// Gray-ramp I420 frame so consecutive frames differ
fn synthetic_frame(n: u32) -> Bytes {
    let mut data = VideoFrame::black(WIDTH, HEIGHT).data.to_vec();
    let luma = (WIDTH * HEIGHT) as usize;
    data[..luma].fill((n % 256) as u8);
    Bytes::from(data)
}

fn synthetic_audio(n: u32) -> RawAudio {
    let frames = 480;
    let phase = n as f32 * 0.1;
    let plane: Vec<f32> = (0..frames)
        .map(|i| ((i as f32 * 0.05) + phase).sin() * 0.2)
        .collect();
    RawAudio {
        sample_rate: 48_000,
        planes: vec![plane.clone(), plane],
    }
}

async fn write_envelopes(mut writer: OwnedWriteHalf, mut outbound: mpsc::Receiver<Bytes>) -> std::io::Result<u64> {
    let mut written = 0;
    while let Some(envelope) = outbound.recv().await {
        writer.write_all(&(envelope.len() as u32).to_le_bytes()).await?;
        writer.write_all(&envelope).await?;
        written += 1;
    }
    writer.shutdown().await?;
    Ok(written)
}

async fn read_envelopes(mut reader: OwnedReadHalf, events: mpsc::Sender<BridgeEvent>) -> std::io::Result<()> {
    loop {
        let mut len = [0u8; 4];
        if reader.read_exact(&mut len).await.is_err() {
            return Ok(());
        }
        let mut body = vec![0u8; u32::from_le_bytes(len) as usize];
        reader.read_exact(&mut body).await?;
        if events.send(BridgeEvent::Inbound(Bytes::from(body))).await.is_err() {
            return Ok(());
        }
    }
}

async fn feed(events: &mpsc::Sender<BridgeEvent>, encoder: &RecordEncoder<'_>) -> Result<(), Box<dyn std::error::Error>> {
    events.send(BridgeEvent::SyncResponse(sync_response(encoder)?)).await?;
    events
        .send(BridgeEvent::CollectionEvent(camera_routing(encoder, false)?))
        .await?;
    events
        .send(BridgeEvent::VideoTrackStarted {
            track_id: "track-video-1".into(),
            stream_id: Some("stream-alice".into()),
        })
        .await?;
    events.send(BridgeEvent::EnableMedia).await?;

    // ~3 seconds at 30 fps, audio every 10 ms
    let mut video_tick = tokio::time::interval(Duration::from_millis(33));
    let mut audio_tick = tokio::time::interval(Duration::from_millis(10));
    let mut frame_no = 0u32;
    let mut chunk_no = 0u32;
    while frame_no < 90 {
        tokio::select! {
            _ = video_tick.tick() => {
                events.send(BridgeEvent::VideoFrame {
                    track_id: "track-video-1".into(),
                    width: WIDTH,
                    height: HEIGHT,
                    data: synthetic_frame(frame_no),
                }).await?;
                frame_no += 1;
                if frame_no == 30 {
                    events.send(BridgeEvent::CaptionEvent(caption(encoder, 1, "hello")?)).await?;
                }
                if frame_no == 60 {
                    events.send(BridgeEvent::CaptionEvent(caption(encoder, 2, "hello everyone")?)).await?;
                }
            }
            _ = audio_tick.tick() => {
                events.send(BridgeEvent::AudioFrame {
                    track_id: "track-audio-1".into(),
                    audio: synthetic_audio(chunk_no),
                }).await?;
                chunk_no += 1;
            }
        }
    }

    // camera stalls: filler repeats the last frame
    tracing::info!("Camera stalled");
    tokio::time::sleep(Duration::from_secs(2)).await;

    // camera muted: filler switches to the black placeholder
    events
        .send(BridgeEvent::CollectionEvent(camera_routing(encoder, true)?))
        .await?;
    tracing::info!("Camera muted");
    tokio::time::sleep(Duration::from_secs(2)).await;

    events.send(BridgeEvent::Shutdown).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let bind_addr: SocketAddr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:7420".to_string())
        .parse()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("meet_bridge=info".parse()?)
                .add_directive("tcp_bridge=info".parse()?),
        )
        .init();

    let listener = TcpListener::bind(bind_addr).await?;
    tracing::info!(addr = %bind_addr, "Waiting for consumer");
    let (socket, peer) = listener.accept().await?;
    socket.set_nodelay(true)?;
    tracing::info!(peer = %peer, "Consumer connected");

    let config = BridgeConfig::default().placeholder_size(WIDTH, HEIGHT);
    let (bridge, outbound) = Bridge::new(config)?;
    let (events, bridge_task) = bridge.spawn();

    let (reader, writer) = socket.into_split();
    let writer_task = tokio::spawn(write_envelopes(writer, outbound));
    let reader_task = tokio::spawn(read_envelopes(reader, events.clone()));

    events.send(BridgeEvent::ChannelOpened).await?;

    let registry = SchemaRegistry::meeting()?;
    let encoder = RecordEncoder::new(&registry);
    if let Err(e) = feed(&events, &encoder).await {
        tracing::error!(error = %e, "Feeding the bridge failed");
    }

    let stats = bridge_task.await?;
    reader_task.abort();
    let written = writer_task.await??;

    println!(
        "Stats: video={} filler={} audio={} control={} dropped={} envelopes_written={}",
        stats.video_frames,
        stats.filler_frames,
        stats.audio_chunks,
        stats.control_messages,
        stats.dropped_sends,
        written,
    );
    Ok(())
}
