//! Bridge dispatcher
//!
//! One task owns every piece of room and media state. Capture callbacks are
//! turned into [`BridgeEvent`]s on a bounded queue and handled to completion,
//! one at a time, interleaved with the filler timer.
//!
//! ```text
//!   capture layer ──► mpsc<BridgeEvent> ──┐
//!                                          ▼
//!                    ┌──────────── Bridge::run (select!) ────────────┐
//!                    │  room events ─► decode ─► room state ─► JSON  │
//!                    │  frames ──────► TrackSelector ─► FrameRelay   │
//!                    │  audio ───────► AudioRelay                    │
//!                    │  filler tick ─► FrameRelay::on_tick           │
//!                    └────────────────────────┬──────────────────────┘
//!                                             ▼
//!                              OutboundChannel ──► mpsc<Bytes> ──► consumer
//! ```

pub mod event;
pub mod outbound;

pub use event::BridgeEvent;
pub use outbound::OutboundChannel;

use std::io::Read;
use std::ops::ControlFlow;

use base64::{engine::general_purpose::STANDARD, Engine};
use bytes::Bytes;
use flate2::read::ZlibDecoder;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

use crate::config::BridgeConfig;
use crate::error::{DecodeError, Error, Result};
use crate::media::{AudioRelay, FrameRelay, RawAudio, TrackSelector, VideoFrame};
use crate::protocol::{self, ControlMessage, Message};
use crate::room::{
    records, CaptionSync, DeviceOutputRegistry, OutputKind, ParticipantDiff, ParticipantDirectory,
};
use crate::schema::SchemaRegistry;
use crate::stats::BridgeStats;

/// Owner of all room and media state, driven by [`BridgeEvent`]s
pub struct Bridge {
    config: BridgeConfig,
    registry: SchemaRegistry,
    participants: ParticipantDirectory,
    outputs: DeviceOutputRegistry,
    captions: CaptionSync,
    tracks: TrackSelector,
    relay: FrameRelay,
    audio: AudioRelay,
    outbound: OutboundChannel,
    stats: BridgeStats,
    started_at: Instant,
}

impl Bridge {
    /// Create a bridge and the receiver of its outbound envelopes
    pub fn new(config: BridgeConfig) -> Result<(Self, mpsc::Receiver<Bytes>)> {
        let registry = SchemaRegistry::meeting()?;
        let (outbound, rx) = OutboundChannel::new(config.outbound_capacity);
        let now = Instant::now();
        let placeholder = VideoFrame::black(config.placeholder_width, config.placeholder_height);

        let bridge = Self {
            registry,
            participants: ParticipantDirectory::new(),
            outputs: DeviceOutputRegistry::new(),
            captions: CaptionSync::new(config.caption_policy),
            tracks: TrackSelector::new(),
            relay: FrameRelay::new(
                config.min_frame_interval,
                config.filler_gap_threshold,
                placeholder,
                now,
            ),
            audio: AudioRelay::new(),
            outbound,
            stats: BridgeStats::new(),
            started_at: now,
            config,
        };
        Ok((bridge, rx))
    }

    /// Run on a new task, returning the event sender and the task handle
    ///
    /// The task resolves to the final statistics once the queue closes or a
    /// [`BridgeEvent::Shutdown`] is handled.
    pub fn spawn(self) -> (mpsc::Sender<BridgeEvent>, JoinHandle<BridgeStats>) {
        let (tx, rx) = mpsc::channel(self.config.event_queue_capacity);
        let handle = tokio::spawn(self.run(rx));
        (tx, handle)
    }

    /// Dispatch loop
    pub async fn run(mut self, mut events: mpsc::Receiver<BridgeEvent>) -> BridgeStats {
        let mut ticker: Option<Interval> = None;
        tracing::info!("Bridge started");

        loop {
            self.sync_ticker(&mut ticker);

            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else {
                        tracing::info!("Event queue closed");
                        break;
                    };
                    if self.handle(event).is_break() {
                        break;
                    }
                }
                _ = next_tick(&mut ticker) => self.on_tick(),
            }
        }

        let stats = self.stats();
        tracing::info!(
            video_frames = stats.video_frames,
            filler_frames = stats.filler_frames,
            audio_chunks = stats.audio_chunks,
            control_messages = stats.control_messages,
            dropped_sends = stats.dropped_sends,
            decode_errors = stats.decode_errors,
            "Bridge stopped"
        );
        stats
    }

    /// The filler timer exists only while media is enabled
    fn sync_ticker(&self, ticker: &mut Option<Interval>) {
        match (self.outbound.media_enabled(), ticker.is_some()) {
            (true, false) => {
                let period = self.config.filler_tick_period;
                let mut interval = time::interval_at(Instant::now() + period, period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                *ticker = Some(interval);
                tracing::debug!(period_ms = period.as_millis() as u64, "Filler timer started");
            }
            (false, true) => {
                *ticker = None;
                tracing::debug!("Filler timer stopped");
            }
            _ => {}
        }
    }

    /// Handle one event to completion
    pub fn handle(&mut self, event: BridgeEvent) -> ControlFlow<()> {
        let name = event.name();
        let result = match event {
            BridgeEvent::Shutdown => {
                tracing::info!("Shutdown requested");
                return ControlFlow::Break(());
            }
            BridgeEvent::ChannelOpened => {
                self.outbound.open();
                Ok(())
            }
            BridgeEvent::ChannelClosed => {
                self.outbound.close();
                Ok(())
            }
            BridgeEvent::EnableMedia => {
                self.outbound.set_media_enabled(true);
                Ok(())
            }
            BridgeEvent::DisableMedia => {
                self.outbound.set_media_enabled(false);
                Ok(())
            }
            BridgeEvent::VideoTrackStarted { track_id, stream_id } => {
                self.on_video_track_started(&track_id, stream_id);
                Ok(())
            }
            BridgeEvent::VideoTrackEnded { track_id } => {
                self.tracks.remove(&track_id);
                self.relay.forget_track(&track_id);
                Ok(())
            }
            BridgeEvent::VideoFrame {
                track_id,
                width,
                height,
                data,
            } => {
                self.on_video_frame(&track_id, width, height, data);
                Ok(())
            }
            BridgeEvent::AudioTrackEnded { track_id } => {
                if self.audio.remove(&track_id) {
                    tracing::info!(track = %track_id, "Audio track ended");
                }
                Ok(())
            }
            BridgeEvent::AudioFrame { track_id, audio } => {
                self.on_audio_frame(&track_id, audio);
                Ok(())
            }
            BridgeEvent::SyncResponse(data) => self.on_sync_response(&data),
            BridgeEvent::SyncResponseBase64(text) => self.on_sync_response_base64(&text),
            BridgeEvent::CollectionEvent(data) => self.on_collection_event(&data),
            BridgeEvent::CaptionEvent(data) => self.on_caption_event(&data),
            BridgeEvent::Inbound(data) => self.on_inbound(data),
        };

        if let Err(err) = result {
            self.report(name, err);
        }
        ControlFlow::Continue(())
    }

    /// Filler timer tick
    pub fn on_tick(&mut self) {
        if !self.outbound.media_enabled() {
            return;
        }

        let now = Instant::now();
        let now_us = self.now_us();
        let live = self
            .tracks
            .current_stream_id()
            .is_some_and(|stream_id| self.outputs.is_stream_enabled(&stream_id));

        if let Some(frame) = self.relay.on_tick(live, now, now_us) {
            if self.deliver(protocol::encode_video(&frame)) {
                self.relay.mark_sent(now);
                self.stats.filler_frames += 1;
            }
        }
    }

    fn on_video_track_started(&mut self, track_id: &str, stream_id: Option<String>) {
        let Some(stream_id) = stream_id else {
            tracing::debug!(track = %track_id, "Ignoring video track without a stream");
            return;
        };
        let is_screen_share = self.is_screen_share_stream(&stream_id);
        self.tracks
            .upsert(track_id, &stream_id, is_screen_share, Instant::now());
    }

    /// Whether an in-meeting screen-share entry routes its video to `stream_id`
    fn is_screen_share_stream(&self, stream_id: &str) -> bool {
        self.participants.screen_sharers().any(|p| {
            self.outputs
                .lookup(&p.device_id, OutputKind::Video)
                .is_some_and(|o| o.stream_id == stream_id)
        })
    }

    fn on_video_frame(&mut self, track_id: &str, width: u32, height: u32, data: Bytes) {
        if !self.outbound.media_enabled() {
            return;
        }
        let Some(stream_id) = self.tracks.stream_id_of(track_id).map(str::to_string) else {
            return;
        };

        let selected = self.tracks.current_stream_id();
        let frame = VideoFrame {
            timestamp_us: self.now_us(),
            stream_id,
            width,
            height,
            data,
        };

        let now = Instant::now();
        if let Some(frame) = self.relay.forward(track_id, frame, selected.as_deref(), now) {
            if self.deliver(protocol::encode_video(&frame)) {
                self.relay.mark_sent(now);
                self.stats.video_frames += 1;
            }
        }
    }

    fn on_audio_frame(&mut self, track_id: &str, audio: RawAudio) {
        if !self.outbound.media_enabled() {
            return;
        }

        let now_us = self.now_us();
        let relayed = self.audio.relay(track_id, audio, now_us);
        if let Some(format) = relayed.format_update {
            self.send_control(ControlMessage::AudioFormatUpdate { format });
        }
        if self.deliver(protocol::encode_audio(&relayed.chunk)) {
            self.stats.audio_chunks += 1;
        }
    }

    fn on_sync_response(&mut self, data: &[u8]) -> Result<()> {
        let batch = records::parse_sync_response(&self.registry, data)?;
        if batch.is_empty() {
            tracing::debug!("Sync response without participants");
            return Ok(());
        }

        let diff = self.participants.apply_batch(batch);
        self.publish_diff(diff);
        Ok(())
    }

    fn on_sync_response_base64(&mut self, text: &str) -> Result<()> {
        let data = STANDARD
            .decode(text.trim())
            .map_err(|e| DecodeError::InvalidBase64(e.to_string()))?;
        self.on_sync_response(&data)
    }

    /// Collection events arrive zlib-compressed
    fn on_collection_event(&mut self, data: &[u8]) -> Result<()> {
        let mut inflated = Vec::with_capacity(data.len().saturating_mul(4));
        ZlibDecoder::new(data)
            .read_to_end(&mut inflated)
            .map_err(|e| DecodeError::InvalidCompression(e.to_string()))?;
        let update = records::parse_collection_event(&self.registry, &inflated)?;

        if !update.device_outputs.is_empty() {
            let now_us = self.now_us();
            self.outputs.apply_batch(update.device_outputs, now_us);
            let device_outputs = self.outputs.snapshot();
            self.send_control(ControlMessage::DeviceOutputsUpdate { device_outputs });
        }

        for chat in &update.chat_messages {
            tracing::info!(
                device = %chat.device_id,
                message_id = %chat.message_id,
                text = %chat.text,
                "Chat message"
            );
        }

        for participant in update.participants {
            let diff = self.participants.apply_single(participant);
            self.publish_diff(diff);
        }
        Ok(())
    }

    fn on_caption_event(&mut self, data: &[u8]) -> Result<()> {
        let caption = records::parse_caption_event(&self.registry, data)?;
        let Some(caption) = self.captions.apply(caption).cloned() else {
            return Ok(());
        };

        if self.outbound.media_enabled() {
            self.send_control(ControlMessage::CaptionUpdate { caption });
        }
        Ok(())
    }

    fn on_inbound(&mut self, mut data: Bytes) -> Result<()> {
        match protocol::decode(&mut data)? {
            Message::Control(document) => {
                tracing::info!(document = %document, "Control message from consumer");
            }
            other => {
                tracing::debug!(kind = ?other.message_type(), "Ignoring inbound media message");
            }
        }
        Ok(())
    }

    fn publish_diff(&mut self, diff: ParticipantDiff) {
        if !diff.is_empty() {
            self.send_control(ControlMessage::UsersUpdate(diff));
        }
    }

    fn send_control(&mut self, message: ControlMessage) {
        let kind = message.kind();
        match protocol::encode_control(&message) {
            Ok(envelope) => {
                if self.deliver(envelope) {
                    self.stats.control_messages += 1;
                    tracing::debug!(kind, "Control message sent");
                }
            }
            Err(err) => self.report(kind, err),
        }
    }

    /// Queue an envelope; failures are counted and logged, never propagated
    fn deliver(&mut self, envelope: Bytes) -> bool {
        let len = envelope.len() as u64;
        match self.outbound.send(envelope) {
            Ok(()) => {
                self.stats.bytes_sent += len;
                true
            }
            Err(err) => {
                self.report("send", err);
                false
            }
        }
    }

    fn report(&mut self, context: &'static str, err: Error) {
        match &err {
            Error::Decode(_) => {
                self.stats.decode_errors += 1;
                tracing::warn!(context, error = %err, "Dropping malformed input");
            }
            Error::ChannelUnavailable(_) => {
                self.stats.dropped_sends += 1;
                tracing::warn!(context, error = %err, "Dropping outbound message");
            }
            Error::UpstreamInconsistency(_) => {
                tracing::warn!(context, error = %err, "Dropping inconsistent input");
            }
            _ => {
                tracing::error!(context, error = %err, "Event handling failed");
            }
        }
    }

    /// Microseconds since the bridge was created
    fn now_us(&self) -> u64 {
        u64::try_from(self.started_at.elapsed().as_micros()).unwrap_or(u64::MAX)
    }

    /// Counters so far, with uptime filled in
    pub fn stats(&self) -> BridgeStats {
        BridgeStats {
            uptime: self.started_at.elapsed(),
            ..self.stats.clone()
        }
    }

    /// Configuration the bridge was built with
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Participant directory
    pub fn participants(&self) -> &ParticipantDirectory {
        &self.participants
    }

    /// Device output registry
    pub fn outputs(&self) -> &DeviceOutputRegistry {
        &self.outputs
    }

    /// Caption store
    pub fn captions(&self) -> &CaptionSync {
        &self.captions
    }

    /// Video track selector
    pub fn tracks(&self) -> &TrackSelector {
        &self.tracks
    }

    /// Whether media sending is enabled
    pub fn media_enabled(&self) -> bool {
        self.outbound.media_enabled()
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::Duration;

    use flate2::write::ZlibEncoder;
    use flate2::Compression;

    use super::*;
    use crate::media::FILLER_STREAM_ID;
    use crate::schema::{meeting, Record, RecordEncoder};

    fn test_config() -> BridgeConfig {
        BridgeConfig::default().placeholder_size(4, 2)
    }

    fn new_bridge() -> (Bridge, mpsc::Receiver<Bytes>) {
        Bridge::new(test_config()).unwrap()
    }

    fn encode(schema: &str, record: &Record) -> Bytes {
        let registry = SchemaRegistry::meeting().unwrap();
        RecordEncoder::new(&registry).encode(schema, record).unwrap()
    }

    fn deflate(data: &[u8], level: Compression) -> Bytes {
        let mut encoder = ZlibEncoder::new(Vec::new(), level);
        encoder.write_all(data).unwrap();
        Bytes::from(encoder.finish().unwrap())
    }

    fn user(device_id: &str, status: u32, parent: Option<&str>) -> Record {
        let mut record = Record::new()
            .with("deviceId", device_id)
            .with("fullName", device_id)
            .with("displayName", device_id)
            .with("status", status);
        if let Some(parent) = parent {
            record.set("parentDeviceId", parent.into());
        }
        record
    }

    fn output(device_id: &str, kind: u32, stream_id: &str, disabled: bool) -> Record {
        Record::new()
            .with("deviceOutputType", kind)
            .with("streamId", stream_id)
            .with("deviceId", device_id)
            .with("deviceOutputStatus", Record::new().with("disabled", u32::from(disabled)))
    }

    fn sync_response(users: Vec<Record>) -> Bytes {
        let response = Record::new().with(
            "userInfoListWrapperWrapper",
            Record::new().with(
                "userInfoListWrapper",
                Record::new().with("userInfoList", users),
            ),
        );
        encode(meeting::USER_INFO_LIST_RESPONSE, &response)
    }

    fn collection_event(outputs: Vec<Record>, users: Vec<Record>) -> Bytes {
        let mut outer = Record::new().with(
            "userInfoListWrapperAndChatWrapper",
            Record::new().with(
                "userInfoListWrapper",
                Record::new().with("userInfoList", users),
            ),
        );
        if !outputs.is_empty() {
            outer.set(
                "deviceInfoWrapper",
                Record::new().with("deviceOutputInfoList", outputs).into(),
            );
        }
        let event = Record::new().with(
            "body",
            Record::new().with("userInfoListWrapperAndChatWrapperWrapper", outer),
        );
        deflate(&encode(meeting::COLLECTION_EVENT, &event), Compression::default())
    }

    fn caption_event(id: i64, version: i64, text: &str) -> Bytes {
        let wrapper = Record::new().with(
            "caption",
            Record::new()
                .with("deviceId", "a")
                .with("captionId", id)
                .with("version", version)
                .with("text", text)
                .with("languageId", 1i64),
        );
        encode(meeting::CAPTION_WRAPPER, &wrapper)
    }

    fn drain(rx: &mut mpsc::Receiver<Bytes>) -> Vec<Message> {
        let mut messages = Vec::new();
        while let Ok(mut envelope) = rx.try_recv() {
            messages.push(protocol::decode(&mut envelope).unwrap());
        }
        messages
    }

    fn control_type(message: &Message) -> Option<&str> {
        match message {
            Message::Control(doc) => doc["type"].as_str(),
            _ => None,
        }
    }

    fn video_frame(track_id: &str, fill: u8) -> BridgeEvent {
        BridgeEvent::VideoFrame {
            track_id: track_id.into(),
            width: 4,
            height: 2,
            data: Bytes::from(vec![fill; VideoFrame::i420_len(4, 2)]),
        }
    }

    fn track_started(track_id: &str, stream_id: &str) -> BridgeEvent {
        BridgeEvent::VideoTrackStarted {
            track_id: track_id.into(),
            stream_id: Some(stream_id.into()),
        }
    }

    #[test]
    fn test_sync_response_publishes_users_update() {
        let (mut bridge, mut rx) = new_bridge();
        bridge.handle(BridgeEvent::ChannelOpened);

        let body = sync_response(vec![user("a", 1, None), user("b", 1, None)]);
        bridge.handle(BridgeEvent::SyncResponse(body.clone()));

        let messages = drain(&mut rx);
        assert_eq!(messages.len(), 1);
        let Message::Control(doc) = &messages[0] else {
            panic!("expected control message");
        };
        assert_eq!(doc["type"], "UsersUpdate");
        assert_eq!(doc["newUsers"].as_array().unwrap().len(), 2);

        // same snapshot again changes nothing
        bridge.handle(BridgeEvent::SyncResponse(body));
        assert!(drain(&mut rx).is_empty());
        assert_eq!(bridge.stats().control_messages, 1);
    }

    #[test]
    fn test_sync_response_base64() {
        let (mut bridge, mut rx) = new_bridge();
        bridge.handle(BridgeEvent::ChannelOpened);

        let text = STANDARD.encode(sync_response(vec![user("a", 1, None)]));
        bridge.handle(BridgeEvent::SyncResponseBase64(text));

        assert_eq!(bridge.participants().present().len(), 1);
        assert_eq!(control_type(&drain(&mut rx)[0]), Some("UsersUpdate"));
    }

    #[test]
    fn test_invalid_base64_counted() {
        let (mut bridge, _rx) = new_bridge();
        bridge.handle(BridgeEvent::SyncResponseBase64("!!not base64!!".into()));
        assert_eq!(bridge.stats().decode_errors, 1);
    }

    #[test]
    fn test_malformed_event_leaves_state_untouched() {
        let (mut bridge, mut rx) = new_bridge();
        bridge.handle(BridgeEvent::ChannelOpened);
        bridge.handle(BridgeEvent::SyncResponse(sync_response(vec![user("a", 1, None)])));
        drain(&mut rx);

        // field 1, length 50, then nothing
        let flow = bridge.handle(BridgeEvent::CollectionEvent(deflate(&[0x0A, 50], Compression::default())));
        assert!(flow.is_continue());
        assert_eq!(bridge.stats().decode_errors, 1);
        assert_eq!(bridge.participants().present().len(), 1);
        assert!(bridge.outputs().is_empty());
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_stored_block_collection_event_applied() {
        let (mut bridge, mut rx) = new_bridge();
        bridge.handle(BridgeEvent::ChannelOpened);

        let event = Record::new().with(
            "body",
            Record::new().with(
                "userInfoListWrapperAndChatWrapperWrapper",
                Record::new().with(
                    "userInfoListWrapperAndChatWrapper",
                    Record::new().with(
                        "userInfoListWrapper",
                        Record::new().with("userInfoList", vec![user("b", 1, None)]),
                    ),
                ),
            ),
        );
        let raw = encode(meeting::COLLECTION_EVENT, &event);
        bridge.handle(BridgeEvent::CollectionEvent(deflate(&raw, Compression::none())));

        assert_eq!(bridge.stats().decode_errors, 0);
        assert_eq!(bridge.participants().present().len(), 1);
        let messages = drain(&mut rx);
        let kinds: Vec<_> = messages.iter().filter_map(control_type).collect();
        assert_eq!(kinds, vec!["UsersUpdate"]);
    }

    #[test]
    fn test_uncompressed_collection_event_rejected() {
        let (mut bridge, mut rx) = new_bridge();
        bridge.handle(BridgeEvent::ChannelOpened);

        let raw = encode(
            meeting::COLLECTION_EVENT,
            &Record::new().with("body", Record::new()),
        );
        bridge.handle(BridgeEvent::CollectionEvent(raw));

        assert_eq!(bridge.stats().decode_errors, 1);
        assert!(bridge.participants().present().is_empty());
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_collection_event_updates_outputs_then_users() {
        let (mut bridge, mut rx) = new_bridge();
        bridge.handle(BridgeEvent::ChannelOpened);
        bridge.handle(BridgeEvent::SyncResponse(sync_response(vec![user("a", 1, None)])));
        drain(&mut rx);

        let event = collection_event(vec![output("b", 2, "s-b", false)], vec![user("b", 1, None)]);
        bridge.handle(BridgeEvent::CollectionEvent(event));

        let messages = drain(&mut rx);
        let kinds: Vec<_> = messages.iter().filter_map(control_type).collect();
        assert_eq!(kinds, vec!["DeviceOutputsUpdate", "UsersUpdate"]);

        let Message::Control(users) = &messages[1] else {
            panic!("expected control message");
        };
        // incremental events never remove anyone else
        assert_eq!(users["newUsers"][0]["deviceId"], "b");
        assert!(users["removedUsers"].as_array().unwrap().is_empty());
        assert_eq!(bridge.participants().present().len(), 2);
        assert!(bridge.outputs().is_stream_enabled("s-b"));
    }

    #[test]
    fn test_closed_channel_drops_but_updates_state() {
        let (mut bridge, mut rx) = new_bridge();
        bridge.handle(BridgeEvent::SyncResponse(sync_response(vec![user("a", 1, None)])));

        assert_eq!(bridge.stats().dropped_sends, 1);
        assert_eq!(bridge.participants().present().len(), 1);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_captions_forwarded_only_while_media_enabled() {
        let (mut bridge, mut rx) = new_bridge();
        bridge.handle(BridgeEvent::ChannelOpened);

        bridge.handle(BridgeEvent::CaptionEvent(caption_event(1, 1, "hel")));
        assert!(drain(&mut rx).is_empty());
        assert_eq!(bridge.captions().len(), 1);

        bridge.handle(BridgeEvent::EnableMedia);
        bridge.handle(BridgeEvent::CaptionEvent(caption_event(1, 2, "hello")));
        let messages = drain(&mut rx);
        let Message::Control(doc) = &messages[0] else {
            panic!("expected control message");
        };
        assert_eq!(doc["type"], "CaptionUpdate");
        assert_eq!(doc["caption"]["text"], "hello");
    }

    #[test]
    fn test_empty_caption_event_dropped() {
        let (mut bridge, _rx) = new_bridge();
        let flow = bridge.handle(BridgeEvent::CaptionEvent(Bytes::new()));
        assert!(flow.is_continue());
        assert!(bridge.captions().is_empty());
        assert_eq!(bridge.stats().decode_errors, 0);
    }

    #[test]
    fn test_only_selected_track_forwarded() {
        let (mut bridge, mut rx) = new_bridge();
        bridge.handle(BridgeEvent::ChannelOpened);
        bridge.handle(BridgeEvent::EnableMedia);

        // "share" is a screen-share entry of "a" routed to s-share
        bridge.handle(BridgeEvent::SyncResponse(sync_response(vec![
            user("a", 1, None),
            user("share", 1, Some("a")),
        ])));
        bridge.handle(BridgeEvent::CollectionEvent(collection_event(
            vec![output("a", 2, "s-cam", false), output("share", 2, "s-share", false)],
            vec![],
        )));
        drain(&mut rx);

        bridge.handle(track_started("t-share", "s-share"));
        bridge.handle(track_started("t-cam", "s-cam"));
        assert_eq!(
            bridge.tracks().stream_id_of("t-share"),
            Some("s-share")
        );

        bridge.handle(video_frame("t-cam", 1));
        bridge.handle(video_frame("t-share", 2));

        let messages = drain(&mut rx);
        assert_eq!(messages.len(), 1);
        let Message::Video(frame) = &messages[0] else {
            panic!("expected video message");
        };
        assert_eq!(frame.stream_id, "s-share");
        assert!(frame.data.iter().all(|&b| b == 2));

        // screen share ends, camera takes over
        bridge.handle(BridgeEvent::VideoTrackEnded {
            track_id: "t-share".into(),
        });
        bridge.handle(video_frame("t-cam", 3));
        let messages = drain(&mut rx);
        let Message::Video(frame) = &messages[0] else {
            panic!("expected video message");
        };
        assert_eq!(frame.stream_id, "s-cam");
        assert_eq!(bridge.stats().video_frames, 2);
    }

    #[test]
    fn test_media_dropped_while_disabled() {
        let (mut bridge, mut rx) = new_bridge();
        bridge.handle(BridgeEvent::ChannelOpened);
        bridge.handle(track_started("t1", "s1"));
        bridge.handle(video_frame("t1", 1));
        bridge.handle(BridgeEvent::AudioFrame {
            track_id: "mic".into(),
            audio: RawAudio {
                sample_rate: 48_000,
                planes: vec![vec![0.1; 8]],
            },
        });
        bridge.on_tick();

        assert!(drain(&mut rx).is_empty());
        assert_eq!(bridge.stats().messages_sent(), 0);
    }

    #[test]
    fn test_audio_format_update_precedes_audio() {
        let (mut bridge, mut rx) = new_bridge();
        bridge.handle(BridgeEvent::ChannelOpened);
        bridge.handle(BridgeEvent::EnableMedia);

        for _ in 0..2 {
            bridge.handle(BridgeEvent::AudioFrame {
                track_id: "mic".into(),
                audio: RawAudio {
                    sample_rate: 48_000,
                    planes: vec![vec![1.0; 4], vec![0.0; 4]],
                },
            });
        }

        let messages = drain(&mut rx);
        assert_eq!(messages.len(), 3);
        assert_eq!(control_type(&messages[0]), Some("AudioFormatUpdate"));
        let Message::Audio(chunk) = &messages[1] else {
            panic!("expected audio message");
        };
        assert_eq!(chunk.stream_id, 1);
        assert_eq!(chunk.samples, vec![0.5; 4]);
        assert!(matches!(messages[2], Message::Audio(_)));
    }

    #[test]
    fn test_inbound_messages() {
        let (mut bridge, _rx) = new_bridge();
        let mut control = b"\x01\x00\x00\x00".to_vec();
        control.extend_from_slice(br#"{"type":"Ping"}"#);
        bridge.handle(BridgeEvent::Inbound(Bytes::from(control)));
        assert_eq!(bridge.stats().decode_errors, 0);

        bridge.handle(BridgeEvent::Inbound(Bytes::from_static(&[7, 0, 0, 0])));
        assert_eq!(bridge.stats().decode_errors, 1);
    }

    #[test]
    fn test_shutdown_breaks() {
        let (mut bridge, _rx) = new_bridge();
        assert!(bridge.handle(BridgeEvent::Shutdown).is_break());
    }

    #[tokio::test(start_paused = true)]
    async fn test_filler_placeholder_when_not_live() {
        let (bridge, mut rx) = new_bridge();
        let (tx, handle) = bridge.spawn();
        tx.send(BridgeEvent::ChannelOpened).await.unwrap();
        tx.send(BridgeEvent::EnableMedia).await.unwrap();

        let mut envelope = rx.recv().await.unwrap();
        let Message::Video(frame) = protocol::decode(&mut envelope).unwrap() else {
            panic!("expected video message");
        };
        assert_eq!(frame.stream_id, FILLER_STREAM_ID);
        assert_eq!(frame.data, VideoFrame::black(4, 2).data);
        // first tick at or past the 500 ms gap
        assert!(frame.timestamp_us >= 500_000);
        assert!(frame.timestamp_us <= 750_000);

        tx.send(BridgeEvent::Shutdown).await.unwrap();
        let stats = handle.await.unwrap();
        assert_eq!(stats.filler_frames, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_filler_keeps_gap_open() {
        let (mut bridge, mut rx) = new_bridge();
        bridge.handle(BridgeEvent::EnableMedia);

        // channel not open yet: the filler is dropped
        time::advance(Duration::from_millis(500)).await;
        bridge.on_tick();
        assert_eq!(bridge.stats().dropped_sends, 1);
        assert_eq!(bridge.stats().filler_frames, 0);

        // the very next tick fills without waiting out another gap
        bridge.handle(BridgeEvent::ChannelOpened);
        time::advance(Duration::from_millis(250)).await;
        bridge.on_tick();
        assert_eq!(bridge.stats().filler_frames, 1);
        assert!(matches!(drain(&mut rx)[..], [Message::Video(_)]));

        // delivered, so the gap starts over
        time::advance(Duration::from_millis(250)).await;
        bridge.on_tick();
        assert_eq!(bridge.stats().filler_frames, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_filler_repeats_live_frame() {
        let (bridge, mut rx) = new_bridge();
        let (tx, _handle) = bridge.spawn();
        tx.send(BridgeEvent::ChannelOpened).await.unwrap();
        tx.send(BridgeEvent::EnableMedia).await.unwrap();
        tx.send(BridgeEvent::CollectionEvent(collection_event(
            vec![output("a", 2, "s1", false)],
            vec![],
        )))
        .await
        .unwrap();
        tx.send(track_started("t1", "s1")).await.unwrap();
        tx.send(video_frame("t1", 7)).await.unwrap();

        let mut messages = Vec::new();
        while messages.len() < 3 {
            let mut envelope = rx.recv().await.unwrap();
            messages.push(protocol::decode(&mut envelope).unwrap());
        }

        assert_eq!(control_type(&messages[0]), Some("DeviceOutputsUpdate"));
        let Message::Video(live) = &messages[1] else {
            panic!("expected video message");
        };
        assert_eq!(live.stream_id, "s1");
        let Message::Video(filler) = &messages[2] else {
            panic!("expected video message");
        };
        assert_eq!(filler.stream_id, FILLER_STREAM_ID);
        assert_eq!(filler.data, live.data);
        assert!(filler.timestamp_us - live.timestamp_us >= 500_000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_while_media_disabled() {
        let (bridge, mut rx) = new_bridge();
        let (tx, handle) = bridge.spawn();
        tx.send(BridgeEvent::ChannelOpened).await.unwrap();
        tx.send(track_started("t1", "s1")).await.unwrap();
        tx.send(video_frame("t1", 1)).await.unwrap();

        time::sleep(Duration::from_secs(2)).await;
        assert!(rx.try_recv().is_err());

        // enable long enough for one filler, then disable
        tx.send(BridgeEvent::EnableMedia).await.unwrap();
        assert!(rx.recv().await.is_some());
        tx.send(BridgeEvent::DisableMedia).await.unwrap();
        time::sleep(Duration::from_millis(10)).await;
        while rx.try_recv().is_ok() {}

        time::sleep(Duration::from_secs(2)).await;
        assert!(rx.try_recv().is_err());

        drop(tx);
        let stats = handle.await.unwrap();
        assert_eq!(stats.video_frames, 0);
    }

    #[tokio::test]
    async fn test_run_ends_when_queue_closes() {
        let (bridge, _rx) = new_bridge();
        let (tx, handle) = bridge.spawn();
        drop(tx);
        let stats = handle.await.unwrap();
        assert_eq!(stats.messages_sent(), 0);
    }
}
