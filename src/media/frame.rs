//! Raw media payloads

use bytes::Bytes;

/// Stream id carried by filler frames
pub const FILLER_STREAM_ID: &str = "0";

/// Sample format label reported in audio format notices
pub const AUDIO_SAMPLE_FORMAT: &str = "f32-planar";

/// An uncompressed I420 video frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFrame {
    pub timestamp_us: u64,
    pub stream_id: String,
    pub width: u32,
    pub height: u32,
    /// Y plane followed by U and V planes
    pub data: Bytes,
}

impl VideoFrame {
    /// Size in bytes of an I420 image of the given dimensions
    pub fn i420_len(width: u32, height: u32) -> usize {
        let (width, height) = (width as usize, height as usize);
        let chroma = width.div_ceil(2) * height.div_ceil(2);
        width * height + 2 * chroma
    }

    /// Black I420 image: luma 0, chroma 128
    pub fn black(width: u32, height: u32) -> Self {
        let luma = width as usize * height as usize;
        let mut data = vec![128u8; Self::i420_len(width, height)];
        data[..luma].fill(0);

        Self {
            timestamp_us: 0,
            stream_id: FILLER_STREAM_ID.to_string(),
            width,
            height,
            data: Bytes::from(data),
        }
    }

    /// Copy re-stamped for sending as a filler frame
    pub fn as_filler(&self, timestamp_us: u64) -> Self {
        Self {
            timestamp_us,
            stream_id: FILLER_STREAM_ID.to_string(),
            width: self.width,
            height: self.height,
            // Bytes clone is a refcount bump
            data: self.data.clone(),
        }
    }
}

/// Planar f32 audio as delivered by the capture layer
#[derive(Debug, Clone, PartialEq)]
pub struct RawAudio {
    pub sample_rate: u32,
    /// One plane per channel, all the same length
    pub planes: Vec<Vec<f32>>,
}

impl RawAudio {
    /// Number of planes
    pub fn channels(&self) -> usize {
        self.planes.len()
    }

    /// Samples per plane
    pub fn frames(&self) -> usize {
        self.planes.first().map_or(0, Vec::len)
    }
}

/// A mono audio chunk ready for the wire
#[derive(Debug, Clone, PartialEq)]
pub struct AudioChunk {
    pub timestamp_us: u64,
    pub stream_id: u32,
    pub samples: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_black_frame_planes() {
        let frame = VideoFrame::black(4, 2);
        assert_eq!(frame.data.len(), 8 + 2 + 2);
        assert!(frame.data[..8].iter().all(|&b| b == 0));
        assert!(frame.data[8..].iter().all(|&b| b == 128));
        assert_eq!(frame.stream_id, FILLER_STREAM_ID);
    }

    #[test]
    fn test_default_placeholder_size() {
        assert_eq!(VideoFrame::i420_len(1920, 1080), 1920 * 1080 * 3 / 2);
        assert_eq!(VideoFrame::i420_len(3, 3), 9 + 2 * 4);
    }

    #[test]
    fn test_as_filler_restamps() {
        let mut frame = VideoFrame::black(2, 2);
        frame.stream_id = "cam".into();
        let filler = frame.as_filler(42);
        assert_eq!(filler.stream_id, FILLER_STREAM_ID);
        assert_eq!(filler.timestamp_us, 42);
        assert_eq!(filler.data, frame.data);
    }

    #[test]
    fn test_raw_audio_shape() {
        let audio = RawAudio {
            sample_rate: 48_000,
            planes: vec![vec![0.0; 480], vec![0.0; 480]],
        };
        assert_eq!(audio.channels(), 2);
        assert_eq!(audio.frames(), 480);
    }
}
