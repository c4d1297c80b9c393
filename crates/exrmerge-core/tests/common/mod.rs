#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use exrmerge_core::codec::{ChannelEntry, ChannelInfo, Codec, PixelType};
use exrmerge_core::error::CodecError;

/// Counts live headers and buffers so tests can check everything a job
/// decoded was released.
#[derive(Clone, Default)]
pub struct LiveCounter(Arc<AtomicUsize>);

impl LiveCounter {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn acquire(&self) -> Tracked {
        self.0.fetch_add(1, Ordering::SeqCst);
        Tracked(self.clone())
    }
}

pub struct Tracked(LiveCounter);

impl Drop for Tracked {
    fn drop(&mut self) {
        (self.0).0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct MockHeader {
    pub path: PathBuf,
    channels: Vec<ChannelInfo>,
    _live: Tracked,
}

/// Pixel buffer that remembers which file produced it.
pub struct MockBuffer {
    pub source: PathBuf,
    _live: Tracked,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Encoded {
    pub path: PathBuf,
    pub template: PathBuf,
    /// (channel name, source file) in the order handed to the codec.
    pub channels: Vec<(String, PathBuf)>,
}

enum MockFile {
    Image(Vec<ChannelInfo>),
    BadHeader,
    BadDecode,
    PanickingDecode,
}

/// In-memory codec: files are registered up front, encodes are recorded.
#[derive(Default)]
pub struct MockCodec {
    files: HashMap<PathBuf, MockFile>,
    failing_outputs: HashSet<PathBuf>,
    decode_delay: Option<Duration>,
    /// Decoding this path blocks until the paired sender fires.
    decode_gate: Option<(PathBuf, Mutex<Receiver<()>>)>,
    pub encoded: Mutex<Vec<Encoded>>,
    pub live: LiveCounter,
}

impl MockCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file whose channels are all `half`.
    pub fn with_file(mut self, path: &str, channels: &[&str]) -> Self {
        let infos = channels
            .iter()
            .map(|name| ChannelInfo {
                name: name.to_string(),
                pixel_type: PixelType::F16,
            })
            .collect();
        self.files.insert(PathBuf::from(path), MockFile::Image(infos));
        self
    }

    pub fn with_bad_header(mut self, path: &str) -> Self {
        self.files.insert(PathBuf::from(path), MockFile::BadHeader);
        self
    }

    pub fn with_bad_decode(mut self, path: &str) -> Self {
        self.files.insert(PathBuf::from(path), MockFile::BadDecode);
        self
    }

    pub fn with_panicking_decode(mut self, path: &str) -> Self {
        self.files
            .insert(PathBuf::from(path), MockFile::PanickingDecode);
        self
    }

    /// Hold decoding of `path` until a message arrives on the returned
    /// sender (or the sender is dropped).
    pub fn with_decode_gate(mut self, path: &str) -> (Self, Sender<()>) {
        let (tx, rx) = mpsc::channel();
        self.decode_gate = Some((PathBuf::from(path), Mutex::new(rx)));
        (self, tx)
    }

    pub fn with_failing_output(mut self, path: &str) -> Self {
        self.failing_outputs.insert(PathBuf::from(path));
        self
    }

    pub fn with_decode_delay(mut self, delay: Duration) -> Self {
        self.decode_delay = Some(delay);
        self
    }

    pub fn encoded(&self) -> Vec<Encoded> {
        self.encoded.lock().unwrap().clone()
    }

    /// Encoded output paths, sorted.
    pub fn output_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.encoded().into_iter().map(|e| e.path).collect();
        paths.sort();
        paths
    }
}

impl Codec for MockCodec {
    type Header = MockHeader;
    type Buffer = MockBuffer;

    fn read_header(&self, path: &Path) -> Result<MockHeader, CodecError> {
        match self.files.get(path) {
            Some(MockFile::Image(channels)) => Ok(MockHeader {
                path: path.to_path_buf(),
                channels: channels.clone(),
                _live: self.live.acquire(),
            }),
            Some(MockFile::BadDecode | MockFile::PanickingDecode) => Ok(MockHeader {
                path: path.to_path_buf(),
                channels: Vec::new(),
                _live: self.live.acquire(),
            }),
            Some(MockFile::BadHeader) => Err(CodecError::Header("bad magic".into())),
            None => Err(CodecError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no such file",
            ))),
        }
    }

    fn channels(&self, header: &MockHeader) -> Vec<ChannelInfo> {
        header.channels.clone()
    }

    fn decode(
        &self,
        header: &MockHeader,
        path: &Path,
    ) -> Result<Vec<ChannelEntry<MockBuffer>>, CodecError> {
        if let Some(delay) = self.decode_delay {
            std::thread::sleep(delay);
        }
        if let Some((gated, rx)) = &self.decode_gate {
            if gated == path {
                let _ = rx.lock().unwrap().recv();
            }
        }
        match self.files.get(path) {
            Some(MockFile::BadDecode) => {
                return Err(CodecError::Decode("truncated chunk".into()));
            }
            Some(MockFile::PanickingDecode) => panic!("decoder crashed on {}", path.display()),
            _ => {}
        }
        Ok(header
            .channels
            .iter()
            .map(|info| ChannelEntry {
                name: info.name.clone(),
                pixel_type: info.pixel_type,
                buffer: MockBuffer {
                    source: path.to_path_buf(),
                    _live: self.live.acquire(),
                },
            })
            .collect())
    }

    fn encode(
        &self,
        template: &MockHeader,
        channels: Vec<ChannelEntry<MockBuffer>>,
        path: &Path,
    ) -> Result<(), CodecError> {
        if self.failing_outputs.contains(path) {
            return Err(CodecError::Encode("disk full".into()));
        }
        let record = Encoded {
            path: path.to_path_buf(),
            template: template.path.clone(),
            channels: channels
                .iter()
                .map(|c| (c.name.clone(), c.buffer.source.clone()))
                .collect(),
        };
        self.encoded.lock().unwrap().push(record);
        Ok(())
    }
}

/// Channel names of an encode record.
pub fn names(encoded: &Encoded) -> Vec<&str> {
    encoded.channels.iter().map(|(n, _)| n.as_str()).collect()
}
